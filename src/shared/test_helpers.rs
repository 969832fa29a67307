use axum::{extract::Request, middleware::Next, Router};

use crate::features::auth::model::{AuthenticatedUser, Role};

pub fn test_user(user_id: i64, role: Role) -> AuthenticatedUser {
    AuthenticatedUser { user_id, role }
}

/// Make every request through `router` look authenticated as `user`
pub fn with_user(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}
