//! Comment moderation lifecycle.
//!
//! ```text
//! pending  --approve--> approved
//! pending  --reject---> rejected
//! approved --reject---> rejected
//! rejected --approve--> approved
//! ```
//!
//! Every comment starts `pending`. Moderators move it to `approved` or
//! `rejected` and may flip between those two at any time; nothing returns to
//! `pending`.

use serde::{Deserialize, Serialize};
use sqlx::Type;
use utoipa::ToSchema;

use crate::core::error::{AppError, Result};

/// Comment status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "comment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
}

impl CommentStatus {
    /// Status of every newly created comment, whatever the client asked for
    pub const INITIAL: CommentStatus = CommentStatus::Pending;

    /// Visible to readers without moderation rights
    pub fn is_public(self) -> bool {
        self == CommentStatus::Approved
    }

    /// Replies may only target approved comments
    pub fn accepts_replies(self) -> bool {
        self == CommentStatus::Approved
    }

    /// Authors may edit or delete their comment only before moderation
    pub fn is_author_mutable(self) -> bool {
        self == CommentStatus::Pending
    }

    /// Apply a moderation decision, returning the new status.
    pub fn apply(self, action: ModerationAction) -> Result<CommentStatus> {
        let target = action.target();
        if self == target {
            return Err(AppError::AlreadyInState(format!("Comment is already {}", target)));
        }
        Ok(target)
    }
}

impl std::fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommentStatus::Pending => write!(f, "pending"),
            CommentStatus::Approved => write!(f, "approved"),
            CommentStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A moderator's decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Approve,
    Reject,
}

impl ModerationAction {
    pub fn target(self) -> CommentStatus {
        match self {
            ModerationAction::Approve => CommentStatus::Approved,
            ModerationAction::Reject => CommentStatus::Rejected,
        }
    }

    /// Past-tense verb for response messages
    pub fn past_tense(self) -> &'static str {
        match self {
            ModerationAction::Approve => "approved",
            ModerationAction::Reject => "rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use super::CommentStatus::*;
    use super::ModerationAction::*;

    #[test]
    fn test_new_comments_start_pending() {
        assert_eq!(CommentStatus::INITIAL, Pending);
    }

    #[test]
    fn test_approve_transitions() {
        assert_eq!(Pending.apply(Approve).unwrap(), Approved);
        assert_eq!(Rejected.apply(Approve).unwrap(), Approved);
        assert!(matches!(
            Approved.apply(Approve),
            Err(AppError::AlreadyInState(_))
        ));
    }

    #[test]
    fn test_reject_transitions() {
        assert_eq!(Pending.apply(Reject).unwrap(), Rejected);
        assert_eq!(Approved.apply(Reject).unwrap(), Rejected);
        assert!(matches!(
            Rejected.apply(Reject),
            Err(AppError::AlreadyInState(_))
        ));
    }

    #[test]
    fn test_no_action_leads_back_to_pending() {
        for from in [Pending, Approved, Rejected] {
            for action in [Approve, Reject] {
                if let Ok(to) = from.apply(action) {
                    assert_ne!(to, Pending);
                }
            }
        }
    }

    #[test]
    fn test_only_approved_is_public_and_repliable() {
        assert!(Approved.is_public());
        assert!(Approved.accepts_replies());
        for status in [Pending, Rejected] {
            assert!(!status.is_public());
            assert!(!status.accepts_replies());
        }
    }

    #[test]
    fn test_only_pending_is_author_mutable() {
        assert!(Pending.is_author_mutable());
        assert!(!Approved.is_author_mutable());
        assert!(!Rejected.is_author_mutable());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&Approved).unwrap(), "\"approved\"");
        let parsed: CommentStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(parsed, Rejected);
    }
}
