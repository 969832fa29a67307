pub mod constants;
pub mod tree;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;
