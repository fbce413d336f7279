pub mod lint;
pub mod query;
pub mod scope;
pub mod token;

pub use scope::analyze;

#[cfg(test)]
mod lint_test;
