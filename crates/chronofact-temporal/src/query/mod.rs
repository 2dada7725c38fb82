//! Query engine: scope + window + direction, keyset pagination.

pub mod execute;
pub mod plan;
pub mod token;

pub use execute::execute;
pub use plan::{resolve_limit, QueryPlan};
pub use token::TokenError;
