pub mod errors;
pub mod models;
pub mod normalize;

pub use errors::*;
pub use models::*;
pub use normalize::{normalize_job, parse_posting_date};
