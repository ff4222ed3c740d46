pub mod cache;
pub mod precomputed;
pub mod quota;
pub mod rate_limit;
pub mod snapshot;

mod error;

pub use error::{Error, Result};
