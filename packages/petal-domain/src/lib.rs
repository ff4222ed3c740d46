pub mod filter;
pub mod intent;
pub mod product;
pub mod reason;
