mod aggregations;
mod connection;
mod date_range;
mod error;

pub use aggregations::*;
pub use connection::*;
pub use date_range::*;
pub use error::*;
