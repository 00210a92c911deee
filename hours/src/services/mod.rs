mod connections;
mod dashboard;
mod time_entries;

pub use connections::*;
pub use dashboard::*;
pub use time_entries::*;
