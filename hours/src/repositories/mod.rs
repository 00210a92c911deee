mod connection_repo;
mod repo_error;

pub use connection_repo::*;
pub use repo_error::RepositoryError;
