mod api_key;
mod auth;
mod client;
pub mod domain;
mod pagination;
mod project_tree;
mod redmine_url;
mod response;

pub(crate) use redmine_url::*;

pub use api_key::*;
pub use auth::*;
pub use client::*;
pub use domain::*;
pub use pagination::*;
pub use project_tree::*;
pub use response::*;
