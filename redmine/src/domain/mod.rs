mod activity;
mod params;
mod project;
mod time_entry;
mod user;

pub use activity::*;
pub use params::*;
pub use project::*;
pub use time_entry::*;
pub use user::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{id, name}` reference embedded in most Redmine resources.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
}
