use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use crate::domain::{DateRange, HoursError};

#[derive(Debug, Parser)]
#[command(name = "hours")]
#[command(about = "Track and chart hours across Redmine instances")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Authenticate against a Redmine host and save the connection
    Connect(ConnectArgs),
    /// List saved connections
    Connections,
    /// Re-authenticate a saved connection with its stored key
    Retest {
        connection: Uuid,
    },
    /// Remove a saved connection
    Disconnect {
        connection: Uuid,
        /// Delete the record instead of hiding it
        #[arg(long)]
        hard: bool,
    },
    /// Fetch and cache the project tree of a connection
    SyncProjects {
        connection: Uuid,
    },
    /// List time entry activities of a connection
    Activities {
        connection: Uuid,
    },
    /// Book time on an issue or project
    Log(LogArgs),
    /// Change an existing time entry
    Edit(EditArgs),
    /// Delete a time entry
    Delete {
        connection: Uuid,
        entry: u64,
    },
    /// List the connection user's time entries
    Entries {
        connection: Uuid,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Hours per day, week, project and connection across all connections
    Dashboard {
        #[command(flatten)]
        range: RangeArgs,
    },
}

#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// Redmine base URL
    pub url: String,
    /// Display name, defaults to the Redmine user's name
    #[arg(long, default_value = "")]
    pub name: String,
    /// Only check the credentials, save nothing
    #[arg(long)]
    pub dry_run: bool,
    #[arg(long, conflicts_with_all = ["username", "password"])]
    pub api_key: Option<String>,
    #[arg(long, requires = "password")]
    pub username: Option<String>,
    #[arg(long, requires = "username")]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct RangeArgs {
    /// First day, defaults to seven days before today
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day, defaults to today
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl RangeArgs {
    /// Fills missing ends from [`DateRange::last_week`].
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange, HoursError> {
        let default = DateRange::last_week(today);
        DateRange::new(self.from.unwrap_or(default.from), self.to.unwrap_or(default.to))
    }
}

#[derive(Debug, Args)]
pub struct BookingArgs {
    #[arg(long)]
    pub issue: Option<u64>,
    #[arg(long)]
    pub sub_project: Option<u64>,
    #[arg(long)]
    pub project: Option<u64>,
}

#[derive(Debug, Args)]
pub struct LogArgs {
    pub connection: Uuid,
    pub hours: f64,
    #[command(flatten)]
    pub target: BookingArgs,
    /// Defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub activity: Option<u64>,
    #[arg(long, short)]
    pub comment: Option<String>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub connection: Uuid,
    pub entry: u64,
    #[command(flatten)]
    pub target: BookingArgs,
    #[arg(long)]
    pub hours: Option<f64>,
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub activity: Option<u64>,
    #[arg(long, short)]
    pub comment: Option<String>,
}
