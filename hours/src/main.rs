use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use hours::{
    cli::{Cli, Commands},
    config::read_config,
    repositories::ConnectionRepositoryImpl,
    services::{
        ConnectRequest, ConnectionService, DashboardService, EditTimeEntry, LogTimeEntry,
        TimeEntryService,
    },
};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::from_filename(".env.local").ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hours=info,redmine=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = read_config().context("Failed to read configuration")?;
    let cipher = settings
        .crypto
        .cipher()
        .context("HOURS_CRYPTO__API_KEY_SECRET must be a base64 encoded 32-byte key")?;
    let page_size = settings.redmine.page_size;
    let repo = Arc::new(ConnectionRepositoryImpl::new(
        settings.storage.connections_path,
    ));

    let connections = ConnectionService::new(repo.clone(), cipher.clone(), page_size);
    let time_entries = TimeEntryService::new(repo.clone(), cipher.clone(), page_size);
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Connect(args) => {
            let auth_type = if args.username.is_some() {
                "password"
            } else {
                "apikey"
            };
            let request = ConnectRequest {
                name: args.name,
                url: args.url,
                auth_type: Some(auth_type.to_string()),
                api_key: args.api_key,
                username: args.username,
                password: args.password,
            };
            if args.dry_run {
                print_json(&connections.test(&request).await?)?;
            } else {
                let connection = connections
                    .connect(request)
                    .await
                    .context("Failed to connect")?;
                print_json(&connection)?;
            }
        }
        Commands::Connections => print_json(&connections.list().await?)?,
        Commands::Retest { connection } => {
            print_json(&connections.retest(connection).await?)?;
        }
        Commands::Disconnect { connection, hard } => {
            connections.remove(connection, hard).await?;
            tracing::info!(%connection, hard, "Removed connection");
        }
        Commands::SyncProjects { connection } => {
            print_json(&connections.sync_projects(connection).await?)?;
        }
        Commands::Activities { connection } => {
            print_json(&time_entries.activities(connection).await?)?;
        }
        Commands::Log(args) => {
            let entry = LogTimeEntry {
                issue_id: args.target.issue,
                sub_project_id: args.target.sub_project,
                project_id: args.target.project,
                spent_on: args.date,
                hours: args.hours,
                activity_id: args.activity,
                comments: args.comment,
            };
            print_json(&time_entries.log(args.connection, entry, today).await?)?;
        }
        Commands::Edit(args) => {
            let edit = EditTimeEntry {
                issue_id: args.target.issue,
                sub_project_id: args.target.sub_project,
                project_id: args.target.project,
                spent_on: args.date,
                hours: args.hours,
                activity_id: args.activity,
                comments: args.comment,
            };
            print_json(&time_entries.edit(args.connection, args.entry, edit).await?)?;
        }
        Commands::Delete { connection, entry } => {
            print_json(&time_entries.delete(connection, entry).await?)?;
        }
        Commands::Entries { connection, range } => {
            let range = range.resolve(today)?;
            print_json(&time_entries.list(connection, range).await?)?;
        }
        Commands::Dashboard { range } => {
            let range = range.resolve(today)?;
            let dashboard = DashboardService::new(repo, cipher, page_size);
            print_json(&dashboard.dashboard(range).await?)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
