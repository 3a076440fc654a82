//! campus-admin - command-line front end for the campus admin API

use anyhow::Context;
use campus_sdk::config::BASE_URL_ENV;
use campus_sdk::{
    AdminContext, AuthStatus, CacheConfig, ClientConfig, Credentials, MutationOutcome, SdkConfig,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "campus-admin")]
#[command(about = "Inspect and manage campus admin data from the command line")]
struct Args {
    /// Origin of the admin API
    #[arg(long, env = "CAMPUS_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "CAMPUS_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,

    /// Seconds a cached read stays fresh
    #[arg(long, env = "CAMPUS_CACHE_MAX_AGE_SECS", default_value = "0")]
    cache_max_age_secs: u64,

    /// Admin username; logs in before running the command when set
    #[arg(long, env = "CAMPUS_ADMIN_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "CAMPUS_ADMIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Log level for campus_sdk
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe the API and print the session state
    Status,
    /// Create an admin account with the given credentials
    Register,
    Colleges {
        #[command(subcommand)]
        action: Action,
    },
    Programs {
        #[command(subcommand)]
        action: Action,
    },
    Gallery {
        #[command(subcommand)]
        action: GalleryAction,
    },
    Inquiries {
        #[command(subcommand)]
        action: Action,
    },
    Forms {
        #[command(subcommand)]
        action: Action,
    },
}

#[derive(Subcommand, Debug)]
enum Action {
    List,
    Show { id: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum GalleryAction {
    List,
    Show { id: String },
    /// Images attached to one college
    ByCollege { college_id: String },
    Delete { id: String },
}

impl Args {
    fn sdk_config(&self) -> SdkConfig {
        SdkConfig {
            client: ClientConfig {
                timeout_secs: self.timeout_secs,
                ..ClientConfig::with_base_url(self.api_url.trim())
            },
            cache: CacheConfig {
                max_age: Duration::from_secs(self.cache_max_age_secs),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            _ => None,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("campus_sdk={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let context = AdminContext::new(args.sdk_config())
        .with_context(|| format!("Invalid configuration (see --api-url / {})", BASE_URL_ENV))?;

    if let Err(err) = run(&context, &args).await {
        error!("{:#}", err);
        return Err(err);
    }
    Ok(())
}

async fn run(context: &AdminContext, args: &Args) -> anyhow::Result<()> {
    let session = context.session();

    if let Command::Register = args.command {
        let credentials = args
            .credentials()
            .context("register needs --username and --password")?;
        let response = session.register(&credentials).await?;
        return print_json(&response.message);
    }

    session.initialize().await;
    if let Some(credentials) = args.credentials() {
        session.login(&credentials).await.context("Login failed")?;
    }

    match &args.command {
        Command::Status | Command::Register => {
            let current = session.session();
            info!(status = %current.status, "Session settled");
            print_json(&current)
        }
        command => {
            if session.status() != AuthStatus::Authenticated {
                anyhow::bail!("Not signed in; pass --username and --password");
            }
            resource_command(context, command).await
        }
    }
}

async fn resource_command(context: &AdminContext, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::Colleges { action } => match action {
            Action::List => print_json(&context.fetch_colleges().await?),
            Action::Show { id } => print_json(&context.fetch_college(id).await?),
            Action::Delete { id } => settle(context.delete_college(id).await),
        },
        Command::Programs { action } => match action {
            Action::List => print_json(&context.fetch_programs().await?),
            Action::Show { id } => print_json(&context.fetch_program(id).await?),
            Action::Delete { id } => settle(context.delete_program(id).await),
        },
        Command::Gallery { action } => match action {
            GalleryAction::List => print_json(&context.fetch_gallery_images().await?),
            GalleryAction::Show { id } => print_json(&context.fetch_gallery_image(id).await?),
            GalleryAction::ByCollege { college_id } => {
                print_json(&context.fetch_gallery_by_college(college_id).await?)
            }
            GalleryAction::Delete { id } => settle(context.delete_gallery_image(id).await),
        },
        Command::Inquiries { action } => match action {
            Action::List => print_json(&context.fetch_inquiries().await?),
            Action::Show { id } => print_json(&context.fetch_inquiry(id).await?),
            Action::Delete { id } => settle(context.delete_inquiry(id).await),
        },
        Command::Forms { action } => match action {
            Action::List => print_json(&context.fetch_form_submissions().await?),
            Action::Show { id } => print_json(&context.fetch_form_submission(id).await?),
            Action::Delete { id } => settle(context.delete_form_submission(id).await),
        },
        Command::Status | Command::Register => Ok(()),
    }
}

fn settle<T: Serialize>(outcome: MutationOutcome<T>) -> anyhow::Result<()> {
    let id = outcome.id;
    let value = outcome
        .into_result()
        .with_context(|| format!("Mutation {} failed", id))?;
    print_json(&value)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
