//! StayMate CLI - binary entry point.
//!
//! ```text
//! main() -> load config -> init_tracing() -> commands::run(command)
//!                                                 |
//!                                                 v
//!                               ApiClient / Session / Inbox / RealtimeClient
//! ```
//!
//! Logs go to `~/.staymate/logs/staymate.log` so stdout stays clean for
//! command output.

mod commands;
mod hardening;
mod render;

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Args, Parser, Subcommand, ValueEnum};
use staymate_client::ClientError;
use staymate_config::{ConfigError, StaymateConfig, staymate_dir};
use staymate_types::{
    ApplicationId, ApplicationStatus, BookingId, BookingStatus, ConversationId, PayoutRequestId,
    PayoutStatus, SelectableRole, UserId,
};
use staymate_utils::sanitize_display_text;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use url::Url;

const SESSION_EXPIRED_HINT: &str = "Session expired; run `staymate login`";
const NOT_LOGGED_IN_HINT: &str = "Not logged in; run `staymate login`";

#[derive(Debug, Parser)]
#[command(name = "staymate", version, about = "Client for the StayMate rental platform")]
struct Cli {
    /// Config file to use instead of ~/.staymate/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Sign in with email and password.
    Login {
        #[arg(long)]
        email: String,
        /// Read from STAYMATE_PASSWORD or stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and sign in.
    Register(RegisterArgs),
    /// Sign out and forget stored credentials.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Pick a role for an account created through Google sign-in.
    SelectRole {
        #[arg(value_enum)]
        role: RoleArg,
    },
    /// List conversations.
    Conversations {
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a conversation and mark it read.
    Messages { conversation: ConversationId },
    /// Start a conversation with a user and open it.
    Start {
        recipient: UserId,
        /// Optional first message.
        text: Vec<String>,
    },
    /// Send a message to a conversation.
    Send {
        conversation: ConversationId,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// List notifications.
    Notifications {
        #[arg(long)]
        unread: bool,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    #[command(subcommand)]
    Properties(PropertiesCommand),
    #[command(subcommand)]
    Bookings(BookingsCommand),
    /// Landlord earnings summary.
    Earnings,
    #[command(subcommand)]
    Payouts(PayoutsCommand),
    /// Dashboard statistics for the signed-in role.
    Dashboard,
    #[command(subcommand)]
    Roommates(RoommatesCommand),
    #[command(subcommand)]
    Applications(ApplicationsCommand),
    #[command(subcommand)]
    Verify(VerifyCommand),
    /// Stream real-time messages and notifications until interrupted.
    Listen,
    /// Save a new backend URL to the config file.
    Server { url: Url },
}

#[derive(Debug, Args)]
struct RegisterArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long, value_enum)]
    role: Option<RoleArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    /// Looking for a place to rent.
    Tenant,
    /// Listing properties.
    HouseOwner,
}

impl From<RoleArg> for SelectableRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Tenant => SelectableRole::User,
            RoleArg::HouseOwner => SelectableRole::HouseOwner,
        }
    }
}

#[derive(Debug, Subcommand)]
enum PropertiesCommand {
    /// Search listings.
    Search(SearchArgs),
    /// Listings owned by the signed-in landlord.
    Mine,
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Free-text query.
    query: Option<String>,
    #[arg(long)]
    min_price: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
    #[arg(long)]
    beds: Option<u32>,
    #[arg(long)]
    baths: Option<u32>,
    #[arg(long = "type")]
    property_type: Option<String>,
}

#[derive(Debug, Subcommand)]
enum BookingsCommand {
    /// Bookings made by the signed-in tenant.
    Mine,
    /// Booking requests on the signed-in landlord's properties.
    Requests,
    /// Change a booking's status, e.g. `confirmed` or `checked-in`.
    Status { id: BookingId, status: BookingStatus },
}

#[derive(Debug, Subcommand)]
enum PayoutsCommand {
    /// Payout requests (admin).
    List {
        #[arg(long)]
        status: Option<PayoutStatus>,
    },
    /// Request a payout of the available balance.
    Request,
    /// Approve, reject or complete a payout request (admin).
    Process {
        id: PayoutRequestId,
        status: PayoutStatus,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum RoommatesCommand {
    /// Posts ranked by compatibility with you.
    Matches,
    /// Your own roommate posts.
    Mine,
    /// Search roommate posts.
    Search {
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        min_budget: Option<f64>,
        #[arg(long)]
        max_budget: Option<f64>,
        #[arg(long)]
        gender: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum ApplicationsCommand {
    /// Applications you sent.
    Sent,
    /// Applications on your listings.
    Received,
    /// Accept, reject or cancel an application.
    Status {
        id: ApplicationId,
        status: ApplicationStatus,
    },
}

#[derive(Debug, Subcommand)]
enum VerifyCommand {
    /// Show verification progress.
    Status,
    /// Text a verification code to a phone number.
    Phone { number: String },
    /// Confirm the code sent to a phone number.
    Confirm {
        otp: String,
        #[arg(long)]
        phone: String,
    },
    /// Upload an identity document for review.
    Upload {
        path: PathBuf,
        #[arg(long = "type")]
        document_type: Option<String>,
    },
}

fn init_tracing(config_level: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| match config_level {
            Some(level) => EnvFilter::try_new(level),
            None => EnvFilter::try_new("info"),
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Without a log file, log nothing rather than mixing logs into command
    // output.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new().create(true).append(true).open(&candidate) {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => warnings.push(format!(
                "Failed to open log file {}: {e}",
                candidate.display()
            )),
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = staymate_dir() {
        candidates.push(dir.join("logs").join("staymate.log"));
    }
    candidates.push(PathBuf::from(".staymate").join("logs").join("staymate.log"));
    candidates
}

fn load_config(path: Option<&Path>) -> Result<StaymateConfig, ConfigError> {
    match path {
        Some(path) => StaymateConfig::load_from(path),
        None => StaymateConfig::load(),
    }
}

/// Message printed for a failed command.
fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ClientError>() {
        Some(ClientError::SessionExpired) => SESSION_EXPIRED_HINT.to_string(),
        Some(ClientError::NotAuthenticated) => NOT_LOGGED_IN_HINT.to_string(),
        _ => format!("Error: {}", sanitize_display_text(&format!("{err:#}"))),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.logging.level.as_deref());

    if let Err(e) = hardening::disable_core_dumps() {
        tracing::warn!("{e:#}");
    }

    match commands::run(cli.command, &config, cli.config.as_deref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("Command failed: {err:#}");
            eprintln!("{}", describe_error(&err));
            ExitCode::FAILURE
        }
    }
}
