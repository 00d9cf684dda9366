//! Command handlers.

use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use staymate_client::{ApiClient, ClientError, Inbox, Session, SessionEvent};
use staymate_config::{StaymateConfig, config_path, persist_base_url};
use staymate_realtime::{RealtimeClient, RealtimeConfig, RealtimeEvent};
use staymate_types::{
    NotificationFilter, PageRequest, PropertySearch, RegisterRequest, RoommateSearch,
};
use tokio::sync::broadcast;
use url::Url;

use crate::{
    ApplicationsCommand, BookingsCommand, CliCommand, PayoutsCommand, PropertiesCommand,
    RegisterArgs, RoommatesCommand, SearchArgs, VerifyCommand, render,
};

const PASSWORD_ENV: &str = "STAYMATE_PASSWORD";
const NOTIFICATION_PAGE_SIZE: u32 = 20;

pub async fn run(
    command: CliCommand,
    config: &StaymateConfig,
    config_file: Option<&Path>,
) -> Result<()> {
    let client = ApiClient::from_config(config)?;
    tracing::debug!(base_url = client.base_url(), "Running command");

    match command {
        CliCommand::Login { email, password } => {
            let password = read_password(password)?;
            let mut session = Session::new(client);
            let user = session.login(&email, &password).await?;
            println!("Logged in as {}", render::user_summary(user));
        }
        CliCommand::Register(args) => register(client, args).await?,
        CliCommand::Logout => {
            Session::new(client).logout().await;
            println!("Logged out");
        }
        CliCommand::Whoami => {
            require_credentials(&client)?;
            let user = client.auth().current_user().await?;
            println!("{}", render::user_summary(&user));
        }
        CliCommand::SelectRole { role } => {
            require_credentials(&client)?;
            let mut session = Session::new(client);
            let user = session.select_role(role.into()).await?;
            println!("Role updated: {}", render::user_summary(user));
        }
        CliCommand::Conversations { search } => {
            require_credentials(&client)?;
            let mut inbox = Inbox::new(client);
            inbox
                .set_search(search.as_deref())
                .await
                .context("failed to load conversations")?;
            if inbox.conversations().is_empty() {
                println!("No conversations");
            }
            for conversation in inbox.conversations() {
                println!("{}", render::conversation_line(conversation));
            }
            println!("{} unread", inbox.total_unread());
        }
        CliCommand::Messages { conversation } => {
            require_credentials(&client)?;
            let mut inbox = Inbox::new(client);
            inbox.open(conversation).await?;
            if let Some(selected) = inbox.selected() {
                println!("{}", render::conversation_line(selected));
            }
            for message in inbox.messages() {
                println!("{}", render::message_line(message));
            }
        }
        CliCommand::Start { recipient, text } => {
            require_credentials(&client)?;
            let mut inbox = Inbox::new(client);
            let first = text.join(" ");
            let conversation = inbox
                .start_conversation(recipient, Some(first.as_str()))
                .await?;
            println!("{}", render::conversation_line(conversation));
        }
        CliCommand::Send { conversation, text } => {
            require_credentials(&client)?;
            let mut inbox = Inbox::new(client);
            inbox.open(conversation).await?;
            match inbox.send(&text.join(" ")).await? {
                Some(sent) => println!("{}", render::message_line(&sent)),
                None => bail!("message is empty"),
            }
        }
        CliCommand::Notifications { unread, page } => {
            require_credentials(&client)?;
            let filter = unread.then_some(NotificationFilter::Unread);
            let list = client
                .notifications()
                .list(PageRequest::new(page, NOTIFICATION_PAGE_SIZE), filter)
                .await?;
            for notification in &list.notifications {
                println!("{}", render::notification_line(notification));
            }
            println!("{} unread", list.unread_count);
        }
        CliCommand::Properties(command) => properties(&client, command).await?,
        CliCommand::Bookings(command) => bookings(&client, command).await?,
        CliCommand::Earnings => {
            require_credentials(&client)?;
            let summary = client.finance().earnings_summary().await?;
            println!("{}", render::earnings_summary(&summary));
        }
        CliCommand::Payouts(command) => payouts(&client, command).await?,
        CliCommand::Dashboard => {
            require_credentials(&client)?;
            let stats = client.dashboard().stats().await?;
            println!("{}", render::dashboard(&stats));
        }
        CliCommand::Roommates(command) => roommates(&client, command).await?,
        CliCommand::Applications(command) => applications(&client, command).await?,
        CliCommand::Verify(command) => verify(&client, command).await?,
        CliCommand::Listen => listen(client, config).await?,
        CliCommand::Server { url } => set_server(&url, config_file)?,
    }
    Ok(())
}

fn set_server(url: &Url, config_file: Option<&Path>) -> Result<()> {
    let path = config_file
        .map(Path::to_path_buf)
        .or_else(config_path)
        .context("no home directory for the config file")?;
    persist_base_url(&path, url).with_context(|| format!("failed to update {}", path.display()))?;
    println!("Backend set to {url}");
    Ok(())
}

fn require_credentials(client: &ApiClient) -> Result<(), ClientError> {
    if client.has_credentials() {
        Ok(())
    } else {
        Err(ClientError::NotAuthenticated)
    }
}

/// `--password`, then `STAYMATE_PASSWORD`, then one line from stdin.
fn read_password(given: Option<String>) -> Result<String> {
    if let Some(password) = given.filter(|p| !p.is_empty()) {
        return Ok(password);
    }
    if let Ok(password) = env::var(PASSWORD_ENV)
        && !password.is_empty()
    {
        return Ok(password);
    }

    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("a password is required");
    }
    Ok(password)
}

async fn register(client: ApiClient, args: RegisterArgs) -> Result<()> {
    let request = RegisterRequest {
        email: args.email.trim().to_string(),
        password: read_password(args.password)?,
        first_name: args.first_name,
        last_name: args.last_name,
        phone_number: args.phone,
        role: args.role.map(Into::into),
        ..RegisterRequest::default()
    };
    let mut session = Session::new(client);
    let user = session.register(&request).await?;
    println!("Registered {}", render::user_summary(user));
    Ok(())
}

async fn properties(client: &ApiClient, command: PropertiesCommand) -> Result<()> {
    let listings = match command {
        PropertiesCommand::Search(args) => client.properties().search(&search_filters(args)).await?,
        PropertiesCommand::Mine => {
            require_credentials(client)?;
            client.properties().mine().await?
        }
    };
    if listings.is_empty() {
        println!("No properties found");
    }
    for property in &listings {
        println!("{}", render::property_line(property));
    }
    Ok(())
}

fn search_filters(args: SearchArgs) -> PropertySearch {
    PropertySearch {
        query: args.query,
        min_price: args.min_price,
        max_price: args.max_price,
        min_beds: args.beds,
        min_baths: args.baths,
        property_type: args.property_type,
        ..PropertySearch::default()
    }
}

async fn bookings(client: &ApiClient, command: BookingsCommand) -> Result<()> {
    require_credentials(client)?;
    let page = match command {
        BookingsCommand::Mine => client.bookings().mine(PageRequest::default()).await?,
        BookingsCommand::Requests => client.bookings().requests(PageRequest::default()).await?,
        BookingsCommand::Status { id, status } => {
            let booking = client.bookings().update_status(id, status).await?;
            println!("{}", render::booking_line(&booking));
            return Ok(());
        }
    };
    if page.content.is_empty() {
        println!("No bookings");
    }
    for booking in &page.content {
        println!("{}", render::booking_line(booking));
    }
    if !page.is_last() {
        println!("({} of {} shown)", page.content.len(), page.total_elements);
    }
    Ok(())
}

async fn payouts(client: &ApiClient, command: PayoutsCommand) -> Result<()> {
    require_credentials(client)?;
    match command {
        PayoutsCommand::List { status } => {
            let page = client
                .finance()
                .payout_requests(status, PageRequest::default())
                .await?;
            if page.content.is_empty() {
                println!("No payout requests");
            }
            for payout in &page.content {
                println!("{}", render::payout_line(payout));
            }
        }
        PayoutsCommand::Request => {
            client.finance().request_payout().await?;
            println!("Payout requested");
        }
        PayoutsCommand::Process { id, status, notes } => {
            client
                .finance()
                .process_payout_request(id, status, notes.as_deref())
                .await?;
            println!("Payout request #{id} marked {}", status.as_str());
        }
    }
    Ok(())
}

async fn roommates(client: &ApiClient, command: RoommatesCommand) -> Result<()> {
    require_credentials(client)?;
    let posts = match command {
        RoommatesCommand::Matches => client.roommates().matches().await?,
        RoommatesCommand::Mine => client.roommates().mine().await?,
        RoommatesCommand::Search {
            location,
            min_budget,
            max_budget,
            gender,
        } => {
            let filters = RoommateSearch {
                location,
                min_budget,
                max_budget,
                gender_preference: gender,
            };
            client.roommates().search(&filters).await?
        }
    };
    if posts.is_empty() {
        println!("No roommate posts");
    }
    for post in &posts {
        println!("{}", render::roommate_line(post));
    }
    Ok(())
}

async fn applications(client: &ApiClient, command: ApplicationsCommand) -> Result<()> {
    require_credentials(client)?;
    let page = match command {
        ApplicationsCommand::Sent => client.applications().sent(PageRequest::default()).await?,
        ApplicationsCommand::Received => {
            client.applications().received(PageRequest::default()).await?
        }
        ApplicationsCommand::Status { id, status } => {
            let application = client.applications().update_status(id, status).await?;
            println!("{}", render::application_line(&application));
            return Ok(());
        }
    };
    if page.content.is_empty() {
        println!("No applications");
    }
    for application in &page.content {
        println!("{}", render::application_line(application));
    }
    if !page.is_last() {
        println!("({} of {} shown)", page.content.len(), page.total_elements);
    }
    Ok(())
}

async fn verify(client: &ApiClient, command: VerifyCommand) -> Result<()> {
    require_credentials(client)?;
    match command {
        VerifyCommand::Status => {
            let status = client.verification().status().await?;
            println!("{}", render::verification_summary(&status));
        }
        VerifyCommand::Phone { number } => {
            let sent = client.verification().send_phone_code(&number).await?;
            println!("Code sent to {}", number.trim());
            // Development backends echo the code back.
            if let Some(otp) = sent.otp {
                println!("Code: {otp}");
            }
        }
        VerifyCommand::Confirm { otp, phone } => {
            client.verification().verify_phone(&phone, &otp).await?;
            println!("Phone verified");
        }
        VerifyCommand::Upload {
            path,
            document_type,
        } => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .map_or_else(|| "document".to_string(), |n| n.to_string_lossy().into_owned());
            client
                .verification()
                .upload_document(&file_name, bytes, document_type.as_deref())
                .await?;
            println!("Document submitted for review");
        }
    }
    Ok(())
}

/// Stream real-time events into an [`Inbox`] until Ctrl-C or session expiry.
async fn listen(client: ApiClient, config: &StaymateConfig) -> Result<()> {
    require_credentials(&client)?;
    let user = client.auth().current_user().await?;
    let mut inbox = Inbox::new(client.clone());
    inbox.sync_conversations().await?;
    println!(
        "Listening as {} ({} unread); Ctrl-C to stop",
        render::user_summary(&user),
        inbox.total_unread()
    );

    let realtime_config = RealtimeConfig::from_config(config)?;
    let tokens = client.clone();
    let (handle, mut events) =
        RealtimeClient::spawn(realtime_config, move || tokens.access_token(), Some(user.id));
    let mut session_events = client.subscribe();

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            session_event = session_events.recv() => match session_event {
                Ok(SessionEvent::Expired) => break Err(ClientError::SessionExpired.into()),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break Ok(()),
            },
            event = events.recv() => {
                let Some(event) = event else { break Ok(()) };
                if let Some(line) = render::realtime_event(&event) {
                    println!("{line}");
                }
                if let Err(e) = feed_inbox(&mut inbox, event).await {
                    if e.requires_login() {
                        break Err(e.into());
                    }
                    tracing::warn!("Inbox update failed: {e}");
                }
            }
        }
    };

    handle.disconnect().await;
    result
}

async fn feed_inbox(inbox: &mut Inbox, event: RealtimeEvent) -> Result<(), ClientError> {
    match event {
        RealtimeEvent::Message(message) => inbox.on_incoming(message).await,
        RealtimeEvent::NewMessage(alert) => inbox.on_new_message_alert(&alert).await,
        RealtimeEvent::Connected => inbox.sync_conversations().await,
        _ => Ok(()),
    }
}
