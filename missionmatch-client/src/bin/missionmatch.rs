use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use missionmatch_client::location::detect_location;
use missionmatch_client::render::{render_card, render_cards, render_notes, render_progress};
use missionmatch_client::{
    CallBackend, CallLifecycle, DiscoverySequencer, HttpBackend, OrganizationStore, PollConfig,
    Wizard, DEFAULT_API_URL,
};
use providers::NominatimClient;
use shared_types::{normalize_e164, Organization};

#[derive(Parser, Debug)]
#[command(name = "missionmatch", about = "Find local organizations to volunteer with and call them")]
struct Cli {
    /// Base URL of the MissionMatch API
    #[arg(long, global = true, default_value = DEFAULT_API_URL)]
    api_url: String,

    #[command(flatten)]
    poll: PollArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct PollArgs {
    /// Seconds between call status checks
    #[arg(long, global = true, default_value_t = 3)]
    poll_interval_secs: u64,

    /// Status checks before giving up on a call
    #[arg(long, global = true, default_value_t = 120)]
    poll_attempts: u32,
}

impl PollArgs {
    fn config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            max_attempts: self.poll_attempts.max(1),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk through location, mission and discovery, then optionally call results
    Discover {
        /// What you want to help with (prompted for when omitted)
        #[arg(long)]
        mission: Option<String>,

        /// City or region; takes precedence over --coords
        #[arg(long)]
        location: Option<String>,

        /// "lat,lon" to reverse geocode when no location is given
        #[arg(long)]
        coords: Option<String>,

        /// Result numbers to call once discovery finishes
        #[arg(long, value_delimiter = ',')]
        call: Vec<usize>,
    },
    /// Call a single organization directly
    Call {
        /// Phone number to call
        #[arg(long)]
        to: String,

        /// Organization name
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        mission: String,
    },
    /// Show a stored call summary by phone number or call id
    Summary {
        #[arg(long)]
        key: String,
    },
    /// List notes for every called organization
    Notes,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let http = reqwest::Client::new();
    let backend: Arc<dyn CallBackend> = Arc::new(HttpBackend::new(http.clone(), &cli.api_url));
    let poll_config = cli.poll.config();

    match cli.command {
        Command::Discover {
            mission,
            location,
            coords,
            call,
        } => {
            let location = match location {
                Some(location) => location,
                None => detect_location(&NominatimClient::new(http), coords.as_deref()).await,
            };
            run_discover(backend, poll_config, location, mission, call).await
        }
        Command::Call { to, name, mission } => {
            let phone = normalize_e164(&to).context("Invalid phone number")?;
            let organization = Organization {
                phone: Some(phone),
                ..Organization::new(uuid::Uuid::new_v4().to_string(), name)
            };
            call_organizations(backend, poll_config, &mission, vec![organization], &[1]).await
        }
        Command::Summary { key } => {
            match backend.call_summary(&key).await? {
                Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
                None => println!("No summary stored for {key}"),
            }
            Ok(())
        }
        Command::Notes => {
            let notes = backend.notes().await?;
            print!("{}", render_notes(&notes));
            Ok(())
        }
    }
}

async fn run_discover(
    backend: Arc<dyn CallBackend>,
    poll_config: PollConfig,
    location: String,
    mission: Option<String>,
    to_call: Vec<usize>,
) -> Result<()> {
    let mut wizard = Wizard::new();

    if location.is_empty() {
        println!("Location: (not set)");
    } else {
        println!("Location: {location}");
    }
    wizard.submit_location(location)?;

    let mission = match mission {
        Some(mission) => mission,
        None => prompt("What would you like to help with? ")?,
    };
    wizard.submit_mission(mission)?;

    let sequencer = DiscoverySequencer::default();
    let organizations = wizard
        .run_discovery(backend.as_ref(), &sequencer, |progress| {
            print!("\r{}", render_progress(&progress));
            let _ = std::io::stdout().flush();
        })
        .await?
        .to_vec();
    println!();

    if let Some(refined) = wizard.refined_mission() {
        println!("\n{refined}\n");
    }
    print!("{}", render_cards(&organizations));

    if to_call.is_empty() {
        return Ok(());
    }
    call_organizations(backend, poll_config, wizard.mission(), organizations, &to_call).await
}

/// Calls the 1-based `indexes` of `organizations` and waits for every call to settle
async fn call_organizations(
    backend: Arc<dyn CallBackend>,
    poll_config: PollConfig,
    mission: &str,
    organizations: Vec<Organization>,
    indexes: &[usize],
) -> Result<()> {
    let mut store = OrganizationStore::new();
    store.replace_all(organizations);
    let ids: Vec<String> = store.list().into_iter().map(|o| o.id).collect();

    let lifecycle = CallLifecycle::new(backend, Arc::new(Mutex::new(store)))
        .with_poll_config(poll_config)
        .with_mission(mission);

    let mut placed = Vec::new();
    for &index in indexes {
        let Some(id) = index.checked_sub(1).and_then(|i| ids.get(i)) else {
            tracing::warn!("No result number {}", index);
            continue;
        };
        match lifecycle.deploy_call(id).await {
            Ok(call_id) => {
                println!("Calling result {index} (call {call_id})...");
                placed.push((index, id.clone()));
            }
            Err(e) => println!("Could not call result {index}: {e}"),
        }
    }

    for (index, id) in placed {
        tokio::select! {
            _ = lifecycle.wait(&id) => {}
            _ = tokio::signal::ctrl_c() => {
                println!("\nStopping calls...");
                lifecycle.shutdown().await;
                return Ok(());
            }
        }
        if let Some(organization) = lifecycle.organization(&id).await {
            print!("\n{}", render_card(index, &organization));
        }
    }

    Ok(())
}

fn prompt(question: &str) -> Result<String> {
    print!("{question}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
