use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use repnet::api::client::HttpClient;
use repnet::api::dto::VoteKind;
use repnet::api::traits::RepNetApi;
use repnet::config::Config;
use repnet::credentials::{Anonymous, CredentialProvider};
use repnet::feed::ReportsFeed;
use repnet::lookups::LookupCache;
use repnet::output;
use repnet::report::filter::{FilterState, SortKey, StatusFilter};
use repnet::report::resolve;
use repnet::vote::VoteController;

/// RepNet: community reporting of malicious websites.
///
/// Headless client for the RepNet reputation service — browse the public
/// report feed, inspect and vote on reports, and search site reputations
/// from the terminal.
#[derive(Parser)]
#[command(name = "repnet", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the public feed of approved reports
    Reports {
        /// Filter by category substring (e.g. "phish")
        #[arg(long)]
        category: Option<String>,

        /// Filter by status label ("Todos" shows everything)
        #[arg(long)]
        status: Option<String>,

        /// Sort key: severity, date, or none
        #[arg(long, default_value = "none")]
        sort: String,

        /// Only trending reports (vote score above 50, last 7 days)
        #[arg(long)]
        trending: bool,
    },

    /// List your own reports (requires REPNET_TOKEN and REPNET_USER_ID)
    Mine {
        /// Filter by status label ("Todos" shows everything)
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one report in full
    Show {
        /// The report id
        id: i64,
    },

    /// Toggle your vote on a report
    Vote {
        /// The report id
        id: i64,

        /// Cast an upvote
        #[arg(long, conflicts_with = "down")]
        up: bool,

        /// Cast a downvote
        #[arg(long)]
        down: bool,
    },

    /// Search sites by domain
    Search {
        /// Domain to search for
        domain: String,

        /// Result page (1-based)
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Show the tag and impact taxonomies
    Lookups,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("repnet=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Reports {
            category,
            status,
            sort,
            trending,
        } => {
            let api = anonymous_client(&config)?;
            let feed = ReportsFeed::new(Arc::clone(&api), Arc::new(Anonymous));

            feed.refresh_public().await;
            if let Some(message) = feed.error() {
                anyhow::bail!("{message}");
            }

            let filter = FilterState {
                status: status
                    .as_deref()
                    .map(StatusFilter::parse)
                    .unwrap_or_default(),
                category,
                sort: parse_sort_key(&sort)?,
                trending,
            };

            output::display_report_list(&feed.apply_filter(&filter));
        }

        Commands::Mine { status } => {
            config.require_auth()?;
            let (api, credentials) = authenticated_client(&config)?;
            let feed = ReportsFeed::new(api, credentials);

            // Same label table as `reports --status`; "Todos" and
            // unmapped labels mean no narrowing.
            let status = status
                .as_deref()
                .map(StatusFilter::parse)
                .unwrap_or_default()
                .only();
            feed.refresh_mine(status).await;
            if let Some(message) = feed.error() {
                anyhow::bail!("{message}");
            }

            output::display_report_list(&feed.reports());
        }

        Commands::Show { id } => {
            // Credentials are optional here; with them, the caller's own
            // vote shows up on the report.
            let (api, credentials) = authenticated_client(&config)?;

            let lookups = LookupCache::load(api.as_ref())
                .await
                .context("Failed to load tag and impact lookups")?;

            let raw = api
                .fetch_report(id)
                .await
                .with_context(|| format!("Failed to fetch report {id}"))?;

            let resolved =
                resolve::resolve(std::slice::from_ref(&raw), &lookups, credentials.user_id())?;
            if let Some(report) = resolved.first() {
                output::display_report_detail(report);
            }
        }

        Commands::Vote { id, up, down } => {
            config.require_auth()?;
            let kind = match (up, down) {
                (true, false) => VoteKind::Upvote,
                (false, true) => VoteKind::Downvote,
                _ => anyhow::bail!("Pass exactly one of --up or --down"),
            };

            let (api, credentials) = authenticated_client(&config)?;

            let lookups = LookupCache::load(api.as_ref())
                .await
                .context("Failed to load tag and impact lookups")?;

            let raw = api
                .fetch_report(id)
                .await
                .with_context(|| format!("Failed to fetch report {id}"))?;

            let resolved =
                resolve::resolve(std::slice::from_ref(&raw), &lookups, credentials.user_id())?;
            let Some(report) = resolved.first() else {
                anyhow::bail!("Report {id} not found");
            };

            let controller = VoteController::new(Arc::clone(&api), report);
            controller.vote(kind).await;

            // A failed cast reverts the snapshot; the printed state is
            // the only signal either way.
            let after = controller.snapshot();
            println!("Your vote: {} ({} votes)", after.state, after.score);
        }

        Commands::Search { domain, page } => {
            let api = anonymous_client(&config)?;

            let site = api
                .search_sites(&domain, page)
                .await
                .with_context(|| format!("Site search failed for '{domain}'"))?;

            match site {
                Some(site) => output::display_site(&site),
                None => println!("No site found for '{domain}'."),
            }
        }

        Commands::Lookups => {
            let api = anonymous_client(&config)?;

            let (tags, impacts) = tokio::try_join!(api.fetch_tags(), api.fetch_impacts())
                .context("Failed to fetch taxonomies")?;

            output::display_lookups(&tags, &impacts);
        }
    }

    Ok(())
}

/// Build an unauthenticated API client.
fn anonymous_client(config: &Config) -> Result<Arc<dyn RepNetApi>> {
    let client = HttpClient::new(&config.server_url, Arc::new(Anonymous))?;
    Ok(Arc::new(client))
}

/// Build an API client carrying whatever credentials are configured.
fn authenticated_client(
    config: &Config,
) -> Result<(Arc<dyn RepNetApi>, Arc<dyn CredentialProvider>)> {
    let credentials: Arc<dyn CredentialProvider> = Arc::new(config.credentials());
    let client = HttpClient::new(&config.server_url, Arc::clone(&credentials))?;
    Ok((Arc::new(client), credentials))
}

/// Parse a CLI sort argument.
fn parse_sort_key(raw: &str) -> Result<SortKey> {
    match raw.to_lowercase().as_str() {
        "none" => Ok(SortKey::None),
        "severity" => Ok(SortKey::Severity),
        "date" | "recent" => Ok(SortKey::Date),
        other => anyhow::bail!("Unknown sort key '{other}' (expected severity, date, or none)"),
    }
}
