use almox_api::client::DEFAULT_HISTORY_LIMIT;
use almox_api::TransactionKind;
use almox_core::{AppContext, Config, ConfiguredAuthenticator, SessionStore};
use clap::Parser;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "almox")]
#[command(version, about = "Terminal client for the stock checkout service", long_about = None)]
struct Cli {
    /// Backend base URL, e.g. http://estoque.local:8000/api
    #[arg(long, global = true, env = "ALMOX_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List every item
    Items,
    /// Search items on the server
    Search {
        /// Shorter than two characters finds nothing
        query: String,
    },
    /// Show one item in detail
    Show { id: i64 },
    /// Take units out of stock
    Withdraw {
        id: i64,
        quantity: u32,
        /// Who is taking it (defaults to the remembered name)
        #[arg(long)]
        name: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Put units back into stock
    Return {
        id: i64,
        quantity: u32,
        /// Who is returning it (defaults to the remembered name)
        #[arg(long)]
        name: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Recent transactions, newest first
    History {
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
        /// Only this item
        #[arg(long)]
        item: Option<i64>,
    },
    /// Units currently checked out
    InUse,
    /// Pull the spreadsheet into the backend
    Sync,
    /// Check that the backend answers
    Health,
    /// Show or change Slack notifications
    Slack {
        #[arg(long, conflicts_with = "disable")]
        enable: bool,
        #[arg(long)]
        disable: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so its logs go to a file
    if cli.command.is_none() {
        init_file_logging()?;
    } else {
        init_stderr_logging();
    }

    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    tracing::debug!("Using backend at {}", config.api.base_url);

    match cli.command {
        None => run_tui(config).await,
        Some(Commands::Items) => commands::items(&config.build_client()?).await,
        Some(Commands::Search { query }) => {
            commands::search(&config.build_client()?, &query).await
        }
        Some(Commands::Show { id }) => commands::show(&config.build_client()?, id).await,
        Some(Commands::Withdraw {
            id,
            quantity,
            name,
            yes,
        }) => {
            let client = config.build_client()?;
            commands::transact(&client, TransactionKind::Retirada, id, quantity, name, yes).await
        }
        Some(Commands::Return {
            id,
            quantity,
            name,
            yes,
        }) => {
            let client = config.build_client()?;
            commands::transact(&client, TransactionKind::Devolucao, id, quantity, name, yes).await
        }
        Some(Commands::History { limit, item }) => {
            commands::history(&config.build_client()?, limit, item).await
        }
        Some(Commands::InUse) => commands::in_use(&config.build_client()?).await,
        Some(Commands::Sync) => commands::sync(&config.build_client()?).await,
        Some(Commands::Health) => commands::health(&config.build_client()?).await,
        Some(Commands::Slack { enable, disable }) => {
            let toggle = match (enable, disable) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            commands::slack(&config.build_client()?, toggle).await
        }
    }
}

async fn run_tui(config: Config) -> anyhow::Result<()> {
    let client = config.build_client()?;

    let session = SessionStore::load().unwrap_or_else(|e| {
        tracing::warn!("Could not load session, starting fresh: {}", e);
        SessionStore::in_memory()
    });

    let authenticator = ConfiguredAuthenticator::new(&config.auth);
    if !authenticator.is_configured() {
        tracing::info!("No admin credentials configured; admin pages stay locked");
    }

    let ctx = AppContext::new(
        Arc::new(client),
        Arc::new(authenticator),
        config.timing.clone(),
        session,
    );

    almox_tui::run_tui(almox_tui::App::new(ctx)).await
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "almox=info".into())
}

fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn init_file_logging() -> anyhow::Result<()> {
    let dir = Config::data_dir()?;
    std::fs::create_dir_all(&dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("almox.log"))?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}
