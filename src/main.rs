use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use propdesk::entity::{
    Blog, BlogCategory, Destination, FeeTax, FileEntry, FoodMenu, Room, RoomCategory, RoomRate,
};
use propdesk::{DeskConfig, HttpCrudClient, ListController, ListQuery, PageCatalog, Resource};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "propdesk", about = "Property-management dashboard console")]
struct Cli {
    /// API root, optionally with a token: http(s)://[token@]host[:port]/path.
    /// Falls back to PROPDESK_BASE_URL.
    #[arg(long, global = true)]
    url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every guarded page with its required permissions
    Pages,
    /// Fetch one page of a collection
    List {
        kind: Kind,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
    },
    /// Delete one or more records
    Delete {
        kind: Kind,
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Rooms,
    RoomCategories,
    RoomRates,
    FoodMenus,
    Blogs,
    BlogCategories,
    Destinations,
    FeesTaxes,
    Files,
}

macro_rules! dispatch {
    ($kind:expr, $run:ident ( $($arg:expr),* )) => {
        match $kind {
            Kind::Rooms => $run::<Room>($($arg),*).await,
            Kind::RoomCategories => $run::<RoomCategory>($($arg),*).await,
            Kind::RoomRates => $run::<RoomRate>($($arg),*).await,
            Kind::FoodMenus => $run::<FoodMenu>($($arg),*).await,
            Kind::Blogs => $run::<Blog>($($arg),*).await,
            Kind::BlogCategories => $run::<BlogCategory>($($arg),*).await,
            Kind::Destinations => $run::<Destination>($($arg),*).await,
            Kind::FeesTaxes => $run::<FeeTax>($($arg),*).await,
            Kind::Files => $run::<FileEntry>($($arg),*).await,
        }
    };
}

fn load_config(cli: &Cli) -> anyhow::Result<DeskConfig> {
    let mut config = match &cli.url {
        Some(url) => DeskConfig::from_url(url).map_err(anyhow::Error::msg)?,
        None => DeskConfig::from_env().map_err(anyhow::Error::msg)?,
    };
    if let Some(secs) = cli.timeout {
        config = config.request_timeout(Duration::from_secs(secs));
    }
    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

async fn list<R: Resource>(config: &DeskConfig, page: u32, size: Option<u32>) -> anyhow::Result<()> {
    let client = HttpCrudClient::<R>::new(config)?;
    let mut controller = ListController::from_config(client, config);
    let query = ListQuery::new(page, config.page_size(size));
    let snapshot = controller
        .load(query)
        .await
        .with_context(|| format!("listing {}", R::KIND))?;

    println!("{}", serde_json::to_string_pretty(&snapshot.to_vec())?);
    println!(
        "page {}/{} ({} total)",
        query.page,
        controller.page_count(),
        snapshot.total_count()
    );
    Ok(())
}

async fn delete<R: Resource>(config: &DeskConfig, ids: Vec<String>) -> anyhow::Result<()> {
    let client = HttpCrudClient::<R>::new(config)?;
    let mut controller = ListController::from_config(client, config);
    let outcome = match ids.as_slice() {
        [] => bail!("no ids given"),
        [id] => controller.delete(id).await,
        many => controller.delete_many(many).await,
    };
    outcome.with_context(|| format!("deleting from {}", R::KIND))?;

    info!(kind = R::KIND, count = ids.len(), "delete finished");
    println!("deleted {} record(s) from {}", ids.len(), R::KIND);
    Ok(())
}

fn print_pages() {
    for route in PageCatalog::dashboard().routes() {
        let required: Vec<&str> = route.required.iter().map(|p| p.as_str()).collect();
        let required = if required.is_empty() {
            "-".to_string()
        } else {
            required.join(",")
        };
        println!("{:<32} {:<28} -> {}", route.path, required, route.redirect);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Pages => {
            print_pages();
            Ok(())
        }
        Command::List { kind, page, size } => {
            let config = load_config(&cli)?;
            dispatch!(*kind, list(&config, *page, *size))
        }
        Command::Delete { kind, ids } => {
            let config = load_config(&cli)?;
            dispatch!(*kind, delete(&config, ids.clone()))
        }
    }
}
