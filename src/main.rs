use clap::Parser;
use miette::{IntoDiagnostic, Result};
use posreview::application::engine::ReviewEngine;
use posreview::domain::policy::{ApprovalPolicy, DEFAULT_MIN_APPROVALS};
use posreview::domain::ports::{PosStoreBox, ReviewStoreBox, UserStoreBox};
use posreview::domain::pos::PosId;
use posreview::infrastructure::in_memory::{
    InMemoryPosStore, InMemoryReviewStore, InMemoryUserStore,
};
use posreview::interfaces::csv::command_reader::{Command, CommandReader};
use posreview::interfaces::csv::review_writer::ReviewWriter;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input CSV file with review commands
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "POSREVIEW_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Number of approvals a review needs to become approved
    #[arg(long, env = "POSREVIEW_MIN_APPROVALS", default_value_t = DEFAULT_MIN_APPROVALS)]
    min_approvals: u32,

    /// Only output reviews of this POS
    #[arg(long, requires = "approved")]
    pos: Option<u64>,

    /// Approval status of the reviews to output
    #[arg(long, requires = "pos")]
    approved: Option<bool>,
}

struct Stores {
    reviews: ReviewStoreBox,
    users: UserStoreBox,
    pos: PosStoreBox,
}

fn in_memory_stores() -> Stores {
    Stores {
        reviews: Box::new(InMemoryReviewStore::new()),
        users: Box::new(InMemoryUserStore::new()),
        pos: Box::new(InMemoryPosStore::new()),
    }
}

#[cfg(feature = "storage-rocksdb")]
fn persistent_stores(db_path: &Path) -> Result<Stores> {
    use posreview::infrastructure::rocksdb::RocksDBStore;

    let store = RocksDBStore::open(db_path).into_diagnostic()?;
    info!(path = %db_path.display(), "Opened RocksDB storage");
    Ok(Stores {
        reviews: Box::new(store.clone()),
        users: Box::new(store.clone()),
        pos: Box::new(store),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn persistent_stores(db_path: &Path) -> Result<Stores> {
    warn!(
        path = %db_path.display(),
        "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
    );
    Ok(in_memory_stores())
}

async fn apply(engine: &ReviewEngine, command: Command) -> posreview::error::Result<()> {
    match command {
        Command::RegisterPos(pos) => engine.register_pos(pos).await,
        Command::RegisterUser(user) => engine.register_user(user).await,
        Command::Create(review) => engine.create(review).await.map(|_| ()),
        Command::Approve { review, user } => engine.approve(review, user).await.map(|_| ()),
        Command::Update { review, text } => engine.update(review, text).await.map(|_| ()),
        Command::Delete(id) => engine.delete(id).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "posreview=warn".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(false),
        )
        .init();

    let cli = Cli::parse();

    let policy = ApprovalPolicy::new(cli.min_approvals).into_diagnostic()?;
    let stores = match &cli.db_path {
        Some(db_path) => persistent_stores(db_path)?,
        None => in_memory_stores(),
    };
    let engine = ReviewEngine::new(stores.reviews, stores.users, stores.pos, policy);
    info!(min_approvals = policy.min_count(), "Review engine ready");

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for command in reader.commands() {
        match command {
            Ok(command) => {
                if let Err(e) = apply(&engine, command).await {
                    warn!(error = %e, "Error processing command");
                }
            }
            Err(e) => {
                warn!(error = %e, "Error reading command");
            }
        }
    }

    let reviews = match (cli.pos, cli.approved) {
        (Some(pos), Some(approved)) => engine.filter(PosId(pos), approved).await,
        _ => engine.get_all().await,
    }
    .into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = ReviewWriter::new(stdout.lock());
    writer.write_reviews(&reviews).into_diagnostic()?;

    Ok(())
}
