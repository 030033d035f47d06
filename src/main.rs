use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use freightdesk::api::types::{ShipmentStatus, UserRole};
use freightdesk::api::HttpResourceClient;
use freightdesk::cache::{
  ApplicationCache, CollectionKind, Intent, PersistedSnapshot, Remotes, SNAPSHOT_KEY,
};
use freightdesk::config::{self, Config};
use freightdesk::logging;
use freightdesk::session::{CredentialStore, SessionGate, StoredCredentials};
use freightdesk::store::{DurableStore, SqliteBackend};

#[derive(Parser, Debug)]
#[command(name = "freightdesk")]
#[command(about = "Cached access to the freight platform's shipments and users")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/freightdesk/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Keep the cache in memory only for this run
  #[arg(long)]
  no_persist: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Store an API token and load both collections
  Login {
    /// Token to use (default: FREIGHTDESK_API_TOKEN)
    token: Option<String>,
  },
  /// Forget the token and clear the cache
  Logout,
  /// Print a cached collection, fetching it if the cache is empty
  List {
    #[arg(value_enum)]
    collection: Collection,
    /// Only shipments with this status
    #[arg(long)]
    status: Option<ShipmentStatus>,
    /// Only users with this role
    #[arg(long)]
    role: Option<UserRole>,
    /// Only approved (true) or pending (false) users
    #[arg(long)]
    approved: Option<bool>,
    /// Case-insensitive text search
    #[arg(long)]
    search: Option<String>,
  },
  /// Re-fetch both collections
  Refresh,
  /// Show session and cache state
  Status,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Collection {
  Shipments,
  Users,
}

impl From<Collection> for CollectionKind {
  fn from(collection: Collection) -> Self {
    match collection {
      Collection::Shipments => CollectionKind::Shipments,
      Collection::Users => CollectionKind::Users,
    }
  }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(&config::data_dir()?.join("logs"))?;

  let store = open_store(&config, args.no_persist)?;
  let credentials: Arc<dyn CredentialStore> = Arc::new(StoredCredentials::new(store.clone()));
  let http = Arc::new(HttpResourceClient::new(&config.api, Arc::clone(&credentials))?);
  let remotes = Remotes::new(http.clone(), http);
  let gate = SessionGate::new(credentials);

  // Only listing refreshes on its own; other commands decide explicitly
  let active = matches!(args.command, Command::List { .. }) && gate.is_authenticated();
  let mut cache = ApplicationCache::initialize(store.clone(), remotes, active);

  match args.command {
    Command::Login { token } => {
      let token = token
        .or_else(Config::env_api_token)
        .ok_or_else(|| eyre!("No token given. Pass one or set FREIGHTDESK_API_TOKEN."))?;
      gate.login(&token, &mut cache)?;
      cache.wait_idle().await;
      print_summary(&cache);
    }
    Command::Logout => {
      gate.logout(&mut cache);
      println!("Logged out, cache cleared.");
    }
    Command::List {
      collection,
      status,
      role,
      approved,
      search,
    } => {
      match collection {
        Collection::Shipments => cache.dispatch(Intent::filter(
          CollectionKind::Shipments,
          json!({ "status": status, "search": search }),
        )),
        Collection::Users => cache.dispatch(Intent::filter(
          CollectionKind::Users,
          json!({ "role": role, "approved": approved, "search": search }),
        )),
      }
      if !gate.is_authenticated() {
        eprintln!("Not logged in, showing cached data only.");
      }
      cache.wait_idle().await;
      print_collection(&cache, collection.into());
    }
    Command::Refresh => {
      if !gate.is_authenticated() {
        return Err(eyre!("Not logged in. Run `freightdesk login` first."));
      }
      for kind in CollectionKind::ALL {
        cache.refresh(kind);
      }
      cache.wait_idle().await;
      print_summary(&cache);
    }
    Command::Status => {
      println!(
        "session:   {}",
        if gate.is_authenticated() {
          "logged in"
        } else {
          "logged out"
        }
      );
      match store.read(SNAPSHOT_KEY).and_then(|raw| PersistedSnapshot::decode(&raw)) {
        Some(snapshot) => {
          let written = chrono::DateTime::from_timestamp_millis(snapshot.timestamp)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string());
          println!("snapshot:  written {}", written);
        }
        None => println!("snapshot:  none"),
      }
      print_summary(&cache);
    }
  }

  Ok(())
}

fn open_store(config: &Config, no_persist: bool) -> Result<DurableStore> {
  if no_persist || !config.cache.persist {
    return Ok(DurableStore::in_memory());
  }
  let backend = match &config.cache.path {
    Some(path) => SqliteBackend::open_at(path)?,
    None => SqliteBackend::open()?,
  };
  Ok(DurableStore::new(backend))
}

fn print_summary(cache: &ApplicationCache) {
  println!("shipments: {}", cache.shipments().len());
  println!("users:     {}", cache.users().len());
  for kind in CollectionKind::ALL {
    if let Some(error) = cache.state().error(kind) {
      println!("{} refresh failed: {}", kind, error);
    }
  }
}

fn print_collection(cache: &ApplicationCache, kind: CollectionKind) {
  match kind {
    CollectionKind::Shipments => {
      for shipment in cache.visible_shipments() {
        let field = |key: &str| shipment.detail_text(key).unwrap_or_else(|| "-".to_string());
        println!(
          "{:>8}  {:<10}  customer={}  broker={}  driver={}",
          shipment.id,
          shipment.status,
          field("customer"),
          field("broker"),
          field("driver"),
        );
      }
    }
    CollectionKind::Users => {
      for user in cache.visible_users() {
        println!(
          "{:>8}  {:<8}  {:<8}  {}  {}",
          user.id,
          user.role,
          if user.is_approved { "approved" } else { "pending" },
          user.name.as_deref().unwrap_or("-"),
          user.email.as_deref().unwrap_or("-"),
        );
      }
    }
  }

  if let Some(error) = cache.state().error(kind) {
    eprintln!("Refresh failed, data may be stale: {}", error);
  }
}
