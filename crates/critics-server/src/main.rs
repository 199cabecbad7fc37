//! Critics Server
//!
//! HTTP front end for the board registries: one POST route per operation,
//! bearer-token verification, and a choice of in-memory or SQLite storage.

mod config;
mod error;
mod extractors;
mod handlers;
mod services;
mod storage;

use anyhow::{bail, Context, Result};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use clap::{Parser, Subcommand};
use critics_core::{MemoryStore, Registries, Store, StorePath, WriteOp};
use serde_json::Value;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::{Settings, StoreBackend};
use extractors::require_auth;
use services::AuthService;
use storage::{MemoryCache, SqliteStore};

/// Collections a seed file may contain
const SEED_COLLECTIONS: [&str; 4] = ["users", "boards", "categories", "restaurants"];

#[derive(Parser)]
#[command(name = "critics-server", version, about = "Restaurant board registry server")]
struct Cli {
    /// Configuration file (default: critics.toml)
    #[arg(short, long, global = true, env = "CRITICS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Load a JSON tree into the configured store in one commit
    Seed {
        /// JSON file with top-level `users`, `boards`, `categories`, `restaurants`
        file: PathBuf,
    },
    /// Print a bearer token signed with the configured secret
    Token {
        uid: String,
        #[arg(long)]
        email: Option<String>,
        /// Validity in hours
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registries: Registries,
    pub auth_service: Arc<AuthService>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, settings: Settings) -> Self {
        let cache = Arc::new(MemoryCache::new());
        let auth_service = Arc::new(AuthService::new(
            settings.auth.jwt_secret(),
            cache,
            settings.auth.token_cache_ttl(),
        ));

        Self {
            registries: Registries::new(store),
            auth_service,
            settings: Arc::new(settings),
        }
    }
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        eprintln!("[PANIC] at {:?}: {}", location, info);
        tracing::error!("PANIC at {:?}: {}", location, info);
    }));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("critics_server=info,critics_core=info,tower_http=info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("Failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(settings).await,
        Command::Seed { file } => {
            if settings.store.backend == StoreBackend::Memory {
                warn!("Seeding the memory backend; the data is gone when this process exits");
            }
            let store = open_store(&settings).await?;
            seed(store.as_ref(), &file).await
        }
        Command::Token { uid, email, hours } => {
            let auth = AuthService::new(
                settings.auth.jwt_secret(),
                Arc::new(MemoryCache::new()),
                settings.auth.token_cache_ttl(),
            );
            let token = auth.issue_token(&uid, email.as_deref(), chrono::Duration::hours(hours))?;
            println!("{token}");
            Ok(())
        }
    }
}

async fn run_server(settings: Settings) -> Result<()> {
    info!("Starting Critics Server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Config loaded: bind={}, backend={:?}, require_auth={}",
        settings.bind_address, settings.store.backend, settings.auth.require_auth
    );

    let store = open_store(&settings).await?;

    let addr: SocketAddr = settings
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    let app = build_router(AppState::new(store, settings));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

async fn open_store(settings: &Settings) -> Result<Arc<dyn Store>> {
    match settings.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Sqlite => {
            let store = SqliteStore::open(&settings.store.database_path)
                .await
                .context("Failed to initialize database")?;
            Ok(Arc::new(store))
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let mut api = api_routes();
    if state.settings.auth.require_auth {
        api = api.route_layer(middleware::from_fn_with_state(state.clone(), require_auth));
    }

    Router::new()
        .route("/health", get(handlers::health))
        .route("/verifyToken", post(handlers::auth::verify_token))
        .merge(api)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    use handlers::{boards, categories, restaurants, users};

    Router::new()
        // Users
        .route("/createUser", post(users::create_user))
        .route("/getUser", post(users::get_user))
        .route("/getUserBoards", post(users::get_user_boards))
        .route("/updateUserBoards", post(users::update_user_boards))
        .route("/deleteUser", post(users::delete_user))
        .route("/removeUserFromBoard", post(users::remove_user_from_board))
        .route("/addBoardToUser", post(users::add_board_to_user))
        .route("/removeBoardFromUser", post(users::remove_board_from_user))
        // Boards
        .route("/createBoard", post(boards::create_board))
        .route("/editBoardName", post(boards::edit_board_name))
        .route("/getBoardData", post(boards::get_board_data))
        .route("/addUserToBoard", post(boards::add_user_to_board))
        .route("/linkCategoryToBoard", post(boards::link_category_to_board))
        .route("/unlinkCategoryFromBoard", post(boards::unlink_category_from_board))
        .route("/deleteBoard", post(boards::delete_board))
        // Categories
        .route("/createCategory", post(categories::create_category))
        .route("/editCategory", post(categories::edit_category))
        .route("/getCategory", post(categories::get_category))
        .route("/addRestaurantToCategory", post(categories::add_restaurant_to_category))
        .route(
            "/removeRestaurantFromCategory",
            post(categories::remove_restaurant_from_category),
        )
        .route("/deleteCategory", post(categories::delete_category))
        // Restaurants
        .route("/createRestaurant", post(restaurants::create_restaurant))
        .route("/getRestaurant", post(restaurants::get_restaurant))
        .route("/editRating", post(restaurants::edit_rating))
        .route("/editNotes", post(restaurants::edit_notes))
        .route("/addVisit", post(restaurants::add_visit))
        .route("/deleteVisit", post(restaurants::delete_visit))
        .route("/editDishRanking", post(restaurants::edit_dish_ranking))
        .route("/addDish", post(restaurants::add_dish))
        .route("/deleteDish", post(restaurants::delete_dish))
        .route(
            "/switchRestaurantCategory",
            post(restaurants::switch_restaurant_category),
        )
        .route("/deleteRestaurant", post(restaurants::delete_restaurant))
}

/// Write every record of a seed file through one commit.
async fn seed(store: &dyn Store, file: &Path) -> Result<()> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read seed file {}", file.display()))?;
    let ops = seed_ops(serde_json::from_str(&raw).context("Seed file is not valid JSON")?)?;

    let count = ops.len();
    store.commit(ops).await.context("Failed to write seed data")?;
    info!("Seeded {} records from {}", count, file.display());
    Ok(())
}

fn seed_ops(tree: Value) -> Result<Vec<WriteOp>> {
    let Value::Object(collections) = tree else {
        bail!("Seed file must contain a JSON object");
    };

    let mut ops = Vec::new();
    for (collection, records) in collections {
        if !SEED_COLLECTIONS.contains(&collection.as_str()) {
            bail!("Unknown collection `{collection}` in seed file");
        }
        let Value::Object(records) = records else {
            bail!("Collection `{collection}` must be an object keyed by id");
        };
        for (id, value) in records {
            let path = StorePath::parse(&collection)?.child(&id)?;
            ops.push(WriteOp::Set { path, value });
        }
    }
    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn seed_tree_lands_in_one_commit() {
        let ops = seed_ops(json!({
            "users": {"u1": {"name": "Ana", "boards": ["b1"]}},
            "boards": {"b1": {"name": "Lunch", "members": ["u1"], "owner": "u1"}}
        }))
        .unwrap();
        assert_eq!(ops.len(), 2);

        let store = MemoryStore::new();
        store.commit(ops).await.unwrap();
        let registries = Registries::new(Arc::new(store));
        assert_eq!(registries.users.get_user_boards("u1").await.unwrap(), ["b1"]);
    }

    #[test]
    fn seed_rejects_unknown_collections() {
        assert!(seed_ops(json!({"dishes": {}})).is_err());
        assert!(seed_ops(json!(["users"])).is_err());
        assert!(seed_ops(json!({"users": {"bad/id": {}}})).is_err());
    }
}
