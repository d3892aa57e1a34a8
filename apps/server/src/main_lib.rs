use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::{
    auth::{decode_secret_key, AuthConfig, AuthManager},
    config::{Config, VENDOR_TOKEN_VAR, VENDOR_URL_VAR},
};
use ambitions_core::{
    errors::{Error, Result},
    goals::{GoalRepositoryTrait, GoalService, GoalServiceTrait},
    sources::{
        create_repository_with, DataSource, RepositoryRegistry, DEFAULT_DATA_SOURCE,
        GOALS_SOURCE_VAR, USERS_SOURCE_VAR,
    },
    users::{UserRepositoryTrait, UserService, UserServiceTrait},
};
use ambitions_storage_memory::{MemoryGoalRepository, MemoryStore, MemoryUserRepository};
use ambitions_storage_sqlite::{
    create_pool, goals::GoalRepository, init, run_migrations, spawn_writer, users::UserRepository,
    DbPool, WriteHandle,
};
use ambitions_vendor::{VendorApiClient, VendorGoalRepository, VendorUserRepository};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

pub struct AppState {
    pub goal_service: Arc<dyn GoalServiceTrait + Send + Sync>,
    pub user_service: Arc<dyn UserServiceTrait + Send + Sync>,
    pub auth: Option<Arc<AuthManager>>,
}

pub fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Backing stores, built on first use and shared by both repository
/// families. Only the sources actually selected get initialized.
struct Backends {
    db_path: String,
    vendor_url: Option<String>,
    vendor_token: Option<String>,
    sqlite: OnceLock<(Arc<DbPool>, WriteHandle)>,
    memory: OnceLock<Arc<MemoryStore>>,
}

impl Backends {
    fn new(config: &Config) -> Self {
        Self {
            db_path: config.db_path.clone(),
            vendor_url: config.vendor_url.clone(),
            vendor_token: config.vendor_token.clone(),
            sqlite: OnceLock::new(),
            memory: OnceLock::new(),
        }
    }

    fn sqlite(&self) -> Result<(Arc<DbPool>, WriteHandle)> {
        if let Some((pool, writer)) = self.sqlite.get() {
            return Ok((pool.clone(), writer.clone()));
        }
        let db_path = init(&self.db_path)?;
        tracing::info!("Database path in use: {}", db_path);
        let pool = create_pool(&db_path)?;
        run_migrations(&pool)?;
        let writer = spawn_writer((*pool).clone());
        Ok(self.sqlite.get_or_init(|| (pool, writer)).clone())
    }

    fn memory(&self) -> Result<Arc<MemoryStore>> {
        if let Some(store) = self.memory.get() {
            return Ok(store.clone());
        }
        let store = MemoryStore::seeded()?;
        tracing::info!("Using in-memory mock data");
        Ok(self.memory.get_or_init(|| store).clone())
    }

    fn vendor(&self) -> Result<VendorApiClient> {
        let url = self
            .vendor_url
            .as_deref()
            .ok_or_else(|| Error::MissingConfigKey(VENDOR_URL_VAR.to_string()))?;
        let token = self
            .vendor_token
            .as_deref()
            .ok_or_else(|| Error::MissingConfigKey(VENDOR_TOKEN_VAR.to_string()))?;
        VendorApiClient::new(url, token)
    }
}

fn goal_registry(backends: &Arc<Backends>) -> RepositoryRegistry<dyn GoalRepositoryTrait> {
    let (sqlite, vendor, mock) = (backends.clone(), backends.clone(), backends.clone());
    RepositoryRegistry::new()
        .register(DataSource::Sqlite.key(), move || {
            let (pool, writer) = sqlite.sqlite()?;
            Ok(Arc::new(GoalRepository::new(pool, writer)) as Arc<dyn GoalRepositoryTrait>)
        })
        .register(DataSource::Vendor.key(), move || {
            Ok(Arc::new(VendorGoalRepository::new(vendor.vendor()?)) as Arc<dyn GoalRepositoryTrait>)
        })
        .register(DataSource::Mock.key(), move || {
            Ok(Arc::new(MemoryGoalRepository::new(mock.memory()?)) as Arc<dyn GoalRepositoryTrait>)
        })
}

fn user_registry(backends: &Arc<Backends>) -> RepositoryRegistry<dyn UserRepositoryTrait> {
    let (sqlite, vendor, mock) = (backends.clone(), backends.clone(), backends.clone());
    RepositoryRegistry::new()
        .register(DataSource::Sqlite.key(), move || {
            let (pool, _) = sqlite.sqlite()?;
            Ok(Arc::new(UserRepository::new(pool)) as Arc<dyn UserRepositoryTrait>)
        })
        .register(DataSource::Vendor.key(), move || {
            Ok(Arc::new(VendorUserRepository::new(vendor.vendor()?)) as Arc<dyn UserRepositoryTrait>)
        })
        .register(DataSource::Mock.key(), move || {
            Ok(Arc::new(MemoryUserRepository::new(mock.memory()?)) as Arc<dyn UserRepositoryTrait>)
        })
}

/// Configured source for `variable`. Known sources are matched leniently;
/// anything else is passed through for the registry to reject.
fn source_key(config: &Config, variable: &str) -> Option<String> {
    config.source(variable).map(|raw| match raw.parse::<DataSource>() {
        Ok(source) => source.key().to_string(),
        Err(_) => raw,
    })
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let backends = Arc::new(Backends::new(config));
    let default_key = Some(DEFAULT_DATA_SOURCE.key());

    let goal_repository = create_repository_with(
        &goal_registry(&backends),
        GOALS_SOURCE_VAR,
        default_key,
        |var| source_key(config, var),
    )?;
    let user_repository = create_repository_with(
        &user_registry(&backends),
        USERS_SOURCE_VAR,
        default_key,
        |var| source_key(config, var),
    )?;

    let user_service = Arc::new(UserService::new(user_repository));
    let goal_service = Arc::new(GoalService::new(goal_repository, user_service.clone()));

    let auth = match config.jwt_secret.as_deref() {
        Some(raw) => Some(Arc::new(AuthManager::new(&AuthConfig {
            jwt_secret: decode_secret_key(raw)?,
            access_token_ttl: ACCESS_TOKEN_TTL,
        }))),
        None => {
            tracing::warn!("AMB_JWT_SECRET is not set; authenticated routes will answer 401");
            None
        }
    };

    Ok(Arc::new(AppState {
        goal_service,
        user_service,
        auth,
    }))
}
