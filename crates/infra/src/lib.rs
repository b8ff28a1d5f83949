mod config;
pub mod repos;
mod services;
mod system;

pub use config::Config;
pub use repos::Repos;
pub use services::{HttpMailerService, IMailerService, InMemoryMailerService, OutboundEmail};
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::ISys;
use system::RealSys;
use tracing::info;

#[derive(Clone)]
pub struct PitchinContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub mailer: Arc<dyn IMailerService>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl PitchinContext {
    async fn create(params: ContextParams) -> Self {
        let repos = Repos::create_postgres(&params.postgres_connection_string)
            .await
            .expect("Postgres credentials must be set and valid");
        let config = Config::new();
        let mailer: Arc<dyn IMailerService> =
            match (config.mailer_api_url.clone(), config.mailer_api_key.clone()) {
                (Some(api_url), Some(api_key)) => {
                    Arc::new(HttpMailerService::new(api_url, api_key))
                }
                _ => {
                    info!("No mail API configured, outbound emails are captured in memory only.");
                    Arc::new(InMemoryMailerService::new())
                }
            };
        Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            mailer,
        }
    }

    /// A context backed entirely by in-memory repositories and a
    /// capturing mailer. Used by tests.
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            mailer: Arc::new(InMemoryMailerService::new()),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> PitchinContext {
    PitchinContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string(),
    })
    .await
}

pub fn setup_context_inmemory() -> PitchinContext {
    PitchinContext::create_inmemory()
}

fn get_psql_connection_string() -> String {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .unwrap_or_else(|_| panic!("{} env var to be present.", PSQL_CONNECTION_STRING))
}

pub async fn run_migration() -> Result<(), MigrateError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&get_psql_connection_string())
        .await
        .expect("TO CONNECT TO POSTGRES");

    sqlx::migrate!().run(&pool).await
}
