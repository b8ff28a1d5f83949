pub mod contribution;
pub mod group;
pub mod membership;
pub mod notification;
mod shared;
pub mod user;

use contribution::{IContributionRepo, InMemoryContributionRepo, PostgresContributionRepo};
use group::{IGroupRepo, InMemoryGroupRepo, PostgresGroupRepo};
use membership::{IMembershipRepo, InMemoryMembershipRepo, PostgresMembershipRepo};
use notification::{INotificationRepo, InMemoryNotificationRepo, PostgresNotificationRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use user::{IUserRepo, InMemoryUserRepo, PostgresUserRepo};

#[derive(Clone)]
pub struct Repos {
    pub users: Arc<dyn IUserRepo>,
    pub groups: Arc<dyn IGroupRepo>,
    pub memberships: Arc<dyn IMembershipRepo>,
    pub contributions: Arc<dyn IContributionRepo>,
    pub notifications: Arc<dyn INotificationRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            users: Arc::new(PostgresUserRepo::new(pool.clone())),
            groups: Arc::new(PostgresGroupRepo::new(pool.clone())),
            memberships: Arc::new(PostgresMembershipRepo::new(pool.clone())),
            contributions: Arc::new(PostgresContributionRepo::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepo::new()),
            groups: Arc::new(InMemoryGroupRepo::new()),
            memberships: Arc::new(InMemoryMembershipRepo::new()),
            contributions: Arc::new(InMemoryContributionRepo::new()),
            notifications: Arc::new(InMemoryNotificationRepo::new()),
        }
    }
}
