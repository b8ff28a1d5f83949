mod inmemory;
mod postgres;

pub use inmemory::InMemoryUserRepo;
use pitchin_domain::{User, ID};
pub use postgres::PostgresUserRepo;

#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> anyhow::Result<()>;
    async fn save(&self, user: &User) -> anyhow::Result<()>;
    async fn delete(&self, user_id: &ID) -> Option<User>;
    async fn find(&self, user_id: &ID) -> Option<User>;
    async fn find_many(&self, user_ids: &[ID]) -> Vec<User>;
    /// All verified, active users that reminder runs should visit
    async fn find_reminder_recipients(&self) -> Vec<User>;
}
