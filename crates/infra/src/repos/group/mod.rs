mod inmemory;
mod postgres;

pub use inmemory::InMemoryGroupRepo;
use pitchin_domain::{Group, ID};
pub use postgres::PostgresGroupRepo;

#[async_trait::async_trait]
pub trait IGroupRepo: Send + Sync {
    async fn insert(&self, group: &Group) -> anyhow::Result<()>;
    async fn save(&self, group: &Group) -> anyhow::Result<()>;
    async fn delete(&self, group_id: &ID) -> Option<Group>;
    async fn find(&self, group_id: &ID) -> Option<Group>;
}
