mod inmemory;
mod postgres;

pub use inmemory::InMemoryMembershipRepo;
use pitchin_domain::{GroupMembership, ID};
pub use postgres::PostgresMembershipRepo;

#[async_trait::async_trait]
pub trait IMembershipRepo: Send + Sync {
    async fn insert(&self, membership: &GroupMembership) -> anyhow::Result<()>;
    async fn delete(&self, membership_id: &ID) -> Option<GroupMembership>;
    /// Memberships for a user, in the order they were created. The
    /// reminder digest preserves this order.
    async fn find_by_user(&self, user_id: &ID) -> Vec<GroupMembership>;
    async fn find_by_group(&self, group_id: &ID) -> Vec<GroupMembership>;
}
