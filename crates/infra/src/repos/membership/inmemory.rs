use super::IMembershipRepo;
use crate::repos::shared::inmemory_repo::*;
use pitchin_domain::{GroupMembership, ID};

pub struct InMemoryMembershipRepo {
    memberships: std::sync::Mutex<Vec<GroupMembership>>,
}

impl InMemoryMembershipRepo {
    pub fn new() -> Self {
        Self {
            memberships: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IMembershipRepo for InMemoryMembershipRepo {
    async fn insert(&self, membership: &GroupMembership) -> anyhow::Result<()> {
        insert(membership, &self.memberships);
        Ok(())
    }

    async fn delete(&self, membership_id: &ID) -> Option<GroupMembership> {
        delete(membership_id, &self.memberships)
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<GroupMembership> {
        find_by(&self.memberships, |m| m.user_id == *user_id)
    }

    async fn find_by_group(&self, group_id: &ID) -> Vec<GroupMembership> {
        find_by(&self.memberships, |m| m.group_id == *group_id)
    }
}
