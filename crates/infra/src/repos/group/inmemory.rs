use super::IGroupRepo;
use crate::repos::shared::inmemory_repo::*;
use pitchin_domain::{Group, ID};

pub struct InMemoryGroupRepo {
    groups: std::sync::Mutex<Vec<Group>>,
}

impl InMemoryGroupRepo {
    pub fn new() -> Self {
        Self {
            groups: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IGroupRepo for InMemoryGroupRepo {
    async fn insert(&self, group: &Group) -> anyhow::Result<()> {
        insert(group, &self.groups);
        Ok(())
    }

    async fn save(&self, group: &Group) -> anyhow::Result<()> {
        save(group, &self.groups);
        Ok(())
    }

    async fn delete(&self, group_id: &ID) -> Option<Group> {
        delete(group_id, &self.groups)
    }

    async fn find(&self, group_id: &ID) -> Option<Group> {
        find(group_id, &self.groups)
    }
}
