use super::IContributionRepo;
use crate::repos::shared::inmemory_repo::*;
use pitchin_domain::{Contribution, PeriodKey, ID};

pub struct InMemoryContributionRepo {
    contributions: std::sync::Mutex<Vec<Contribution>>,
}

impl InMemoryContributionRepo {
    pub fn new() -> Self {
        Self {
            contributions: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IContributionRepo for InMemoryContributionRepo {
    async fn insert(&self, contribution: &Contribution) -> anyhow::Result<()> {
        insert(contribution, &self.contributions);
        Ok(())
    }

    async fn save(&self, contribution: &Contribution) -> anyhow::Result<()> {
        save(contribution, &self.contributions);
        Ok(())
    }

    async fn delete(&self, contribution_id: &ID) -> Option<Contribution> {
        delete(contribution_id, &self.contributions)
    }

    async fn find(&self, contribution_id: &ID) -> Option<Contribution> {
        find(contribution_id, &self.contributions)
    }

    async fn find_for_obligation(
        &self,
        group_id: &ID,
        obligee_id: Option<&ID>,
        contributor_id: &ID,
        period: &PeriodKey,
    ) -> Option<Contribution> {
        find_by(&self.contributions, |c| {
            c.group_id == *group_id
                && c.obligee_id.as_ref() == obligee_id
                && c.contributor_id == *contributor_id
                && c.period == *period
        })
        .into_iter()
        .next()
    }
}
