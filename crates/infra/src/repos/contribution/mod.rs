mod inmemory;
mod postgres;

pub use inmemory::InMemoryContributionRepo;
use pitchin_domain::{Contribution, PeriodKey, ID};
pub use postgres::PostgresContributionRepo;

#[async_trait::async_trait]
pub trait IContributionRepo: Send + Sync {
    async fn insert(&self, contribution: &Contribution) -> anyhow::Result<()>;
    async fn save(&self, contribution: &Contribution) -> anyhow::Result<()>;
    async fn delete(&self, contribution_id: &ID) -> Option<Contribution>;
    async fn find(&self, contribution_id: &ID) -> Option<Contribution>;
    /// The at-most-one contribution record matching an obligation's
    /// (group, obligee, contributor, period) key
    async fn find_for_obligation(
        &self,
        group_id: &ID,
        obligee_id: Option<&ID>,
        contributor_id: &ID,
        period: &PeriodKey,
    ) -> Option<Contribution>;
}

#[cfg(test)]
mod tests {
    use crate::setup_context_inmemory;
    use pitchin_domain::{Contribution, PeriodKey, ID};

    #[tokio::test]
    async fn obligation_lookup_matches_on_the_full_key() {
        let ctx = setup_context_inmemory();

        let group_id = ID::new();
        let contributor_id = ID::new();
        let obligee_id = ID::new();

        let contribution = Contribution::new(
            group_id.clone(),
            contributor_id.clone(),
            Some(obligee_id.clone()),
            PeriodKey::Year(2024),
            2500,
            "EUR".into(),
        );
        ctx.repos.contributions.insert(&contribution).await.unwrap();

        let found = ctx
            .repos
            .contributions
            .find_for_obligation(
                &group_id,
                Some(&obligee_id),
                &contributor_id,
                &PeriodKey::Year(2024),
            )
            .await;
        assert_eq!(found, Some(contribution));

        // A different year is a different obligation
        let found = ctx
            .repos
            .contributions
            .find_for_obligation(
                &group_id,
                Some(&obligee_id),
                &contributor_id,
                &PeriodKey::Year(2023),
            )
            .await;
        assert!(found.is_none());

        // Group-level obligations never match celebrant-level records
        let found = ctx
            .repos
            .contributions
            .find_for_obligation(&group_id, None, &contributor_id, &PeriodKey::Year(2024))
            .await;
        assert!(found.is_none());
    }
}
