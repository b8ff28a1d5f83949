use super::IContributionRepo;
use pitchin_domain::{Contribution, ContributionStatus, PeriodKey, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresContributionRepo {
    pool: PgPool,
}

impl PostgresContributionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ContributionRaw {
    contribution_uid: Uuid,
    group_uid: Uuid,
    contributor_uid: Uuid,
    obligee_uid: Option<Uuid>,
    period: String,
    amount_minor: i64,
    currency: String,
    status: String,
}

impl ContributionRaw {
    fn into_domain(self) -> anyhow::Result<Contribution> {
        let period = self.period.parse::<PeriodKey>()?;
        let status = self.status.parse::<ContributionStatus>()?;
        Ok(Contribution {
            id: self.contribution_uid.into(),
            group_id: self.group_uid.into(),
            contributor_id: self.contributor_uid.into(),
            obligee_id: self.obligee_uid.map(|uid| uid.into()),
            period,
            amount_minor: self.amount_minor,
            currency: self.currency,
            status,
        })
    }
}

fn into_domain_or_log(raw: ContributionRaw) -> Option<Contribution> {
    match raw.into_domain() {
        Ok(contribution) => Some(contribution),
        Err(e) => {
            error!("Malformed contribution row: {:?}", e);
            None
        }
    }
}

#[async_trait::async_trait]
impl IContributionRepo for PostgresContributionRepo {
    async fn insert(&self, contribution: &Contribution) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO contributions
            (contribution_uid, group_uid, contributor_uid, obligee_uid, period, amount_minor, currency, status)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(contribution.id.inner_ref())
        .bind(contribution.group_id.inner_ref())
        .bind(contribution.contributor_id.inner_ref())
        .bind(contribution.obligee_id.as_ref().map(|id| *id.inner_ref()))
        .bind(contribution.period.to_string())
        .bind(contribution.amount_minor)
        .bind(&contribution.currency)
        .bind(contribution.status.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, contribution: &Contribution) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE contributions
            SET amount_minor = $2,
            currency = $3,
            status = $4
            WHERE contribution_uid = $1
            "#,
        )
        .bind(contribution.id.inner_ref())
        .bind(contribution.amount_minor)
        .bind(&contribution.currency)
        .bind(contribution.status.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, contribution_id: &ID) -> Option<Contribution> {
        sqlx::query_as::<_, ContributionRaw>(
            r#"
            DELETE FROM contributions AS c
            WHERE c.contribution_uid = $1
            RETURNING *
            "#,
        )
        .bind(contribution_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None)
        .and_then(into_domain_or_log)
    }

    async fn find(&self, contribution_id: &ID) -> Option<Contribution> {
        sqlx::query_as::<_, ContributionRaw>(
            r#"
            SELECT * FROM contributions AS c
            WHERE c.contribution_uid = $1
            "#,
        )
        .bind(contribution_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None)
        .and_then(into_domain_or_log)
    }

    async fn find_for_obligation(
        &self,
        group_id: &ID,
        obligee_id: Option<&ID>,
        contributor_id: &ID,
        period: &PeriodKey,
    ) -> Option<Contribution> {
        sqlx::query_as::<_, ContributionRaw>(
            r#"
            SELECT * FROM contributions AS c
            WHERE c.group_uid = $1
            AND c.obligee_uid IS NOT DISTINCT FROM $2
            AND c.contributor_uid = $3
            AND c.period = $4
            "#,
        )
        .bind(group_id.inner_ref())
        .bind(obligee_id.map(|id| *id.inner_ref()))
        .bind(contributor_id.inner_ref())
        .bind(period.to_string())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None)
        .and_then(into_domain_or_log)
    }
}
