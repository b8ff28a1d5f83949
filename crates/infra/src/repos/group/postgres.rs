use super::IGroupRepo;
use pitchin_domain::{Group, GroupKind, GroupStatus, ID};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};
use tracing::error;

pub struct PostgresGroupRepo {
    pool: PgPool,
}

impl PostgresGroupRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct GroupRaw {
    group_uid: Uuid,
    name: String,
    kind: Json<GroupKind>,
    amount_minor: i64,
    currency: String,
    closed: bool,
}

impl From<GroupRaw> for Group {
    fn from(raw: GroupRaw) -> Self {
        Group {
            id: raw.group_uid.into(),
            name: raw.name,
            kind: raw.kind.0,
            amount_minor: raw.amount_minor,
            currency: raw.currency,
            status: if raw.closed {
                GroupStatus::Closed
            } else {
                GroupStatus::Active
            },
        }
    }
}

#[async_trait::async_trait]
impl IGroupRepo for PostgresGroupRepo {
    async fn insert(&self, group: &Group) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO groups(group_uid, name, kind, amount_minor, currency, closed)
            VALUES($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(group.id.inner_ref())
        .bind(&group.name)
        .bind(Json(&group.kind))
        .bind(group.amount_minor)
        .bind(&group.currency)
        .bind(group.status == GroupStatus::Closed)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, group: &Group) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE groups
            SET name = $2,
            kind = $3,
            amount_minor = $4,
            currency = $5,
            closed = $6
            WHERE group_uid = $1
            "#,
        )
        .bind(group.id.inner_ref())
        .bind(&group.name)
        .bind(Json(&group.kind))
        .bind(group.amount_minor)
        .bind(&group.currency)
        .bind(group.status == GroupStatus::Closed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, group_id: &ID) -> Option<Group> {
        sqlx::query_as::<_, GroupRaw>(
            r#"
            DELETE FROM groups AS g
            WHERE g.group_uid = $1
            RETURNING *
            "#,
        )
        .bind(group_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None)
        .map(|group| group.into())
    }

    async fn find(&self, group_id: &ID) -> Option<Group> {
        match sqlx::query_as::<_, GroupRaw>(
            r#"
            SELECT * FROM groups AS g
            WHERE g.group_uid = $1
            "#,
        )
        .bind(group_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        {
            Ok(group) => group.map(|group| group.into()),
            Err(e) => {
                error!("Unable to find group: {:?}. Error: {:?}", group_id, e);
                None
            }
        }
    }
}
