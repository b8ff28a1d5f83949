use super::IMembershipRepo;
use pitchin_domain::{GroupMembership, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresMembershipRepo {
    pool: PgPool,
}

impl PostgresMembershipRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MembershipRaw {
    membership_uid: Uuid,
    group_uid: Uuid,
    user_uid: Uuid,
    joined_at: chrono::NaiveDate,
}

impl From<MembershipRaw> for GroupMembership {
    fn from(raw: MembershipRaw) -> Self {
        GroupMembership {
            id: raw.membership_uid.into(),
            group_id: raw.group_uid.into(),
            user_id: raw.user_uid.into(),
            joined_at: raw.joined_at,
        }
    }
}

#[async_trait::async_trait]
impl IMembershipRepo for PostgresMembershipRepo {
    async fn insert(&self, membership: &GroupMembership) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO group_memberships(membership_uid, group_uid, user_uid, joined_at)
            VALUES($1, $2, $3, $4)
            "#,
        )
        .bind(membership.id.inner_ref())
        .bind(membership.group_id.inner_ref())
        .bind(membership.user_id.inner_ref())
        .bind(membership.joined_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, membership_id: &ID) -> Option<GroupMembership> {
        sqlx::query_as::<_, MembershipRaw>(
            r#"
            DELETE FROM group_memberships AS m
            WHERE m.membership_uid = $1
            RETURNING *
            "#,
        )
        .bind(membership_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None)
        .map(|membership| membership.into())
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<GroupMembership> {
        sqlx::query_as::<_, MembershipRaw>(
            r#"
            SELECT * FROM group_memberships AS m
            WHERE m.user_uid = $1
            ORDER BY m.created_at
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|membership| membership.into())
        .collect()
    }

    async fn find_by_group(&self, group_id: &ID) -> Vec<GroupMembership> {
        sqlx::query_as::<_, MembershipRaw>(
            r#"
            SELECT * FROM group_memberships AS m
            WHERE m.group_uid = $1
            ORDER BY m.created_at
            "#,
        )
        .bind(group_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|membership| membership.into())
        .collect()
    }
}
