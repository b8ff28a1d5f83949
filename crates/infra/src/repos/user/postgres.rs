use super::IUserRepo;
use pitchin_domain::{NotificationPreferences, User, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRaw {
    user_uid: Uuid,
    email: String,
    full_name: String,
    birthday: Option<chrono::NaiveDate>,
    verified: bool,
    active: bool,
    notify_seven_days_before: bool,
    notify_one_day_before: bool,
    notify_same_day: bool,
}

impl From<UserRaw> for User {
    fn from(raw: UserRaw) -> Self {
        User {
            id: raw.user_uid.into(),
            email: raw.email,
            full_name: raw.full_name,
            birthday: raw.birthday,
            verified: raw.verified,
            active: raw.active,
            preferences: NotificationPreferences {
                seven_days_before: raw.notify_seven_days_before,
                one_day_before: raw.notify_one_day_before,
                same_day: raw.notify_same_day,
            },
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for PostgresUserRepo {
    async fn insert(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users(user_uid, email, full_name, birthday, verified, active,
                notify_seven_days_before, notify_one_day_before, notify_same_day)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id.inner_ref())
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.birthday)
        .bind(user.verified)
        .bind(user.active)
        .bind(user.preferences.seven_days_before)
        .bind(user.preferences.one_day_before)
        .bind(user.preferences.same_day)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET email = $2,
            full_name = $3,
            birthday = $4,
            verified = $5,
            active = $6,
            notify_seven_days_before = $7,
            notify_one_day_before = $8,
            notify_same_day = $9
            WHERE user_uid = $1
            "#,
        )
        .bind(user.id.inner_ref())
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.birthday)
        .bind(user.verified)
        .bind(user.active)
        .bind(user.preferences.seven_days_before)
        .bind(user.preferences.one_day_before)
        .bind(user.preferences.same_day)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, user_id: &ID) -> Option<User> {
        sqlx::query_as::<_, UserRaw>(
            r#"
            DELETE FROM users AS u
            WHERE u.user_uid = $1
            RETURNING *
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None)
        .map(|user| user.into())
    }

    async fn find(&self, user_id: &ID) -> Option<User> {
        sqlx::query_as::<_, UserRaw>(
            r#"
            SELECT * FROM users AS u
            WHERE u.user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None)
        .map(|user| user.into())
    }

    async fn find_many(&self, user_ids: &[ID]) -> Vec<User> {
        let user_ids = user_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();

        sqlx::query_as::<_, UserRaw>(
            r#"
            SELECT * FROM users AS u
            WHERE u.user_uid = ANY($1)
            "#,
        )
        .bind(&user_ids)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|user| user.into())
        .collect()
    }

    async fn find_reminder_recipients(&self) -> Vec<User> {
        sqlx::query_as::<_, UserRaw>(
            r#"
            SELECT * FROM users AS u
            WHERE u.verified = TRUE AND u.active = TRUE
            ORDER BY u.created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|user| user.into())
        .collect()
    }
}
