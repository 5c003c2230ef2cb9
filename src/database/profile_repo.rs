use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::repository::{
    snapshot_stream, ProfileRepository, ProfileStream, RepositoryError,
};
use crate::models::profile::category_names_json;
use crate::models::{NewProfile, Profile, ProfileRow};

pub const SQL_CREATE_PROFILES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS profiles (
    profile_id TEXT PRIMARY KEY NOT NULL,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    role TEXT,
    image_url TEXT,
    categories TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
)
"#;

pub const SQL_LIST_PROFILES: &str = r#"
SELECT
    profile_id,
    first_name,
    last_name,
    role,
    image_url,
    categories
FROM profiles
ORDER BY created_at ASC, rowid ASC
"#;

pub const SQL_LOAD_PROFILE: &str = r#"
SELECT
    profile_id,
    first_name,
    last_name,
    role,
    image_url,
    categories
FROM profiles
WHERE profile_id = ?1
LIMIT 1
"#;

const SQL_INSERT_PROFILE: &str = r#"
INSERT INTO profiles (
  profile_id,
  first_name,
  last_name,
  role,
  image_url,
  categories
) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

const SQL_UPDATE_PROFILE_CATEGORIES: &str = r#"
UPDATE profiles
SET categories = ?2
WHERE profile_id = ?1
"#;

pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::query(SQL_CREATE_PROFILES_TABLE).execute(pool).await?;
    Ok(())
}

pub async fn list_profiles(pool: &SqlitePool) -> sqlx::Result<Vec<ProfileRow>> {
    sqlx::query_as::<_, ProfileRow>(SQL_LIST_PROFILES)
        .fetch_all(pool)
        .await
}

pub async fn load_profile(pool: &SqlitePool, profile_id: &str) -> sqlx::Result<Option<ProfileRow>> {
    sqlx::query_as::<_, ProfileRow>(SQL_LOAD_PROFILE)
        .bind(profile_id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_profile(
    pool: &SqlitePool,
    profile_id: &str,
    profile: &NewProfile,
) -> sqlx::Result<()> {
    let names: Vec<&str> = profile.categories.iter().map(|c| c.name()).collect();
    sqlx::query(SQL_INSERT_PROFILE)
        .bind(profile_id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.role)
        .bind(&profile.image_url)
        .bind(category_names_json(&names))
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_profile_categories(
    pool: &SqlitePool,
    profile_id: &str,
    category_names: &[String],
) -> sqlx::Result<bool> {
    let result = sqlx::query(SQL_UPDATE_PROFILE_CATEGORIES)
        .bind(profile_id)
        .bind(category_names_json(category_names))
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

fn row_into_profile(row: ProfileRow) -> Result<Profile, RepositoryError> {
    let profile_id = row.profile_id.clone();
    row.into_profile()
        .map_err(|source| RepositoryError::MalformedCategories { profile_id, source })
}

async fn load_snapshot(pool: &SqlitePool) -> Result<Vec<Profile>, RepositoryError> {
    list_profiles(pool)
        .await?
        .into_iter()
        .map(row_into_profile)
        .collect()
}

/// SQLite-backed profile store. SQLite has no change feed, so writes made
/// through this handle bump a counter that drives `subscribe_profiles`.
pub struct SqliteProfileRepository {
    pool: SqlitePool,
    changes: watch::Sender<u64>,
}

impl SqliteProfileRepository {
    pub async fn connect(pool: SqlitePool) -> sqlx::Result<Self> {
        ensure_schema(&pool).await?;
        info!("profiles schema ready");
        let (changes, _) = watch::channel(0);
        Ok(Self { pool, changes })
    }

    fn notify_changed(&self) {
        self.changes.send_modify(|version| *version += 1);
    }
}

#[async_trait]
impl ProfileRepository for SqliteProfileRepository {
    fn subscribe_profiles(&self) -> ProfileStream {
        let pool = self.pool.clone();
        snapshot_stream(self.changes.subscribe(), move || {
            let pool = pool.clone();
            async move { load_snapshot(&pool).await }
        })
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<String, RepositoryError> {
        let profile_id = Uuid::new_v4().to_string();
        insert_profile(&self.pool, &profile_id, &profile).await?;
        debug!(profile_id = %profile_id, "profile inserted");
        self.notify_changed();
        Ok(profile_id)
    }

    async fn get_profile_by_id(
        &self,
        profile_id: &str,
    ) -> Result<Option<Profile>, RepositoryError> {
        load_profile(&self.pool, profile_id)
            .await?
            .map(row_into_profile)
            .transpose()
    }

    async fn update_profile_categories(
        &self,
        profile_id: &str,
        category_names: &[String],
    ) -> Result<bool, RepositoryError> {
        let updated = update_profile_categories(&self.pool, profile_id, category_names).await?;
        if updated {
            self.notify_changed();
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use futures::StreamExt;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_repo() -> SqliteProfileRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteProfileRepository::connect(pool).await.unwrap()
    }

    fn new_profile(first: &str, categories: Vec<Category>) -> NewProfile {
        NewProfile {
            first_name: first.to_string(),
            last_name: "Souza".to_string(),
            role: "Engineer".to_string(),
            image_url: format!("https://img/{first}.png"),
            categories,
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_stored_profile() {
        let repo = memory_repo().await;
        let id = repo
            .create_profile(new_profile("Ana", vec![Category::Design]))
            .await
            .unwrap();

        let profile = repo.get_profile_by_id(&id).await.unwrap().unwrap();
        assert_eq!(profile.profile_id, id);
        assert_eq!(profile.first_name, "Ana");
        assert_eq!(profile.categories, vec![Category::Design]);
    }

    #[tokio::test]
    async fn get_unknown_profile_is_none() {
        let repo = memory_repo().await;
        assert!(repo.get_profile_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_categories_replaces_whole_set() {
        let repo = memory_repo().await;
        let id = repo
            .create_profile(new_profile("Ana", vec![Category::Design, Category::Health]))
            .await
            .unwrap();

        let updated = repo
            .update_profile_categories(&id, &["FINANCE".to_string()])
            .await
            .unwrap();
        assert!(updated);

        let profile = repo.get_profile_by_id(&id).await.unwrap().unwrap();
        assert_eq!(profile.categories, vec![Category::Finance]);
    }

    #[tokio::test]
    async fn update_unknown_profile_reports_false() {
        let repo = memory_repo().await;
        let updated = repo
            .update_profile_categories("missing", &["FINANCE".to_string()])
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn subscription_emits_initial_then_after_each_write() {
        let repo = memory_repo().await;
        repo.create_profile(new_profile("Ana", vec![])).await.unwrap();

        let mut stream = repo.subscribe_profiles();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 1);

        repo.create_profile(new_profile("Bea", vec![])).await.unwrap();
        let second = stream.next().await.unwrap().unwrap();
        let names: Vec<_> = second.iter().map(|p| p.first_name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bea"]);
    }

    #[tokio::test]
    async fn malformed_categories_surface_as_snapshot_error() {
        let repo = memory_repo().await;
        sqlx::query(
            "INSERT INTO profiles (profile_id, first_name, last_name, categories) VALUES ('x', 'A', 'B', 'nope')",
        )
        .execute(&repo.pool)
        .await
        .unwrap();

        let mut stream = repo.subscribe_profiles();
        let err = stream.next().await.unwrap().unwrap_err();
        assert!(matches!(err, RepositoryError::MalformedCategories { .. }));
    }
}
