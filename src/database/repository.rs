//! The data collaborator behind the profile list: a push source of profile
//! snapshots plus the handful of writes the list screen needs.

use std::future::Future;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use thiserror::Error;
use tokio::sync::watch;

use crate::models::{NewProfile, Profile};

pub type ProfileStream = BoxStream<'static, Result<Vec<Profile>, RepositoryError>>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("malformed categories for profile {profile_id}: {source}")]
    MalformedCategories {
        profile_id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("profile source unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Current snapshot first, then a fresh one after every write. The
    /// stream stays open for as long as the repository lives.
    fn subscribe_profiles(&self) -> ProfileStream;

    /// Stores the profile and returns its newly assigned id.
    async fn create_profile(&self, profile: NewProfile) -> Result<String, RepositoryError>;

    async fn get_profile_by_id(&self, profile_id: &str)
        -> Result<Option<Profile>, RepositoryError>;

    /// Replaces the category set wholesale. `Ok(false)` if no such profile.
    async fn update_profile_categories(
        &self,
        profile_id: &str,
        category_names: &[String],
    ) -> Result<bool, RepositoryError>;
}

/// Turns a change counter into a snapshot stream: one `load` up front, one
/// per observed change. Bursts of writes may collapse into a single snapshot.
pub fn snapshot_stream<F, Fut>(changes: watch::Receiver<u64>, load: F) -> ProfileStream
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<Profile>, RepositoryError>> + Send + 'static,
{
    stream::unfold((changes, load, true), |(mut changes, load, first)| async move {
        if !first && changes.changed().await.is_err() {
            return None;
        }
        changes.borrow_and_update();
        let snapshot = load().await;
        Some((snapshot, (changes, load, false)))
    })
    .boxed()
}
