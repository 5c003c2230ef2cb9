use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use crate::database::repository::{
    snapshot_stream, ProfileRepository, ProfileStream, RepositoryError,
};
use crate::models::{Category, NewProfile, Profile};

#[derive(Default)]
struct Calls {
    create: AtomicUsize,
    get: AtomicUsize,
    update: AtomicUsize,
}

/// Process-local profile store keeping insertion order. Counts the calls it
/// receives and can be switched into a failing mode for snapshots.
pub struct InMemoryProfileRepository {
    profiles: Arc<Mutex<Vec<Profile>>>,
    fail_snapshots: Arc<AtomicBool>,
    changes: watch::Sender<u64>,
    calls: Calls,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::with_profiles(Vec::new())
    }

    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            profiles: Arc::new(Mutex::new(profiles)),
            fail_snapshots: Arc::new(AtomicBool::new(false)),
            changes,
            calls: Calls::default(),
        }
    }

    /// Replaces the stored profiles and notifies subscribers.
    pub fn replace_all(&self, profiles: Vec<Profile>) {
        *lock(&self.profiles) = profiles;
        self.notify_changed();
    }

    /// While set, every snapshot delivered to subscribers is an error.
    pub fn set_fail_snapshots(&self, fail: bool) {
        self.fail_snapshots.store(fail, Ordering::SeqCst);
        self.notify_changed();
    }

    pub fn create_calls(&self) -> usize {
        self.calls.create.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.calls.get.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.calls.update.load(Ordering::SeqCst)
    }

    fn notify_changed(&self) {
        self.changes.send_modify(|version| *version += 1);
    }
}

impl Default for InMemoryProfileRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn lock(profiles: &Mutex<Vec<Profile>>) -> std::sync::MutexGuard<'_, Vec<Profile>> {
    profiles.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    fn subscribe_profiles(&self) -> ProfileStream {
        let profiles = Arc::clone(&self.profiles);
        let fail = Arc::clone(&self.fail_snapshots);
        snapshot_stream(self.changes.subscribe(), move || {
            let result = if fail.load(Ordering::SeqCst) {
                Err(RepositoryError::Unavailable("snapshots disabled".to_string()))
            } else {
                Ok(lock(&profiles).clone())
            };
            async move { result }
        })
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<String, RepositoryError> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        let profile_id = Uuid::new_v4().to_string();
        lock(&self.profiles).push(profile.into_profile(profile_id.clone()));
        self.notify_changed();
        Ok(profile_id)
    }

    async fn get_profile_by_id(
        &self,
        profile_id: &str,
    ) -> Result<Option<Profile>, RepositoryError> {
        self.calls.get.fetch_add(1, Ordering::SeqCst);
        Ok(lock(&self.profiles)
            .iter()
            .find(|p| p.profile_id == profile_id)
            .cloned())
    }

    async fn update_profile_categories(
        &self,
        profile_id: &str,
        category_names: &[String],
    ) -> Result<bool, RepositoryError> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        let updated = {
            let mut profiles = lock(&self.profiles);
            match profiles.iter_mut().find(|p| p.profile_id == profile_id) {
                Some(profile) => {
                    profile.categories = category_names
                        .iter()
                        .filter_map(|name| Category::from_name(name))
                        .collect();
                    true
                }
                None => false,
            }
        };
        if updated {
            self.notify_changed();
        }
        Ok(updated)
    }
}
