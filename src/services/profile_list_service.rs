//! Session state behind the profile list screen.
//!
//! `ProfileListController` mirrors the repository's profile feed, owns the
//! search criteria and republishes the visible list after every change.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::database::ProfileRepository;
use crate::models::{Category, FilterCriteria, NewProfile, Profile};
use crate::services::profile_filter_service::{compute_visible, primary_categories_label};

#[derive(Default)]
struct ListState {
    profiles: Vec<Profile>,
    primary_categories: Vec<String>,
    criteria: FilterCriteria,
    current_profile_id: Option<String>,
}

pub struct ProfileListController {
    repo: Arc<dyn ProfileRepository>,
    state: Mutex<ListState>,
    visible: watch::Sender<Arc<Vec<Profile>>>,
}

impl ProfileListController {
    pub fn new(repo: Arc<dyn ProfileRepository>) -> Arc<Self> {
        let (visible, _) = watch::channel(Arc::new(Vec::new()));
        Arc::new(Self {
            repo,
            state: Mutex::new(ListState::default()),
            visible,
        })
    }

    /// Same as `new`, for a session whose own profile already exists.
    pub fn with_current_profile_id(
        repo: Arc<dyn ProfileRepository>,
        profile_id: impl Into<String>,
    ) -> Arc<Self> {
        let controller = Self::new(repo);
        controller.lock().current_profile_id = Some(profile_id.into());
        controller
    }

    /// Spawns the task that feeds repository snapshots into
    /// `on_profiles_changed`. The task ends with the stream or once the
    /// controller is dropped.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        let mut snapshots = self.repo.subscribe_profiles();
        info!("profile list controller started");

        tokio::spawn(async move {
            while let Some(snapshot) = snapshots.next().await {
                let Some(controller) = weak.upgrade() else {
                    break;
                };
                match snapshot {
                    Ok(profiles) => {
                        debug!(count = profiles.len(), "profiles snapshot received");
                        controller.on_profiles_changed(profiles);
                    }
                    Err(e) => warn!("Profile subscription failed: {}", e),
                }
            }
            debug!("profile subscription closed");
        })
    }

    pub fn on_profiles_changed(&self, profiles: Vec<Profile>) {
        self.mutate(|state| state.profiles = profiles);
    }

    pub fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.mutate(|state| state.criteria.search_text = text);
    }

    /// Flips `name` in the selected categories. Returns true if it is
    /// selected afterwards.
    pub fn toggle_category(&self, name: &str) -> bool {
        let mut selected = false;
        self.mutate(|state| selected = state.criteria.toggle_category(name));
        selected
    }

    /// Fetches the current user's profile and adopts its category display
    /// names as the primary categories. False if no profile id is known yet,
    /// the profile is missing or the fetch fails.
    pub async fn load_primary_categories(&self) -> bool {
        let Some(profile_id) = self.current_profile_id() else {
            debug!("primary categories requested before a profile id is known");
            return false;
        };

        let profile = match self.repo.get_profile_by_id(&profile_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                warn!(profile_id = %profile_id, "current profile not found");
                return false;
            }
            Err(e) => {
                warn!("Primary categories load failed for {}: {}", profile_id, e);
                return false;
            }
        };

        let names: Vec<String> = profile
            .categories
            .iter()
            .map(|c| c.display_name().to_string())
            .collect();
        self.mutate(|state| state.primary_categories = names);
        true
    }

    /// Creates a profile and, on success, remembers its id as the current
    /// user for later calls.
    pub async fn create_profile(&self, profile: NewProfile) -> Option<String> {
        match self.repo.create_profile(profile).await {
            Ok(profile_id) => {
                info!(profile_id = %profile_id, "profile created");
                self.lock().current_profile_id = Some(profile_id.clone());
                Some(profile_id)
            }
            Err(e) => {
                warn!("Profile creation failed: {}", e);
                None
            }
        }
    }

    /// Replaces the current user's categories. Without a known profile id no
    /// request is made and false is returned.
    pub async fn update_profile_categories(&self, categories: &[Category]) -> bool {
        let Some(profile_id) = self.current_profile_id() else {
            debug!("category update requested before a profile id is known");
            return false;
        };

        let names: Vec<String> = categories.iter().map(|c| c.name().to_string()).collect();
        match self.repo.update_profile_categories(&profile_id, &names).await {
            Ok(true) => true,
            Ok(false) => {
                warn!(profile_id = %profile_id, "category update matched no profile");
                false
            }
            Err(e) => {
                warn!("Category update failed for {}: {}", profile_id, e);
                false
            }
        }
    }

    pub fn visible_profiles(&self) -> Arc<Vec<Profile>> {
        Arc::clone(&self.visible.borrow())
    }

    pub fn subscribe_visible(&self) -> watch::Receiver<Arc<Vec<Profile>>> {
        self.visible.subscribe()
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.lock().criteria.clone()
    }

    pub fn primary_categories(&self) -> Vec<String> {
        self.lock().primary_categories.clone()
    }

    pub fn current_profile_id(&self) -> Option<String> {
        self.lock().current_profile_id.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // Applies `change` and republishes the visible list while still holding
    // the lock, so readers never observe stale output for new input.
    fn mutate(&self, change: impl FnOnce(&mut ListState)) {
        let mut state = self.lock();
        change(&mut state);

        let primary: HashSet<String> = state.primary_categories.iter().cloned().collect();
        let visible = compute_visible(&state.profiles, &primary, &state.criteria);
        self.visible.send_replace(Arc::new(visible));
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileCardView {
    pub profile_id: String,
    pub full_name: String,
    pub role: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryOptionView {
    pub name: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileListView {
    pub profiles: Vec<ProfileCardView>,
    pub search_text: String,
    pub selected_categories: Vec<String>,
    pub category_options: Vec<CategoryOptionView>,
    pub primary_categories: Vec<String>,
    pub primary_categories_label: String,
}

pub fn build_profile_list_view(controller: &ProfileListController) -> ProfileListView {
    let criteria = controller.criteria();
    let primary_categories = controller.primary_categories();

    let profiles = controller
        .visible_profiles()
        .iter()
        .map(|p| ProfileCardView {
            profile_id: p.profile_id.clone(),
            full_name: p.full_name(),
            role: p.role.clone(),
            image_url: p.image_url.clone(),
        })
        .collect();

    let category_options = Category::ALL
        .iter()
        .map(|c| CategoryOptionView {
            name: c.name().to_string(),
            label: format!("#{}", c.name()),
            selected: criteria.selected_categories.contains(c.name()),
        })
        .collect();

    ProfileListView {
        profiles,
        search_text: criteria.search_text.clone(),
        selected_categories: criteria.selected_categories.iter().cloned().collect(),
        category_options,
        primary_categories_label: primary_categories_label(&primary_categories),
        primary_categories,
    }
}
