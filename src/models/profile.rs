use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Category;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub profile_id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub image_url: String,
    pub categories: Vec<Category>,
}

impl Profile {
    /// Whitespace-only URLs count as missing.
    pub fn has_image(&self) -> bool {
        !self.image_url.trim().is_empty()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Input for profile creation; the repository assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProfile {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl NewProfile {
    pub fn into_profile(self, profile_id: String) -> Profile {
        Profile {
            profile_id,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            image_url: self.image_url,
            categories: self.categories,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub profile_id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<String>,
    pub image_url: Option<String>,
    pub categories: Option<String>,
}

impl ProfileRow {
    pub fn into_profile(self) -> Result<Profile, serde_json::Error> {
        let categories = parse_category_names(self.categories.as_deref().unwrap_or("[]"))?;
        Ok(Profile {
            profile_id: self.profile_id,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role.unwrap_or_default(),
            image_url: self.image_url.unwrap_or_default(),
            categories,
        })
    }
}

/// Parses a JSON array of internal category names. Names outside the
/// vocabulary are dropped.
pub fn parse_category_names(raw: &str) -> Result<Vec<Category>, serde_json::Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let names: Vec<String> = serde_json::from_str(raw)?;
    Ok(names
        .iter()
        .filter_map(|name| {
            let category = Category::from_name(name.trim());
            if category.is_none() {
                warn!(category = %name, "skipping unknown category");
            }
            category
        })
        .collect())
}

pub fn category_names_json<S: AsRef<str>>(names: &[S]) -> String {
    let names: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
    serde_json::Value::from(names).to_string()
}
