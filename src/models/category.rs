use serde::{Deserialize, Serialize};

/// Topic tags a profile can carry. The vocabulary is closed: matching and
/// storage use `name()`, rendering uses `display_name()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Technology,
    Business,
    Design,
    Marketing,
    Health,
    Education,
    Sustainability,
    Finance,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Technology,
        Category::Business,
        Category::Design,
        Category::Marketing,
        Category::Health,
        Category::Education,
        Category::Sustainability,
        Category::Finance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Technology => "TECHNOLOGY",
            Category::Business => "BUSINESS",
            Category::Design => "DESIGN",
            Category::Marketing => "MARKETING",
            Category::Health => "HEALTH",
            Category::Education => "EDUCATION",
            Category::Sustainability => "SUSTAINABILITY",
            Category::Finance => "FINANCE",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Technology => "#Technology",
            Category::Business => "#Business",
            Category::Design => "#Design",
            Category::Marketing => "#Marketing",
            Category::Health => "#Health",
            Category::Education => "#Education",
            Category::Sustainability => "#Sustainability",
            Category::Finance => "#Finance",
        }
    }

    pub fn from_name(name: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_only_accepts_internal_names() {
        assert_eq!(Category::from_name("DESIGN"), Some(Category::Design));
        assert_eq!(Category::from_name("#Design"), None);
        assert_eq!(Category::from_name("design"), None);
    }

    #[test]
    fn serde_uses_internal_name() {
        let json = serde_json::to_string(&Category::Sustainability).unwrap();
        assert_eq!(json, "\"SUSTAINABILITY\"");
        let back: Category = serde_json::from_str("\"FINANCE\"").unwrap();
        assert_eq!(back, Category::Finance);
    }

    #[test]
    fn every_display_name_carries_marker() {
        for c in Category::ALL {
            assert!(c.display_name().starts_with('#'));
            assert_ne!(c.display_name(), c.name());
        }
    }
}
