//! Content categories and per-category store tuning

use std::collections::HashMap;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::Deserialize;

/// Per-category retention settings for the transient tier
///
/// `max_age` of `None` disables TTL: entries are then evicted only when the
/// category exceeds `max_entries`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryConfig {
    /// Entry lifetime, in seconds when deserialized from configuration
    #[serde(default, with = "opt_secs")]
    pub max_age: Option<Duration>,
    /// Maximum number of entries retained per category
    pub max_entries: usize,
}

mod opt_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs: Option<u64> = Option::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            max_age: Some(Duration::from_secs(24 * 3600)),
            max_entries: 200,
        }
    }
}

impl CategoryConfig {
    pub fn new(max_age: Option<Duration>, max_entries: usize) -> Self {
        Self {
            max_age,
            max_entries,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn without_max_age(mut self) -> Self {
        self.max_age = None;
        self
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }
}

/// Well-known content categories
pub mod categories {
    pub const LESSON_TEXT: &str = "lesson-text";
    pub const QUIZ: &str = "quiz";
    pub const NARRATED_AUDIO: &str = "narrated-audio";
    pub const SCENE_VIDEO: &str = "scene-video";
    pub const PROGRESS: &str = "progress";
}

static DEFAULT_TABLE: Lazy<HashMap<String, CategoryConfig>> = Lazy::new(|| {
    use categories::*;

    let day = 24 * 3600;
    let mut table = HashMap::new();

    table.insert(
        LESSON_TEXT.to_string(),
        CategoryConfig::new(Some(Duration::from_secs(7 * day)), 500),
    );
    table.insert(
        QUIZ.to_string(),
        CategoryConfig::new(Some(Duration::from_secs(7 * day)), 500),
    );
    // Narrated audio is expensive to regenerate: long TTL, large capacity.
    table.insert(
        NARRATED_AUDIO.to_string(),
        CategoryConfig::new(Some(Duration::from_secs(30 * day)), 2000),
    );
    table.insert(
        SCENE_VIDEO.to_string(),
        CategoryConfig::new(Some(Duration::from_secs(30 * day)), 500),
    );
    // Ephemeral progress snapshots: short TTL, small capacity.
    table.insert(
        PROGRESS.to_string(),
        CategoryConfig::new(Some(Duration::from_secs(3600)), 50),
    );

    table
});

/// Category-configuration table
///
/// One generic engine is parameterized by this registry instead of carrying
/// a separate store class per content kind. Unknown categories fall back to
/// the registry default.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    overrides: HashMap<String, CategoryConfig>,
    fallback: CategoryConfig,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl CategoryRegistry {
    /// Creates an empty registry with only the fallback config
    pub fn new(fallback: CategoryConfig) -> Self {
        Self {
            overrides: HashMap::new(),
            fallback,
        }
    }

    /// Creates a registry pre-populated with the built-in category table
    pub fn with_defaults() -> Self {
        Self {
            overrides: DEFAULT_TABLE.clone(),
            fallback: CategoryConfig::default(),
        }
    }

    /// Registers or replaces the config for a category
    pub fn with_category(mut self, category: impl Into<String>, config: CategoryConfig) -> Self {
        self.overrides.insert(category.into(), config);
        self
    }

    /// Merges configuration-supplied overrides into the registry
    pub fn apply_overrides(mut self, overrides: HashMap<String, CategoryConfig>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    /// Resolves the config for a category
    pub fn config_for(&self, category: &str) -> &CategoryConfig {
        self.overrides.get(category).unwrap_or(&self.fallback)
    }
}
