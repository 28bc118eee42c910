use std::env;
use std::path::PathBuf;

pub const DB_URL_ENV: &str = "LMS_DB_URL";
pub const PROJECTS_ROOT_ENV: &str = "LMS_PROJECTS_ROOT";

pub const DEFAULT_DB_URL: &str = "sqlite://lms.sqlite3";
pub const DEFAULT_PROJECTS_ROOT: &str = "projects";
pub const DEFAULT_ENTRY_FILE: &str = "index.html";
pub const DEFAULT_METADATA_FILE: &str = "project.json";

/// Candidate thumbnail locations, probed in order relative to a project folder.
pub const THUMBNAIL_CANDIDATES: [&str; 6] = [
    "thumbnail.png",
    "thumbnail.jpg",
    "assets/thumbnail.png",
    "assets/thumbnail.jpg",
    "images/thumbnail.png",
    "img/thumbnail.png",
];

/// Settings for a `ProjectDiscovery` instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectDiscoveryConfig {
    pub root: PathBuf,
    pub entry_file: String,
    pub metadata_file: String,
}

impl ProjectDiscoveryConfig {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entry_file: DEFAULT_ENTRY_FILE.to_string(),
            metadata_file: DEFAULT_METADATA_FILE.to_string(),
        }
    }
}

/// Process configuration resolved from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub db_url: String,
    pub projects: ProjectDiscoveryConfig,
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolves configuration through `lookup`; blank values count as unset.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let db_url = get(DB_URL_ENV).unwrap_or_else(|| DEFAULT_DB_URL.into());
        let root = get(PROJECTS_ROOT_ENV).unwrap_or_else(|| DEFAULT_PROJECTS_ROOT.into());

        Self {
            db_url,
            projects: ProjectDiscoveryConfig::new(root),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::default();
        assert_eq!(config.db_url, DEFAULT_DB_URL);
        assert_eq!(config.projects.root, PathBuf::from(DEFAULT_PROJECTS_ROOT));
        assert_eq!(config.projects.entry_file, "index.html");
        assert_eq!(config.projects.metadata_file, "project.json");
    }

    #[test]
    fn lookup_values_override_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (DB_URL_ENV, "sqlite::memory:"),
            (PROJECTS_ROOT_ENV, "/srv/projects"),
        ]);
        let config = AppConfig::from_lookup(|key| vars.get(key).map(ToString::to_string));
        assert_eq!(config.db_url, "sqlite::memory:");
        assert_eq!(config.projects.root, PathBuf::from("/srv/projects"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = AppConfig::from_lookup(|_| Some("   ".to_string()));
        assert_eq!(config.db_url, DEFAULT_DB_URL);
    }
}
