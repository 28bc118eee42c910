//! Filesystem-backed project listing.
//!
//! Every call re-scans the configured root. Nothing here returns an error to
//! the caller: a missing root yields an empty list, and unreadable entries or
//! sidecar files are logged and replaced by defaults.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use lms_core::model::project::compare_projects;
use lms_core::model::{FolderFacts, ProjectDescriptor, ProjectMetadata};

use crate::config::{ProjectDiscoveryConfig, THUMBNAIL_CANDIDATES};

/// Discovers projects under one root directory.
#[derive(Clone, Debug)]
pub struct ProjectDiscovery {
    config: ProjectDiscoveryConfig,
}

impl ProjectDiscovery {
    #[must_use]
    pub fn new(config: ProjectDiscoveryConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Lists every project folder directly under the root, sorted for display.
    ///
    /// A folder counts as a project only if it contains the entry file.
    #[must_use]
    pub fn discover(&self) -> Vec<ProjectDescriptor> {
        let root = self.root();
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(root = %root.display(), "projects root does not exist");
                return Vec::new();
            }
            Err(err) => {
                tracing::warn!(root = %root.display(), %err, "failed to read projects root");
                return Vec::new();
            }
        };

        let mut projects = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(root = %root.display(), %err, "failed to read directory entry");
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let Some(folder_name) = entry.file_name().to_str().map(str::to_owned) else {
                tracing::warn!(path = %path.display(), "skipping folder with non UTF-8 name");
                continue;
            };

            if !path.join(&self.config.entry_file).is_file() {
                tracing::debug!(
                    folder = %folder_name,
                    entry_file = %self.config.entry_file,
                    "skipping folder without entry file"
                );
                continue;
            }

            projects.push(self.describe(&path, &folder_name));
        }

        projects.sort_by(compare_projects);
        tracing::debug!(root = %root.display(), count = projects.len(), "discovered projects");
        projects
    }

    /// Finds a project whose id or folder name equals `id`, ignoring case.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<ProjectDescriptor> {
        self.discover().into_iter().find(|p| p.matches_id(id))
    }

    fn describe(&self, dir: &Path, folder_name: &str) -> ProjectDescriptor {
        let (created_at, updated_at) = folder_times(dir);
        let facts = FolderFacts {
            created_at,
            updated_at,
            thumbnail: find_thumbnail(dir, folder_name),
        };
        let metadata = self.load_metadata(dir, folder_name);
        ProjectDescriptor::build(folder_name, facts, metadata)
    }

    fn load_metadata(&self, dir: &Path, folder_name: &str) -> Option<ProjectMetadata> {
        let path = dir.join(&self.config.metadata_file);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(
                    project = folder_name,
                    path = %path.display(),
                    %err,
                    "failed to read project metadata, using defaults"
                );
                return None;
            }
        };

        match ProjectMetadata::from_json(&raw) {
            Ok(metadata) => {
                for key in &metadata.rejected_keys {
                    tracing::warn!(
                        project = folder_name,
                        path = %path.display(),
                        key,
                        "ignoring project metadata key with unexpected type"
                    );
                }
                Some(metadata)
            }
            Err(err) => {
                tracing::warn!(
                    project = folder_name,
                    path = %path.display(),
                    %err,
                    "malformed project metadata, using defaults"
                );
                None
            }
        }
    }
}

/// Creation time falls back to modification time where the platform lacks it.
fn folder_times(dir: &Path) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let Ok(meta) = fs::metadata(dir) else {
        return (None, None);
    };
    let modified = meta.modified().ok().map(DateTime::<Utc>::from);
    let created = meta
        .created()
        .ok()
        .map(DateTime::<Utc>::from)
        .or(modified);
    (created, modified)
}

fn find_thumbnail(dir: &Path, folder_name: &str) -> Option<String> {
    THUMBNAIL_CANDIDATES
        .iter()
        .find(|candidate| dir.join(candidate).is_file())
        .map(|candidate| format!("{folder_name}/{candidate}"))
}
