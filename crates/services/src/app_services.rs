use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::config::AppConfig;
use crate::course_service::CourseProgressService;
use crate::error::AppServicesError;
use crate::project_discovery::ProjectDiscovery;

/// Assembles app-facing services from one configuration.
#[derive(Clone)]
pub struct AppServices {
    course_progress: Arc<CourseProgressService>,
    projects: Arc<ProjectDiscovery>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(config: &AppConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        Ok(Self::from_storage(&storage, config, clock))
    }

    /// Build services over an already-initialized storage.
    #[must_use]
    pub fn from_storage(storage: &Storage, config: &AppConfig, clock: Clock) -> Self {
        let course_progress = Arc::new(CourseProgressService::new(
            clock,
            Arc::clone(&storage.chapters),
            Arc::clone(&storage.progress),
        ));
        let projects = Arc::new(ProjectDiscovery::new(config.projects.clone()));

        Self {
            course_progress,
            projects,
        }
    }

    #[must_use]
    pub fn course_progress(&self) -> Arc<CourseProgressService> {
        Arc::clone(&self.course_progress)
    }

    #[must_use]
    pub fn projects(&self) -> Arc<ProjectDiscovery> {
        Arc::clone(&self.projects)
    }
}
