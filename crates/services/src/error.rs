//! Shared error types for the services crate.

use thiserror::Error;

use lms_core::model::{ChapterError, ChapterId, CourseId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `CourseProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourseServiceError {
    #[error("chapter {chapter_id} is not part of course {course_id}")]
    UnknownChapter {
        course_id: CourseId,
        chapter_id: ChapterId,
    },
    #[error("chapter {0} is an assessment that is still locked")]
    AssessmentLocked(ChapterId),
    #[error(transparent)]
    Chapter(#[from] ChapterError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
