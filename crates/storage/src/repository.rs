use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lms_core::model::{Chapter, ChapterId, CourseId, EnrollmentProgress, LearnerId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for course chapters.
#[async_trait]
pub trait ChapterRepository: Send + Sync {
    /// Persist or update a chapter.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the chapter cannot be stored.
    async fn upsert_chapter(&self, chapter: &Chapter) -> Result<(), StorageError>;

    /// List a course's chapters ordered by `order`, then by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn list_chapters(&self, course_id: CourseId) -> Result<Vec<Chapter>, StorageError>;
}

/// Repository contract for per-learner chapter completion.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load a learner's progress in a course. Unknown enrollments yield empty progress.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn load_progress(
        &self,
        learner_id: LearnerId,
        course_id: CourseId,
    ) -> Result<EnrollmentProgress, StorageError>;

    /// Record the completion flag for one chapter.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the flag cannot be stored.
    async fn set_completed(
        &self,
        learner_id: LearnerId,
        course_id: CourseId,
        chapter_id: ChapterId,
        completed: bool,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Drop all progress for an enrollment. Returns the number of removed entries.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    async fn clear_progress(
        &self,
        learner_id: LearnerId,
        course_id: CourseId,
    ) -> Result<u64, StorageError>;
}

type ProgressKey = (LearnerId, CourseId);

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    chapters: Arc<Mutex<HashMap<(CourseId, ChapterId), Chapter>>>,
    progress: Arc<Mutex<HashMap<ProgressKey, EnrollmentProgress>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChapterRepository for InMemoryRepository {
    async fn upsert_chapter(&self, chapter: &Chapter) -> Result<(), StorageError> {
        let mut guard = self
            .chapters
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert((chapter.course_id(), chapter.id()), chapter.clone());
        Ok(())
    }

    async fn list_chapters(&self, course_id: CourseId) -> Result<Vec<Chapter>, StorageError> {
        let guard = self
            .chapters
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut chapters: Vec<Chapter> = guard
            .values()
            .filter(|c| c.course_id() == course_id)
            .cloned()
            .collect();
        chapters.sort_by_key(|c| (c.order(), c.id()));
        Ok(chapters)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(
        &self,
        learner_id: LearnerId,
        course_id: CourseId,
    ) -> Result<EnrollmentProgress, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .get(&(learner_id, course_id))
            .cloned()
            .unwrap_or_else(|| EnrollmentProgress::new(learner_id, course_id)))
    }

    async fn set_completed(
        &self,
        learner_id: LearnerId,
        course_id: CourseId,
        chapter_id: ChapterId,
        completed: bool,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .entry((learner_id, course_id))
            .or_insert_with(|| EnrollmentProgress::new(learner_id, course_id))
            .set_completed(chapter_id, completed, at);
        Ok(())
    }

    async fn clear_progress(
        &self,
        learner_id: LearnerId,
        course_id: CourseId,
    ) -> Result<u64, StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let removed = guard
            .remove(&(learner_id, course_id))
            .map_or(0, |p| p.entries().count());
        Ok(removed as u64)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub chapters: Arc<dyn ChapterRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let chapters: Arc<dyn ChapterRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self { chapters, progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_core::time::fixed_now;

    fn chapter(id: u64, course: u64, title: &str, order: i64) -> Chapter {
        Chapter::from_title(ChapterId::new(id), CourseId::new(course), title, order).unwrap()
    }

    #[tokio::test]
    async fn lists_chapters_for_course_in_order() {
        let repo = InMemoryRepository::new();
        repo.upsert_chapter(&chapter(1, 1, "Basics", 2)).await.unwrap();
        repo.upsert_chapter(&chapter(2, 1, "Intro", 1)).await.unwrap();
        repo.upsert_chapter(&chapter(3, 2, "Other Course", 0)).await.unwrap();

        let listed = repo.list_chapters(CourseId::new(1)).await.unwrap();
        let titles: Vec<&str> = listed.iter().map(Chapter::title).collect();
        assert_eq!(titles, vec!["Intro", "Basics"]);
    }

    #[tokio::test]
    async fn progress_round_trips_and_clears() {
        let repo = InMemoryRepository::new();
        let learner = LearnerId::new(7);
        let course = CourseId::new(1);

        repo.set_completed(learner, course, ChapterId::new(1), true, fixed_now())
            .await
            .unwrap();
        repo.set_completed(learner, course, ChapterId::new(2), false, fixed_now())
            .await
            .unwrap();

        let progress = repo.load_progress(learner, course).await.unwrap();
        assert!(progress.is_completed(ChapterId::new(1)));
        assert!(!progress.is_completed(ChapterId::new(2)));

        assert_eq!(repo.clear_progress(learner, course).await.unwrap(), 2);
        let progress = repo.load_progress(learner, course).await.unwrap();
        assert!(progress.is_empty());
    }

    #[tokio::test]
    async fn progress_is_scoped_per_course() {
        let repo = InMemoryRepository::new();
        let learner = LearnerId::new(7);
        repo.set_completed(learner, CourseId::new(1), ChapterId::new(1), true, fixed_now())
            .await
            .unwrap();

        let other = repo.load_progress(learner, CourseId::new(2)).await.unwrap();
        assert!(!other.is_completed(ChapterId::new(1)));
    }
}
