use std::sync::Arc;

use lms_core::model::{Chapter, ChapterId, ChapterKind, CourseId, LearnerId};
use lms_core::{ChapterGate, GateSummary};
use storage::repository::{ChapterRepository, ProgressRepository};

use crate::Clock;
use crate::error::CourseServiceError;

/// Orchestrates chapter visibility and completion for enrolled learners.
#[derive(Clone)]
pub struct CourseProgressService {
    clock: Clock,
    gate: ChapterGate,
    chapters: Arc<dyn ChapterRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl CourseProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        chapters: Arc<dyn ChapterRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            gate: ChapterGate::new(),
            chapters,
            progress,
        }
    }

    #[must_use]
    pub fn with_gate(mut self, gate: ChapterGate) -> Self {
        self.gate = gate;
        self
    }

    /// Persist a chapter definition.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if persistence fails.
    pub async fn add_chapter(&self, chapter: &Chapter) -> Result<(), CourseServiceError> {
        self.chapters.upsert_chapter(chapter).await?;
        Ok(())
    }

    /// Build and persist a chapter. Without an explicit kind, the title decides.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Chapter` if the title is blank, or
    /// `CourseServiceError::Storage` if persistence fails.
    pub async fn define_chapter(
        &self,
        course_id: CourseId,
        chapter_id: ChapterId,
        title: &str,
        order: i64,
        kind: Option<ChapterKind>,
    ) -> Result<Chapter, CourseServiceError> {
        let chapter = match kind {
            Some(kind) => Chapter::new(chapter_id, course_id, title, order, kind)?,
            None => Chapter::from_title(chapter_id, course_id, title, order)?,
        };
        self.add_chapter(&chapter).await?;
        tracing::info!(
            course = %course_id,
            chapter = %chapter_id,
            kind = %chapter.kind(),
            "chapter saved"
        );
        Ok(chapter)
    }

    /// Chapters the learner may currently see, regular chapters first.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn visible_chapters(
        &self,
        learner_id: LearnerId,
        course_id: CourseId,
    ) -> Result<Vec<Chapter>, CourseServiceError> {
        let chapters = self.chapters.list_chapters(course_id).await?;
        let progress = self.progress.load_progress(learner_id, course_id).await?;
        Ok(self.gate.visible_chapters(&chapters, &progress))
    }

    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn summary(
        &self,
        learner_id: LearnerId,
        course_id: CourseId,
    ) -> Result<GateSummary, CourseServiceError> {
        let chapters = self.chapters.list_chapters(course_id).await?;
        let progress = self.progress.load_progress(learner_id, course_id).await?;
        Ok(self.gate.summary(&chapters, &progress))
    }

    /// Mark a chapter completed and return the updated gate summary.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::UnknownChapter` if the chapter is not in the course.
    /// Returns `CourseServiceError::AssessmentLocked` for an assessment that is not yet visible.
    /// Returns `CourseServiceError::Storage` if persistence fails.
    pub async fn complete_chapter(
        &self,
        learner_id: LearnerId,
        course_id: CourseId,
        chapter_id: ChapterId,
    ) -> Result<GateSummary, CourseServiceError> {
        let chapters = self.chapters.list_chapters(course_id).await?;
        let chapter = chapters
            .iter()
            .find(|c| c.id() == chapter_id)
            .ok_or(CourseServiceError::UnknownChapter {
                course_id,
                chapter_id,
            })?;

        let mut progress = self.progress.load_progress(learner_id, course_id).await?;
        if chapter.is_assessment() && !self.gate.assessments_unlocked(&chapters, &progress) {
            return Err(CourseServiceError::AssessmentLocked(chapter_id));
        }

        let now = self.clock.now();
        self.progress
            .set_completed(learner_id, course_id, chapter_id, true, now)
            .await?;
        progress.set_completed(chapter_id, true, now);

        let summary = self.gate.summary(&chapters, &progress);
        tracing::debug!(
            learner = %learner_id,
            course = %course_id,
            chapter = %chapter_id,
            unlocked = summary.assessments_unlocked,
            "chapter completed"
        );
        Ok(summary)
    }

    /// Drop a learner's progress in a course. Returns the number of removed entries.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn unenroll(
        &self,
        learner_id: LearnerId,
        course_id: CourseId,
    ) -> Result<u64, CourseServiceError> {
        let removed = self.progress.clear_progress(learner_id, course_id).await?;
        tracing::info!(learner = %learner_id, course = %course_id, removed, "learner unenrolled");
        Ok(removed)
    }
}
