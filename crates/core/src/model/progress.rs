use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::model::ids::{ChapterId, CourseId, LearnerId};

/// Completion state of one chapter for one learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterCompletion {
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

/// A learner's per-chapter completion flags within one course.
///
/// Chapters without an entry count as not completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentProgress {
    learner_id: LearnerId,
    course_id: CourseId,
    chapters: HashMap<ChapterId, ChapterCompletion>,
}

impl EnrollmentProgress {
    #[must_use]
    pub fn new(learner_id: LearnerId, course_id: CourseId) -> Self {
        Self {
            learner_id,
            course_id,
            chapters: HashMap::new(),
        }
    }

    #[must_use]
    pub fn learner_id(&self) -> LearnerId {
        self.learner_id
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    /// Records the completion flag for a chapter.
    pub fn set_completed(&mut self, chapter_id: ChapterId, completed: bool, at: DateTime<Utc>) {
        self.chapters.insert(
            chapter_id,
            ChapterCompletion {
                completed,
                updated_at: at,
            },
        );
    }

    #[must_use]
    pub fn is_completed(&self, chapter_id: ChapterId) -> bool {
        self.chapters
            .get(&chapter_id)
            .is_some_and(|entry| entry.completed)
    }

    #[must_use]
    pub fn completion(&self, chapter_id: ChapterId) -> Option<&ChapterCompletion> {
        self.chapters.get(&chapter_id)
    }

    /// Number of chapters explicitly marked completed.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.chapters.values().filter(|entry| entry.completed).count()
    }

    pub fn entries(&self) -> impl Iterator<Item = (ChapterId, &ChapterCompletion)> {
        self.chapters.iter().map(|(id, entry)| (*id, entry))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn missing_entries_are_not_completed() {
        let progress = EnrollmentProgress::new(LearnerId::new(1), CourseId::new(1));
        assert!(!progress.is_completed(ChapterId::new(9)));
        assert!(progress.is_empty());
    }

    #[test]
    fn set_completed_overwrites_previous_flag() {
        let mut progress = EnrollmentProgress::new(LearnerId::new(1), CourseId::new(1));
        progress.set_completed(ChapterId::new(1), true, fixed_now());
        assert!(progress.is_completed(ChapterId::new(1)));

        progress.set_completed(ChapterId::new(1), false, fixed_now());
        assert!(!progress.is_completed(ChapterId::new(1)));
        assert_eq!(progress.completed_count(), 0);
    }
}
