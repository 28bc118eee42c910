use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{ChapterId, CourseId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChapterError {
    #[error("chapter title cannot be empty")]
    EmptyTitle,

    #[error("invalid chapter kind: {0}")]
    InvalidKind(String),
}

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

/// Title keywords that mark a chapter as an assessment when the kind is inferred.
pub const ASSESSMENT_KEYWORDS: [&str; 4] = ["assignment", "test", "exam", "final"];

/// Whether a chapter is ordinary course material or an assessment gated
/// behind the rest of the course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChapterKind {
    Regular,
    Assessment,
}

impl ChapterKind {
    /// Infers the kind from a chapter title.
    ///
    /// A title is an assessment iff it contains any of [`ASSESSMENT_KEYWORDS`],
    /// ignoring case. This is substring matching, so "Exam Preparation Overview"
    /// is classified as an assessment. Prefer setting the kind explicitly when
    /// the chapter is created.
    #[must_use]
    pub fn infer_from_title(title: &str) -> Self {
        let lowered = title.to_lowercase();
        if ASSESSMENT_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            Self::Assessment
        } else {
            Self::Regular
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Assessment => "assessment",
        }
    }

    #[must_use]
    pub fn is_assessment(&self) -> bool {
        matches!(self, Self::Assessment)
    }
}

impl fmt::Display for ChapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChapterKind {
    type Err = ChapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" => Ok(Self::Regular),
            "assessment" => Ok(Self::Assessment),
            _ => Err(ChapterError::InvalidKind(s.to_string())),
        }
    }
}

//
// ─── CHAPTER ───────────────────────────────────────────────────────────────────
//

/// A course chapter. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    id: ChapterId,
    course_id: CourseId,
    title: String,
    order: i64,
    kind: ChapterKind,
}

impl Chapter {
    /// Creates a chapter with an explicit kind.
    ///
    /// # Errors
    ///
    /// Returns `ChapterError::EmptyTitle` if the title is blank.
    pub fn new(
        id: ChapterId,
        course_id: CourseId,
        title: impl Into<String>,
        order: i64,
        kind: ChapterKind,
    ) -> Result<Self, ChapterError> {
        let title = title.into();
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(ChapterError::EmptyTitle);
        }

        Ok(Self {
            id,
            course_id,
            title: trimmed.to_string(),
            order,
            kind,
        })
    }

    /// Creates a chapter whose kind is inferred from its title.
    ///
    /// # Errors
    ///
    /// Returns `ChapterError::EmptyTitle` if the title is blank.
    pub fn from_title(
        id: ChapterId,
        course_id: CourseId,
        title: impl Into<String>,
        order: i64,
    ) -> Result<Self, ChapterError> {
        let title = title.into();
        let kind = ChapterKind::infer_from_title(&title);
        Self::new(id, course_id, title, order, kind)
    }

    #[must_use]
    pub fn id(&self) -> ChapterId {
        self.id
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn order(&self) -> i64 {
        self.order
    }

    #[must_use]
    pub fn kind(&self) -> ChapterKind {
        self.kind
    }

    #[must_use]
    pub fn is_assessment(&self) -> bool {
        self.kind.is_assessment()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(title: &str) -> Chapter {
        Chapter::from_title(ChapterId::new(1), CourseId::new(1), title, 0).unwrap()
    }

    #[test]
    fn infers_assessment_case_insensitively() {
        assert_eq!(chapter("Final_Assignment").kind(), ChapterKind::Assessment);
        assert_eq!(chapter("Unit TEST 3").kind(), ChapterKind::Assessment);
        assert_eq!(chapter("midterm exam").kind(), ChapterKind::Assessment);
        assert_eq!(chapter("Introduction").kind(), ChapterKind::Regular);
    }

    #[test]
    fn substring_matching_misclassifies_preparation_chapters() {
        assert_eq!(
            chapter("Exam Preparation Overview").kind(),
            ChapterKind::Assessment
        );
        assert_eq!(chapter("Contest Rules").kind(), ChapterKind::Assessment);
    }

    #[test]
    fn explicit_kind_overrides_title() {
        let c = Chapter::new(
            ChapterId::new(2),
            CourseId::new(1),
            "Exam Preparation Overview",
            1,
            ChapterKind::Regular,
        )
        .unwrap();
        assert_eq!(c.kind(), ChapterKind::Regular);
        assert!(!c.is_assessment());
    }

    #[test]
    fn rejects_blank_title() {
        let err = Chapter::from_title(ChapterId::new(1), CourseId::new(1), "   ", 0).unwrap_err();
        assert_eq!(err, ChapterError::EmptyTitle);
    }

    #[test]
    fn title_is_trimmed() {
        assert_eq!(chapter("  Basics ").title(), "Basics");
    }

    #[test]
    fn kind_parses_from_str() {
        assert_eq!("Assessment".parse::<ChapterKind>().unwrap(), ChapterKind::Assessment);
        assert_eq!("regular".parse::<ChapterKind>().unwrap(), ChapterKind::Regular);
        assert!("quiz".parse::<ChapterKind>().is_err());
    }
}
