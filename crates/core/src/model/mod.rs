mod chapter;
mod ids;
mod progress;
pub mod project;

pub use chapter::{ASSESSMENT_KEYWORDS, Chapter, ChapterError, ChapterKind};
pub use ids::{ChapterId, CourseId, LearnerId, ParseIdError};
pub use progress::{ChapterCompletion, EnrollmentProgress};
pub use project::{FolderFacts, MetadataError, ProjectDescriptor, ProjectMetadata};
