use lms_core::model::{Chapter, ChapterId, ChapterKind, CourseId, LearnerId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn course_id_to_i64(id: CourseId) -> Result<i64, StorageError> {
    u64_to_i64("course_id", id.value())
}

pub(crate) fn chapter_id_to_i64(id: ChapterId) -> Result<i64, StorageError> {
    u64_to_i64("chapter_id", id.value())
}

pub(crate) fn learner_id_to_i64(id: LearnerId) -> Result<i64, StorageError> {
    u64_to_i64("learner_id", id.value())
}

pub(crate) fn chapter_id_from_i64(v: i64) -> Result<ChapterId, StorageError> {
    Ok(ChapterId::new(i64_to_u64("chapter_id", v)?))
}

pub(crate) fn course_id_from_i64(v: i64) -> Result<CourseId, StorageError> {
    Ok(CourseId::new(i64_to_u64("course_id", v)?))
}

pub(crate) fn parse_chapter_kind(s: &str) -> Result<ChapterKind, StorageError> {
    s.parse::<ChapterKind>().map_err(ser)
}

pub(crate) fn map_chapter_row(row: &SqliteRow) -> Result<Chapter, StorageError> {
    let kind: String = row.try_get("kind").map_err(ser)?;

    Chapter::new(
        chapter_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        course_id_from_i64(row.try_get::<i64, _>("course_id").map_err(ser)?)?,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<i64, _>("sort_order").map_err(ser)?,
        parse_chapter_kind(&kind)?,
    )
    .map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_ids_are_rejected() {
        assert!(chapter_id_from_i64(-1).is_err());
        assert_eq!(course_id_from_i64(4).unwrap(), CourseId::new(4));
    }

    #[test]
    fn unknown_kind_is_a_serialization_error() {
        assert!(matches!(
            parse_chapter_kind("quiz"),
            Err(StorageError::Serialization(_))
        ));
    }
}
