use lms_core::model::{Chapter, CourseId};

use super::SqliteRepository;
use super::mapping::{chapter_id_to_i64, course_id_to_i64, map_chapter_row};
use crate::repository::{ChapterRepository, StorageError};

#[async_trait::async_trait]
impl ChapterRepository for SqliteRepository {
    async fn upsert_chapter(&self, chapter: &Chapter) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO chapters (id, course_id, title, sort_order, kind)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(course_id, id) DO UPDATE SET
                title = excluded.title,
                sort_order = excluded.sort_order,
                kind = excluded.kind
            ",
        )
        .bind(chapter_id_to_i64(chapter.id())?)
        .bind(course_id_to_i64(chapter.course_id())?)
        .bind(chapter.title())
        .bind(chapter.order())
        .bind(chapter.kind().as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn list_chapters(&self, course_id: CourseId) -> Result<Vec<Chapter>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, course_id, title, sort_order, kind
            FROM chapters
            WHERE course_id = ?1
            ORDER BY sort_order ASC, id ASC
            ",
        )
        .bind(course_id_to_i64(course_id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut chapters = Vec::with_capacity(rows.len());
        for row in rows {
            chapters.push(map_chapter_row(&row)?);
        }
        Ok(chapters)
    }
}
