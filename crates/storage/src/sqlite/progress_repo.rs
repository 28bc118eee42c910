use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lms_core::model::{ChapterId, CourseId, EnrollmentProgress, LearnerId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{
    chapter_id_from_i64, chapter_id_to_i64, course_id_to_i64, learner_id_to_i64, ser,
};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_progress(
        &self,
        learner_id: LearnerId,
        course_id: CourseId,
    ) -> Result<EnrollmentProgress, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT chapter_id, completed, updated_at
            FROM chapter_progress
            WHERE learner_id = ?1 AND course_id = ?2
            ",
        )
        .bind(learner_id_to_i64(learner_id)?)
        .bind(course_id_to_i64(course_id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut progress = EnrollmentProgress::new(learner_id, course_id);
        for row in rows {
            let chapter_id = chapter_id_from_i64(row.try_get::<i64, _>("chapter_id").map_err(ser)?)?;
            let completed = row.try_get::<i64, _>("completed").map_err(ser)? != 0;
            let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(ser)?;
            progress.set_completed(chapter_id, completed, updated_at);
        }
        Ok(progress)
    }

    async fn set_completed(
        &self,
        learner_id: LearnerId,
        course_id: CourseId,
        chapter_id: ChapterId,
        completed: bool,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO chapter_progress (learner_id, course_id, chapter_id, completed, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(learner_id, course_id, chapter_id) DO UPDATE SET
                completed = excluded.completed,
                updated_at = excluded.updated_at
            ",
        )
        .bind(learner_id_to_i64(learner_id)?)
        .bind(course_id_to_i64(course_id)?)
        .bind(chapter_id_to_i64(chapter_id)?)
        .bind(i64::from(completed))
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn clear_progress(
        &self,
        learner_id: LearnerId,
        course_id: CourseId,
    ) -> Result<u64, StorageError> {
        let res = sqlx::query(
            r"
            DELETE FROM chapter_progress
            WHERE learner_id = ?1 AND course_id = ?2
            ",
        )
        .bind(learner_id_to_i64(learner_id)?)
        .bind(course_id_to_i64(course_id)?)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.rows_affected())
    }
}
