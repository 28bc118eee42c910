use serde::Serialize;

use crate::model::{Chapter, EnrollmentProgress};

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

/// Controls how assessment chapters are unlocked.
///
/// # Empty regular set
///
/// A course made only of assessment chapters has no regular chapters to
/// complete. The default policy keeps its assessments hidden
/// (`unlock_when_no_regular = false`). Set the flag to treat the empty set as
/// complete instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GatePolicy {
    pub unlock_when_no_regular: bool,
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Aggregated gate state for a learner in a course, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateSummary {
    pub regular_total: usize,
    pub regular_completed: usize,
    pub assessment_total: usize,
    pub assessments_unlocked: bool,
}

//
// ─── GATE ──────────────────────────────────────────────────────────────────────
//

/// Reveals assessment chapters once every regular chapter is completed.
///
/// # Examples
///
/// ```
/// # use lms_core::gate::ChapterGate;
/// # use lms_core::model::{Chapter, ChapterId, CourseId, EnrollmentProgress, LearnerId};
/// # use lms_core::time::fixed_now;
/// let course = CourseId::new(1);
/// let chapters = vec![
///     Chapter::from_title(ChapterId::new(1), course, "Intro", 1)?,
///     Chapter::from_title(ChapterId::new(2), course, "Final_Assignment", 2)?,
/// ];
/// let mut progress = EnrollmentProgress::new(LearnerId::new(1), course);
///
/// let gate = ChapterGate::new();
/// assert_eq!(gate.visible_chapters(&chapters, &progress).len(), 1);
///
/// progress.set_completed(ChapterId::new(1), true, fixed_now());
/// assert_eq!(gate.visible_chapters(&chapters, &progress).len(), 2);
/// # Ok::<(), lms_core::model::ChapterError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ChapterGate {
    policy: GatePolicy,
}

impl ChapterGate {
    /// Gate with the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(GatePolicy::default())
    }

    #[must_use]
    pub fn with_policy(policy: GatePolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> GatePolicy {
        self.policy
    }

    /// Returns the chapters a learner may see: regular chapters in their
    /// given order, followed by assessment chapters when unlocked.
    #[must_use]
    pub fn visible_chapters(
        &self,
        chapters: &[Chapter],
        progress: &EnrollmentProgress,
    ) -> Vec<Chapter> {
        let (regular, assessment) = partition(chapters);
        let mut visible: Vec<Chapter> = regular.iter().map(|c| (*c).clone()).collect();
        if self.regular_completed(&regular, progress) {
            visible.extend(assessment.into_iter().cloned());
        }
        visible
    }

    /// True when assessment chapters are revealed for this learner.
    #[must_use]
    pub fn assessments_unlocked(&self, chapters: &[Chapter], progress: &EnrollmentProgress) -> bool {
        let (regular, _) = partition(chapters);
        self.regular_completed(&regular, progress)
    }

    #[must_use]
    pub fn summary(&self, chapters: &[Chapter], progress: &EnrollmentProgress) -> GateSummary {
        let (regular, assessment) = partition(chapters);
        let regular_completed = regular
            .iter()
            .filter(|c| progress.is_completed(c.id()))
            .count();

        GateSummary {
            regular_total: regular.len(),
            regular_completed,
            assessment_total: assessment.len(),
            assessments_unlocked: self.regular_completed(&regular, progress),
        }
    }

    fn regular_completed(&self, regular: &[&Chapter], progress: &EnrollmentProgress) -> bool {
        if regular.is_empty() {
            return self.policy.unlock_when_no_regular;
        }
        regular.iter().all(|c| progress.is_completed(c.id()))
    }
}

/// Splits chapters into (regular, assessment), keeping relative order in each.
#[must_use]
pub fn partition(chapters: &[Chapter]) -> (Vec<&Chapter>, Vec<&Chapter>) {
    chapters.iter().partition(|c| !c.is_assessment())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChapterId, ChapterKind, CourseId, LearnerId};
    use crate::time::fixed_now;

    fn chapters(titles: &[&str]) -> Vec<Chapter> {
        titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                Chapter::from_title(ChapterId::new(i as u64 + 1), CourseId::new(1), *title, i as i64)
                    .unwrap()
            })
            .collect()
    }

    fn progress(done: &[u64]) -> EnrollmentProgress {
        let mut p = EnrollmentProgress::new(LearnerId::new(1), CourseId::new(1));
        for id in done {
            p.set_completed(ChapterId::new(*id), true, fixed_now());
        }
        p
    }

    fn titles(list: &[Chapter]) -> Vec<&str> {
        list.iter().map(Chapter::title).collect()
    }

    #[test]
    fn no_assessments_returns_input_unchanged() {
        let all = chapters(&["Intro", "Basics", "Advanced Topics"]);
        let gate = ChapterGate::new();
        assert_eq!(gate.visible_chapters(&all, &progress(&[])), all);
        assert_eq!(gate.visible_chapters(&all, &progress(&[1, 2, 3])), all);
    }

    #[test]
    fn all_regular_completed_reveals_assessments_last() {
        let all = chapters(&["Intro", "Basics", "Final_Assignment"]);
        let visible = ChapterGate::new().visible_chapters(&all, &progress(&[1, 2]));
        assert_eq!(titles(&visible), vec!["Intro", "Basics", "Final_Assignment"]);
    }

    #[test]
    fn incomplete_regular_hides_assessments() {
        let all = chapters(&["Intro", "Basics", "Final_Assignment"]);
        let mut p = progress(&[1]);
        p.set_completed(ChapterId::new(2), false, fixed_now());
        let visible = ChapterGate::new().visible_chapters(&all, &p);
        assert_eq!(titles(&visible), vec!["Intro", "Basics"]);
    }

    #[test]
    fn assessments_move_after_regular_but_keep_their_order() {
        let all = chapters(&["Midterm Exam", "Intro", "Unit Test", "Wrap Up"]);
        let visible = ChapterGate::new().visible_chapters(&all, &progress(&[2, 4]));
        assert_eq!(
            titles(&visible),
            vec!["Intro", "Wrap Up", "Midterm Exam", "Unit Test"]
        );
    }

    #[test]
    fn empty_regular_set_never_reveals_assessments_by_default() {
        let all = chapters(&["Exam 1", "Final"]);
        let gate = ChapterGate::new();
        assert!(gate.visible_chapters(&all, &progress(&[])).is_empty());
        assert!(gate.visible_chapters(&all, &progress(&[1, 2])).is_empty());
        assert!(!gate.assessments_unlocked(&all, &progress(&[1, 2])));
    }

    #[test]
    fn empty_regular_set_unlocks_with_opt_in_policy() {
        let all = chapters(&["Exam 1", "Final"]);
        let gate = ChapterGate::with_policy(GatePolicy {
            unlock_when_no_regular: true,
        });
        assert_eq!(gate.visible_chapters(&all, &progress(&[])).len(), 2);
    }

    #[test]
    fn completion_entries_for_unknown_chapters_are_ignored() {
        let all = chapters(&["Intro", "Final"]);
        let visible = ChapterGate::new().visible_chapters(&all, &progress(&[42]));
        assert_eq!(titles(&visible), vec!["Intro"]);
    }

    #[test]
    fn explicit_kind_is_used_instead_of_title() {
        let course = CourseId::new(1);
        let all = vec![
            Chapter::new(ChapterId::new(1), course, "Exam Preparation", 1, ChapterKind::Regular)
                .unwrap(),
            Chapter::new(ChapterId::new(2), course, "Capstone", 2, ChapterKind::Assessment)
                .unwrap(),
        ];
        let gate = ChapterGate::new();
        assert_eq!(titles(&gate.visible_chapters(&all, &progress(&[]))), vec!["Exam Preparation"]);
        assert_eq!(gate.visible_chapters(&all, &progress(&[1])).len(), 2);
    }

    #[test]
    fn summary_counts_each_group() {
        let all = chapters(&["Intro", "Basics", "Quiz Test", "Final"]);
        let summary = ChapterGate::new().summary(&all, &progress(&[1, 3]));
        assert_eq!(
            summary,
            GateSummary {
                regular_total: 2,
                regular_completed: 1,
                assessment_total: 2,
                assessments_unlocked: false,
            }
        );
    }
}
