//! # Progress Tracking
//!
//! A [`ProgressBook`] holds one learner's progress across tutorials.
//!
//! ## Invariants
//!
//! - `current_step` never decreases: marking an earlier step complete after
//!   a later one is a no-op.
//! - `completed_at` records the *first* completion; completing again keeps it.
//! - The overall total is at least [`MIN_OVERALL_TOTAL`], so a learner who
//!   has touched a single tutorial does not see 100% immediately.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::TutorialId;

/// Lower bound for the denominator of [`ProgressBook::overall`].
pub const MIN_OVERALL_TOTAL: usize = 3;

/// Progress on a single tutorial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TutorialProgress {
    /// Tutorial this entry belongs to.
    pub tutorial_id: TutorialId,
    /// Number of lessons finished; the next lesson to show.
    pub current_step: u32,
    /// Whether the learner finished the tutorial.
    pub completed: bool,
    /// First completion time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TutorialProgress {
    /// Fresh, untouched entry.
    pub fn new(tutorial_id: TutorialId) -> Self {
        Self {
            tutorial_id,
            current_step: 0,
            completed: false,
            completed_at: None,
        }
    }

    /// Whether the learner has done anything in this tutorial.
    pub fn started(&self) -> bool {
        self.current_step > 0 || self.completed
    }
}

/// Aggregate across all tutorials.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OverallProgress {
    /// Completed tutorials.
    pub completed: usize,
    /// Denominator, never below [`MIN_OVERALL_TOTAL`].
    pub total: usize,
    /// `completed / total * 100`.
    pub percentage: f64,
}

/// Per-learner progress, keyed by tutorial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressBook {
    entries: BTreeMap<TutorialId, TutorialProgress>,
}

impl ProgressBook {
    /// Empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for one tutorial, if any.
    pub fn get(&self, tutorial_id: &TutorialId) -> Option<&TutorialProgress> {
        self.entries.get(tutorial_id)
    }

    /// All entries ordered by tutorial id.
    pub fn entries(&self) -> impl Iterator<Item = &TutorialProgress> {
        self.entries.values()
    }

    /// Insert or replace an entry verbatim (used when hydrating from storage).
    pub fn insert(&mut self, entry: TutorialProgress) {
        self.entries.insert(entry.tutorial_id.clone(), entry);
    }

    fn entry_mut(&mut self, tutorial_id: &TutorialId) -> &mut TutorialProgress {
        self.entries
            .entry(tutorial_id.clone())
            .or_insert_with(|| TutorialProgress::new(tutorial_id.clone()))
    }

    /// Record that the zero-based `step` is done.
    pub fn mark_step_complete(&mut self, tutorial_id: &TutorialId, step: u32) -> &TutorialProgress {
        let entry = self.entry_mut(tutorial_id);
        entry.current_step = entry.current_step.max(step.saturating_add(1));
        entry
    }

    /// Record that the whole tutorial is done at `now`.
    pub fn mark_tutorial_complete(
        &mut self,
        tutorial_id: &TutorialId,
        now: DateTime<Utc>,
    ) -> &TutorialProgress {
        let entry = self.entry_mut(tutorial_id);
        entry.completed = true;
        entry.completed_at.get_or_insert(now);
        entry
    }

    /// Whether a tutorial is completed.
    pub fn is_completed(&self, tutorial_id: &TutorialId) -> bool {
        self.entries.get(tutorial_id).is_some_and(|e| e.completed)
    }

    /// Completion summary across every tracked tutorial.
    pub fn overall(&self) -> OverallProgress {
        let completed = self.entries.values().filter(|e| e.completed).count();
        let total = self.entries.len().max(MIN_OVERALL_TOTAL);
        let percentage = completed as f64 / total as f64 * 100.0;
        OverallProgress {
            completed,
            total,
            percentage,
        }
    }

    /// Number of tracked tutorials.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is tracked yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tid(s: &str) -> TutorialId {
        TutorialId::new(s).unwrap()
    }

    #[test]
    fn mark_step_advances_to_next_lesson() {
        let mut book = ProgressBook::new();
        let entry = book.mark_step_complete(&tid("git-basics"), 0);
        assert_eq!(entry.current_step, 1);
        assert!(!entry.completed);
        assert!(entry.started());
    }

    #[test]
    fn mark_step_never_goes_backwards() {
        let mut book = ProgressBook::new();
        book.mark_step_complete(&tid("git-basics"), 3);
        let entry = book.mark_step_complete(&tid("git-basics"), 1);
        assert_eq!(entry.current_step, 4);
    }

    #[test]
    fn completion_timestamp_is_sticky() {
        let mut book = ProgressBook::new();
        let first = Utc::now();
        let later = first + chrono::Duration::hours(1);
        book.mark_tutorial_complete(&tid("deploy-web"), first);
        let entry = book.mark_tutorial_complete(&tid("deploy-web"), later);
        assert!(entry.completed);
        assert_eq!(entry.completed_at, Some(first));
        assert!(book.is_completed(&tid("deploy-web")));
    }

    #[test]
    fn overall_uses_minimum_total() {
        let mut book = ProgressBook::new();
        assert_eq!(
            book.overall(),
            OverallProgress {
                completed: 0,
                total: 3,
                percentage: 0.0
            }
        );
        book.mark_tutorial_complete(&tid("a"), Utc::now());
        let overall = book.overall();
        assert_eq!(overall.completed, 1);
        assert_eq!(overall.total, 3);
        assert!((overall.percentage - 33.333).abs() < 0.01);
    }

    #[test]
    fn overall_grows_past_minimum() {
        let mut book = ProgressBook::new();
        for id in ["a", "b", "c", "d"] {
            book.mark_tutorial_complete(&tid(id), Utc::now());
        }
        let overall = book.overall();
        assert_eq!(overall.total, 4);
        assert_eq!(overall.percentage, 100.0);
    }

    #[test]
    fn book_serializes_as_map() {
        let mut book = ProgressBook::new();
        book.mark_step_complete(&tid("git-basics"), 0);
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["git-basics"]["current_step"], 1);
        let back: ProgressBook = serde_json::from_value(json).unwrap();
        assert_eq!(back, book);
    }

    proptest! {
        #[test]
        fn current_step_is_monotonic(steps in proptest::collection::vec(0u32..50, 1..20)) {
            let mut book = ProgressBook::new();
            let id = tid("t");
            let mut previous = 0;
            for step in steps {
                let current = book.mark_step_complete(&id, step).current_step;
                prop_assert!(current >= previous);
                prop_assert!(current > step);
                previous = current;
            }
        }
    }
}
