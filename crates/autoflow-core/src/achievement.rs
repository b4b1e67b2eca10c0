//! # Achievements
//!
//! Badges shown on the learner profile. The set is fixed; whether each one
//! is earned is derived on demand from progress, the catalog, and whether
//! the learner has a deployed project. Nothing is stored.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::progress::ProgressBook;

/// Category whose completion earns [`AchievementId::WorkflowMaster`].
pub const WORKFLOW_CATEGORY: &str = "GitHub Actions";

/// Stable achievement identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum AchievementId {
    /// Finished at least one lesson.
    FirstCommit,
    /// Finished a GitHub Actions tutorial.
    WorkflowMaster,
    /// Published a project.
    Deployed,
    /// Finished every tutorial in the catalog.
    Completionist,
}

impl AchievementId {
    /// Every achievement, in display order.
    pub const ALL: [AchievementId; 4] = [
        Self::FirstCommit,
        Self::WorkflowMaster,
        Self::Deployed,
        Self::Completionist,
    ];

    fn presentation(self) -> (&'static str, &'static str, &'static str, &'static str) {
        match self {
            Self::FirstCommit => ("First Commit", "Made your first Git commit", "git", "#22c55e"),
            Self::WorkflowMaster => (
                "Workflow Master",
                "Created GitHub Actions workflow",
                "workflow",
                "#6366f1",
            ),
            Self::Deployed => ("Deployed", "First successful deployment", "deploy", "#f59e0b"),
            Self::Completionist => (
                "Completionist",
                "Completed every tutorial",
                "lock",
                "#9ca3af",
            ),
        }
    }
}

/// An achievement with its earned flag, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AchievementStatus {
    /// Identifier.
    pub id: AchievementId,
    /// Badge title.
    pub title: String,
    /// One-line description.
    pub description: String,
    /// Icon key for the client.
    pub icon: String,
    /// Accent colour.
    pub color: String,
    /// Whether the learner has earned it.
    pub earned: bool,
}

/// Evaluate every achievement for one learner.
pub fn evaluate_achievements(
    progress: &ProgressBook,
    catalog: &Catalog,
    has_deployment: bool,
) -> Vec<AchievementStatus> {
    AchievementId::ALL
        .iter()
        .map(|&id| {
            let earned = match id {
                AchievementId::FirstCommit => progress.entries().any(|e| e.started()),
                AchievementId::WorkflowMaster => catalog
                    .filter_by_category(Some(WORKFLOW_CATEGORY))
                    .iter()
                    .any(|t| progress.is_completed(&t.id)),
                AchievementId::Deployed => has_deployment,
                AchievementId::Completionist => {
                    !catalog.is_empty()
                        && catalog
                            .tutorials()
                            .iter()
                            .all(|t| progress.is_completed(&t.id))
                }
            };
            let (title, description, icon, color) = id.presentation();
            AchievementStatus {
                id,
                title: title.to_string(),
                description: description.to_string(),
                icon: icon.to_string(),
                color: color.to_string(),
                earned,
            }
        })
        .collect()
}
