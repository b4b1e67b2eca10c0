//! # Tutorials and Lessons

use serde::{Deserialize, Serialize};

use crate::identity::TutorialId;
use crate::workspace::Language;

/// How demanding a tutorial is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Difficulty {
    /// No prior knowledge assumed.
    Beginner,
    /// Builds on the beginner track.
    Intermediate,
    /// Production-level topics.
    Advanced,
}

impl Difficulty {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_lesson_minutes() -> u32 {
    5
}

fn default_lesson_language() -> Language {
    Language::Bash
}

/// One step of a tutorial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Lesson {
    /// Lesson heading.
    pub title: String,
    /// Explanatory prose.
    pub content: String,
    /// Snippet the learner can open in the workspace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_example: Option<String>,
    /// Language of `code_example`; decides which workspace file receives it.
    #[serde(default = "default_lesson_language")]
    pub language: Language,
    /// Estimated minutes.
    #[serde(default = "default_lesson_minutes")]
    pub duration: u32,
}

/// A tutorial with its ordered lessons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Tutorial {
    /// Stable slug.
    pub id: TutorialId,
    /// Display title.
    pub title: String,
    /// One-paragraph summary.
    pub description: String,
    /// Category used for filtering, e.g. `Git`, `GitHub Actions`.
    pub category: String,
    /// Difficulty level.
    pub difficulty: Difficulty,
    /// Estimated minutes for the whole tutorial.
    pub duration: u32,
    /// Icon key for the client.
    pub icon: String,
    /// Accent colour (CSS colour string).
    pub color: String,
    /// Sort key within the catalog.
    pub order: u32,
    /// Lessons in presentation order.
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Tutorial {
    /// Number of lessons.
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    /// Lesson at a zero-based step.
    pub fn lesson(&self, step: u32) -> Option<&Lesson> {
        self.lessons.get(step as usize)
    }

    /// Percentage through the tutorial when viewing `step`, as shown in the
    /// lesson header.
    pub fn step_percentage(&self, step: u32) -> f64 {
        if self.lessons.is_empty() {
            return 0.0;
        }
        let shown = (step as usize + 1).min(self.lessons.len());
        shown as f64 / self.lessons.len() as f64 * 100.0
    }
}
