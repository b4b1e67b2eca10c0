//! # Tutorial Catalog
//!
//! The catalog is the read-only set of tutorials the platform serves. It is
//! loaded once at startup, either from the embedded default
//! (`data/tutorials.yaml`) or from an operator-supplied YAML/JSON file.
//!
//! Validation happens at load time: ids are unique, titles are non-empty,
//! and every tutorial has at least one lesson. Tutorials are kept sorted
//! by their `order` field (stable for equal keys).

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, ProgressError};
use crate::tutorial::Tutorial;

const BUILTIN_CATALOG: &str = include_str!("../data/tutorials.yaml");

/// Category filter value that disables filtering.
pub const ALL_CATEGORIES: &str = "All";

/// Number of tutorials in a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CategoryCount {
    /// Category name.
    pub category: String,
    /// Tutorials in that category.
    pub count: usize,
}

/// Validated, ordered tutorial catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tutorials: Vec<Tutorial>,
}

impl Catalog {
    /// Validate and sort a list of tutorials.
    pub fn new(mut tutorials: Vec<Tutorial>) -> Result<Self, CatalogError> {
        let mut ids = HashSet::new();
        for tutorial in &tutorials {
            if !ids.insert(tutorial.id.as_str().to_string()) {
                return Err(CatalogError::DuplicateId(tutorial.id.to_string()));
            }
            if tutorial.title.trim().is_empty() {
                return Err(CatalogError::EmptyTitle(tutorial.id.to_string()));
            }
            if tutorial.lessons.is_empty() {
                return Err(CatalogError::NoLessons(tutorial.id.to_string()));
            }
        }
        tutorials.sort_by_key(|t| t.order);
        Ok(Self { tutorials })
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// Parse a YAML list of tutorials.
    pub fn from_yaml_str(raw: &str) -> Result<Self, CatalogError> {
        let tutorials: Vec<Tutorial> = serde_yaml::from_str(raw)?;
        Self::new(tutorials)
    }

    /// Parse a JSON array of tutorials.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let tutorials: Vec<Tutorial> = serde_json::from_str(raw)?;
        Self::new(tutorials)
    }

    /// Load a catalog file; the format follows the extension.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&raw)?,
            "json" => Self::from_json_str(&raw)?,
            other => return Err(CatalogError::UnsupportedFormat(other.to_string())),
        };
        tracing::info!(
            path = %path.display(),
            tutorials = catalog.len(),
            "loaded tutorial catalog"
        );
        Ok(catalog)
    }

    /// All tutorials in catalog order.
    pub fn tutorials(&self) -> &[Tutorial] {
        &self.tutorials
    }

    /// Look up a tutorial by id.
    pub fn get(&self, id: &str) -> Option<&Tutorial> {
        self.tutorials.iter().find(|t| t.id.as_str() == id)
    }

    /// Tutorials in `category`, or all of them for `None` / `"All"`.
    pub fn filter_by_category(&self, category: Option<&str>) -> Vec<&Tutorial> {
        match category {
            None | Some(ALL_CATEGORIES) => self.tutorials.iter().collect(),
            Some(wanted) => self
                .tutorials
                .iter()
                .filter(|t| t.category == wanted)
                .collect(),
        }
    }

    /// Every category with its tutorial count, in first-appearance order.
    pub fn categories(&self) -> Vec<CategoryCount> {
        let mut out: Vec<CategoryCount> = Vec::new();
        for tutorial in &self.tutorials {
            match out.iter_mut().find(|c| c.category == tutorial.category) {
                Some(entry) => entry.count += 1,
                None => out.push(CategoryCount {
                    category: tutorial.category.clone(),
                    count: 1,
                }),
            }
        }
        out
    }

    /// Resolve a tutorial and check that `step` names one of its lessons.
    pub fn check_step(&self, id: &str, step: u32) -> Result<&Tutorial, ProgressError> {
        let tutorial = self
            .get(id)
            .ok_or_else(|| ProgressError::UnknownTutorial(id.to_string()))?;
        if step as usize >= tutorial.lesson_count() {
            return Err(ProgressError::StepOutOfRange {
                tutorial: id.to_string(),
                step,
                lesson_count: tutorial.lesson_count(),
            });
        }
        Ok(tutorial)
    }

    /// Number of tutorials.
    pub fn len(&self) -> usize {
        self.tutorials.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.tutorials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TWO_TUTORIALS: &str = r##"
- id: second
  title: Second
  description: d
  category: Git
  difficulty: beginner
  duration: 10
  icon: git
  color: "#000"
  order: 2
  lessons:
    - title: l
      content: c
- id: first
  title: First
  description: d
  category: Deployment
  difficulty: advanced
  duration: 10
  icon: deploy
  color: "#fff"
  order: 1
  lessons:
    - title: l
      content: c
"##;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.tutorials()[0].id.as_str(), "git-basics");
        assert!(catalog.get("github-actions").is_some());
    }

    #[test]
    fn tutorials_sorted_by_order() {
        let catalog = Catalog::from_yaml_str(TWO_TUTORIALS).unwrap();
        let ids: Vec<&str> = catalog.tutorials().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let doubled = TWO_TUTORIALS.replace("id: second", "id: first");
        assert!(matches!(
            Catalog::from_yaml_str(&doubled),
            Err(CatalogError::DuplicateId(id)) if id == "first"
        ));
    }

    #[test]
    fn tutorial_without_lessons_rejected() {
        let raw = r#"[{"id":"x","title":"X","description":"d","category":"c",
            "difficulty":"beginner","duration":1,"icon":"i","color":"c","order":1}]"#;
        assert!(matches!(
            Catalog::from_json_str(raw),
            Err(CatalogError::NoLessons(id)) if id == "x"
        ));
    }

    #[test]
    fn invalid_tutorial_id_is_a_parse_error() {
        let raw = TWO_TUTORIALS.replace("id: second", "id: Second Tutorial");
        assert!(matches!(
            Catalog::from_yaml_str(&raw),
            Err(CatalogError::Yaml(_))
        ));
    }

    #[test]
    fn category_filter_and_counts() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.filter_by_category(None).len(), 3);
        assert_eq!(catalog.filter_by_category(Some("All")).len(), 3);
        let git = catalog.filter_by_category(Some("Git"));
        assert_eq!(git.len(), 1);
        assert_eq!(git[0].id.as_str(), "git-basics");
        assert!(catalog.filter_by_category(Some("Nope")).is_empty());

        let categories = catalog.categories();
        assert_eq!(categories[0].category, "Git");
        assert_eq!(categories.iter().map(|c| c.count).sum::<usize>(), 3);
    }

    #[test]
    fn check_step_bounds() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.check_step("git-basics", 3).is_ok());
        assert!(matches!(
            catalog.check_step("git-basics", 4),
            Err(ProgressError::StepOutOfRange { lesson_count: 4, .. })
        ));
        assert!(matches!(
            catalog.check_step("missing", 0),
            Err(ProgressError::UnknownTutorial(_))
        ));
    }

    #[test]
    fn from_path_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml_path = dir.path().join("catalog.yml");
        std::fs::File::create(&yaml_path)
            .unwrap()
            .write_all(TWO_TUTORIALS.as_bytes())
            .unwrap();
        assert_eq!(Catalog::from_path(&yaml_path).unwrap().len(), 2);

        let txt_path = dir.path().join("catalog.txt");
        std::fs::write(&txt_path, "").unwrap();
        assert!(matches!(
            Catalog::from_path(&txt_path),
            Err(CatalogError::UnsupportedFormat(ext)) if ext == "txt"
        ));

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            Catalog::from_path(&missing),
            Err(CatalogError::Io { .. })
        ));
    }
}
