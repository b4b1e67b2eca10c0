//! Project helpers shared by the API and the CLI.

use crate::workspace::FileSet;

/// Technology labels implied by the files, in first-appearance order,
/// without duplicates.
pub fn infer_technologies(files: &FileSet) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for file in files {
        if let Some(tech) = file.effective_language().technology() {
            if !out.iter().any(|t| t == tech) {
                out.push(tech.to_string());
            }
        }
    }
    out
}

/// Turn a free-form project name into a directory-safe slug:
/// lowercase, runs of other characters collapsed to `-`.
pub fn project_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.trim().chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    let slug = slug.trim_matches('.').to_string();
    if slug.is_empty() {
        "project".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::SourceFile;

    #[test]
    fn starter_technologies() {
        assert_eq!(
            infer_technologies(&FileSet::starter()),
            vec!["HTML", "CSS", "JavaScript"]
        );
    }

    #[test]
    fn technologies_skip_plain_text_and_duplicates() {
        let files = FileSet::from(vec![
            SourceFile::new("notes.txt", ""),
            SourceFile::new("a.css", ""),
            SourceFile::new("b.css", ""),
            SourceFile::new("ci.yml", ""),
        ]);
        assert_eq!(infer_technologies(&files), vec!["CSS", "YAML"]);
    }

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(project_slug("My First Website!"), "my-first-website");
        assert_eq!(project_slug("  autoflow-project "), "autoflow-project");
        assert_eq!(project_slug("../.."), "project");
        assert_eq!(project_slug("v1.2 release"), "v1.2-release");
    }
}
