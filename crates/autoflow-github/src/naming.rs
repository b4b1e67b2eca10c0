//! Repository naming.

use crate::error::GitHubError;

/// Longest repository name GitHub accepts.
pub const MAX_REPOSITORY_NAME: usize = 100;

/// Derive a repository name from a free-form project name.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9._-]` to a
/// single `-`, trims leading and trailing `-`/`.`, and caps the result at
/// [`MAX_REPOSITORY_NAME`] characters.
pub fn repository_name(project_name: &str) -> Result<String, GitHubError> {
    let mut name = String::with_capacity(project_name.len());
    let mut last_dash = false;
    for c in project_name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-') {
            name.push(c);
            last_dash = c == '-';
        } else if !last_dash {
            name.push('-');
            last_dash = true;
        }
    }
    let trimmed: String = name
        .trim_matches(|c| c == '-' || c == '.')
        .chars()
        .take(MAX_REPOSITORY_NAME)
        .collect();
    let trimmed = trimmed.trim_end_matches(|c| c == '-' || c == '.');
    if trimmed.is_empty() {
        return Err(GitHubError::InvalidRepositoryName(project_name.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_collapses() {
        assert_eq!(repository_name("My First Website").unwrap(), "my-first-website");
        assert_eq!(repository_name("AutoFlow :: Project!!").unwrap(), "autoflow-project");
        assert_eq!(repository_name("site_v1.2").unwrap(), "site_v1.2");
    }

    #[test]
    fn trims_edges() {
        assert_eq!(repository_name("  ..hello..  ").unwrap(), "hello");
        assert_eq!(repository_name("-x-").unwrap(), "x");
    }

    #[test]
    fn caps_length() {
        let long = "a".repeat(150);
        assert_eq!(repository_name(&long).unwrap().len(), MAX_REPOSITORY_NAME);
    }

    #[test]
    fn rejects_names_without_usable_characters() {
        assert!(matches!(
            repository_name("!!!"),
            Err(GitHubError::InvalidRepositoryName(_))
        ));
        assert!(repository_name("").is_err());
        assert!(repository_name("日本").is_err());
    }
}
