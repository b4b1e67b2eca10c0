//! # Workspace Files
//!
//! The editor workspace is an ordered list of [`SourceFile`]s. Order matters:
//! the preview composer picks the *first* HTML file as the entry document,
//! and the file tabs are displayed in the same order.
//!
//! Push and export requests carry files as a name→content map; [`FileSet::to_map`]
//! and [`FileSet::from_map`] convert between the two shapes.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ValidationError;

/// Language tag of a workspace file, used for editor highlighting and
/// technology inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Language {
    /// HTML document.
    Html,
    /// Cascading style sheet.
    Css,
    /// JavaScript source.
    #[serde(alias = "js")]
    Javascript,
    /// JSON data.
    Json,
    /// Markdown text.
    Markdown,
    /// Shell commands.
    #[serde(alias = "shell", alias = "sh")]
    Bash,
    /// YAML (workflow files).
    #[serde(alias = "yml")]
    Yaml,
    /// Anything else, including unknown tags.
    #[default]
    #[serde(other)]
    Text,
}

impl Language {
    /// Infer the language from a file name's extension.
    pub fn from_file_name(name: &str) -> Self {
        let ext = match name.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return Self::Text,
        };
        match ext.as_str() {
            "html" | "htm" => Self::Html,
            "css" => Self::Css,
            "js" | "mjs" => Self::Javascript,
            "json" => Self::Json,
            "md" | "markdown" => Self::Markdown,
            "sh" | "bash" => Self::Bash,
            "yml" | "yaml" => Self::Yaml,
            _ => Self::Text,
        }
    }

    /// File name a snippet in this language is loaded into.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::Bash => "commands.sh",
            Self::Yaml => "workflow.yml",
            Self::Html => "index.html",
            Self::Css => "style.css",
            Self::Javascript => "app.js",
            Self::Json | Self::Markdown | Self::Text => "code.txt",
        }
    }

    /// Wire name of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::Javascript => "javascript",
            Self::Json => "json",
            Self::Markdown => "markdown",
            Self::Bash => "bash",
            Self::Yaml => "yaml",
            Self::Text => "text",
        }
    }

    /// Human-readable technology label, if this language counts as one.
    pub fn technology(&self) -> Option<&'static str> {
        match self {
            Self::Html => Some("HTML"),
            Self::Css => Some("CSS"),
            Self::Javascript => Some("JavaScript"),
            Self::Yaml => Some("YAML"),
            Self::Bash => Some("Shell"),
            Self::Json | Self::Markdown | Self::Text => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single editor file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SourceFile {
    /// File name including extension, e.g. `index.html`.
    pub name: String,
    /// Declared language. Missing or unknown tags deserialize as `text`.
    #[serde(default)]
    pub language: Language,
    /// Full text content.
    #[serde(default)]
    pub content: String,
}

impl SourceFile {
    /// Create a file, inferring its language from the name.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        let language = Language::from_file_name(&name);
        Self {
            name,
            language,
            content: content.into(),
        }
    }

    /// Create a file with an explicit language tag.
    pub fn with_language(
        name: impl Into<String>,
        language: Language,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            language,
            content: content.into(),
        }
    }

    /// The declared language, or the one implied by the extension when the
    /// declaration is the catch-all `text`.
    pub fn effective_language(&self) -> Language {
        match self.language {
            Language::Text => Language::from_file_name(&self.name),
            declared => declared,
        }
    }
}

/// Ordered collection of workspace files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileSet {
    files: Vec<SourceFile>,
}

impl FileSet {
    /// Maximum number of files in one set.
    pub const MAX_FILES: usize = 64;
    /// Maximum combined content size in bytes.
    pub const MAX_TOTAL_BYTES: usize = 1024 * 1024;
    /// Maximum length of a single file name in bytes.
    pub const MAX_NAME_BYTES: usize = 255;

    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The workspace a new learner starts with: a page that links a
    /// stylesheet and a script.
    pub fn starter() -> Self {
        Self {
            files: vec![
                SourceFile::with_language("index.html", Language::Html, STARTER_HTML),
                SourceFile::with_language("style.css", Language::Css, STARTER_CSS),
                SourceFile::with_language("app.js", Language::Javascript, STARTER_JS),
            ],
        }
    }

    /// Build a set from a name→content map. Languages are inferred.
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        Self {
            files: map
                .iter()
                .map(|(name, content)| SourceFile::new(name.clone(), content.clone()))
                .collect(),
        }
    }

    /// Name→content map. When names repeat, the first file wins.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for file in &self.files {
            map.entry(file.name.clone())
                .or_insert_with(|| file.content.clone());
        }
        map
    }

    /// Append a file.
    pub fn push(&mut self, file: SourceFile) {
        self.files.push(file);
    }

    /// Replace the content of the file called `name`, or append a new one.
    pub fn upsert(&mut self, name: &str, language: Language, content: impl Into<String>) {
        let content = content.into();
        match self.files.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.content = content,
            None => self
                .files
                .push(SourceFile::with_language(name, language, content)),
        }
    }

    /// Load a code snippet into the file conventionally used for its language.
    /// Returns the name of the file that received the snippet.
    pub fn load_snippet(&mut self, language: Language, code: impl Into<String>) -> &'static str {
        let name = language.default_file_name();
        self.upsert(name, language, code);
        name
    }

    /// Look up a file by name.
    pub fn get(&self, name: &str) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Iterate in order.
    pub fn iter(&self) -> std::slice::Iter<'_, SourceFile> {
        self.files.iter()
    }

    /// Borrow the files as a slice.
    pub fn as_slice(&self) -> &[SourceFile] {
        &self.files
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total content size in bytes.
    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.content.len()).sum()
    }

    /// Check count, size, and name constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.files.len() > Self::MAX_FILES {
            return Err(ValidationError::TooManyFiles {
                count: self.files.len(),
                max: Self::MAX_FILES,
            });
        }
        let bytes = self.total_bytes();
        if bytes > Self::MAX_TOTAL_BYTES {
            return Err(ValidationError::FileSetTooLarge {
                bytes,
                max: Self::MAX_TOTAL_BYTES,
            });
        }
        let mut seen = HashSet::new();
        for file in &self.files {
            validate_file_name(&file.name)?;
            if !seen.insert(file.name.as_str()) {
                return Err(ValidationError::DuplicateFileName(file.name.clone()));
            }
        }
        Ok(())
    }

    /// Hex SHA-256 over every name and content, length-prefixed so that
    /// moving bytes between fields changes the digest.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for file in &self.files {
            hasher.update((file.name.len() as u64).to_be_bytes());
            hasher.update(file.name.as_bytes());
            hasher.update((file.content.len() as u64).to_be_bytes());
            hasher.update(file.content.as_bytes());
        }
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

impl From<Vec<SourceFile>> for FileSet {
    fn from(files: Vec<SourceFile>) -> Self {
        Self { files }
    }
}

impl FromIterator<SourceFile> for FileSet {
    fn from_iter<I: IntoIterator<Item = SourceFile>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a SourceFile;
    type IntoIter = std::slice::Iter<'a, SourceFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Reject names that could escape an archive root or a repository tree.
pub fn validate_file_name(name: &str) -> Result<(), ValidationError> {
    let invalid = |reason| ValidationError::InvalidFileName {
        name: name.to_string(),
        reason,
    };
    if name.is_empty() {
        return Err(ValidationError::EmptyFileName);
    }
    if name.len() > FileSet::MAX_NAME_BYTES {
        return Err(invalid("name exceeds 255 bytes"));
    }
    if name == "." || name == ".." {
        return Err(invalid("dot entries are not allowed"));
    }
    if name.contains(['/', '\\']) {
        return Err(invalid("path separators are not allowed"));
    }
    if name.chars().any(char::is_control) {
        return Err(invalid("control characters are not allowed"));
    }
    Ok(())
}

const STARTER_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>My First Project</title>
    <link rel="stylesheet" href="style.css">
</head>
<body>
    <div class="container">
        <h1>Welcome to CI/CD!</h1>
        <p>This is my first project with Git.</p>
        <button id="clickMe">Click Me!</button>
    </div>
    <script src="app.js"></script>
</body>
</html>"#;

const STARTER_CSS: &str = r#".container {
  max-width: 800px;
  margin: 0 auto;
  padding: 2rem;
  text-align: center;
  font-family: Arial, sans-serif;
}

h1 {
  color: #0ea5a4;
  margin-bottom: 1rem;
}

button {
  background: #6366f1;
  color: white;
  border: none;
  padding: 0.75rem 1.5rem;
  border-radius: 0.5rem;
  cursor: pointer;
  font-size: 1rem;
}

button:hover {
  background: #5b5beb;
}"#;

const STARTER_JS: &str = r#"document.addEventListener('DOMContentLoaded', function() {
    const button = document.getElementById('clickMe');

    button.addEventListener('click', function() {
        alert('Hello from AutoFlow Learn!');
        console.log('Button clicked at:', new Date().toLocaleTimeString());
    });

    console.log('App initialized successfully');
});"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_inferred_from_extension() {
        assert_eq!(Language::from_file_name("app.js"), Language::Javascript);
        assert_eq!(Language::from_file_name("INDEX.HTML"), Language::Html);
        assert_eq!(Language::from_file_name("ci.yml"), Language::Yaml);
        assert_eq!(Language::from_file_name("README.md"), Language::Markdown);
        assert_eq!(Language::from_file_name("Makefile"), Language::Text);
        assert_eq!(Language::from_file_name("data.bin"), Language::Text);
    }

    #[test]
    fn default_file_names_match_workspace_conventions() {
        assert_eq!(Language::Bash.default_file_name(), "commands.sh");
        assert_eq!(Language::Yaml.default_file_name(), "workflow.yml");
        assert_eq!(Language::Html.default_file_name(), "index.html");
        assert_eq!(Language::Css.default_file_name(), "style.css");
        assert_eq!(Language::Javascript.default_file_name(), "app.js");
        assert_eq!(Language::Markdown.default_file_name(), "code.txt");
    }

    #[test]
    fn unknown_language_tag_deserializes_as_text() {
        let file: SourceFile =
            serde_json::from_str(r#"{"name":"x.rs","language":"rust","content":"fn main(){}"}"#)
                .unwrap();
        assert_eq!(file.language, Language::Text);
    }

    #[test]
    fn js_alias_deserializes_as_javascript() {
        let lang: Language = serde_json::from_str("\"js\"").unwrap();
        assert_eq!(lang, Language::Javascript);
    }

    #[test]
    fn effective_language_falls_back_to_extension() {
        let file: SourceFile = serde_json::from_str(r#"{"name":"app.js"}"#).unwrap();
        assert_eq!(file.language, Language::Text);
        assert_eq!(file.effective_language(), Language::Javascript);
    }

    #[test]
    fn starter_links_its_own_assets() {
        let starter = FileSet::starter();
        assert_eq!(starter.len(), 3);
        let html = &starter.get("index.html").unwrap().content;
        assert!(html.contains(r#"href="style.css""#));
        assert!(html.contains(r#"src="app.js""#));
        assert!(starter.validate().is_ok());
    }

    #[test]
    fn upsert_replaces_existing_content() {
        let mut set = FileSet::starter();
        set.upsert("style.css", Language::Css, "body {}");
        assert_eq!(set.len(), 3);
        assert_eq!(set.get("style.css").unwrap().content, "body {}");
    }

    #[test]
    fn load_snippet_appends_new_file() {
        let mut set = FileSet::starter();
        let name = set.load_snippet(Language::Bash, "git init");
        assert_eq!(name, "commands.sh");
        assert_eq!(set.len(), 4);
        let file = set.get("commands.sh").unwrap();
        assert_eq!(file.language, Language::Bash);
        assert_eq!(file.content, "git init");
    }

    #[test]
    fn map_conversion_keeps_first_duplicate() {
        let set = FileSet::from(vec![
            SourceFile::new("a.txt", "first"),
            SourceFile::new("a.txt", "second"),
        ]);
        let map = set.to_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map["a.txt"], "first");
    }

    #[test]
    fn from_map_infers_languages() {
        let mut map = BTreeMap::new();
        map.insert("index.html".to_string(), "<p>hi</p>".to_string());
        map.insert("style.css".to_string(), "p {}".to_string());
        let set = FileSet::from_map(&map);
        assert_eq!(set.get("index.html").unwrap().language, Language::Html);
        assert_eq!(set.get("style.css").unwrap().language, Language::Css);
    }

    #[test]
    fn validate_rejects_path_traversal() {
        let set = FileSet::from(vec![SourceFile::new("../secret", "x")]);
        assert!(matches!(
            set.validate(),
            Err(ValidationError::InvalidFileName { .. })
        ));
        let set = FileSet::from(vec![SourceFile::new("..", "x")]);
        assert!(set.validate().is_err());
        let set = FileSet::from(vec![SourceFile::new("", "x")]);
        assert_eq!(set.validate(), Err(ValidationError::EmptyFileName));
    }

    #[test]
    fn validate_rejects_duplicates() {
        let set = FileSet::from(vec![
            SourceFile::new("a.js", ""),
            SourceFile::new("a.js", ""),
        ]);
        assert_eq!(
            set.validate(),
            Err(ValidationError::DuplicateFileName("a.js".to_string()))
        );
    }

    #[test]
    fn validate_enforces_limits() {
        let many: FileSet = (0..=FileSet::MAX_FILES)
            .map(|i| SourceFile::new(format!("f{i}.txt"), ""))
            .collect();
        assert!(matches!(
            many.validate(),
            Err(ValidationError::TooManyFiles { .. })
        ));

        let big = FileSet::from(vec![SourceFile::new(
            "big.txt",
            "x".repeat(FileSet::MAX_TOTAL_BYTES + 1),
        )]);
        assert!(matches!(
            big.validate(),
            Err(ValidationError::FileSetTooLarge { .. })
        ));
    }

    #[test]
    fn digest_is_stable_and_field_sensitive() {
        let a = FileSet::from(vec![SourceFile::new("ab", "c")]);
        let b = FileSet::from(vec![SourceFile::new("a", "bc")]);
        assert_eq!(a.digest(), a.clone().digest());
        assert_ne!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 64);
    }
}
