//! # Preview Composition
//!
//! Turns a workspace into one self-contained HTML document:
//!
//! 1. The first `.html`/`.htm` file is the entry document. Without one, the
//!    read-only fallback viewer is rendered instead.
//! 2. The policy `<meta>` tag goes in right after the first `<head>` open
//!    tag. Without a head, a head is created after `<html>`; without either,
//!    the document is wrapped in a minimal shell. Tags inside `<!-- -->`
//!    comments are ignored. This runs before inlining, so inlined file text
//!    can never be taken for the head tag.
//! 3. `<link href="x.css">` and `<script src="x.js"></script>` that name a
//!    workspace file are replaced by inline `<style>`/`<script>` blocks in a
//!    single pass. Inlined text is never rescanned, and references to
//!    unknown files stay as they are (the policy blocks them when rendered).

use std::collections::HashMap;
use std::sync::LazyLock;

use autoflow_core::SourceFile;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::csp::ContentSecurityPolicy;
use crate::escape::{escape_inline_script, escape_inline_style};
use crate::fallback::render_fallback;

// Comments are matched first so a tag mentioned inside one is never taken
// for the real thing. An unterminated comment runs to the end of input.
static HEAD_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s:<!--.*?(?:-->|\z))|(?i:<head(?:\s[^>]*)?>)").expect("static pattern")
});

static HTML_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s:<!--.*?(?:-->|\z))|(?i:<html(?:\s[^>]*)?>)").expect("static pattern")
});

// Groups 1/2: link href (double/single quoted). Groups 3/4: script src.
static ASSET_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?i)<link\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>"#,
        r#"|<script\b[^>]*?\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>\s*</script\s*>"#,
    ))
    .expect("static pattern")
});

/// Which branch produced the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum PreviewMode {
    /// An HTML entry file was found and its assets inlined.
    Composed,
    /// No HTML file; the read-only file viewer was rendered.
    Fallback,
}

/// A composed preview and what went into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewDocument {
    /// The document, ready for `srcdoc` or a sandboxed response.
    pub html: String,
    /// Composition branch taken.
    pub mode: PreviewMode,
    /// Name of the entry HTML file, if any.
    pub entry: Option<String>,
    /// Number of `<link>` tags replaced by `<style>` blocks.
    pub inlined_styles: usize,
    /// Number of `<script src>` elements replaced by inline scripts.
    pub inlined_scripts: usize,
}

/// Composes preview documents under one content-security policy.
#[derive(Debug, Clone, Default)]
pub struct PreviewComposer {
    policy: ContentSecurityPolicy,
}

impl PreviewComposer {
    /// Composer using [`crate::csp::DEFAULT_POLICY`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Composer using a custom policy.
    pub fn with_policy(policy: ContentSecurityPolicy) -> Self {
        Self { policy }
    }

    /// The policy embedded in every document.
    pub fn policy(&self) -> &ContentSecurityPolicy {
        &self.policy
    }

    /// Compose `files` into a single document. Never fails; the worst case
    /// is the fallback viewer.
    pub fn compose(&self, files: &[SourceFile]) -> PreviewDocument {
        let Some(entry) = files.iter().find(|f| has_extension(&f.name, &["html", "htm"])) else {
            tracing::debug!(files = files.len(), "no HTML entry, rendering fallback preview");
            return PreviewDocument {
                html: render_fallback(files, &self.policy),
                mode: PreviewMode::Fallback,
                entry: None,
                inlined_styles: 0,
                inlined_scripts: 0,
            };
        };

        let mut styles: HashMap<&str, &str> = HashMap::new();
        let mut scripts: HashMap<&str, &str> = HashMap::new();
        for file in files {
            if has_extension(&file.name, &["css"]) {
                styles.entry(&file.name).or_insert(&file.content);
            } else if has_extension(&file.name, &["js"]) {
                scripts.entry(&file.name).or_insert(&file.content);
            }
        }

        let document = inject_policy(&entry.content, &self.policy.meta_tag());

        let mut inlined_styles = 0;
        let mut inlined_scripts = 0;
        let html = ASSET_TAG
            .replace_all(&document, |caps: &Captures| {
                if let Some(href) = caps.get(1).or_else(|| caps.get(2)) {
                    if let Some(css) = styles.get(local_reference(href.as_str())) {
                        inlined_styles += 1;
                        return format!("<style>{}</style>", escape_inline_style(css));
                    }
                } else if let Some(src) = caps.get(3).or_else(|| caps.get(4)) {
                    if let Some(js) = scripts.get(local_reference(src.as_str())) {
                        inlined_scripts += 1;
                        return format!("<script>{}</script>", escape_inline_script(js));
                    }
                }
                caps[0].to_string()
            })
            .into_owned();

        tracing::debug!(
            entry = %entry.name,
            inlined_styles,
            inlined_scripts,
            bytes = html.len(),
            "composed preview"
        );

        PreviewDocument {
            html,
            mode: PreviewMode::Composed,
            entry: Some(entry.name.clone()),
            inlined_styles,
            inlined_scripts,
        }
    }
}

/// Compose with the default policy.
pub fn compose(files: &[SourceFile]) -> PreviewDocument {
    PreviewComposer::new().compose(files)
}

fn has_extension(name: &str, extensions: &[&str]) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

fn local_reference(reference: &str) -> &str {
    let reference = reference.trim();
    reference.strip_prefix("./").unwrap_or(reference)
}

/// First match of `pattern` that is not an HTML comment.
fn find_outside_comments<'d>(pattern: &Regex, document: &'d str) -> Option<regex::Match<'d>> {
    pattern
        .find_iter(document)
        .find(|m| !m.as_str().starts_with("<!--"))
}

fn inject_policy(document: &str, meta: &str) -> String {
    if let Some(head) = find_outside_comments(&HEAD_OPEN, document) {
        let at = head.end();
        return format!("{}\n{meta}{}", &document[..at], &document[at..]);
    }
    if let Some(html) = find_outside_comments(&HTML_OPEN, document) {
        let at = html.end();
        return format!(
            "{}\n<head>\n{meta}\n</head>{}",
            &document[..at],
            &document[at..]
        );
    }
    format!("<html>\n<head>\n{meta}\n</head>\n<body>\n{document}\n</body>\n</html>\n")
}
