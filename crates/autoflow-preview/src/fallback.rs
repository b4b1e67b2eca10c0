//! Read-only viewer shown when the workspace has no HTML entry document.

use autoflow_core::SourceFile;

use crate::csp::ContentSecurityPolicy;
use crate::escape::escape_html;

const VIEWER_STYLE: &str = "body { font-family: Arial, sans-serif; padding: 2rem; text-align: center; }
.preview-note { color: #666; margin-bottom: 2rem; }
.file-content { background: #f5f5f5; border-radius: 0.5rem; padding: 1rem; margin: 1rem 0; text-align: left; }
pre { margin: 0; white-space: pre-wrap; }";

/// Render every file's name and escaped content. Nothing from the files is
/// interpreted as markup.
pub fn render_fallback(files: &[SourceFile], csp: &ContentSecurityPolicy) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str(&csp.meta_tag());
    html.push_str("\n<meta charset=\"UTF-8\">\n<style>\n");
    html.push_str(VIEWER_STYLE);
    html.push_str("\n</style>\n</head>\n<body>\n");
    html.push_str(
        "<div class=\"preview-note\">\n<h2>File Preview</h2>\n\
         <p>Add an HTML file to see a live preview</p>\n</div>\n",
    );
    for file in files {
        html.push_str("<div class=\"file-content\">\n<strong>");
        html.push_str(&escape_html(&file.name));
        html.push_str(":</strong>\n<pre>");
        html.push_str(&escape_html(&file.content));
        html.push_str("</pre>\n</div>\n");
    }
    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_still_has_policy() {
        let csp = ContentSecurityPolicy::default();
        let html = render_fallback(&[], &csp);
        assert_eq!(html.matches(&csp.meta_tag()).count(), 1);
        assert!(html.contains("Add an HTML file"));
        assert!(!html.contains("file-content\">"));
    }

    #[test]
    fn names_and_content_are_escaped() {
        let files = [SourceFile::new(
            "<b>.js",
            "alert('</script><script>evil()</script>')",
        )];
        let html = render_fallback(&files, &ContentSecurityPolicy::default());
        assert!(html.contains("<strong>&lt;b&gt;.js:</strong>"));
        assert!(html.contains("alert(&#39;&lt;/script&gt;&lt;script&gt;evil()&lt;/script&gt;&#39;)"));
        assert!(!html.contains("<script>"));
    }
}
