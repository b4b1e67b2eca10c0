//! Content-security policy attached to every preview document.

use crate::escape::escape_attribute;
use crate::sandbox::SandboxPolicy;

/// Nothing external may load; inline styles and scripts may run; images
/// only from `data:` and `blob:` URLs.
pub const DEFAULT_POLICY: &str =
    "default-src 'none'; img-src data: blob:; style-src 'unsafe-inline'; script-src 'unsafe-inline';";

/// A CSP directive list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSecurityPolicy {
    directives: String,
}

impl Default for ContentSecurityPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLICY)
    }
}

impl ContentSecurityPolicy {
    /// Wrap a raw directive list.
    pub fn new(directives: impl Into<String>) -> Self {
        Self {
            directives: directives.into(),
        }
    }

    /// The directive list as written.
    pub fn as_str(&self) -> &str {
        &self.directives
    }

    /// `<meta http-equiv="Content-Security-Policy" content="...">`.
    pub fn meta_tag(&self) -> String {
        format!(
            r#"<meta http-equiv="Content-Security-Policy" content="{}">"#,
            escape_attribute(&self.directives)
        )
    }

    /// Value for a `Content-Security-Policy` response header. The `sandbox`
    /// directive is only honoured in headers, never in meta tags.
    pub fn header_value(&self, sandbox: Option<&SandboxPolicy>) -> String {
        let base = self.directives.trim_end();
        match sandbox {
            None => base.to_string(),
            Some(policy) => {
                let sep = if base.ends_with(';') { " " } else { "; " };
                format!("{base}{sep}{};", policy.directive())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_meta_tag() {
        assert_eq!(
            ContentSecurityPolicy::default().meta_tag(),
            "<meta http-equiv=\"Content-Security-Policy\" content=\"default-src 'none'; img-src data: blob:; style-src 'unsafe-inline'; script-src 'unsafe-inline';\">"
        );
    }

    #[test]
    fn meta_tag_escapes_quotes() {
        let csp = ContentSecurityPolicy::new(r#"default-src "none""#);
        assert!(csp.meta_tag().contains("default-src &quot;none&quot;"));
    }

    #[test]
    fn header_appends_sandbox() {
        let csp = ContentSecurityPolicy::default();
        assert_eq!(csp.header_value(None), DEFAULT_POLICY);
        assert!(csp
            .header_value(Some(&SandboxPolicy::scripts_only()))
            .ends_with("script-src 'unsafe-inline'; sandbox allow-scripts;"));

        let bare = ContentSecurityPolicy::new("default-src 'self'");
        assert_eq!(
            bare.header_value(Some(&SandboxPolicy::scripts_only())),
            "default-src 'self'; sandbox allow-scripts;"
        );
    }
}
