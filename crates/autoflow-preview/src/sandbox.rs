//! # Sandboxed Embedding
//!
//! The preview document runs user code, so it is always rendered inside a
//! sandboxed iframe. Scripts may run; `allow-same-origin` is not
//! representable here, so the frame can never reach the host page's
//! cookies, storage, or DOM.

use crate::escape::{escape_attribute, escape_html};

/// Capabilities that may be granted to the preview frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SandboxToken {
    /// `allow-scripts`
    AllowScripts,
    /// `allow-forms`
    AllowForms,
    /// `allow-modals`
    AllowModals,
    /// `allow-popups`
    AllowPopups,
}

impl SandboxToken {
    /// Keyword used in the `sandbox` attribute and CSP directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllowScripts => "allow-scripts",
            Self::AllowForms => "allow-forms",
            Self::AllowModals => "allow-modals",
            Self::AllowPopups => "allow-popups",
        }
    }
}

/// Set of sandbox capabilities, rendered in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SandboxPolicy {
    tokens: Vec<SandboxToken>,
}

impl SandboxPolicy {
    /// Fully locked down: no scripts, no forms, nothing.
    pub fn locked() -> Self {
        Self::default()
    }

    /// The preview default: scripts only.
    pub fn scripts_only() -> Self {
        Self::locked().allow(SandboxToken::AllowScripts)
    }

    /// Grant one more capability. Duplicates are ignored.
    pub fn allow(mut self, token: SandboxToken) -> Self {
        if !self.tokens.contains(&token) {
            self.tokens.push(token);
        }
        self
    }

    /// Space-separated keywords, e.g. `allow-scripts`. Empty when locked.
    pub fn attribute_value(&self) -> String {
        self.tokens
            .iter()
            .map(SandboxToken::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// CSP `sandbox` directive, e.g. `sandbox allow-scripts`.
    pub fn directive(&self) -> String {
        let value = self.attribute_value();
        if value.is_empty() {
            "sandbox".to_string()
        } else {
            format!("sandbox {value}")
        }
    }

    /// An `<iframe>` carrying `document` in `srcdoc` under this policy.
    pub fn iframe(&self, document: &str, title: &str) -> String {
        format!(
            r#"<iframe title="{}" sandbox="{}" srcdoc="{}" style="width:100%;height:100%;border:0"></iframe>"#,
            escape_attribute(title),
            self.attribute_value(),
            escape_attribute(document),
        )
    }

    /// Minimal host page that embeds `document` in a sandboxed frame.
    pub fn host_page(&self, document: &str, title: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n\
             <style>html,body{{margin:0;height:100%}}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            escape_html(title),
            self.iframe(document, title),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_only_never_grants_same_origin() {
        let policy = SandboxPolicy::scripts_only();
        assert_eq!(policy.attribute_value(), "allow-scripts");
        assert!(!policy.attribute_value().contains("same-origin"));
        assert_eq!(policy.directive(), "sandbox allow-scripts");
    }

    #[test]
    fn locked_policy_renders_bare_directive() {
        assert_eq!(SandboxPolicy::locked().directive(), "sandbox");
        assert_eq!(SandboxPolicy::locked().attribute_value(), "");
    }

    #[test]
    fn allow_deduplicates() {
        let policy = SandboxPolicy::scripts_only()
            .allow(SandboxToken::AllowModals)
            .allow(SandboxToken::AllowScripts);
        assert_eq!(policy.attribute_value(), "allow-scripts allow-modals");
    }

    #[test]
    fn iframe_escapes_srcdoc() {
        let frame = SandboxPolicy::scripts_only().iframe(r#"<p class="x">a & b</p>"#, "Live Preview");
        assert!(frame.contains(r#"sandbox="allow-scripts""#));
        assert!(frame.contains(r#"srcdoc="<p class=&quot;x&quot;>a &amp; b</p>""#));
        assert!(frame.contains(r#"title="Live Preview""#));
    }

    #[test]
    fn host_page_wraps_frame() {
        let page = SandboxPolicy::scripts_only().host_page("<p>hi</p>", "<Preview>");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>&lt;Preview&gt;</title>"));
        assert_eq!(page.matches("<iframe").count(), 1);
    }
}
