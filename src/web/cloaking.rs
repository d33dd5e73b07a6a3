//! Cloaked redirect pages.
//!
//! A cloaked link answers with a small HTML page instead of a redirect
//! status. Three page kinds exist, all carrying a `robots` noindex meta tag:
//!
//! - [`CloakType::Iframe`] embeds the destination in a full-viewport iframe
//! - [`CloakType::Javascript`] replaces `window.location` once the page loads
//! - [`CloakType::MetaRefresh`] uses `<meta http-equiv="refresh">`
//!
//! Text and attribute values go through Askama's HTML escaping. The script
//! variant receives the destination as a pre-escaped JavaScript string literal.

use askama::Template;
use thiserror::Error;
use url::Url;

use crate::domain::entities::CloakType;

/// Title used when the link has none configured.
pub const DEFAULT_CLOAK_TITLE: &str = "Redirecting…";

const CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Inputs of a cloaked page.
#[derive(Debug, Clone, Copy)]
pub struct CloakPage<'a> {
    pub destination_url: &'a str,
    pub title: Option<&'a str>,
    pub favicon: Option<&'a str>,
}

#[derive(Debug, Error)]
pub enum CloakError {
    #[error("Refusing to cloak non-http(s) destination: {0}")]
    UnsafeDestination(String),
    #[error("Template rendering failed: {0}")]
    Render(#[from] askama::Error),
}

#[derive(Template)]
#[template(path = "cloak/iframe.html")]
struct IframePage<'a> {
    title: &'a str,
    favicon: Option<&'a str>,
    destination_url: &'a str,
}

#[derive(Template)]
#[template(path = "cloak/javascript.html")]
struct JavascriptPage<'a> {
    title: &'a str,
    favicon: Option<&'a str>,
    destination_url: &'a str,
    destination_js: String,
}

#[derive(Template)]
#[template(path = "cloak/meta_refresh.html")]
struct MetaRefreshPage<'a> {
    title: &'a str,
    favicon: Option<&'a str>,
    destination_url: &'a str,
    delay_seconds: u32,
}

/// Renders the cloaked page of the given kind.
///
/// # Errors
///
/// Returns [`CloakError::UnsafeDestination`] unless the destination is an
/// absolute `http` or `https` URL.
pub fn generate_cloaked_page(kind: CloakType, page: &CloakPage<'_>) -> Result<String, CloakError> {
    let destination_url = page.destination_url;
    if !is_web_url(destination_url) {
        return Err(CloakError::UnsafeDestination(destination_url.to_string()));
    }

    let title = page
        .title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_CLOAK_TITLE);
    let favicon = page.favicon.filter(|f| is_web_url(f));

    let html = match kind {
        CloakType::Iframe => IframePage {
            title,
            favicon,
            destination_url,
        }
        .render()?,
        CloakType::Javascript => JavascriptPage {
            title,
            favicon,
            destination_url,
            destination_js: js_string_literal(destination_url),
        }
        .render()?,
        CloakType::MetaRefresh => MetaRefreshPage {
            title,
            favicon,
            destination_url,
            delay_seconds: 0,
        }
        .render()?,
    };

    Ok(html)
}

pub fn cloaked_page_content_type() -> &'static str {
    CONTENT_TYPE
}

fn is_web_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Double-quoted JavaScript string literal safe to place inside `<script>`.
fn js_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '<' | '>' | '&' | '\'' | '\u{2028}' | '\u{2029}' => {
                out.push_str(&format!("\\u{:04x}", c as u32))
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [CloakType; 3] = [
        CloakType::Iframe,
        CloakType::Javascript,
        CloakType::MetaRefresh,
    ];

    fn page<'a>(url: &'a str, title: Option<&'a str>) -> CloakPage<'a> {
        CloakPage {
            destination_url: url,
            title,
            favicon: None,
        }
    }

    #[test]
    fn test_every_kind_is_noindex() {
        for kind in ALL_KINDS {
            let html = generate_cloaked_page(kind, &page("https://example.com", None)).unwrap();
            assert!(
                html.contains(r#"<meta name="robots" content="noindex, nofollow">"#),
                "{kind} page lacks robots meta"
            );
            assert!(html.contains("<title>Redirecting…</title>"));
        }
    }

    #[test]
    fn test_title_is_escaped() {
        let title = "<script>alert(1)</script>";

        for kind in ALL_KINDS {
            let html =
                generate_cloaked_page(kind, &page("https://example.com", Some(title))).unwrap();
            assert!(!html.contains("<script>alert(1)"), "{kind} leaked title");
            assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        }
    }

    #[test]
    fn test_iframe_embeds_destination() {
        let html = generate_cloaked_page(
            CloakType::Iframe,
            &page("https://example.com/a?x=1&y=2", None),
        )
        .unwrap();

        assert!(html.contains(r#"<iframe src="https://example.com/a?x=1&amp;y=2""#));
    }

    #[test]
    fn test_meta_refresh_uses_zero_delay() {
        let html =
            generate_cloaked_page(CloakType::MetaRefresh, &page("https://example.com", None))
                .unwrap();

        assert!(html.contains(r#"http-equiv="refresh" content="0;url=https://example.com""#));
    }

    #[test]
    fn test_attribute_quotes_cannot_break_out() {
        let url = r#"https://example.com/"onload="alert(1)"#;
        for kind in ALL_KINDS {
            let html = generate_cloaked_page(kind, &page(url, None)).unwrap();
            assert!(!html.contains(r#""onload="alert(1)"#), "{kind} leaked quote");
        }
    }

    #[test]
    fn test_javascript_literal_escapes_script_breakers() {
        let url = "https://example.com/</script><script>alert('x')</script>";
        let html = generate_cloaked_page(CloakType::Javascript, &page(url, None)).unwrap();

        assert!(!html.contains("</script><script>alert"));
        assert!(html.contains(
            r#"window.location.replace("https://example.com/\u003c/script\u003e\u003cscript\u003ealert(\u0027x\u0027)\u003c/script\u003e");"#
        ));
        assert!(html.contains("<noscript>"));
    }

    #[test]
    fn test_js_string_literal_line_separators() {
        assert_eq!(
            js_string_literal("a\u{2028}b\u{2029}\"\\"),
            r#""a\u2028b\u2029\"\\""#
        );
    }

    #[test]
    fn test_rejects_non_web_destinations() {
        for url in ["javascript:alert(1)", "data:text/html,hi", "/relative", ""] {
            assert!(matches!(
                generate_cloaked_page(CloakType::Iframe, &page(url, None)),
                Err(CloakError::UnsafeDestination(_))
            ));
        }
    }

    #[test]
    fn test_favicon_only_when_web_url() {
        let mut cloak = page("https://example.com", Some("Shop"));
        cloak.favicon = Some("https://example.com/favicon.ico");
        let html = generate_cloaked_page(CloakType::Iframe, &cloak).unwrap();
        assert!(html.contains(r#"<link rel="icon" href="https://example.com/favicon.ico">"#));

        cloak.favicon = Some("javascript:alert(1)");
        let html = generate_cloaked_page(CloakType::Iframe, &cloak).unwrap();
        assert!(!html.contains("rel=\"icon\""));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(cloaked_page_content_type(), "text/html; charset=utf-8");
    }
}
