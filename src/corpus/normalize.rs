use tracing::warn;
use url::Url;

use crate::error::CollectError;

/// Parse the configured base URL. A base that cannot anchor relative
/// resolution is a configuration error, never a per-link one.
pub fn parse_base(base: &str) -> Result<Url, CollectError> {
    let url = Url::parse(base).map_err(|e| CollectError::MalformedBase {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(CollectError::MalformedBase {
            url: base.to_string(),
            reason: "URL cannot be a base".to_string(),
        });
    }
    Ok(url)
}

/// Resolve `href` against `base`. Literal spaces become `%20`; absolute
/// http(s) links are returned untouched after that.
pub fn normalize_url(href: &str, base: &Url) -> String {
    let safe = href.trim().replace(' ', "%20");
    if has_http_scheme(&safe) {
        return safe;
    }
    match base.join(&safe) {
        Ok(url) => url.to_string(),
        Err(e) => {
            warn!("Could not resolve {} against {}: {}", safe, base, e);
            safe
        }
    }
}

fn has_http_scheme(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http:") || lower.starts_with("https:")
}

/// Last path segment of an href or path, without query or fragment, with `%20` decoded.
pub fn file_name(href: &str) -> String {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.trim_end_matches('/')
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
        .replace("%20", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        parse_base("https://example.org/docs/").unwrap()
    }

    #[test]
    fn spaces_encoded_and_resolved() {
        assert_eq!(
            normalize_url("Summary Report.pdf", &base()),
            "https://example.org/docs/Summary%20Report.pdf"
        );
    }

    #[test]
    fn absolute_left_alone() {
        let href = "https://unstats.un.org/a b/E_C20_2025_5_e.pdf";
        assert_eq!(
            normalize_url(href, &base()),
            "https://unstats.un.org/a%20b/E_C20_2025_5_e.pdf"
        );
        assert_eq!(normalize_url("HTTP://x.org/y.pdf", &base()), "HTTP://x.org/y.pdf");
    }

    #[test]
    fn dot_segments_merged() {
        assert_eq!(
            normalize_url("../16th-Session/x.pdf", &base()),
            "https://example.org/16th-Session/x.pdf"
        );
        assert_eq!(normalize_url("./x.pdf", &base()), "https://example.org/docs/x.pdf");
        assert_eq!(normalize_url("/root.pdf", &base()), "https://example.org/root.pdf");
    }

    #[test]
    fn unresolvable_href_passed_through() {
        assert_eq!(normalize_url("//[::1/x.pdf", &base()), "//[::1/x.pdf");
    }

    #[test]
    fn relative_base_is_malformed() {
        assert!(matches!(parse_base("docs/"), Err(CollectError::MalformedBase { .. })));
        assert!(matches!(parse_base("mailto:a@b.org"), Err(CollectError::MalformedBase { .. })));
    }

    #[test]
    fn file_name_strips_query_and_decodes() {
        assert_eq!(file_name("/docs/Summary%20Report.pdf?v=2#p1"), "Summary Report.pdf");
        assert_eq!(file_name("E_C20_2025_5_e.pdf"), "E_C20_2025_5_e.pdf");
        assert_eq!(file_name("docs\\raw\\x.pdf"), "x.pdf");
    }
}
