//! Page-level evidence used by the takedown probe.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static ITCH_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta name="itch:path" content="games/(\d+)""#)
        .expect("itch:path pattern is a valid regex")
});

/// `<site-root>/takedowns/<id>`
pub fn notice_url(site_root: &Url, game_id: u64) -> String {
    format!(
        "{}/takedowns/{}",
        site_root.as_str().trim_end_matches('/'),
        game_id
    )
}

/// Numeric game id from the `itch:path` meta tag, if present and in range.
pub fn extract_game_id(html: &str) -> Option<u64> {
    ITCH_PATH
        .captures(html)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// Whether the page links to `notice_url` with the "View the notice" anchor.
pub fn has_notice_link(html: &str, notice_url: &str) -> bool {
    let pattern = format!(
        r#"<a\s+href="{}">View the notice</a>"#,
        regex::escape(notice_url)
    );
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(html),
        Err(e) => {
            tracing::warn!(error = %e, "could not build notice pattern");
            false
        }
    }
}
