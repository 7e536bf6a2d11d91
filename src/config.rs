use log::LevelFilter;
use percent_encoding::percent_decode_str;

use crate::storage;

/// `localStorage` key holding a user supplied API base.
pub const API_BASE_KEY: &str = "api_base";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Backend origin without trailing slash; empty means "same origin".
    pub api_base: String,
    pub log_level: LevelFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: resolve_api_base(None, None, option_env!("CANDLR_API_URL")),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        let query = location_query();
        let stored = storage::load_string(API_BASE_KEY);

        let api_base = resolve_api_base(
            query.as_deref().and_then(|q| query_param(q, "api")).as_deref(),
            stored.as_deref(),
            option_env!("CANDLR_API_URL"),
        );
        let log_level = query
            .as_deref()
            .and_then(|q| query_param(q, "log"))
            .and_then(|l| parse_log_level(&l))
            .unwrap_or_else(default_log_level);

        Self { api_base, log_level }
    }
}

fn default_log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

pub fn resolve_api_base(query: Option<&str>, stored: Option<&str>, compiled: Option<&str>) -> String {
    [query, stored, compiled]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .map(|base| base.trim_end_matches('/').to_string())
        .unwrap_or_default()
}

/// Looks up `key` in a `?a=b&c=d` style query string.
pub fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (url_decode(k) == key).then(|| url_decode(v))
        })
}

fn url_decode(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    percent_decode_str(&raw).decode_utf8_lossy().into_owned()
}

pub fn parse_log_level(raw: &str) -> Option<LevelFilter> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

#[cfg(target_arch = "wasm32")]
fn location_query() -> Option<String> {
    web_sys::window()?.location().search().ok()
}

#[cfg(not(target_arch = "wasm32"))]
fn location_query() -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_precedence() {
        assert_eq!(
            resolve_api_base(Some("http://q"), Some("http://s"), Some("http://c")),
            "http://q"
        );
        assert_eq!(resolve_api_base(None, Some("http://s/"), Some("http://c")), "http://s");
        assert_eq!(resolve_api_base(Some("  "), None, Some("http://c//")), "http://c");
        assert_eq!(resolve_api_base(None, None, None), "");
    }

    #[test]
    fn query_param_decodes_values() {
        let q = "?api=http%3A%2F%2Flocalhost%3A8000&log=debug&empty=";
        assert_eq!(query_param(q, "api").as_deref(), Some("http://localhost:8000"));
        assert_eq!(query_param(q, "log").as_deref(), Some("debug"));
        assert_eq!(query_param(q, "empty").as_deref(), Some(""));
        assert_eq!(query_param(q, "missing"), None);
        assert_eq!(query_param("name=r%C3%A9sum%C3%A9", "name").as_deref(), Some("résumé"));
        assert_eq!(query_param("a=hello+world", "a").as_deref(), Some("hello world"));
    }

    #[test]
    fn truncated_percent_escape_is_kept() {
        assert_eq!(query_param("x=100%", "x").as_deref(), Some("100%"));
        assert_eq!(query_param("x=%zz", "x").as_deref(), Some("%zz"));
    }

    #[test]
    fn log_levels() {
        assert_eq!(parse_log_level("DEBUG"), Some(LevelFilter::Debug));
        assert_eq!(parse_log_level(" warn "), Some(LevelFilter::Warn));
        assert_eq!(parse_log_level("loud"), None);
    }
}
