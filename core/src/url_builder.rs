//! URL construction from prefix, path and query pairs.

use url::form_urlencoded::byte_serialize;

use crate::config::QueryEncoding;

/// Concatenate `prefix` and `path`, then append `query` as `?k=v&k=v` in the
/// order given. An empty `query` adds nothing.
pub fn build_url(prefix: &str, path: &str, query: &[(String, String)], encoding: QueryEncoding) -> String {
    let mut url = format!("{prefix}{path}");
    if query.is_empty() {
        return url;
    }
    let pairs: Vec<String> = query
        .iter()
        .map(|(k, v)| match encoding {
            QueryEncoding::Verbatim => format!("{k}={v}"),
            QueryEncoding::Percent => format!("{}={}", encode(k), encode(v)),
        })
        .collect();
    url.push('?');
    url.push_str(&pairs.join("&"));
    url
}

fn encode(s: &str) -> String {
    byte_serialize(s.as_bytes()).collect()
}
