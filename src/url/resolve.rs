use crate::url::domain::{parse_lenient, parts_of};
use crate::ResolveResult;

/// Returns `"https://"` when the string starts with `https`, `"http://"`
/// otherwise
///
/// This is a prefix check only; the input is not validated.
pub fn protocol_of(url: &str) -> &'static str {
    if url.starts_with("https") {
        "https://"
    } else {
        "http://"
    }
}

/// Resolves a link found on `base_url` into an absolute URL
///
/// Links starting with `http` are returned unchanged. Anything else is
/// treated as a root-relative or bare path and attached to the protocol and
/// base domain of `base_url`. An explicit port on `base_url` is carried over.
///
/// `../` traversal and protocol-relative (`//host/path`) links are not
/// handled here.
///
/// # Examples
///
/// ```
/// use robly::url::resolve;
///
/// assert_eq!(
///     resolve("http://example.com/a/b", "/static/x.png").unwrap(),
///     "http://example.com/static/x.png"
/// );
/// assert_eq!(
///     resolve("https://example.com", "logo.png").unwrap(),
///     "https://example.com/logo.png"
/// );
/// ```
pub fn resolve(base_url: &str, link: &str) -> ResolveResult<String> {
    if link.starts_with("http") {
        return Ok(link.to_string());
    }

    let parsed = parse_lenient(base_url)?;
    let mut authority = parts_of(&parsed, base_url)?.base_domain();
    if let Some(port) = parsed.port() {
        authority = format!("{}:{}", authority, port);
    }

    let protocol = protocol_of(base_url);
    if link.starts_with('/') {
        Ok(format!("{}{}{}", protocol, authority, link))
    } else {
        Ok(format!("{}{}/{}", protocol, authority, link))
    }
}
