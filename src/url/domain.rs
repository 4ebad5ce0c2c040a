use crate::{ResolutionError, ResolveResult};
use url::{Host, Url};

/// A host split along public-suffix boundaries
///
/// For `https://news.bbc.co.uk/` this is `news` / `bbc` / `co.uk`. IP hosts
/// have no suffix: the address is held in `domain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParts {
    pub subdomain: String,
    pub domain: String,
    pub suffix: String,
}

impl DomainParts {
    /// Joins the non-empty parts back into a host name
    pub fn base_domain(&self) -> String {
        [&self.subdomain, &self.domain, &self.suffix]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Parses a URL, accepting scheme-less input such as `example.com/page`
pub(crate) fn parse_lenient(input: &str) -> ResolveResult<Url> {
    let trimmed = input.trim();

    let parsed = match Url::parse(trimmed) {
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{}", trimmed)),
        other => other,
    };

    parsed.map_err(|e| ResolutionError::Parse {
        url: input.to_string(),
        reason: e.to_string(),
    })
}

/// Decomposes a URL into subdomain, registrable domain and public suffix
///
/// Uses the Public Suffix List, so compound suffixes such as `co.uk` or
/// `com.au` are kept whole rather than split on the last dot.
///
/// # Errors
///
/// * `ResolutionError::Parse` - the input is not a URL
/// * `ResolutionError::MissingHost` - the URL has no host
/// * `ResolutionError::NoRegistrableDomain` - the suffix list returned a
///   registrable domain with no label of its own
///
/// A host that is itself a listed suffix, such as `github.io`, splits on its
/// last dot. A single-label host such as `localhost` is held whole in
/// `domain`.
///
/// # Examples
///
/// ```
/// use robly::url::decompose;
///
/// let parts = decompose("https://news.bbc.co.uk/world").unwrap();
/// assert_eq!(parts.subdomain, "news");
/// assert_eq!(parts.domain, "bbc");
/// assert_eq!(parts.suffix, "co.uk");
/// ```
pub fn decompose(url: &str) -> ResolveResult<DomainParts> {
    let parsed = parse_lenient(url)?;
    parts_of(&parsed, url)
}

pub(crate) fn parts_of(parsed: &Url, original: &str) -> ResolveResult<DomainParts> {
    match parsed.host() {
        None => Err(ResolutionError::MissingHost(original.to_string())),
        Some(Host::Ipv4(addr)) => Ok(DomainParts {
            subdomain: String::new(),
            domain: addr.to_string(),
            suffix: String::new(),
        }),
        Some(Host::Ipv6(addr)) => Ok(DomainParts {
            subdomain: String::new(),
            domain: format!("[{}]", addr),
            suffix: String::new(),
        }),
        Some(Host::Domain(host)) => split_host(&host.trim_end_matches('.').to_ascii_lowercase()),
    }
}

fn split_host(host: &str) -> ResolveResult<DomainParts> {
    let Some(registrable) = psl::domain_str(host) else {
        return Ok(split_unlisted(host));
    };

    let no_domain = || ResolutionError::NoRegistrableDomain(host.to_string());
    let suffix = psl::suffix_str(registrable).ok_or_else(no_domain)?;

    let domain = registrable
        .strip_suffix(suffix)
        .map(|label| label.trim_end_matches('.'))
        .filter(|label| !label.is_empty())
        .ok_or_else(no_domain)?;

    let subdomain = host
        .strip_suffix(registrable)
        .map(|rest| rest.trim_end_matches('.'))
        .unwrap_or("");

    Ok(DomainParts {
        subdomain: subdomain.to_string(),
        domain: domain.to_string(),
        suffix: suffix.to_string(),
    })
}

/// Splits a host that is itself a listed suffix (`github.io`, `co.uk`) or a
/// single label (`localhost`)
///
/// The last label is read as the suffix. A single-label host is held whole in
/// `domain`, like an IP address.
fn split_unlisted(host: &str) -> DomainParts {
    match host.rsplit_once('.') {
        Some((domain, suffix)) => DomainParts {
            subdomain: String::new(),
            domain: domain.to_string(),
            suffix: suffix.to_string(),
        },
        None => DomainParts {
            subdomain: String::new(),
            domain: host.to_string(),
            suffix: String::new(),
        },
    }
}

/// Returns the base domain of a URL: `subdomain.domain.suffix`, or
/// `domain.suffix` when there is no subdomain
///
/// The port is not part of the base domain.
///
/// # Examples
///
/// ```
/// use robly::url::base_domain_of;
///
/// assert_eq!(base_domain_of("http://example.com/a/b").unwrap(), "example.com");
/// assert_eq!(base_domain_of("https://www.example.co.uk/").unwrap(), "www.example.co.uk");
/// ```
pub fn base_domain_of(url: &str) -> ResolveResult<String> {
    decompose(url).map(|parts| parts.base_domain())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose_simple_domain() {
        let parts = decompose("http://example.com/path").unwrap();
        assert_eq!(parts.subdomain, "");
        assert_eq!(parts.domain, "example");
        assert_eq!(parts.suffix, "com");
    }

    #[test]
    fn test_decompose_compound_suffix() {
        let parts = decompose("https://shop.example.co.uk/basket").unwrap();
        assert_eq!(parts.subdomain, "shop");
        assert_eq!(parts.domain, "example");
        assert_eq!(parts.suffix, "co.uk");
    }

    #[test]
    fn test_decompose_nested_subdomain() {
        let parts = decompose("https://api.v2.example.com/endpoint").unwrap();
        assert_eq!(parts.subdomain, "api.v2");
        assert_eq!(parts.domain, "example");
    }

    #[test]
    fn test_decompose_without_scheme() {
        let parts = decompose("example.com.au/page").unwrap();
        assert_eq!(parts.domain, "example");
        assert_eq!(parts.suffix, "com.au");
    }

    #[test]
    fn test_decompose_uppercase_host() {
        assert_eq!(base_domain_of("https://WWW.Example.COM/").unwrap(), "www.example.com");
    }

    #[test]
    fn test_decompose_ipv4_host() {
        let parts = decompose("http://127.0.0.1:8080/").unwrap();
        assert_eq!(parts.domain, "127.0.0.1");
        assert_eq!(parts.base_domain(), "127.0.0.1");
    }

    #[test]
    fn test_base_domain_drops_port() {
        assert_eq!(base_domain_of("http://example.com:8080/x").unwrap(), "example.com");
    }

    #[test]
    fn test_base_domain_with_subdomain() {
        assert_eq!(base_domain_of("https://blog.example.com/post").unwrap(), "blog.example.com");
    }

    #[test]
    fn test_single_label_host() {
        let parts = decompose("http://localhost:8080/").unwrap();
        assert_eq!(parts.subdomain, "");
        assert_eq!(parts.domain, "localhost");
        assert_eq!(parts.suffix, "");
        assert_eq!(parts.base_domain(), "localhost");
    }

    #[test]
    fn test_private_suffix_host() {
        for host in ["github.io", "blogspot.com", "herokuapp.com"] {
            let url = format!("https://{}/", host);
            assert_eq!(base_domain_of(&url).unwrap(), host);
        }

        let parts = decompose("https://github.io/").unwrap();
        assert_eq!(parts.domain, "github");
        assert_eq!(parts.suffix, "io");
    }

    #[test]
    fn test_site_under_private_suffix() {
        assert_eq!(
            base_domain_of("https://rob.github.io/projects").unwrap(),
            "rob.github.io"
        );
    }

    #[test]
    fn test_bare_icann_suffix_host() {
        assert_eq!(base_domain_of("http://co.uk/").unwrap(), "co.uk");
    }

    #[test]
    fn test_garbage_is_error() {
        assert!(decompose("http://").is_err());
        assert!(decompose("").is_err());
    }

    #[test]
    fn test_mailto_has_no_host() {
        let result = decompose("mailto:someone@example.com");
        assert!(matches!(result, Err(ResolutionError::MissingHost(_))));
    }
}
