use crate::config::TenantConfig;

use super::key::TenantKey;

/// Outcome of resolving one inbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Forward the request untouched (root domain, public path, or no tenant)
    PassThrough,
    /// Answer with a permanent redirect to `location`
    Redirect { location: String },
    /// Route internally to `path_and_query`, whose first segment is `tenant`
    Rewrite {
        tenant: TenantKey,
        path_and_query: String,
    },
}

/// Host header split into a normalized name and an optional port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostParts {
    pub name: String,
    pub port: Option<String>,
}

/// Maps host + path to a tenant key. Pure and allocation-light; safe to
/// share across every request.
#[derive(Debug, Clone)]
pub struct TenantResolver {
    root_domain: String,
    www_root: String,
    public_prefixes: Vec<String>,
    local_hosts: Vec<String>,
    redirect_scheme: String,
    trust_forwarded_host: bool,
}

impl TenantResolver {
    pub fn new(config: &TenantConfig) -> Self {
        let root_domain = config
            .root_domain
            .trim()
            .trim_end_matches('.')
            .to_ascii_lowercase();
        Self {
            www_root: format!("www.{}", root_domain),
            root_domain,
            public_prefixes: config.public_prefixes.clone(),
            local_hosts: config
                .local_hosts
                .iter()
                .map(|h| h.trim().to_ascii_lowercase())
                .collect(),
            redirect_scheme: config.redirect_scheme.clone(),
            trust_forwarded_host: config.trust_forwarded_host,
        }
    }

    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    pub fn trust_forwarded_host(&self) -> bool {
        self.trust_forwarded_host
    }

    /// Resolve a request. Never fails: anything malformed degrades to
    /// [`Resolution::PassThrough`].
    ///
    /// `already_rewritten` is set by the middleware once a request has been
    /// rewritten, which makes a second pass a no-op.
    pub fn resolve(&self, host: Option<&str>, path_and_query: &str, already_rewritten: bool) -> Resolution {
        if already_rewritten {
            return Resolution::PassThrough;
        }

        let (path, query) = split_path_and_query(path_and_query);
        if self.is_public_path(path) {
            return Resolution::PassThrough;
        }

        let Some(host) = host.and_then(parse_host) else {
            return Resolution::PassThrough;
        };

        if self.root_domain.is_empty()
            || host.name == self.root_domain
            || host.name == self.www_root
            || self.local_hosts.iter().any(|h| *h == host.name)
        {
            return Resolution::PassThrough;
        }

        let Some(prefix) = host
            .name
            .strip_suffix(self.root_domain.as_str())
            .and_then(|p| p.strip_suffix('.'))
        else {
            // Foreign host (custom domain, bare IP): no tenant
            return Resolution::PassThrough;
        };

        if let Some(rest) = prefix.strip_prefix("www.") {
            if rest.is_empty() {
                return Resolution::PassThrough;
            }
            let port = host.port.as_deref().map(|p| format!(":{}", p)).unwrap_or_default();
            return Resolution::Redirect {
                location: format!(
                    "{}://{}.{}{}{}{}",
                    self.redirect_scheme,
                    rest,
                    self.root_domain,
                    port,
                    path,
                    query.map(|q| format!("?{}", q)).unwrap_or_default()
                ),
            };
        }

        let Some(tenant) = TenantKey::parse(prefix) else {
            return Resolution::PassThrough;
        };

        // Always prefixed, even when the path already starts with the label:
        // a tenant may be named like a route segment (`menu.example.com/menu`).
        let rewritten_path = format!("/{}{}", tenant, path);

        Resolution::Rewrite {
            path_and_query: match query {
                Some(q) => format!("{}?{}", rewritten_path, q),
                None => rewritten_path,
            },
            tenant,
        }
    }

    /// True when `path` falls under one of the always-public prefixes.
    pub fn is_public_path(&self, path: &str) -> bool {
        self.public_prefixes.iter().any(|prefix| prefix_matches(prefix, path))
    }
}

fn prefix_matches(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    if let Some(dir) = prefix.strip_suffix('/') {
        return path.starts_with(prefix) || path == dir;
    }
    path == prefix
        || path
            .strip_prefix(prefix)
            .map(|rest| rest.starts_with('/'))
            .unwrap_or(false)
}

/// Split `/path?query` into its parts. An empty path becomes `/`.
pub fn split_path_and_query(path_and_query: &str) -> (&str, Option<&str>) {
    let (path, query) = match path_and_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_and_query, None),
    };
    let path = if path.is_empty() { "/" } else { path };
    (path, query.filter(|q| !q.is_empty()))
}

/// First non-empty segment of a path
pub fn first_segment(path: &str) -> Option<&str> {
    path.trim_start_matches('/')
        .split('/')
        .next()
        .filter(|s| !s.is_empty())
}

/// Normalize a raw Host header value. Returns `None` for anything that is
/// not a plausible host, so callers can fall back to pass-through.
pub fn parse_host(raw: &str) -> Option<HostParts> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (name, port) = if raw.starts_with('[') {
        let end = raw.find(']')?;
        let rest = &raw[end + 1..];
        let port = if rest.is_empty() { None } else { Some(rest.strip_prefix(':')?) };
        (&raw[..=end], port)
    } else {
        match raw.rsplit_once(':') {
            Some((name, _)) if name.contains(':') => return None,
            Some((name, port)) => (name, Some(port)),
            None => (raw, None),
        }
    };

    if let Some(port) = port {
        if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    let name = name.trim_end_matches('.').to_ascii_lowercase();
    if name.is_empty()
        || name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '\\' | '@' | '?' | '#'))
    {
        return None;
    }

    Some(HostParts {
        name,
        port: port.map(str::to_string),
    })
}
