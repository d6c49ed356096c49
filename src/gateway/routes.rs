//! Static prefix routing table.

/// One upstream mapping: requests under `prefix` go to `upstream`.
#[derive(Debug, Clone)]
pub struct Route {
    pub prefix: String,
    /// Base URL without trailing slash, e.g. `http://127.0.0.1:3001`.
    pub upstream: String,
    /// Replacement for `prefix` in the forwarded path. Equal to `prefix` for identity rewrites.
    pub rewrite_to: String,
    /// Protected routes require a valid bearer token at the gateway.
    pub public: bool,
}

impl Route {
    pub fn new(prefix: &str, upstream: &str) -> Self {
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
            upstream: upstream.trim_end_matches('/').to_string(),
            rewrite_to: prefix.trim_end_matches('/').to_string(),
            public: true,
        }
    }

    #[cfg(test)]
    fn rewrite(mut self, to: &str) -> Self {
        self.rewrite_to = to.trim_end_matches('/').to_string();
        self
    }

    pub fn protected(mut self) -> Self {
        self.public = false;
        self
    }

    /// Matches on a segment boundary: `/auth` covers `/auth` and `/auth/x`, not `/authx`.
    fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Upstream URL for `path` (and optional query).
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        let rest = path.strip_prefix(self.prefix.as_str()).unwrap_or(path);
        let mut url = format!("{}{}{}", self.upstream, self.rewrite_to, rest);
        if let Some(q) = query {
            url.push('?');
            url.push_str(q);
        }
        url
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Longest matching prefix.
    pub fn lookup(&self, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .filter(|r| r.matches(path))
            .max_by_key(|r| r.prefix.len())
    }
}
