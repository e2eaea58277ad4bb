//! Client configuration.

/// Production API root.
pub const DEFAULT_ROOT: &str = "https://api.ecoledirecte.com";

/// Where requests go and which headers are layered over the vendor defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL, without trailing slash. Request paths are appended verbatim.
    pub root: String,
    /// Extra headers. A name already present in the vendor set replaces it.
    pub added_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
            added_headers: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// - `ECOLEDIRECTE_ROOT` overrides the base URL
    /// - `ECOLEDIRECTE_HEADERS` adds headers, as `name: value` pairs separated by `;`
    pub fn from_env() -> Self {
        let root = std::env::var("ECOLEDIRECTE_ROOT").unwrap_or_else(|_| DEFAULT_ROOT.to_string());
        let added_headers = std::env::var("ECOLEDIRECTE_HEADERS")
            .map(|raw| parse_header_list(&raw))
            .unwrap_or_default();

        Self::default()
            .with_root(root)
            .with_headers(added_headers)
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.added_headers.push((name.into(), value.into()));
        self
    }

    fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.added_headers.extend(headers);
        self
    }

    /// Resolve a vendor-supplied URL against the configured root.
    ///
    /// Protocol-relative URLs (`//doc1.ecoledirecte.com/...`) take the root's scheme,
    /// root-relative paths are appended to the root.
    pub(crate) fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("//") {
            let scheme = self
                .root
                .split_once("://")
                .map(|(scheme, _)| scheme)
                .unwrap_or("https");
            format!("{}:{}", scheme, url)
        } else if url.starts_with('/') {
            format!("{}{}", self.root, url)
        } else {
            url.to_string()
        }
    }
}

fn parse_header_list(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter_map(|pair| pair.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}
