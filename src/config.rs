use crate::cache::CachePolicy;
use std::time::Duration;

/// Dashboard client configuration
///
/// Built with chained setters, in the same way for the CLI, tests and
/// embedding views.
#[derive(Debug, Clone)]
pub struct DeskConfig {
    /// Backend API root, e.g. `https://pms.example.com/api`
    pub base_url: String,

    /// Bearer token sent with every request
    pub api_token: Option<String>,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Page size used when a view does not ask for one
    pub default_page_size: u32,

    /// Upper bound for requested page sizes
    pub max_page_size: u32,

    /// Route unauthenticated visitors are redirected to
    pub login_route: String,

    /// Mutation policy for list caches
    pub cache_policy: CachePolicy,
}

impl DeskConfig {
    pub const ENV_BASE_URL: &'static str = "PROPDESK_BASE_URL";
    pub const ENV_TOKEN: &'static str = "PROPDESK_TOKEN";
    pub const ENV_TIMEOUT_SECS: &'static str = "PROPDESK_TIMEOUT_SECS";

    /// Create a new configuration pointing at `base_url`
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_token: None,
            request_timeout: Duration::from_secs(30),
            default_page_size: 10,
            max_page_size: 100,
            login_route: "/login".to_string(),
            cache_policy: CachePolicy::default(),
        }
    }

    /// Set the bearer token
    pub fn api_token(mut self, token: &str) -> Self {
        self.api_token = Some(token.to_string());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set default page size
    pub fn default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = size;
        self
    }

    /// Set maximum page size
    pub fn max_page_size(mut self, size: u32) -> Self {
        self.max_page_size = size;
        self
    }

    /// Set login route
    pub fn login_route(mut self, route: &str) -> Self {
        self.login_route = route.to_string();
        self
    }

    /// Set cache policy
    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    /// Clamp a requested page size into `1..=max_page_size`
    ///
    /// `None` falls back to `default_page_size`.
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }

    /// Parse from an API URL that may carry a token
    ///
    /// Format: "http(s)://[token@]host[:port][/path]"
    ///
    /// # Examples
    ///
    /// ```
    /// # use propdesk::DeskConfig;
    /// let config = DeskConfig::from_url("https://s3cret@pms.example.com/api").unwrap();
    /// assert_eq!(config.base_url, "https://pms.example.com/api");
    /// assert_eq!(config.api_token.as_deref(), Some("s3cret"));
    /// ```
    pub fn from_url(url: &str) -> Result<Self, String> {
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| "URL must start with 'http://' or 'https://'".to_string())?;
        if scheme != "http" && scheme != "https" {
            return Err("URL must start with 'http://' or 'https://'".to_string());
        }

        let (authority, path) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };

        let (token, host) = match authority.rsplit_once('@') {
            Some((token, host)) => (Some(token), host),
            None => (None, authority),
        };

        if host.is_empty() {
            return Err("URL is missing a host".to_string());
        }
        // Bracketed IPv6 literals carry colons of their own.
        let port = match host.strip_prefix('[') {
            Some(v6) => {
                let (_, after) = v6
                    .split_once(']')
                    .ok_or_else(|| "Unclosed IPv6 host".to_string())?;
                match after {
                    "" => None,
                    _ => Some(
                        after
                            .strip_prefix(':')
                            .ok_or_else(|| "Invalid port".to_string())?,
                    ),
                }
            }
            None => host.rsplit_once(':').map(|(_, port)| port),
        };
        if let Some(port) = port {
            port.parse::<u16>().map_err(|_| "Invalid port".to_string())?;
        }

        let mut config = Self::new(&format!("{scheme}://{host}{path}"));
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            config = config.api_token(token);
        }
        Ok(config)
    }

    /// Build from `PROPDESK_*` environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = std::env::var(Self::ENV_BASE_URL)
            .map_err(|_| format!("{} is not set", Self::ENV_BASE_URL))?;
        let mut config = Self::from_url(&url)?;

        if let Ok(token) = std::env::var(Self::ENV_TOKEN) {
            config = config.api_token(&token);
        }
        if let Ok(secs) = std::env::var(Self::ENV_TIMEOUT_SECS) {
            let secs: u64 = secs
                .parse()
                .map_err(|_| format!("{} must be a number of seconds", Self::ENV_TIMEOUT_SECS))?;
            config = config.request_timeout(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    /// Convert to URL string
    pub fn to_url(&self) -> String {
        match (&self.api_token, self.base_url.split_once("://")) {
            (Some(_), Some((scheme, rest))) => format!("{scheme}://***@{rest}"), // Don't expose token
            _ => self.base_url.clone(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("base_url must start with 'http://' or 'https://'".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("request_timeout must be > 0".to_string());
        }

        if self.max_page_size == 0 {
            return Err("max_page_size must be > 0".to_string());
        }

        if self.default_page_size == 0 {
            return Err("default_page_size must be > 0".to_string());
        }

        if self.default_page_size > self.max_page_size {
            return Err("default_page_size cannot exceed max_page_size".to_string());
        }

        if !self.login_route.starts_with('/') {
            return Err("login_route must be an absolute path".to_string());
        }

        Ok(())
    }
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080/api")
    }
}
