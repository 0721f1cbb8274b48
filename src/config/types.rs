use serde::Deserialize;

/// Desktop Chrome user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Main configuration structure for Link-Sweeper
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub verify: VerifyConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Seed URL the crawl starts from
    pub initial_url: String,

    /// Only pages whose URL contains this substring are expanded.
    /// Defaults to the host of `initial_url`.
    #[serde(default, alias = "main-domain")]
    pub child_urls_should_contain: Option<String>,

    /// Ceiling for the adaptive worker count
    #[serde(default = "default_max_threads_count")]
    pub max_threads_count: usize,

    /// Number of hops after the seed page
    #[serde(default = "default_max_recursion")]
    pub max_recursion: u32,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Safety ceiling for in-flight fetches
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,

    /// Maximum number of URLs fetched per run (0 = unlimited)
    #[serde(default)]
    pub limit: usize,
}

impl CrawlConfig {
    /// Returns the scope filter, falling back to the seed's host
    pub fn domain_filter(&self) -> String {
        if let Some(filter) = &self.child_urls_should_contain {
            return filter.clone();
        }

        ::url::Url::parse(&self.initial_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default()
    }
}

/// URL filter lists
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FilterConfig {
    /// Candidates containing any of these substrings are never extracted
    #[serde(default)]
    pub ignore_urls: PatternList,

    /// URLs containing any of these substrings are never fetched or reported
    #[serde(default)]
    pub exclude_urls: PatternList,

    /// Whether substring matching is case-sensitive
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ignore_urls: PatternList::default(),
            exclude_urls: PatternList::default(),
            case_sensitive: true,
        }
    }
}

/// A list of substrings, written either as a TOML array or as a
/// newline-separated string
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawPatternList")]
pub struct PatternList(pub Vec<String>);

impl PatternList {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPatternList {
    Lines(String),
    List(Vec<String>),
}

impl From<RawPatternList> for PatternList {
    fn from(raw: RawPatternList) -> Self {
        let items: Vec<String> = match raw {
            RawPatternList::Lines(s) => s.lines().map(str::to_string).collect(),
            RawPatternList::List(v) => v,
        };

        // Blank entries would match every URL
        PatternList(
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Skip TLS certificate validation
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_invalid_certs: false,
        }
    }
}

/// Which visibility oracle renders the parent page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerifyBackend {
    /// Parse the served markup and apply the hidden-ancestor rule
    #[default]
    Static,
    /// Render in headless Chromium (requires the `browser` feature)
    Browser,
}

/// Visibility verification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VerifyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub backend: VerifyBackend,

    /// Time budget per verification (seconds)
    #[serde(default = "default_verify_timeout")]
    pub timeout: u64,

    #[serde(default = "default_verify_concurrency")]
    pub max_concurrent: usize,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: VerifyBackend::Static,
            timeout: default_verify_timeout(),
            max_concurrent: default_verify_concurrency(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Text file receiving one line per reported failure
    #[serde(default = "default_results_file")]
    pub results_file: String,

    /// Text file receiving every crawled URL
    #[serde(default = "default_links_file")]
    pub links_file: String,

    /// HTML report path; derived from the domain filter when unset
    #[serde(default)]
    pub html_report_name: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_file: default_results_file(),
            links_file: default_links_file(),
            html_report_name: None,
        }
    }
}

impl Config {
    /// Resolves the HTML report path
    pub fn html_report_path(&self) -> String {
        match &self.output.html_report_name {
            Some(name) => name.clone(),
            None => format!("results_for_{}.html", self.crawl.domain_filter()),
        }
    }
}

fn default_max_threads_count() -> usize {
    20
}

fn default_max_recursion() -> u32 {
    3
}

fn default_timeout() -> u64 {
    5
}

fn default_concurrency_limit() -> usize {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_verify_timeout() -> u64 {
    30
}

fn default_verify_concurrency() -> usize {
    2
}

fn default_results_file() -> String {
    "results.txt".to_string()
}

fn default_links_file() -> String {
    "all_tested_links".to_string()
}
