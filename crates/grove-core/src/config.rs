//! Configuration types for Grove.
//!
//! [`GlobalConfig`] is user-level configuration stored in
//! `~/.grove/config.yaml`. Every section has defaults, so a missing file or a
//! partial file is always valid.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    DATA_DIR, DEFAULT_BINARY_EXTENSIONS, DEFAULT_CONCURRENCY, DEFAULT_EXCLUDED_DIRS,
    DEFAULT_MAX_BACKOFF_SECS, DEFAULT_MAX_RETRIES, DEFAULT_TOKEN_ENV, DEFAULT_USER_ID,
    GLOBAL_CONFIG_FILENAME, GROVE_HOME_DIR, MAX_CONCURRENCY, ROOT_FOLDER_NAME,
};
use crate::errors::GroveError;
use crate::types::TemplateKind;

/// Default HTTP timeout for GitHub requests, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// GlobalConfig
// ============================================================================

/// Global (user-level) configuration for Grove.
///
/// # Example YAML
///
/// ```yaml
/// github:
///   apiBaseUrl: https://api.github.com
///   timeoutSecs: 30
///   tokenEnv: GITHUB_TOKEN
/// import:
///   excludedDirs: [node_modules, vendor]
///   concurrency: 8
///   maxRetries: 3
///   defaultTemplate: NEXTJS
/// store:
///   backend: file
///   dataDir: /var/lib/grove
/// user:
///   id: alice
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// GitHub API settings.
    #[serde(default)]
    pub github: GithubSection,

    /// Import pipeline settings.
    #[serde(default)]
    pub import: ImportSection,

    /// Record store settings.
    #[serde(default)]
    pub store: StoreSection,

    /// Local user identity.
    #[serde(default)]
    pub user: UserSection,
}

impl GlobalConfig {
    /// Load the global configuration from the default location (`~/.grove/config.yaml`).
    ///
    /// If the file does not exist, returns a default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GroveError::InvalidGlobalConfig`] if the file exists but cannot be parsed.
    pub fn load_default() -> Result<Self, GroveError> {
        match Self::default_path() {
            Some(path) => Self::from_path(&path),
            None => {
                tracing::debug!("Could not determine home directory, using default config");
                Ok(Self::default())
            }
        }
    }

    /// Load the global configuration from a specific path.
    ///
    /// If the file does not exist, returns a default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GroveError::InvalidGlobalConfig`] if the file exists but cannot be parsed.
    /// Returns [`GroveError::InvalidConfiguration`] if validation fails.
    pub fn from_path(path: &Path) -> Result<Self, GroveError> {
        let config = Self::parse_path(path)?;

        let warnings = config.validate()?;
        for warning in warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(config)
    }

    /// Read and parse a config file without validating it.
    ///
    /// Used by `grove config check`, which reports validation itself.
    pub fn parse_path(path: &Path) -> Result<Self, GroveError> {
        if !path.exists() {
            tracing::debug!(
                "Global config not found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            GroveError::InvalidGlobalConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            GroveError::InvalidGlobalConfig(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Get the default global config directory (`~/.grove`).
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(GROVE_HOME_DIR))
    }

    /// Get the default global config file path (`~/.grove/config.yaml`).
    pub fn default_path() -> Option<PathBuf> {
        Self::default_dir().map(|d| d.join(GLOBAL_CONFIG_FILENAME))
    }

    /// Validates the entire configuration, returning collected warnings.
    ///
    /// # Errors
    ///
    /// Returns an error for values the pipeline cannot run with. Callers
    /// should log the warnings but can proceed with the configuration.
    pub fn validate(&self) -> Result<Vec<String>, GroveError> {
        let mut all_warnings = Vec::new();
        all_warnings.extend(self.github.validate()?);
        all_warnings.extend(self.import.validate()?);
        all_warnings.extend(self.store.validate()?);

        if self.user.id.trim().is_empty() {
            return Err(GroveError::InvalidConfiguration {
                message: "user.id cannot be empty".to_string(),
                hint: "Remove user.id to use the default `local` user".to_string(),
            });
        }

        Ok(all_warnings)
    }
}

// ============================================================================
// GithubSection
// ============================================================================

/// GitHub API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubSection {
    /// Base URL of the REST API. Point it at GitHub Enterprise or a test server.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// User-Agent header. Defaults to `grove/<version>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Environment variable holding the access token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_api_base_url() -> String {
    grove_github::DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

impl Default for GithubSection {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_env: default_token_env(),
        }
    }
}

impl GithubSection {
    /// Validates the GitHub section.
    ///
    /// # Errors
    /// Returns an error if `timeoutSecs` is 0 or `apiBaseUrl` is not http(s).
    pub fn validate(&self) -> Result<Vec<String>, GroveError> {
        let mut warnings = Vec::new();

        if self.timeout_secs == 0 {
            return Err(GroveError::InvalidConfiguration {
                message: "github.timeoutSecs cannot be 0".to_string(),
                hint: "Set timeoutSecs to at least 1 (default: 30)".to_string(),
            });
        }

        if !self.api_base_url.starts_with("https://") && !self.api_base_url.starts_with("http://")
        {
            return Err(GroveError::InvalidConfiguration {
                message: format!(
                    "github.apiBaseUrl `{}` is not an http(s) URL",
                    self.api_base_url
                ),
                hint: "Use https://api.github.com or your GitHub Enterprise API URL".to_string(),
            });
        }

        if self.api_base_url.starts_with("http://") {
            warnings.push(format!(
                "github.apiBaseUrl={} is not HTTPS; the access token will be sent in clear text",
                self.api_base_url
            ));
        }

        if self.token_env.trim().is_empty() {
            warnings.push(
                "github.tokenEnv is empty; tokens can only come from --token or linked accounts"
                    .to_string(),
            );
        }

        Ok(warnings)
    }
}

// ============================================================================
// ImportSection
// ============================================================================

/// Import pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSection {
    /// Directory names excluded at any depth.
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,

    /// Extensions (without dot, case-insensitive) treated as binary.
    #[serde(default = "default_binary_extensions")]
    pub binary_extensions: Vec<String>,

    /// Number of content-fetch workers (1..=64).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Retries for rate-limited or failed transport requests.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Cap on any single wait, in seconds.
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,

    /// Template kind used when the request does not name one.
    #[serde(default)]
    pub default_template: TemplateKind,

    /// Name of the root folder of the tree.
    #[serde(default = "default_root_folder_name")]
    pub root_folder_name: String,
}

fn default_excluded_dirs() -> Vec<String> {
    DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect()
}

fn default_binary_extensions() -> Vec<String> {
    DEFAULT_BINARY_EXTENSIONS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_max_backoff_secs() -> u64 {
    DEFAULT_MAX_BACKOFF_SECS
}

fn default_root_folder_name() -> String {
    ROOT_FOLDER_NAME.to_string()
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            excluded_dirs: default_excluded_dirs(),
            binary_extensions: default_binary_extensions(),
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: DEFAULT_MAX_RETRIES,
            max_backoff_secs: DEFAULT_MAX_BACKOFF_SECS,
            default_template: TemplateKind::default(),
            root_folder_name: default_root_folder_name(),
        }
    }
}

impl ImportSection {
    /// Validates the import section, returning warnings for questionable values.
    ///
    /// # Errors
    /// Returns an error if `concurrency` is outside 1..=64 or the root folder
    /// name is empty or contains `/`.
    ///
    /// # Warnings
    /// - `concurrency > 16`: likely to trip GitHub secondary rate limits
    /// - `maxRetries > 10`: a single path may block a worker for a long time
    /// - `excludedDirs` without `node_modules`
    pub fn validate(&self) -> Result<Vec<String>, GroveError> {
        let mut warnings = Vec::new();

        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            return Err(GroveError::InvalidConfiguration {
                message: format!(
                    "import.concurrency={} is out of range 1..={}",
                    self.concurrency, MAX_CONCURRENCY
                ),
                hint: "Set concurrency between 1 and 64 (default: 8)".to_string(),
            });
        }

        if self.root_folder_name.trim().is_empty() || self.root_folder_name.contains('/') {
            return Err(GroveError::InvalidConfiguration {
                message: format!(
                    "import.rootFolderName `{}` is not a valid folder name",
                    self.root_folder_name
                ),
                hint: "Use a single non-empty segment (default: Root)".to_string(),
            });
        }

        if self.concurrency > 16 {
            warnings.push(format!(
                "import.concurrency={} is high; GitHub may apply secondary rate limits (recommended: 4-16)",
                self.concurrency
            ));
        }

        if self.max_retries > 10 {
            warnings.push(format!(
                "import.maxRetries={} is very large; a failing path may stall a worker",
                self.max_retries
            ));
        }

        if !self.excluded_dirs.iter().any(|d| d == "node_modules") {
            warnings.push(
                "import.excludedDirs does not contain node_modules; dependency trees will be imported"
                    .to_string(),
            );
        }

        Ok(warnings)
    }
}

// ============================================================================
// StoreSection
// ============================================================================

/// Record store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSection {
    /// Backend name (`file` or `memory`).
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// Data directory. Defaults to `~/.grove/data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_store_backend() -> String {
    grove_db::DEFAULT_BACKEND.to_string()
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            data_dir: None,
        }
    }
}

impl StoreSection {
    /// Resolve the data directory, falling back to `~/.grove/data`, then
    /// `./.grove/data` when no home directory is known.
    pub fn resolved_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.clone(),
            None => GlobalConfig::default_dir()
                .unwrap_or_else(|| PathBuf::from(GROVE_HOME_DIR))
                .join(DATA_DIR),
        }
    }

    /// Validates the store section.
    pub fn validate(&self) -> Result<Vec<String>, GroveError> {
        let available = grove_db::available_backends();
        if !available.contains(&self.backend.as_str()) {
            return Err(GroveError::InvalidConfiguration {
                message: format!("store.backend `{}` is unknown", self.backend),
                hint: format!("Use one of: {}", available.join(", ")),
            });
        }

        let mut warnings = Vec::new();
        if self.backend == "memory" {
            warnings.push(
                "store.backend=memory; imported workspaces are lost when the process exits"
                    .to_string(),
            );
        }
        Ok(warnings)
    }
}

// ============================================================================
// UserSection
// ============================================================================

/// Local user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSection {
    #[serde(default = "default_user_id")]
    pub id: String,
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

impl Default for UserSection {
    fn default() -> Self {
        Self {
            id: default_user_id(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_global_config_default() {
        let config = GlobalConfig::default();
        assert_eq!(config.github.api_base_url, "https://api.github.com");
        assert_eq!(config.github.timeout_secs, 30);
        assert_eq!(config.import.concurrency, 8);
        assert_eq!(config.import.root_folder_name, "Root");
        assert_eq!(config.import.default_template, TemplateKind::React);
        assert_eq!(config.user.id, "local");
        assert!(config.validate().unwrap().is_empty());
    }

    #[test]
    fn test_global_config_from_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(
            &path,
            r#"
github:
  apiBaseUrl: https://ghe.example.com/api/v3
  tokenEnv: GHE_TOKEN
import:
  concurrency: 4
  defaultTemplate: NEXTJS
  excludedDirs: [node_modules, vendor]
user:
  id: alice
"#,
        )
        .unwrap();

        let config = GlobalConfig::from_path(&path).unwrap();
        assert_eq!(config.github.api_base_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.github.token_env, "GHE_TOKEN");
        assert_eq!(config.github.timeout_secs, 30);
        assert_eq!(config.import.concurrency, 4);
        assert_eq!(config.import.default_template, TemplateKind::Nextjs);
        assert_eq!(config.import.excluded_dirs, vec!["node_modules", "vendor"]);
        assert!(config.import.binary_extensions.contains(&"svg".to_string()));
        assert_eq!(config.user.id, "alice");
    }

    #[test]
    fn test_global_config_missing_file() {
        let temp = TempDir::new().unwrap();
        let config = GlobalConfig::from_path(&temp.path().join("nope.yaml")).unwrap();
        assert_eq!(config.import.concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_global_config_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "import: [not, a, map").unwrap();

        let result = GlobalConfig::from_path(&path);
        assert!(matches!(result, Err(GroveError::InvalidGlobalConfig(_))));
    }

    #[test]
    fn test_concurrency_bounds() {
        let mut import = ImportSection {
            concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(
            import.validate(),
            Err(GroveError::InvalidConfiguration { .. })
        ));

        import.concurrency = 65;
        assert!(import.validate().is_err());

        import.concurrency = 32;
        let warnings = import.validate().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("concurrency=32"));
    }

    #[test]
    fn test_root_folder_name_must_be_segment() {
        let import = ImportSection {
            root_folder_name: "a/b".to_string(),
            ..Default::default()
        };
        assert!(import.validate().is_err());
    }

    #[test]
    fn test_plain_http_warns() {
        let github = GithubSection {
            api_base_url: "http://127.0.0.1:8080".to_string(),
            ..Default::default()
        };
        assert_eq!(github.validate().unwrap().len(), 1);

        let bad = GithubSection {
            api_base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_unknown_store_backend() {
        let store = StoreSection {
            backend: "redis".to_string(),
            data_dir: None,
        };
        assert!(store.validate().is_err());
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let store = StoreSection {
            backend: "file".to_string(),
            data_dir: Some(PathBuf::from("/srv/grove")),
        };
        assert_eq!(store.resolved_data_dir(), PathBuf::from("/srv/grove"));
    }
}
