//! Layered configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults,
//! 2. a TOML file (named explicitly, or `folio.toml` in the platform
//!    configuration directory when it exists),
//! 3. environment variables prefixed with `FOLIO_` (e.g. `FOLIO_DELAY_MS`).

pub mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ErrorKind, Result};

/// Browser identification sent with every request. Some publication hosts
/// refuse clients that do not look like a desktop browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_9_3) AppleWebKit/537.36 \
                                      (KHTML, like Gecko) Chrome/35.0.1916.47 Safari/537.36";
pub const DEFAULT_ROOT_URL: &str = "https://theschooloflife.com/thebookoflife";
pub const ENV_PREFIX: &str = "FOLIO_";
pub const FILE_NAME: &str = "folio.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Landing page of the publication.
    pub root_url: String,
    /// Output root. Relative paths are resolved against the working directory.
    pub output: PathBuf,
    pub user_agent: String,
    /// Pause after every page request, in milliseconds.
    pub delay_ms: u64,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            root_url: DEFAULT_ROOT_URL.to_string(),
            output: PathBuf::from("source"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            delay_ms: 1000,
            timeout_secs: 30,
        }
    }
}
impl Config {
    /// Loads and validates the configuration.
    ///
    /// # Errors
    ///
    /// Fails if `file` is given but missing, if a source cannot be parsed,
    /// or if a value does not validate.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        if let Some(file) = file
            && !file.is_file()
        {
            exn::bail!(ErrorKind::MissingFile(file.to_path_buf()));
        }
        let file = file.map(Path::to_path_buf).or_else(Self::default_file);
        match &file {
            Some(file) => tracing::debug!(path = %file.display(), "loading configuration file"),
            None => tracing::debug!("no configuration file, using defaults and environment"),
        }
        Self::from_figment(&Self::figment(file.as_deref()))
    }

    /// The layered sources, without extracting them.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment.extract().map_err(|e| ErrorKind::Load(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// `folio.toml` in the platform configuration directory, if it exists.
    pub fn default_file() -> Option<PathBuf> {
        let dirs = ProjectDirs::from("", "", "folio")?;
        Some(dirs.config_dir().join(FILE_NAME)).filter(|path| path.is_file())
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.root_url).map_err(|e| ErrorKind::Invalid {
            field: "root_url",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            exn::bail!(ErrorKind::Invalid {
                field: "root_url",
                reason: format!("expected an absolute http(s) URL, found {}", self.root_url),
            });
        }
        if self.user_agent.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid {
                field: "user_agent",
                reason: "must not be empty".to_string(),
            });
        }
        if self.output.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid {
                field: "output",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
