use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const ENV_PREFIX: &str = "FINADVISOR";

/// Which token endpoint the backend exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginContract {
    /// `POST /auth/login` with a JSON body.
    Json,
    /// `POST /auth/token` with an OAuth2 password form.
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_endpoint: String,
    pub login_contract: LoginContract,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_file: Option<PathBuf>,
    pub color_output: bool,
    pub default_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_endpoint: "http://localhost:8000".to_string(),
            login_contract: LoginContract::Json,
            request_timeout_secs: None,
            session_file: None,
            color_output: true,
            default_format: OutputFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from `path` (or the default location), layered
    /// under `FINADVISOR_*` environment variables.
    ///
    /// A missing file is created with defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::get_config_path()?,
        };

        if !config_path.exists() {
            Config::default().save_to(&config_path)?;
        }

        let settings = config::Config::builder()
            .add_source(
                config::File::new(&config_path.to_string_lossy(), config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let config: Config = settings
            .try_deserialize()
            .context("Invalid configuration")?;

        tracing::debug!(path = %config_path.display(), endpoint = %config.api_endpoint, "configuration loaded");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }

    pub fn reset(path: &Path) -> Result<()> {
        Config::default().save_to(path)
    }

    /// Update a single key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_endpoint" => {
                url::Url::parse(value).with_context(|| format!("Invalid URL: {}", value))?;
                self.api_endpoint = value.to_string();
            }
            "login_contract" => self.login_contract = value.parse()?,
            "request_timeout_secs" => {
                self.request_timeout_secs = match value {
                    "" | "none" => None,
                    v => Some(v.parse().context("Timeout must be a whole number of seconds")?),
                }
            }
            "session_file" => {
                self.session_file = match value {
                    "" | "none" => None,
                    v => Some(PathBuf::from(v)),
                }
            }
            "color_output" => self.color_output = value.parse()?,
            "default_format" => self.default_format = value.parse()?,
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Where the session token lives unless `session_file` overrides it.
    pub fn session_path(&self) -> Result<PathBuf> {
        match &self.session_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.config_dir().join("session.json")),
        }
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "finadvisor", "finadvisor")
            .ok_or_else(|| anyhow::anyhow!("Unable to determine config directory"))
    }
}

impl FromStr for LoginContract {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LoginContract::Json),
            "form" => Ok(LoginContract::Form),
            other => anyhow::bail!("Unknown login contract '{}' (expected json or form)", other),
        }
    }
}

impl fmt::Display for LoginContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginContract::Json => write!(f, "json"),
            LoginContract::Form => write!(f, "form"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => anyhow::bail!("Unknown output format '{}' (expected text or json)", other),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
