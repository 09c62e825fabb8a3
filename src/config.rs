use colored::*;
use eyre::{Context, Result};
use ollama::api::Options;
use ollama::progress::DEFAULT_LABEL_LENGTH;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const HOST_ENV: &str = "OLLAMA_HOST";
pub const PORT_ENV: &str = "OLLAMA_PORT";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub server: ServerConfig,
    pub progress: ProgressConfig,
    pub options: Options,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 11434,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Hex characters of a layer digest shown in progress bars
    pub digest_label_length: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            digest_label_length: DEFAULT_LABEL_LENGTH,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            server: ServerConfig::default(),
            progress: ProgressConfig::default(),
            options: Options::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");
        let mut candidates = Vec::new();

        // Primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join(project_name).join(format!("{}.yml", project_name)));
        }

        // Fallback location: ./<project>.yml
        candidates.push(PathBuf::from(format!("{}.yml", project_name)));

        let (config, rejected) = Self::load_first(&candidates);
        for path in &rejected {
            eprintln!("{} ignoring unreadable config {}", "Warning:".yellow(), path.display());
        }
        Ok(config)
    }

    /// Load the first candidate that exists and parses.
    ///
    /// Also returns the candidates that existed but could not be loaded.
    fn load_first(candidates: &[PathBuf]) -> (Self, Vec<PathBuf>) {
        let mut rejected = Vec::new();

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return (config, rejected),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {:#}", path.display(), e);
                    rejected.push(path.clone());
                }
            }
        }

        // No usable config file found, use defaults
        log::info!("No config file found, using defaults");
        (Self::default(), rejected)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply endpoint overrides looked up through `var`.
    ///
    /// A host value that already carries a port takes precedence over the
    /// separate port variable.
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = var(PORT_ENV).filter(|p| !p.is_empty()) {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid {}: {}", PORT_ENV, port))?;
        }

        if let Some(host) = var(HOST_ENV).filter(|h| !h.is_empty()) {
            if host.contains("://") {
                // Full URL, handed to the client as is
                self.server.host = host;
                return Ok(());
            }

            match split_host_port(&host) {
                Some((name, port)) => {
                    self.server.host = name.to_string();
                    self.server.port = port
                        .parse()
                        .with_context(|| format!("Invalid port in {}: {}", HOST_ENV, host))?;
                }
                None => self.server.host = host,
            }
        }

        Ok(())
    }

    /// `host:port` or full URL handed to the API client
    pub fn endpoint(&self) -> String {
        if self.server.host.contains("://") {
            self.server.host.clone()
        } else if self.server.host.contains(':') && !self.server.host.starts_with('[') {
            // Bare IPv6 literal
            format!("[{}]:{}", self.server.host, self.server.port)
        } else {
            format!("{}:{}", self.server.host, self.server.port)
        }
    }
}

/// Split `name:port`, leaving bare IPv6 literals alone.
fn split_host_port(host: &str) -> Option<(&str, &str)> {
    if let Some(rest) = host.strip_prefix('[') {
        let (name, tail) = rest.split_once(']')?;
        let port = tail.strip_prefix(':')?;
        return Some((name, port));
    }

    match host.matches(':').count() {
        1 => host.split_once(':'),
        _ => None,
    }
}
