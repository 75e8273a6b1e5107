use std::env;
use std::time::Duration;

use sitemd_crawler::{CrawlerConfig, DEFAULT_MAX_PAGES, FetchConfig, ScopePolicy, timeout_from_secs};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub cors_origins: Vec<String>,
    pub max_pages: usize,
    pub fetch_timeout: Duration,
    pub scope: ScopePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "sitemd_web_api=debug,sitemd_crawler=info,tower_http=debug".to_string(),
            log_format: LogFormat::Json,
            cors_origins: vec!["*".to_string()],
            max_pages: DEFAULT_MAX_PAGES,
            fetch_timeout: Duration::from_secs(30),
            scope: ScopePolicy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, which maps a variable name
    /// to its value. Unparsable values are reported and replaced by the
    /// default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("SITEMD_HOST") {
            config.host = host;
        }

        if let Some(port_str) = lookup("SITEMD_PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                config.port = port;
            } else {
                eprintln!(
                    "Warning: Invalid SITEMD_PORT value '{}', using default {}",
                    port_str, config.port
                );
            }
        }

        if let Some(log_level) = lookup("RUST_LOG") {
            config.log_level = log_level;
        } else if let Some(log_level) = lookup("SITEMD_LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Some(log_format) = lookup("SITEMD_LOG_FORMAT") {
            config.log_format = match log_format.to_lowercase().as_str() {
                "text" | "plain" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    eprintln!(
                        "Warning: Invalid SITEMD_LOG_FORMAT value '{}', using default JSON",
                        log_format
                    );
                    LogFormat::Json
                }
            };
        }

        if let Some(cors_origins) = lookup("SITEMD_CORS_ORIGINS") {
            config.cors_origins = cors_origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(max_pages_str) = lookup("SITEMD_MAX_PAGES") {
            match max_pages_str.parse::<usize>() {
                Ok(max_pages) if max_pages > 0 => config.max_pages = max_pages,
                _ => eprintln!(
                    "Warning: Invalid SITEMD_MAX_PAGES value '{}', using default {}",
                    max_pages_str, config.max_pages
                ),
            }
        }

        if let Some(timeout_str) = lookup("SITEMD_FETCH_TIMEOUT_SECONDS") {
            match timeout_str.parse::<f64>().map_err(|e| e.to_string()).and_then(timeout_from_secs) {
                Ok(timeout) => config.fetch_timeout = timeout,
                Err(_) => eprintln!(
                    "Warning: Invalid SITEMD_FETCH_TIMEOUT_SECONDS value '{}', using default {}",
                    timeout_str,
                    config.fetch_timeout.as_secs()
                ),
            }
        }

        if let Some(scope_str) = lookup("SITEMD_SCOPE") {
            match scope_str.parse::<ScopePolicy>() {
                Ok(scope) => config.scope = scope,
                Err(e) => eprintln!("Warning: {}, using default {}", e, config.scope),
            }
        }

        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        if self.port == 80 {
            format!("http://{}", self.host)
        } else if self.port == 443 {
            format!("https://{}", self.host)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    pub fn crawler_config(&self) -> CrawlerConfig {
        CrawlerConfig {
            max_pages: self.max_pages,
            scope: self.scope,
            ..Default::default()
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout: self.fetch_timeout,
            ..Default::default()
        }
    }
}
