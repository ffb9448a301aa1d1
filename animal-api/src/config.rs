use serde::{Deserialize, Serialize};

/// Runtime configuration, loaded from a TOML file. Every field has a
/// default so a minimal (or empty) file is enough to start the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Catalog export consumed at startup.
    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,

    /// Translation export consumed at startup.
    #[serde(default = "default_translations_file")]
    pub translations_file: String,

    /// Documentation page served at /docs.
    #[serde(default = "default_docs_file")]
    pub docs_file: String,

    /// Directory served under /static.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_catalog_file() -> String {
    "data/animal_images.json".to_string()
}

fn default_translations_file() -> String {
    "data/animal_translations.json".to_string()
}

fn default_docs_file() -> String {
    "static/docs.html".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_enable_cors() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            catalog_file: default_catalog_file(),
            translations_file: default_translations_file(),
            docs_file: default_docs_file(),
            static_dir: default_static_dir(),
            enable_cors: default_enable_cors(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path, e))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path, e))?;

        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.catalog_file, "data/animal_images.json");
        assert!(config.enable_cors);
    }

    #[test]
    fn test_partial_file_overrides_defaults() {
        let config: AppConfig = toml::from_str("port = 9000\nlog_level = \"debug\"").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_server_address() {
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            ..AppConfig::default()
        };
        assert_eq!(config.server_address(), "127.0.0.1:3000");
    }
}
