use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_DATABASE_PATH: &str = "weather.db";
pub const DEFAULT_PORT: u16 = 3000;

/// Service configuration.
///
/// Example TOML:
/// ```toml
/// openweather_api_key = "..."
/// database_path = "/var/lib/weather/weather.db"
/// port = 8080
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openweather_api_key: Option<String>,
    pub openweather_base_url: String,
    pub database_path: PathBuf,
    pub port: u16,
    /// Directory served for non-API paths, if any.
    pub static_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openweather_api_key: None,
            openweather_base_url: DEFAULT_OPENWEATHER_BASE_URL.to_string(),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            port: DEFAULT_PORT,
            static_dir: None,
        }
    }
}

impl Config {
    /// Load config from `path` (or the platform config file when `None`),
    /// then apply process environment overrides.
    ///
    /// A missing file is not an error: defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_file_path()?,
        };

        let mut cfg = Self::from_file(&path)?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Read a TOML config file, or return defaults if it doesn't exist.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Override fields from environment variables looked up through `var`.
    ///
    /// Recognized: `OPENWEATHER_API_KEY`, `OPENWEATHER_BASE_URL`,
    /// `DATABASE_PATH`, `PORT`, `STATIC_DIR`. Empty values are ignored.
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENWEATHER_API_KEY") {
            self.openweather_api_key = Some(key);
        }
        if let Some(url) = get("OPENWEATHER_BASE_URL") {
            self.openweather_base_url = url;
        }
        if let Some(path) = get("DATABASE_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(port) = get("PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value '{port}'"))?;
        }
        if let Some(dir) = get("STATIC_DIR") {
            self.static_dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }

    /// Returns the OpenWeather API key, if present.
    pub fn api_key(&self) -> Option<&str> {
        self.openweather_api_key.as_deref()
    }

    /// Path to the platform config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_file_or_env() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::from_file(&dir.path().join("missing.toml")).unwrap();

        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.openweather_base_url, "https://api.openweathermap.org");
    }

    #[test]
    fn file_values_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "openweather_api_key = \"FILE_KEY\"\nport = 8081\n").unwrap();

        let cfg = Config::from_file(&path).unwrap();
        assert_eq!(cfg.api_key(), Some("FILE_KEY"));
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.database_path, PathBuf::from("weather.db"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "port = \"not a number\"").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config {
            openweather_api_key: Some("FILE_KEY".into()),
            ..Config::default()
        };

        cfg.apply_env(env(&[
            ("OPENWEATHER_API_KEY", "ENV_KEY"),
            ("DATABASE_PATH", "/tmp/readings.db"),
            ("PORT", "9000"),
            ("STATIC_DIR", "public"),
        ]))
        .unwrap();

        assert_eq!(cfg.api_key(), Some("ENV_KEY"));
        assert_eq!(cfg.database_path, PathBuf::from("/tmp/readings.db"));
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.static_dir, Some(PathBuf::from("public")));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut cfg = Config::default();
        cfg.apply_env(env(&[("OPENWEATHER_API_KEY", ""), ("PORT", "  ")])).unwrap();

        assert_eq!(cfg.api_key(), None);
        assert_eq!(cfg.port, DEFAULT_PORT);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let mut cfg = Config::default();
        let err = cfg.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("Invalid PORT value"));
    }
}
