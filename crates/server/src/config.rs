use anyhow::Context;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

/// Names the TOML file to read before environment overrides are applied.
pub const CONFIG_PATH_VAR: &str = "SLIPSCAN_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
    pub tesseract_data_path: Option<String>,
    pub tesseract_lang: String,
    /// CORS origins; empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8001)),
            max_upload_bytes: 10 * 1024 * 1024,
            tesseract_data_path: None,
            tesseract_lang: "eng".to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Defaults, then the file named by `SLIPSCAN_CONFIG`, then environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = match env(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(env)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(bind) = env("SLIPSCAN_BIND") {
            self.bind = bind
                .parse()
                .with_context(|| format!("invalid SLIPSCAN_BIND '{bind}'"))?;
        }
        if let Some(limit) = env("SLIPSCAN_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = limit
                .parse()
                .with_context(|| format!("invalid SLIPSCAN_MAX_UPLOAD_BYTES '{limit}'"))?;
        }
        if let Some(path) = env("TESSDATA_PREFIX") {
            self.tesseract_data_path = Some(path);
        }
        if let Some(lang) = env("SLIPSCAN_LANG") {
            self.tesseract_lang = lang;
        }
        if let Some(origins) = env("SLIPSCAN_ALLOWED_ORIGINS") {
            self.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_listen_on_8001() {
        let config = ServerConfig::load_with(env_of(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind.port(), 8001);
        assert_eq!(config.tesseract_lang, "eng");
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn file_values_fill_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind = \"127.0.0.1:9100\"\nallowed_origins = [\"https://books.example\"]").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.bind, "127.0.0.1:9100".parse::<SocketAddr>().unwrap());
        assert_eq!(config.allowed_origins, vec!["https://books.example"]);
        assert_eq!(config.max_upload_bytes, ServerConfig::default().max_upload_bytes);
    }

    #[test]
    fn env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tesseract_lang = \"deu\"\nmax_upload_bytes = 2048").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = ServerConfig::load_with(env_of(&[
            (CONFIG_PATH_VAR, path.as_str()),
            ("SLIPSCAN_LANG", "eng+deu"),
            ("SLIPSCAN_ALLOWED_ORIGINS", "http://a.test, ,http://b.test"),
            ("TESSDATA_PREFIX", "/usr/share/tessdata"),
        ]))
        .unwrap();

        assert_eq!(config.tesseract_lang, "eng+deu");
        assert_eq!(config.max_upload_bytes, 2048);
        assert_eq!(config.allowed_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.tesseract_data_path.as_deref(), Some("/usr/share/tessdata"));
    }

    #[test]
    fn invalid_bind_is_an_error() {
        let err = ServerConfig::load_with(env_of(&[("SLIPSCAN_BIND", "not-an-addr")])).unwrap_err();
        assert!(err.to_string().contains("SLIPSCAN_BIND"));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let result = ServerConfig::load_with(env_of(&[(CONFIG_PATH_VAR, "/nonexistent/slipscan.toml")]));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind = 42").unwrap();
        assert!(ServerConfig::from_file(file.path()).is_err());
    }
}
