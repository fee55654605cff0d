use crate::remote::DEFAULT_COLLECTION;
use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "data/state.json";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_path: PathBuf,
    pub port: u16,
    /// Base URL of the document store. Without one, sync stays in-process.
    pub remote_url: Option<String>,
    pub remote_collection: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            data_path: non_empty("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            port: non_empty("PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            remote_url: non_empty("REMOTE_URL"),
            remote_collection: non_empty("REMOTE_COLLECTION")
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.remote_url, None);
        assert_eq!(config.remote_collection, DEFAULT_COLLECTION);
    }

    #[test]
    fn values_are_read_and_bad_port_falls_back() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("APP_DATA_PATH", "/tmp/tracker.json"),
            ("PORT", "not-a-port"),
            ("REMOTE_URL", "https://store.example.com"),
            ("REMOTE_COLLECTION", " "),
        ]);
        let config = Config::from_lookup(|key| env.get(key).map(|value| value.to_string()));
        assert_eq!(config.data_path, PathBuf::from("/tmp/tracker.json"));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.remote_url.as_deref(), Some("https://store.example.com"));
        assert_eq!(config.remote_collection, DEFAULT_COLLECTION);
    }
}
