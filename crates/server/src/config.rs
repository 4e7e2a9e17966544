use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DIST_DIR: &str = "dist";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_UPSTREAM_API_URL: &str = "http://localhost:8000";

/// Runtime settings of the console server, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    /// Built frontend: `index.html`, bundles and `assets/`.
    pub dist_dir: PathBuf,
    /// Hand-maintained files served under `/static`.
    pub static_dir: PathBuf,
    /// Fleet API that `/api/*` is forwarded to, without a trailing slash.
    pub upstream_api_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: DEFAULT_PORT,
            dist_dir: PathBuf::from(DEFAULT_DIST_DIR),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            upstream_api_url: DEFAULT_UPSTREAM_API_URL.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Unset or blank keys take their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = ServerConfig::default();

        if let Some(port) = get("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|e| format!("Invalid PORT {:?}: {}", port, e))?;
        }
        if let Some(dir) = get("DIST_DIR") {
            config.dist_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(url) = get("UPSTREAM_API_URL") {
            let url = url.trim().trim_end_matches('/');
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("UPSTREAM_API_URL must be an http(s) URL, got {:?}", url));
            }
            config.upstream_api_url = url.to_string();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 3000);
        assert_eq!(config.dist_dir, PathBuf::from("dist"));
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert_eq!(config.upstream_api_url, "http://localhost:8000");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("DIST_DIR", "/srv/console"),
            ("STATIC_DIR", "/srv/static"),
            ("UPSTREAM_API_URL", "https://fleet.internal/"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.dist_dir, PathBuf::from("/srv/console"));
        assert_eq!(config.static_dir, PathBuf::from("/srv/static"));
        assert_eq!(config.upstream_api_url, "https://fleet.internal");
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config =
            ServerConfig::from_lookup(lookup(&[("PORT", "  "), ("DIST_DIR", "")])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.dist_dir, PathBuf::from("dist"));
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.contains("PORT"));
    }

    #[test]
    fn test_upstream_requires_scheme() {
        let err = ServerConfig::from_lookup(lookup(&[("UPSTREAM_API_URL", "localhost:8000")]))
            .unwrap_err();
        assert!(err.contains("UPSTREAM_API_URL"));
    }
}
