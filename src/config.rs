use serde::Deserialize;
use std::path::Path;

/// Server configuration: where to listen and how many worker threads to run.
///
/// Loaded once at startup and fixed for the process lifetime. Values come
/// from a YAML file (path in the `CONFIG` env var, default `adam.yaml`);
/// a missing file falls back to the built-in defaults.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Bind address and port, e.g. "0.0.0.0:5000"
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Number of worker threads driving the reactor
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_listen_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_threads() -> usize {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            threads: default_threads(),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG").unwrap_or_else(|_| "adam.yaml".to_string());

        if !Path::new(&path).exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)?;
        let cfg = serde_yaml::from_str(&contents)?;
        Ok(cfg)
    }
}
