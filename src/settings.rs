use std::path::PathBuf;

use config::{Config, Environment};
use serde::Deserialize;

const DEFAULT_OUT_DIR: &str = "static/products";

/// Runtime settings read from `PDP_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub out_dir: PathBuf,
    /// Worker threads for per-document work; 0 lets rayon decide.
    pub workers: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            workers: 0,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        Config::builder()
            .add_source(Environment::with_prefix("PDP"))
            .build()
            .and_then(|c| c.try_deserialize::<Settings>())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        let s = Settings::default();
        assert_eq!(s.out_dir, PathBuf::from("static/products"));
        assert_eq!(s.workers, 0);
    }
}
