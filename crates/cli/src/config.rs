use anyhow::{anyhow, Context as AnyhowContext, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tanf_calculator::DEFAULT_MAX_CONCURRENCY;
use tanf_model::DEFAULT_YEAR;
use tanf_simulator::DEFAULT_BASE_URL;

pub(crate) const CONFIG_ENV: &str = "TANF_CONFIG";
pub(crate) const SIMULATOR_URL_ENV: &str = "TANF_SIMULATOR_URL";
pub(crate) const SIMULATOR_TIMEOUT_ENV: &str = "TANF_SIMULATOR_TIMEOUT_SECS";
pub(crate) const MAX_CONCURRENCY_ENV: &str = "TANF_MAX_CONCURRENCY";
pub(crate) const DEFAULT_YEAR_ENV: &str = "TANF_DEFAULT_YEAR";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Effective settings. Precedence: flag, environment, config file, default.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub simulator_url: String,
    pub simulator_timeout: Duration,
    pub default_year: i32,
    pub max_concurrency: usize,
    pub config_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            simulator_url: DEFAULT_BASE_URL.to_string(),
            simulator_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_year: DEFAULT_YEAR,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            config_path: None,
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub simulator_url: Option<String>,
    pub simulator_timeout_secs: Option<u64>,
    pub max_concurrency: Option<usize>,
    pub default_year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    simulator: RawSimulator,
    #[serde(default)]
    calculator: RawCalculator,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSimulator {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCalculator {
    default_year: Option<i32>,
    max_concurrency: Option<usize>,
}

impl Settings {
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    fn resolve_with(overrides: &Overrides, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config_path = overrides
            .config
            .clone()
            .or_else(|| env(CONFIG_ENV).map(PathBuf::from));
        let file = match &config_path {
            Some(path) => load_config(path)?,
            None => RawConfig::default(),
        };
        let defaults = Settings::default();

        let simulator_url = overrides
            .simulator_url
            .clone()
            .or_else(|| env(SIMULATOR_URL_ENV))
            .or(file.simulator.base_url)
            .unwrap_or(defaults.simulator_url);
        let timeout_secs = match overrides.simulator_timeout_secs {
            Some(secs) => secs,
            None => match env_parse::<u64>(&env, SIMULATOR_TIMEOUT_ENV)? {
                Some(secs) => secs,
                None => file.simulator.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
        };
        let max_concurrency = match overrides.max_concurrency {
            Some(limit) => limit,
            None => match env_parse::<usize>(&env, MAX_CONCURRENCY_ENV)? {
                Some(limit) => limit,
                None => file
                    .calculator
                    .max_concurrency
                    .unwrap_or(defaults.max_concurrency),
            },
        };
        let default_year = match overrides.default_year {
            Some(year) => year,
            None => match env_parse::<i32>(&env, DEFAULT_YEAR_ENV)? {
                Some(year) => year,
                None => file.calculator.default_year.unwrap_or(defaults.default_year),
            },
        };

        let settings = Settings {
            simulator_url,
            simulator_timeout: Duration::from_secs(timeout_secs),
            default_year,
            max_concurrency,
            config_path,
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        let url = self.simulator_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!(
                "Invalid config: simulator base_url must start with http:// or https://, got '{url}'"
            );
        }
        if self.simulator_timeout.is_zero() {
            anyhow::bail!("Invalid config: simulator timeout_secs must be greater than 0");
        }
        if self.max_concurrency == 0 {
            anyhow::bail!("Invalid config: calculator max_concurrency must be at least 1");
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    let Some(raw) = env(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|err| anyhow!("Invalid config: {key}={raw}: {err}"))
}

fn load_config(path: &Path) -> Result<RawConfig> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read config {}", path.display()))?;
    parse_raw(&bytes).with_context(|| format!("Invalid config {}", path.display()))
}

/// JSON first, then TOML.
fn parse_raw(bytes: &[u8]) -> Result<RawConfig> {
    let value: serde_json::Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(json_err) => {
            let utf8 = std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
            let toml_value: toml::Value = toml::from_str(utf8).map_err(|toml_err| {
                anyhow!("Config is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}")
            })?;
            serde_json::to_value(toml_value)
                .map_err(|err| anyhow!("Failed to convert TOML config to JSON: {err}"))?
        }
    };
    serde_json::from_value(value).map_err(|err| anyhow!("Config parse error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_any_source() {
        let settings = Settings::resolve_with(&Overrides::default(), env_of(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn flag_beats_env_beats_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tanf.toml");
        fs::write(
            &path,
            "[simulator]\nbase_url = \"http://file.test\"\ntimeout_secs = 5\n\n[calculator]\nmax_concurrency = 2\ndefault_year = 2024\n",
        )
        .unwrap();

        let overrides = Overrides {
            config: Some(path.clone()),
            simulator_url: Some("http://flag.test".to_string()),
            ..Default::default()
        };
        let env = env_of(&[
            (SIMULATOR_URL_ENV, "http://env.test"),
            (MAX_CONCURRENCY_ENV, "8"),
        ]);
        let settings = Settings::resolve_with(&overrides, env).unwrap();

        assert_eq!(settings.simulator_url, "http://flag.test");
        assert_eq!(settings.max_concurrency, 8);
        assert_eq!(settings.simulator_timeout, Duration::from_secs(5));
        assert_eq!(settings.default_year, 2024);
        assert_eq!(settings.config_path, Some(path));
    }

    #[test]
    fn json_config_is_accepted() {
        let raw = parse_raw(br#"{"calculator": {"max_concurrency": 3}}"#).unwrap();
        assert_eq!(raw.calculator.max_concurrency, Some(3));
        assert_eq!(raw.simulator.base_url, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_raw(b"[simulator]\nbase_uri = \"http://x\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("base_uri"));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let err = Settings::resolve_with(
            &Overrides {
                max_concurrency: Some(0),
                ..Default::default()
            },
            env_of(&[]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("max_concurrency"));
    }

    #[test]
    fn malformed_env_value_is_reported() {
        let err = Settings::resolve_with(
            &Overrides::default(),
            env_of(&[(SIMULATOR_TIMEOUT_ENV, "soon")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains(SIMULATOR_TIMEOUT_ENV));
    }
}
