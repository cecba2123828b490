use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub observer: Option<ObserverConfig>,
    pub sources: SourcesConfig,
    pub display: DisplayConfig,
}

/// A fixed observer location. When absent the observer is geolocated by IP.
#[derive(Debug, Deserialize)]
pub struct ObserverConfig {
    #[serde(default = "default_observer_name")]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64, // meters
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub telemetry_url: String,
    pub satellite_id: u32,
    pub geolocation_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub precision: usize,
    pub refresh_secs: u64,
}

fn default_observer_name() -> String {
    "Observer".to_string()
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            telemetry_url: "https://api.wheretheiss.at/v1/satellites".to_string(),
            satellite_id: 25544,
            geolocation_url: "https://ipinfo.io/json".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            precision: 2,
            refresh_secs: 5,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `explicit` if given, else the per-user config file if it exists,
    /// else the built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_path() {
            Some(path) if path.is_file() => {
                log::debug!("loading config from {}", path.display());
                Self::load(path)
            }
            _ => {
                log::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sources.timeout_secs == 0 {
            bail!("sources.timeout_secs must be greater than zero");
        }
        if self.display.refresh_secs == 0 {
            bail!("display.refresh_secs must be greater than zero");
        }
        if let Some(observer) = &self.observer {
            if !observer.longitude.is_finite() || !observer.altitude.is_finite() {
                bail!(
                    "observer.longitude {} and observer.altitude {} must be finite",
                    observer.longitude,
                    observer.altitude
                );
            }
            if !(-90.0..=90.0).contains(&observer.latitude) {
                bail!(
                    "observer.latitude {} is outside [-90, 90]",
                    observer.latitude
                );
            }
        }
        Ok(())
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("isslook").join("config.toml"))
}
