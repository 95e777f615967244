use std::path::Path;
use std::time::Duration;

use anyhow::{Context as _, bail};
use serde_derive::Deserialize;

use crate::classifier::Thresholds;
use crate::triggers::WatchList;

pub const DEFAULT_INTERVAL_MS: u64 = 1500;
pub const DEFAULT_JITTER_DB: u8 = 3;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub watch_list: Option<Vec<String>>,
    pub thresholds: Option<ThresholdConfig>,
    pub stream: Option<StreamConfig>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    pub immediate: Option<i32>,
    pub near: Option<i32>,
    pub far: Option<i32>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    pub interval_ms: Option<u64>,
    pub jitter_db: Option<u8>,
    pub seed: Option<u64>,
}

/// Everything the monitor needs, resolved once at startup and read-only after.
#[derive(Debug, Clone)]
pub struct Settings {
    pub thresholds: Thresholds,
    pub watch_list: WatchList,
    pub interval: Option<Duration>,
    pub jitter_db: u8,
    pub seed: Option<u64>,
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::de::from_str(contents)?)
    }

    pub fn resolve(self) -> anyhow::Result<Settings> {
        let t = self.thresholds.unwrap_or_default();
        let thresholds = Thresholds {
            immediate: t.immediate.unwrap_or(Thresholds::DEFAULT_IMMEDIATE),
            near: t.near.unwrap_or(Thresholds::DEFAULT_NEAR),
            far: t.far.unwrap_or(Thresholds::DEFAULT_FAR),
        };
        if !(thresholds.immediate > thresholds.near && thresholds.near > thresholds.far) {
            bail!(
                "thresholds must be strictly descending (immediate > near > far), got {} / {} / {}",
                thresholds.immediate,
                thresholds.near,
                thresholds.far
            );
        }

        let stream = self.stream.unwrap_or_default();

        Ok(Settings {
            thresholds,
            watch_list: self.watch_list.unwrap_or_default().into_iter().collect(),
            interval: stream.interval_ms.map(Duration::from_millis),
            jitter_db: stream.jitter_db.unwrap_or(DEFAULT_JITTER_DB),
            seed: stream.seed,
        })
    }
}
