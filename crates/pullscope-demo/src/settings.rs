// File: crates/pullscope-demo/src/settings.rs
// Summary: Demo configuration: optional TOML file plus PULLSCOPE__* environment overrides.

use std::path::PathBuf;

use anyhow::{Context, Result};
use pullscope_core::ChartOptions;
use pullscope_query::LoadSettings;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Surface width; height follows the chart aspect ratio.
    pub width: u32,
    pub out_dir: PathBuf,
    pub chart: ChartOptions,
    pub load: LoadSettings,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            width: pullscope_core::types::WIDTH,
            out_dir: PathBuf::from("target/pullscope"),
            chart: ChartOptions::default(),
            load: LoadSettings::default(),
        }
    }
}

/// Load `<name>.toml` if present, then apply `PULLSCOPE__SECTION__KEY` overrides.
pub fn load(name: &str) -> Result<DemoConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(name).required(false))
        .add_source(config::Environment::with_prefix("PULLSCOPE").separator("__"))
        .build()
        .with_context(|| format!("failed to read config `{name}`"))?;
    settings.try_deserialize().context("invalid pullscope configuration")
}
