// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: i64 = 1;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub registry: Registry,
    #[serde(default)]
    pub ui: Ui,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            registry: Registry::default(),
            ui: Ui::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registry {
    pub manifest_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub open_reference_on_start: Option<bool>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            open_reference_on_start: Some(true),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("CMDREF_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set CMDREF_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(cmdref_registry::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and move values under [registry] and [ui]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(manifest_dir) = &self.registry.manifest_dir
            && manifest_dir.trim().is_empty()
        {
            bail!(
                "registry.manifest_dir in {} must not be blank; remove the key to use the default",
                path.display()
            );
        }
        Ok(())
    }

    pub fn manifest_dir(&self) -> Result<PathBuf> {
        match &self.registry.manifest_dir {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => cmdref_registry::default_manifest_dir(),
        }
    }

    pub fn open_reference_on_start(&self) -> bool {
        self.ui.open_reference_on_start.unwrap_or(true)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# cmdref configuration ({})\n\
             version = 1\n\
             \n\
             [registry]\n\
             # Directory of plugin command manifests (*.json). Defaults to\n\
             # the cmdref manifests folder under the platform data dir.\n\
             # manifest_dir = \"/path/to/manifests\"\n\
             \n\
             [ui]\n\
             # Open the commands reference panel immediately on launch.\n\
             # open_reference_on_start = true\n",
            path.display()
        )
    }
}
