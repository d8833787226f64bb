// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use museo_app::{DEFAULT_PER_PAGE, SearchFields};
use museo_client::DEFAULT_COLLECTION_PATH;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "museo";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_TIMEOUT: &str = "5s";
const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub browse: Browse,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: Server::default(),
            browse: Browse::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub base_url: Option<String>,
    pub collection_path: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            collection_path: Some(DEFAULT_COLLECTION_PATH.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Browse {
    pub per_page: Option<i64>,
    pub search_fields: Option<Vec<String>>,
}

impl Default for Browse {
    fn default() -> Self {
        Self {
            per_page: Some(i64::from(DEFAULT_PER_PAGE)),
            search_fields: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("MUSEO_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set MUSEO_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
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
                    "config file {} is not versioned. Add `version = 1` and put values under [server] and [browse]",
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
        if let Some(base_url) = &self.server.base_url
            && base_url.trim().is_empty()
        {
            bail!("server.base_url in {} must not be empty", path.display());
        }

        if let Some(timeout) = &self.server.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "server.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(per_page) = self.browse.per_page
            && !(1..=MAX_PER_PAGE).contains(&per_page)
        {
            bail!(
                "browse.per_page in {} must be between 1 and {}, got {}",
                path.display(),
                MAX_PER_PAGE,
                per_page
            );
        }

        if let Some(fields) = &self.browse.search_fields {
            if fields.is_empty() {
                bail!(
                    "browse.search_fields in {} must list at least one field",
                    path.display()
                );
            }
            if fields.iter().any(|field| field.trim().is_empty()) {
                bail!(
                    "browse.search_fields in {} must not contain blank entries",
                    path.display()
                );
            }
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.server
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn collection_path(&self) -> &str {
        self.server
            .collection_path
            .as_deref()
            .unwrap_or(DEFAULT_COLLECTION_PATH)
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.server.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn per_page(&self) -> u32 {
        self.browse
            .per_page
            .and_then(|per_page| u32::try_from(per_page).ok())
            .unwrap_or(DEFAULT_PER_PAGE)
    }

    pub fn search_fields(&self) -> SearchFields {
        match &self.browse.search_fields {
            Some(fields) => SearchFields::new(fields.iter().map(|field| field.trim().to_owned())),
            None => SearchFields::default(),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# museo config\n# Place this file at: {}\n\nversion = 1\n\n[server]\nbase_url = \"{}\"\ncollection_path = \"{}\"\ntimeout = \"{}\"\n\n[browse]\nper_page = {}\n# Fields matched by --search, in order.\n# search_fields = [\"name\", \"city\", \"state\", \"type\"]\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_COLLECTION_PATH,
            DEFAULT_TIMEOUT,
            DEFAULT_PER_PAGE,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .with_context(|| format!("timeout duration {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
