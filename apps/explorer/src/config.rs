use std::{fs, path::Path};

use anyhow::Context;
use client_core::{ControllerOptions, FeatureFlags};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "explorer.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub record_link_base: String,
    pub default_max_results: u32,
    pub include_launch_action: bool,
    pub include_script_action: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            record_link_base: client_core::results::DEFAULT_RECORD_LINK_BASE.into(),
            default_max_results: shared::protocol::DEFAULT_MAX_RESULTS,
            include_launch_action: true,
            include_script_action: true,
        }
    }
}

impl Settings {
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            features: FeatureFlags {
                include_launch_action: self.include_launch_action,
                include_script_action: self.include_script_action,
            },
            record_link_base: self.record_link_base.clone(),
            default_max_results: self.default_max_results,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    record_link_base: Option<String>,
    default_max_results: Option<u32>,
    include_launch_action: Option<bool>,
    include_script_action: Option<bool>,
}

/// Defaults, then the config file (when present), then `APP__*` variables.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    load_from(config_path, |key| std::env::var(key).ok())
}

fn load_from(
    config_path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
            apply_file(&mut settings, file_cfg);
        }
        Err(err) if config_path.is_some() => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, lookup);
    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.record_link_base {
        settings.record_link_base = v;
    }
    if let Some(v) = file_cfg.default_max_results {
        settings.default_max_results = v;
    }
    if let Some(v) = file_cfg.include_launch_action {
        settings.include_launch_action = v;
    }
    if let Some(v) = file_cfg.include_script_action {
        settings.include_script_action = v;
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__RECORD_LINK_BASE") {
        settings.record_link_base = v;
    }
    if let Some(v) = lookup("APP__DEFAULT_MAX_RESULTS") {
        match v.parse::<u32>() {
            Ok(parsed) => settings.default_max_results = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__DEFAULT_MAX_RESULTS"),
        }
    }
    if let Some(v) = lookup("APP__INCLUDE_LAUNCH_ACTION") {
        if let Some(flag) = parse_flag(&v) {
            settings.include_launch_action = flag;
        }
    }
    if let Some(v) = lookup("APP__INCLUDE_SCRIPT_ACTION") {
        if let Some(flag) = parse_flag(&v) {
            settings.include_script_action = flag;
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
