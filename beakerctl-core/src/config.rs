//! Deployment-file configuration for the session tools.
//!
//! Paste-style `.ini` deployment files carry the session store settings under
//! a dotted prefix (`beaker.session.url`, `beaker.session.timeout`, ...)
//! inside the application section. Options prefixed `set ` join the global
//! namespace shared with `[DEFAULT]`; options prefixed `get ` copy a global
//! value under a local name. Lookups check the global namespace before the
//! local one, and a command-line timeout override beats both.

use std::collections::HashMap;

use config::{Config, File, FileFormat};

use crate::error::BeakerctlError;

pub const DEFAULT_PREFIX: &str = "beaker.session";
pub const DEFAULT_TABLE_NAME: &str = "beaker_cache";

/// Settings resolved from one deployment file for one command invocation.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub url: String,
    pub table_name: String,
    /// Recency window in seconds. `None` means no age filter and is only
    /// reachable through the report command's `--timeout 0` escape.
    pub timeout: Option<i64>,
    pub prefix: String,
}

type Section = HashMap<String, String>;
type Sections = HashMap<String, Section>;

/// Ordered lookup over the deployment file layers: the global namespace
/// (`[DEFAULT]` plus `set ` additions) shadows the app-local options.
#[derive(Debug, Default)]
struct LayeredConf {
    layers: Vec<Section>,
}

impl LayeredConf {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.layers
            .iter()
            .find_map(|layer| layer.get(key).map(String::as_str))
    }
}

/// Parse a unit-suffixed timeout such as `20s`, `1m`, `4h` or `1d` into
/// seconds. This is the one error kind the command layer recovers from.
pub fn parse_timeout(raw: &str) -> Result<i64, BeakerctlError> {
    let bad = || BeakerctlError::InvalidTimeout(raw.to_string());
    let mut chars = raw.chars();
    let unit = chars.next_back().ok_or_else(|| bad())?;
    let count: i64 = chars.as_str().parse().map_err(|_| bad())?;
    match unit {
        's' => Ok(count),
        'm' => Ok(count * 60),
        'h' => Ok(count * 3600),
        'd' => Ok(count * 86400),
        _ => Err(bad()),
    }
}

/// Resolve the session store settings from `path`.
///
/// `timeout_override` is the raw `--timeout` flag value, if given. With
/// `accept_zero_timeout`, a literal `"0"` override resolves the timeout to
/// `None` (report all rows); the cleanup path never allows that.
pub fn resolve_config(
    path: &str,
    prefix: &str,
    timeout_override: Option<&str>,
    accept_zero_timeout: bool,
) -> Result<ResolvedConfig, BeakerctlError> {
    let sections = load_sections(path)?;
    let defaults = defaults_section(&sections);
    let app = find_app_section(&sections, path)?;
    let conf = split_conf(app, &defaults)?;

    let url_key = format!("{prefix}.url");
    let url = conf
        .lookup(&url_key)
        .ok_or(BeakerctlError::MissingOption(url_key))?
        .to_string();

    let timeout = match timeout_override {
        Some(raw) if accept_zero_timeout && raw == "0" => None,
        Some(raw) => Some(parse_timeout(raw)?),
        None => {
            let timeout_key = format!("{prefix}.timeout");
            let raw = conf
                .lookup(&timeout_key)
                .ok_or_else(|| BeakerctlError::MissingOption(timeout_key.clone()))?;
            let seconds = raw.trim().parse::<i64>().map_err(|_| {
                BeakerctlError::InvalidOption {
                    key: timeout_key,
                    value: raw.to_string(),
                }
            })?;
            Some(seconds)
        }
    };

    let table_name = match conf.lookup(&format!("{prefix}.table_name")) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => DEFAULT_TABLE_NAME.to_string(),
    };

    Ok(ResolvedConfig {
        url,
        table_name,
        timeout,
        prefix: prefix.to_string(),
    })
}

fn load_sections(path: &str) -> Result<Sections, BeakerctlError> {
    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Ini))
        .build()?;
    Ok(settings.try_deserialize()?)
}

/// `[DEFAULT]` entries seed the global namespace. Absent section, empty map.
fn defaults_section(sections: &Sections) -> Section {
    sections
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("default"))
        .map(|(_, options)| options.clone())
        .unwrap_or_default()
}

/// The target application section: `[app:main]`, or the only `[app:*]` one.
fn find_app_section<'a>(sections: &'a Sections, path: &str) -> Result<&'a Section, BeakerctlError> {
    sections
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("app:main"))
        .or_else(|| {
            sections
                .iter()
                .find(|(name, _)| name.to_ascii_lowercase().starts_with("app:"))
        })
        .map(|(_, options)| options)
        .ok_or_else(|| BeakerctlError::MissingAppSection(path.to_string()))
}

/// Split the app section into the global and local layers.
///
/// `set name = value` lands in the global namespace, `get name = global_var`
/// copies a global value under a local name, options repeating a `[DEFAULT]`
/// key stay global, and everything else is local.
fn split_conf(app: &Section, defaults: &Section) -> Result<LayeredConf, BeakerctlError> {
    let mut global = defaults.clone();
    let mut local = Section::new();
    let mut get_from_global = Section::new();

    for (option, value) in app {
        if let Some(name) = option.strip_prefix("set ") {
            global.insert(name.trim().to_string(), value.clone());
        } else if let Some(name) = option.strip_prefix("get ") {
            get_from_global.insert(name.trim().to_string(), value.clone());
        } else if defaults.contains_key(option) {
            continue;
        } else {
            local.insert(option.clone(), value.clone());
        }
    }

    for (local_var, global_var) in get_from_global {
        let value = global
            .get(&global_var)
            .ok_or(BeakerctlError::MissingOption(global_var))?;
        local.insert(local_var, value.clone());
    }

    Ok(LayeredConf {
        layers: vec![global, local],
    })
}

// ============================================================================
// Tests
// ============================================================================
