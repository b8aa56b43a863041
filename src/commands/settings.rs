use super::*;

use serde_json::Value;

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchConfiguration {
    #[serde(rename = "type")]
    pub kind: String,
    pub request: String,
    pub name: String,
    pub open_project: bool,
    pub open_delay_ms: u64,
    pub reload_dialog_delay_ms: u64,
    pub reload_to_run_delay_ms: u64,
}

/// A launch.json entry as written by hand. Values are kept loose so that
/// strings or negative numbers fall back to defaults instead of failing.
#[derive(serde::Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartialLaunchConfiguration {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub request: Option<String>,
    pub name: Option<String>,
    pub open_project: Option<Value>,
    pub open_delay_ms: Option<Value>,
    pub reload_dialog_delay_ms: Option<Value>,
    pub reload_to_run_delay_ms: Option<Value>,
}

impl Default for LaunchConfiguration {
    fn default() -> Self {
        Self {
            kind: LAUNCH_CONFIG_TYPE.to_string(),
            request: LAUNCH_CONFIG_REQUEST.to_string(),
            name: LAUNCH_CONFIG_NAME.to_string(),
            open_project: true,
            open_delay_ms: DEFAULT_OPEN_DELAY_MS,
            reload_dialog_delay_ms: DEFAULT_RELOAD_DIALOG_DELAY_MS,
            reload_to_run_delay_ms: DEFAULT_RELOAD_TO_RUN_DELAY_MS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReloadRunOptions {
    pub folder: Option<PathBuf>,
    pub open_project: bool,
    pub open_delay_ms: u64,
    pub reload_dialog_delay_ms: u64,
    pub reload_to_run_delay_ms: u64,
}

impl Default for ReloadRunOptions {
    fn default() -> Self {
        Self {
            folder: None,
            open_project: true,
            open_delay_ms: DEFAULT_OPEN_DELAY_MS,
            reload_dialog_delay_ms: DEFAULT_RELOAD_DIALOG_DELAY_MS,
            reload_to_run_delay_ms: DEFAULT_RELOAD_TO_RUN_DELAY_MS,
        }
    }
}

impl ReloadRunOptions {
    pub fn from_launch_configuration(config: &LaunchConfiguration, folder: Option<PathBuf>) -> Self {
        Self {
            folder,
            open_project: config.open_project,
            open_delay_ms: config.open_delay_ms,
            reload_dialog_delay_ms: config.reload_dialog_delay_ms,
            reload_to_run_delay_ms: config.reload_to_run_delay_ms,
        }
    }
}

pub(super) fn normalize_delay_ms(value: Option<&Value>, default_ms: u64) -> u64 {
    match value.and_then(Value::as_f64) {
        Some(ms) if ms.is_finite() => ms.max(0.0).round() as u64,
        _ => default_ms,
    }
}

pub fn clamp_delay_ms(value: Option<i64>, default_ms: u64) -> u64 {
    value
        .map(|ms| ms.max(0).unsigned_abs())
        .unwrap_or(default_ms)
}

pub(super) fn normalize_open_project(value: Option<&Value>) -> bool {
    !matches!(value, Some(Value::Bool(false)))
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or("").is_empty()
}

pub(super) fn resolve_debug_configuration_impl(
    partial: Option<PartialLaunchConfiguration>,
) -> LaunchConfiguration {
    let Some(partial) = partial else {
        return LaunchConfiguration::default();
    };

    if is_blank(&partial.kind) || is_blank(&partial.request) {
        return LaunchConfiguration::default();
    }

    let mut config = LaunchConfiguration {
        open_project: normalize_open_project(partial.open_project.as_ref()),
        open_delay_ms: normalize_delay_ms(partial.open_delay_ms.as_ref(), DEFAULT_OPEN_DELAY_MS),
        reload_dialog_delay_ms: normalize_delay_ms(
            partial.reload_dialog_delay_ms.as_ref(),
            DEFAULT_RELOAD_DIALOG_DELAY_MS,
        ),
        reload_to_run_delay_ms: normalize_delay_ms(
            partial.reload_to_run_delay_ms.as_ref(),
            DEFAULT_RELOAD_TO_RUN_DELAY_MS,
        ),
        ..LaunchConfiguration::default()
    };

    if let Some(kind) = partial.kind {
        config.kind = kind.trim().to_string();
    }

    if let Some(request) = partial.request {
        config.request = request.trim().to_string();
    }

    if let Some(name) = partial.name {
        if !name.trim().is_empty() {
            config.name = name;
        }
    }

    config
}
