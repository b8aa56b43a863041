use super::*;

use serde_json::Value;

#[derive(serde::Serialize)]
struct LaunchFilePayload<'a> {
    version: &'a str,
    configurations: Vec<LaunchConfiguration>,
}

pub(super) fn launch_file_path(workspace: &Path) -> PathBuf {
    workspace.join(LAUNCH_DIR_NAME).join(LAUNCH_FILE_NAME)
}

fn is_xojo_configuration(entry: &Value) -> bool {
    entry
        .get("type")
        .and_then(Value::as_str)
        .map(|kind| kind == LAUNCH_CONFIG_TYPE)
        .unwrap_or(false)
}

/// First `xojo` entry of the workspace's launch.json, if there is one.
pub(super) fn load_launch_configuration_impl(
    workspace: &Path,
) -> Result<Option<PartialLaunchConfiguration>, LaunchError> {
    let path = launch_file_path(workspace);
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(&path)?;
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let document: Value = serde_json::from_str(&raw)?;
    let entry = document
        .get("configurations")
        .and_then(Value::as_array)
        .and_then(|entries| entries.iter().find(|entry| is_xojo_configuration(entry)));

    match entry {
        Some(entry) => Ok(Some(serde_json::from_value(entry.clone())?)),
        None => Ok(None),
    }
}

pub(super) fn create_default_launch_impl(workspace: Option<&Path>) -> Result<Notification, LaunchError> {
    let workspace = workspace
        .filter(|path| path.is_dir())
        .ok_or(LaunchError::MissingWorkspace)?;
    let path = launch_file_path(workspace);

    if path.exists() {
        return Ok(Notification::info(format!(
            "{}/{} already exists.",
            LAUNCH_DIR_NAME, LAUNCH_FILE_NAME
        )));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let payload = LaunchFilePayload {
        version: LAUNCH_FILE_VERSION,
        configurations: provide_debug_configurations_impl(),
    };
    let content = serde_json::to_string_pretty(&payload)?;
    fs::write(&path, format!("{}\n", content))?;
    tracing::info!("Wrote default launch configuration to {}", path.display());

    Ok(Notification::info(format!(
        "Created {}/{}.",
        LAUNCH_DIR_NAME, LAUNCH_FILE_NAME
    )))
}

pub(super) fn provide_debug_configurations_impl() -> Vec<LaunchConfiguration> {
    vec![LaunchConfiguration::default()]
}
