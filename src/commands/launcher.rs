use super::*;

use std::process::{Command, Stdio};
use std::time::Duration;

/// Seam around process spawning and waiting so the reload flow can run
/// without touching the OS.
pub trait ProcessRunner {
    /// Runs `program` to completion. A non-zero exit is an error.
    fn run(&self, program: &str, args: &[String]) -> Result<(), LaunchError>;

    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<(), LaunchError> {
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| LaunchError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(LaunchError::NonZeroExit {
                program: program.to_string(),
                code: status.code().unwrap_or(-1),
            })
        }
    }
}

pub(super) fn is_platform_supported() -> bool {
    cfg!(target_os = "macos")
}

/// First `*.xojo_project` in `folder`, by file name.
pub(super) fn find_xojo_project(folder: &Path) -> Option<PathBuf> {
    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!("Cannot list {}: {}", folder.display(), err);
            return None;
        }
    };

    let mut projects: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|extension| extension == XOJO_PROJECT_EXTENSION)
                    .unwrap_or(false)
        })
        .collect();
    projects.sort();
    projects.into_iter().next()
}

fn tell_xojo_to_activate() -> String {
    format!("tell application \"{}\" to activate", XOJO_APP_NAME)
}

pub(super) fn open_app_args(project: Option<&Path>) -> Vec<String> {
    let mut args = vec!["-a".to_string(), XOJO_APP_NAME.to_string()];
    if let Some(project) = project {
        args.push(project.to_string_lossy().to_string());
    }
    args
}

/// One osascript call: activate, Cmd+Shift+R, wait, Return, wait, Cmd+R.
pub(super) fn reload_script_args(options: &ReloadRunOptions) -> Vec<String> {
    let statements = [
        tell_xojo_to_activate(),
        "tell application \"System Events\" to keystroke \"r\" using {command down, shift down}"
            .to_string(),
        format!(
            "delay {}",
            text_utils::millis_to_seconds_literal(options.reload_dialog_delay_ms)
        ),
        "tell application \"System Events\" to key code 36".to_string(),
        format!(
            "delay {}",
            text_utils::millis_to_seconds_literal(options.reload_to_run_delay_ms)
        ),
        "tell application \"System Events\" to keystroke \"r\" using {command down}".to_string(),
    ];

    statements
        .into_iter()
        .flat_map(|statement| ["-e".to_string(), statement])
        .collect()
}

pub(super) fn reload_and_run_impl(
    runner: &dyn ProcessRunner,
    platform_supported: bool,
    options: &ReloadRunOptions,
) -> Vec<Notification> {
    let mut notifications = Vec::new();

    if !platform_supported {
        tracing::warn!("Reload and run requested on an unsupported platform");
        notifications.push(Notification::warning(
            "Xojo: reload and run is only available on macOS.",
        ));
        return notifications;
    }

    if options.open_project {
        let project = options.folder.as_deref().and_then(find_xojo_project);
        match &project {
            Some(project) => tracing::info!("Opening Xojo project {}", project.display()),
            None => notifications.push(Notification::warning(
                "No *.xojo_project found. Launching Xojo without a project.",
            )),
        }

        if let Err(err) = runner.run(OPEN_PROGRAM, &open_app_args(project.as_deref())) {
            tracing::error!("Failed to launch Xojo: {}", err);
            notifications.push(Notification::error(format!("Failed to launch Xojo: {}", err)));
        }

        if options.open_delay_ms > 0 {
            runner.pause(Duration::from_millis(options.open_delay_ms));
        }
    } else if let Err(err) = runner.run(OSASCRIPT_PROGRAM, &["-e".to_string(), tell_xojo_to_activate()]) {
        tracing::debug!("Ignoring activation failure: {}", err);
    }

    runner.pause(Duration::from_millis(KEYSTROKE_SETTLE_DELAY_MS));

    match runner.run(OSASCRIPT_PROGRAM, &reload_script_args(options)) {
        Ok(()) => tracing::info!("Sent reload and run keystrokes to Xojo"),
        Err(err) => {
            tracing::error!("Failed to run Xojo: {}", err);
            notifications.push(Notification::error(format!("Failed to run Xojo: {}", err)));
        }
    }

    notifications
}
