pub(super) const ENCODING_DETECT_SAMPLE_BYTES: usize = 1024 * 1024;
pub(super) const UNTITLED_DOCUMENT_NAME: &str = "Untitled";

pub(super) const DEFAULT_OPEN_DELAY_MS: u64 = 800;
pub(super) const DEFAULT_RELOAD_DIALOG_DELAY_MS: u64 = 300;
pub(super) const DEFAULT_RELOAD_TO_RUN_DELAY_MS: u64 = 500;
pub(super) const KEYSTROKE_SETTLE_DELAY_MS: u64 = 50;

pub(super) const XOJO_APP_NAME: &str = "Xojo";
pub(super) const XOJO_PROJECT_EXTENSION: &str = "xojo_project";
pub(super) const OPEN_PROGRAM: &str = "/usr/bin/open";
pub(super) const OSASCRIPT_PROGRAM: &str = "/usr/bin/osascript";

pub(super) const LAUNCH_CONFIG_TYPE: &str = "xojo";
pub(super) const LAUNCH_CONFIG_REQUEST: &str = "launch";
pub(super) const LAUNCH_CONFIG_NAME: &str = "Xojo: Reload and Run";
pub(super) const LAUNCH_FILE_VERSION: &str = "0.2.0";
pub(super) const LAUNCH_DIR_NAME: &str = ".vscode";
pub(super) const LAUNCH_FILE_NAME: &str = "launch.json";
