use crate::state::{AppState, Document};
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use memmap2::Mmap;
use ropey::Rope;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use uuid::Uuid;

mod config;
mod constants;
mod file_io;
mod launcher;
mod outline;
mod settings;
mod text_utils;
mod types;

use constants::*;

pub use launcher::{ProcessRunner, SystemProcessRunner};
pub use outline::{
    classify_dialect, extract_symbols, parse_declared_kind, DeclaredKind, Dialect, OutlineSymbol,
    SymbolKind, TextPosition, TextRange,
};
pub use settings::{clamp_delay_ms, LaunchConfiguration, PartialLaunchConfiguration, ReloadRunOptions};
pub use types::{FileInfo, LaunchError, Notification, NotificationLevel};

pub fn open_file(state: &AppState, path: String) -> Result<FileInfo, String> {
    file_io::open_file_impl(state, path)
}

pub fn open_text(state: &AppState, text: String, declared_kind: DeclaredKind) -> FileInfo {
    file_io::open_text_impl(state, text, declared_kind)
}

pub fn get_file_info(state: &AppState, id: String) -> Result<FileInfo, String> {
    file_io::get_file_info_impl(state, id)
}

pub fn close_file(state: &AppState, id: String) {
    file_io::close_file_impl(state, id)
}

pub fn get_outline(
    state: &AppState,
    id: String,
    declared_kind: Option<DeclaredKind>,
) -> Result<Vec<OutlineSymbol>, String> {
    outline::get_outline_impl(state, id, declared_kind)
}

pub fn filter_outline_symbols(symbols: Vec<OutlineSymbol>, keyword: String) -> Vec<OutlineSymbol> {
    outline::filter_outline_symbols_impl(symbols, keyword)
}

pub fn reload_and_run(options: ReloadRunOptions) -> Vec<Notification> {
    launcher::reload_and_run_impl(&SystemProcessRunner, launcher::is_platform_supported(), &options)
}

pub fn reload_and_run_with(runner: &dyn ProcessRunner, options: ReloadRunOptions) -> Vec<Notification> {
    launcher::reload_and_run_impl(runner, launcher::is_platform_supported(), &options)
}

pub fn provide_debug_configurations() -> Vec<LaunchConfiguration> {
    config::provide_debug_configurations_impl()
}

pub fn resolve_debug_configuration(partial: Option<PartialLaunchConfiguration>) -> LaunchConfiguration {
    settings::resolve_debug_configuration_impl(partial)
}

pub fn load_launch_configuration(workspace: &Path) -> Result<Option<PartialLaunchConfiguration>, String> {
    config::load_launch_configuration_impl(workspace).map_err(|e| e.to_string())
}

/// Runs reload-and-run the way a debug launch would: the workspace's xojo
/// launch entry, or defaults when there is none.
pub fn debug_workspace(workspace: Option<PathBuf>) -> Vec<Notification> {
    let mut notifications = Vec::new();

    let partial = match workspace.as_deref() {
        Some(folder) => match config::load_launch_configuration_impl(folder) {
            Ok(partial) => partial,
            Err(err) => {
                tracing::warn!("Ignoring launch configuration: {}", err);
                notifications.push(Notification::warning(format!(
                    "Ignoring {}/{}: {}",
                    LAUNCH_DIR_NAME, LAUNCH_FILE_NAME, err
                )));
                None
            }
        },
        None => None,
    };

    let resolved = settings::resolve_debug_configuration_impl(partial);
    let options = ReloadRunOptions::from_launch_configuration(&resolved, workspace);
    notifications.extend(reload_and_run(options));
    notifications
}

pub fn create_default_launch(workspace: Option<PathBuf>) -> Notification {
    match config::create_default_launch_impl(workspace.as_deref()) {
        Ok(notification) => notification,
        Err(LaunchError::MissingWorkspace) => Notification::warning("No workspace folder is open."),
        Err(err) => Notification::error(format!(
            "Failed to create {}/{}: {}",
            LAUNCH_DIR_NAME, LAUNCH_FILE_NAME, err
        )),
    }
}
