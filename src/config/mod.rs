use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_FONT_SIZE, DEFAULT_RENDER_SCALE, INITIAL_SELECTED_COLOR, INITIAL_STROKE_WIDTH,
    MAX_RECENT_DOCUMENTS,
};

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

/// Application configuration persisted to disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfigData {
    /// Color selected when the editor starts
    #[serde(default = "default_color")]
    pub default_color: String,

    #[serde(default = "default_stroke_width")]
    pub default_stroke_width: f32,

    /// Font size for new text annotations
    #[serde(default = "default_font_size")]
    pub default_font_size: f32,

    /// Scale at which PDF pages are rasterized
    #[serde(default = "default_render_scale")]
    pub render_scale: f32,

    /// Recently opened documents, most recent first
    #[serde(default)]
    pub recent_documents: Vec<PathBuf>,

    /// Directory of the last export, used as the save dialog start
    #[serde(default)]
    pub last_export_dir: Option<PathBuf>,

    /// Ignore tool shortcuts while a text field has focus
    #[serde(default = "default_true")]
    pub suppress_shortcuts_in_text_fields: bool,
}

fn default_color() -> String {
    INITIAL_SELECTED_COLOR.to_string()
}

fn default_stroke_width() -> f32 {
    INITIAL_STROKE_WIDTH
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

fn default_render_scale() -> f32 {
    DEFAULT_RENDER_SCALE
}

fn default_true() -> bool {
    true
}

impl Default for AppConfigData {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            default_stroke_width: default_stroke_width(),
            default_font_size: default_font_size(),
            render_scale: default_render_scale(),
            recent_documents: Vec::new(),
            last_export_dir: None,
            suppress_shortcuts_in_text_fields: true,
        }
    }
}

impl AppConfigData {
    /// Move `path` to the front of the recent list
    pub fn push_recent_document(&mut self, path: PathBuf) {
        self.recent_documents.retain(|p| p != &path);
        self.recent_documents.insert(0, path);
        self.recent_documents.truncate(MAX_RECENT_DOCUMENTS);
    }

    /// Clamp values a hand-edited file may have broken
    fn sanitized(mut self) -> Self {
        if !self.render_scale.is_finite() || self.render_scale <= 0.0 {
            self.render_scale = default_render_scale();
        }
        if !self.default_stroke_width.is_finite() || self.default_stroke_width <= 0.0 {
            self.default_stroke_width = default_stroke_width();
        }
        if !self.default_font_size.is_finite() || self.default_font_size < 1.0 {
            self.default_font_size = default_font_size();
        }
        self.recent_documents.truncate(MAX_RECENT_DOCUMENTS);
        self
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AppConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AppConfigData::default(),
            config_path: get_config_path(),
            dirty: false,
        }
    }
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether to show the notification dialog
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message to add a document to the recent list
#[derive(Message)]
pub struct AddRecentDocumentRequest {
    pub path: PathBuf,
}

/// Message to remember where the last export went
#[derive(Message)]
pub struct UpdateExportDirRequest {
    pub dir: PathBuf,
}

fn get_config_path() -> PathBuf {
    crate::paths::config_file()
}

/// Result of loading config from disk
struct LoadConfigResult {
    data: AppConfigData,
    /// Error message if config was reset to defaults due to an error
    reset_reason: Option<String>,
}

fn parse_config(json: &str) -> Result<AppConfigData, serde_json::Error> {
    serde_json::from_str::<AppConfigData>(json).map(AppConfigData::sanitized)
}

/// Load configuration from disk
fn load_config(config_path: &std::path::Path) -> LoadConfigResult {
    if !config_path.exists() {
        info!("No config file found, using defaults");
        return LoadConfigResult {
            data: AppConfigData::default(),
            reset_reason: None,
        };
    }

    let (data, reset_reason) = match std::fs::read_to_string(config_path) {
        Ok(json) => match parse_config(&json) {
            Ok(data) => {
                info!("Loaded config from {:?}", config_path);
                (data, None)
            }
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                (
                    AppConfigData::default(),
                    Some(format!("Configuration file was corrupted: {}", e)),
                )
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            (
                AppConfigData::default(),
                Some(format!("Could not read configuration file: {}", e)),
            )
        }
    };

    LoadConfigResult { data, reset_reason }
}

/// Save configuration to disk
fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<AppConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let result = load_config(&config.config_path);
    config.data = result.data;
    config.dirty = false;

    if let Some(reason) = result.reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// Startup system to drop recent documents that no longer exist
fn prune_recent_documents(mut config: ResMut<AppConfig>) {
    let before = config.data.recent_documents.len();
    config.data.recent_documents.retain(|p| p.exists());
    let removed = before - config.data.recent_documents.len();
    if removed > 0 {
        info!("Dropped {} missing recent documents", removed);
        config.dirty = true;
    }
}

fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<AppConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

fn add_recent_document_system(
    mut events: MessageReader<AddRecentDocumentRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        config.data.push_recent_document(event.path.clone());
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

fn update_export_dir_system(
    mut events: MessageReader<UpdateExportDirRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        if config.data.last_export_dir.as_ref() == Some(&event.dir) {
            continue;
        }
        config.data.last_export_dir = Some(event.dir.clone());
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_message::<AddRecentDocumentRequest>()
            .add_message::<UpdateExportDirRequest>()
            .add_systems(
                Startup,
                (load_config_system, prune_recent_documents)
                    .chain()
                    .in_set(ConfigLoaded),
            )
            .add_systems(
                Update,
                (
                    add_recent_document_system.run_if(on_message::<AddRecentDocumentRequest>),
                    update_export_dir_system.run_if(on_message::<UpdateExportDirRequest>),
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                )
                    .chain(),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_data_default() {
        let data = AppConfigData::default();
        assert_eq!(data.default_color, "#FF0000");
        assert_eq!(data.default_stroke_width, 2.0);
        assert_eq!(data.render_scale, 1.5);
        assert!(data.recent_documents.is_empty());
        assert!(data.suppress_shortcuts_in_text_fields);
    }

    #[test]
    fn test_app_config_data_serialization() {
        let mut data = AppConfigData::default();
        data.recent_documents = vec![PathBuf::from("/docs/one.pdf")];
        data.last_export_dir = Some(PathBuf::from("/exports"));

        let json = serde_json::to_string(&data).unwrap();
        let parsed: AppConfigData = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, data);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parsed = parse_config(r#"{ "default_color": "blue" }"#).unwrap();
        assert_eq!(parsed.default_color, "blue");
        assert_eq!(parsed.render_scale, 1.5);
        assert!(parsed.suppress_shortcuts_in_text_fields);
    }

    #[test]
    fn test_invalid_values_are_sanitized() {
        let parsed = parse_config(r#"{ "render_scale": -2.0, "default_stroke_width": 0.0 }"#).unwrap();
        assert_eq!(parsed.render_scale, 1.5);
        assert_eq!(parsed.default_stroke_width, 2.0);
    }

    #[test]
    fn test_corrupted_config_is_an_error() {
        assert!(parse_config("{ not json").is_err());
    }

    #[test]
    fn test_recent_documents_most_recent_first_and_capped() {
        let mut data = AppConfigData::default();
        for i in 0..7 {
            data.push_recent_document(PathBuf::from(format!("/docs/{}.pdf", i)));
        }
        data.push_recent_document(PathBuf::from("/docs/4.pdf"));

        assert_eq!(data.recent_documents.len(), MAX_RECENT_DOCUMENTS);
        assert_eq!(data.recent_documents[0], PathBuf::from("/docs/4.pdf"));
        assert_eq!(data.recent_documents[1], PathBuf::from("/docs/6.pdf"));
        assert_eq!(
            data.recent_documents
                .iter()
                .filter(|p| *p == &PathBuf::from("/docs/4.pdf"))
                .count(),
            1
        );
    }
}
