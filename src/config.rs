use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::note::NoteDefaults;
use crate::palette::{ColorPalette, PaletteError, Rgb};
use crate::registry::{PlacementPolicy, CASCADE_STEP};
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Largest sketch side in pixels; configured sizes are clamped to it
pub const MAX_CANVAS_SIDE: u32 = 4096;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub palette: PaletteConfig,
    #[serde(default)]
    pub notes: NotesConfig,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteConfig {
    #[serde(default = "default_palette_colors")]
    pub colors: Vec<Rgb>,
    #[serde(default = "default_palette_names")]
    pub names: Vec<String>,
    #[serde(default = "default_icon_dir")]
    pub icon_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesConfig {
    #[serde(default)]
    pub placement: PlacementPolicy,
    #[serde(default = "default_cascade_step")]
    pub cascade_step: i32,
    #[serde(default = "default_text_color")]
    pub default_text_color: String,
    #[serde(default = "default_text_background")]
    pub text_background: Rgb,
    #[serde(default = "default_sketch_background")]
    pub sketch_background: Rgb,
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_highlight_fg")]
    pub highlight_fg: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_new_text")]
    pub new_text: String,
    #[serde(default = "default_new_sketch")]
    pub new_sketch: String,
    #[serde(default = "default_import")]
    pub import: String,
    #[serde(default = "default_export")]
    pub export: String,
    #[serde(default = "default_close")]
    pub close: String,
    #[serde(default = "default_edit")]
    pub edit: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_lock")]
    pub lock: String,
    #[serde(default = "default_alarm")]
    pub alarm: String,
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default = "default_eraser")]
    pub eraser: String,
    #[serde(default = "default_copy")]
    pub copy: String,
    #[serde(default = "default_paste")]
    pub paste: String,
    #[serde(default = "default_next_note")]
    pub next_note: String,
    #[serde(default = "default_prev_note")]
    pub prev_note: String,
    #[serde(default = "default_help")]
    pub help: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file; defaults to `stickies.log` in the data directory
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            palette: PaletteConfig::default(),
            notes: NotesConfig::default(),
            theme: Theme::default(),
            key_bindings: KeyBindings::default(),
            logging: LoggingConfig::default(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            colors: default_palette_colors(),
            names: default_palette_names(),
            icon_dir: default_icon_dir(),
        }
    }
}

impl PaletteConfig {
    pub fn build(&self) -> Result<ColorPalette, PaletteError> {
        ColorPalette::build(&self.colors, &self.names, utils::expand_path(&self.icon_dir))
    }
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            placement: PlacementPolicy::default(),
            cascade_step: default_cascade_step(),
            default_text_color: default_text_color(),
            text_background: default_text_background(),
            sketch_background: default_sketch_background(),
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
        }
    }
}

impl NotesConfig {
    pub fn defaults(&self) -> NoteDefaults {
        NoteDefaults {
            text_color: self.default_text_color.clone(),
            text_background: self.text_background,
            sketch_background: self.sketch_background,
            canvas_width: self.canvas_width.clamp(1, MAX_CANVAS_SIDE),
            canvas_height: self.canvas_height.clamp(1, MAX_CANVAS_SIDE),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: default_highlight_fg(),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            new_text: default_new_text(),
            new_sketch: default_new_sketch(),
            import: default_import(),
            export: default_export(),
            close: default_close(),
            edit: default_edit(),
            title: default_title(),
            lock: default_lock(),
            alarm: default_alarm(),
            font: default_font(),
            eraser: default_eraser(),
            copy: default_copy(),
            paste: default_paste(),
            next_note: default_next_note(),
            prev_note: default_prev_note(),
            help: default_help(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

// Default value functions
fn default_palette_colors() -> Vec<Rgb> {
    vec![
        Rgb::BLACK,
        Rgb::RED,
        Rgb::GREEN,
        Rgb::BLUE,
        Rgb::CYAN,
        Rgb::MAGENTA,
        Rgb::YELLOW,
    ]
}

fn default_palette_names() -> Vec<String> {
    ["Black", "Red", "Green", "Blue", "Cyan", "Magenta", "Yellow"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_icon_dir() -> String {
    "assets".to_string()
}

fn default_cascade_step() -> i32 {
    CASCADE_STEP
}

fn default_text_color() -> String {
    "Black".to_string()
}

fn default_text_background() -> Rgb {
    Rgb::STICKY
}

fn default_sketch_background() -> Rgb {
    Rgb::WHITE
}

fn default_canvas_width() -> u32 {
    160
}

fn default_canvas_height() -> u32 {
    96
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "yellow".to_string()
}

fn default_highlight_fg() -> String {
    "black".to_string()
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_new_text() -> String {
    "n".to_string()
}

fn default_new_sketch() -> String {
    "k".to_string()
}

fn default_import() -> String {
    "o".to_string()
}

fn default_export() -> String {
    "x".to_string()
}

fn default_close() -> String {
    "w".to_string()
}

fn default_edit() -> String {
    "e".to_string()
}

fn default_title() -> String {
    "t".to_string()
}

fn default_lock() -> String {
    "l".to_string()
}

fn default_alarm() -> String {
    "a".to_string()
}

fn default_font() -> String {
    "f".to_string()
}

fn default_eraser() -> String {
    "0".to_string()
}

fn default_copy() -> String {
    "y".to_string()
}

fn default_paste() -> String {
    "p".to_string()
}

fn default_next_note() -> String {
    "Tab".to_string()
}

fn default_prev_note() -> String {
    "BackTab".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Invalid palette: {0}")]
    PaletteError(#[from] PaletteError),
}

impl Config {
    /// Load configuration from the profile's config directory,
    /// creating a default file if it is missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file, creating it with defaults if missing
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        let config = if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            toml::from_str::<Config>(&contents)?
        } else {
            let mut config = Config::default();
            config.save_to(config_path)?;
            config
        };

        // Catch a mismatched palette here, before any note exists
        config.palette.build()?;
        Ok(config)
    }

    /// Load configuration using the production profile
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_profile(utils::Profile::Prod)
    }

    pub fn save_with_profile(&mut self, profile: utils::Profile) -> Result<(), ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        self.save_to(&config_path)
    }

    pub fn save_to(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        // Create parent directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile).ok_or_else(|| {
            ConfigError::ConfigDirError("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("config.toml"))
    }

    /// Log file path: configured value (with `~` expansion) or the
    /// profile's data directory
    pub fn get_log_path(&self, profile: utils::Profile) -> Option<PathBuf> {
        match self.logging.file {
            Some(ref file) => Some(utils::expand_path(file)),
            None => utils::get_data_dir(profile).map(|dir| dir.join("stickies.log")),
        }
    }
}
