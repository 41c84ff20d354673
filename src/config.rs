// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Settings store and the typed annotation configuration.
//!
//! Settings are a JSON tree addressed with dotted keys such as
//! `annotation.line_width`. They are stored as JSON or YAML depending on
//! the file extension.

use crate::models::color::Color;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

pub const FONT_SIZE_RANGE: (u32, u32) = (12, 48);
pub const LINE_WIDTH_RANGE: (u32, u32) = (1, 10);
pub const ARROW_SIZE_RANGE: (u32, u32) = (1, 200);

pub const DEFAULT_FONT_SIZE: u32 = 16;
pub const DEFAULT_FONT_COLOR: Color = Color::WHITE;
pub const DEFAULT_ANNOTATION_COLOR: Color = Color::RED;
pub const DEFAULT_LINE_WIDTH: u32 = 3;
pub const DEFAULT_ARROW_SIZE: u32 = 10;

pub const KEY_FONT_SIZE: &str = "screenshot.font_size";
pub const KEY_FONT_COLOR: &str = "screenshot.font_color";
pub const KEY_FONT_PATH: &str = "screenshot.font_path";
pub const KEY_SAVE_DIRECTORY: &str = "screenshot.save_directory";
pub const KEY_AUTO_ANNOTATION: &str = "screenshot.auto_annotation";
pub const KEY_ANNOTATION_COLOR: &str = "annotation.default_color";
pub const KEY_LINE_WIDTH: &str = "annotation.line_width";
pub const KEY_ARROW_SIZE: &str = "annotation.arrow_size";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => Format::Json,
        }
    }
}

/// Dotted-key settings store.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    path: Option<PathBuf>,
    data: Value,
}

impl Default for Settings {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Settings {
    /// Settings holding the defaults, not backed by any file.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: default_tree(),
        }
    }

    /// Load settings from `path`.
    ///
    /// A missing file is created with the defaults. A file that cannot be
    /// read or parsed is replaced by the defaults.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut settings = Self {
            path: Some(path.clone()),
            data: default_tree(),
        };

        if !path.exists() {
            log::info!("No settings at {}, writing defaults", path.display());
            if let Err(e) = settings.save() {
                log::warn!("Failed to write default settings: {:#}", e);
            }
            return settings;
        }

        match read_tree(&path) {
            Ok(data) => {
                log::info!("Loaded settings from {}", path.display());
                settings.data = data;
            }
            Err(e) => {
                log::warn!("Failed to load settings, using defaults: {:#}", e);
                if let Err(e) = settings.save() {
                    log::warn!("Failed to write default settings: {:#}", e);
                }
            }
        }
        settings
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Look up a dotted key, returning `default` when it is missing or has
    /// the wrong type.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.lookup(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or(default)
    }

    /// Raw value at a dotted key.
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(&self.data, |node, segment| node.as_object()?.get(segment))
    }

    /// Set a dotted key, creating intermediate tables as needed.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Cannot store setting {}: {}", key, e);
                return;
            }
        };

        let mut segments: Vec<&str> = key.split('.').collect();
        let Some(last) = segments.pop() else {
            return;
        };

        let mut node = &mut self.data;
        for segment in segments {
            node = ensure_object(node)
                .entry(segment)
                .or_insert_with(|| Value::Object(Map::new()));
        }
        ensure_object(node).insert(last.to_string(), value);
    }

    /// Write the settings back to their file, if they have one.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let text = match Format::from_path(path) {
            Format::Yaml => serde_yaml::to_string(&self.data)?,
            Format::Json => serde_json::to_string_pretty(&self.data)?,
        };
        std::fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))?;
        log::debug!("Saved settings to {}", path.display());
        Ok(())
    }
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

fn read_tree(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let data: Value = match Format::from_path(path) {
        Format::Yaml => serde_yaml::from_str(&text)?,
        Format::Json => serde_json::from_str(&text)?,
    };
    anyhow::ensure!(data.is_object(), "settings root must be a table");
    Ok(data)
}

fn default_tree() -> Value {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let save_directory = home.join("Desktop").join("Screenshots");

    json!({
        "screenshot": {
            "save_directory": save_directory.to_string_lossy(),
            "batch_interval": 5,
            "auto_annotation": true,
            "font_size": DEFAULT_FONT_SIZE,
            "font_color": DEFAULT_FONT_COLOR.to_string(),
            "font_path": null
        },
        "annotation": {
            "default_color": DEFAULT_ANNOTATION_COLOR.to_string(),
            "line_width": DEFAULT_LINE_WIDTH,
            "arrow_size": DEFAULT_ARROW_SIZE
        }
    })
}

pub fn clamp_font_size(size: u32) -> u32 {
    size.clamp(FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1)
}

pub fn clamp_line_width(width: u32) -> u32 {
    width.clamp(LINE_WIDTH_RANGE.0, LINE_WIDTH_RANGE.1)
}

pub fn clamp_arrow_size(size: u32) -> u32 {
    size.clamp(ARROW_SIZE_RANGE.0, ARROW_SIZE_RANGE.1)
}

/// Typed annotation settings, read once from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationConfig {
    pub font_size: u32,
    pub font_color: Color,
    pub font_path: Option<PathBuf>,
    pub annotation_color: Color,
    pub line_width: u32,
    pub arrow_size: u32,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            font_color: DEFAULT_FONT_COLOR,
            font_path: None,
            annotation_color: DEFAULT_ANNOTATION_COLOR,
            line_width: DEFAULT_LINE_WIDTH,
            arrow_size: DEFAULT_ARROW_SIZE,
        }
    }
}

impl AnnotationConfig {
    /// Read and sanitise the annotation keys. Out of range numbers are
    /// clamped and malformed colors fall back to their defaults.
    pub fn from_settings(settings: &Settings) -> Self {
        let color = |key: &str, default: Color| {
            let raw: String = settings.get(key, default.to_string());
            Color::parse_or(&raw, default)
        };
        let number = |key: &str, default: u32| -> u32 {
            let raw: i64 = settings.get(key, i64::from(default));
            u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
        };

        Self {
            font_size: clamp_font_size(number(KEY_FONT_SIZE, DEFAULT_FONT_SIZE)),
            font_color: color(KEY_FONT_COLOR, DEFAULT_FONT_COLOR),
            font_path: settings.get::<Option<PathBuf>>(KEY_FONT_PATH, None),
            annotation_color: color(KEY_ANNOTATION_COLOR, DEFAULT_ANNOTATION_COLOR),
            line_width: clamp_line_width(number(KEY_LINE_WIDTH, DEFAULT_LINE_WIDTH)),
            arrow_size: clamp_arrow_size(number(KEY_ARROW_SIZE, DEFAULT_ARROW_SIZE)),
        }
    }
}
