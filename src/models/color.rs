// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! RGBA colors and the annotation palette.
//!
//! Colors travel through settings files as hex strings, so parsing and
//! formatting live here and nowhere else.

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);

    /// Background plate behind info text.
    pub const TEXT_PLATE: Color = Color::rgba(0, 0, 0, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_array(rgba: [u8; 4]) -> Self {
        Self::rgba(rgba[0], rgba[1], rgba[2], rgba[3])
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Parse a hex string, falling back to `default` when it is malformed.
    pub fn parse_or(value: &str, default: Color) -> Color {
        match value.parse() {
            Ok(color) => color,
            Err(e) => {
                log::warn!("Ignoring invalid color {:?}: {}", value, e);
                default
            }
        }
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    /// Accepts `#RGB`, `#RRGGBB` and `#RRGGBBAA` (the leading `#` is optional).
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("not a hex color: {s:?}");
        }

        let channel = |range: std::ops::Range<usize>| -> Result<u8> {
            u8::from_str_radix(&hex[range], 16).map_err(|e| anyhow!("bad channel in {s:?}: {e}"))
        };

        match hex.len() {
            3 => {
                let expand = |i: usize| -> Result<u8> { Ok(channel(i..i + 1)? * 17) };
                Ok(Color::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Color::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            n => bail!("hex color {s:?} has {n} digits, expected 3, 6 or 8"),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if !self.is_opaque() {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Ordered set of named annotation colors.
///
/// Identifiers are stable keys; turning them into display labels is up to
/// whatever UI sits on top.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: Vec<(&'static str, Color)>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            entries: vec![
                ("red", Color::rgb(0xFF, 0x00, 0x00)),
                ("green", Color::rgb(0x00, 0xFF, 0x00)),
                ("blue", Color::rgb(0x00, 0x00, 0xFF)),
                ("yellow", Color::rgb(0xFF, 0xFF, 0x00)),
                ("black", Color::rgb(0x00, 0x00, 0x00)),
                ("white", Color::rgb(0xFF, 0xFF, 0xFF)),
                ("orange", Color::rgb(0xFF, 0xA5, 0x00)),
                ("purple", Color::rgb(0x80, 0x00, 0x80)),
            ],
        }
    }
}

impl Palette {
    pub fn get(&self, id: &str) -> Option<Color> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, color)| *color)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Color)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
