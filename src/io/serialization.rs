// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Shape documents on disk.
//!
//! The format follows the file extension: `.yaml`/`.yml` or `.json`.

use crate::models::project::ShapeDocument;
use anyhow::{bail, Context, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Ok(DocumentFormat::Yaml),
            Some("json") => Ok(DocumentFormat::Json),
            other => bail!("Unsupported file extension: {:?}", other),
        }
    }
}

/// Write a document, picking YAML or JSON from the file extension.
pub fn export_document(data: &ShapeDocument, path: &Path) -> Result<()> {
    let text = match DocumentFormat::from_path(path)? {
        DocumentFormat::Yaml => serde_yaml::to_string(data)?,
        DocumentFormat::Json => serde_json::to_string_pretty(data)?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create directory {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))?;
    log::info!("Exported {} shapes to {}", data.shapes.len(), path.display());
    Ok(())
}

/// Read a document, picking YAML or JSON from the file extension. Shapes
/// with fewer than two points are dropped.
pub fn import_document(path: &Path) -> Result<ShapeDocument> {
    let format = DocumentFormat::from_path(path)?;
    let text =
        std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let mut data: ShapeDocument = match format {
        DocumentFormat::Yaml => serde_yaml::from_str(&text)?,
        DocumentFormat::Json => serde_json::from_str(&text)?,
    };
    let dropped = data.retain_complete();
    if dropped > 0 {
        log::warn!("Dropped {} incomplete shape(s) from {}", dropped, path.display());
    }
    log::info!("Imported {} shapes from {}", data.shapes.len(), path.display());
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Color, Point, Shape, ShapeKind};

    fn sample() -> ShapeDocument {
        let mut doc = ShapeDocument::new("clip.mp4".to_string(), 800, 600);
        doc.shapes.push(Shape {
            kind: ShapeKind::Arrow,
            points: vec![Point::new(100, 100), Point::new(200, 200)],
            color: Color::RED,
            stroke_width: 3,
        });
        doc.shapes.push(Shape {
            kind: ShapeKind::Freehand,
            points: vec![Point::new(1, 1), Point::new(2, 3), Point::new(4, 4)],
            color: Color::rgb(0, 0, 255),
            stroke_width: 5,
        });
        doc
    }

    #[test]
    fn test_yaml_and_json_agree() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("shapes.yaml");
        let json = dir.path().join("shapes.json");
        export_document(&sample(), &yaml).unwrap();
        export_document(&sample(), &json).unwrap();

        assert_eq!(import_document(&yaml).unwrap(), sample());
        assert_eq!(import_document(&json).unwrap(), sample());
    }

    #[test]
    fn test_import_drops_incomplete_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shapes.json");
        std::fs::write(
            &path,
            r##"{"media_file":"x","frame_width":10,"frame_height":10,
                "shapes":[{"kind":"rectangle","points":[{"x":1,"y":1}],"color":"#ff0000","stroke_width":2}]}"##,
        )
        .unwrap();
        assert!(import_document(&path).unwrap().shapes.is_empty());
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(export_document(&sample(), &dir.path().join("shapes.txt")).is_err());
        assert!(import_document(&dir.path().join("shapes.txt")).is_err());
    }
}
