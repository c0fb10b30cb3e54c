use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{LesionError, Result, require_exists};

pub const DESCRIPTIONS_DIR: &str = "Descriptions";
pub const IMAGES_DIR: &str = "Images";
pub const SEGMENTATION_DIR: &str = "Segmentation";
pub const LABELS_DIR: &str = "Labels";

pub const TRAINING_LABEL_FILE: &str = "ISIC-2017_Training_Part3_GroundTruth.csv";

const DESCRIPTION_SUFFIXES: [&str; 2] = ["_features.json", ".json"];
const IMAGE_SUFFIX: &str = ".jpg";
const MASK_SUFFIX: &str = "_segmentation.png";

/// The three per-image sources joined by the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    Description,
    Image,
    Mask,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceKind::Description => "description",
            SourceKind::Image => "image",
            SourceKind::Mask => "mask",
        })
    }
}

/// Directory layout of an ISIC archive download:
///
/// ```text
/// root/Descriptions/{id}_features.json  (or {id}.json)
/// root/Images/{id}.jpg
/// root/Segmentation/{id}_segmentation.png
/// root/Labels/*.csv
/// ```
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = require_exists(root.as_ref())?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn descriptions_dir(&self) -> PathBuf {
        self.root.join(DESCRIPTIONS_DIR)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn segmentation_dir(&self) -> PathBuf {
        self.root.join(SEGMENTATION_DIR)
    }

    pub fn label_file(&self, name: &str) -> PathBuf {
        self.root.join(LABELS_DIR).join(name)
    }

    pub fn image_path(&self, image_id: &str) -> PathBuf {
        self.images_dir().join(format!("{image_id}{IMAGE_SUFFIX}"))
    }

    pub fn mask_path(&self, image_id: &str) -> PathBuf {
        self.segmentation_dir()
            .join(format!("{image_id}{MASK_SUFFIX}"))
    }

    /// Indexes every source directory. A missing directory indexes as empty,
    /// so its identifiers show up as missing data in the join.
    pub fn index(&self) -> Result<SourceIndex> {
        Ok(SourceIndex {
            descriptions: scan(&self.descriptions_dir(), description_id)?,
            images: scan(&self.images_dir(), image_id)?,
            masks: scan(&self.segmentation_dir(), mask_id)?,
        })
    }

    pub fn index_images(&self) -> Result<BTreeMap<String, PathBuf>> {
        scan(&self.images_dir(), image_id)
    }

    pub fn index_descriptions(&self) -> Result<BTreeMap<String, PathBuf>> {
        scan(&self.descriptions_dir(), description_id)
    }
}

/// Identifier to path maps for each source.
#[derive(Debug, Clone, Default)]
pub struct SourceIndex {
    pub descriptions: BTreeMap<String, PathBuf>,
    pub images: BTreeMap<String, PathBuf>,
    pub masks: BTreeMap<String, PathBuf>,
}

impl SourceIndex {
    /// Every identifier seen in any source, sorted.
    pub fn identifiers(&self) -> BTreeSet<&str> {
        self.descriptions
            .keys()
            .chain(self.images.keys())
            .chain(self.masks.keys())
            .map(String::as_str)
            .collect()
    }

    pub fn missing(&self, image_id: &str) -> Vec<SourceKind> {
        let mut missing = Vec::new();
        if !self.descriptions.contains_key(image_id) {
            missing.push(SourceKind::Description);
        }
        if !self.images.contains_key(image_id) {
            missing.push(SourceKind::Image);
        }
        if !self.masks.contains_key(image_id) {
            missing.push(SourceKind::Mask);
        }
        missing
    }
}

pub fn description_id(file_name: &str) -> Option<&str> {
    DESCRIPTION_SUFFIXES
        .iter()
        .find_map(|suffix| file_name.strip_suffix(suffix))
        .filter(|id| !id.is_empty())
}

pub fn image_id(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(IMAGE_SUFFIX)
        .filter(|id| !id.is_empty())
}

pub fn mask_id(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(MASK_SUFFIX)
        .filter(|id| !id.is_empty())
}

fn scan(dir: &Path, derive_id: fn(&str) -> Option<&str>) -> Result<BTreeMap<String, PathBuf>> {
    let mut found = BTreeMap::new();

    if !dir.is_dir() {
        log::warn!("Directory does not exist: {}", dir.display());
        return Ok(found);
    }

    for entry in std::fs::read_dir(dir).map_err(|e| LesionError::io(dir, e))? {
        let entry = entry.map_err(|e| LesionError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };

        if let Some(id) = derive_id(file_name) {
            found.insert(id.to_string(), path);
        }
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_strip_fixed_suffixes() {
        assert_eq!(description_id("ISIC_0000000_features.json"), Some("ISIC_0000000"));
        assert_eq!(description_id("ISIC_0000001.json"), Some("ISIC_0000001"));
        assert_eq!(description_id("notes.txt"), None);
        assert_eq!(image_id("ISIC_0000000.jpg"), Some("ISIC_0000000"));
        assert_eq!(image_id("ISIC_0000000.png"), None);
        assert_eq!(mask_id("ISIC_0000000_segmentation.png"), Some("ISIC_0000000"));
        assert_eq!(mask_id("_segmentation.png"), None);
    }

    #[test]
    fn union_of_sources() {
        let mut index = SourceIndex::default();
        index.descriptions.insert("A".into(), "a.json".into());
        index.images.insert("A".into(), "a.jpg".into());
        index.masks.insert("A".into(), "a.png".into());
        index.images.insert("B".into(), "b.jpg".into());

        let ids: Vec<_> = index.identifiers().into_iter().collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert!(index.missing("A").is_empty());
        assert_eq!(index.missing("B"), vec![SourceKind::Description, SourceKind::Mask]);
    }

    #[test]
    fn missing_root() {
        let err = DataLayout::new("/definitely/not/here").unwrap_err();
        assert!(matches!(err, LesionError::PathNotFound(_)));
    }
}
