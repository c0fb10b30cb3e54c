//! Ground-truth label resolution.
//!
//! The ISIC "Part 3" ground-truth files carry one row per image with two
//! indicator columns. Each row resolves to exactly one [`Label`]:
//! melanoma wins over seborrheic keratosis, and everything else is benign.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};

use crate::error::{LesionError, Result, require_exists};

pub const IMAGE_ID_COLUMN: &str = "image_id";
pub const MELANOMA_COLUMN: &str = "melanoma";
pub const SEBORRHEIC_KERATOSIS_COLUMN: &str = "seborrheic_keratosis";

const DESCRIPTION_LABEL_POINTER: &str = "/meta/clinical/benign_malignant";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Malignant,
    SeborrheicKeratosis,
    Benign,
}

impl Label {
    pub const ALL: [Label; 3] = [Label::Malignant, Label::SeborrheicKeratosis, Label::Benign];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Malignant => "malignant",
            Label::SeborrheicKeratosis => "seborrheic_keratosis",
            Label::Benign => "benign",
        }
    }

    pub fn from_name(name: &str) -> Option<Label> {
        Label::ALL.into_iter().find(|label| label.as_str() == name)
    }

    /// Index in the segmentation class table, where 0 is background.
    pub fn class_id(&self) -> usize {
        match self {
            Label::Malignant => 1,
            Label::SeborrheicKeratosis => 2,
            Label::Benign => 3,
        }
    }

    /// Index in the classifier output, which follows the sorted folder names
    /// of the materialized dataset.
    pub fn classifier_index(&self) -> usize {
        match self {
            Label::Benign => 0,
            Label::Malignant => 1,
            Label::SeborrheicKeratosis => 2,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validated row of a ground-truth file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRow {
    pub image_id: String,
    pub melanoma: bool,
    pub seborrheic_keratosis: bool,
}

impl LabelRow {
    pub fn label(&self) -> Label {
        if self.melanoma {
            Label::Malignant
        } else if self.seborrheic_keratosis {
            Label::SeborrheicKeratosis
        } else {
            Label::Benign
        }
    }
}

#[derive(Deserialize)]
struct RawLabelRow {
    image_id: String,
    melanoma: String,
    seborrheic_keratosis: String,
}

/// Immutable image id to label lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    labels: BTreeMap<String, Label>,
}

impl LabelMap {
    /// Later rows replace earlier rows with the same image id.
    pub fn from_rows<I: IntoIterator<Item = LabelRow>>(rows: I) -> Self {
        let labels = rows
            .into_iter()
            .map(|row| {
                let label = row.label();
                (row.image_id, label)
            })
            .collect();

        Self { labels }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = require_exists(path.as_ref())?;
        let file = File::open(&path).map_err(|e| LesionError::io(&path, e))?;
        let map = Self::from_reader(file, &path)?;

        log::info!("Loaded {} labels from {}", map.len(), path.display());
        for (label, count) in map.counts() {
            log::debug!("  {label}: {count}");
        }

        Ok(map)
    }

    /// Parses a ground-truth CSV. `source` only names the input in errors.
    pub fn from_reader<R: Read>(reader: R, source: &Path) -> Result<Self> {
        let rows = read_label_rows(reader, source)?;
        Ok(Self::from_rows(rows))
    }

    /// Ground truth from ISIC description records, read from
    /// `meta.clinical.benign_malignant`. These only tell benign from
    /// malignant. Unreadable or unlabeled records are logged and left out.
    pub fn from_descriptions(descriptions: &BTreeMap<String, PathBuf>) -> Self {
        let mut labels = BTreeMap::new();

        for (image_id, path) in descriptions {
            match read_description_label(path) {
                Ok(Some(label)) => {
                    labels.insert(image_id.clone(), label);
                }
                Ok(None) => log::debug!("No benign_malignant in {}", path.display()),
                Err(e) => log::warn!("Error reading JSON file {}: {e}", path.display()),
            }
        }

        log::info!(
            "Loaded {} labels from {} descriptions",
            labels.len(),
            descriptions.len()
        );
        Self { labels }
    }

    pub fn get(&self, image_id: &str) -> Option<Label> {
        self.labels.get(image_id).copied()
    }

    pub fn contains(&self, image_id: &str) -> bool {
        self.labels.contains_key(image_id)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Label)> {
        self.labels.iter().map(|(id, label)| (id.as_str(), *label))
    }

    /// Number of images per label. Labels with no image are reported as zero.
    pub fn counts(&self) -> BTreeMap<Label, usize> {
        let mut counts: BTreeMap<Label, usize> = Label::ALL.iter().map(|l| (*l, 0)).collect();
        for label in self.labels.values() {
            *counts.entry(*label).or_default() += 1;
        }
        counts
    }
}

pub fn read_label_rows<R: Read>(reader: R, source: &Path) -> Result<Vec<LabelRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    for column in [IMAGE_ID_COLUMN, MELANOMA_COLUMN, SEBORRHEIC_KERATOSIS_COLUMN] {
        if !headers.iter().any(|h| h == column) {
            return Err(LesionError::MissingColumn {
                path: source.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(parse_row(&record, &headers)?);
    }

    Ok(rows)
}

fn parse_row(record: &StringRecord, headers: &StringRecord) -> Result<LabelRow> {
    let line = record.position().map(|p| p.line()).unwrap_or_default();
    let raw: RawLabelRow = record.deserialize(Some(headers))?;

    Ok(LabelRow {
        melanoma: parse_indicator(&raw.melanoma, line, MELANOMA_COLUMN)?,
        seborrheic_keratosis: parse_indicator(
            &raw.seborrheic_keratosis,
            line,
            SEBORRHEIC_KERATOSIS_COLUMN,
        )?,
        image_id: raw.image_id,
    })
}

fn read_description_label(path: &Path) -> Result<Option<Label>> {
    let file = File::open(path).map_err(|e| LesionError::io(path, e))?;
    let record: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;

    Ok(record
        .pointer(DESCRIPTION_LABEL_POINTER)
        .and_then(serde_json::Value::as_str)
        .and_then(Label::from_name))
}

/// Accepts `0`/`1` and their float spellings (`0.0`, `1.0`).
fn parse_indicator(value: &str, line: u64, column: &str) -> Result<bool> {
    let malformed = || LesionError::MalformedRow {
        line,
        column: column.to_string(),
        value: value.to_string(),
    };

    let parsed: f64 = value.parse().map_err(|_| malformed())?;
    if parsed == 1.0 {
        Ok(true)
    } else if parsed == 0.0 {
        Ok(false)
    } else {
        Err(malformed())
    }
}
