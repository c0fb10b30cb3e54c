//! Per-image metadata export.
//!
//! Reads the ISIC challenge metadata CSV and writes one `{image_name}.json`
//! record per row.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::error::{LesionError, Result, require_exists};

pub const METADATA_COLUMNS: [&str; 8] = [
    "image_name",
    "patient_id",
    "sex",
    "age_approx",
    "anatom_site_general_challenge",
    "diagnosis",
    "benign_malignant",
    "target",
];

/// The JSON record written for each image. Empty CSV cells become `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub patient_id: Option<String>,
    pub sex: Option<String>,
    pub age_approx: Option<u32>,
    pub anatom_site_general_challenge: Option<String>,
    pub diagnosis: Option<String>,
    pub benign_malignant: Option<String>,
    pub target: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRow {
    pub image_name: String,
    pub metadata: ImageMetadata,
}

impl MetadataRow {
    pub fn file_name(&self) -> String {
        format!("{}.json", self.image_name)
    }
}

#[derive(Deserialize)]
struct RawMetadataRow {
    image_name: String,
    patient_id: String,
    sex: String,
    age_approx: String,
    anatom_site_general_challenge: String,
    diagnosis: String,
    benign_malignant: String,
    target: String,
}

pub fn read_metadata_rows<R: Read>(reader: R, source: &Path) -> Result<Vec<MetadataRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    for column in METADATA_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LesionError::MissingColumn {
                path: source.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    reader
        .records()
        .map(|record| parse_row(&record?, &headers))
        .collect()
}

fn parse_row(record: &StringRecord, headers: &StringRecord) -> Result<MetadataRow> {
    let line = record.position().map(|p| p.line()).unwrap_or_default();
    let raw: RawMetadataRow = record.deserialize(Some(headers))?;

    let malformed = |column: &str, value: &str| LesionError::MalformedRow {
        line,
        column: column.to_string(),
        value: value.to_string(),
    };

    let age_approx = match raw.age_approx.as_str() {
        "" => None,
        value => Some(parse_whole::<u32>(value).ok_or_else(|| malformed("age_approx", value))?),
    };
    let target =
        parse_whole::<i64>(&raw.target).ok_or_else(|| malformed("target", &raw.target))?;
    if !is_plain_file_stem(&raw.image_name) {
        return Err(malformed("image_name", &raw.image_name));
    }

    Ok(MetadataRow {
        image_name: raw.image_name,
        metadata: ImageMetadata {
            patient_id: non_empty(raw.patient_id),
            sex: non_empty(raw.sex),
            age_approx,
            anatom_site_general_challenge: non_empty(raw.anatom_site_general_challenge),
            diagnosis: non_empty(raw.diagnosis),
            benign_malignant: non_empty(raw.benign_malignant),
            target,
        },
    })
}

/// Image names become file names inside the output directory, so they may
/// not name a directory or climb out of it.
fn is_plain_file_stem(name: &str) -> bool {
    !name.is_empty() && name != ".." && !name.contains(['/', '\\'])
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Parses `45` as well as the `45.0` spelling pandas leaves behind.
fn parse_whole<T>(value: &str) -> Option<T>
where
    T: std::str::FromStr + TryFrom<i64>,
{
    if let Ok(parsed) = value.parse::<T>() {
        return Some(parsed);
    }

    let float: f64 = value.parse().ok()?;
    if float.fract() != 0.0 || !float.is_finite() {
        return None;
    }
    T::try_from(float as i64).ok()
}

/// Writes one record per row of `csv_path` into `output_dir`, returning how
/// many files were written. Existing files are overwritten.
pub fn export_metadata<P, Q>(csv_path: P, output_dir: Q) -> Result<usize>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let csv_path = require_exists(csv_path.as_ref())?;
    let file = fs::File::open(&csv_path).map_err(|e| LesionError::io(&csv_path, e))?;
    let rows = read_metadata_rows(file, &csv_path)?;

    let written = export_rows(&rows, output_dir.as_ref())?;
    log::info!(
        "Exported {} metadata records to {}",
        written,
        output_dir.as_ref().display()
    );
    Ok(written)
}

pub fn export_rows(rows: &[MetadataRow], output_dir: &Path) -> Result<usize> {
    fs::create_dir_all(output_dir).map_err(|e| LesionError::write(output_dir, e))?;

    for row in rows {
        let path = output_dir.join(row.file_name());
        write_record(&path, &row.metadata)?;
    }

    Ok(rows.len())
}

pub fn write_record(path: &Path, metadata: &ImageMetadata) -> Result<PathBuf> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    metadata.serialize(&mut serializer)?;

    let mut file = fs::File::create(path).map_err(|e| LesionError::write(path, e))?;
    file.write_all(&buffer)
        .map_err(|e| LesionError::write(path, e))?;

    Ok(path.to_path_buf())
}

pub fn read_record(path: &Path) -> Result<ImageMetadata> {
    let file = fs::File::open(path).map_err(|e| LesionError::io(path, e))?;
    Ok(serde_json::from_reader(file)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "image_name,patient_id,sex,age_approx,anatom_site_general_challenge,diagnosis,benign_malignant,target\n";

    fn parse(body: &str) -> Result<Vec<MetadataRow>> {
        read_metadata_rows(format!("{HEADER}{body}").as_bytes(), Path::new("meta.csv"))
    }

    #[test]
    fn float_ages_are_whole_numbers() {
        let rows = parse("ISIC_1,P1,female,45.0,head/neck,unknown,benign,0\n").unwrap();
        assert_eq!(rows[0].metadata.age_approx, Some(45));
    }

    #[test]
    fn empty_cells_become_none() {
        let rows = parse("ISIC_2,P2,,,,unknown,benign,0\n").unwrap();
        let metadata = &rows[0].metadata;

        assert_eq!(metadata.sex, None);
        assert_eq!(metadata.age_approx, None);
        assert_eq!(metadata.anatom_site_general_challenge, None);
        assert_eq!(metadata.diagnosis.as_deref(), Some("unknown"));
    }

    #[test]
    fn fractional_age_is_malformed() {
        let err = parse("ISIC_3,P3,male,45.5,torso,nevus,benign,0\n").unwrap_err();
        assert!(matches!(
            err,
            LesionError::MalformedRow { ref column, .. } if column == "age_approx"
        ));
    }

    #[test]
    fn image_names_stay_inside_the_output_directory() {
        for name in ["../escape", "nested/ISIC_5", "nested\\ISIC_5", ".."] {
            let err = parse(&format!("{name},P5,male,30,torso,nevus,benign,0\n")).unwrap_err();
            assert!(
                matches!(
                    err,
                    LesionError::MalformedRow { line: 2, ref column, .. } if column == "image_name"
                ),
                "{name} was accepted"
            );
        }
    }

    #[test]
    fn missing_target_column() {
        let err = read_metadata_rows(
            "image_name,patient_id\nISIC_1,P1\n".as_bytes(),
            Path::new("meta.csv"),
        )
        .unwrap_err();
        assert!(matches!(err, LesionError::MissingColumn { ref column, .. } if column == "sex"));
    }

    #[test]
    fn records_use_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let rows = parse("ISIC_4,P4,male,30,torso,nevus,benign,0\n").unwrap();
        export_rows(&rows, dir.path()).unwrap();

        let text = fs::read_to_string(dir.path().join("ISIC_4.json")).unwrap();
        assert!(text.contains("\n    \"patient_id\": \"P4\""));
    }
}
