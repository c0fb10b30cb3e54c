use std::fs;

use burn_lesion::LesionError;
use burn_lesion::metadata::{ImageMetadata, export_metadata, read_record};
use serde_json::Value;

const CSV: &str = "image_name,patient_id,sex,age_approx,anatom_site_general_challenge,diagnosis,benign_malignant,target\n\
ISIC_1,P1,male,45,torso,nevus,benign,0\n\
ISIC_2,P2,female,60.0,lower extremity,melanoma,malignant,1\n";

#[test]
fn one_record_per_row() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let csv_path = tmp.path().join("ISIC_2020_Training_GroundTruth.csv");
    fs::write(&csv_path, CSV)?;
    let output = tmp.path().join("Descriptions_JSON");

    let written = export_metadata(&csv_path, &output)?;

    assert_eq!(written, 2);
    let value: Value = serde_json::from_str(&fs::read_to_string(output.join("ISIC_1.json"))?)?;
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 7);
    assert_eq!(object["patient_id"], "P1");
    assert_eq!(object["sex"], "male");
    assert!(object["age_approx"].is_u64());
    assert_eq!(object["age_approx"], 45);
    assert_eq!(object["anatom_site_general_challenge"], "torso");
    assert_eq!(object["diagnosis"], "nevus");
    assert_eq!(object["benign_malignant"], "benign");
    assert!(object["target"].is_i64());
    assert_eq!(object["target"], 0);

    assert_eq!(
        read_record(&output.join("ISIC_1.json"))?,
        ImageMetadata {
            patient_id: Some("P1".into()),
            sex: Some("male".into()),
            age_approx: Some(45),
            anatom_site_general_challenge: Some("torso".into()),
            diagnosis: Some("nevus".into()),
            benign_malignant: Some("benign".into()),
            target: 0,
        }
    );
    assert_eq!(read_record(&output.join("ISIC_2.json"))?.age_approx, Some(60));
    Ok(())
}

#[test]
fn rerun_overwrites() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let csv_path = tmp.path().join("meta.csv");
    fs::write(&csv_path, CSV)?;
    fs::write(tmp.path().join("ISIC_1.json"), "stale")?;

    export_metadata(&csv_path, tmp.path())?;
    export_metadata(&csv_path, tmp.path())?;

    assert_eq!(read_record(&tmp.path().join("ISIC_1.json"))?.target, 0);
    Ok(())
}

#[test]
fn missing_csv_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let err = export_metadata(tmp.path().join("absent.csv"), tmp.path()).unwrap_err();
    assert!(matches!(err, LesionError::PathNotFound(_)));
}

#[test]
fn unwritable_output_is_a_write_error() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let csv_path = tmp.path().join("meta.csv");
    fs::write(&csv_path, CSV)?;
    let blocker = tmp.path().join("blocker");
    fs::write(&blocker, "a file, not a directory")?;

    let err = export_metadata(&csv_path, blocker.join("out")).unwrap_err();

    assert!(matches!(err, LesionError::Write { .. }));
    Ok(())
}

#[test]
fn climbing_image_names_write_nothing() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let csv_path = tmp.path().join("metadata.csv");
    let header = CSV.lines().next().unwrap_or_default();
    fs::write(&csv_path, format!("{header}\n../outside,P9,male,45,torso,nevus,benign,0\n"))?;
    let output = tmp.path().join("out");

    let err = export_metadata(&csv_path, &output).unwrap_err();

    assert!(matches!(err, LesionError::MalformedRow { ref column, .. } if column == "image_name"));
    assert!(!tmp.path().join("outside.json").exists());
    Ok(())
}
