use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use burn::data::dataset::Dataset;
use burn_lesion::Label;
use burn_lesion::dataset::materialize::sample_path;
use burn_lesion::dataset::{LabeledImage, into_datasets, materialize, split};
use image::{Rgb, RgbImage};

fn samples(n: usize) -> Vec<LabeledImage> {
    (0..n)
        .map(|i| {
            let label = Label::ALL[i % 3];
            LabeledImage::new(
                format!("ISIC_{i:07}"),
                label,
                RgbImage::from_pixel(8, 8, Rgb([i as u8, 0, 0])),
            )
        })
        .collect()
}

fn files_under(dir: &Path) -> Vec<String> {
    let mut files = Vec::new();
    for split in ["train", "val"] {
        for label in Label::ALL {
            let label_dir = dir.join(split).join(label.as_str());
            for entry in fs::read_dir(&label_dir).unwrap() {
                let name = entry.unwrap().file_name().to_string_lossy().into_owned();
                files.push(format!("{split}/{label}/{name}"));
            }
        }
    }
    files
}

#[test]
fn split_partitions_by_identifier() -> anyhow::Result<()> {
    let split = split(samples(20), 0.3, Some(42))?;

    let train: BTreeSet<_> = split.train.iter().map(|s| s.image_id.clone()).collect();
    let val: BTreeSet<_> = split.val.iter().map(|s| s.image_id.clone()).collect();

    assert_eq!(split.train.len() + split.val.len(), 20);
    assert_eq!(val.len(), 6);
    assert!(train.is_disjoint(&val));
    Ok(())
}

#[test]
fn materialize_writes_every_sample_once() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let output = tmp.path().join("classification_dataset");
    let split = split(samples(10), 0.3, Some(7))?;

    let summary = materialize(&split, &output)?;

    assert_eq!(summary.written["train"], 7);
    assert_eq!(summary.written["val"], 3);
    assert_eq!(summary.total(), 10);
    assert_eq!(files_under(&output).len(), 10);

    for (index, sample) in split.val.iter().enumerate() {
        let path = sample_path(&output, "val", sample.label, index);
        assert!(path.exists(), "missing {}", path.display());
        let decoded = image::open(&path)?;
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }
    Ok(())
}

#[test]
fn label_directories_exist_even_when_empty() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let only_benign = vec![LabeledImage::new(
        "A".into(),
        Label::Benign,
        RgbImage::new(4, 4),
    )];
    let split = split(only_benign, 0.0, None)?;

    materialize(&split, tmp.path())?;

    for subset in ["train", "val"] {
        for label in Label::ALL {
            assert!(tmp.path().join(subset).join(label.as_str()).is_dir());
        }
    }
    assert!(tmp.path().join("train/benign/benign_0.jpg").exists());
    Ok(())
}

#[test]
fn split_halves_become_loader_datasets() -> anyhow::Result<()> {
    let split = split(samples(10), 0.3, Some(11))?;
    let first_val = split.val[0].image_id.clone();

    let (train, val) = into_datasets(split);

    assert_eq!(train.len(), 7);
    assert_eq!(val.len(), 3);
    assert_eq!(val.get(0).map(|sample| sample.image_id), Some(first_val));
    assert!(train.get(7).is_none());
    Ok(())
}
