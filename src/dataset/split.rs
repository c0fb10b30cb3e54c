use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::{LesionError, Result};

#[derive(Debug, Clone)]
pub struct DatasetSplit<T> {
    pub train: Vec<T>,
    pub val: Vec<T>,
}

impl<T> DatasetSplit<T> {
    pub fn len(&self) -> usize {
        self.train.len() + self.val.len()
    }

    pub fn is_empty(&self) -> bool {
        self.train.is_empty() && self.val.is_empty()
    }

    pub fn subsets(&self) -> [(&'static str, &[T]); 2] {
        [("train", self.train.as_slice()), ("val", self.val.as_slice())]
    }
}

/// Number of validation items for `count` items: `floor(count * val_fraction)`.
pub fn val_count(count: usize, val_fraction: f64) -> usize {
    (count as f64 * val_fraction).floor() as usize
}

/// Shuffles `items` and moves the last `floor(len * val_fraction)` of them
/// into the validation set. Without a seed every call shuffles differently.
pub fn split<T>(
    mut items: Vec<T>,
    val_fraction: f64,
    seed: Option<u64>,
) -> Result<DatasetSplit<T>> {
    if !(0.0..=1.0).contains(&val_fraction) {
        return Err(LesionError::InvalidFraction(val_fraction));
    }

    match seed {
        Some(seed) => items.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => items.shuffle(&mut rand::thread_rng()),
    }

    let cut = items.len() - val_count(items.len(), val_fraction);
    let val = items.split_off(cut);

    log::info!("Split {} train / {} val", items.len(), val.len());
    Ok(DatasetSplit { train: items, val })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_follow_the_fraction() {
        let split = split((0..10).collect(), 0.3, Some(1)).unwrap();
        assert_eq!(split.train.len(), 7);
        assert_eq!(split.val.len(), 3);

        let split = split_of(11, 0.3);
        assert_eq!(split.val.len(), 3);
        assert_eq!(split.train.len(), 8);
    }

    fn split_of(n: usize, fraction: f64) -> DatasetSplit<usize> {
        split((0..n).collect(), fraction, Some(3)).unwrap()
    }

    #[test]
    fn disjoint_and_complete() {
        let split = split_of(100, 0.3);
        let mut all: Vec<usize> = split.train.iter().chain(&split.val).copied().collect();
        all.sort_unstable();

        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn seeded_split_is_reproducible() {
        let a = split_of(50, 0.3);
        let b = split_of(50, 0.3);
        assert_eq!(a.train, b.train);
        assert_eq!(a.val, b.val);
    }

    #[test]
    fn small_collections_keep_everything_in_train() {
        let split = split_of(3, 0.3);
        assert_eq!(split.train.len(), 3);
        assert!(split.val.is_empty());

        let split = split_of(0, 0.3);
        assert!(split.is_empty());
    }

    #[test]
    fn full_fraction() {
        let split = split_of(4, 1.0);
        assert!(split.train.is_empty());
        assert_eq!(split.val.len(), 4);
    }

    #[test]
    fn rejects_fraction_out_of_range() {
        assert!(matches!(
            split(vec![1, 2, 3], -0.1, None),
            Err(LesionError::InvalidFraction(_))
        ));
        assert!(split(vec![1, 2, 3], f64::NAN, None).is_err());
    }
}
