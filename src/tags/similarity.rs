//! Pairwise cosine distances between tag embeddings.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::Result;

/// Distance between two distinct tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRecord {
    pub key1: String,
    pub key2: String,
    pub cosine_distance: f32,
}

/// Cosine similarity; 0.0 for zero-norm or length-mismatched vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a > 0.0 && norm_b > 0.0 {
        (dot / (norm_a * norm_b)) as f32
    } else {
        0.0
    }
}

/// `1 - cosine_similarity`, kept inside [0, 2].
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    (1.0 - cosine_similarity(a, b)).clamp(0.0, 2.0)
}

/// Distance for every unordered pair, in (i, j) order with i < j.
///
/// No ranking is applied; use [`nearest_pairs`] for that.
pub fn pairwise_distances<K, V>(entries: &[(K, V)]) -> Vec<DistanceRecord>
where
    K: AsRef<str>,
    V: AsRef<[f32]>,
{
    let n = entries.len();
    let mut records = Vec::with_capacity(n.saturating_sub(1) * n / 2);

    for i in 0..n {
        let (key1, embedding1) = &entries[i];
        for (key2, embedding2) in &entries[i + 1..] {
            records.push(DistanceRecord {
                key1: key1.as_ref().to_string(),
                key2: key2.as_ref().to_string(),
                cosine_distance: cosine_distance(embedding1.as_ref(), embedding2.as_ref()),
            });
        }
    }

    records
}

/// The `k` closest pairs, smallest distance first.
pub fn nearest_pairs(records: &[DistanceRecord], k: usize) -> Vec<DistanceRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| a.cosine_distance.total_cmp(&b.cosine_distance));
    sorted.truncate(k);
    sorted
}

/// Write records as `key1,key2,cosine_distance` CSV, overwriting `path`.
pub fn write_csv(path: &Path, records: &[DistanceRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    if records.is_empty() {
        writer.write_record(["key1", "key2", "cosine_distance"])?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn entries(n: usize) -> Vec<(String, Vec<f32>)> {
        (0..n)
            .map(|i| {
                let x = i as f32 + 1.0;
                (format!("tag {}", i), vec![x, 1.0 / x, (x * 0.7).sin()])
            })
            .collect()
    }

    #[test]
    fn test_self_distance_is_zero() {
        let v = [0.3, -1.2, 4.5, 0.01];
        assert!(cosine_distance(&v, &v).abs() < 1e-6);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = [0.3, -1.2, 4.5];
        let b = [2.0, 0.5, -0.25];
        assert_eq!(cosine_distance(&a, &b), cosine_distance(&b, &a));
    }

    #[test]
    fn test_known_distances() {
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-6);
        assert!(cosine_distance(&[1.0, 1.0], &[3.0, 3.0]).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_vectors() {
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 2.0]), 1.0);
        assert_eq!(cosine_distance(&[1.0], &[1.0, 2.0]), 1.0);
    }

    #[test]
    fn test_pair_count_and_uniqueness() {
        for n in 0..8 {
            let records = pairwise_distances(&entries(n));
            assert_eq!(records.len(), n * n.saturating_sub(1) / 2);

            let mut seen = HashSet::new();
            for r in &records {
                assert_ne!(r.key1, r.key2);
                let pair = if r.key1 < r.key2 {
                    (r.key1.clone(), r.key2.clone())
                } else {
                    (r.key2.clone(), r.key1.clone())
                };
                assert!(seen.insert(pair), "duplicate pair {:?}", r);
            }
        }
    }

    #[test]
    fn test_pair_order_follows_input() {
        let records = pairwise_distances(&entries(3));
        let keys: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.key1.as_str(), r.key2.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("tag 0", "tag 1"), ("tag 0", "tag 2"), ("tag 1", "tag 2")]
        );
    }

    #[test]
    fn test_nearest_pairs() {
        let data = vec![
            ("gpu", vec![1.0, 0.0]),
            ("cuda", vec![0.9, 0.1]),
            ("cooking", vec![0.0, 1.0]),
        ];
        let records = pairwise_distances(&data);
        let nearest = nearest_pairs(&records, 2);

        assert_eq!(nearest.len(), 2);
        assert_eq!((nearest[0].key1.as_str(), nearest[0].key2.as_str()), ("gpu", "cuda"));
        assert!(nearest[0].cosine_distance <= nearest[1].cosine_distance);
    }

    #[test]
    fn test_write_csv() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("cosine_distances.csv");
        let records = vec![DistanceRecord {
            key1: "project, alpha".to_string(),
            key2: "needs review".to_string(),
            cosine_distance: 0.25,
        }];

        write_csv(&path, &records)?;
        let content = std::fs::read_to_string(&path)?;
        let mut lines = content.lines();

        assert_eq!(lines.next(), Some("key1,key2,cosine_distance"));
        assert_eq!(lines.next(), Some("\"project, alpha\",needs review,0.25"));
        assert_eq!(lines.next(), None);
        Ok(())
    }

    #[test]
    fn test_write_csv_empty_has_header() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("out.csv");

        write_csv(&path, &[])?;
        assert_eq!(
            std::fs::read_to_string(&path)?.trim_end(),
            "key1,key2,cosine_distance"
        );
        Ok(())
    }
}
