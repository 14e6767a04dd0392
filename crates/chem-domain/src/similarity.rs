//! Bit-vector similarity metrics (spec §4.1). Pure and deterministic: once
//! two fingerprints are decoded to a bit set, no chemistry engine is
//! needed, so this lives alongside the other shared value types rather
//! than behind the RDKit-backed engine crate — the Fingerprint Index needs
//! it without paying for a `pyo3` dependency.

use std::collections::HashSet;

use crate::errors::DomainError;
use crate::fingerprint::FingerprintData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMetric {
    Tanimoto,
    Dice,
    Cosine,
    Sokal,
    Russel,
    Kulczynski,
    McConnaughey,
}

impl SimilarityMetric {
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        match name.to_ascii_lowercase().as_str() {
            "tanimoto" => Ok(SimilarityMetric::Tanimoto),
            "dice" => Ok(SimilarityMetric::Dice),
            "cosine" => Ok(SimilarityMetric::Cosine),
            "sokal" => Ok(SimilarityMetric::Sokal),
            "russel" => Ok(SimilarityMetric::Russel),
            "kulczynski" => Ok(SimilarityMetric::Kulczynski),
            "mcconnaughey" => Ok(SimilarityMetric::McConnaughey),
            other => Err(DomainError::ValidationError(format!("unsupported similarity metric '{other}'"))),
        }
    }
}

impl Default for SimilarityMetric {
    fn default() -> Self {
        SimilarityMetric::Tanimoto
    }
}

fn bit_set(fp: &FingerprintData) -> HashSet<u32> {
    match fp {
        FingerprintData::Dense { bytes, .. } => {
            let mut set = HashSet::new();
            for (byte_idx, byte) in bytes.iter().enumerate() {
                for bit in 0..8u32 {
                    if byte & (1 << bit) != 0 {
                        set.insert((byte_idx as u32) * 8 + bit);
                    }
                }
            }
            set
        }
        FingerprintData::Sparse { entries } => {
            entries.iter().filter(|(_, count)| *count > 0).map(|(idx, _)| *idx).collect()
        }
    }
}

fn total_bits(fp: &FingerprintData) -> u32 {
    match fp {
        FingerprintData::Dense { n_bits, .. } => *n_bits,
        FingerprintData::Sparse { .. } => 0,
    }
}

/// Computes `similarity(fp_a, fp_b, metric) -> [0,1]` (spec §4.1).
pub fn similarity(fp_a: &FingerprintData, fp_b: &FingerprintData, metric: SimilarityMetric) -> f64 {
    let set_a = bit_set(fp_a);
    let set_b = bit_set(fp_b);
    let a = set_a.len() as f64;
    let b = set_b.len() as f64;
    let c = set_a.intersection(&set_b).count() as f64;

    let raw = match metric {
        SimilarityMetric::Tanimoto => {
            let denom = a + b - c;
            if denom == 0.0 { 1.0 } else { c / denom }
        }
        SimilarityMetric::Dice => {
            let denom = a + b;
            if denom == 0.0 { 1.0 } else { 2.0 * c / denom }
        }
        SimilarityMetric::Cosine => {
            if a == 0.0 || b == 0.0 { 0.0 } else { c / (a * b).sqrt() }
        }
        SimilarityMetric::Sokal => {
            let denom = 2.0 * (a + b) - 3.0 * c;
            if denom <= 0.0 { 1.0 } else { c / denom }
        }
        SimilarityMetric::Russel => {
            let n = total_bits(fp_a).max(total_bits(fp_b)) as f64;
            if n == 0.0 { 0.0 } else { c / n }
        }
        SimilarityMetric::Kulczynski => {
            if a == 0.0 || b == 0.0 { 0.0 } else { 0.5 * (c / a + c / b) }
        }
        SimilarityMetric::McConnaughey => {
            if a == 0.0 || b == 0.0 { 0.0 } else { (c * (a + b) - a * b) / (a * b) }
        }
    };
    raw.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense(bits: &[u32], n: u32) -> FingerprintData {
        FingerprintData::dense_from_bits(n, bits.iter().copied())
    }

    #[test]
    fn identical_fingerprints_are_maximally_similar() {
        let fp = dense(&[1, 2, 3], 16);
        assert_eq!(similarity(&fp, &fp, SimilarityMetric::Tanimoto), 1.0);
        assert_eq!(similarity(&fp, &fp, SimilarityMetric::Dice), 1.0);
    }

    #[test]
    fn disjoint_fingerprints_have_zero_tanimoto() {
        let a = dense(&[1, 2], 16);
        let b = dense(&[5, 6], 16);
        assert_eq!(similarity(&a, &b, SimilarityMetric::Tanimoto), 0.0);
    }

    #[test]
    fn empty_fingerprints_are_identical_by_convention() {
        let a = dense(&[], 16);
        let b = dense(&[], 16);
        assert_eq!(similarity(&a, &b, SimilarityMetric::Tanimoto), 1.0);
    }

    #[test]
    fn parse_rejects_unknown_metric() {
        assert!(SimilarityMetric::parse("jaccardish").is_err());
        assert!(matches!(SimilarityMetric::parse("Tanimoto"), Ok(SimilarityMetric::Tanimoto)));
    }

    #[test]
    fn result_is_always_within_unit_interval() {
        let a = dense(&[1, 2, 3, 4], 16);
        let b = dense(&[3, 4, 5], 16);
        for metric in
            [SimilarityMetric::Tanimoto, SimilarityMetric::Dice, SimilarityMetric::Cosine, SimilarityMetric::Sokal,
             SimilarityMetric::Russel, SimilarityMetric::Kulczynski, SimilarityMetric::McConnaughey]
        {
            let s = similarity(&a, &b, metric);
            assert!((0.0..=1.0).contains(&s), "{metric:?} produced {s}");
        }
    }
}
