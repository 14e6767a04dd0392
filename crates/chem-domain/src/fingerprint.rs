//! `Fingerprint` entity and wire-stable serialization (spec §3, §9).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported fingerprint algorithms (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintType {
    Morgan,
    Maccs,
    Rdkit,
    Pattern,
    Layered,
    AtomPairs,
    Torsion,
}

/// Canonical serialization of a fingerprint (spec §9): a dense bit vector
/// packed little-endian, or a sparse `(index, count)` list for count-based
/// fingerprints (atom pairs / torsions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FingerprintData {
    Dense { n_bits: u32, bytes: Vec<u8> },
    Sparse { entries: Vec<(u32, u32)> },
}

impl FingerprintData {
    /// Builds a dense bitset from bit indices (little-endian packed bytes).
    pub fn dense_from_bits(n_bits: u32, set_bits: impl IntoIterator<Item = u32>) -> Self {
        let mut bytes = vec![0u8; ((n_bits as usize) + 7) / 8];
        for bit in set_bits {
            if bit < n_bits {
                bytes[(bit / 8) as usize] |= 1 << (bit % 8);
            }
        }
        FingerprintData::Dense { n_bits, bytes }
    }

    pub fn popcount(&self) -> u32 {
        match self {
            FingerprintData::Dense { bytes, .. } => bytes.iter().map(|b| b.count_ones()).sum(),
            FingerprintData::Sparse { entries } => entries.iter().map(|(_, c)| if *c > 0 { 1 } else { 0 }).sum(),
        }
    }
}

/// Parameters used to generate a fingerprint, type-specific (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintParameters {
    pub radius: Option<u32>,
    pub n_bits: Option<u32>,
    pub min_path: Option<u32>,
    pub max_path: Option<u32>,
}

impl FingerprintParameters {
    pub fn morgan_default() -> Self {
        Self { radius: Some(2), n_bits: Some(2048), min_path: None, max_path: None }
    }

    pub fn rdkit_default() -> Self {
        Self { radius: None, n_bits: Some(2048), min_path: Some(1), max_path: Some(7) }
    }
}

/// A `(molecule_id, fingerprint_type)` row (spec §3, invariant I5: SMILES
/// change invalidates all fingerprints for a molecule).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fingerprint {
    pub molecule_id: Uuid,
    pub fingerprint_type: FingerprintType,
    pub parameters: FingerprintParameters,
    pub data: FingerprintData,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_roundtrip_popcount() {
        let fp = FingerprintData::dense_from_bits(16, [0, 1, 15]);
        assert_eq!(fp.popcount(), 3);
    }

    #[test]
    fn bits_outside_range_are_ignored() {
        let fp = FingerprintData::dense_from_bits(8, [100]);
        assert_eq!(fp.popcount(), 0);
    }
}
