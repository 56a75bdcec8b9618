// SPDX-License-Identifier: AGPL-3.0-only

//! Typed errors for sector-detection boundary validation.
//!
//! The detection kernel validates its inputs before entering the parallel
//! region and fails fast with one of these variants instead of reproducing
//! the undefined behavior of an unchecked hot path. Callers can
//! pattern-match on the failure mode rather than parsing opaque strings.

use std::fmt;

/// Errors raised by input validation ahead of the detection kernel.
#[derive(Debug, Clone, PartialEq)]
pub enum TidepoolError {
    /// Index table and occupation table lengths disagree for one species.
    LengthMismatch {
        species: &'static str,
        index_len: usize,
        occupation_len: usize,
    },

    /// Orbital count exceeds what u64 bitstrings (or the host address
    /// space) can represent.
    OrbitalLimit { norb: usize, limit: usize },

    /// Wavefunction length is not `2^(2*norb)`.
    WavefunctionSize { expected: usize, actual: usize },

    /// A partial index would address past the end of the wavefunction.
    IndexOutOfRange {
        species: &'static str,
        position: usize,
        index: u64,
        dim: usize,
    },

    /// An occupation count exceeds the orbital count.
    OccupationOutOfRange {
        species: &'static str,
        position: usize,
        occupation: u32,
        norb: usize,
    },

    /// A configuration bitstring sets bits above the orbital count.
    StringWidth {
        species: &'static str,
        position: usize,
        string: u64,
        norb: usize,
    },

    /// Threshold is negative, NaN, or infinite.
    BadThreshold { threshold: f64 },
}

impl fmt::Display for TidepoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch {
                species,
                index_len,
                occupation_len,
            } => write!(
                f,
                "{species} index table has {index_len} entries but occupation table has {occupation_len}"
            ),
            Self::OrbitalLimit { norb, limit } => {
                write!(f, "norb={norb} exceeds the supported limit of {limit}")
            }
            Self::WavefunctionSize { expected, actual } => write!(
                f,
                "wavefunction has {actual} amplitudes, expected {expected} (2^(2*norb))"
            ),
            Self::IndexOutOfRange {
                species,
                position,
                index,
                dim,
            } => write!(
                f,
                "{species} partial index {index} at position {position} exceeds wavefunction dimension {dim}"
            ),
            Self::OccupationOutOfRange {
                species,
                position,
                occupation,
                norb,
            } => write!(
                f,
                "{species} occupation {occupation} at position {position} exceeds norb={norb}"
            ),
            Self::StringWidth {
                species,
                position,
                string,
                norb,
            } => write!(
                f,
                "{species} bitstring {string:#b} at position {position} sets bits above orbital {norb}"
            ),
            Self::BadThreshold { threshold } => {
                write!(f, "threshold {threshold} must be finite and non-negative")
            }
        }
    }
}

impl std::error::Error for TidepoolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_length_mismatch() {
        let err = TidepoolError::LengthMismatch {
            species: "alpha",
            index_len: 4,
            occupation_len: 3,
        };
        assert_eq!(
            err.to_string(),
            "alpha index table has 4 entries but occupation table has 3"
        );
    }

    #[test]
    fn display_orbital_limit() {
        let err = TidepoolError::OrbitalLimit { norb: 70, limit: 63 };
        assert!(err.to_string().contains("norb=70"));
        assert!(err.to_string().contains("63"));
    }

    #[test]
    fn display_wavefunction_size() {
        let err = TidepoolError::WavefunctionSize {
            expected: 16,
            actual: 8,
        };
        assert!(err.to_string().contains("8 amplitudes"));
        assert!(err.to_string().contains("expected 16"));
    }

    #[test]
    fn display_bad_threshold() {
        let err = TidepoolError::BadThreshold { threshold: -1.0 };
        assert!(err.to_string().contains("-1"));
    }

    #[test]
    fn error_trait_works() {
        let err = TidepoolError::BadThreshold {
            threshold: f64::NAN,
        };
        let dyn_err: &dyn std::error::Error = &err;
        assert!(dyn_err.to_string().contains("finite"));
    }
}
