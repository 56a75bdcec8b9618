// SPDX-License-Identifier: AGPL-3.0-only

//! Sector-activity detection over externally encoded wavefunctions.
//!
//! A sector is a (total particle number, spin-projection shift) pair. The
//! kernel scans every (alpha, beta) configuration pair, recovers the global
//! basis index as `alpha_index XOR beta_index`, and marks the pair's sector
//! whenever the amplitude there clears the threshold:
//!
//!   particles  = alpha_occ + beta_occ            ∈ [0, 2*norb]
//!   spin_shift = alpha_occ - beta_occ + norb     ∈ [0, 2*norb]
//!
//! This works for any linear (mod 2) encoder; how the index tables were
//! built is the caller's concern. The outer alpha loop is data-parallel
//! over the Rayon pool with the inner beta loop sequential in each worker.
//! Every worker folds into a private flag grid and the grids are merged by
//! bitwise OR after the join, so the marked-cell set is independent of the
//! worker count and no cell is ever written concurrently.
//!
//! All structural preconditions (table lengths, index ranges, occupation
//! bounds, wavefunction dimension) are checked before the parallel region;
//! past that point the kernel raises nothing and its only observable effect
//! is mutation of the sector matrix.

use crate::error::TidepoolError;
use num_complex::Complex64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Cell sentinel for a populated sector.
const ACTIVE: u8 = 1;

/// Flag grid over (particle number, spin shift), both dimensions `2*norb+1`.
///
/// Row index = total particle count, column index = spin shift. Stored
/// row-major in a flat vector, leading dimension `2*norb+1`.
#[derive(Debug, Clone)]
pub struct SectorMatrix {
    norb: usize,
    dim: usize,
    flags: Vec<u8>,
}

impl SectorMatrix {
    /// Zeroed grid for `norb` spatial orbitals per species.
    #[must_use]
    pub fn new(norb: usize) -> Self {
        let dim = 2 * norb + 1;
        Self {
            norb,
            dim,
            flags: vec![0; dim * dim],
        }
    }

    #[must_use]
    pub fn norb(&self) -> usize {
        self.norb
    }

    /// Grid edge length, `2*norb + 1`.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    fn offset(&self, particles: usize, spin_shift: usize) -> usize {
        particles * self.dim + spin_shift
    }

    /// Mark sector (particles, spin_shift) as populated. Idempotent.
    #[inline]
    pub fn mark(&mut self, particles: usize, spin_shift: usize) {
        let offset = self.offset(particles, spin_shift);
        self.flags[offset] = ACTIVE;
    }

    #[must_use]
    pub fn is_active(&self, particles: usize, spin_shift: usize) -> bool {
        self.flags[self.offset(particles, spin_shift)] == ACTIVE
    }

    /// Number of marked cells.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f == ACTIVE).count()
    }

    /// Marked (particles, spin_shift) pairs in row-major order.
    #[must_use]
    pub fn active_sectors(&self) -> Vec<(usize, usize)> {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, &f)| f == ACTIVE)
            .map(|(offset, _)| (offset / self.dim, offset % self.dim))
            .collect()
    }

    /// OR another grid of the same shape into this one.
    pub fn merge_from(&mut self, other: &Self) {
        debug_assert_eq!(self.dim, other.dim, "merge of mismatched grids");
        for (mine, theirs) in self.flags.iter_mut().zip(&other.flags) {
            *mine |= theirs;
        }
    }

    /// Serializable summary for validation binaries.
    #[must_use]
    pub fn report(&self) -> SectorReport {
        SectorReport {
            norb: self.norb,
            active: self
                .active_sectors()
                .into_iter()
                .map(|(particles, spin_shift)| ActiveSector {
                    particles,
                    spin_shift,
                })
                .collect(),
        }
    }
}

/// One populated sector in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSector {
    pub particles: usize,
    pub spin_shift: usize,
}

/// Machine-readable detection summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorReport {
    pub norb: usize,
    pub active: Vec<ActiveSector>,
}

/// Scan all (alpha, beta) pairs and mark populated sectors.
///
/// `sectors` carries `norb`; the species state counts are the table slice
/// lengths. Index tables hold the per-species partial indices whose XOR is
/// the global basis index; occupation tables hold the per-configuration
/// particle counts.
///
/// A pair marks its sector when its squared amplitude magnitude is at
/// least `threshold²` and nonzero, so an exactly-zero amplitude never
/// registers even at `threshold == 0`.
pub fn detect_sectors(
    wavefunction: &[Complex64],
    threshold: f64,
    sectors: &mut SectorMatrix,
    alpha_index_table: &[u64],
    beta_index_table: &[u64],
    alpha_occupation: &[u32],
    beta_occupation: &[u32],
) -> Result<(), TidepoolError> {
    let norb = sectors.norb();
    validate_inputs(
        wavefunction,
        threshold,
        norb,
        alpha_index_table,
        beta_index_table,
        alpha_occupation,
        beta_occupation,
    )?;

    let threshold_sq = threshold * threshold;
    let merged = alpha_index_table
        .par_iter()
        .zip(alpha_occupation.par_iter())
        .fold(
            || SectorMatrix::new(norb),
            |mut local, (&alpha_index, &alpha_occ)| {
                for (&beta_index, &beta_occ) in beta_index_table.iter().zip(beta_occupation) {
                    let global = (alpha_index ^ beta_index) as usize;
                    let mag_sq = wavefunction[global].norm_sqr();
                    if mag_sq < threshold_sq || mag_sq == 0.0 {
                        continue;
                    }
                    let particles = (alpha_occ + beta_occ) as usize;
                    let spin_shift = alpha_occ as usize + norb - beta_occ as usize;
                    local.mark(particles, spin_shift);
                }
                local
            },
        )
        .reduce(
            || SectorMatrix::new(norb),
            |mut left, right| {
                left.merge_from(&right);
                left
            },
        );

    sectors.merge_from(&merged);
    Ok(())
}

fn validate_inputs(
    wavefunction: &[Complex64],
    threshold: f64,
    norb: usize,
    alpha_index_table: &[u64],
    beta_index_table: &[u64],
    alpha_occupation: &[u32],
    beta_occupation: &[u32],
) -> Result<(), TidepoolError> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(TidepoolError::BadThreshold { threshold });
    }

    // The wavefunction is addressed by 2*norb qubit bits.
    let qubit_limit = usize::BITS as usize - 1;
    if 2 * norb >= qubit_limit {
        return Err(TidepoolError::OrbitalLimit {
            norb,
            limit: qubit_limit / 2,
        });
    }
    let dim = 1usize << (2 * norb);
    if wavefunction.len() != dim {
        return Err(TidepoolError::WavefunctionSize {
            expected: dim,
            actual: wavefunction.len(),
        });
    }

    validate_species("alpha", alpha_index_table, alpha_occupation, dim, norb)?;
    validate_species("beta", beta_index_table, beta_occupation, dim, norb)
}

/// Both partial indices in range of a power-of-two wavefunction guarantee
/// the XOR-combined global index is in range too.
fn validate_species(
    species: &'static str,
    index_table: &[u64],
    occupation: &[u32],
    dim: usize,
    norb: usize,
) -> Result<(), TidepoolError> {
    if index_table.len() != occupation.len() {
        return Err(TidepoolError::LengthMismatch {
            species,
            index_len: index_table.len(),
            occupation_len: occupation.len(),
        });
    }
    for (position, &index) in index_table.iter().enumerate() {
        if index >= dim as u64 {
            return Err(TidepoolError::IndexOutOfRange {
                species,
                position,
                index,
                dim,
            });
        }
    }
    for (position, &occ) in occupation.iter().enumerate() {
        if occ as usize > norb {
            return Err(TidepoolError::OccupationOutOfRange {
                species,
                position,
                occupation: occ,
                norb,
            });
        }
    }
    Ok(())
}
