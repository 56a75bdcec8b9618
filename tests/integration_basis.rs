// SPDX-License-Identifier: AGPL-3.0-only
#![allow(clippy::unwrap_used)]

//! Integration tests: bitstring enumeration and the XOR encoder.
//!
//! Validates that tables built by the public API satisfy the algebraic
//! property the detection kernel relies on: XOR of any alpha and beta
//! partial index is a valid, unique global basis index.

use tidepool::bitstring::{binomial, count_bits, lexicographic_strings, FockStrings};
use tidepool::encoding::{build_index_tables, partial_index, Species, MAX_ENCODED_ORBITALS};
use tidepool::error::TidepoolError;

#[test]
fn fock_tables_cover_the_composite_basis() {
    for norb in 1..=4 {
        let fock = FockStrings::new(norb).unwrap();
        let alpha = build_index_tables(&fock.strings, norb, Species::Alpha).unwrap();
        let beta = build_index_tables(&fock.strings, norb, Species::Beta).unwrap();

        let dim = 1usize << (2 * norb);
        let mut hits = vec![0u32; dim];
        for &a in &alpha {
            for &b in &beta {
                hits[(a ^ b) as usize] += 1;
            }
        }
        assert!(
            hits.iter().all(|&h| h == 1),
            "norb={norb}: every global index must be produced exactly once"
        );
    }
}

#[test]
fn partial_indices_preserve_occupation() {
    // Bit placement permutes positions, never merges them.
    let norb = 6;
    let strings = lexicographic_strings(3, norb).unwrap();
    for &s in &strings {
        for species in [Species::Alpha, Species::Beta] {
            assert_eq!(count_bits(partial_index(s, norb, species)), count_bits(s));
        }
    }
}

#[test]
fn fixed_particle_tables_stay_in_range() {
    let norb = 5;
    let dim = 1u64 << (2 * norb);
    for nele in 0..=norb {
        let strings = lexicographic_strings(nele, norb).unwrap();
        assert_eq!(strings.len() as u64, binomial(norb, nele));
        for species in [Species::Alpha, Species::Beta] {
            let table = build_index_tables(&strings, norb, species).unwrap();
            assert!(table.iter().all(|&i| i < dim));
        }
    }
}

#[test]
fn alpha_beta_tables_differ_for_same_strings() {
    let norb = 4;
    let strings = lexicographic_strings(2, norb).unwrap();
    let alpha = build_index_tables(&strings, norb, Species::Alpha).unwrap();
    let beta = build_index_tables(&strings, norb, Species::Beta).unwrap();
    assert_ne!(alpha, beta, "species occupy different qubit sets");
}

#[test]
fn encoder_rejects_out_of_width_strings() {
    let norb = 3;
    let err = build_index_tables(&[0b1000], norb, Species::Alpha).unwrap_err();
    assert!(matches!(err, TidepoolError::StringWidth { position: 0, .. }));
}

#[test]
fn encoder_norb_limit_is_enforced() {
    let err = build_index_tables(&[0], MAX_ENCODED_ORBITALS + 1, Species::Beta).unwrap_err();
    assert!(matches!(err, TidepoolError::OrbitalLimit { .. }));
}
