// SPDX-License-Identifier: AGPL-3.0-only

//! Sector Detection Validation
//!
//! Validates the parallel detection kernel against:
//!   - a pinned single-amplitude scenario with known sector content
//!   - the zero-threshold edge case (exact zeros never register)
//!   - a brute-force serial reference over a random wavefunction
//!   - threshold monotonicity, idempotence, and worker-count determinism
//!
//! Pass `--json` to also emit a machine-readable summary of the detected
//! sectors for the random-wavefunction case.

use num_complex::Complex64;
use rayon::ThreadPoolBuilder;
use tidepool::bitstring::FockStrings;
use tidepool::encoding::{build_index_tables, Species};
use tidepool::sector::{detect_sectors, SectorMatrix};
use tidepool::tolerances::EXACT_F64;
use tidepool::validation::ValidationHarness;
use tidepool::wavefunction::Wavefunction;

// ═══════════════════════════════════════════════════════════════════
// CPU Reference Implementation (serial brute force)
// ═══════════════════════════════════════════════════════════════════

/// Serial reference: identical contract to `detect_sectors`, written as the
/// obvious nested loop with no parallelism and no early validation.
fn detect_sectors_reference(
    wavefunction: &[Complex64],
    threshold: f64,
    norb: usize,
    alpha_index_table: &[u64],
    beta_index_table: &[u64],
    alpha_occupation: &[u32],
    beta_occupation: &[u32],
) -> SectorMatrix {
    let mut sectors = SectorMatrix::new(norb);
    for (a, &alpha_index) in alpha_index_table.iter().enumerate() {
        for (b, &beta_index) in beta_index_table.iter().enumerate() {
            let amplitude = wavefunction[(alpha_index ^ beta_index) as usize];
            let magnitude = amplitude.norm();
            if magnitude < threshold || magnitude == 0.0 {
                continue;
            }
            let alpha_occ = alpha_occupation[a] as usize;
            let beta_occ = beta_occupation[b] as usize;
            sectors.mark(alpha_occ + beta_occ, alpha_occ + norb - beta_occ);
        }
    }
    sectors
}

/// Full-Fock tables for one norb: (alpha indices, beta indices, occupations).
fn fock_tables(norb: usize) -> (Vec<u64>, Vec<u64>, Vec<u32>) {
    let fock = FockStrings::new(norb).expect("norb within limits");
    let alpha = build_index_tables(&fock.strings, norb, Species::Alpha).expect("alpha tables");
    let beta = build_index_tables(&fock.strings, norb, Species::Beta).expect("beta tables");
    (alpha, beta, fock.occupations)
}

fn main() {
    let emit_json = std::env::args().any(|a| a == "--json");
    let mut harness = ValidationHarness::new("sector_scan");

    println!("═══ Sector detection validation ═══");
    println!("  Rayon threads: {}", rayon::current_num_threads());

    // ── Pinned scenario: norb=1, single amplitude at global index 3 ──
    {
        let mut wfn = Wavefunction::zeros(2);
        wfn.set(3, Complex64::new(1.0, 0.0));
        harness.check_abs("pinned amplitude magnitude", wfn.get(3).norm(), 1.0, EXACT_F64);

        let mut sectors = SectorMatrix::new(1);
        let result = detect_sectors(
            wfn.as_slice(),
            0.5,
            &mut sectors,
            &[0, 1],
            &[0, 2],
            &[0, 1],
            &[0, 1],
        );
        harness.check_bool("pinned scenario accepted", result.is_ok());
        harness.check_bool("pinned cell (2, 1) active", sectors.is_active(2, 1));
        harness.check_count("pinned active cell count", sectors.active_count(), 1);
    }

    // ── Zero-threshold edge: exact zero amplitude never registers ──
    {
        let mut wfn = Wavefunction::zeros(2);
        wfn.set(3, Complex64::new(1.0, 0.0));
        let mut sectors = SectorMatrix::new(1);
        detect_sectors(
            wfn.as_slice(),
            0.0,
            &mut sectors,
            &[0, 1],
            &[0, 2],
            &[0, 1],
            &[0, 1],
        )
        .expect("zero-threshold scan");
        harness.check_bool("zero threshold skips cell (0, 1)", !sectors.is_active(0, 1));
        harness.check_count("zero threshold active count", sectors.active_count(), 1);
    }

    // ── Random wavefunction vs brute force, full Fock space, norb=3 ──
    let norb = 3;
    let threshold = 0.05;
    let (alpha_table, beta_table, occupations) = fock_tables(norb);
    let wfn = Wavefunction::random(2 * norb, 0xB10_F15);

    let mut parallel = SectorMatrix::new(norb);
    detect_sectors(
        wfn.as_slice(),
        threshold,
        &mut parallel,
        &alpha_table,
        &beta_table,
        &occupations,
        &occupations,
    )
    .expect("random scan");
    let reference = detect_sectors_reference(
        wfn.as_slice(),
        threshold,
        norb,
        &alpha_table,
        &beta_table,
        &occupations,
        &occupations,
    );
    harness.check_bool(
        "parallel matches brute-force reference",
        parallel.active_sectors() == reference.active_sectors(),
    );
    harness.check_bool("random scan found sectors", parallel.active_count() > 0);

    // ── Threshold monotonicity: marked set shrinks as threshold grows ──
    {
        let mut loose = SectorMatrix::new(norb);
        let mut tight = SectorMatrix::new(norb);
        detect_sectors(
            wfn.as_slice(),
            0.01,
            &mut loose,
            &alpha_table,
            &beta_table,
            &occupations,
            &occupations,
        )
        .expect("loose scan");
        detect_sectors(
            wfn.as_slice(),
            0.2,
            &mut tight,
            &alpha_table,
            &beta_table,
            &occupations,
            &occupations,
        )
        .expect("tight scan");
        let superset = tight
            .active_sectors()
            .iter()
            .all(|&(p, s)| loose.is_active(p, s));
        harness.check_bool("threshold monotonicity", superset);
    }

    // ── Idempotence: re-running onto the same grid changes nothing ──
    {
        let before = parallel.active_sectors();
        detect_sectors(
            wfn.as_slice(),
            threshold,
            &mut parallel,
            &alpha_table,
            &beta_table,
            &occupations,
            &occupations,
        )
        .expect("second scan");
        harness.check_bool("idempotent re-scan", parallel.active_sectors() == before);
    }

    // ── Worker-count determinism: 1 worker vs the default pool ──
    {
        let single = ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .expect("single-thread pool");
        let mut serial_pool = SectorMatrix::new(norb);
        single.install(|| {
            detect_sectors(
                wfn.as_slice(),
                threshold,
                &mut serial_pool,
                &alpha_table,
                &beta_table,
                &occupations,
                &occupations,
            )
        })
        .expect("single-worker scan");
        harness.check_bool(
            "worker-count determinism",
            serial_pool.active_sectors() == parallel.active_sectors(),
        );
    }

    if emit_json {
        let summary = serde_json::json!({
            "binary": "validate_sectors",
            "norb": norb,
            "threshold": threshold,
            "sectors": parallel.report(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("summary serialization failed: {e}"),
        }
    }

    harness.finish();
}
