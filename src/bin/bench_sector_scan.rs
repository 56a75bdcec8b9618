// SPDX-License-Identifier: AGPL-3.0-only

//! Sector scan scaling benchmark.
//!
//! Times the parallel detection kernel over the full two-species Fock
//! space for increasing orbital counts. Pair count grows as `4^norb` and
//! the wavefunction as `4^norb` amplitudes, so the table stops at
//! `--max-norb` (default 9, ~256k amplitudes).

use std::time::Instant;
use tidepool::bitstring::FockStrings;
use tidepool::encoding::{build_index_tables, Species};
use tidepool::sector::{detect_sectors, SectorMatrix};
use tidepool::tolerances::DEFAULT_AMPLITUDE_THRESHOLD;
use tidepool::wavefunction::Wavefunction;

fn parse_max_norb() -> usize {
    let args: Vec<String> = std::env::args().collect();
    for pair in args.windows(2) {
        if pair[0] == "--max-norb" {
            if let Ok(n) = pair[1].parse::<usize>() {
                return n;
            }
        }
    }
    9
}

fn main() {
    let max_norb = parse_max_norb();

    println!("═══ Sector scan scaling benchmark ═══");
    println!("  Rayon threads: {}", rayon::current_num_threads());
    println!("  Threshold:     {DEFAULT_AMPLITUDE_THRESHOLD:.1e}");
    println!();
    println!(
        "  {:>4} {:>10} {:>14} {:>8} {:>10} {:>12}",
        "norb", "states", "pairs", "active", "ms", "pairs/s"
    );

    for norb in 2..=max_norb {
        let fock = FockStrings::new(norb).expect("norb within limits");
        let alpha_table =
            build_index_tables(&fock.strings, norb, Species::Alpha).expect("alpha tables");
        let beta_table =
            build_index_tables(&fock.strings, norb, Species::Beta).expect("beta tables");
        let wfn = Wavefunction::random(2 * norb, 0xCAFE + norb as u64);

        let mut sectors = SectorMatrix::new(norb);
        let start = Instant::now();
        detect_sectors(
            wfn.as_slice(),
            DEFAULT_AMPLITUDE_THRESHOLD,
            &mut sectors,
            &alpha_table,
            &beta_table,
            &fock.occupations,
            &fock.occupations,
        )
        .expect("scan");
        let elapsed = start.elapsed();

        let states = fock.len();
        let pairs = states * states;
        let ms = elapsed.as_secs_f64() * 1e3;
        let rate = pairs as f64 / elapsed.as_secs_f64();
        println!(
            "  {:>4} {:>10} {:>14} {:>8} {:>10.3} {:>12.3e}",
            norb,
            states,
            pairs,
            sectors.active_count(),
            ms,
            rate
        );
    }
}
