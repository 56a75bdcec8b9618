// SPDX-License-Identifier: AGPL-3.0-only

//! Check bookkeeping for validation binaries.
//!
//! Every `validate_*` binary follows the same pattern: explicit checks
//! against pinned expectations, a printed summary, and exit code 0 only
//! when every check passed.

use std::process;

/// A single check with its outcome and a human-readable detail line.
#[derive(Debug, Clone)]
pub struct Check {
    pub label: String,
    pub passed: bool,
    pub detail: String,
}

/// Accumulates checks and produces a summary with exit code.
#[derive(Debug, Default)]
#[must_use]
pub struct ValidationHarness {
    pub name: String,
    pub checks: Vec<Check>,
}

impl ValidationHarness {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            checks: Vec::new(),
        }
    }

    /// Boolean pass/fail check.
    pub fn check_bool(&mut self, label: &str, passed: bool) {
        self.checks.push(Check {
            label: label.to_string(),
            passed,
            detail: String::new(),
        });
    }

    /// Exact count check.
    pub fn check_count(&mut self, label: &str, observed: usize, expected: usize) {
        self.checks.push(Check {
            label: label.to_string(),
            passed: observed == expected,
            detail: format!("observed={observed}, expected={expected}"),
        });
    }

    /// Absolute tolerance check: |observed - expected| < tolerance.
    pub fn check_abs(&mut self, label: &str, observed: f64, expected: f64, tolerance: f64) {
        let err = (observed - expected).abs();
        self.checks.push(Check {
            label: label.to_string(),
            passed: err < tolerance,
            detail: format!("observed={observed:.6e}, expected={expected:.6e}, err={err:.2e}"),
        });
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.checks.len()
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Print summary and exit 0 (all passed) or 1.
    pub fn finish(&self) -> ! {
        println!("{}", self.format_summary());
        if self.all_passed() {
            println!("ALL CHECKS PASSED");
            process::exit(0);
        } else {
            let failed: Vec<&str> = self
                .checks
                .iter()
                .filter(|c| !c.passed)
                .map(|c| c.label.as_str())
                .collect();
            println!("FAILED CHECKS: {}", failed.join(", "));
            process::exit(1);
        }
    }

    /// Format the summary (separate from `finish` so tests can inspect it).
    #[must_use]
    pub fn format_summary(&self) -> String {
        use std::fmt::Write;
        let mut s = String::new();
        let _ = writeln!(
            s,
            "═══ {} validation: {}/{} checks passed ═══",
            self.name,
            self.passed_count(),
            self.total_count()
        );
        for check in &self.checks {
            let icon = if check.passed { "✓" } else { "✗" };
            if check.detail.is_empty() {
                let _ = writeln!(s, "  {icon} {}", check.label);
            } else {
                let _ = writeln!(s, "  {icon} {}: {}", check.label, check.detail);
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harness_tracks_pass_fail() {
        let mut h = ValidationHarness::new("test");
        h.check_bool("yes", true);
        h.check_count("count", 2, 2);
        h.check_count("off_by_one", 2, 3);
        assert_eq!(h.passed_count(), 2);
        assert_eq!(h.total_count(), 3);
        assert!(!h.all_passed());
    }

    #[test]
    fn check_abs_within_tolerance() {
        let mut h = ValidationHarness::new("test");
        h.check_abs("close", 1.0001, 1.0, 1e-3);
        h.check_abs("far", 2.0, 1.0, 1e-3);
        assert!(h.checks[0].passed);
        assert!(!h.checks[1].passed);
    }

    #[test]
    fn empty_harness_vacuously_passes() {
        let h = ValidationHarness::new("empty");
        assert!(h.all_passed());
        assert_eq!(h.total_count(), 0);
    }

    #[test]
    fn format_summary_contains_name_and_counts() {
        let mut h = ValidationHarness::new("sector_scan");
        h.check_bool("a", true);
        h.check_count("b", 1, 2);
        let s = h.format_summary();
        assert!(s.contains("sector_scan"));
        assert!(s.contains("1/2"));
        assert!(s.contains('✓'));
        assert!(s.contains('✗'));
    }
}
