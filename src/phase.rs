// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Pre-Bonding Phase Schedule

use serde::Serialize;

/// A named regime covering `[start_fraction, end_fraction)` of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseDescriptor {
    pub name: &'static str,
    pub start_fraction: f64,
    pub end_fraction: f64,
    pub drift_bias: f64,
    pub volatility_multiplier: f64,
}

impl PhaseDescriptor {
    const fn new(
        name: &'static str,
        start_fraction: f64,
        end_fraction: f64,
        drift_bias: f64,
        volatility_multiplier: f64,
    ) -> Self {
        Self { name, start_fraction, end_fraction, drift_bias, volatility_multiplier }
    }

    pub fn contains(&self, progress: f64) -> bool {
        progress >= self.start_fraction && progress < self.end_fraction
    }
}

pub const PRE_BONDING_PHASES: [PhaseDescriptor; 6] = [
    PhaseDescriptor::new("early_accumulation", 0.0, 0.15, 0.002, 0.6),
    PhaseDescriptor::new("consolidation", 0.15, 0.35, 0.0, 0.4),
    PhaseDescriptor::new("pullback", 0.35, 0.45, -0.003, 1.3),
    PhaseDescriptor::new("recovery", 0.45, 0.65, 0.001, 1.1),
    PhaseDescriptor::new("breakout", 0.65, 0.8, 0.003, 1.4),
    PhaseDescriptor::new("final_push", 0.8, 1.0, 0.008, 1.5),
];

/// Ordered phase table looked up by generation progress.
#[derive(Debug, Clone, Copy)]
pub struct PhaseSchedule {
    phases: &'static [PhaseDescriptor],
}

impl PhaseSchedule {
    pub fn pre_bonding() -> Self {
        Self { phases: &PRE_BONDING_PHASES }
    }

    pub fn phases(&self) -> &'static [PhaseDescriptor] {
        self.phases
    }

    /// First phase whose half-open interval holds `progress`; the last phase
    /// covers `progress == 1.0` and anything past it.
    pub fn lookup(&self, progress: f64) -> &'static PhaseDescriptor {
        let phases: &'static [PhaseDescriptor] = self.phases;
        phases
            .iter()
            .find(|p| p.contains(progress))
            .unwrap_or(&phases[phases.len() - 1])
    }

    /// Linear progress of step `index` over `count` candles.
    pub fn progress(index: usize, count: usize) -> f64 {
        if count <= 1 {
            return 1.0;
        }
        index as f64 / (count - 1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_partition_unit_interval() {
        let phases = PhaseSchedule::pre_bonding().phases();
        assert_eq!(phases[0].start_fraction, 0.0);
        assert_eq!(phases[phases.len() - 1].end_fraction, 1.0);
        for pair in phases.windows(2) {
            assert_eq!(pair[0].end_fraction, pair[1].start_fraction);
        }
    }

    #[test]
    fn boundaries_are_half_open() {
        let schedule = PhaseSchedule::pre_bonding();
        assert_eq!(schedule.lookup(0.0).name, "early_accumulation");
        assert_eq!(schedule.lookup(0.1499).name, "early_accumulation");
        assert_eq!(schedule.lookup(0.15).name, "consolidation");
        assert_eq!(schedule.lookup(0.35).name, "pullback");
        assert_eq!(schedule.lookup(0.45).name, "recovery");
        assert_eq!(schedule.lookup(0.65).name, "breakout");
        assert_eq!(schedule.lookup(0.8).name, "final_push");
    }

    #[test]
    fn final_progress_falls_back_to_last_phase() {
        let schedule = PhaseSchedule::pre_bonding();
        assert_eq!(schedule.lookup(1.0).name, "final_push");
        assert_eq!(schedule.lookup(1.0).drift_bias, 0.008);
    }

    #[test]
    fn progress_spans_zero_to_one() {
        assert_eq!(PhaseSchedule::progress(0, 200), 0.0);
        assert_eq!(PhaseSchedule::progress(199, 200), 1.0);
        assert_eq!(PhaseSchedule::progress(0, 1), 1.0);
    }
}
