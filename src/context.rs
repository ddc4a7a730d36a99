// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Generation Context

const MOMENTUM_DECAY: f64 = 0.85;
const MEMORY_DECAY: f64 = 0.97;

/// Starting volume average as a fraction of the opening cap.
pub const VOLUME_TO_CAP: f64 = 0.05;

/// Mutable state threaded through one generation run. Owned by the run and
/// dropped when it finishes; nothing here outlives a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationContext {
    pub current_cap: f64,
    /// EMA of recent returns (0.85 / 0.15).
    pub momentum: f64,
    /// EMA of returns over a longer horizon (0.97 / 0.03).
    pub memory: f64,
    pub volume_avg: f64,
    pub step: usize,
}

impl GenerationContext {
    pub fn new(start_cap: f64) -> Self {
        Self {
            current_cap: start_cap,
            momentum: 0.0,
            memory: 0.0,
            volume_avg: start_cap * VOLUME_TO_CAP,
            step: 0,
        }
    }

    /// Continue from another segment's cap and volume, with fresh filters.
    pub fn continue_from(previous: &GenerationContext) -> Self {
        Self {
            volume_avg: previous.volume_avg,
            ..Self::new(previous.current_cap)
        }
    }

    pub fn absorb_return(&mut self, total_return: f64) {
        self.momentum = self.momentum * MOMENTUM_DECAY + total_return * (1.0 - MOMENTUM_DECAY);
        self.memory = self.memory * MEMORY_DECAY + total_return * (1.0 - MEMORY_DECAY);
    }

    /// Fold a new volume into the running average with the given decay.
    pub fn absorb_volume(&mut self, volume: f64, decay: f64) {
        self.volume_avg = self.volume_avg * decay + volume * (1.0 - decay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_follow_ema_weights() {
        let mut ctx = GenerationContext::new(1000.0);
        ctx.absorb_return(0.1);
        assert!((ctx.momentum - 0.015).abs() < 1e-12);
        assert!((ctx.memory - 0.003).abs() < 1e-12);
        ctx.absorb_return(0.0);
        assert!((ctx.momentum - 0.015 * 0.85).abs() < 1e-12);
        assert!((ctx.memory - 0.003 * 0.97).abs() < 1e-12);
    }

    #[test]
    fn volume_ema() {
        let mut ctx = GenerationContext::new(1000.0);
        assert_eq!(ctx.volume_avg, 50.0);
        ctx.absorb_volume(150.0, 0.98);
        assert!((ctx.volume_avg - 52.0).abs() < 1e-12);
    }

    #[test]
    fn continuation_resets_filters() {
        let mut ctx = GenerationContext::new(1000.0);
        ctx.absorb_return(0.3);
        ctx.current_cap = 4242.0;
        ctx.step = 17;
        let next = GenerationContext::continue_from(&ctx);
        assert_eq!(next.current_cap, 4242.0);
        assert_eq!(next.volume_avg, ctx.volume_avg);
        assert_eq!(next.momentum, 0.0);
        assert_eq!(next.step, 0);
    }
}
