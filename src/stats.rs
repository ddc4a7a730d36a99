// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Sample Statistics

/// Arithmetic mean; `0.0` for an empty slice.
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Unbiased sample variance; `0.0` below two samples.
pub fn variance(samples: &[f64]) -> f64 {
    let n = samples.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(samples);
    samples.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

pub fn std_dev(samples: &[f64]) -> f64 {
    variance(samples).sqrt()
}
