// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Bench Logging

use tracing::Level;

/// Install the fmt subscriber. Engine `debug!` events show with `--verbose`.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
