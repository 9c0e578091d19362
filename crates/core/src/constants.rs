//! Shared timing constants

use std::time::Duration;

/// Pace of the orchestrator tick loop
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);

/// How long a provider stays on screen per turn unless configured otherwise
pub const DEFAULT_DISPLAY_DURATION: Duration = Duration::from_secs(15);

/// Upper bound for a single background content fetch
pub const DEFAULT_REFRESH_BUDGET: Duration = Duration::from_secs(10);

/// Consecutive sink failures tolerated before the loop gives up
pub const DEFAULT_MAX_SINK_FAILURES: u32 = 5;

/// Gap between stacked text lines
pub const LINE_GAP: u32 = 1;
