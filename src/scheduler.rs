use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use tracing::{error, info};

use crate::remote::Sleeper;

/// Runs `sweep` forever (or `max_cycles` times), pausing `interval` after
/// each run. A failing sweep is logged and the loop carries on.
pub fn run_periodic<F, S>(
    interval: Duration,
    sleeper: &S,
    max_cycles: Option<usize>,
    mut sweep: F,
) -> usize
where
    F: FnMut() -> Result<()>,
    S: Sleeper + ?Sized,
{
    let mut cycles = 0usize;
    loop {
        if max_cycles.is_some_and(|max| cycles >= max) {
            return cycles;
        }
        cycles += 1;

        info!(cycle = cycles, "starting scheduled dataset update");
        match sweep() {
            Ok(()) => info!(cycle = cycles, "scheduled update finished"),
            Err(err) => error!(cycle = cycles, error = %format!("{err:#}"), "scheduled update failed"),
        }

        let next = chrono::Duration::from_std(interval)
            .ok()
            .and_then(|d| Local::now().checked_add_signed(d));
        match next {
            Some(at) => info!(
                hours = interval.as_secs() / 3600,
                next_run = %at.format("%Y-%m-%d %H:%M"),
                "waiting for next update"
            ),
            None => info!(hours = interval.as_secs() / 3600, "waiting for next update"),
        }
        sleeper.sleep(interval);
    }
}
