//! Consecutive dry days and the drought multiplier.

use chrono::{DateTime, Duration, Utc};
use nowcast_common::WeatherSample;

/// Span assumed for a lone entry with no neighbour to measure against.
const DEFAULT_TICK_HOURS: i64 = 3;

/// Whole dry days ending at `now`.
///
/// Entries valid at or before `now` are scanned newest first. Each entry
/// covers the interval back to the next older entry, so hourly and
/// three-hourly series count the same wall-clock time. The scan stops at the
/// first wet entry and the accumulated dry span is divided into days.
pub fn count_dry_days(entries: &[WeatherSample], now: DateTime<Utc>) -> u32 {
    let mut past: Vec<&WeatherSample> = entries.iter().filter(|e| e.valid_time <= now).collect();
    past.sort_by(|a, b| b.valid_time.cmp(&a.valid_time));

    let mut dry = Duration::zero();
    let mut last_step = Duration::hours(DEFAULT_TICK_HOURS);
    for (i, entry) in past.iter().enumerate() {
        if !entry.is_dry() {
            break;
        }
        let step = match past.get(i + 1) {
            Some(older) => entry.valid_time - older.valid_time,
            // Oldest entry: reuse the spacing seen so far.
            None => last_step,
        };
        dry = dry + step;
        last_step = step;
    }

    (dry.num_hours().max(0) / 24) as u32
}

/// Risk multiplier for a dry spell: 1.0 up to two days, then rising to a cap of 1.4.
pub fn drought_factor(dry_days: u32) -> f64 {
    if dry_days <= 2 {
        return 1.0;
    }
    (1.0 + ((dry_days - 2) as f64 / 5.0) * 0.4).min(1.4)
}
