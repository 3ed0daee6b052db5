//! Predicts how long a chart animation will run so recording can start and
//! stop at the right moments.
//!
//! Estimation gates a user-visible action and therefore never fails: missing
//! profiles and degenerate series sets fall back to a documented default
//! instead of returning an error.

use std::time::Duration;

use crate::model::{
    profile::{AnimationProfile, ChartKind},
    series::SeriesSet,
};

/// Fixed buffer absorbing render and encoder startup latency.
pub const DURATION_BUFFER_MS: u64 = 2000;

/// Estimates never drop below this, so at least one frame is always sampled.
pub const DURATION_FLOOR_MS: u64 = 1500;

/// Used when the profile is missing or the series set carries no data.
pub const FALLBACK_DURATION_MS: u64 = 4500;

/// Base animation duration assumed when the profile does not declare one.
pub const DEFAULT_BASE_MS: u64 = 2500;

/// Per-step duration assumed for race charts without an explicit value.
pub const DEFAULT_UPDATE_MS: u64 = 2000;

/// Predict the total wall-clock time of one chart animation.
///
/// Pure: the same inputs always produce the same output. Race-style charts
/// animate over discrete time steps and scale with the point count directly;
/// every other kind applies a kind-specific multiplier to its declared base
/// duration plus the accumulated per-point stagger.
pub fn estimate_duration(
    kind: ChartKind,
    profile: Option<&AnimationProfile>,
    series: &SeriesSet,
) -> Duration {
    let Some(profile) = profile else {
        tracing::warn!(kind = kind.as_str(), "animation profile missing, using fallback duration");
        return Duration::from_millis(FALLBACK_DURATION_MS);
    };

    if series.is_empty() {
        tracing::warn!(kind = kind.as_str(), "series set is empty, using fallback duration");
        return Duration::from_millis(FALLBACK_DURATION_MS);
    }

    let max_points = series.max_points().max(1) as f64;

    let total_ms = if kind == ChartKind::BarRace {
        let update = profile.update_duration_ms.unwrap_or(DEFAULT_UPDATE_MS) as f64;
        update * max_points + DURATION_BUFFER_MS as f64
    } else {
        let base = profile.base_duration_ms.unwrap_or(DEFAULT_BASE_MS) as f64;
        let delay = profile.per_point_delay_ms.unwrap_or(0) as f64;
        (base + delay * max_points) * kind_multiplier(kind) + DURATION_BUFFER_MS as f64
    };

    let total_ms = total_ms.round().max(DURATION_FLOOR_MS as f64) as u64;

    tracing::debug!(
        kind = kind.as_str(),
        profile = %profile.name,
        max_points,
        total_ms,
        "estimated animation duration"
    );

    Duration::from_millis(total_ms)
}

/// How much longer each kind's visual animation runs relative to its declared
/// base duration.
fn kind_multiplier(kind: ChartKind) -> f64 {
    match kind {
        ChartKind::Pie | ChartKind::Donut => 1.75,
        ChartKind::Line | ChartKind::Area => 1.5,
        ChartKind::VerticalBar | ChartKind::HorizontalBar => 1.25,
        ChartKind::BarRace => 1.0,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/estimate/duration.rs"]
mod tests;
