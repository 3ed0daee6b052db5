use super::*;

use crate::model::series::{DataPoint, DataSeries};

fn series_with(points: usize) -> SeriesSet {
    SeriesSet::new(vec![DataSeries {
        name: "s".to_string(),
        points: (0..points)
            .map(|i| DataPoint {
                label: format!("p{i}"),
                value: i as f64,
            })
            .collect(),
    }])
}

fn timed(base_ms: u64, delay_ms: u64) -> AnimationProfile {
    AnimationProfile {
        name: "t".to_string(),
        easing: "linear".to_string(),
        base_duration_ms: Some(base_ms),
        per_point_delay_ms: Some(delay_ms),
        update_duration_ms: None,
    }
}

#[test]
fn staggered_kinds_apply_multiplier_and_buffer() {
    // (1500 + 150 * 5) * 1.75 + 2000 = 5937.5, rounded half-up.
    let d = estimate_duration(ChartKind::Donut, Some(&timed(1500, 150)), &series_with(5));
    assert_eq!(d.as_millis(), 5938);

    // (2000 + 200 * 10) * 1.5 + 2000
    let d = estimate_duration(ChartKind::Line, Some(&timed(2000, 200)), &series_with(10));
    assert_eq!(d.as_millis(), 8000);

    // (1500 + 100 * 4) * 1.25 + 2000
    let d = estimate_duration(
        ChartKind::VerticalBar,
        Some(&timed(1500, 100)),
        &series_with(4),
    );
    assert_eq!(d.as_millis(), 4375);
}

#[test]
fn bar_race_scales_with_point_count() {
    let profile = AnimationProfile {
        name: "race".to_string(),
        easing: "linear".to_string(),
        base_duration_ms: None,
        per_point_delay_ms: None,
        update_duration_ms: Some(2000),
    };
    // 2000 * 8 + 2000
    let d = estimate_duration(ChartKind::BarRace, Some(&profile), &series_with(8));
    assert_eq!(d.as_millis(), 18000);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let bare = AnimationProfile {
        name: "bare".to_string(),
        easing: "linear".to_string(),
        base_duration_ms: None,
        per_point_delay_ms: None,
        update_duration_ms: None,
    };

    // (DEFAULT_BASE_MS + 0) * 1.25 + buffer
    let d = estimate_duration(ChartKind::HorizontalBar, Some(&bare), &series_with(3));
    assert_eq!(d.as_millis() as u64, DEFAULT_BASE_MS * 5 / 4 + DURATION_BUFFER_MS);

    // DEFAULT_UPDATE_MS * points + buffer
    let d = estimate_duration(ChartKind::BarRace, Some(&bare), &series_with(3));
    assert_eq!(d.as_millis() as u64, DEFAULT_UPDATE_MS * 3 + DURATION_BUFFER_MS);
}

#[test]
fn degenerate_inputs_use_the_fallback() {
    let d = estimate_duration(ChartKind::Pie, None, &series_with(5));
    assert_eq!(d.as_millis() as u64, FALLBACK_DURATION_MS);

    let d = estimate_duration(ChartKind::Pie, Some(&timed(1500, 150)), &series_with(0));
    assert_eq!(d.as_millis() as u64, FALLBACK_DURATION_MS);

    let d = estimate_duration(ChartKind::Pie, Some(&timed(1500, 150)), &SeriesSet::default());
    assert_eq!(d.as_millis() as u64, FALLBACK_DURATION_MS);
}

#[test]
fn estimates_never_drop_below_the_floor() {
    // A zeroed profile still yields at least the floor.
    let d = estimate_duration(ChartKind::Line, Some(&timed(0, 0)), &series_with(1));
    assert!(d.as_millis() as u64 >= DURATION_FLOOR_MS);
}

#[test]
fn estimation_is_deterministic() {
    let profile = timed(2500, 200);
    let series = series_with(7);
    let a = estimate_duration(ChartKind::Area, Some(&profile), &series);
    let b = estimate_duration(ChartKind::Area, Some(&profile), &series);
    assert_eq!(a, b);
}
