use super::*;

#[test]
fn chart_kind_round_trips_through_str() {
    for kind in [
        ChartKind::Line,
        ChartKind::Area,
        ChartKind::Pie,
        ChartKind::Donut,
        ChartKind::VerticalBar,
        ChartKind::HorizontalBar,
        ChartKind::BarRace,
    ] {
        assert_eq!(kind.as_str().parse::<ChartKind>().unwrap(), kind);
    }
    assert!("scatter".parse::<ChartKind>().is_err());
}

#[test]
fn builtin_catalog_has_expected_timings() {
    let catalog = ProfileCatalog::builtin();

    let basic = catalog.get(ChartKind::VerticalBar, "basic").unwrap();
    assert_eq!(basic.base_duration_ms, Some(1500));
    assert_eq!(basic.per_point_delay_ms, Some(100));
    assert_eq!(basic.update_duration_ms, None);

    let race = catalog.get(ChartKind::BarRace, "standard").unwrap();
    assert_eq!(race.update_duration_ms, Some(2000));
    assert_eq!(race.base_duration_ms, None);

    let elastic = catalog.get(ChartKind::Line, "elastic").unwrap();
    assert_eq!(elastic.base_duration_ms, Some(3500));
}

#[test]
fn lookup_misses_return_none() {
    let catalog = ProfileCatalog::builtin();
    assert!(catalog.get(ChartKind::Pie, "wave").is_none());
    assert!(catalog.get(ChartKind::BarRace, "bounce").is_none());
}

#[test]
fn styles_for_is_sorted() {
    let catalog = ProfileCatalog::builtin();
    let styles = catalog.styles_for(ChartKind::Pie);
    assert_eq!(styles, vec!["bounce", "expand", "pop_out", "rotate"]);
}

#[test]
fn profile_serde_uses_camel_case() {
    let profile = ProfileCatalog::builtin()
        .get(ChartKind::Area, "smooth")
        .cloned()
        .unwrap();
    let json = serde_json::to_string(&profile).unwrap();
    assert!(json.contains("\"baseDurationMs\""));
    assert!(json.contains("\"perPointDelayMs\""));
    assert!(!json.contains("\"updateDurationMs\""));

    let back: AnimationProfile = serde_json::from_str(&json).unwrap();
    assert_eq!(back, profile);
}
