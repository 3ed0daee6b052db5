use std::{collections::HashMap, str::FromStr};

use crate::foundation::error::ChartcastError;

/// Chart kinds the animation catalog knows about.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Line chart drawn point by point.
    Line,
    /// Filled line chart.
    Area,
    /// Circular chart.
    Pie,
    /// Circular chart with a hole.
    Donut,
    /// Bars rising from the baseline.
    VerticalBar,
    /// Bars extending from the left edge.
    HorizontalBar,
    /// Racing bars that re-sort over discrete time steps.
    BarRace,
}

impl ChartKind {
    /// Stable snake_case identifier, matching the wire format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Area => "area",
            Self::Pie => "pie",
            Self::Donut => "donut",
            Self::VerticalBar => "vertical_bar",
            Self::HorizontalBar => "horizontal_bar",
            Self::BarRace => "bar_race",
        }
    }
}

impl FromStr for ChartKind {
    type Err = ChartcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(Self::Line),
            "area" => Ok(Self::Area),
            "pie" => Ok(Self::Pie),
            "donut" => Ok(Self::Donut),
            "vertical_bar" => Ok(Self::VerticalBar),
            "horizontal_bar" => Ok(Self::HorizontalBar),
            "bar_race" => Ok(Self::BarRace),
            other => Err(ChartcastError::validation(format!(
                "unknown chart kind '{other}'"
            ))),
        }
    }
}

/// Named timing configuration for one visual animation.
///
/// Immutable once selected; looked up by `(chart kind, style key)` from a
/// [`ProfileCatalog`]. Easing identifiers are opaque to the recording core.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationProfile {
    /// Display name ("Smooth Flow", "Pop Out", ...).
    pub name: String,
    /// Opaque easing identifier consumed by the chart renderer.
    pub easing: String,
    /// Base animation duration in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_duration_ms: Option<u64>,
    /// Additional stagger delay applied per data point, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_point_delay_ms: Option<u64>,
    /// Duration of one discrete update step (bar race only), in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_duration_ms: Option<u64>,
}

impl AnimationProfile {
    fn timed(name: &str, easing: &str, base_ms: u64, delay_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            easing: easing.to_string(),
            base_duration_ms: Some(base_ms),
            per_point_delay_ms: Some(delay_ms),
            update_duration_ms: None,
        }
    }

    fn stepped(name: &str, easing: &str, update_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            easing: easing.to_string(),
            base_duration_ms: None,
            per_point_delay_ms: None,
            update_duration_ms: Some(update_ms),
        }
    }
}

/// Static catalog of animation profiles, keyed by chart kind and style key.
#[derive(Clone, Debug, Default)]
pub struct ProfileCatalog {
    profiles: HashMap<(ChartKind, String), AnimationProfile>,
}

impl ProfileCatalog {
    /// The catalog shipped with the application.
    pub fn builtin() -> Self {
        let mut c = Self::default();

        for kind in [ChartKind::Line, ChartKind::Area] {
            c.insert(kind, "smooth", AnimationProfile::timed("Smooth Flow", "linear", 2000, 200));
            c.insert(kind, "bounce", AnimationProfile::timed("Bouncy Draw", "bounceOut", 2500, 200));
            c.insert(kind, "elastic", AnimationProfile::timed("Elastic Stretch", "elasticInOut", 3500, 200));
            c.insert(kind, "wave", AnimationProfile::timed("Wave Motion", "bounceInOut", 2000, 300));
            c.insert(kind, "sequential", AnimationProfile::timed("Sequential Draw", "quadraticInOut", 2000, 400));
        }

        for kind in [ChartKind::Pie, ChartKind::Donut] {
            c.insert(kind, "pop_out", AnimationProfile::timed("Pop Out", "elasticOut", 1500, 150));
            c.insert(kind, "bounce", AnimationProfile::timed("Bounce", "bounceOut", 1200, 100));
            c.insert(kind, "expand", AnimationProfile::timed("Expand", "cubicInOut", 1500, 100));
            c.insert(kind, "rotate", AnimationProfile::timed("Rotate", "bounceOut", 1500, 150));
        }

        for kind in [ChartKind::VerticalBar, ChartKind::HorizontalBar] {
            c.insert(kind, "sequential", AnimationProfile::timed("Sequential", "cubicOut", 2000, 200));
            c.insert(kind, "elastic", AnimationProfile::timed("Elastic", "elasticOut", 2000, 150));
            c.insert(kind, "wave", AnimationProfile::timed("Wave", "circularInOut", 2000, 300));
            c.insert(kind, "bounce", AnimationProfile::timed("Bounce", "bounceOut", 2500, 200));
        }
        c.insert(
            ChartKind::VerticalBar,
            "basic",
            AnimationProfile::timed("Basic Rise", "bounceOut", 1500, 100),
        );
        c.insert(
            ChartKind::HorizontalBar,
            "basic",
            AnimationProfile::timed("Basic Extend", "bounceOut", 1500, 100),
        );

        c.insert(
            ChartKind::BarRace,
            "standard",
            AnimationProfile::stepped("Standard Race", "linear", 2000),
        );

        c
    }

    /// Look up a profile; `None` when the kind/style pair is not in the catalog.
    pub fn get(&self, kind: ChartKind, style: &str) -> Option<&AnimationProfile> {
        self.profiles.get(&(kind, style.to_string()))
    }

    /// Style keys registered for one chart kind, sorted for stable display.
    pub fn styles_for(&self, kind: ChartKind) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .profiles
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, s)| s.as_str())
            .collect();
        out.sort_unstable();
        out
    }

    fn insert(&mut self, kind: ChartKind, style: &str, profile: AnimationProfile) {
        self.profiles.insert((kind, style.to_string()), profile);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/profile.rs"]
mod tests;
