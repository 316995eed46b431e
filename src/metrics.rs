use std::fmt;

use serde::Serialize;

use crate::record::{PlayerRecord, PlayerRow};

/// A derived number, or the marker that its denominator was zero.
///
/// `NotApplicable` is never folded into `Value(0.0)`: a player with no goals in
/// 900 minutes scores `Value(0.0)` per 90, a player with no minutes scores
/// `NotApplicable`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Numeric {
    Value(f64),
    NotApplicable,
}

impl Numeric {
    pub fn value(self) -> Option<f64> {
        match self {
            Numeric::Value(v) => Some(v),
            Numeric::NotApplicable => None,
        }
    }

    pub fn is_applicable(self) -> bool {
        matches!(self, Numeric::Value(_))
    }

    /// Wrap a finite value; anything else becomes `NotApplicable`. `-0.0` is
    /// stored as `0.0`.
    pub fn from_f64(v: f64) -> Numeric {
        if v == 0.0 {
            Numeric::Value(0.0)
        } else if v.is_finite() {
            Numeric::Value(v)
        } else {
            Numeric::NotApplicable
        }
    }

    pub fn from_option(v: Option<f64>) -> Numeric {
        v.map_or(Numeric::NotApplicable, Numeric::from_f64)
    }

    /// `numerator / denominator * scale`, rounded; `NotApplicable` unless the
    /// denominator is strictly positive.
    pub fn ratio(numerator: f64, denominator: f64, scale: f64, decimals: u32) -> Numeric {
        if !denominator.is_finite() || denominator <= 0.0 || !numerator.is_finite() {
            return Numeric::NotApplicable;
        }
        Numeric::from_f64(round_to(numerator / denominator * scale, decimals))
    }

    /// Difference of two values, `NotApplicable` if either side is.
    pub fn minus(self, other: Numeric, decimals: u32) -> Numeric {
        match (self, other) {
            (Numeric::Value(a), Numeric::Value(b)) => Numeric::from_f64(round_to(a - b, decimals)),
            _ => Numeric::NotApplicable,
        }
    }

    /// Render with a fixed number of decimals, `N/A` for the sentinel.
    pub fn display(self, decimals: usize) -> String {
        match self {
            Numeric::Value(v) => format!("{v:.decimals$}"),
            Numeric::NotApplicable => "N/A".to_string(),
        }
    }
}

impl From<u32> for Numeric {
    fn from(v: u32) -> Self {
        Numeric::Value(f64::from(v))
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Value(v) => write!(f, "{v}"),
            Numeric::NotApplicable => f.write_str("N/A"),
        }
    }
}

/// Round to `decimals` places with ties to even (`0.125` -> `0.12`).
/// A result that rounds to zero is always `+0.0`.
pub fn round_to(v: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (v * factor).round_ties_even() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub goals_per_90: Numeric,
    pub assists_per_90: Numeric,
    pub goal_contribution_per_90: Numeric,
    pub minutes_per_goal: Numeric,
    pub minutes_per_contribution: Numeric,
    pub clean_sheet_pct: Numeric,
    pub goals_conceded_per_game: Numeric,
    pub xg_per_90: Numeric,
    pub xag_per_90: Numeric,
    pub goals_minus_xg: Numeric,
}

impl DerivedMetrics {
    pub fn compute(r: &PlayerRecord) -> Self {
        let minutes = f64::from(r.minutes);
        let apps = f64::from(r.appearances);
        let goals = f64::from(r.goals);
        let contributions = f64::from(r.goal_contributions());

        let per_90 = |v: f64| Numeric::ratio(v, minutes, 90.0, 2);
        let per_90_opt = |v: Option<f64>| v.map_or(Numeric::NotApplicable, per_90);
        let per_app = |v: Option<u32>, scale: f64, decimals: u32| {
            v.map_or(Numeric::NotApplicable, |v| {
                Numeric::ratio(f64::from(v), apps, scale, decimals)
            })
        };

        Self {
            goals_per_90: per_90(goals),
            assists_per_90: per_90(f64::from(r.assists)),
            goal_contribution_per_90: per_90(contributions),
            minutes_per_goal: Numeric::ratio(minutes, goals, 1.0, 0),
            minutes_per_contribution: Numeric::ratio(minutes, contributions, 1.0, 0),
            clean_sheet_pct: per_app(r.clean_sheets, 100.0, 1),
            goals_conceded_per_game: per_app(r.goals_against, 1.0, 2),
            xg_per_90: per_90_opt(r.expected_goals),
            xag_per_90: per_90_opt(r.expected_assists),
            goals_minus_xg: r
                .expected_goals
                .map_or(Numeric::NotApplicable, |xg| Numeric::from_f64(round_to(goals - xg, 2))),
        }
    }
}

/// Attach derived metrics to a record.
pub fn derive(record: PlayerRecord) -> PlayerRow {
    let metrics = DerivedMetrics::compute(&record);
    PlayerRow { record, metrics }
}
