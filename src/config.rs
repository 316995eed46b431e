use std::env;
use std::path::PathBuf;

use crate::rankings::StatKey;

pub const DEFAULT_CSV: &str = "premier_league_stats.csv";
pub const DEFAULT_TOP_N: usize = 10;
// ~5 full matches; keeps cameo appearances off rate leaderboards.
pub const DEFAULT_MIN_MINUTES: u32 = 450;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsConfig {
    pub csv_path: PathBuf,
    pub top_n: usize,
    pub min_minutes: u32,
    /// Apply `min_minutes` to season totals as well as rates. Set when the
    /// floor was asked for explicitly.
    pub floor_all_stats: bool,
    pub export_path: Option<PathBuf>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV),
            top_n: DEFAULT_TOP_N,
            min_minutes: DEFAULT_MIN_MINUTES,
            floor_all_stats: false,
            export_path: None,
        }
    }
}

impl StatsConfig {
    /// Settings from `PL_STATS_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let csv_path = non_empty("PL_STATS_CSV")
            .map(|v| PathBuf::from(v.trim()))
            .unwrap_or(defaults.csv_path);
        let top_n = non_empty("PL_STATS_TOP_N")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(defaults.top_n)
            .max(1);
        let min_minutes = non_empty("PL_STATS_MIN_MINUTES")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(defaults.min_minutes);
        let export_path = non_empty("PL_STATS_EXPORT_PATH").map(|v| PathBuf::from(v.trim()));

        Self {
            csv_path,
            top_n,
            min_minutes,
            floor_all_stats: defaults.floor_all_stats,
            export_path,
        }
    }

    /// Minutes floor for a leaderboard on `stat`.
    pub fn leaderboard_floor(&self, stat: StatKey) -> Option<u32> {
        (self.floor_all_stats || stat.is_rate()).then_some(self.min_minutes)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(StatsConfig::from_lookup(lookup(&[])), StatsConfig::default());
    }

    #[test]
    fn values_are_parsed_and_clamped() {
        let cfg = StatsConfig::from_lookup(lookup(&[
            ("PL_STATS_CSV", " data/pl.csv "),
            ("PL_STATS_TOP_N", "0"),
            ("PL_STATS_MIN_MINUTES", "900"),
            ("PL_STATS_EXPORT_PATH", "out.xlsx"),
        ]));
        assert_eq!(cfg.csv_path, PathBuf::from("data/pl.csv"));
        assert_eq!(cfg.top_n, 1);
        assert_eq!(cfg.min_minutes, 900);
        assert_eq!(cfg.export_path, Some(PathBuf::from("out.xlsx")));
    }

    #[test]
    fn default_floor_only_applies_to_rates() {
        let mut cfg = StatsConfig::default();
        assert_eq!(cfg.leaderboard_floor(StatKey::GoalsPer90), Some(DEFAULT_MIN_MINUTES));
        assert_eq!(cfg.leaderboard_floor(StatKey::MinutesPerGoal), Some(DEFAULT_MIN_MINUTES));
        assert_eq!(cfg.leaderboard_floor(StatKey::Goals), None);

        cfg.floor_all_stats = true;
        assert_eq!(cfg.leaderboard_floor(StatKey::Goals), Some(DEFAULT_MIN_MINUTES));
    }

    #[test]
    fn unparsable_numbers_fall_back() {
        let cfg = StatsConfig::from_lookup(lookup(&[("PL_STATS_TOP_N", "many")]));
        assert_eq!(cfg.top_n, DEFAULT_TOP_N);
    }
}
