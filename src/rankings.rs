use std::cmp::Ordering;
use std::str::FromStr;

use serde::Serialize;

use crate::error::UnknownStat;
use crate::metrics::Numeric;
use crate::record::PlayerRow;

/// Every stat a leaderboard or comparison can be keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    Appearances,
    Minutes,
    Goals,
    Assists,
    GoalContributions,
    GoalsPer90,
    AssistsPer90,
    GoalContributionPer90,
    MinutesPerGoal,
    MinutesPerContribution,
    CleanSheets,
    GoalsAgainst,
    SavePercentage,
    CleanSheetPct,
    GoalsConcededPerGame,
    Xg,
    Xag,
    XgPer90,
    XagPer90,
    GoalsMinusXg,
    ProgressivePasses,
    ProgressiveCarries,
    ProgressiveReceptions,
}

impl StatKey {
    pub const ALL: &'static [StatKey] = &[
        StatKey::Appearances,
        StatKey::Minutes,
        StatKey::Goals,
        StatKey::Assists,
        StatKey::GoalContributions,
        StatKey::GoalsPer90,
        StatKey::AssistsPer90,
        StatKey::GoalContributionPer90,
        StatKey::MinutesPerGoal,
        StatKey::MinutesPerContribution,
        StatKey::CleanSheets,
        StatKey::GoalsAgainst,
        StatKey::SavePercentage,
        StatKey::CleanSheetPct,
        StatKey::GoalsConcededPerGame,
        StatKey::Xg,
        StatKey::Xag,
        StatKey::XgPer90,
        StatKey::XagPer90,
        StatKey::GoalsMinusXg,
        StatKey::ProgressivePasses,
        StatKey::ProgressiveCarries,
        StatKey::ProgressiveReceptions,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StatKey::Appearances => "appearances",
            StatKey::Minutes => "minutes",
            StatKey::Goals => "goals",
            StatKey::Assists => "assists",
            StatKey::GoalContributions => "goal_contributions",
            StatKey::GoalsPer90 => "goals_per_90",
            StatKey::AssistsPer90 => "assists_per_90",
            StatKey::GoalContributionPer90 => "goal_contribution_per_90",
            StatKey::MinutesPerGoal => "minutes_per_goal",
            StatKey::MinutesPerContribution => "minutes_per_contribution",
            StatKey::CleanSheets => "clean_sheets",
            StatKey::GoalsAgainst => "goals_against",
            StatKey::SavePercentage => "save_percentage",
            StatKey::CleanSheetPct => "clean_sheet_pct",
            StatKey::GoalsConcededPerGame => "goals_conceded_per_game",
            StatKey::Xg => "xg",
            StatKey::Xag => "xag",
            StatKey::XgPer90 => "xg_per_90",
            StatKey::XagPer90 => "xag_per_90",
            StatKey::GoalsMinusXg => "goals_minus_xg",
            StatKey::ProgressivePasses => "progressive_passes",
            StatKey::ProgressiveCarries => "progressive_carries",
            StatKey::ProgressiveReceptions => "progressive_receptions",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatKey::Appearances => "Appearances",
            StatKey::Minutes => "Minutes",
            StatKey::Goals => "Goals",
            StatKey::Assists => "Assists",
            StatKey::GoalContributions => "G+A",
            StatKey::GoalsPer90 => "Goals/90",
            StatKey::AssistsPer90 => "Assists/90",
            StatKey::GoalContributionPer90 => "G+A/90",
            StatKey::MinutesPerGoal => "Min/Goal",
            StatKey::MinutesPerContribution => "Min/G+A",
            StatKey::CleanSheets => "Clean Sheets",
            StatKey::GoalsAgainst => "Goals Against",
            StatKey::SavePercentage => "Save %",
            StatKey::CleanSheetPct => "Clean Sheet %",
            StatKey::GoalsConcededPerGame => "Conceded/Game",
            StatKey::Xg => "xG",
            StatKey::Xag => "xAG",
            StatKey::XgPer90 => "xG/90",
            StatKey::XagPer90 => "xAG/90",
            StatKey::GoalsMinusXg => "Goals - xG",
            StatKey::ProgressivePasses => "Prog. Passes",
            StatKey::ProgressiveCarries => "Prog. Carries",
            StatKey::ProgressiveReceptions => "Prog. Receptions",
        }
    }

    /// Decimals used when rendering this stat.
    pub fn decimals(self) -> usize {
        match self {
            StatKey::GoalsPer90
            | StatKey::AssistsPer90
            | StatKey::GoalContributionPer90
            | StatKey::GoalsConcededPerGame
            | StatKey::Xg
            | StatKey::Xag
            | StatKey::XgPer90
            | StatKey::XagPer90
            | StatKey::GoalsMinusXg => 2,
            StatKey::SavePercentage | StatKey::CleanSheetPct => 1,
            _ => 0,
        }
    }

    /// Per-90, per-contribution and per-appearance rates. These are the stats
    /// a minutes floor applies to by default; season totals are not floored.
    pub fn is_rate(self) -> bool {
        matches!(
            self,
            StatKey::GoalsPer90
                | StatKey::AssistsPer90
                | StatKey::GoalContributionPer90
                | StatKey::MinutesPerGoal
                | StatKey::MinutesPerContribution
                | StatKey::CleanSheetPct
                | StatKey::GoalsConcededPerGame
                | StatKey::XgPer90
                | StatKey::XagPer90
        )
    }

    /// Value of this stat for a row. Absent source fields read as `NotApplicable`.
    pub fn value(self, row: &PlayerRow) -> Numeric {
        let r = &row.record;
        let m = &row.metrics;
        let opt_count = |v: Option<u32>| Numeric::from_option(v.map(f64::from));
        match self {
            StatKey::Appearances => r.appearances.into(),
            StatKey::Minutes => r.minutes.into(),
            StatKey::Goals => r.goals.into(),
            StatKey::Assists => r.assists.into(),
            StatKey::GoalContributions => r.goal_contributions().into(),
            StatKey::GoalsPer90 => m.goals_per_90,
            StatKey::AssistsPer90 => m.assists_per_90,
            StatKey::GoalContributionPer90 => m.goal_contribution_per_90,
            StatKey::MinutesPerGoal => m.minutes_per_goal,
            StatKey::MinutesPerContribution => m.minutes_per_contribution,
            StatKey::CleanSheets => opt_count(r.clean_sheets),
            StatKey::GoalsAgainst => opt_count(r.goals_against),
            StatKey::SavePercentage => Numeric::from_option(r.save_percentage),
            StatKey::CleanSheetPct => m.clean_sheet_pct,
            StatKey::GoalsConcededPerGame => m.goals_conceded_per_game,
            StatKey::Xg => Numeric::from_option(r.expected_goals),
            StatKey::Xag => Numeric::from_option(r.expected_assists),
            StatKey::XgPer90 => m.xg_per_90,
            StatKey::XagPer90 => m.xag_per_90,
            StatKey::GoalsMinusXg => m.goals_minus_xg,
            StatKey::ProgressivePasses => opt_count(r.progressive_passes),
            StatKey::ProgressiveCarries => opt_count(r.progressive_carries),
            StatKey::ProgressiveReceptions => opt_count(r.progressive_receptions),
        }
    }
}

fn stat_lookup_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

// Source-table column codes, read the same way the loader reads them.
const COLUMN_CODES: &[(&str, StatKey)] = &[
    ("mp", StatKey::Appearances),
    ("min", StatKey::Minutes),
    ("gls", StatKey::Goals),
    ("ast", StatKey::Assists),
    ("cs", StatKey::CleanSheets),
    ("ga", StatKey::GoalsAgainst),
    ("save", StatKey::SavePercentage),
    ("prgp", StatKey::ProgressivePasses),
    ("prgc", StatKey::ProgressiveCarries),
    ("prgr", StatKey::ProgressiveReceptions),
];

impl FromStr for StatKey {
    type Err = UnknownStat;

    /// Accepts snake_case names (`goals_per_90`), display labels (`Goals/90`)
    /// and source column codes (`Gls`, `GA`).
    ///
    /// An exact label match wins, so `"G+A"` is goal contributions while the
    /// column code `"GA"` is goals against. Otherwise case and punctuation are
    /// ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(stat) = StatKey::ALL
            .iter()
            .copied()
            .find(|stat| stat.name().eq_ignore_ascii_case(trimmed) || stat.label().eq_ignore_ascii_case(trimmed))
        {
            return Ok(stat);
        }

        let key = stat_lookup_key(s);
        if key.is_empty() {
            return Err(UnknownStat(s.to_string()));
        }
        if let Some((_, stat)) = COLUMN_CODES.iter().find(|(code, _)| *code == key) {
            return Ok(*stat);
        }
        StatKey::ALL
            .iter()
            .copied()
            .find(|stat| stat_lookup_key(stat.name()) == key || stat_lookup_key(stat.label()) == key)
            .ok_or_else(|| UnknownStat(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry<'a> {
    pub rank: usize,
    pub value: Numeric,
    pub row: &'a PlayerRow,
}

/// Qualified leaderboard: descending by `stat`, ties and `NotApplicable`
/// values kept in input order, `NotApplicable` after every numeric value.
///
/// Rows below `min_minutes` are dropped before ranking. Ranks are 1-based
/// positions, not dense ranks.
pub fn top_n<'a, I>(rows: I, stat: StatKey, n: usize, min_minutes: Option<u32>) -> Vec<RankedEntry<'a>>
where
    I: IntoIterator<Item = &'a PlayerRow>,
{
    let threshold = min_minutes.unwrap_or(0);
    let mut scored: Vec<(Numeric, &'a PlayerRow)> = rows
        .into_iter()
        .filter(|row| row.record.minutes >= threshold)
        .map(|row| (stat.value(row), row))
        .collect();

    scored.sort_by(|(a, _), (b, _)| compare_desc(*a, *b));

    scored
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(idx, (value, row))| RankedEntry {
            rank: idx + 1,
            value,
            row,
        })
        .collect()
}

fn compare_desc(a: Numeric, b: Numeric) -> Ordering {
    match (a, b) {
        (Numeric::Value(x), Numeric::Value(y)) if x == y => Ordering::Equal,
        (Numeric::Value(x), Numeric::Value(y)) => y.total_cmp(&x),
        (Numeric::Value(_), Numeric::NotApplicable) => Ordering::Less,
        (Numeric::NotApplicable, Numeric::Value(_)) => Ordering::Greater,
        (Numeric::NotApplicable, Numeric::NotApplicable) => Ordering::Equal,
    }
}

/// Per-appearance rates for one side of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerGameRates {
    pub goals: Numeric,
    pub assists: Numeric,
    pub goal_contributions: Numeric,
    pub minutes: Numeric,
}

impl PerGameRates {
    pub fn for_row(row: &PlayerRow) -> Self {
        let r = &row.record;
        let apps = f64::from(r.appearances);
        let per_game = |v: u32| Numeric::ratio(f64::from(v), apps, 1.0, 2);
        Self {
            goals: per_game(r.goals),
            assists: per_game(r.assists),
            goal_contributions: per_game(r.goal_contributions()),
            minutes: per_game(r.minutes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparedPlayer<'a> {
    pub row: &'a PlayerRow,
    pub per_game: PerGameRates,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatDelta {
    pub stat: StatKey,
    pub a: Numeric,
    pub b: Numeric,
    /// `a - b`.
    pub delta: Numeric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison<'a> {
    pub a: ComparedPlayer<'a>,
    pub b: ComparedPlayer<'a>,
    pub deltas: Vec<StatDelta>,
}

impl Comparison<'_> {
    pub fn delta(&self, stat: StatKey) -> Option<&StatDelta> {
        self.deltas.iter().find(|d| d.stat == stat)
    }
}

const COMPARE_STATS: &[StatKey] = &[
    StatKey::Appearances,
    StatKey::Minutes,
    StatKey::Goals,
    StatKey::Assists,
    StatKey::GoalContributions,
    StatKey::GoalsPer90,
    StatKey::AssistsPer90,
    StatKey::GoalContributionPer90,
    StatKey::MinutesPerGoal,
];

/// Head-to-head for any two rows; team and position need not match.
pub fn compare<'a>(a: &'a PlayerRow, b: &'a PlayerRow) -> Comparison<'a> {
    let deltas = COMPARE_STATS
        .iter()
        .map(|&stat| {
            let va = stat.value(a);
            let vb = stat.value(b);
            StatDelta {
                stat,
                a: va,
                b: vb,
                delta: va.minus(vb, 2),
            }
        })
        .collect();

    Comparison {
        a: ComparedPlayer {
            row: a,
            per_game: PerGameRates::for_row(a),
        },
        b: ComparedPlayer {
            row: b,
            per_game: PerGameRates::for_row(b),
        },
        deltas,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_labels_parse() {
        assert_eq!("goals_per_90".parse::<StatKey>(), Ok(StatKey::GoalsPer90));
        assert_eq!("Goals/90".parse::<StatKey>(), Ok(StatKey::GoalsPer90));
        assert_eq!("XG".parse::<StatKey>(), Ok(StatKey::Xg));
        assert_eq!("G+A".parse::<StatKey>(), Ok(StatKey::GoalContributions));
        assert_eq!(" g+a ".parse::<StatKey>(), Ok(StatKey::GoalContributions));
        assert_eq!("goal contributions".parse::<StatKey>(), Ok(StatKey::GoalContributions));
        assert!("shots".parse::<StatKey>().is_err());
        assert!("".parse::<StatKey>().is_err());
    }

    #[test]
    fn column_codes_match_the_loader() {
        assert_eq!("GA".parse::<StatKey>(), Ok(StatKey::GoalsAgainst));
        assert_eq!("ga".parse::<StatKey>(), Ok(StatKey::GoalsAgainst));
        assert_eq!("Gls".parse::<StatKey>(), Ok(StatKey::Goals));
        assert_eq!("MP".parse::<StatKey>(), Ok(StatKey::Appearances));
        assert_eq!("Save%".parse::<StatKey>(), Ok(StatKey::SavePercentage));
        assert_eq!("PrgC".parse::<StatKey>(), Ok(StatKey::ProgressiveCarries));
    }

    #[test]
    fn every_stat_round_trips_through_its_label() {
        for stat in StatKey::ALL {
            assert_eq!(stat.label().parse::<StatKey>(), Ok(*stat));
        }
    }

    #[test]
    fn every_stat_round_trips_through_its_name() {
        for stat in StatKey::ALL {
            assert_eq!(stat.name().parse::<StatKey>(), Ok(*stat));
        }
    }

    #[test]
    fn only_rates_take_the_default_floor() {
        assert!(StatKey::GoalsPer90.is_rate());
        assert!(StatKey::MinutesPerContribution.is_rate());
        assert!(StatKey::CleanSheetPct.is_rate());
        assert!(!StatKey::Goals.is_rate());
        assert!(!StatKey::GoalContributions.is_rate());
        assert!(!StatKey::Xg.is_rate());
    }

    #[test]
    fn not_applicable_sorts_last() {
        let mut v = [Numeric::NotApplicable, Numeric::Value(1.0), Numeric::Value(3.0)];
        v.sort_by(|a, b| compare_desc(*a, *b));
        assert_eq!(v, [Numeric::Value(3.0), Numeric::Value(1.0), Numeric::NotApplicable]);
    }
}
