use std::collections::BTreeSet;

use serde::Serialize;

use crate::filter::ALL_TEAMS;
use crate::metrics::Numeric;
use crate::rankings::StatKey;
use crate::record::{PlayerRow, PlayerTable, Position};

/// Team picker entries: `"All Teams"` then every team, sorted.
pub fn team_options(table: &PlayerTable) -> Vec<String> {
    let teams: BTreeSet<&str> = table.iter().map(PlayerRow::team).collect();
    std::iter::once(ALL_TEAMS.to_string())
        .chain(teams.into_iter().map(str::to_string))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub players: usize,
    pub goals: u64,
    pub assists: u64,
    pub minutes: u64,
    /// Share of the view's goals scored by its top scorer.
    pub top_scorer_share: Numeric,
}

pub fn team_summary<'a, I>(rows: I) -> TeamSummary
where
    I: IntoIterator<Item = &'a PlayerRow>,
{
    let mut out = TeamSummary {
        players: 0,
        goals: 0,
        assists: 0,
        minutes: 0,
        top_scorer_share: Numeric::NotApplicable,
    };
    let mut top_goals = 0u32;
    for row in rows {
        let r = &row.record;
        out.players += 1;
        out.goals += u64::from(r.goals);
        out.assists += u64::from(r.assists);
        out.minutes += u64::from(r.minutes);
        top_goals = top_goals.max(r.goals);
    }
    out.top_scorer_share = Numeric::ratio(f64::from(top_goals), out.goals as f64, 100.0, 1);
    out
}

/// Distinct player names in row order, for a player picker.
pub fn player_names<'a, I>(rows: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a PlayerRow>,
{
    let mut seen = BTreeSet::new();
    rows.into_iter()
        .map(PlayerRow::player)
        .filter(|name| seen.insert(*name))
        .collect()
}

/// First row for `player` (exact, case-insensitive), optionally within `team`.
///
/// Player+team is assumed unique but not enforced; duplicates resolve to the
/// earliest row.
pub fn find_player<'a, I>(rows: I, player: &str, team: Option<&str>) -> Option<&'a PlayerRow>
where
    I: IntoIterator<Item = &'a PlayerRow>,
{
    let player = player.trim();
    rows.into_iter().find(|row| {
        row.player().eq_ignore_ascii_case(player) && team.is_none_or(|t| row.team() == t.trim())
    })
}

const GOALKEEPER_LAYOUT: &[StatKey] = &[
    StatKey::Appearances,
    StatKey::Minutes,
    StatKey::CleanSheets,
    StatKey::CleanSheetPct,
    StatKey::GoalsAgainst,
    StatKey::GoalsConcededPerGame,
    StatKey::SavePercentage,
];

const DEFENDER_LAYOUT: &[StatKey] = &[
    StatKey::Appearances,
    StatKey::Minutes,
    StatKey::Goals,
    StatKey::Assists,
    StatKey::ProgressivePasses,
    StatKey::ProgressiveCarries,
    StatKey::GoalContributionPer90,
];

const MIDFIELDER_LAYOUT: &[StatKey] = &[
    StatKey::Appearances,
    StatKey::Minutes,
    StatKey::Goals,
    StatKey::Assists,
    StatKey::AssistsPer90,
    StatKey::XagPer90,
    StatKey::ProgressivePasses,
    StatKey::ProgressiveCarries,
    StatKey::ProgressiveReceptions,
];

const ATTACKER_LAYOUT: &[StatKey] = &[
    StatKey::Appearances,
    StatKey::Minutes,
    StatKey::Goals,
    StatKey::Assists,
    StatKey::GoalsPer90,
    StatKey::GoalContributionPer90,
    StatKey::MinutesPerGoal,
    StatKey::XgPer90,
    StatKey::GoalsMinusXg,
];

const GENERIC_LAYOUT: &[StatKey] = &[
    StatKey::Appearances,
    StatKey::Minutes,
    StatKey::Goals,
    StatKey::Assists,
    StatKey::GoalContributionPer90,
];

/// Stats a player card shows for a role.
pub fn stat_layout(position: &Position) -> &'static [StatKey] {
    match position {
        Position::Goalkeeper => GOALKEEPER_LAYOUT,
        Position::Defender => DEFENDER_LAYOUT,
        Position::Midfielder => MIDFIELDER_LAYOUT,
        Position::Forward => ATTACKER_LAYOUT,
        Position::Other(_) | Position::Unknown => GENERIC_LAYOUT,
    }
}

/// A card line: stat label and its value, skipping stats the source never had.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardLine {
    pub stat: StatKey,
    pub label: &'static str,
    pub value: Numeric,
}

pub fn player_card(row: &PlayerRow) -> Vec<CardLine> {
    stat_layout(row.position())
        .iter()
        .filter(|stat| source_has(row, **stat))
        .map(|&stat| CardLine {
            stat,
            label: stat.label(),
            value: stat.value(row),
        })
        .collect()
}

// Distinguishes "column absent" from a derived NotApplicable.
fn source_has(row: &PlayerRow, stat: StatKey) -> bool {
    let r = &row.record;
    match stat {
        StatKey::CleanSheets | StatKey::CleanSheetPct => r.clean_sheets.is_some(),
        StatKey::GoalsAgainst | StatKey::GoalsConcededPerGame => r.goals_against.is_some(),
        StatKey::SavePercentage => r.save_percentage.is_some(),
        StatKey::Xg | StatKey::XgPer90 | StatKey::GoalsMinusXg => r.expected_goals.is_some(),
        StatKey::Xag | StatKey::XagPer90 => r.expected_assists.is_some(),
        StatKey::ProgressivePasses => r.progressive_passes.is_some(),
        StatKey::ProgressiveCarries => r.progressive_carries.is_some(),
        StatKey::ProgressiveReceptions => r.progressive_receptions.is_some(),
        _ => true,
    }
}
