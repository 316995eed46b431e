use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::metrics::Numeric;
use crate::rankings::{Comparison, RankedEntry, StatKey};
use crate::record::PlayerRow;

/// What to put in a workbook: the (filtered) player rows, any number of
/// leaderboards, and optionally one comparison.
pub struct WorkbookExport<'a> {
    pub players: Vec<&'a PlayerRow>,
    pub leaderboards: Vec<(StatKey, Vec<RankedEntry<'a>>)>,
    pub comparison: Option<Comparison<'a>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub players: usize,
    pub leaderboards: usize,
    pub leaderboard_rows: usize,
    pub comparison_rows: usize,
}

pub fn export_workbook(path: &Path, export: &WorkbookExport<'_>) -> Result<ExportReport> {
    let mut players_rows = vec![player_header()];
    players_rows.extend(export.players.iter().map(|row| player_row(row)));

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Players")?;
        write_rows(sheet, &players_rows)?;
    }

    let mut sheet_names = vec!["Players".to_string(), "Compare".to_string()];
    let mut leaderboard_rows = 0usize;
    for (stat, entries) in &export.leaderboards {
        let mut rows = vec![vec![
            "Rank".to_string(),
            "Player".to_string(),
            "Team".to_string(),
            "Position".to_string(),
            "Minutes".to_string(),
            stat.label().to_string(),
        ]];
        rows.extend(entries.iter().map(|entry| {
            vec![
                entry.rank.to_string(),
                entry.row.player().to_string(),
                entry.row.team().to_string(),
                entry.row.position().to_string(),
                entry.row.record.minutes.to_string(),
                entry.value.display(stat.decimals()),
            ]
        }));
        leaderboard_rows += entries.len();

        let sheet = workbook.add_worksheet();
        sheet
            .set_name(unique_sheet_name(*stat, &mut sheet_names))
            .with_context(|| format!("name leaderboard sheet for {}", stat.name()))?;
        write_rows(sheet, &rows)?;
    }

    let mut comparison_rows = 0usize;
    if let Some(cmp) = export.comparison.as_ref() {
        let rows = comparison_rows_for(cmp);
        comparison_rows = rows.len().saturating_sub(1);
        let sheet = workbook.add_worksheet();
        sheet.set_name("Compare")?;
        write_rows(sheet, &rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        players: players_rows.len().saturating_sub(1),
        leaderboards: export.leaderboards.len(),
        leaderboard_rows,
        comparison_rows,
    })
}

// Excel caps sheet names at 31 chars, rejects `/`, and compares them
// case-insensitively.
const MAX_SHEET_NAME: usize = 31;

fn sheet_name(stat: StatKey) -> String {
    let mut name = format!("Top {}", stat.label().replace('/', " per "));
    name.truncate(MAX_SHEET_NAME);
    name
}

/// `sheet_name`, suffixed with ` (2)`, ` (3)`, ... if already taken.
fn unique_sheet_name(stat: StatKey, taken: &mut Vec<String>) -> String {
    let base = sheet_name(stat);
    let is_taken = |name: &str, taken: &[String]| taken.iter().any(|t| t.eq_ignore_ascii_case(name));
    let mut name = base.clone();
    let mut n = 2usize;
    while is_taken(&name, taken) {
        let suffix = format!(" ({n})");
        let mut stem = base.clone();
        stem.truncate(MAX_SHEET_NAME - suffix.len());
        name = format!("{stem}{suffix}");
        n += 1;
    }
    taken.push(name.clone());
    name
}

fn player_header() -> Vec<String> {
    [
        "Player",
        "Team",
        "Position",
        "Nationality",
        "Appearances",
        "Minutes",
        "Goals",
        "Assists",
        "Goals/90",
        "Assists/90",
        "G+A/90",
        "Min/Goal",
        "Min/G+A",
        "Clean Sheets",
        "Goals Against",
        "Save %",
        "Clean Sheet %",
        "Conceded/Game",
        "xG",
        "xAG",
        "Prog. Passes",
        "Prog. Carries",
        "Prog. Receptions",
        "Age",
        "Born",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn player_row(row: &PlayerRow) -> Vec<String> {
    let r = &row.record;
    let m = &row.metrics;
    vec![
        r.player.clone(),
        r.team.clone(),
        r.position.to_string(),
        r.nationality.clone(),
        r.appearances.to_string(),
        r.minutes.to_string(),
        r.goals.to_string(),
        r.assists.to_string(),
        m.goals_per_90.display(2),
        m.assists_per_90.display(2),
        m.goal_contribution_per_90.display(2),
        m.minutes_per_goal.display(0),
        m.minutes_per_contribution.display(0),
        opt_to_string(r.clean_sheets),
        opt_to_string(r.goals_against),
        opt_to_string(r.save_percentage),
        gk_metric(r.clean_sheets.is_some(), m.clean_sheet_pct, 1),
        gk_metric(r.goals_against.is_some(), m.goals_conceded_per_game, 2),
        opt_to_string(r.expected_goals),
        opt_to_string(r.expected_assists),
        opt_to_string(r.progressive_passes),
        opt_to_string(r.progressive_carries),
        opt_to_string(r.progressive_receptions),
        opt_to_string(r.age),
        opt_to_string(r.year_born),
    ]
}

// Blank when the source never had the column, N/A when it did but the ratio is undefined.
fn gk_metric(present: bool, value: Numeric, decimals: usize) -> String {
    if present {
        value.display(decimals)
    } else {
        String::new()
    }
}

fn comparison_rows_for(cmp: &Comparison<'_>) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Stat".to_string(),
        cmp.a.row.player().to_string(),
        cmp.b.row.player().to_string(),
        "Difference".to_string(),
    ]];
    for d in &cmp.deltas {
        let decimals = d.stat.decimals();
        rows.push(vec![
            d.stat.label().to_string(),
            d.a.display(decimals),
            d.b.display(decimals),
            d.delta.display(decimals),
        ]);
    }
    let per_game = [
        ("Goals/Game", cmp.a.per_game.goals, cmp.b.per_game.goals),
        ("Assists/Game", cmp.a.per_game.assists, cmp.b.per_game.assists),
        (
            "G+A/Game",
            cmp.a.per_game.goal_contributions,
            cmp.b.per_game.goal_contributions,
        ),
        ("Minutes/Game", cmp.a.per_game.minutes, cmp.b.per_game.minutes),
    ];
    for (label, a, b) in per_game {
        rows.push(vec![
            label.to_string(),
            a.display(2),
            b.display(2),
            a.minus(b, 2).display(2),
        ]);
    }
    rows
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
