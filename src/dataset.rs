use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{LoadError, SchemaError};
use crate::record::{PlayerRecord, PlayerTable, Position, UNKNOWN_NATIONALITY, standard_position};

/// An already-delimited table as handed over by the ingester. `None` cells are
/// nulls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row of string cells; empty strings are kept and later read as null.
    pub fn push_row(&mut self, cells: impl IntoIterator<Item = impl Into<String>>) {
        self.rows
            .push(cells.into_iter().map(|c| Some(c.into())).collect());
    }
}

/// Per-row problem recovered during normalization. `row` is the 0-based index
/// into `RawTable::rows`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// An optional cell could not be read as a number; the field is left absent.
    ValueCoercion {
        row: usize,
        column: &'static str,
        raw: String,
    },
    /// A required cell was missing or unusable; the row was dropped.
    RowSkipped {
        row: usize,
        column: &'static str,
        raw: Option<String>,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::ValueCoercion { row, column, raw } => {
                write!(f, "row {row}: {column} value {raw:?} is not numeric, treated as missing")
            }
            LoadWarning::RowSkipped { row, column, raw: Some(raw) } => {
                write!(f, "row {row}: skipped, {column} value {raw:?} is invalid")
            }
            LoadWarning::RowSkipped { row, column, raw: None } => {
                write!(f, "row {row}: skipped, {column} is missing")
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<PlayerRecord>,
    pub warnings: Vec<LoadWarning>,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub table: PlayerTable,
    pub warnings: Vec<LoadWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Player,
    Team,
    Position,
    Nationality,
    Goals,
    Assists,
    Appearances,
    Minutes,
    Age,
    YearBorn,
    CleanSheets,
    GoalsAgainst,
    SavePercentage,
    Xg,
    Xag,
    ProgressivePasses,
    ProgressiveCarries,
    ProgressiveReceptions,
}

const REQUIRED: &[Column] = &[
    Column::Player,
    Column::Team,
    Column::Goals,
    Column::Assists,
    Column::Appearances,
    Column::Minutes,
];

const ALL_COLUMNS: &[Column] = &[
    Column::Player,
    Column::Team,
    Column::Position,
    Column::Nationality,
    Column::Goals,
    Column::Assists,
    Column::Appearances,
    Column::Minutes,
    Column::Age,
    Column::YearBorn,
    Column::CleanSheets,
    Column::GoalsAgainst,
    Column::SavePercentage,
    Column::Xg,
    Column::Xag,
    Column::ProgressivePasses,
    Column::ProgressiveCarries,
    Column::ProgressiveReceptions,
];

impl Column {
    fn name(self) -> &'static str {
        match self {
            Column::Player => "Player",
            Column::Team => "Team",
            Column::Position => "Position",
            Column::Nationality => "Nationality",
            Column::Goals => "Goals",
            Column::Assists => "Assists",
            Column::Appearances => "Appearances",
            Column::Minutes => "Minutes",
            Column::Age => "Age",
            Column::YearBorn => "Year_Born",
            Column::CleanSheets => "Clean_Sheets",
            Column::GoalsAgainst => "Goals_Against",
            Column::SavePercentage => "Save_Percentage",
            Column::Xg => "xG",
            Column::Xag => "xAG",
            Column::ProgressivePasses => "Progressive_Passes",
            Column::ProgressiveCarries => "Progressive_Carries",
            Column::ProgressiveReceptions => "Progressive_Receptions",
        }
    }

    // FBref export headers.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Player => &[],
            Column::Team => &["squad"],
            Column::Position => &["pos"],
            Column::Nationality => &["nation"],
            Column::Goals => &["gls"],
            Column::Assists => &["ast"],
            Column::Appearances => &["mp"],
            Column::Minutes => &["min"],
            Column::Age => &[],
            Column::YearBorn => &["born"],
            Column::CleanSheets => &["cs"],
            Column::GoalsAgainst => &["ga"],
            Column::SavePercentage => &["save%"],
            Column::Xg => &[],
            Column::Xag => &[],
            Column::ProgressivePasses => &["prgp"],
            Column::ProgressiveCarries => &["prgc"],
            Column::ProgressiveReceptions => &["prgr"],
        }
    }
}

fn header_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Column index per `Column`, canonical names first, then aliases.
struct ColumnMap {
    index: Vec<(Column, Option<usize>)>,
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> Result<Self, SchemaError> {
        let keys: Vec<String> = headers.iter().map(|h| header_key(h)).collect();
        let find = |needle: &str| keys.iter().position(|k| k == needle);

        let index: Vec<(Column, Option<usize>)> = ALL_COLUMNS
            .iter()
            .map(|&col| {
                let idx = find(header_key(col.name()).as_str())
                    .or_else(|| col.aliases().iter().find_map(|a| find(*a)));
                (col, idx)
            })
            .collect();

        let missing: Vec<String> = REQUIRED
            .iter()
            .filter(|col| index.iter().any(|(c, idx)| c == *col && idx.is_none()))
            .map(|col| col.name().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError { missing });
        }
        Ok(Self { index })
    }

    fn cell<'r>(&self, row: &'r [Option<String>], col: Column) -> Option<&'r str> {
        let idx = self.index.iter().find(|(c, _)| *c == col)?.1?;
        let raw = row.get(idx)?.as_deref()?;
        let trimmed = raw.trim();
        if is_null_marker(trimmed) {
            None
        } else {
            Some(trimmed)
        }
    }
}

fn is_null_marker(s: &str) -> bool {
    s.is_empty()
        || ["na", "n/a", "nan", "none", "null"]
            .iter()
            .any(|m| s.eq_ignore_ascii_case(m))
}

/// Validate a raw table and coerce it into records.
///
/// Fails only when a required column is absent. Cell-level problems become
/// warnings: optional fields degrade to absent, rows with unusable required
/// cells are dropped.
pub fn normalize(raw: &RawTable) -> Result<Normalized, SchemaError> {
    let map = ColumnMap::resolve(&raw.columns)?;
    let mut out = Normalized::default();

    for (row_idx, row) in raw.rows.iter().enumerate() {
        match normalize_row(&map, row_idx, row, &mut out.warnings) {
            Ok(record) => out.records.push(record),
            Err(skip) => out.warnings.push(skip),
        }
    }

    for warning in &out.warnings {
        log::warn!("{warning}");
    }
    log::debug!(
        "normalized {} of {} rows ({} warnings)",
        out.records.len(),
        raw.rows.len(),
        out.warnings.len()
    );
    Ok(out)
}

fn normalize_row(
    map: &ColumnMap,
    row_idx: usize,
    row: &[Option<String>],
    warnings: &mut Vec<LoadWarning>,
) -> Result<PlayerRecord, LoadWarning> {
    let cells = RowCells { map, row, row_idx };

    let player = cells.required(Column::Player, |s| Some(s.to_string()))?;
    let team = cells.required(Column::Team, |s| Some(s.to_string()))?;
    let goals = cells.required(Column::Goals, parse_count)?;
    let assists = cells.required(Column::Assists, parse_count)?;
    let appearances = cells.required(Column::Appearances, parse_count)?;
    let minutes = cells.required(Column::Minutes, parse_count)?;

    Ok(PlayerRecord {
        player,
        team,
        position: standardize_position(cells.text(Column::Position)),
        nationality: standardize_nationality(cells.text(Column::Nationality)),
        appearances,
        minutes,
        goals,
        assists,
        clean_sheets: cells.optional(Column::CleanSheets, parse_count, warnings),
        goals_against: cells.optional(Column::GoalsAgainst, parse_count, warnings),
        save_percentage: cells.optional(Column::SavePercentage, parse_decimal, warnings),
        expected_goals: cells.optional(Column::Xg, parse_decimal, warnings),
        expected_assists: cells.optional(Column::Xag, parse_decimal, warnings),
        progressive_passes: cells.optional(Column::ProgressivePasses, parse_count, warnings),
        progressive_carries: cells.optional(Column::ProgressiveCarries, parse_count, warnings),
        progressive_receptions: cells.optional(Column::ProgressiveReceptions, parse_count, warnings),
        age: cells.optional(Column::Age, parse_age, warnings),
        year_born: cells.optional(Column::YearBorn, parse_count, warnings),
    })
}

struct RowCells<'a> {
    map: &'a ColumnMap,
    row: &'a [Option<String>],
    row_idx: usize,
}

impl<'a> RowCells<'a> {
    fn text(&self, col: Column) -> Option<&'a str> {
        self.map.cell(self.row, col)
    }

    fn required<T>(&self, col: Column, parse: impl Fn(&str) -> Option<T>) -> Result<T, LoadWarning> {
        let raw = self.text(col).ok_or(LoadWarning::RowSkipped {
            row: self.row_idx,
            column: col.name(),
            raw: None,
        })?;
        parse(raw).ok_or_else(|| LoadWarning::RowSkipped {
            row: self.row_idx,
            column: col.name(),
            raw: Some(raw.to_string()),
        })
    }

    fn optional<T>(
        &self,
        col: Column,
        parse: impl Fn(&str) -> Option<T>,
        warnings: &mut Vec<LoadWarning>,
    ) -> Option<T> {
        let raw = self.text(col)?;
        let parsed = parse(raw);
        if parsed.is_none() {
            warnings.push(LoadWarning::ValueCoercion {
                row: self.row_idx,
                column: col.name(),
                raw: raw.to_string(),
            });
        }
        parsed
    }
}

/// Collapse a possibly multi-valued position string to one primary position.
///
/// The first comma/space separated token wins. Tokens outside GK/DF/MF/FW keep
/// their first two characters uppercased; if those two characters are a
/// standard code (`"GKP"`, `"FWD"`) the standard role is used.
pub fn standardize_position(raw: Option<&str>) -> Position {
    let Some(raw) = raw else {
        return Position::Unknown;
    };
    let Some(token) = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .find(|t| !t.is_empty())
    else {
        return Position::Unknown;
    };
    if let Some(position) = standard_position(token) {
        return position;
    }
    let code = token.chars().take(2).collect::<String>().to_uppercase();
    standard_position(&code).unwrap_or(Position::Other(code))
}

/// Keep the last whitespace-separated token (`"eng ENG"` → `"ENG"`).
pub fn standardize_nationality(raw: Option<&str>) -> String {
    raw.and_then(|s| s.split_whitespace().last())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_NATIONALITY.to_string())
}

fn strip_number(raw: &str) -> String {
    raw.trim().replace(',', "")
}

/// Non-negative whole number; integral floats such as `"10.0"` are accepted.
pub fn parse_count(raw: &str) -> Option<u32> {
    let s = strip_number(raw);
    if let Ok(v) = s.parse::<u32>() {
        return Some(v);
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) {
        Some(v as u32)
    } else {
        None
    }
}

pub fn parse_decimal(raw: &str) -> Option<f64> {
    let s = strip_number(raw);
    let s = s.trim_end_matches('%').trim();
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Ages arrive either as `"25"` or in years-days form `"25-123"`.
pub fn parse_age(raw: &str) -> Option<u32> {
    let years = raw.trim().split('-').next().unwrap_or("");
    parse_count(years)
}

/// Normalize and derive metrics in one step.
pub fn load_table(raw: &RawTable) -> Result<LoadReport, SchemaError> {
    let Normalized { records, warnings } = normalize(raw)?;
    Ok(LoadReport {
        table: PlayerTable::from_records(records),
        warnings,
    })
}

/// Parse delimited text with a header row into a `RawTable`.
pub fn raw_table_from_reader<R: Read>(reader: R) -> Result<RawTable, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let width = columns.len();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut cells: Vec<Option<String>> = record
            .iter()
            .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
            .collect();
        if cells.len() < width {
            cells.resize(width, None);
        }
        rows.push(cells);
    }
    Ok(RawTable { columns, rows })
}

pub fn read_raw_table(path: &Path) -> Result<RawTable, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(raw_table_from_reader(file)?)
}

/// Read, normalize and derive a stats file.
pub fn load_csv(path: &Path) -> Result<LoadReport, LoadError> {
    let raw = read_raw_table(path)?;
    let report = load_table(&raw)?;
    log::debug!("loaded {} players from {}", report.table.len(), path.display());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_takes_first_token() {
        assert_eq!(standardize_position(Some("FW,MF")), Position::Forward);
        assert_eq!(standardize_position(Some("df mf")), Position::Defender);
        assert_eq!(standardize_position(Some(" ,GK")), Position::Goalkeeper);
    }

    #[test]
    fn position_falls_back_to_two_letters() {
        assert_eq!(standardize_position(Some("am")), Position::Other("AM".into()));
        assert_eq!(standardize_position(Some("Winger")), Position::Other("WI".into()));
        assert_eq!(standardize_position(None), Position::Unknown);
        assert_eq!(standardize_position(Some(" ")), Position::Unknown);
    }

    #[test]
    fn fallback_code_matching_a_role_maps_to_that_role() {
        assert_eq!(standardize_position(Some("GKP")), Position::Goalkeeper);
        assert_eq!(standardize_position(Some("FWD")), Position::Forward);
        assert_eq!(standardize_position(Some("Defender")), Position::Defender);
        assert_eq!(standardize_position(Some("mfw,df")), Position::Midfielder);
    }

    #[test]
    fn nationality_keeps_last_token() {
        assert_eq!(standardize_nationality(Some("eng ENG")), "ENG");
        assert_eq!(standardize_nationality(Some("BRA")), "BRA");
        assert_eq!(standardize_nationality(None), "Unknown");
    }

    #[test]
    fn counts_accept_separators_and_whole_floats() {
        assert_eq!(parse_count("1,234"), Some(1234));
        assert_eq!(parse_count("10.0"), Some(10));
        assert_eq!(parse_count("10.5"), None);
        assert_eq!(parse_count("-3"), None);
        assert_eq!(parse_count("abc"), None);
    }

    #[test]
    fn decimals_reject_non_finite() {
        assert_eq!(parse_decimal("71.4%"), Some(71.4));
        assert_eq!(parse_decimal("inf"), None);
        assert_eq!(parse_decimal("NaN"), None);
    }

    #[test]
    fn age_uses_years_part() {
        assert_eq!(parse_age("25-123"), Some(25));
        assert_eq!(parse_age("31"), Some(31));
    }
}
