use std::fmt;

use serde::{Serialize, Serializer};

use crate::metrics::DerivedMetrics;

pub const UNKNOWN_NATIONALITY: &str = "Unknown";

/// Primary position after standardization.
///
/// `Other` holds the uppercased two-letter fallback code for tokens outside the
/// four standard roles (e.g. `"AM"`). The source taxonomy beyond GK/DF/MF/FW is
/// not defined, so those codes are kept as-is rather than mapped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
    Other(String),
    Unknown,
}

impl Position {
    pub fn label(&self) -> &str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DF",
            Position::Midfielder => "MF",
            Position::Forward => "FW",
            Position::Other(code) => code.as_str(),
            Position::Unknown => "UNKNOWN",
        }
    }

    /// Parse an already-standardized label (as shown by `label`).
    pub fn from_label(raw: &str) -> Position {
        let s = raw.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("unknown") {
            return Position::Unknown;
        }
        standard_position(s).unwrap_or_else(|| Position::Other(s.to_uppercase()))
    }
}

pub(crate) fn standard_position(token: &str) -> Option<Position> {
    match token.to_ascii_uppercase().as_str() {
        "GK" => Some(Position::Goalkeeper),
        "DF" => Some(Position::Defender),
        "MF" => Some(Position::Midfielder),
        "FW" => Some(Position::Forward),
        _ => None,
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One player-season as read from the source table.
///
/// Optional fields are `None` when the column was missing or the cell could not
/// be read; they are never defaulted to zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub player: String,
    pub team: String,
    pub position: Position,
    pub nationality: String,

    pub appearances: u32,
    pub minutes: u32,
    pub goals: u32,
    pub assists: u32,

    pub clean_sheets: Option<u32>,
    pub goals_against: Option<u32>,
    pub save_percentage: Option<f64>,

    pub expected_goals: Option<f64>,
    pub expected_assists: Option<f64>,
    pub progressive_passes: Option<u32>,
    pub progressive_carries: Option<u32>,
    pub progressive_receptions: Option<u32>,
    pub age: Option<u32>,
    pub year_born: Option<u32>,
}

impl PlayerRecord {
    /// Minimal record with only the required fields set.
    pub fn new(player: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            team: team.into(),
            position: Position::Unknown,
            nationality: UNKNOWN_NATIONALITY.to_string(),
            appearances: 0,
            minutes: 0,
            goals: 0,
            assists: 0,
            clean_sheets: None,
            goals_against: None,
            save_percentage: None,
            expected_goals: None,
            expected_assists: None,
            progressive_passes: None,
            progressive_carries: None,
            progressive_receptions: None,
            age: None,
            year_born: None,
        }
    }

    pub fn goal_contributions(&self) -> u32 {
        self.goals.saturating_add(self.assists)
    }
}

/// A record with its derived metrics attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRow {
    #[serde(flatten)]
    pub record: PlayerRecord,
    pub metrics: DerivedMetrics,
}

impl PlayerRow {
    pub fn player(&self) -> &str {
        &self.record.player
    }

    pub fn team(&self) -> &str {
        &self.record.team
    }

    pub fn position(&self) -> &Position {
        &self.record.position
    }
}

/// Immutable base table. Built once per session; all views borrow from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PlayerTable {
    rows: Vec<PlayerRow>,
}

impl PlayerTable {
    pub fn from_records(records: impl IntoIterator<Item = PlayerRecord>) -> Self {
        Self {
            rows: records.into_iter().map(crate::metrics::derive).collect(),
        }
    }

    pub fn rows(&self) -> &[PlayerRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlayerRow> {
        self.rows.iter()
    }

    /// Full view over the table in source order.
    pub fn view(&self) -> View<'_> {
        View::new(self.rows.iter().collect())
    }
}

impl<'a> IntoIterator for &'a PlayerTable {
    type Item = &'a PlayerRow;
    type IntoIter = std::slice::Iter<'a, PlayerRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Ordered projection over table rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct View<'a> {
    rows: Vec<&'a PlayerRow>,
}

impl<'a> View<'a> {
    pub fn new(rows: Vec<&'a PlayerRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[&'a PlayerRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a PlayerRow> + '_ {
        self.rows.iter().copied()
    }
}

impl<'a, 'v> IntoIterator for &'v View<'a> {
    type Item = &'a PlayerRow;
    type IntoIter = std::iter::Copied<std::slice::Iter<'v, &'a PlayerRow>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter().copied()
    }
}

impl<'a> IntoIterator for View<'a> {
    type Item = &'a PlayerRow;
    type IntoIter = std::vec::IntoIter<&'a PlayerRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
