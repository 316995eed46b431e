use serde::Serialize;

use crate::record::{PlayerRow, Position, View};

pub const ALL_TEAMS: &str = "All Teams";

/// Team / position / name-search selection. Unset fields pass every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub team: Option<String>,
    pub position: Option<Position>,
    pub search: Option<String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }

    /// Position from a picker label; `"all"` and blanks mean no position filter.
    pub fn position_label(mut self, label: &str) -> Self {
        self.position = position_from_label(label);
        self
    }

    /// The specific team this spec selects; `None` for blanks and the
    /// all-teams sentinel.
    pub fn selected_team(&self) -> Option<&str> {
        let team = self.team.as_deref()?.trim();
        if team.is_empty() || team.eq_ignore_ascii_case("all") || team.eq_ignore_ascii_case(ALL_TEAMS) {
            None
        } else {
            Some(team)
        }
    }

    fn search_query(&self) -> Option<String> {
        let q = self.search.as_deref()?.trim();
        if q.is_empty() {
            None
        } else {
            Some(q.to_lowercase())
        }
    }

    pub fn is_pass_through(&self) -> bool {
        self.selected_team().is_none() && self.position.is_none() && self.search_query().is_none()
    }
}

pub fn position_from_label(label: &str) -> Option<Position> {
    let s = label.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("all") || s.eq_ignore_ascii_case("all positions") {
        None
    } else {
        Some(Position::from_label(s))
    }
}

/// Why a filter produced no rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmptyResultNotice {
    /// The name search matched nobody within the selected team/position.
    NoSearchMatch { query: String },
    /// Team/position selection has no players.
    NoRowsInCategory,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome<'a> {
    Rows(View<'a>),
    Empty(EmptyResultNotice),
}

impl<'a> FilterOutcome<'a> {
    /// The matching rows; empty when the outcome is a notice.
    pub fn into_view(self) -> View<'a> {
        match self {
            FilterOutcome::Rows(view) => view,
            FilterOutcome::Empty(_) => View::default(),
        }
    }

    pub fn notice(&self) -> Option<&EmptyResultNotice> {
        match self {
            FilterOutcome::Rows(_) => None,
            FilterOutcome::Empty(notice) => Some(notice),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FilterOutcome::Rows(view) => view.len(),
            FilterOutcome::Empty(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Apply a filter spec to a table or a prior view.
///
/// Predicates are ANDed, so the order in which specs are applied does not
/// change the result. Row order follows the input.
pub fn filter<'a, I>(rows: I, spec: &FilterSpec) -> FilterOutcome<'a>
where
    I: IntoIterator<Item = &'a PlayerRow>,
{
    let team = spec.selected_team();
    let query = spec.search_query();

    let matched: Vec<&'a PlayerRow> = rows
        .into_iter()
        .filter(|row| team.is_none_or(|t| row.team() == t))
        .filter(|row| spec.position.as_ref().is_none_or(|p| row.position() == p))
        .filter(|row| {
            query
                .as_deref()
                .is_none_or(|q| row.player().to_lowercase().contains(q))
        })
        .collect();

    log::debug!("filter {spec:?} kept {} rows", matched.len());

    if !matched.is_empty() {
        return FilterOutcome::Rows(View::new(matched));
    }
    match query {
        Some(_) => FilterOutcome::Empty(EmptyResultNotice::NoSearchMatch {
            query: spec.search.as_deref().unwrap_or_default().trim().to_string(),
        }),
        None => FilterOutcome::Empty(EmptyResultNotice::NoRowsInCategory),
    }
}
