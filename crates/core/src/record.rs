use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bet::{BetType, Sportsbook};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Teams must be empty or a pair, got {0} entries")]
    TeamCount(usize),
    #[error("Team name must not be blank")]
    BlankTeam,
}

/// The two participants of a wager, or none at all.
///
/// A single-participant state is unrepresentable; both names are trimmed and
/// non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Teams(Option<[String; 2]>);

impl Teams {
    pub fn none() -> Self {
        Teams(None)
    }

    /// Build a pair from raw text; `None` when either side trims to nothing.
    pub fn pair(first: &str, second: &str) -> Option<Self> {
        let (first, second) = (first.trim(), second.trim());
        if first.is_empty() || second.is_empty() {
            return None;
        }
        Some(Teams(Some([first.to_string(), second.to_string()])))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_slice(&self) -> &[String] {
        match &self.0 {
            Some(pair) => pair.as_slice(),
            None => &[],
        }
    }
}

impl TryFrom<Vec<String>> for Teams {
    type Error = ModelError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        match names.as_slice() {
            [] => Ok(Teams::none()),
            [first, second] => Teams::pair(first, second).ok_or(ModelError::BlankTeam),
            other => Err(ModelError::TeamCount(other.len())),
        }
    }
}

impl From<Teams> for Vec<String> {
    fn from(teams: Teams) -> Self {
        teams.0.map(Vec::from).unwrap_or_default()
    }
}

/// Structured view of one betting receipt.
///
/// Unset fields serialize as `null`. The recognized text and the confidence
/// are fixed when the record is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub sportsbook: Option<Sportsbook>,
    pub bet_type: Option<BetType>,
    /// Stake in the receipt's currency units.
    pub amount: Option<f64>,
    /// Signed American odds exactly as printed, e.g. `+150`.
    pub odds: Option<String>,
    #[serde(default)]
    pub teams: Teams,
    /// Date text as printed; not validated as a calendar date.
    pub date: Option<String>,
    pub ticket_number: Option<String>,
    raw_text: String,
    confidence: f32,
}

impl ReceiptRecord {
    pub fn new(raw_text: impl Into<String>, confidence: f32) -> Self {
        Self {
            sportsbook: None,
            bet_type: None,
            amount: None,
            odds: None,
            teams: Teams::none(),
            date: None,
            ticket_number: None,
            raw_text: raw_text.into(),
            confidence,
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Count of optional fields that hold a value; a team pair counts once.
    pub fn populated_fields(&self) -> usize {
        [
            self.sportsbook.is_some(),
            self.bet_type.is_some(),
            self.amount.is_some(),
            self.odds.is_some(),
            !self.teams.is_empty(),
            self.date.is_some(),
            self.ticket_number.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}
