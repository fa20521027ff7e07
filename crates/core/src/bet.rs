use serde::{Deserialize, Serialize};
use std::fmt;

/// Wager classification recognized on a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetType {
    Moneyline,
    Spread,
    Total,
    Parlay,
    Prop,
}

impl BetType {
    pub const ALL: [BetType; 5] = [
        BetType::Moneyline,
        BetType::Spread,
        BetType::Total,
        BetType::Parlay,
        BetType::Prop,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BetType::Moneyline => "moneyline",
            BetType::Spread => "spread",
            BetType::Total => "total",
            BetType::Parlay => "parlay",
            BetType::Prop => "prop",
        }
    }
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BetType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        BetType::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| format!("Unknown bet type: '{s}'"))
    }
}

/// Wagering operators the extractor knows by name.
///
/// `ALL` is in lookup order: when one receipt line mentions several operators
/// the earlier entry is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sportsbook {
    DraftKings,
    FanDuel,
    #[serde(rename = "BetMGM")]
    BetMgm,
    PointsBet,
    Caesars,
    #[serde(rename = "WynnBET")]
    WynnBet,
    Barstool,
}

impl Sportsbook {
    pub const ALL: [Sportsbook; 7] = [
        Sportsbook::DraftKings,
        Sportsbook::FanDuel,
        Sportsbook::BetMgm,
        Sportsbook::PointsBet,
        Sportsbook::Caesars,
        Sportsbook::WynnBet,
        Sportsbook::Barstool,
    ];

    /// Brand spelling as printed on receipts.
    pub fn name(self) -> &'static str {
        match self {
            Sportsbook::DraftKings => "DraftKings",
            Sportsbook::FanDuel => "FanDuel",
            Sportsbook::BetMgm => "BetMGM",
            Sportsbook::PointsBet => "PointsBet",
            Sportsbook::Caesars => "Caesars",
            Sportsbook::WynnBet => "WynnBET",
            Sportsbook::Barstool => "Barstool",
        }
    }
}

impl fmt::Display for Sportsbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Sportsbook {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Sportsbook::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("Unknown sportsbook: '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn bet_type_display_is_lowercase_tag() {
        assert_eq!(BetType::Moneyline.to_string(), "moneyline");
        assert_eq!(BetType::Prop.to_string(), "prop");
    }

    #[test]
    fn bet_type_from_str_ignores_case() {
        assert_eq!(BetType::from_str("Parlay").unwrap(), BetType::Parlay);
        assert_eq!(BetType::from_str(" total ").unwrap(), BetType::Total);
        assert!(BetType::from_str("teaser").is_err());
    }

    #[test]
    fn bet_type_serializes_as_tag() {
        assert_eq!(serde_json::to_string(&BetType::Spread).unwrap(), "\"spread\"");
    }

    #[test]
    fn sportsbook_serializes_as_brand_name() {
        assert_eq!(serde_json::to_string(&Sportsbook::BetMgm).unwrap(), "\"BetMGM\"");
        assert_eq!(serde_json::to_string(&Sportsbook::WynnBet).unwrap(), "\"WynnBET\"");
        assert_eq!(serde_json::to_string(&Sportsbook::DraftKings).unwrap(), "\"DraftKings\"");
    }

    #[test]
    fn sportsbook_display_matches_serialized_name() {
        for book in Sportsbook::ALL {
            let json = serde_json::to_string(&book).unwrap();
            assert_eq!(json, format!("\"{book}\""));
        }
    }

    #[test]
    fn sportsbook_from_str() {
        assert_eq!(Sportsbook::from_str("fanduel").unwrap(), Sportsbook::FanDuel);
        assert_eq!(Sportsbook::from_str("WYNNBET").unwrap(), Sportsbook::WynnBet);
        assert!(Sportsbook::from_str("Bet365").is_err());
    }
}
