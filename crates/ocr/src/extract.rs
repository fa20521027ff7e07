use std::sync::OnceLock;

use regex::Regex;
use slipscan_core::{BetType, ReceiptRecord, Sportsbook, Teams};

/// Confidence assigned to every extracted record.
pub const BASELINE_CONFIDENCE: f32 = 0.8;

// ── Lookup tables ─────────────────────────────────────────────────────────────
//
// Every table is scanned in declared order and the first hit wins.

/// Words that separate the two sides of a matchup, tried per line in this order.
const TEAM_SEPARATORS: [&str; 5] = ["vs", "at", "@", "over", "under"];

const DATE_PATTERNS: [&str; 3] = [
    r"\d{1,2}/\d{1,2}/\d{4}",
    r"\d{1,2}-\d{1,2}-\d{4}",
    r"\w+ \d{1,2}, \d{4}",
];

const TICKET_PATTERNS: [&str; 3] = [
    r"(?i)Ticket\s*#?\s*(\w+)",
    r"(?i)Reference\s*#?\s*(\w+)",
    r"(?i)ID\s*#?\s*(\w+)",
];

/// Substrings of the lower-cased text that classify the bet. The bare `+`/`-`
/// spread triggers also fire on odds, so most receipts quoting a price land
/// on spread.
const BET_TYPE_TRIGGERS: [(BetType, &[&str]); 5] = [
    (BetType::Moneyline, &["moneyline", "ml", "to win"]),
    (BetType::Spread, &["spread", "point spread", "+", "-"]),
    (BetType::Total, &["total", "over", "under", "o/", "u/"]),
    (BetType::Parlay, &["parlay", "multi", "combo"]),
    (BetType::Prop, &["prop", "player", "first", "anytime"]),
];

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

macro_rules! re_table {
    ($name:ident, $patterns:expr) => {
        fn $name() -> &'static [Regex] {
            static R: OnceLock<Vec<Regex>> = OnceLock::new();
            R.get_or_init(|| {
                $patterns
                    .iter()
                    .map(|p| Regex::new(p).expect("invalid regex"))
                    .collect()
            })
        }
    };
}

re!(re_amount, r"\$(\d+\.?\d*)");
re!(re_odds, r"[+-]\d+");
re!(re_decimal_digit, r"^\d$");

re_table!(re_dates, DATE_PATTERNS);
re_table!(re_tickets, TICKET_PATTERNS);
re_table!(
    re_team_separators,
    TEAM_SEPARATORS.map(|kw| format!(r"(?i)\b{}\b", regex::escape(kw)))
);

// ── Public extraction API ─────────────────────────────────────────────────────

pub struct Extractor;

impl Extractor {
    /// Extract structured fields from recognized receipt text.
    ///
    /// Each field is searched independently, line by line from the top, and
    /// keeps the first match; later lines never replace it. Fields with no
    /// match stay unset. Callers reject blank text before getting here.
    pub fn extract(ocr_text: &str) -> ReceiptRecord {
        let lines: Vec<&str> = ocr_text.split('\n').collect();

        let mut record = ReceiptRecord::new(ocr_text, BASELINE_CONFIDENCE);
        record.sportsbook = Self::extract_sportsbook(&lines);
        record.amount = Self::extract_amount(&lines);
        record.odds = Self::extract_odds(&lines);
        record.teams = Self::extract_teams(&lines);
        record.date = Self::extract_date(&lines);
        record.ticket_number = Self::extract_ticket_number(&lines);
        record.bet_type = Self::classify_bet_type(ocr_text);
        record
    }

    // ── Sportsbook ────────────────────────────────────────────────────────────

    fn extract_sportsbook(lines: &[&str]) -> Option<Sportsbook> {
        lines.iter().find_map(|line| {
            let line = line.to_lowercase();
            Sportsbook::ALL
                .into_iter()
                .find(|book| line.contains(&book.name().to_lowercase()))
        })
    }

    // ── Stake & odds ──────────────────────────────────────────────────────────

    fn extract_amount(lines: &[&str]) -> Option<f64> {
        // A token that does not parse to a finite value skips its line rather
        // than ending the scan.
        lines.iter().find_map(|line| {
            let c = re_amount().captures(line)?;
            let token: String = c.get(1)?.as_str().chars().map(ascii_digit).collect();
            token.parse::<f64>().ok().filter(|v| v.is_finite())
        })
    }

    fn extract_odds(lines: &[&str]) -> Option<String> {
        lines
            .iter()
            .find_map(|line| re_odds().find(line))
            .map(|m| m.as_str().to_string())
    }

    // ── Teams ─────────────────────────────────────────────────────────────────

    fn extract_teams(lines: &[&str]) -> Teams {
        lines
            .iter()
            .find_map(|line| {
                re_team_separators().iter().find_map(|sep| {
                    let mut parts = sep.split(line);
                    let first = parts.next()?;
                    let second = parts.next()?;
                    Teams::pair(first, second)
                })
            })
            .unwrap_or_default()
    }

    // ── Date & ticket ─────────────────────────────────────────────────────────

    fn extract_date(lines: &[&str]) -> Option<String> {
        lines.iter().find_map(|line| {
            re_dates()
                .iter()
                .find_map(|re| re.find(line))
                .map(|m| m.as_str().to_string())
        })
    }

    fn extract_ticket_number(lines: &[&str]) -> Option<String> {
        lines.iter().find_map(|line| {
            re_tickets()
                .iter()
                .find_map(|re| re.captures(line))
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        })
    }

    // ── Bet type ──────────────────────────────────────────────────────────────

    /// Classify on the whole text rather than per line.
    fn classify_bet_type(text: &str) -> Option<BetType> {
        let lower = text.to_lowercase();
        BET_TYPE_TRIGGERS
            .iter()
            .find(|(_, triggers)| triggers.iter().any(|t| lower.contains(t)))
            .map(|(bet_type, _)| *bet_type)
    }
}

/// Rewrite a Unicode decimal digit (full-width, Arabic-Indic, …) as its ASCII
/// counterpart; every other char is returned unchanged. Decimal digits are
/// assigned in contiguous runs of ten starting at zero.
fn ascii_digit(c: char) -> char {
    let is_digit = |ch: char| re_decimal_digit().is_match(ch.encode_utf8(&mut [0u8; 4]));
    if c.is_ascii() || !is_digit(c) {
        return c;
    }
    let mut run = 0u32;
    while (c as u32)
        .checked_sub(run + 1)
        .and_then(char::from_u32)
        .is_some_and(is_digit)
    {
        run += 1;
    }
    char::from_digit(run % 10, 10).unwrap_or(c)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
