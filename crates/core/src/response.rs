use serde::{Deserialize, Serialize};

pub const FOLLOW_UP_MARKER: &str = "Follow-up questions:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAnswer {
    pub has_follow_ups: bool,
    pub main: String,
    pub follow_ups: Vec<String>,
}

/// Splits raw model output at the first [`FOLLOW_UP_MARKER`]. Never fails:
/// without a marker the whole text is the answer.
pub fn parse_response(raw: &str) -> ParsedAnswer {
    match raw.split_once(FOLLOW_UP_MARKER) {
        Some((main, rest)) => ParsedAnswer {
            has_follow_ups: true,
            main: main.to_string(),
            follow_ups: rest
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        },
        None => ParsedAnswer {
            has_follow_ups: false,
            main: raw.to_string(),
            follow_ups: Vec::new(),
        },
    }
}
