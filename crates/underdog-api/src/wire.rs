//! Defensive parsing of API-Football payloads.
//!
//! Every response is an envelope `{ "errors": ..., "response": [...] }`.
//! `errors` is an empty array on success, but the provider sends a
//! non-empty object (`{"token": "..."}`) or array on failure. Missing or
//! mistyped keys inside a row degrade to "no data" rather than failing the
//! whole response.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;
use underdog_core::{
    parse_decimal_odds, LeagueId, MatchId, MatchSnapshot, MatchStatus, OddsQuote,
};

/// Bet id of the Match Winner market.
pub const MATCH_WINNER_BET_ID: u64 = 1;

/// Provider error messages carried in the envelope, if any.
pub fn provider_errors(body: &Value) -> Option<String> {
    match body.get("errors") {
        Some(Value::Array(items)) if !items.is_empty() => Some(
            items
                .iter()
                .map(value_to_text)
                .collect::<Vec<_>>()
                .join("; "),
        ),
        Some(Value::Object(map)) if !map.is_empty() => Some(
            map.iter()
                .map(|(k, v)| format!("{k}: {}", value_to_text(v)))
                .collect::<Vec<_>>()
                .join("; "),
        ),
        _ => None,
    }
}

/// The `response` array of an envelope.
pub fn response_items(body: &Value) -> Option<&Vec<Value>> {
    body.get("response").and_then(Value::as_array)
}

/// Parse one fixture row.
///
/// Returns `None` when the row lacks a fixture id or team names.
/// Null goals count as zero.
pub fn parse_fixture(item: &Value) -> Option<MatchSnapshot> {
    let fixture = item.get("fixture")?;
    let match_id = fixture.get("id").and_then(Value::as_u64)?;

    let teams = item.get("teams")?;
    let home_team = teams.pointer("/home/name").and_then(Value::as_str)?;
    let away_team = teams.pointer("/away/name").and_then(Value::as_str)?;

    let status = fixture
        .pointer("/status/short")
        .and_then(Value::as_str)
        .map(MatchStatus::from_code)
        .unwrap_or_else(|| MatchStatus::Other(String::new()));
    let elapsed_minute = fixture
        .pointer("/status/elapsed")
        .and_then(Value::as_u64)
        .map(|m| m as u32);

    let league_id = item
        .pointer("/league/id")
        .and_then(Value::as_u64)
        .map(|id| LeagueId::new(id as u32));

    Some(MatchSnapshot {
        match_id: MatchId::new(match_id),
        league_id,
        home_team: home_team.to_string(),
        away_team: away_team.to_string(),
        home_score: goals(item, "home"),
        away_score: goals(item, "away"),
        status,
        elapsed_minute,
    })
}

/// Parse every fixture row, skipping unusable ones.
pub fn parse_fixtures(items: &[Value]) -> Vec<MatchSnapshot> {
    items
        .iter()
        .filter_map(|item| {
            let parsed = parse_fixture(item);
            if parsed.is_none() {
                debug!("Skipping fixture row without id or team names");
            }
            parsed
        })
        .collect()
}

/// Parse Match Winner odds from an `/odds` response.
///
/// Reads the first bookmaker's Match Winner bet (falling back to its first
/// bet). Prices that do not parse are left absent.
pub fn parse_odds(match_id: MatchId, items: &[Value], fetched_at: DateTime<Utc>) -> OddsQuote {
    let mut quote = OddsQuote::empty(match_id, fetched_at);

    let Some(bets) = items
        .first()
        .and_then(|item| item.pointer("/bookmakers/0/bets"))
        .and_then(Value::as_array)
    else {
        return quote;
    };

    let bet = bets
        .iter()
        .find(|b| b.get("id").and_then(Value::as_u64) == Some(MATCH_WINNER_BET_ID))
        .or_else(|| bets.first());

    let Some(values) = bet.and_then(|b| b.get("values")).and_then(Value::as_array) else {
        return quote;
    };

    for entry in values {
        let Some(label) = entry.get("value").and_then(Value::as_str) else {
            continue;
        };
        let raw = match entry.get("odd") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => continue,
        };
        match parse_decimal_odds(&raw) {
            Ok(odds) => quote.set_by_label(label, odds),
            Err(e) => debug!(%match_id, label, raw = %raw, error = %e, "Ignoring unparseable odds"),
        }
    }

    quote
}

fn goals(item: &Value, side: &str) -> u32 {
    item.get("goals")
        .and_then(|g| g.get(side))
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
