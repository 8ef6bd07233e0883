//! Keyword-based intent classification and answer rendering for
//! free-text questions.
//!
//! Classification is deliberately shallow: lowercase the question, look
//! for intent keywords in a fixed priority order, and pull out any
//! parameters with small hand-rolled extractors.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::scoring::dow_label;
use super::types::{ClientAssignments, ScheduleSuggestion};
use super::{aggregates::SnapshotAggregates, FALLBACK_DOW};
use crate::domain::{Snapshot, VenueId};

/// One of the fixed question intents, with its extracted parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryIntent {
    /// "top ... venues", optionally "ranked by <criterion>".
    TopVenues { criterion: Option<String> },
    /// "weekly plan", optionally "for this week|next week|N days".
    WeeklyPlan { days: u32, period_label: String },
    /// "clients to focus" or "focus clients".
    FocusClients,
    /// "underperforming venues", optionally "below|under $N".
    UnderperformingVenues { threshold: Option<f64> },
    /// Anything else.
    QuickPlan,
}

/// Map a question onto an intent. Earlier branches win when keywords
/// for several intents appear in one question.
pub fn classify(question: &str) -> QueryIntent {
    let q = question.to_lowercase();

    if q.contains("top") && q.contains("venues") {
        return QueryIntent::TopVenues { criterion: extract_rank_criterion(&q) };
    }
    if q.contains("weekly plan") {
        let (days, period_label) = extract_plan_period(&q);
        return QueryIntent::WeeklyPlan { days, period_label };
    }
    if q.contains("clients to focus") || q.contains("focus clients") {
        return QueryIntent::FocusClients;
    }
    if q.contains("underperforming venues") {
        return QueryIntent::UnderperformingVenues { threshold: extract_dollar_threshold(&q) };
    }
    QueryIntent::QuickPlan
}

/// The words after "ranked by", lowercased and trimmed. "ranked" and
/// "by" must be separate words, as must whatever follows.
fn extract_rank_criterion(q: &str) -> Option<String> {
    let idx = q.find("ranked")?;
    let rest = q[idx + "ranked".len()..].strip_prefix(char::is_whitespace)?;
    let rest = rest.trim_start().strip_prefix("by")?;
    let rest = rest.strip_prefix(char::is_whitespace)?;
    let criterion: String = rest
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic() || *c == ' ')
        .collect();
    let criterion = criterion.trim();
    if criterion.is_empty() {
        None
    } else {
        Some(criterion.to_owned())
    }
}

/// The time period after "for": "this week", "next week" or "N days".
/// Anything else means this week.
fn extract_plan_period(q: &str) -> (u32, String) {
    let default = (7, "this week".to_owned());

    let mut search = q;
    while let Some(idx) = search.find("for") {
        let rest = &search[idx + "for".len()..];
        if rest.starts_with(char::is_whitespace) {
            let rest = rest.trim_start();
            if rest.starts_with("this week") {
                return (7, "this week".to_owned());
            }
            if rest.starts_with("next week") {
                return (7, "next week".to_owned());
            }
            if let Some((days, label)) = parse_days_period(rest) {
                return (days, label);
            }
        }
        search = &search[idx + "for".len()..];
    }
    default
}

/// Parse a leading "N days" (whitespace between is optional).
fn parse_days_period(text: &str) -> Option<(u32, String)> {
    let digits: String = text.chars().take_while(char::is_ascii_digit).collect();
    let days: u32 = digits.parse().ok()?;
    let rest = text[digits.len()..].trim_start();
    if rest.starts_with("days") {
        Some((days, format!("{days} days")))
    } else {
        None
    }
}

/// Dollar amount after "below" or "under"; the earlier keyword wins.
fn extract_dollar_threshold(q: &str) -> Option<f64> {
    let idx = match (q.find("below"), q.find("under")) {
        (Some(a), Some(b)) => {
            if a < b {
                a + "below".len()
            } else {
                b + "under".len()
            }
        }
        (Some(a), None) => a + "below".len(),
        (None, Some(b)) => b + "under".len(),
        (None, None) => return None,
    };
    let rest = q[idx..].trim_start();
    let rest = rest.strip_prefix('$').unwrap_or(rest);
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn venue_name(snapshot: &Snapshot, venue_id: &VenueId) -> String {
    snapshot
        .venues
        .iter()
        .find(|venue| venue.id.as_ref() == Some(venue_id))
        .map(|venue| venue.name.clone())
        .unwrap_or_else(|| venue_id.to_string())
}

/// Top three venue names by average recorded earnings, descending.
/// Equal averages break ties by name so the answer is stable.
pub fn top_venues_by_earnings(snapshot: &Snapshot, aggregates: &SnapshotAggregates) -> Vec<String> {
    let mut ranked: Vec<(String, f64)> = aggregates
        .venue_averages()
        .map(|(id, avg)| (venue_name(snapshot, id), avg))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(3);
    ranked.into_iter().map(|(name, _)| name).collect()
}

/// Top three venue names by their best compatibility score anywhere in
/// the recommendation matrix.
pub fn top_venues_by_compatibility(assignments: &[ClientAssignments]) -> Vec<String> {
    let mut best: HashMap<String, f64> = HashMap::new();
    for row in assignments {
        for rec in &row.recommendations {
            let entry = best.entry(rec.venue.name.clone()).or_insert(0.0);
            if rec.compatibility.score > *entry {
                *entry = rec.compatibility.score;
            }
        }
    }
    let mut ranked: Vec<(String, f64)> = best.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(3);
    ranked.into_iter().map(|(name, _)| name).collect()
}

/// Up to five "client: venue on Day" entries joined with " | ".
pub fn render_weekly_plan(period_label: &str, plan: &[ScheduleSuggestion]) -> String {
    let summary: Vec<String> = plan
        .iter()
        .take(5)
        .map(|entry| {
            format!("{}: {} on {}", entry.client.name, entry.venue.name, dow_label(entry.best_day))
        })
        .collect();
    format!("Weekly plan ({period_label}): {}", summary.join(" | "))
}

/// High-value clients (value score >= 8) whose best recommendation
/// scores at least 0.5, each paired with that venue.
pub fn render_focus_clients(assignments: &[ClientAssignments]) -> String {
    let focus: Vec<String> = assignments
        .iter()
        .filter(|row| row.client.value_score >= 8.0 && row.best_score() >= 0.5)
        .map(|row| {
            let venue = row
                .recommendations
                .first()
                .map(|rec| rec.venue.name.as_str())
                .unwrap_or("—");
            format!("{} → {}", row.client.name, venue)
        })
        .collect();
    if focus.is_empty() {
        "No high-priority clients identified.".to_owned()
    } else {
        format!("Focus clients: {}", focus.join(", "))
    }
}

/// Venues whose average earnings fall strictly below the threshold,
/// ascending, capped at five. Without an explicit threshold, 40% of
/// the best venue average is used.
pub fn render_underperforming_venues(
    snapshot: &Snapshot,
    aggregates: &SnapshotAggregates,
    threshold: Option<f64>,
) -> String {
    let threshold = threshold.unwrap_or_else(|| (aggregates.venue_max_avg * 0.4).round());
    let mut rows: Vec<(String, f64)> = aggregates
        .venue_averages()
        .filter(|(_, avg)| *avg < threshold)
        .map(|(id, avg)| (venue_name(snapshot, id), avg))
        .collect();
    rows.sort_by(|a, b| {
        a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0))
    });
    rows.truncate(5);

    if rows.is_empty() {
        return "No venues under the performance threshold.".to_owned();
    }
    let list: Vec<String> = rows
        .into_iter()
        .map(|(name, avg)| format!("{} (${})", name, avg.round() as i64))
        .collect();
    format!(
        "Underperforming venues (avg < ${}): {}",
        threshold.round() as i64,
        list.join(", ")
    )
}

/// Fallback: the best venue and day for the first three clients, plus
/// a hint listing the supported question shapes.
pub fn render_quick_plan(assignments: &[ClientAssignments]) -> String {
    let summary: Vec<String> = assignments
        .iter()
        .take(3)
        .map(|row| {
            let best = row.recommendations.first();
            let venue = best.map(|rec| rec.venue.name.as_str()).unwrap_or("—");
            let day = best
                .and_then(|rec| {
                    rec.compatibility.client_best_day.or(rec.compatibility.venue_best_day)
                })
                .unwrap_or(FALLBACK_DOW);
            format!("{}: {} on {}", row.client.name, venue, dow_label(day))
        })
        .collect();
    format!(
        "Here's the quick plan: {}. Ask \"top 3 venues ranked by <compatibility|earnings>\", \
         \"weekly plan for <this week|next week|7 days>\", \"clients to focus\", or \
         \"underperforming venues under <amount>\".",
        summary.join(" | ")
    )
}
