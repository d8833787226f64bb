// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use time::Date;
use time::macros::format_description;

pub const ATTENDED_YES: &str = "Yes";
pub const ATTENDED_CANCELLED: &str = "Cancelled";
pub const MAX_RATING: u8 = 5;

/// One row of `GET /api/history`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    #[serde(rename = "TicketID", default)]
    pub ticket_id: String,
    #[serde(rename = "Museum", default)]
    pub museum: String,
    #[serde(rename = "Date", default)]
    pub date: String,
    #[serde(rename = "Time", default)]
    pub time: String,
    #[serde(rename = "Attended", default)]
    pub attended: String,
    #[serde(rename = "Rating", default, deserialize_with = "lenient_rating")]
    pub rating: Option<u8>,
    #[serde(rename = "Review", default)]
    pub review: Option<String>,
    #[serde(rename = "MuseumType", default)]
    pub museum_type: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRating {
    Int(i64),
    Float(f64),
    Text(String),
}

fn lenient_rating<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawRating>::deserialize(deserializer)?;
    let value = match raw {
        None => None,
        Some(RawRating::Int(value)) => Some(value),
        Some(RawRating::Float(value)) => Some(value.round() as i64),
        Some(RawRating::Text(text)) => text.trim().parse::<f64>().ok().map(|v| v.round() as i64),
    };
    Ok(value
        .filter(|rating| (1..=i64::from(MAX_RATING)).contains(rating))
        .and_then(|rating| u8::try_from(rating).ok()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Upcoming,
    Cancelled,
    Completed,
    Missed,
}

impl BookingStatus {
    pub const ALL: [Self; 4] = [Self::Upcoming, Self::Completed, Self::Missed, Self::Cancelled];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
            Self::Missed => "missed",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::Cancelled => "Cancelled",
            Self::Completed => "Completed",
            Self::Missed => "Missed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryFilter {
    #[default]
    All,
    Only(BookingStatus),
}

impl HistoryFilter {
    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        BookingStatus::parse(value).map(Self::Only)
    }

    pub fn admits(self, status: BookingStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

/// What a visitor may still do with a booking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingActions {
    pub can_cancel: bool,
    pub can_review: bool,
}

impl BookingRecord {
    pub fn visit_date(&self) -> Option<Date> {
        parse_visit_date(&self.date)
    }

    /// Status relative to `today`. Unparseable dates count as upcoming.
    pub fn status_on(&self, today: Date) -> BookingStatus {
        if self.attended == ATTENDED_CANCELLED {
            return BookingStatus::Cancelled;
        }
        match self.visit_date() {
            Some(date) if date < today => {
                if self.attended == ATTENDED_YES {
                    BookingStatus::Completed
                } else {
                    BookingStatus::Missed
                }
            }
            _ => BookingStatus::Upcoming,
        }
    }

    pub fn actions_on(&self, today: Date) -> BookingActions {
        let status = self.status_on(today);
        BookingActions {
            can_cancel: status == BookingStatus::Upcoming,
            can_review: self.rating.is_none() && status != BookingStatus::Cancelled,
        }
    }

    pub fn is_upcoming_tour(&self, today: Date) -> bool {
        self.attended != ATTENDED_YES && self.visit_date().is_some_and(|date| date >= today)
    }
}

pub fn parse_visit_date(value: &str) -> Option<Date> {
    let trimmed = value.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    Date::parse(day, format_description!("[year]-[month]-[day]")).ok()
}

/// Newest visit first; records with unreadable dates go last, keeping their relative order.
pub fn sort_newest_first(records: &mut [BookingRecord]) {
    records.sort_by(|left, right| match (left.visit_date(), right.visit_date()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

pub fn filter_history<'a>(
    records: &'a [BookingRecord],
    filter: HistoryFilter,
    today: Date,
) -> Vec<&'a BookingRecord> {
    records
        .iter()
        .filter(|record| filter.admits(record.status_on(today)))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashboardStats {
    pub total_bookings: usize,
    pub museums_visited: usize,
    pub average_rating: Option<f64>,
    pub upcoming_tours: usize,
}

impl DashboardStats {
    pub fn average_label(&self) -> String {
        format!("{:.1}", self.average_rating.unwrap_or(0.0))
    }
}

pub fn dashboard_stats(records: &[BookingRecord], today: Date) -> DashboardStats {
    let museums: BTreeSet<&str> = records
        .iter()
        .map(|record| record.museum.as_str())
        .filter(|museum| !museum.is_empty())
        .collect();
    let ratings: Vec<u8> = records.iter().filter_map(|record| record.rating).collect();
    let average_rating = if ratings.is_empty() {
        None
    } else {
        let sum: u32 = ratings.iter().map(|rating| u32::from(*rating)).sum();
        Some(f64::from(sum) / ratings.len() as f64)
    };
    DashboardStats {
        total_bookings: records.len(),
        museums_visited: museums.len(),
        average_rating,
        upcoming_tours: records
            .iter()
            .filter(|record| record.is_upcoming_tour(today))
            .count(),
    }
}

pub fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(MAX_RATING));
    let mut out = "★".repeat(filled);
    out.push_str(&"☆".repeat(usize::from(MAX_RATING) - filled));
    out
}

#[cfg(test)]
mod tests {
    use super::{
        BookingRecord, BookingStatus, DashboardStats, HistoryFilter, dashboard_stats,
        filter_history, sort_newest_first, stars,
    };
    use time::macros::date;

    fn record(ticket: &str, museum: &str, day: &str, attended: &str) -> BookingRecord {
        BookingRecord {
            ticket_id: ticket.to_owned(),
            museum: museum.to_owned(),
            date: day.to_owned(),
            time: "10:00".to_owned(),
            attended: attended.to_owned(),
            ..BookingRecord::default()
        }
    }

    #[test]
    fn status_derivation() {
        let today = date!(2026 - 06 - 15);
        assert_eq!(
            record("a", "X", "2026-06-10", "Yes").status_on(today),
            BookingStatus::Completed
        );
        assert_eq!(
            record("b", "X", "2026-06-10", "No").status_on(today),
            BookingStatus::Missed
        );
        assert_eq!(
            record("c", "X", "2026-06-10", "Cancelled").status_on(today),
            BookingStatus::Cancelled
        );
        assert_eq!(
            record("d", "X", "2026-06-15", "No").status_on(today),
            BookingStatus::Upcoming
        );
        assert_eq!(
            record("e", "X", "someday", "No").status_on(today),
            BookingStatus::Upcoming
        );
    }

    #[test]
    fn actions_follow_status_and_rating() {
        let today = date!(2026 - 06 - 15);
        let upcoming = record("a", "X", "2026-07-01", "No");
        assert!(upcoming.actions_on(today).can_cancel);
        assert!(upcoming.actions_on(today).can_review);

        let cancelled = record("b", "X", "2026-07-01", "Cancelled");
        assert!(!cancelled.actions_on(today).can_cancel);
        assert!(!cancelled.actions_on(today).can_review);

        let rated = BookingRecord {
            rating: Some(4),
            ..record("c", "X", "2026-06-01", "Yes")
        };
        assert!(!rated.actions_on(today).can_cancel);
        assert!(!rated.actions_on(today).can_review);
    }

    #[test]
    fn sorts_newest_first_with_invalid_dates_last() {
        let mut records = vec![
            record("old", "X", "2025-01-01", "Yes"),
            record("bad", "X", "", "No"),
            record("new", "X", "2026-02-01", "No"),
            record("mid", "X", "2025-06-01T00:00:00", "No"),
        ];
        sort_newest_first(&mut records);
        let order: Vec<&str> = records.iter().map(|r| r.ticket_id.as_str()).collect();
        assert_eq!(order, ["new", "mid", "old", "bad"]);
    }

    #[test]
    fn filter_selects_one_status() {
        let today = date!(2026 - 06 - 15);
        let records = vec![
            record("a", "X", "2026-06-01", "Yes"),
            record("b", "X", "2026-07-01", "No"),
            record("c", "X", "2026-07-02", "Cancelled"),
        ];
        let filter = HistoryFilter::parse("Upcoming").expect("known status");
        let rows = filter_history(&records, filter, today);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ticket_id, "b");
        assert_eq!(filter_history(&records, HistoryFilter::All, today).len(), 3);
        assert!(HistoryFilter::parse("pending").is_none());
    }

    #[test]
    fn stats_summarize_history() {
        let today = date!(2026 - 06 - 15);
        let records = vec![
            BookingRecord {
                rating: Some(5),
                ..record("a", "Salar Jung", "2026-06-01", "Yes")
            },
            BookingRecord {
                rating: Some(4),
                ..record("b", "Salar Jung", "2026-05-01", "Yes")
            },
            record("c", "Victoria Memorial", "2026-06-20", "No"),
            record("d", "Victoria Memorial", "2026-06-21", "Cancelled"),
        ];
        let stats = dashboard_stats(&records, today);
        assert_eq!(stats.total_bookings, 4);
        assert_eq!(stats.museums_visited, 2);
        assert_eq!(stats.upcoming_tours, 2);
        assert_eq!(stats.average_label(), "4.5");
        assert_eq!(DashboardStats::default().average_label(), "0.0");
    }

    #[test]
    fn rating_accepts_numbers_and_strings() {
        let rows: Vec<BookingRecord> = serde_json::from_str(
            r#"[
                {"TicketID": "a", "Rating": 4},
                {"TicketID": "b", "Rating": "3"},
                {"TicketID": "c", "Rating": 4.6},
                {"TicketID": "d", "Rating": null},
                {"TicketID": "e", "Rating": "n/a"},
                {"TicketID": "f"}
            ]"#,
        )
        .expect("history rows should parse");
        let ratings: Vec<Option<u8>> = rows.iter().map(|row| row.rating).collect();
        assert_eq!(ratings, [Some(4), Some(3), Some(5), None, None, None]);
    }

    #[test]
    fn stars_render_filled_then_empty() {
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(0), "☆☆☆☆☆");
        assert_eq!(stars(9), "★★★★★");
    }
}
