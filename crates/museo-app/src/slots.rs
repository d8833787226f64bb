// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::{Date, Duration, Weekday};

const WEEKEND_HOURS: [u8; 8] = [9, 10, 11, 12, 14, 15, 16, 17];
const WEEKDAY_HOURS: [u8; 6] = [10, 11, 12, 14, 15, 16];

/// A bookable start time: `value` goes on the wire, `label` is for people.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitSlot {
    pub value: String,
    pub label: String,
}

impl VisitSlot {
    fn on_the_hour(hour: u8) -> Self {
        let (display, meridiem) = match hour {
            0 => (12, "AM"),
            1..=11 => (hour, "AM"),
            12 => (12, "PM"),
            _ => (hour - 12, "PM"),
        };
        Self {
            value: format!("{hour:02}:00"),
            label: format!("{display}:00 {meridiem}"),
        }
    }
}

pub fn is_weekend(date: Date) -> bool {
    matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
}

pub fn slots_for(date: Date) -> Vec<VisitSlot> {
    let hours: &[u8] = if is_weekend(date) {
        &WEEKEND_HOURS
    } else {
        &WEEKDAY_HOURS
    };
    hours.iter().copied().map(VisitSlot::on_the_hour).collect()
}

pub fn earliest_visit_date(today: Date) -> Date {
    today.saturating_add(Duration::days(1))
}
