// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use museo_app::{
    BookingRecord, CollectionBrowser, CollectionSource, Error, HistoryFilter, Item,
    PageDescriptor, PageToken, TourType, ViewChanged, calculate_total, dashboard_stats,
    earliest_visit_date, filter_history, slots_for, sort_newest_first, stars,
};
use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;
use time::Date;
use tracing::debug;

/// What to show from the collection in one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseRequest {
    pub page: u32,
    pub filters: Vec<(String, String)>,
    pub search: Option<String>,
    pub select: Option<String>,
}

/// Drives a browser through one request and returns the rendered final view.
pub struct BrowseRuntime<S> {
    browser: CollectionBrowser<S>,
    last_view: Rc<RefCell<String>>,
}

impl<S: CollectionSource> BrowseRuntime<S> {
    pub fn new(mut browser: CollectionBrowser<S>) -> Self {
        let last_view = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&last_view);
        browser.subscribe(move |view| {
            *sink.borrow_mut() = render_view(view);
        });
        Self { browser, last_view }
    }

    pub fn browser(&self) -> &CollectionBrowser<S> {
        &self.browser
    }

    pub fn run(&mut self, request: &BrowseRequest) -> Result<String> {
        let page = request.page.max(1);
        self.browser
            .goto_page(page)
            .with_context(|| format!("load page {page}"))?;

        for (key, value) in &request.filters {
            debug!(key, value, "applying filter");
            self.browser.set_filter(key, value);
        }
        if let Some(term) = &request.search {
            self.browser.set_search_term(term);
        }
        if let Some(id) = &request.select {
            self.browser
                .select_item(id)
                .with_context(|| format!("select {id:?}; pick an id from the listing"))?;
        }

        let mut out = self.last_view.borrow().clone();
        out.push_str(&render_pager(
            &self.browser.pagination_window(),
            self.browser.page().page,
        ));
        out.push('\n');
        Ok(out)
    }
}

pub fn render_view(view: &ViewChanged<'_>) -> String {
    let mut out = String::new();
    out.push_str(&render_header(view.page, view.items.len()));
    let active: Vec<String> = view
        .filters
        .active()
        .map(|(key, value)| format!("{key}={value}"))
        .chain(view.filters.search_term().map(|term| format!("search={term:?}")))
        .collect();
    if !active.is_empty() {
        let _ = writeln!(out, "Filters: {}", active.join(", "));
    }
    if view.items.is_empty() {
        out.push_str("  (no museums match)\n");
    }
    for item in &view.items {
        out.push_str(&render_item_row(item));
    }
    if let Some(selected) = view.selected {
        let _ = writeln!(out, "Selected: {}", describe_item(selected));
    }
    out
}

fn render_header(page: PageDescriptor, shown: usize) -> String {
    format!(
        "Page {} of {} ({} museums, {} shown)\n",
        page.page, page.total_pages, page.total, shown
    )
}

fn render_item_row(item: &Item) -> String {
    let mut row = format!("  {:<12} {}", item.id.as_str(), item.name);
    let location = item.location_label();
    if !location.is_empty() {
        let _ = write!(row, " -- {location}");
    }
    if !item.kind().is_empty() {
        let _ = write!(row, " [{}]", item.kind());
    }
    if let Some(distance) = item.distance_km {
        let _ = write!(row, " {distance:.1} km");
    }
    row.push('\n');
    row
}

fn describe_item(item: &Item) -> String {
    let mut out = item.name.clone();
    let location = item.location_label();
    if !location.is_empty() {
        let _ = write!(out, ", {location}");
    }
    if let Some(established) = &item.established {
        let _ = write!(out, " (est. {established})");
    }
    out
}

/// Renders pager tokens with the current page in brackets.
pub fn render_pager(tokens: &[PageToken], current: u32) -> String {
    tokens
        .iter()
        .map(|token| match token {
            PageToken::Page(page) if *page == current => format!("[{page}]"),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_price(people: u32, tier: &str) -> String {
    let total = calculate_total(people, tier);
    match TourType::parse(tier) {
        Some(tour) => format!(
            "{people} x {} tour: {total} ({})",
            tour.as_str(),
            tour.description()
        ),
        None => format!("{people} x {tier} tour: {total} (standard rate)"),
    }
}

pub fn render_slots(date: Date, today: Date) -> Result<String> {
    let earliest = earliest_visit_date(today);
    if date < earliest {
        bail!("visits can be booked from {earliest} onwards, got {date}");
    }
    let labels: Vec<String> = slots_for(date)
        .into_iter()
        .map(|slot| format!("{} ({})", slot.label, slot.value))
        .collect();
    Ok(format!("{date} ({}): {}\n", date.weekday(), labels.join(", ")))
}

pub fn render_history(records: &[BookingRecord], filter: HistoryFilter, today: Date) -> String {
    let stats = dashboard_stats(records, today);
    let mut out = format!(
        "Bookings: {}  Museums: {}  Avg rating: {}  Upcoming: {}\n",
        stats.total_bookings,
        stats.museums_visited,
        stats.average_label(),
        stats.upcoming_tours
    );

    let mut sorted = records.to_vec();
    sort_newest_first(&mut sorted);
    let rows = filter_history(&sorted, filter, today);
    if rows.is_empty() {
        out.push_str("  (no bookings)\n");
    }
    for record in rows {
        let actions = record.actions_on(today);
        let mut available = Vec::new();
        if actions.can_cancel {
            available.push("cancel");
        }
        if actions.can_review {
            available.push("review");
        }
        let rating = record.rating.map(stars).unwrap_or_default();
        let _ = writeln!(
            out,
            "  {:<10} {:<10} {:<6} {:<9} {} {}{}",
            record.ticket_id,
            record.date,
            record.time,
            record.status_on(today).label(),
            record.museum,
            rating,
            if available.is_empty() {
                String::new()
            } else {
                format!(" <{}>", available.join("|"))
            }
        );
    }
    out
}

/// Looks the ticket up in loaded history and checks it can still be cancelled.
pub fn check_cancellable(
    records: &[BookingRecord],
    ticket_id: &str,
    today: Date,
) -> museo_app::Result<()> {
    let ticket_id = ticket_id.trim();
    let record = records
        .iter()
        .find(|record| record.ticket_id == ticket_id)
        .ok_or_else(|| Error::not_found("booking", ticket_id))?;
    if !record.actions_on(today).can_cancel {
        return Err(Error::validation(format!(
            "booking {ticket_id} is {} and can no longer be cancelled",
            record.status_on(today).label()
        )));
    }
    Ok(())
}

/// Unknown tickets get a generic message; other failures keep their cause.
pub fn cancel_outcome(result: museo_app::Result<String>) -> Result<String> {
    match result {
        Ok(message) if message.trim().is_empty() => Ok("Booking cancelled".to_owned()),
        Ok(message) => Ok(message),
        Err(Error::NotFound { id, .. }) => {
            debug!(ticket_id = %id, "cancel target not found");
            bail!("failed to cancel booking")
        }
        Err(error) => Err(anyhow::Error::new(error).context("failed to cancel booking")),
    }
}
