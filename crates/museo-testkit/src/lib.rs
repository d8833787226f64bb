// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use museo_app::{
    BookingRecord, CollectionSource, Error, Item, PagePayload, Result, TAG_CITY, TAG_STATE,
    TAG_TYPE,
};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use time::{Date, Duration, Month};

const MUSEUM_TYPES: [&str; 8] = [
    "Art",
    "History",
    "Science",
    "Archaeology",
    "Natural History",
    "Military",
    "Textile",
    "Railway",
];

const PLACES: [(&str, &str); 12] = [
    ("Delhi", "Delhi"),
    ("Mumbai", "Maharashtra"),
    ("Pune", "Maharashtra"),
    ("Kolkata", "West Bengal"),
    ("Chennai", "Tamil Nadu"),
    ("Hyderabad", "Telangana"),
    ("Bengaluru", "Karnataka"),
    ("Mysuru", "Karnataka"),
    ("Jaipur", "Rajasthan"),
    ("Ahmedabad", "Gujarat"),
    ("Kochi", "Kerala"),
    ("Bhopal", "Madhya Pradesh"),
];

const NAME_PREFIXES: [&str; 10] = [
    "Government",
    "Heritage",
    "Regional",
    "National",
    "City",
    "Royal",
    "Victoria",
    "Prince of Wales",
    "Salar Jung",
    "Tribal",
];

const NAME_SUFFIXES: [&str; 6] = [
    "Museum",
    "Gallery",
    "Centre",
    "Collection",
    "Archive",
    "Memorial",
];

const VISIT_TIMES: [&str; 6] = ["10:00", "11:00", "12:00", "14:00", "15:00", "16:00"];
const ATTENDANCE: [&str; 3] = ["Yes", "No", "Cancelled"];

/// Seeded generator for museum catalogs and booking history.
pub struct MuseumFaker {
    state: u64,
    issued: usize,
}

impl MuseumFaker {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed,
            issued: 0,
        }
    }

    /// splitmix64 step; every draw advances the stream by one.
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn below(&mut self, bound: usize) -> usize {
        match u64::try_from(bound) {
            Ok(bound) if bound > 1 => (self.next_u64() % bound) as usize,
            _ => 0,
        }
    }

    fn coin(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }

    pub fn museum(&mut self) -> Item {
        self.issued += 1;
        let (city, state) = PLACES[self.below(PLACES.len())];
        let kind = self.pick(&MUSEUM_TYPES);
        let name = format!(
            "{} {} {} {}",
            self.pick(&NAME_PREFIXES),
            kind,
            self.pick(&NAME_SUFFIXES),
            self.issued
        );
        let mut item = Item::new(format!("mus-{:04}", self.issued), name)
            .with_tag(TAG_CITY, city)
            .with_tag(TAG_STATE, state)
            .with_tag(TAG_TYPE, kind);
        if self.coin() {
            item.established = Some((1850 + self.below(170)).to_string());
        }
        item
    }

    pub fn catalog(&mut self, count: usize) -> Vec<Item> {
        (0..count).map(|_| self.museum()).collect()
    }

    /// A booking dated within thirty days either side of `today`.
    pub fn booking_record(&mut self, today: Date) -> BookingRecord {
        let offset = self.below(61) as i64 - 30;
        let date = today.saturating_add(Duration::days(offset));
        let attended = self.pick(&ATTENDANCE).to_owned();
        let rating = if attended == "Yes" && self.coin() {
            Some(1 + self.below(5) as u8)
        } else {
            None
        };
        BookingRecord {
            ticket_id: format!("{:08x}", self.next_u64() & 0xFFFF_FFFF),
            museum: self.museum().name,
            date: date.to_string(),
            time: self.pick(&VISIT_TIMES).to_owned(),
            attended,
            rating,
            review: rating.map(|_| "Lovely galleries".to_owned()),
            museum_type: self.pick(&MUSEUM_TYPES).to_owned(),
        }
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.below(items.len())]
    }
}

/// Fixed reference day for date-sensitive tests.
pub fn fixture_today() -> Date {
    Date::from_calendar_date(2026, Month::June, 15).unwrap_or(Date::MIN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    Envelope,
    Bare,
}

/// Releases a page fetch held back by [`ScriptedSource::hold_page`].
pub struct PageGate(Sender<()>);

impl PageGate {
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

/// In-memory [`CollectionSource`] that pages a fixed catalog and can be
/// scripted to fail or to hold a response until released.
pub struct ScriptedSource {
    catalog: Vec<Item>,
    shape: PayloadShape,
    failures: Mutex<VecDeque<Error>>,
    gates: Mutex<BTreeMap<u32, Receiver<()>>>,
    calls: Mutex<Vec<(u32, u32)>>,
}

impl ScriptedSource {
    pub fn new(catalog: Vec<Item>) -> Self {
        Self {
            catalog,
            shape: PayloadShape::Envelope,
            failures: Mutex::new(VecDeque::new()),
            gates: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn bare(catalog: Vec<Item>) -> Self {
        Self {
            shape: PayloadShape::Bare,
            ..Self::new(catalog)
        }
    }

    pub fn catalog(&self) -> &[Item] {
        &self.catalog
    }

    /// The next fetch returns `error` instead of a page.
    pub fn fail_next(&self, error: Error) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push_back(error);
        }
    }

    /// The next fetch of `page` blocks until the returned gate is released.
    pub fn hold_page(&self, page: u32) -> PageGate {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut gates) = self.gates.lock() {
            gates.insert(page, rx);
        }
        PageGate(tx)
    }

    pub fn calls(&self) -> Vec<(u32, u32)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn page_slice(&self, page: u32, per_page: u32) -> Vec<Item> {
        let per_page = per_page.max(1) as usize;
        let start = (page.max(1) as usize - 1) * per_page;
        self.catalog
            .iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect()
    }
}

impl CollectionSource for ScriptedSource {
    fn fetch_page(&self, page: u32, per_page: u32) -> Result<PagePayload> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((page, per_page));
        }
        let gate = self
            .gates
            .lock()
            .ok()
            .and_then(|mut gates| gates.remove(&page));
        if let Some(gate) = gate {
            let _ = gate.recv();
        }
        let failure = self
            .failures
            .lock()
            .ok()
            .and_then(|mut failures| failures.pop_front());
        if let Some(error) = failure {
            return Err(error);
        }

        match self.shape {
            PayloadShape::Bare => Ok(PagePayload::Bare(self.catalog.clone())),
            PayloadShape::Envelope => Ok(PagePayload::Envelope {
                items: self.page_slice(page, per_page),
                page: Some(page),
                per_page: Some(per_page),
                total: Some(self.catalog.len() as u32),
                total_pages: None,
            }),
        }
    }
}
