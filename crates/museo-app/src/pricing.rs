// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_BASE_PRICE: Price = Price::from_rupees(200);
pub const GROUP_DISCOUNT_MIN_PEOPLE: u32 = 5;
const GROUP_DISCOUNT_PERCENT: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TourType {
    Guided,
    SelfGuided,
    Virtual,
    Group,
    Educational,
}

impl TourType {
    pub const ALL: [Self; 5] = [
        Self::Guided,
        Self::SelfGuided,
        Self::Virtual,
        Self::Group,
        Self::Educational,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guided => "guided",
            Self::SelfGuided => "self-guided",
            Self::Virtual => "virtual",
            Self::Group => "group",
            Self::Educational => "educational",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "guided" => Some(Self::Guided),
            "self-guided" => Some(Self::SelfGuided),
            "virtual" => Some(Self::Virtual),
            "group" => Some(Self::Group),
            "educational" => Some(Self::Educational),
            _ => None,
        }
    }

    /// Per-person price.
    pub const fn base_price(self) -> Price {
        match self {
            Self::Guided => Price::from_rupees(500),
            Self::SelfGuided => Price::from_rupees(200),
            Self::Virtual => Price::from_rupees(100),
            Self::Group => Price::from_rupees(300),
            Self::Educational => Price::from_rupees(400),
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Guided => "Professional guide included",
            Self::SelfGuided => "Audio guide available",
            Self::Virtual => "Online experience",
            Self::Group => "10% discount for 5+ people",
            Self::Educational => "Educational materials included",
        }
    }
}

/// An amount in paise. Arithmetic stays exact; rounding happens only for display.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Price(i64);

impl Price {
    pub const fn from_paise(paise: i64) -> Self {
        Self(paise)
    }

    pub const fn from_rupees(rupees: i64) -> Self {
        Self(rupees * 100)
    }

    pub const fn paise(self) -> i64 {
        self.0
    }

    pub fn rupees(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Nearest whole rupee, halves rounded away from zero.
    pub const fn rounded_rupees(self) -> i64 {
        let whole = self.0 / 100;
        let rest = self.0 % 100;
        if rest >= 50 {
            whole + 1
        } else if rest <= -50 {
            whole - 1
        } else {
            whole
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rupees = self.rounded_rupees();
        let sign = if rupees < 0 { "-" } else { "" };
        write!(f, "{sign}₹{}", group_thousands(rupees.unsigned_abs()))
    }
}

/// Total for `people` visitors on the tier named `tier_key`.
///
/// Unknown tiers fall back to [`DEFAULT_BASE_PRICE`]; group bookings of
/// [`GROUP_DISCOUNT_MIN_PEOPLE`] or more get ten percent off.
pub fn calculate_total(people: u32, tier_key: &str) -> Price {
    let tier = TourType::parse(tier_key);
    let base = tier.map_or(DEFAULT_BASE_PRICE, TourType::base_price);
    let mut total = base.paise() * i64::from(people);
    if tier == Some(TourType::Group) && people >= GROUP_DISCOUNT_MIN_PEOPLE {
        total = total * (100 - GROUP_DISCOUNT_PERCENT) / 100;
    }
    Price::from_paise(total)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}
