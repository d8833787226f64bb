// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Serialize;
use time::Date;
use time::macros::format_description;

use crate::error::{Error, Result};
use crate::model::Item;
use crate::pricing::{Price, calculate_total};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Booking,
    Review,
    Cancel,
    Attend,
    CreatePasskey,
    ValidatePasskey,
    AdminRegistration,
    AdminLogin,
}

impl FormKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Booking => "booking",
            Self::Review => "review",
            Self::Cancel => "cancellation",
            Self::Attend => "attendance",
            Self::CreatePasskey => "pass key creation",
            Self::ValidatePasskey => "pass key validation",
            Self::AdminRegistration => "admin registration",
            Self::AdminLogin => "admin login",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingFormInput {
    pub museum_name: String,
    pub museum_type: String,
    pub visit_date: Option<Date>,
    pub visit_time: String,
    pub people: u32,
    pub tour_type: String,
    pub visitor_name: String,
    pub visitor_email: String,
    pub visitor_phone: String,
    pub visitor_age: Option<u32>,
    pub special_requests: String,
    pub emergency_contact: String,
    pub terms_accepted: bool,
}

/// Wire body for `POST /api/book`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub museum: String,
    pub date: String,
    pub time: String,
    pub people: u32,
    pub tour_type: String,
    pub visitor_name: String,
    pub visitor_email: String,
    pub visitor_phone: String,
    pub visitor_age: u32,
    pub special_requests: String,
    pub emergency_contact: String,
    #[serde(rename = "type")]
    pub museum_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewFormInput {
    pub ticket_id: String,
    pub rating: Option<u8>,
    pub review: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelInput {
    pub ticket_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendInput {
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePasskeyInput {
    pub new_passkey: String,
    pub confirm_passkey: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasskeyInput {
    pub passkey: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminRegistrationInput {
    pub username: String,
    pub password: String,
    pub passkey: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminLoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPayload {
    Booking(BookingFormInput),
    Review(ReviewFormInput),
    Cancel(CancelInput),
    Attend(AttendInput),
    CreatePasskey(CreatePasskeyInput),
    ValidatePasskey(PasskeyInput),
    AdminRegistration(AdminRegistrationInput),
    AdminLogin(AdminLoginInput),
}

impl FormPayload {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::Booking(_) => FormKind::Booking,
            Self::Review(_) => FormKind::Review,
            Self::Cancel(_) => FormKind::Cancel,
            Self::Attend(_) => FormKind::Attend,
            Self::CreatePasskey(_) => FormKind::CreatePasskey,
            Self::ValidatePasskey(_) => FormKind::ValidatePasskey,
            Self::AdminRegistration(_) => FormKind::AdminRegistration,
            Self::AdminLogin(_) => FormKind::AdminLogin,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Booking(booking) => booking.validate(),
            Self::Review(review) => review.validate(),
            Self::Cancel(cancel) => cancel.validate(),
            Self::Attend(attend) => attend.validate(),
            Self::CreatePasskey(create) => create.validate(),
            Self::ValidatePasskey(passkey) => passkey.validate(),
            Self::AdminRegistration(registration) => registration.validate(),
            Self::AdminLogin(login) => login.validate(),
        }
    }
}

fn require(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(message));
    }
    Ok(())
}

impl BookingFormInput {
    /// Blank booking prefilled with the chosen museum.
    pub fn for_item(item: &Item) -> Self {
        Self {
            museum_name: item.name.clone(),
            museum_type: item.kind().to_owned(),
            visit_date: None,
            visit_time: String::new(),
            people: 1,
            tour_type: String::new(),
            visitor_name: String::new(),
            visitor_email: String::new(),
            visitor_phone: String::new(),
            visitor_age: None,
            special_requests: String::new(),
            emergency_contact: String::new(),
            terms_accepted: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require(&self.museum_name, "please select a museum first")?;
        if self.visit_date.is_none() {
            return Err(Error::validation("please fill in visit date"));
        }
        require(&self.visit_time, "please fill in visit time")?;
        if self.people == 0 {
            return Err(Error::validation("please fill in num people"));
        }
        require(&self.tour_type, "please fill in tour type")?;
        require(&self.visitor_name, "please fill in visitor name")?;
        require(&self.visitor_email, "please fill in visitor email")?;
        require(&self.visitor_phone, "please fill in visitor phone")?;
        if self.visitor_age.is_none() {
            return Err(Error::validation("please fill in visitor age"));
        }
        if !self.terms_accepted {
            return Err(Error::validation("please accept the terms and conditions"));
        }
        Ok(())
    }

    pub fn estimated_total(&self) -> Price {
        calculate_total(self.people, &self.tour_type)
    }

    /// Validates and builds the request body.
    pub fn to_request(&self) -> Result<BookingRequest> {
        self.validate()?;
        let date = self
            .visit_date
            .ok_or_else(|| Error::validation("please fill in visit date"))?
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(|error| Error::validation(format!("visit date cannot be formatted: {error}")))?;
        Ok(BookingRequest {
            museum: self.museum_name.clone(),
            date,
            time: self.visit_time.clone(),
            people: self.people,
            tour_type: self.tour_type.clone(),
            visitor_name: self.visitor_name.clone(),
            visitor_email: self.visitor_email.clone(),
            visitor_phone: self.visitor_phone.clone(),
            visitor_age: self.visitor_age.unwrap_or_default(),
            special_requests: self.special_requests.clone(),
            emergency_contact: self.emergency_contact.clone(),
            museum_type: self.museum_type.clone(),
        })
    }
}

impl ReviewFormInput {
    pub fn validate(&self) -> Result<()> {
        require(&self.ticket_id, "ticket id is required -- pick a booking and retry")?;
        match self.rating {
            None => Err(Error::validation("please select a rating")),
            Some(rating) if !(1..=5).contains(&rating) => Err(Error::validation(format!(
                "rating must be between 1 and 5, got {rating}"
            ))),
            Some(_) => Ok(()),
        }
    }
}

impl CancelInput {
    pub fn validate(&self) -> Result<()> {
        require(&self.ticket_id, "ticket id is required to cancel a booking")
    }
}

impl AttendInput {
    pub fn validate(&self) -> Result<()> {
        require(&self.date, "attendance date is required")?;
        require(&self.time, "attendance time is required")
    }
}

impl CreatePasskeyInput {
    pub fn validate(&self) -> Result<()> {
        if self.new_passkey.is_empty() || self.confirm_passkey.is_empty() {
            return Err(Error::validation("please fill all fields"));
        }
        if self.new_passkey != self.confirm_passkey {
            return Err(Error::validation("pass keys do not match"));
        }
        Ok(())
    }
}

impl PasskeyInput {
    pub fn validate(&self) -> Result<()> {
        if self.passkey.is_empty() {
            return Err(Error::validation("please enter the pass key"));
        }
        Ok(())
    }
}

impl AdminRegistrationInput {
    pub fn validate(&self) -> Result<()> {
        require(&self.username, "please fill all fields")?;
        if self.password.is_empty() {
            return Err(Error::validation("please fill all fields"));
        }
        if self.passkey.is_empty() {
            return Err(Error::validation(
                "validate a pass key before registering an admin",
            ));
        }
        Ok(())
    }
}

impl AdminLoginInput {
    pub fn validate(&self) -> Result<()> {
        require(&self.username, "please enter username and password")?;
        if self.password.is_empty() {
            return Err(Error::validation("please enter username and password"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AdminLoginInput, AdminRegistrationInput, BookingFormInput, CancelInput,
        CreatePasskeyInput, FormKind, FormPayload, PasskeyInput, ReviewFormInput,
    };
    use crate::{Error, Item, Price, TAG_TYPE};
    use time::{Date, Month};

    fn filled_booking() -> BookingFormInput {
        let item = Item::new("nm", "National Museum").with_tag(TAG_TYPE, "History");
        BookingFormInput {
            visit_date: Some(
                Date::from_calendar_date(2026, Month::March, 7).expect("valid visit date"),
            ),
            visit_time: "10:00".to_owned(),
            people: 5,
            tour_type: "group".to_owned(),
            visitor_name: "Asha Rao".to_owned(),
            visitor_email: "asha@example.com".to_owned(),
            visitor_phone: "+91 98765 43210".to_owned(),
            visitor_age: Some(34),
            terms_accepted: true,
            ..BookingFormInput::for_item(&item)
        }
    }

    #[test]
    fn booking_prefills_museum_from_item() {
        let item = Item::new("nm", "National Museum").with_tag(TAG_TYPE, "History");
        let booking = BookingFormInput::for_item(&item);
        assert_eq!(booking.museum_name, "National Museum");
        assert_eq!(booking.museum_type, "History");
        assert!(booking.validate().is_err());
    }

    #[test]
    fn booking_requires_every_field_in_order() {
        let mut booking = filled_booking();
        booking.visitor_phone = "   ".to_owned();
        let error = booking.validate().expect_err("blank phone should fail");
        assert_eq!(error, Error::validation("please fill in visitor phone"));

        let mut booking = filled_booking();
        booking.visit_date = None;
        booking.visitor_phone.clear();
        let error = booking.validate().expect_err("missing date should fail first");
        assert_eq!(error.to_string(), "please fill in visit date");
    }

    #[test]
    fn booking_requires_terms() {
        let booking = BookingFormInput {
            terms_accepted: false,
            ..filled_booking()
        };
        let error = booking.validate().expect_err("terms should be required");
        assert!(error.to_string().contains("terms and conditions"));
    }

    #[test]
    fn booking_request_uses_wire_names() {
        let request = filled_booking().to_request().expect("valid booking");
        assert_eq!(request.date, "2026-03-07");
        assert_eq!(request.museum, "National Museum");
        assert_eq!(request.museum_type, "History");
        assert_eq!(filled_booking().estimated_total(), Price::from_rupees(1350));
    }

    #[test]
    fn review_rating_must_be_in_range() {
        let mut review = ReviewFormInput {
            ticket_id: "ab12cd34".to_owned(),
            rating: None,
            review: String::new(),
        };
        assert!(review.validate().is_err());
        review.rating = Some(6);
        assert!(review.validate().is_err());
        review.rating = Some(4);
        assert!(review.validate().is_ok());
    }

    #[test]
    fn passkey_confirmation_must_match() {
        let create = CreatePasskeyInput {
            new_passkey: "alpha".to_owned(),
            confirm_passkey: "beta".to_owned(),
        };
        let error = create.validate().expect_err("mismatch should fail");
        assert_eq!(error.to_string(), "pass keys do not match");
    }

    #[test]
    fn payload_kind_and_validation_dispatch() {
        let payloads = [
            FormPayload::Cancel(CancelInput {
                ticket_id: String::new(),
            }),
            FormPayload::ValidatePasskey(PasskeyInput {
                passkey: String::new(),
            }),
            FormPayload::AdminRegistration(AdminRegistrationInput {
                username: "curator".to_owned(),
                password: "secret".to_owned(),
                passkey: String::new(),
            }),
            FormPayload::AdminLogin(AdminLoginInput {
                username: "curator".to_owned(),
                password: String::new(),
            }),
        ];
        for payload in &payloads {
            assert!(
                matches!(payload.validate(), Err(Error::Validation(_))),
                "{} should fail validation",
                payload.kind().label()
            );
        }
        assert_eq!(payloads[0].kind(), FormKind::Cancel);
    }
}
