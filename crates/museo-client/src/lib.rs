// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use museo_app::{
    AdminLoginInput, AdminRegistrationInput, AttendInput, BookingFormInput, BookingRecord,
    CancelInput, CollectionSource, CreatePasskeyInput, Error, FilterOptions, Item, PagePayload,
    PasskeyInput, Result, ReviewFormInput, TAG_CITY, TAG_STATE, TAG_TYPE,
};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_COLLECTION_PATH: &str = "/api/exhibitions";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_RADIUS_KM: f64 = 25.0;

const NAME_KEYS: [&str; 2] = ["Name", "name"];
const CITY_KEYS: [&str; 2] = ["City", "city"];
const STATE_KEYS: [&str; 2] = ["State", "state"];
const TYPE_KEYS: [&str; 4] = ["Type", "Category", "type", "category"];
const ID_KEYS: [&str; 3] = ["id", "_id", "MuseumID"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookingConfirmation {
    #[serde(default)]
    pub message: String,
    pub ticket_id: String,
    #[serde(default)]
    pub qr_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationQuery {
    pub interests: Vec<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_km: f64,
}

impl Default for RecommendationQuery {
    fn default() -> Self {
        Self {
            interests: Vec::new(),
            lat: None,
            lon: None,
            radius_km: DEFAULT_RADIUS_KM,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    pub personalized: Vec<Item>,
    pub popular: Vec<Item>,
    pub nearby: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct AdminReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
struct CreatePasskeyBody<'a> {
    passkey: &'a str,
}

/// Blocking JSON client for the museum booking backend.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    collection_path: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            return Err(Error::validation("server.base_url must not be empty"));
        }
        Url::parse(&base_url).map_err(|error| {
            Error::validation(format!("server.base_url {base_url:?} is not a valid URL: {error}"))
        })?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| Error::network(format!("build HTTP client: {error}")))?;

        Ok(Self {
            base_url,
            collection_path: DEFAULT_COLLECTION_PATH.to_owned(),
            timeout,
            http,
        })
    }

    pub fn with_collection_path(mut self, path: &str) -> Self {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            self.collection_path = format!("/{}", trimmed.trim_start_matches('/'));
        }
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn collection_path(&self) -> &str {
        &self.collection_path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn fetch_collection(&self, page: u32, per_page: u32) -> Result<PagePayload> {
        let mut url = self.endpoint(&self.collection_path)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string());
        let value = self.get(url)?;
        parse_collection(value)
    }

    pub fn museum_filters(&self) -> Result<FilterOptions> {
        let url = self.endpoint("/api/museum-filters")?;
        decode(self.get(url)?, "museum filters")
    }

    pub fn history(&self) -> Result<Vec<BookingRecord>> {
        let url = self.endpoint("/api/history")?;
        decode(self.get(url)?, "booking history")
    }

    pub fn book(&self, booking: &BookingFormInput) -> Result<BookingConfirmation> {
        let request = booking.to_request()?;
        let url = self.endpoint("/api/book")?;
        decode(self.post(url, &request)?, "booking confirmation")
    }

    pub fn review(&self, review: &ReviewFormInput) -> Result<String> {
        review.validate()?;
        let url = self.endpoint("/api/review")?;
        Ok(message_of(&self.post(url, review)?))
    }

    /// Cancels a booking; a 404 means the server has no such ticket.
    pub fn cancel(&self, cancel: &CancelInput) -> Result<String> {
        cancel.validate()?;
        let url = self.endpoint("/api/cancel")?;
        let response = self.send_post(&url, cancel)?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(%url, ticket_id = cancel.ticket_id.trim(), "booking to cancel not found");
            return Err(Error::not_found("booking", cancel.ticket_id.trim()));
        }
        Ok(message_of(&read_json(&url, response)?))
    }

    pub fn attend(&self, attend: &AttendInput) -> Result<String> {
        attend.validate()?;
        let url = self.endpoint("/api/attend")?;
        Ok(message_of(&self.post(url, attend)?))
    }

    pub fn admin_login(&self, login: &AdminLoginInput) -> Result<String> {
        login.validate()?;
        let url = self.endpoint("/admin/login")?;
        admin_outcome(self.post(url, login)?)
    }

    pub fn validate_passkey(&self, passkey: &PasskeyInput) -> Result<String> {
        passkey.validate()?;
        let url = self.endpoint("/admin/validate_passkey")?;
        admin_outcome(self.post(url, passkey)?)
    }

    pub fn register_admin(&self, registration: &AdminRegistrationInput) -> Result<String> {
        registration.validate()?;
        let url = self.endpoint("/admin/register")?;
        admin_outcome(self.post(url, registration)?)
    }

    pub fn create_passkey(&self, create: &CreatePasskeyInput) -> Result<String> {
        create.validate()?;
        let url = self.endpoint("/api/admin/passkeys")?;
        let body = CreatePasskeyBody {
            passkey: &create.new_passkey,
        };
        Ok(message_of(&self.post(url, &body)?))
    }

    pub fn recommendations(&self, query: &RecommendationQuery) -> Result<Recommendations> {
        let url = self.endpoint("/recommendations")?;
        let value = self.post(url, query)?;
        let list = |key: &str| value.get(key).map(normalize_items).unwrap_or_default();
        Ok(Recommendations {
            personalized: list("personalized"),
            popular: list("popular"),
            nearby: list("nearby"),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&joined)
            .map_err(|error| Error::validation(format!("invalid endpoint {joined:?}: {error}")))
    }

    fn get(&self, url: Url) -> Result<Value> {
        debug!(%url, "GET");
        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        read_json(&url, response)
    }

    fn post<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<Value> {
        let response = self.send_post(&url, body)?;
        read_json(&url, response)
    }

    fn send_post<B: Serialize + ?Sized>(&self, url: &Url, body: &B) -> Result<Response> {
        debug!(%url, "POST");
        self.http
            .post(url.clone())
            .json(body)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))
    }
}

impl CollectionSource for Client {
    fn fetch_page(&self, page: u32, per_page: u32) -> Result<PagePayload> {
        self.fetch_collection(page, per_page)
    }
}

fn read_json(url: &Url, response: Response) -> Result<Value> {
    let status = response.status();
    let body = response.text().unwrap_or_default();
    debug!(%url, status = status.as_u16(), bytes = body.len(), "response");
    if !status.is_success() {
        return Err(clean_error_response(status, &body));
    }
    let value: Value = serde_json::from_str(&body)
        .map_err(|error| Error::network(format!("decode response from {url}: {error}")))?;
    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Err(Error::network(format!("server error: {message}")));
    }
    Ok(value)
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|error| Error::network(format!("decode {what}: {error}")))
}

fn message_of(value: &Value) -> String {
    value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

fn admin_outcome(value: Value) -> Result<String> {
    let reply: AdminReply = decode(value, "admin reply")?;
    if !reply.success {
        return Err(Error::validation(reply.message));
    }
    Ok(reply.message)
}

fn connection_error(base_url: &str, error: reqwest::Error) -> Error {
    Error::network(format!(
        "cannot reach {base_url} -- check server.base_url and that the server is running ({error})"
    ))
}

fn clean_error_response(status: StatusCode, body: &str) -> Error {
    let code = status.as_u16();
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        let message = ["error", "message"]
            .iter()
            .find_map(|key| parsed.get(*key).and_then(Value::as_str))
            .filter(|message| !message.is_empty());
        if let Some(message) = message {
            return Error::network(format!("server error ({code}): {message}"));
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return Error::network(format!("server error ({code}): {trimmed}"));
    }

    Error::network(format!("server returned {code}"))
}

/// Decodes a collection response, either a bare array or a paging envelope.
pub fn parse_collection(value: Value) -> Result<PagePayload> {
    match &value {
        Value::Array(_) => Ok(PagePayload::Bare(normalize_items(&value))),
        Value::Object(object) if object.contains_key("items") => {
            let items = object.get("items").map(normalize_items).unwrap_or_default();
            Ok(PagePayload::Envelope {
                items,
                page: number_u32(object, "page"),
                per_page: number_u32(object, "per_page"),
                total: number_u32(object, "total"),
                total_pages: number_u32(object, "total_pages"),
            })
        }
        other => Err(Error::network(format!(
            "unexpected collection payload: expected an array or an object with items, got {}",
            json_kind(other)
        ))),
    }
}

pub fn normalize_items(value: &Value) -> Vec<Item> {
    value
        .as_array()
        .map(|entries| entries.iter().filter_map(normalize_item).collect())
        .unwrap_or_default()
}

/// Maps a raw museum object onto an [`Item`]; objects without a name are dropped.
pub fn normalize_item(value: &Value) -> Option<Item> {
    let object = value.as_object()?;
    let name = first_text(object, &NAME_KEYS)?;
    let id = first_text(object, &ID_KEYS).unwrap_or_else(|| name.clone());

    let mut item = Item::new(id, name);
    for (tag, keys) in [
        (TAG_CITY, &CITY_KEYS[..]),
        (TAG_STATE, &STATE_KEYS[..]),
        (TAG_TYPE, &TYPE_KEYS[..]),
    ] {
        if let Some(value) = first_text(object, keys) {
            item = item.with_tag(tag, value);
        }
    }
    item.latitude = first_number(object, &["Latitude", "latitude", "lat"]);
    item.longitude = first_number(object, &["Longitude", "longitude", "lon"]);
    item.distance_km = first_number(object, &["distance_km"]);
    item.established = first_text(object, &["Established", "established"]);
    Some(item)
}

fn first_text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::String(text) => Some(text.trim().to_owned()).filter(|text| !text.is_empty()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

fn first_number(object: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

fn number_u32(object: &Map<String, Value>, key: &str) -> Option<u32> {
    match object.get(key)? {
        Value::Number(number) => number.as_u64().and_then(|value| u32::try_from(value).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
