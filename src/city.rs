//! City-visit records as the remote API serves them.
//!
//! Identifiers and coordinates are coerced leniently on the way in: servers
//! that emit `"7"` instead of `7`, or `"38.7"` instead of `38.7`, produce the
//! same typed values. Fields the store does not interpret are carried through
//! untouched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Server-assigned record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a record id")]
pub struct ParseRecordIdError(String);

impl FromStr for RecordId {
    type Err = ParseRecordIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(RecordId)
            .map_err(|_| ParseRecordIdError(s.to_string()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawId::deserialize(deserializer)? {
            RawId::Unsigned(n) => Ok(RecordId(n)),
            RawId::Float(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
                Ok(RecordId(f as u64))
            }
            RawId::Float(f) => Err(serde::de::Error::custom(format!(
                "record id {} is not a non-negative integer",
                f
            ))),
            RawId::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Numeric coercion for ids handed in by consumers (route params, CLI args).
///
/// Returns `None` when the value is not a valid identifier.
pub trait IntoRecordId {
    fn into_record_id(self) -> Option<RecordId>;
}

impl IntoRecordId for RecordId {
    fn into_record_id(self) -> Option<RecordId> {
        Some(self)
    }
}

impl IntoRecordId for u64 {
    fn into_record_id(self) -> Option<RecordId> {
        Some(RecordId(self))
    }
}

impl IntoRecordId for u32 {
    fn into_record_id(self) -> Option<RecordId> {
        Some(RecordId(u64::from(self)))
    }
}

impl IntoRecordId for i64 {
    fn into_record_id(self) -> Option<RecordId> {
        u64::try_from(self).ok().map(RecordId)
    }
}

impl IntoRecordId for i32 {
    fn into_record_id(self) -> Option<RecordId> {
        u64::try_from(self).ok().map(RecordId)
    }
}

impl IntoRecordId for &str {
    fn into_record_id(self) -> Option<RecordId> {
        self.parse().ok()
    }
}

impl IntoRecordId for String {
    fn into_record_id(self) -> Option<RecordId> {
        self.as_str().into_record_id()
    }
}

impl IntoRecordId for &String {
    fn into_record_id(self) -> Option<RecordId> {
        self.as_str().into_record_id()
    }
}

/// Errors from reading a position out of user input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PositionError {
    #[error("missing '{0}' coordinate")]
    Missing(&'static str),

    #[error("invalid {field} coordinate '{value}'")]
    Invalid { field: &'static str, value: String },
}

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(deserialize_with = "coordinate")]
    pub lat: f64,
    #[serde(deserialize_with = "coordinate")]
    pub lng: f64,
}

impl Position {
    /// Where the map opens when nothing else is known.
    pub const DEFAULT_CENTER: Position = Position { lat: 40.0, lng: 0.0 };

    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Like [`new`](Self::new), but rejects NaN and infinite coordinates.
    pub fn try_new(lat: f64, lng: f64) -> Result<Self, PositionError> {
        Ok(Self {
            lat: finite("lat", lat)?,
            lng: finite("lng", lng)?,
        })
    }

    /// Parse the `lat=..&lng=..` query a map click hands to the create form.
    ///
    /// A leading `?` is ignored, as are unrelated parameters.
    pub fn parse_query(query: &str) -> Result<Self, PositionError> {
        let mut lat = None;
        let mut lng = None;
        for pair in query.trim_start_matches('?').split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "lat" => lat = Some(parse_coordinate("lat", value)?),
                "lng" => lng = Some(parse_coordinate("lng", value)?),
                _ => {}
            }
        }
        Ok(Self {
            lat: lat.ok_or(PositionError::Missing("lat"))?,
            lng: lng.ok_or(PositionError::Missing("lng"))?,
        })
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::DEFAULT_CENTER
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// Accepts `"lat,lng"`.
impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s.split_once(',').ok_or(PositionError::Missing("lng"))?;
        Ok(Self {
            lat: parse_coordinate("lat", lat)?,
            lng: parse_coordinate("lng", lng)?,
        })
    }
}

fn parse_coordinate(field: &'static str, value: &str) -> Result<f64, PositionError> {
    let parsed = value.trim().parse::<f64>().map_err(|_| PositionError::Invalid {
        field,
        value: value.to_string(),
    })?;
    finite(field, parsed)
}

fn finite(field: &'static str, value: f64) -> Result<f64, PositionError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PositionError::Invalid {
            field,
            value: value.to_string(),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCoordinate {
    Number(f64),
    Text(String),
}

fn coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = match RawCoordinate::deserialize(deserializer)? {
        RawCoordinate::Number(n) => n,
        RawCoordinate::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid coordinate '{}'", s)))?,
    };
    if !value.is_finite() {
        return Err(serde::de::Error::custom("coordinate must be finite"));
    }
    Ok(value)
}

/// Everything a city visit carries except its identifier.
///
/// This is also the create payload: the server assigns `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityDraft {
    pub city_name: String,
    pub emoji: String,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Fields this crate does not interpret (`country`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CityDraft {
    pub fn new(city_name: impl Into<String>, emoji: impl Into<String>, position: Position) -> Self {
        Self {
            city_name: city_name.into(),
            emoji: emoji.into(),
            position,
            date: None,
            notes: None,
            extra: Map::new(),
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A persisted city visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: CityDraft,
}

impl City {
    pub fn new(id: u64, fields: CityDraft) -> Self {
        Self {
            id: RecordId(id),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.fields.city_name
    }

    pub fn position(&self) -> Position {
        self.fields.position
    }

    pub fn marker(&self) -> MapMarker {
        MapMarker {
            id: self.id,
            position: self.fields.position,
            emoji: self.fields.emoji.clone(),
            label: self.fields.city_name.clone(),
        }
    }
}

/// What the map draws for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub id: RecordId,
    pub position: Position,
    pub emoji: String,
    pub label: String,
}
