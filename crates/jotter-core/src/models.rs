//! Core data models for jotter.
//!
//! These types are shared across all jotter crates and represent the
//! domain entities: premium subscriptions, notes with attachments, places.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

// =============================================================================
// PREMIUM TYPES
// =============================================================================

/// Billing state of a premium subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PremiumStatus {
    Unpayed,
    Active,
    Expired,
    Cancelled,
}

impl PremiumStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpayed => "unpayed",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for PremiumStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpayed" => Ok(Self::Unpayed),
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(Error::InvalidInput(format!(
                "Unknown premium status: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for PremiumStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's premium subscription record.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Subscription {
    pub user_id: i64,
    pub status: PremiumStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Subscription {
    /// Only an active subscription grants premium limits.
    pub fn is_premium(&self) -> bool {
        self.status == PremiumStatus::Active
    }
}

// =============================================================================
// NOTE TYPES
// =============================================================================

/// A stored note.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Note {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A file attached to a note. `name` is the object-storage key.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Attachment {
    pub id: i64,
    pub note_id: i64,
    pub name: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
}

/// Note together with its attachments.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NoteFull {
    pub note: Note,
    pub attachments: Vec<Attachment>,
}

impl NoteFull {
    /// Total attachment bytes.
    pub fn attachments_size(&self) -> i64 {
        self.attachments
            .iter()
            .fold(0i64, |total, a| total.saturating_add(a.size))
    }

    /// Size counted against the note ceiling: text bytes plus all attachments.
    pub fn size(&self) -> i64 {
        text_size(&self.note.text).saturating_add(self.attachments_size())
    }
}

/// Byte length of note text as stored (UTF-8).
pub fn text_size(text: &str) -> i64 {
    text.len() as i64
}

/// Request for creating or updating note text.
#[derive(Debug, Clone)]
pub struct SaveNoteRequest {
    pub user_id: i64,
    /// `None` creates a new note.
    pub id: Option<i64>,
    pub text: String,
}

/// Request for adding an attachment to a note.
#[derive(Debug, Clone)]
pub struct CreateAttachmentRequest {
    pub user_id: i64,
    pub note_id: i64,
    pub name: String,
    pub size: i64,
}

// =============================================================================
// PLACE TYPES
// =============================================================================

static PLACE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{3}$").expect("valid place code regex"));

/// Kind of place served by the lookup endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PlaceKind {
    Airport,
    City,
}

impl PlaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Airport => "airport",
            Self::City => "city",
        }
    }
}

impl FromStr for PlaceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "airport" => Ok(Self::Airport),
            "city" => Ok(Self::City),
            other => Err(Error::NotFound(format!("Unknown place kind: {}", other))),
        }
    }
}

impl fmt::Display for PlaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An airport or city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Place {
    pub kind: PlaceKind,
    /// Three-letter IATA code, upper-case.
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// City served by an airport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_code: Option<String>,
}

/// Lookup parameters for place search.
#[derive(Debug, Clone)]
pub struct PlaceQuery {
    pub kind: PlaceKind,
    /// Trimmed search term, matched against code and name prefix.
    pub term: String,
    pub limit: i64,
}

/// Request for creating or replacing a place.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct UpsertPlaceRequest {
    pub name: String,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub city_code: Option<String>,
}

/// Validate a three-letter IATA code and return it upper-cased.
pub fn normalize_place_code(code: &str) -> std::result::Result<String, String> {
    let code = code.trim();
    if !PLACE_CODE_RE.is_match(code) {
        return Err(format!(
            "Invalid place code '{}': expected three latin letters",
            code
        ));
    }
    Ok(code.to_ascii_uppercase())
}

/// Validate a two-letter ISO country code and return it upper-cased.
pub fn normalize_country_code(code: &str) -> std::result::Result<String, String> {
    let code = code.trim();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!(
            "Invalid country code '{}': expected two latin letters",
            code
        ));
    }
    Ok(code.to_ascii_uppercase())
}

impl UpsertPlaceRequest {
    /// Build a validated [`Place`] for the given kind and code.
    pub fn into_place(self, kind: PlaceKind, code: &str) -> crate::Result<Place> {
        let code = normalize_place_code(code).map_err(Error::InvalidInput)?;
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidInput("Place name is required".to_string()));
        }
        let country_code = self
            .country_code
            .as_deref()
            .map(normalize_country_code)
            .transpose()
            .map_err(Error::InvalidInput)?;
        let city_code = match (kind, self.city_code.as_deref()) {
            (PlaceKind::Airport, Some(city)) => {
                Some(normalize_place_code(city).map_err(Error::InvalidInput)?)
            }
            (PlaceKind::City, Some(_)) => {
                return Err(Error::InvalidInput(
                    "city_code only applies to airports".to_string(),
                ))
            }
            (_, None) => None,
        };

        Ok(Place {
            kind,
            code,
            name,
            country_code,
            city_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn note(text: &str) -> Note {
        let ts = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Note {
            id: 1,
            user_id: 7,
            text: text.to_string(),
            created_at: ts,
            updated_at: ts,
        }
    }

    fn attachment(size: i64) -> Attachment {
        Attachment {
            id: size,
            note_id: 1,
            name: format!("file-{}.bin", size),
            size,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_premium_status_round_trip() {
        for status in [
            PremiumStatus::Unpayed,
            PremiumStatus::Active,
            PremiumStatus::Expired,
            PremiumStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<PremiumStatus>().unwrap(), status);
        }
        assert!("trial".parse::<PremiumStatus>().is_err());
    }

    #[test]
    fn test_only_active_subscription_is_premium() {
        let mut sub = Subscription {
            user_id: 1,
            status: PremiumStatus::Active,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
        };
        assert!(sub.is_premium());
        sub.status = PremiumStatus::Expired;
        assert!(!sub.is_premium());
        sub.status = PremiumStatus::Unpayed;
        assert!(!sub.is_premium());
    }

    #[test]
    fn test_note_size_counts_text_bytes_and_attachments() {
        let full = NoteFull {
            note: note("héllo"),
            attachments: vec![attachment(100), attachment(50)],
        };
        // 'é' is two bytes in UTF-8
        assert_eq!(full.attachments_size(), 150);
        assert_eq!(full.size(), 6 + 150);
    }

    #[test]
    fn test_place_kind_parsing() {
        assert_eq!("airport".parse::<PlaceKind>().unwrap(), PlaceKind::Airport);
        assert_eq!("City".parse::<PlaceKind>().unwrap(), PlaceKind::City);
        assert!(matches!(
            "station".parse::<PlaceKind>(),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_place_code_normalization() {
        assert_eq!(normalize_place_code(" lhr ").unwrap(), "LHR");
        assert!(normalize_place_code("LH").is_err());
        assert!(normalize_place_code("LH1").is_err());
        assert!(normalize_place_code("LHRX").is_err());
    }

    #[test]
    fn test_upsert_request_validation() {
        let req = UpsertPlaceRequest {
            name: "  Heathrow ".to_string(),
            country_code: Some("gb".to_string()),
            city_code: Some("lon".to_string()),
        };
        let place = req.into_place(PlaceKind::Airport, "lhr").unwrap();
        assert_eq!(place.code, "LHR");
        assert_eq!(place.name, "Heathrow");
        assert_eq!(place.country_code.as_deref(), Some("GB"));
        assert_eq!(place.city_code.as_deref(), Some("LON"));

        let empty = UpsertPlaceRequest {
            name: "   ".to_string(),
            country_code: None,
            city_code: None,
        };
        assert!(empty.into_place(PlaceKind::City, "LON").is_err());

        let city_with_city = UpsertPlaceRequest {
            name: "London".to_string(),
            country_code: None,
            city_code: Some("LON".to_string()),
        };
        assert!(city_with_city.into_place(PlaceKind::City, "LON").is_err());
    }
}
