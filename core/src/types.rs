//! Wire records and form-facing option types for the booking API.
//!
//! # Design
//! Remote records (`ClinicRecord`, `DoctorRecord`) mirror the server's JSON
//! field names, including the `_id` key. They are mapped into the
//! display-oriented `ClinicOption` / `DoctorOption` as soon as they are
//! parsed so the rest of the crate never sees server naming.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A clinic as returned by `GET /clinic`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClinicRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub clinic_name: String,
}

/// A doctor as returned by `GET /clinic/{id}/doctor`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoctorRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub doctor_name: String,
}

/// A selectable clinic entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicOption {
    pub id: String,
    pub display_name: String,
}

impl From<ClinicRecord> for ClinicOption {
    fn from(record: ClinicRecord) -> Self {
        Self {
            id: record.id,
            display_name: record.clinic_name,
        }
    }
}

/// A selectable doctor entry, always scoped to one clinic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorOption {
    pub id: String,
    pub display_name: String,
}

impl From<DoctorRecord> for DoctorOption {
    fn from(record: DoctorRecord) -> Self {
        Self {
            id: record.id,
            display_name: record.doctor_name,
        }
    }
}

/// Payload for `POST /appointment`, built from a validated draft.
///
/// `appointment_date_time` serializes as RFC 3339 with the clock's offset,
/// e.g. `2024-06-15T09:30:00+02:00`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingRequest {
    pub name: String,
    pub clinic_id: String,
    pub doctor_id: String,
    pub reason: String,
    pub appointment_date_time: DateTime<FixedOffset>,
}

/// Error body returned by the API on a non-success status.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
