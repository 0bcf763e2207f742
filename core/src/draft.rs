//! The in-progress booking form and its submission-time validation.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike};

use crate::error::ValidationError;
use crate::types::BookingRequest;

/// Field values the user has entered but not yet submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    pub patient_name: String,
    pub selected_clinic_id: Option<String>,
    pub selected_doctor_id: Option<String>,
    pub reason: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
}

impl BookingDraft {
    /// An empty draft whose date and time default to `now`, truncated to the
    /// minute.
    pub fn empty(now: DateTime<FixedOffset>) -> Self {
        Self {
            patient_name: String::new(),
            selected_clinic_id: None,
            selected_doctor_id: None,
            reason: String::new(),
            appointment_date: now.date_naive(),
            appointment_time: truncate_to_minute(now.time()),
        }
    }

    /// Checks the draft and builds the request payload.
    ///
    /// Required fields are checked first. The past-date check compares
    /// calendar dates only: any time on `now`'s date is accepted, even one
    /// that has already passed. A wall time that cannot be placed on the
    /// timeline at `now`'s offset (the far end of the calendar) is rejected
    /// as out of range.
    pub fn validate(&self, now: DateTime<FixedOffset>) -> Result<BookingRequest, ValidationError> {
        let (clinic_id, doctor_id) = match (
            non_empty(self.selected_clinic_id.as_deref()),
            non_empty(self.selected_doctor_id.as_deref()),
        ) {
            (Some(clinic), Some(doctor)) if !self.patient_name.is_empty() && !self.reason.is_empty() => {
                (clinic, doctor)
            }
            _ => return Err(ValidationError::MissingFields),
        };

        let local = self
            .appointment_date
            .and_time(truncate_to_minute(self.appointment_time));

        if self.appointment_date < now.date_naive() {
            return Err(ValidationError::DateInPast);
        }

        let appointment_date_time = now
            .offset()
            .from_local_datetime(&local)
            .single()
            .ok_or(ValidationError::DateOutOfRange)?;
        Ok(BookingRequest {
            name: self.patient_name.clone(),
            clinic_id: clinic_id.to_string(),
            doctor_id: doctor_id.to_string(),
            reason: self.reason.clone(),
            appointment_date_time,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}
