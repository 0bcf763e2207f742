//! Stateless HTTP request builder and response parser for the booking API.
//!
//! # Design
//! `BookingClient` holds only a `base_url` and carries no mutable state
//! between calls. Each endpoint is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The controller pairs them up; the host executes the round-trip in between.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{BookingRequest, ClinicOption, ClinicRecord, DoctorOption, DoctorRecord, ErrorBody};

/// Production endpoint of the booking API.
pub const DEFAULT_API_URL: &str = "https://nagamedserver.onrender.com/api";

const CLINICS_FAILED: &str = "Failed to fetch clinics";
const DOCTORS_FAILED: &str = "Failed to fetch doctors";
const BOOKING_FAILED: &str = "Failed to book appointment";

/// Synchronous, stateless client for the booking API.
#[derive(Debug, Clone)]
pub struct BookingClient {
    base_url: String,
}

impl Default for BookingClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl BookingClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_clinics(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/clinic", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_list_doctors(&self, clinic_id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/clinic/{clinic_id}/doctor", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_appointment(&self, input: &BookingRequest) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/appointment", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn parse_list_clinics(&self, response: HttpResponse) -> Result<Vec<ClinicOption>, ApiError> {
        if !response.is_success() {
            return Err(ApiError::HttpError {
                status: response.status,
                message: CLINICS_FAILED.to_string(),
            });
        }
        let records: Vec<ClinicRecord> = decode(&response.body)?;
        Ok(records.into_iter().map(ClinicOption::from).collect())
    }

    pub fn parse_list_doctors(&self, response: HttpResponse) -> Result<Vec<DoctorOption>, ApiError> {
        if !response.is_success() {
            return Err(ApiError::HttpError {
                status: response.status,
                message: DOCTORS_FAILED.to_string(),
            });
        }
        let records: Vec<DoctorRecord> = decode(&response.body)?;
        Ok(records.into_iter().map(DoctorOption::from).collect())
    }

    /// The acknowledgement body of a successful booking is not consumed.
    pub fn parse_create_appointment(&self, response: HttpResponse) -> Result<(), ApiError> {
        if response.is_success() {
            return Ok(());
        }
        let message = serde_json::from_str::<ErrorBody>(&response.body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| BOOKING_FAILED.to_string());
        Err(ApiError::HttpError {
            status: response.status,
            message,
        })
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveDate, TimeZone};

    use super::*;

    fn client() -> BookingClient {
        BookingClient::new("http://localhost:3000/api")
    }

    fn booking() -> BookingRequest {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let naive = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        BookingRequest {
            name: "Ada".to_string(),
            clinic_id: "c1".to_string(),
            doctor_id: "d1".to_string(),
            reason: "Checkup".to_string(),
            appointment_date_time: offset.from_local_datetime(&naive).unwrap(),
        }
    }

    #[test]
    fn default_client_targets_production_api() {
        assert_eq!(BookingClient::default().base_url(), DEFAULT_API_URL);
    }

    #[test]
    fn build_list_clinics_produces_correct_request() {
        let req = client().build_list_clinics();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/clinic");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_list_doctors_scopes_path_to_clinic() {
        let req = client().build_list_doctors("64ab01");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/clinic/64ab01/doctor");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_create_appointment_produces_json_post() {
        let req = client().build_create_appointment(&booking()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/appointment");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "Ada");
        assert_eq!(body["clinic_id"], "c1");
        assert_eq!(body["doctor_id"], "d1");
        assert_eq!(body["reason"], "Checkup");
        assert_eq!(body["appointment_date_time"], "2024-06-15T09:30:00+02:00");
    }

    #[test]
    fn parse_list_clinics_maps_records_to_options() {
        let response = HttpResponse::new(
            200,
            r#"[{"_id":"c1","clinic_name":"North"},{"_id":"c2","clinic_name":"South","address":"x"}]"#,
        );
        let clinics = client().parse_list_clinics(response).unwrap();
        assert_eq!(
            clinics,
            vec![
                ClinicOption { id: "c1".to_string(), display_name: "North".to_string() },
                ClinicOption { id: "c2".to_string(), display_name: "South".to_string() },
            ]
        );
    }

    #[test]
    fn parse_list_clinics_failure_uses_fixed_message() {
        let response = HttpResponse::new(500, "boom");
        let err = client().parse_list_clinics(response).unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch clinics");
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn parse_list_doctors_success() {
        let response = HttpResponse::new(200, r#"[{"_id":"d1","doctor_name":"Dr. Who"}]"#);
        let doctors = client().parse_list_doctors(response).unwrap();
        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0].display_name, "Dr. Who");
    }

    #[test]
    fn parse_list_doctors_failure_uses_fixed_message() {
        let err = client().parse_list_doctors(HttpResponse::new(404, "")).unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch doctors");
    }

    #[test]
    fn parse_list_doctors_bad_json() {
        let err = client().parse_list_doctors(HttpResponse::new(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_create_appointment_ignores_ack_body() {
        assert!(client().parse_create_appointment(HttpResponse::new(201, "")).is_ok());
        assert!(client().parse_create_appointment(HttpResponse::new(200, "{}")).is_ok());
    }

    #[test]
    fn parse_create_appointment_uses_server_message() {
        let response = HttpResponse::new(400, r#"{"message":"Doctor unavailable"}"#);
        let err = client().parse_create_appointment(response).unwrap_err();
        assert_eq!(err.to_string(), "Doctor unavailable");
        assert!(matches!(err, ApiError::HttpError { status: 400, .. }));
    }

    #[test]
    fn parse_create_appointment_falls_back_to_generic_message() {
        for body in ["", "<html>", "{}", r#"{"message":""}"#] {
            let err = client()
                .parse_create_appointment(HttpResponse::new(502, body))
                .unwrap_err();
            assert_eq!(err.to_string(), "Failed to book appointment", "body: {body}");
        }
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = BookingClient::new("http://localhost:3000/api/");
        let req = client.build_list_clinics();
        assert_eq!(req.path, "http://localhost:3000/api/clinic");
    }
}
