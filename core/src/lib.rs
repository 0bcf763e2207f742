//! Sans-IO core for the appointment booking form.
//!
//! # Overview
//! Drives the booking workflow (load clinics, load the selected clinic's
//! doctors, validate and submit an appointment) without touching the network.
//! The controller hands `HttpRequest` values to the host and is told how they
//! turned out, which keeps every transition deterministic and testable.
//!
//! # Design
//! - `BookingClient` is stateless: it builds requests and parses responses.
//! - `BookingFormController` owns the form state and tags every outstanding
//!   request with its purpose, so stale doctor lists can be discarded.
//! - Time comes from a `Clock` so "today" is injectable.
//! - Wire DTOs are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod client;
pub mod clock;
pub mod controller;
pub mod draft;
pub mod error;
pub mod http;
pub mod types;

pub use client::{BookingClient, DEFAULT_API_URL};
pub use clock::{Clock, FixedClock, SystemClock};
pub use controller::{BookingFormController, FormStatus, PendingRequest, RequestId, Transition};
pub use draft::BookingDraft;
pub use error::{ApiError, TransportError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{BookingRequest, ClinicOption, ClinicRecord, DoctorOption, DoctorRecord};
