//! The booking form workflow as a sans-IO state machine.
//!
//! # Design
//! `BookingFormController` owns the draft, the reference-data lists and the
//! bookkeeping for requests it has handed to the host. Operations that need
//! the network return a `PendingRequest`; the host executes it and reports
//! the outcome through `complete`. Nothing else suspends, so the controller
//! is a single logical actor and needs no locking.
//!
//! Each outstanding request remembers what it was for. A doctor-list request
//! carries the clinic id it was issued for, and its result is only applied
//! if that clinic is still selected when the result arrives. Re-selecting
//! a clinic while an older fetch is in flight therefore means the last
//! selection wins, without any cancellation support from the host.
//!
//! Every failure is caught here and folded into `FormStatus::Error`; no
//! operation returns an error to the host. A draft rejected by `submit`
//! stays on screen until the user next edits the form, even while other
//! requests are in flight or complete.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info, warn};

use crate::client::BookingClient;
use crate::clock::{Clock, SystemClock};
use crate::draft::BookingDraft;
use crate::error::{ApiError, TransportError, ValidationError};
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{ClinicOption, DoctorOption};

/// Identifies a request handed to the host. Unique per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A request the host must execute and then report back via
/// `BookingFormController::complete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: RequestId,
    pub request: HttpRequest,
}

/// What the form should currently show. Exactly one applies at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    Idle,
    Loading,
    Error(String),
    /// A booking was just confirmed. Cleared by the next user interaction.
    Success,
}

/// The effect of applying one completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    ClinicsLoaded,
    DoctorsLoaded,
    /// The booking was accepted and the draft has been reset. The UI should
    /// navigate to its confirmation view.
    BookingConfirmed,
    Failed(String),
    /// The result was stale or unknown and left state untouched.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Purpose {
    Clinics,
    Doctors { clinic_id: String },
    Booking,
}

pub struct BookingFormController<C: Clock = SystemClock> {
    client: BookingClient,
    clock: C,
    draft: BookingDraft,
    clinics: Vec<ClinicOption>,
    doctors: Vec<DoctorOption>,
    in_flight: BTreeMap<RequestId, Purpose>,
    settled: FormStatus,
    rejected: Option<ValidationError>,
    next_id: u64,
}

impl<C: Clock> BookingFormController<C> {
    /// Creates the controller with an empty draft and returns the clinic
    /// list request the host must run first.
    pub fn new(client: BookingClient, clock: C) -> (Self, PendingRequest) {
        let draft = BookingDraft::empty(clock.now());
        let mut controller = Self {
            client,
            clock,
            draft,
            clinics: Vec::new(),
            doctors: Vec::new(),
            in_flight: BTreeMap::new(),
            settled: FormStatus::Idle,
            rejected: None,
            next_id: 0,
        };
        let request = controller.client.build_list_clinics();
        let pending = controller.issue(Purpose::Clinics, request);
        (controller, pending)
    }

    pub fn status(&self) -> FormStatus {
        if let Some(err) = self.rejected {
            FormStatus::Error(err.to_string())
        } else if self.in_flight.is_empty() {
            self.settled.clone()
        } else {
            FormStatus::Loading
        }
    }

    /// The last error shown to the user, if it has not been cleared since.
    pub fn error_message(&self) -> Option<String> {
        if let Some(err) = self.rejected {
            return Some(err.to_string());
        }
        match &self.settled {
            FormStatus::Error(message) => Some(message.clone()),
            _ => None,
        }
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn clinics(&self) -> &[ClinicOption] {
        &self.clinics
    }

    pub fn doctors(&self) -> &[DoctorOption] {
        &self.doctors
    }

    pub fn doctor_selection_enabled(&self) -> bool {
        self.draft.selected_clinic_id.is_some()
    }

    pub fn has_pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn set_patient_name(&mut self, name: impl Into<String>) {
        self.touch();
        self.draft.patient_name = name.into();
    }

    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.touch();
        self.draft.reason = reason.into();
    }

    pub fn set_appointment_date(&mut self, date: NaiveDate) {
        self.touch();
        self.draft.appointment_date = date;
    }

    pub fn set_appointment_time(&mut self, time: NaiveTime) {
        self.touch();
        self.draft.appointment_time = time;
    }

    pub fn select_doctor(&mut self, doctor_id: Option<String>) {
        self.touch();
        self.draft.selected_doctor_id = doctor_id.filter(|id| !id.is_empty());
    }

    /// Selects a clinic, or clears the selection with `None`.
    ///
    /// A different clinic drops the current doctor list and doctor choice.
    /// Returns the doctor-list request for the new clinic, or `None` when
    /// the selection was cleared or that clinic's list is already in flight.
    pub fn select_clinic(&mut self, clinic_id: Option<String>) -> Option<PendingRequest> {
        self.touch();
        let clinic_id = clinic_id.filter(|id| !id.is_empty());

        if self.draft.selected_clinic_id != clinic_id {
            self.draft.selected_clinic_id = clinic_id.clone();
            self.draft.selected_doctor_id = None;
            self.doctors.clear();
        }

        let clinic_id = clinic_id?;
        let already_loading = self
            .in_flight
            .values()
            .any(|p| matches!(p, Purpose::Doctors { clinic_id: c } if *c == clinic_id));
        if already_loading {
            debug!(%clinic_id, "doctor list already in flight");
            return None;
        }

        let request = self.client.build_list_doctors(&clinic_id);
        Some(self.issue(Purpose::Doctors { clinic_id }, request))
    }

    /// Re-issues the clinic list request, e.g. after the initial load failed.
    pub fn reload_clinics(&mut self) -> Option<PendingRequest> {
        if self.in_flight.values().any(|p| *p == Purpose::Clinics) {
            debug!("clinic list already in flight");
            return None;
        }
        let request = self.client.build_list_clinics();
        Some(self.issue(Purpose::Clinics, request))
    }

    /// Validates the draft and, if it passes, returns the booking request.
    ///
    /// Validation failures become `FormStatus::Error` and issue nothing. A
    /// submit while a booking is already in flight is ignored.
    pub fn submit(&mut self) -> Option<PendingRequest> {
        self.touch();

        if self.in_flight.values().any(|p| *p == Purpose::Booking) {
            warn!("booking already in flight, ignoring submit");
            return None;
        }

        let booking = match self.draft.validate(self.clock.now()) {
            Ok(booking) => booking,
            Err(err) => {
                debug!(error = %err, "booking draft rejected");
                self.rejected = Some(err);
                return None;
            }
        };

        match self.client.build_create_appointment(&booking) {
            Ok(request) => Some(self.issue(Purpose::Booking, request)),
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    /// Applies the host's outcome for a request this controller issued.
    pub fn complete(&mut self, id: RequestId, result: Result<HttpResponse, TransportError>) -> Transition {
        let Some(purpose) = self.in_flight.remove(&id) else {
            warn!(request = %id, "completion for unknown request");
            return Transition::Discarded;
        };
        let response = result.map_err(ApiError::from);

        match purpose {
            Purpose::Clinics => match response.and_then(|r| self.client.parse_list_clinics(r)) {
                Ok(clinics) => {
                    info!(count = clinics.len(), "clinics loaded");
                    self.clinics = clinics;
                    self.settled = FormStatus::Idle;
                    Transition::ClinicsLoaded
                }
                Err(err) => self.fail(err),
            },
            Purpose::Doctors { clinic_id } => {
                if self.draft.selected_clinic_id.as_deref() != Some(clinic_id.as_str()) {
                    warn!(request = %id, %clinic_id, "discarding doctor list for deselected clinic");
                    return Transition::Discarded;
                }
                match response.and_then(|r| self.client.parse_list_doctors(r)) {
                    Ok(doctors) => {
                        info!(%clinic_id, count = doctors.len(), "doctors loaded");
                        self.doctors = doctors;
                        self.settled = FormStatus::Idle;
                        Transition::DoctorsLoaded
                    }
                    Err(err) => self.fail(err),
                }
            }
            Purpose::Booking => match response.and_then(|r| self.client.parse_create_appointment(r)) {
                Ok(()) => {
                    info!("appointment booked");
                    self.draft = BookingDraft::empty(self.clock.now());
                    self.doctors.clear();
                    self.settled = FormStatus::Success;
                    Transition::BookingConfirmed
                }
                Err(err) => self.fail(err),
            },
        }
    }

    fn issue(&mut self, purpose: Purpose, request: HttpRequest) -> PendingRequest {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        debug!(request = %id, method = ?request.method, path = %request.path, "issuing request");
        self.in_flight.insert(id, purpose);
        PendingRequest { id, request }
    }

    fn fail(&mut self, err: ApiError) -> Transition {
        let message = err.to_string();
        warn!(error = %message, "request failed");
        self.settled = FormStatus::Error(message.clone());
        Transition::Failed(message)
    }

    /// Any user interaction dismisses a success banner and a validation
    /// error.
    fn touch(&mut self) {
        self.rejected = None;
        if self.settled == FormStatus::Success {
            self.settled = FormStatus::Idle;
        }
    }
}
