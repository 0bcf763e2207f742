//! C-ABI wrapper around `booking-core`.
//!
//! # Overview
//! Exposes the booking form controller through `extern "C"` functions so a
//! mobile UI shell can drive it without linking to serde or chrono directly.
//! The shell owns the network: every function that needs I/O hands back an
//! `FfiHttpRequest`, and the shell reports the outcome with
//! `booking_complete` or `booking_fail`.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Setters return `false` for a null handle or an invalid value.
//! - The C caller owns all returned pointers and must call the matching
//!   `booking_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use booking_core::{BookingClient, BookingFormController, HttpResponse, RequestId, SystemClock, TransportError};
use chrono::{NaiveDate, NaiveTime};

use types::*;

/// Copy a nullable C string. Invalid UTF-8 reads as empty.
fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_str().unwrap_or("").to_string())
}

// ---------------------------------------------------------------------------
// Controller lifecycle
// ---------------------------------------------------------------------------

/// Create a booking controller talking to `base_url`, or to the production
/// API when `base_url` is null.
///
/// Returns null if an internal panic occurs. The caller must free the
/// returned pointer with `booking_controller_free`.
#[unsafe(no_mangle)]
pub extern "C" fn booking_controller_new(base_url: *const c_char) -> *mut FfiBookingController {
    catch_unwind(|| {
        let client = match read_str(base_url) {
            Some(url) => BookingClient::new(&url),
            None => BookingClient::default(),
        };
        let (inner, initial) = BookingFormController::new(client, SystemClock);
        Box::into_raw(Box::new(FfiBookingController {
            inner,
            initial: Some(initial),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a controller created by `booking_controller_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn booking_controller_free(ctrl: *mut FfiBookingController) {
    if !ctrl.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(ctrl) });
        });
    }
}

/// Return the clinic list request the form needs before anything else.
///
/// The first call yields the request issued at construction; later calls
/// re-issue it (e.g. after a failed load) unless one is still in flight, in
/// which case null is returned.
#[unsafe(no_mangle)]
pub extern "C" fn booking_start(ctrl: *mut FfiBookingController) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if ctrl.is_null() {
            return std::ptr::null_mut();
        }
        let ctrl = unsafe { &mut *ctrl };
        match ctrl.initial.take().or_else(|| ctrl.inner.reload_clinics()) {
            Some(pending) => FfiHttpRequest::from_core(pending),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Field setters
// ---------------------------------------------------------------------------

/// Set the patient name. A null `name` clears the field.
#[unsafe(no_mangle)]
pub extern "C" fn booking_set_patient_name(ctrl: *mut FfiBookingController, name: *const c_char) -> bool {
    catch_unwind(|| {
        if ctrl.is_null() {
            return false;
        }
        let ctrl = unsafe { &mut *ctrl };
        ctrl.inner.set_patient_name(read_str(name).unwrap_or_default());
        true
    })
    .unwrap_or(false)
}

/// Set the reason for consultation. A null `reason` clears the field.
#[unsafe(no_mangle)]
pub extern "C" fn booking_set_reason(ctrl: *mut FfiBookingController, reason: *const c_char) -> bool {
    catch_unwind(|| {
        if ctrl.is_null() {
            return false;
        }
        let ctrl = unsafe { &mut *ctrl };
        ctrl.inner.set_reason(read_str(reason).unwrap_or_default());
        true
    })
    .unwrap_or(false)
}

/// Set the appointment date. Returns false if the date does not exist.
#[unsafe(no_mangle)]
pub extern "C" fn booking_set_appointment_date(
    ctrl: *mut FfiBookingController,
    year: i32,
    month: u32,
    day: u32,
) -> bool {
    catch_unwind(|| {
        if ctrl.is_null() {
            return false;
        }
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            return false;
        };
        let ctrl = unsafe { &mut *ctrl };
        ctrl.inner.set_appointment_date(date);
        true
    })
    .unwrap_or(false)
}

/// Set the appointment time of day. Returns false if out of range.
#[unsafe(no_mangle)]
pub extern "C" fn booking_set_appointment_time(ctrl: *mut FfiBookingController, hour: u32, minute: u32) -> bool {
    catch_unwind(|| {
        if ctrl.is_null() {
            return false;
        }
        let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) else {
            return false;
        };
        let ctrl = unsafe { &mut *ctrl };
        ctrl.inner.set_appointment_time(time);
        true
    })
    .unwrap_or(false)
}

/// Select a clinic, or clear the selection with a null `clinic_id`.
///
/// Returns the doctor list request to execute, or null when nothing needs
/// fetching.
#[unsafe(no_mangle)]
pub extern "C" fn booking_select_clinic(
    ctrl: *mut FfiBookingController,
    clinic_id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if ctrl.is_null() {
            return std::ptr::null_mut();
        }
        let ctrl = unsafe { &mut *ctrl };
        match ctrl.inner.select_clinic(read_str(clinic_id)) {
            Some(pending) => FfiHttpRequest::from_core(pending),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Select a doctor, or clear the selection with a null `doctor_id`.
#[unsafe(no_mangle)]
pub extern "C" fn booking_select_doctor(ctrl: *mut FfiBookingController, doctor_id: *const c_char) -> bool {
    catch_unwind(|| {
        if ctrl.is_null() {
            return false;
        }
        let ctrl = unsafe { &mut *ctrl };
        ctrl.inner.select_doctor(read_str(doctor_id));
        true
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Submission and completion
// ---------------------------------------------------------------------------

/// Validate the form and return the booking request, or null if validation
/// failed (see `booking_status`) or a booking is already in flight.
#[unsafe(no_mangle)]
pub extern "C" fn booking_submit(ctrl: *mut FfiBookingController) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if ctrl.is_null() {
            return std::ptr::null_mut();
        }
        let ctrl = unsafe { &mut *ctrl };
        match ctrl.inner.submit() {
            Some(pending) => FfiHttpRequest::from_core(pending),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Report the HTTP response for `request_id`. A null body reads as empty.
#[unsafe(no_mangle)]
pub extern "C" fn booking_complete(
    ctrl: *mut FfiBookingController,
    request_id: u64,
    response: *const FfiHttpResponse,
) -> FfiTransition {
    catch_unwind(|| {
        if ctrl.is_null() || response.is_null() {
            return FfiTransition::NullArg;
        }
        let ctrl = unsafe { &mut *ctrl };
        let resp = unsafe { &*response };
        let core_resp = HttpResponse::new(resp.status, read_str(resp.body).unwrap_or_default());
        ctrl.inner.complete(RequestId(request_id), Ok(core_resp)).into()
    })
    .unwrap_or(FfiTransition::Panic)
}

/// Report that `request_id` could not be executed at all. `message` is shown
/// to the user as-is.
#[unsafe(no_mangle)]
pub extern "C" fn booking_fail(
    ctrl: *mut FfiBookingController,
    request_id: u64,
    message: *const c_char,
) -> FfiTransition {
    catch_unwind(|| {
        if ctrl.is_null() {
            return FfiTransition::NullArg;
        }
        let ctrl = unsafe { &mut *ctrl };
        let err = TransportError::new(read_str(message).unwrap_or_default());
        ctrl.inner.complete(RequestId(request_id), Err(err)).into()
    })
    .unwrap_or(FfiTransition::Panic)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Snapshot the form status. Free with `booking_free_status`.
#[unsafe(no_mangle)]
pub extern "C" fn booking_status(ctrl: *const FfiBookingController) -> *mut FfiFormStatus {
    catch_unwind(|| {
        if ctrl.is_null() {
            return std::ptr::null_mut();
        }
        let ctrl = unsafe { &*ctrl };
        FfiFormStatus::from_core(ctrl.inner.status())
    })
    .unwrap_or(std::ptr::null_mut())
}

#[unsafe(no_mangle)]
pub extern "C" fn booking_doctor_selection_enabled(ctrl: *const FfiBookingController) -> bool {
    catch_unwind(|| {
        if ctrl.is_null() {
            return false;
        }
        unsafe { &*ctrl }.inner.doctor_selection_enabled()
    })
    .unwrap_or(false)
}

/// Copy the loaded clinics. Free with `booking_free_options`.
#[unsafe(no_mangle)]
pub extern "C" fn booking_clinics(ctrl: *const FfiBookingController) -> *mut FfiOptionList {
    catch_unwind(|| {
        if ctrl.is_null() {
            return std::ptr::null_mut();
        }
        FfiOptionList::from_clinics(unsafe { &*ctrl }.inner.clinics())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Copy the doctors of the selected clinic. Free with `booking_free_options`.
#[unsafe(no_mangle)]
pub extern "C" fn booking_doctors(ctrl: *const FfiBookingController) -> *mut FfiOptionList {
    catch_unwind(|| {
        if ctrl.is_null() {
            return std::ptr::null_mut();
        }
        FfiOptionList::from_doctors(unsafe { &*ctrl }.inner.doctors())
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { std::ffi::CString::from_raw(s) });
    }
}

/// Free an `FfiHttpRequest` returned by any request-issuing function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn booking_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiFormStatus` returned by `booking_status`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn booking_free_status(status: *mut FfiFormStatus) {
    if status.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let status = unsafe { Box::from_raw(status) };
        free_c_string(status.message);
    });
}

/// Free an `FfiOptionList` returned by `booking_clinics` or
/// `booking_doctors`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn booking_free_options(list: *mut FfiOptionList) {
    if list.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let list = unsafe { Box::from_raw(list) };
        if !list.items.is_null() && list.len > 0 {
            let items = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(list.items, list.len as usize))
            };
            for item in items.iter() {
                free_c_string(item.id);
                free_c_string(item.display_name);
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
