//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use booking_core::{
    BookingFormController, ClinicOption, DoctorOption, FormStatus, HttpMethod, PendingRequest, SystemClock,
    Transition,
};

/// Opaque handle to a `BookingFormController`. C callers receive a pointer
/// to this and pass it back into every FFI function.
pub struct FfiBookingController {
    pub(crate) inner: BookingFormController<SystemClock>,
    /// The clinic list request issued at construction, held until the host
    /// calls `booking_start`.
    pub(crate) initial: Option<PendingRequest>,
}

/// Allocate a C string, dropping any interior NUL rather than failing.
pub(crate) fn c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A request the host must execute, described as C-compatible plain data.
///
/// The host runs it and reports back through `booking_complete` (or
/// `booking_fail`) with the same `request_id`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub request_id: u64,
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `PendingRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(pending: PendingRequest) -> *mut Self {
        let req = pending.request;
        let body = match req.body {
            Some(b) => c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            request_id: pending.id.0,
            method: req.method.into(),
            path: c_string(req.path),
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request and
/// passes a pointer to `booking_complete`. The FFI layer reads but does not
/// free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Outcome of `booking_complete` / `booking_fail`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiTransition {
    ClinicsLoaded = 0,
    DoctorsLoaded = 1,
    BookingConfirmed = 2,
    Failed = 3,
    Discarded = 4,
    NullArg = 5,
    Panic = 6,
}

impl From<Transition> for FfiTransition {
    fn from(t: Transition) -> Self {
        match t {
            Transition::ClinicsLoaded => FfiTransition::ClinicsLoaded,
            Transition::DoctorsLoaded => FfiTransition::DoctorsLoaded,
            Transition::BookingConfirmed => FfiTransition::BookingConfirmed,
            Transition::Failed(_) => FfiTransition::Failed,
            Transition::Discarded => FfiTransition::Discarded,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStatusKind {
    Idle = 0,
    Loading = 1,
    Error = 2,
    Success = 3,
}

/// Snapshot of the form status. `message` is non-null only for `Error`.
#[repr(C)]
pub struct FfiFormStatus {
    pub kind: FfiStatusKind,
    pub message: *mut c_char,
}

impl FfiFormStatus {
    pub(crate) fn from_core(status: FormStatus) -> *mut Self {
        let (kind, message) = match status {
            FormStatus::Idle => (FfiStatusKind::Idle, std::ptr::null_mut()),
            FormStatus::Loading => (FfiStatusKind::Loading, std::ptr::null_mut()),
            FormStatus::Error(msg) => (FfiStatusKind::Error, c_string(msg)),
            FormStatus::Success => (FfiStatusKind::Success, std::ptr::null_mut()),
        };
        Box::into_raw(Box::new(FfiFormStatus { kind, message }))
    }
}

/// One selectable clinic or doctor.
#[repr(C)]
pub struct FfiOption {
    pub id: *mut c_char,
    pub display_name: *mut c_char,
}

/// A list of clinic or doctor options.
#[repr(C)]
pub struct FfiOptionList {
    pub items: *mut FfiOption,
    pub len: u32,
}

impl FfiOptionList {
    fn from_pairs(pairs: impl Iterator<Item = (String, String)>) -> *mut Self {
        let items: Box<[FfiOption]> = pairs
            .map(|(id, name)| FfiOption {
                id: c_string(id),
                display_name: c_string(name),
            })
            .collect();
        let len = items.len() as u32;
        let items = if items.is_empty() {
            std::ptr::null_mut()
        } else {
            Box::into_raw(items) as *mut FfiOption
        };
        Box::into_raw(Box::new(FfiOptionList { items, len }))
    }

    pub(crate) fn from_clinics(clinics: &[ClinicOption]) -> *mut Self {
        Self::from_pairs(clinics.iter().map(|c| (c.id.clone(), c.display_name.clone())))
    }

    pub(crate) fn from_doctors(doctors: &[DoctorOption]) -> *mut Self {
        Self::from_pairs(doctors.iter().map(|d| (d.id.clone(), d.display_name.clone())))
    }
}
