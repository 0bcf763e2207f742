//! Booking workflow against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the controller
//! through a full session, executing every request it issues over real HTTP
//! with ureq. Validates that request building, response parsing and the
//! controller's transitions line up with the actual server.

use booking_core::{
    BookingClient, BookingFormController, FormStatus, HttpMethod, HttpRequest, HttpResponse, SystemClock,
    Transition, TransportError,
};
use chrono::{Days, Local, NaiveTime};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the controller
/// handle status interpretation. Transport failures become `TransportError`.
fn execute(req: HttpRequest) -> Result<HttpResponse, TransportError> {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Post, Some(body)) => {
            agent.post(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
    }
    .map_err(|e| TransportError::new(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    Ok(HttpResponse::new(status, body))
}

fn start_server() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

#[test]
fn booking_session() {
    // Step 1: start mock server and open the form.
    let addr = start_server();
    let client = BookingClient::new(&format!("http://{addr}/api"));
    let (mut form, init) = BookingFormController::new(client, SystemClock);

    // Step 2: clinic list loads.
    let t = form.complete(init.id, execute(init.request));
    assert_eq!(t, Transition::ClinicsLoaded);
    assert_eq!(form.status(), FormStatus::Idle);
    assert!(!form.clinics().is_empty(), "expected seeded clinics");
    let first_clinic = form.clinics()[0].id.clone();
    let second_clinic = form.clinics()[1].id.clone();

    // Step 3: select one clinic, then another before the first list arrives.
    let stale = form.select_clinic(Some(first_clinic.clone())).unwrap();
    let fresh = form.select_clinic(Some(second_clinic.clone())).unwrap();
    let t = form.complete(fresh.id, execute(fresh.request));
    assert_eq!(t, Transition::DoctorsLoaded);
    let t = form.complete(stale.id, execute(stale.request));
    assert_eq!(t, Transition::Discarded);
    assert_eq!(form.status(), FormStatus::Idle);
    let doctor = form.doctors()[0].id.clone();

    // Step 4: fill the form for tomorrow and submit.
    let tomorrow = Local::now().date_naive().checked_add_days(Days::new(1)).unwrap();
    form.set_patient_name("Integration Patient");
    form.set_reason("Annual checkup");
    form.select_doctor(Some(doctor.clone()));
    form.set_appointment_date(tomorrow);
    form.set_appointment_time(NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    let booking = form.submit().unwrap();
    assert_eq!(form.status(), FormStatus::Loading);
    let t = form.complete(booking.id, execute(booking.request));
    assert_eq!(t, Transition::BookingConfirmed);
    assert_eq!(form.status(), FormStatus::Success);
    assert!(form.draft().patient_name.is_empty());
    assert!(form.draft().selected_clinic_id.is_none());

    // Step 5: the same slot again is rejected by the server, draft survives.
    form.set_patient_name("Second Patient");
    form.set_reason("Follow-up");
    let pending = form.select_clinic(Some(second_clinic)).unwrap();
    form.complete(pending.id, execute(pending.request));
    form.select_doctor(Some(doctor));
    form.set_appointment_date(tomorrow);
    form.set_appointment_time(NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    let booking = form.submit().unwrap();
    let t = form.complete(booking.id, execute(booking.request));
    assert_eq!(t, Transition::Failed("Doctor unavailable".to_string()));
    assert_eq!(form.draft().patient_name, "Second Patient");

    // Step 6: an unknown clinic's doctor list fails with the fixed message.
    let pending = form.select_clinic(Some("missing".to_string())).unwrap();
    let t = form.complete(pending.id, execute(pending.request));
    assert_eq!(t, Transition::Failed("Failed to fetch doctors".to_string()));
}

#[test]
fn unreachable_server_surfaces_transport_error() {
    // Bind then drop so the port is very likely closed.
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let client = BookingClient::new(&format!("http://{addr}/api"));
    let (mut form, init) = BookingFormController::new(client, SystemClock);

    let t = form.complete(init.id, execute(init.request));
    assert!(matches!(t, Transition::Failed(_)));
    assert!(matches!(form.status(), FormStatus::Error(_)));
    assert!(form.clinics().is_empty());
}
