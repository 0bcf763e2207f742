use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Clinic {
    #[serde(rename = "_id")]
    pub id: String,
    pub clinic_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(rename = "_id")]
    pub id: String,
    pub doctor_name: String,
    #[serde(skip)]
    pub clinic_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub clinic_id: String,
    pub doctor_id: String,
    pub reason: String,
    pub appointment_date_time: DateTime<FixedOffset>,
}

/// Every field is optional so that a missing one produces the API's own
/// 400 message rather than an extractor rejection.
#[derive(Deserialize)]
pub struct CreateAppointment {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub clinic_id: Option<String>,
    #[serde(default)]
    pub doctor_id: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub appointment_date_time: Option<DateTime<FixedOffset>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Store {
    pub clinics: Vec<Clinic>,
    pub doctors: Vec<Doctor>,
    pub appointments: Vec<Appointment>,
}

pub type Db = Arc<RwLock<Store>>;

type Rejection = (StatusCode, Json<ErrorMessage>);

fn reject(status: StatusCode, message: &str) -> Rejection {
    tracing::warn!(%status, reason = message, "request rejected");
    (
        status,
        Json(ErrorMessage {
            message: message.to_string(),
        }),
    )
}

/// Two clinics with two doctors each.
pub fn seed() -> Store {
    let clinic = |id: &str, name: &str| Clinic {
        id: id.to_string(),
        clinic_name: name.to_string(),
    };
    let doctor = |id: &str, name: &str, clinic_id: &str| Doctor {
        id: id.to_string(),
        doctor_name: name.to_string(),
        clinic_id: clinic_id.to_string(),
    };
    Store {
        clinics: vec![
            clinic("clinic-north", "North Medical Centre"),
            clinic("clinic-south", "South Family Practice"),
        ],
        doctors: vec![
            doctor("doc-n1", "Dr. Amina Yusuf", "clinic-north"),
            doctor("doc-n2", "Dr. Kwame Mensah", "clinic-north"),
            doctor("doc-s1", "Dr. Lena Novak", "clinic-south"),
            doctor("doc-s2", "Dr. Ravi Menon", "clinic-south"),
        ],
        appointments: Vec::new(),
    }
}

pub fn app() -> Router {
    app_with(seed())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    let api = Router::new()
        .route("/clinic", get(list_clinics))
        .route("/clinic/{id}/doctor", get(list_doctors))
        .route("/appointment", post(create_appointment));
    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_clinics(State(db): State<Db>) -> Json<Vec<Clinic>> {
    Json(db.read().await.clinics.clone())
}

async fn list_doctors(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Doctor>>, Rejection> {
    let store = db.read().await;
    if !store.clinics.iter().any(|c| c.id == id) {
        return Err(reject(StatusCode::NOT_FOUND, "Clinic not found"));
    }
    let doctors = store
        .doctors
        .iter()
        .filter(|d| d.clinic_id == id)
        .cloned()
        .collect();
    Ok(Json(doctors))
}

async fn create_appointment(
    State(db): State<Db>,
    Json(input): Json<CreateAppointment>,
) -> Result<(StatusCode, Json<Appointment>), Rejection> {
    let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
    let (Some(name), Some(clinic_id), Some(doctor_id), Some(reason), Some(appointment_date_time)) = (
        non_empty(input.name),
        non_empty(input.clinic_id),
        non_empty(input.doctor_id),
        non_empty(input.reason),
        input.appointment_date_time,
    ) else {
        return Err(reject(StatusCode::BAD_REQUEST, "Missing required fields"));
    };

    let mut store = db.write().await;
    if !store.clinics.iter().any(|c| c.id == clinic_id) {
        return Err(reject(StatusCode::NOT_FOUND, "Clinic not found"));
    }
    if !store
        .doctors
        .iter()
        .any(|d| d.id == doctor_id && d.clinic_id == clinic_id)
    {
        return Err(reject(StatusCode::BAD_REQUEST, "Doctor not found at this clinic"));
    }
    if store
        .appointments
        .iter()
        .any(|a| a.doctor_id == doctor_id && a.appointment_date_time == appointment_date_time)
    {
        return Err(reject(StatusCode::CONFLICT, "Doctor unavailable"));
    }

    let appointment = Appointment {
        id: Uuid::new_v4(),
        name,
        clinic_id,
        doctor_id,
        reason,
        appointment_date_time,
    };
    tracing::info!(id = %appointment.id, doctor = %appointment.doctor_id, "appointment booked");
    store.appointments.push(appointment.clone());
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clinic_serializes_with_underscore_id() {
        let clinic = Clinic {
            id: "c1".to_string(),
            clinic_name: "North".to_string(),
        };
        let json = serde_json::to_value(&clinic).unwrap();
        assert_eq!(json["_id"], "c1");
        assert_eq!(json["clinic_name"], "North");
    }

    #[test]
    fn doctor_hides_clinic_id() {
        let doctor = Doctor {
            id: "d1".to_string(),
            doctor_name: "Dr. A".to_string(),
            clinic_id: "c1".to_string(),
        };
        let json = serde_json::to_value(&doctor).unwrap();
        assert_eq!(json["_id"], "d1");
        assert_eq!(json["doctor_name"], "Dr. A");
        assert!(json.get("clinic_id").is_none());
    }

    #[test]
    fn create_appointment_accepts_missing_fields() {
        let input: CreateAppointment = serde_json::from_str(r#"{"name":"Ada"}"#).unwrap();
        assert_eq!(input.name.as_deref(), Some("Ada"));
        assert!(input.clinic_id.is_none());
        assert!(input.appointment_date_time.is_none());
    }

    #[test]
    fn create_appointment_parses_offset_timestamp() {
        let input: CreateAppointment =
            serde_json::from_str(r#"{"appointment_date_time":"2030-01-02T09:30:00+02:00"}"#).unwrap();
        let ts = input.appointment_date_time.unwrap();
        assert_eq!(ts.to_rfc3339(), "2030-01-02T09:30:00+02:00");
    }

    #[test]
    fn seed_has_doctors_for_every_clinic() {
        let store = seed();
        for clinic in &store.clinics {
            assert!(store.doctors.iter().any(|d| d.clinic_id == clinic.id), "{}", clinic.id);
        }
    }
}
