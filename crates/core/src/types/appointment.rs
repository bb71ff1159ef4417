use super::{
    AppointmentStatus, AppointmentType, Clinic, ConsultationMode, Degree, Specialty, User, WireValue,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub patient_id: String,
    pub doctor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<String>,
    pub appointment_number: String,
    pub scheduled_date: DateTime<Utc>,
    pub appointment_type: WireValue<AppointmentType>,
    pub consultation_mode: WireValue<ConsultationMode>,
    pub duration: u32,
    pub status: WireValue<AppointmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    pub consultation_fee: f64,
    pub platform_fee: f64,
    pub total_fee: f64,
    pub is_paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chief_complaint: Option<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_notes: Option<String>,
    pub is_follow_up: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_appointment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_follow_up_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    pub reminder_sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Doctor account with the professional fields listings need
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDoctor {
    #[serde(flatten)]
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<WireValue<Specialty>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<WireValue<Degree>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentWithDetails {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient: User,
    pub doctor: AppointmentDoctor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic: Option<Clinic>,
}

/// Body of `POST /appointments`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointment {
    pub doctor_user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<String>,
    pub scheduled_date: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    pub consultation_mode: ConsultationMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chief_complaint: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub symptoms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_follow_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_appointment_id: Option<String>,
}

/// Body of `PUT /appointments/{id}/complete`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteAppointment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_follow_up_date: Option<DateTime<Utc>>,
}

/// Query string of appointment listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}
