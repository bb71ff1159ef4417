use super::{ConsultationMode, DayOfWeek, ScheduleStatus, WireValue};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Working hours as `HH:MM` strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHours {
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_end_time: Option<String>,
}

/// Holiday or custom-hours override of a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleException {
    pub date: DateTime<Utc>,
    pub reason: String,
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_working_hours: Option<WorkingHours>,
}

/// Body of `POST /schedules/{id}/exceptions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScheduleException {
    pub date: NaiveDate,
    pub reason: String,
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_working_hours: Option<WorkingHours>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub doctor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<String>,
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<DayOfWeek>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<WorkingHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_date_working_hours: Option<WorkingHours>,
    pub consultation_mode: WireValue<ConsultationMode>,
    pub slot_duration: u32,
    pub buffer_time: u32,
    pub max_patients_per_slot: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_appointments_per_day: Option<u32>,
    pub status: WireValue<ScheduleStatus>,
    #[serde(default)]
    pub exceptions: Vec<ScheduleException>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /schedules`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchedule {
    pub is_recurring: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<DayOfWeek>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_date: Option<NaiveDate>,
    pub working_hours: WorkingHours,
    pub consultation_mode: ConsultationMode,
    pub slot_duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_patients_per_slot: Option<u32>,
}

/// Partial update of a schedule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<WorkingHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultation_mode: Option<ConsultationMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_patients_per_slot: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_appointments_per_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ScheduleStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_available: bool,
    #[serde(default)]
    pub is_booked: bool,
    #[serde(default)]
    pub is_past: bool,
}

/// Payload of `GET /doctors/{id}/available-slots`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlots {
    /// Echo of the requested day, as the backend formats it
    pub date: String,
    #[serde(default)]
    pub slots: Vec<TimeSlot>,
    pub total_slots: u32,
    pub available_slots: u32,
    pub booked_slots: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AvailableSlots {
    /// Slots that can still be booked
    pub fn open_slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slots
            .iter()
            .filter(|slot| slot.is_available && !slot.is_booked && !slot.is_past)
    }
}
