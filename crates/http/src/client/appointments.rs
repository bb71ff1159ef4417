//! Appointment API client methods

use super::{ApiRequest, ClientError, MedibookClient};
use chrono::{DateTime, NaiveDate, Utc};
use medibook_core::types::{
    ApiResponse, Appointment, AppointmentFilters, AppointmentStats, AppointmentWithDetails,
    AvailableSlots, CompleteAppointment, CreateAppointment, Paginated,
};
use serde::Serialize;

#[derive(Serialize)]
struct CancelBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RescheduleBody {
    new_date: DateTime<Utc>,
}

/// Booking and appointment lifecycle endpoints
#[derive(Clone, Copy)]
pub struct Appointments<'a> {
    client: &'a MedibookClient,
}

impl<'a> Appointments<'a> {
    pub(crate) const fn new(client: &'a MedibookClient) -> Self {
        Self { client }
    }

    /// Book an appointment (patient)
    pub async fn book(
        &self,
        appointment: &CreateAppointment,
    ) -> Result<ApiResponse<AppointmentWithDetails>, ClientError> {
        let request = ApiRequest::post(&["appointments"]).json(appointment)?;
        self.client.send(request).await
    }

    pub async fn my_appointments(
        &self,
        filters: &AppointmentFilters,
    ) -> Result<ApiResponse<Paginated<AppointmentWithDetails>>, ClientError> {
        let request = ApiRequest::get(&["appointments", "my-appointments"]).query(filters)?;
        self.client.send(request).await
    }

    pub async fn get(&self, id: &str) -> Result<ApiResponse<AppointmentWithDetails>, ClientError> {
        self.client.send(ApiRequest::get(&["appointments", id])).await
    }

    /// Bookable slots of a doctor on one day
    pub async fn available_slots(
        &self,
        doctor_id: &str,
        date: NaiveDate,
    ) -> Result<ApiResponse<AvailableSlots>, ClientError> {
        let request = ApiRequest::get(&["doctors", doctor_id, "available-slots"])
            .param("date", date.format("%Y-%m-%d"));
        self.client.send(request).await
    }

    pub async fn cancel(
        &self,
        id: &str,
        reason: Option<&str>,
    ) -> Result<ApiResponse<Appointment>, ClientError> {
        let request =
            ApiRequest::put(&["appointments", id, "cancel"]).json(&CancelBody { reason })?;
        self.client.send(request).await
    }

    pub async fn reschedule(
        &self,
        id: &str,
        new_date: DateTime<Utc>,
    ) -> Result<ApiResponse<Appointment>, ClientError> {
        let request =
            ApiRequest::put(&["appointments", id, "reschedule"]).json(&RescheduleBody { new_date })?;
        self.client.send(request).await
    }

    /// Confirm a pending appointment (doctor)
    pub async fn confirm(&self, id: &str) -> Result<ApiResponse<Appointment>, ClientError> {
        self.client
            .send(ApiRequest::put(&["appointments", id, "confirm"]))
            .await
    }

    /// Close an appointment with clinical notes (doctor)
    pub async fn complete(
        &self,
        id: &str,
        outcome: &CompleteAppointment,
    ) -> Result<ApiResponse<Appointment>, ClientError> {
        let request = ApiRequest::put(&["appointments", id, "complete"]).json(outcome)?;
        self.client.send(request).await
    }

    pub async fn mark_no_show(&self, id: &str) -> Result<ApiResponse<Appointment>, ClientError> {
        self.client
            .send(ApiRequest::put(&["appointments", id, "no-show"]))
            .await
    }

    /// Appointments booked with the logged-in doctor
    pub async fn doctor_appointments(
        &self,
        filters: &AppointmentFilters,
    ) -> Result<ApiResponse<Paginated<AppointmentWithDetails>>, ClientError> {
        let request = ApiRequest::get(&["doctors", "appointments"]).query(filters)?;
        self.client.send(request).await
    }

    pub async fn stats(&self) -> Result<ApiResponse<AppointmentStats>, ClientError> {
        self.client
            .send(ApiRequest::get(&["appointments", "stats"]))
            .await
    }
}
