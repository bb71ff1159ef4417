//! Doctor schedule endpoints

use super::{ApiRequest, ClientError, MedibookClient};
use chrono::NaiveDate;
use medibook_core::types::{
    ApiResponse, CreateSchedule, NewScheduleException, Schedule, ScheduleUpdate,
};
use serde_json::Value;

#[derive(Clone, Copy)]
pub struct Schedules<'a> {
    client: &'a MedibookClient,
}

impl<'a> Schedules<'a> {
    pub(crate) const fn new(client: &'a MedibookClient) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        schedule: &CreateSchedule,
    ) -> Result<ApiResponse<Schedule>, ClientError> {
        let request = ApiRequest::post(&["schedules"]).json(schedule)?;
        self.client.send(request).await
    }

    /// Schedules of the logged-in doctor
    pub async fn mine(&self) -> Result<ApiResponse<Vec<Schedule>>, ClientError> {
        self.client
            .send(ApiRequest::get(&["schedules", "my-schedules"]))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<ApiResponse<Schedule>, ClientError> {
        self.client.send(ApiRequest::get(&["schedules", id])).await
    }

    pub async fn update(
        &self,
        id: &str,
        update: &ScheduleUpdate,
    ) -> Result<ApiResponse<Schedule>, ClientError> {
        let request = ApiRequest::put(&["schedules", id]).json(update)?;
        self.client.send(request).await
    }

    pub async fn delete(&self, id: &str) -> Result<ApiResponse<Value>, ClientError> {
        self.client.send(ApiRequest::delete(&["schedules", id])).await
    }

    /// Add a holiday or custom-hours day
    pub async fn add_exception(
        &self,
        id: &str,
        exception: &NewScheduleException,
    ) -> Result<ApiResponse<Schedule>, ClientError> {
        let request = ApiRequest::post(&["schedules", id, "exceptions"]).json(exception)?;
        self.client.send(request).await
    }

    pub async fn remove_exception(
        &self,
        id: &str,
        date: NaiveDate,
    ) -> Result<ApiResponse<Schedule>, ClientError> {
        let date = date.format("%Y-%m-%d").to_string();
        self.client
            .send(ApiRequest::delete(&["schedules", id, "exceptions", &date]))
            .await
    }
}
