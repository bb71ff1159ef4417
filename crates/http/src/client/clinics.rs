//! Clinic directory endpoints

use super::{ApiRequest, ClientError, MedibookClient};
use medibook_core::types::{
    ApiResponse, Clinic, ClinicFilters, ClinicWithDoctors, DoctorPublicProfile, Paginated,
};

/// Search radius of `nearby` when the caller gives none, in metres
pub const DEFAULT_NEARBY_DISTANCE_M: u32 = 5000;

#[derive(Clone, Copy)]
pub struct Clinics<'a> {
    client: &'a MedibookClient,
}

impl<'a> Clinics<'a> {
    pub(crate) const fn new(client: &'a MedibookClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        filters: &ClinicFilters,
    ) -> Result<ApiResponse<Paginated<Clinic>>, ClientError> {
        let request = ApiRequest::get(&["clinics"]).query(filters)?;
        self.client.send(request).await
    }

    pub async fn get(&self, id: &str) -> Result<ApiResponse<ClinicWithDoctors>, ClientError> {
        self.client.send(ApiRequest::get(&["clinics", id])).await
    }

    pub async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        max_distance: Option<u32>,
    ) -> Result<ApiResponse<Vec<Clinic>>, ClientError> {
        let request = ApiRequest::get(&["clinics", "nearby"])
            .param("lat", lat)
            .param("lng", lng)
            .param(
                "maxDistance",
                max_distance.unwrap_or(DEFAULT_NEARBY_DISTANCE_M),
            );
        self.client.send(request).await
    }

    pub async fn doctors(
        &self,
        clinic_id: &str,
    ) -> Result<ApiResponse<Vec<DoctorPublicProfile>>, ClientError> {
        self.client
            .send(ApiRequest::get(&["clinics", clinic_id, "doctors"]))
            .await
    }

    pub async fn search(
        &self,
        query: &str,
        city: Option<&str>,
    ) -> Result<ApiResponse<Paginated<Clinic>>, ClientError> {
        let mut request = ApiRequest::get(&["clinics"]).param("search", query);
        if let Some(city) = city {
            request = request.param("city", city);
        }
        self.client.send(request).await
    }
}
