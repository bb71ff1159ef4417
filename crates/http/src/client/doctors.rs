//! Doctor directory and doctor self-service endpoints

use super::{ApiRequest, ClientError, MedibookClient};
use medibook_core::types::{
    ApiResponse, Doctor, DoctorProfileUpdate, DoctorPublicProfile, DoctorSearchFilters,
    DoctorStats, Paginated, Specialty,
};

pub const DEFAULT_TOP_RATED_LIMIT: u32 = 10;

#[derive(Clone, Copy)]
pub struct Doctors<'a> {
    client: &'a MedibookClient,
}

impl<'a> Doctors<'a> {
    pub(crate) const fn new(client: &'a MedibookClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        filters: &DoctorSearchFilters,
    ) -> Result<ApiResponse<Paginated<DoctorPublicProfile>>, ClientError> {
        let request = ApiRequest::get(&["doctors"]).query(filters)?;
        self.client.send(request).await
    }

    /// Public profile of one doctor
    pub async fn get(&self, id: &str) -> Result<ApiResponse<DoctorPublicProfile>, ClientError> {
        self.client.send(ApiRequest::get(&["doctors", id])).await
    }

    pub async fn my_profile(&self) -> Result<ApiResponse<Doctor>, ClientError> {
        self.client
            .send(ApiRequest::get(&["doctors", "my-profile"]))
            .await
    }

    pub async fn update_my_profile(
        &self,
        update: &DoctorProfileUpdate,
    ) -> Result<ApiResponse<Doctor>, ClientError> {
        let request = ApiRequest::put(&["doctors", "my-profile"]).json(update)?;
        self.client.send(request).await
    }

    pub async fn my_stats(&self) -> Result<ApiResponse<DoctorStats>, ClientError> {
        self.client
            .send(ApiRequest::get(&["doctors", "my-stats"]))
            .await
    }

    /// Free-text search; `query` wins over any `search` in the filters
    pub async fn search(
        &self,
        query: &str,
        filters: &DoctorSearchFilters,
    ) -> Result<ApiResponse<Paginated<DoctorPublicProfile>>, ClientError> {
        let request = ApiRequest::get(&["doctors", "search"])
            .query(filters)?
            .param("search", query);
        self.client.send(request).await
    }

    pub async fn top_rated(
        &self,
        limit: Option<u32>,
    ) -> Result<ApiResponse<Vec<DoctorPublicProfile>>, ClientError> {
        let request = ApiRequest::get(&["doctors", "top-rated"])
            .param("limit", limit.unwrap_or(DEFAULT_TOP_RATED_LIMIT));
        self.client.send(request).await
    }

    pub async fn by_specialty(
        &self,
        specialty: Specialty,
        filters: &DoctorSearchFilters,
    ) -> Result<ApiResponse<Paginated<DoctorPublicProfile>>, ClientError> {
        let filters = DoctorSearchFilters {
            specialty: Some(specialty),
            ..filters.clone()
        };
        self.list(&filters).await
    }
}
