//! Patient self-service endpoints

use super::{ApiRequest, ClientError, MedibookClient};
use medibook_core::types::{
    ApiResponse, EmergencyContact, MedicalInfoUpdate, MedicalSummary, Patient,
    PatientProfileUpdate,
};

#[derive(Clone, Copy)]
pub struct Patients<'a> {
    client: &'a MedibookClient,
}

impl<'a> Patients<'a> {
    pub(crate) const fn new(client: &'a MedibookClient) -> Self {
        Self { client }
    }

    pub async fn my_profile(&self) -> Result<ApiResponse<Patient>, ClientError> {
        self.client
            .send(ApiRequest::get(&["patients", "my-profile"]))
            .await
    }

    pub async fn update_my_profile(
        &self,
        update: &PatientProfileUpdate,
    ) -> Result<ApiResponse<Patient>, ClientError> {
        let request = ApiRequest::put(&["patients", "my-profile"]).json(update)?;
        self.client.send(request).await
    }

    pub async fn medical_summary(&self) -> Result<ApiResponse<MedicalSummary>, ClientError> {
        self.client
            .send(ApiRequest::get(&["patients", "medical-summary"]))
            .await
    }

    pub async fn update_medical_info(
        &self,
        update: &MedicalInfoUpdate,
    ) -> Result<ApiResponse<Patient>, ClientError> {
        let request = ApiRequest::put(&["patients", "medical-info"]).json(update)?;
        self.client.send(request).await
    }

    pub async fn update_emergency_contact(
        &self,
        contact: &EmergencyContact,
    ) -> Result<ApiResponse<Patient>, ClientError> {
        let request = ApiRequest::put(&["patients", "emergency-contact"]).json(contact)?;
        self.client.send(request).await
    }
}
