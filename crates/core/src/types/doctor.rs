use super::{ConsultationFee, ConsultationMode, Degree, Specialty, User, WireValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub year: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub title: String,
    pub issued_by: String,
    pub issued_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Private doctor profile (`/doctors/my-profile`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub specialty: WireValue<Specialty>,
    #[serde(default)]
    pub sub_specialties: Vec<WireValue<Specialty>>,
    pub degree: WireValue<Degree>,
    pub license_number: String,
    pub years_of_experience: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub consultation_modes: Vec<WireValue<ConsultationMode>>,
    #[serde(default)]
    pub consultation_fee: ConsultationFee,
    pub session_duration: u32,
    #[serde(default)]
    pub clinics: Vec<String>,
    pub status: String,
    pub is_accepting_new_patients: bool,
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_reviews: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_patients: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_appointments: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorWithUser {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub user: User,
}

/// Clinic reference embedded in a public doctor profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicSummary {
    pub id: String,
    pub name: String,
    pub address: String,
}

/// Public doctor card returned by listings and search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorPublicProfile {
    pub id: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub specialty: WireValue<Specialty>,
    #[serde(default)]
    pub sub_specialties: Vec<WireValue<Specialty>>,
    pub degree: WireValue<Degree>,
    pub years_of_experience: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub consultation_modes: Vec<WireValue<ConsultationMode>>,
    #[serde(default)]
    pub consultation_fee: ConsultationFee,
    pub session_duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_reviews: Option<u32>,
    pub is_accepting_new_patients: bool,
    pub is_verified: bool,
    #[serde(default)]
    pub clinics: Vec<ClinicSummary>,
}

/// Partial update of `/doctors/my-profile`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<Specialty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_specialties: Option<Vec<Specialty>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<Degree>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultation_modes: Option<Vec<ConsultationMode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultation_fee: Option<ConsultationFee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_accepting_new_patients: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Query string of doctor listings and search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<Specialty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_accepting_new_patients: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApiResponse, Paginated};
    use serde_json::json;

    #[test]
    fn test_unknown_specialty_does_not_fail_the_page() {
        let response: ApiResponse<Paginated<DoctorPublicProfile>> = serde_json::from_value(json!({
            "data": {
                "data": [{
                    "id": "d1",
                    "fullName": "Karim Adel",
                    "specialty": "sports_medicine",
                    "subSpecialties": ["cardiology"],
                    "degree": "MD",
                    "yearsOfExperience": 12,
                    "consultationModes": ["in_clinic", "hologram"],
                    "sessionDuration": 30,
                    "isAcceptingNewPatients": true,
                    "isVerified": true
                }],
                "pagination": { "total": 1, "page": 1, "limit": 10, "totalPages": 1 }
            }
        }))
        .unwrap();

        let doctor = &response.into_data().unwrap().data[0];
        assert_eq!(doctor.specialty, WireValue::Other("sports_medicine".into()));
        assert_eq!(doctor.specialty.label(), "sports_medicine");
        assert_eq!(doctor.sub_specialties, [WireValue::Known(Specialty::Cardiology)]);
        assert_eq!(doctor.degree.known(), Some(Degree::Md));
        assert_eq!(doctor.consultation_modes[0].known(), Some(ConsultationMode::InClinic));
        assert_eq!(doctor.consultation_modes[1].to_string(), "hologram");
    }
}
