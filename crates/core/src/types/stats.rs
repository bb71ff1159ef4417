use serde::{Deserialize, Serialize};

/// Payload of `GET /appointments/stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentStats {
    pub total: u32,
    pub pending: u32,
    pub confirmed: u32,
    pub completed: u32,
    pub cancelled: u32,
    pub no_show: u32,
    pub upcoming: u32,
    pub past: u32,
    pub today_appointments: u32,
}

/// Payload of `GET /doctors/my-stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorStats {
    pub total_patients: u32,
    pub total_appointments: u32,
    pub upcoming_appointments: u32,
    pub completed_appointments: u32,
    pub cancelled_appointments: u32,
    pub total_revenue: f64,
    pub monthly_revenue: f64,
    pub average_rating: f64,
    pub total_reviews: u32,
}
