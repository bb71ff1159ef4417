//! Data-fetching layer
//!
//! Reads go through [`QueryCache`] under the keys in [`keys`]; mutations call
//! the client and then invalidate the queries they make stale.

pub mod cache;
pub mod keys;

pub use cache::QueryCache;
pub use keys::QueryKey;

use chrono::{DateTime, NaiveDate, Utc};
use medibook_core::LoginForm;
use medibook_core::types::{
    ApiResponse, Appointment, AppointmentFilters, AppointmentStats, AppointmentWithDetails,
    AvailableSlots, ChangePassword, Clinic, ClinicFilters, ClinicWithDoctors, CompleteAppointment,
    CreateAppointment, CreateSchedule, Doctor, DoctorProfileUpdate, DoctorPublicProfile,
    DoctorSearchFilters, DoctorStats, EmergencyContact, LoginResponse, MedicalInfoUpdate,
    MedicalSummary, NewScheduleException, Paginated, Patient, PatientProfileUpdate, Schedule,
    ScheduleUpdate, Specialty, User, UserProfileUpdate,
};
use medibook_http::{ClientError, MedibookClient};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// How long the current user stays fresh
pub const CURRENT_USER_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Search queries run from this many characters on
pub const MIN_SEARCH_LEN: usize = 2;

const DEFAULT_TOP_RATED_LIMIT: u32 = 10;
const DEFAULT_NEARBY_DISTANCE_M: u32 = 5000;

/// Writes that make cached reads stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Login,
    Logout,
    UpdateProfile,
    BookAppointment,
    CancelAppointment,
    RescheduleAppointment,
    ConfirmAppointment,
    CompleteAppointment,
    MarkNoShow,
    UpdateDoctorProfile,
    UpdatePatientProfile,
    UpdateMedicalInfo,
    UpdateEmergencyContact,
    CreateSchedule,
    UpdateSchedule,
    DeleteSchedule,
    AddScheduleException,
    RemoveScheduleException,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    ClearAll,
    Keys(Vec<QueryKey>),
}

/// Queries a successful mutation invalidates
pub fn invalidations(mutation: Mutation) -> Invalidation {
    let stale = match mutation {
        Mutation::Logout => return Invalidation::ClearAll,
        Mutation::Login | Mutation::UpdateProfile => vec![keys::auth::current_user()],
        Mutation::BookAppointment => vec![
            keys::appointments::my_appointments(None),
            keys::appointments::stats(),
        ],
        Mutation::CancelAppointment => vec![
            keys::appointments::my_appointments(None),
            keys::appointments::doctor_appointments(None),
            keys::appointments::stats(),
        ],
        Mutation::RescheduleAppointment => vec![
            keys::appointments::my_appointments(None),
            keys::appointments::doctor_appointments(None),
        ],
        Mutation::ConfirmAppointment | Mutation::CompleteAppointment | Mutation::MarkNoShow => {
            vec![
                keys::appointments::doctor_appointments(None),
                keys::appointments::stats(),
            ]
        }
        Mutation::UpdateDoctorProfile => vec![keys::doctors::my_profile()],
        Mutation::UpdatePatientProfile => {
            vec![keys::patients::my_profile(), keys::auth::current_user()]
        }
        Mutation::UpdateMedicalInfo => {
            vec![keys::patients::my_profile(), keys::patients::medical_summary()]
        }
        Mutation::UpdateEmergencyContact => vec![keys::patients::my_profile()],
        Mutation::CreateSchedule
        | Mutation::UpdateSchedule
        | Mutation::DeleteSchedule
        | Mutation::AddScheduleException
        | Mutation::RemoveScheduleException => vec![keys::schedules::my_schedules()],
    };
    Invalidation::Keys(stale)
}

fn has_id(id: &str) -> bool {
    !id.trim().is_empty()
}

fn is_searchable(query: &str) -> bool {
    query.chars().count() >= MIN_SEARCH_LEN
}

fn is_coordinate(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

/// Cached reads and invalidating writes over one client
///
/// Queries that need an id or search text return `Ok(None)` without a
/// request when that input is missing.
#[derive(Clone)]
pub struct Queries {
    client: MedibookClient,
    cache: Arc<QueryCache>,
}

impl Queries {
    pub fn new(client: MedibookClient) -> Self {
        Self {
            client,
            cache: Arc::new(QueryCache::new()),
        }
    }

    pub const fn client(&self) -> &MedibookClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub(crate) fn shared_cache(&self) -> Arc<QueryCache> {
        Arc::clone(&self.cache)
    }

    /// Apply the invalidation rules of `mutation`
    pub fn apply(&self, mutation: Mutation) {
        match invalidations(mutation) {
            Invalidation::ClearAll => self.cache.clear(),
            Invalidation::Keys(keys) => {
                for key in &keys {
                    self.cache.invalidate(key);
                }
            }
        }
    }

    fn settle<T>(
        &self,
        mutation: Mutation,
        result: Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        if result.is_ok() {
            self.apply(mutation);
        }
        result
    }

    async fn read<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, ClientError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        self.cache.fetch(key, Duration::ZERO, fetch).await
    }

    // Auth

    pub async fn current_user(&self) -> Result<ApiResponse<User>, ClientError> {
        self.cache
            .fetch(keys::auth::current_user(), CURRENT_USER_STALE_TIME, || async move {
                self.client.auth().current_user().await
            })
            .await
    }

    pub async fn login(&self, form: LoginForm) -> Result<ApiResponse<LoginResponse>, ClientError> {
        let result = self.client.auth().login_form(form).await;
        self.settle(Mutation::Login, result)
    }

    /// Log out; the cache is dropped together with the tokens
    pub async fn logout(&self) -> Result<ApiResponse<Value>, ClientError> {
        let result = self.client.auth().logout().await;
        self.apply(Mutation::Logout);
        result
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        update: &UserProfileUpdate,
    ) -> Result<ApiResponse<User>, ClientError> {
        let result = self.client.auth().update_profile(user_id, update).await;
        self.settle(Mutation::UpdateProfile, result)
    }

    pub async fn change_password(
        &self,
        request: &ChangePassword,
    ) -> Result<ApiResponse<Value>, ClientError> {
        self.client.auth().change_password(request).await
    }

    // Appointments

    pub async fn my_appointments(
        &self,
        filters: &AppointmentFilters,
    ) -> Result<ApiResponse<Paginated<AppointmentWithDetails>>, ClientError> {
        self.read(keys::appointments::my_appointments(Some(filters)), || async move {
            self.client.appointments().my_appointments(filters).await
        })
        .await
    }

    pub async fn doctor_appointments(
        &self,
        filters: &AppointmentFilters,
    ) -> Result<ApiResponse<Paginated<AppointmentWithDetails>>, ClientError> {
        self.read(keys::appointments::doctor_appointments(Some(filters)), || async move {
            self.client.appointments().doctor_appointments(filters).await
        })
        .await
    }

    pub async fn appointment(
        &self,
        id: &str,
    ) -> Result<Option<ApiResponse<AppointmentWithDetails>>, ClientError> {
        if !has_id(id) {
            return Ok(None);
        }
        self.read(keys::appointments::detail(id), || async move {
            self.client.appointments().get(id).await
        })
        .await
        .map(Some)
    }

    pub async fn available_slots(
        &self,
        doctor_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<Option<ApiResponse<AvailableSlots>>, ClientError> {
        let Some(date) = date.filter(|_| has_id(doctor_id)) else {
            return Ok(None);
        };
        self.read(keys::appointments::available_slots(doctor_id, date), || async move {
            self.client.appointments().available_slots(doctor_id, date).await
        })
        .await
        .map(Some)
    }

    pub async fn appointment_stats(&self) -> Result<ApiResponse<AppointmentStats>, ClientError> {
        self.read(keys::appointments::stats(), || async move {
            self.client.appointments().stats().await
        })
        .await
    }

    pub async fn book_appointment(
        &self,
        appointment: &CreateAppointment,
    ) -> Result<ApiResponse<AppointmentWithDetails>, ClientError> {
        let result = self.client.appointments().book(appointment).await;
        self.settle(Mutation::BookAppointment, result)
    }

    pub async fn cancel_appointment(
        &self,
        id: &str,
        reason: Option<&str>,
    ) -> Result<ApiResponse<Appointment>, ClientError> {
        let result = self.client.appointments().cancel(id, reason).await;
        self.settle(Mutation::CancelAppointment, result)
    }

    pub async fn reschedule_appointment(
        &self,
        id: &str,
        new_date: DateTime<Utc>,
    ) -> Result<ApiResponse<Appointment>, ClientError> {
        let result = self.client.appointments().reschedule(id, new_date).await;
        self.settle(Mutation::RescheduleAppointment, result)
    }

    pub async fn confirm_appointment(
        &self,
        id: &str,
    ) -> Result<ApiResponse<Appointment>, ClientError> {
        let result = self.client.appointments().confirm(id).await;
        self.settle(Mutation::ConfirmAppointment, result)
    }

    pub async fn complete_appointment(
        &self,
        id: &str,
        outcome: &CompleteAppointment,
    ) -> Result<ApiResponse<Appointment>, ClientError> {
        let result = self.client.appointments().complete(id, outcome).await;
        self.settle(Mutation::CompleteAppointment, result)
    }

    pub async fn mark_no_show(&self, id: &str) -> Result<ApiResponse<Appointment>, ClientError> {
        let result = self.client.appointments().mark_no_show(id).await;
        self.settle(Mutation::MarkNoShow, result)
    }

    // Doctors

    pub async fn doctors(
        &self,
        filters: &DoctorSearchFilters,
    ) -> Result<ApiResponse<Paginated<DoctorPublicProfile>>, ClientError> {
        self.read(keys::doctors::list(Some(filters)), || async move {
            self.client.doctors().list(filters).await
        })
        .await
    }

    pub async fn doctor(
        &self,
        id: &str,
    ) -> Result<Option<ApiResponse<DoctorPublicProfile>>, ClientError> {
        if !has_id(id) {
            return Ok(None);
        }
        self.read(keys::doctors::detail(id), || async move { self.client.doctors().get(id).await })
            .await
            .map(Some)
    }

    pub async fn doctor_profile(&self) -> Result<ApiResponse<Doctor>, ClientError> {
        self.read(keys::doctors::my_profile(), || async move {
            self.client.doctors().my_profile().await
        })
        .await
    }

    pub async fn doctor_stats(&self) -> Result<ApiResponse<DoctorStats>, ClientError> {
        self.read(keys::doctors::my_stats(), || async move { self.client.doctors().my_stats().await })
            .await
    }

    pub async fn search_doctors(
        &self,
        query: &str,
        filters: &DoctorSearchFilters,
    ) -> Result<Option<ApiResponse<Paginated<DoctorPublicProfile>>>, ClientError> {
        if !is_searchable(query) {
            return Ok(None);
        }
        self.read(keys::doctors::search(query, Some(filters)), || async move {
            self.client.doctors().search(query, filters).await
        })
        .await
        .map(Some)
    }

    pub async fn top_rated_doctors(
        &self,
        limit: Option<u32>,
    ) -> Result<ApiResponse<Vec<DoctorPublicProfile>>, ClientError> {
        let limit = limit.unwrap_or(DEFAULT_TOP_RATED_LIMIT);
        self.read(keys::doctors::top_rated(limit), || async move {
            self.client.doctors().top_rated(Some(limit)).await
        })
        .await
    }

    pub async fn doctors_by_specialty(
        &self,
        specialty: Specialty,
        filters: &DoctorSearchFilters,
    ) -> Result<ApiResponse<Paginated<DoctorPublicProfile>>, ClientError> {
        self.read(keys::doctors::specialty(specialty, Some(filters)), || async move {
            self.client.doctors().by_specialty(specialty, filters).await
        })
        .await
    }

    pub async fn update_doctor_profile(
        &self,
        update: &DoctorProfileUpdate,
    ) -> Result<ApiResponse<Doctor>, ClientError> {
        let result = self.client.doctors().update_my_profile(update).await;
        self.settle(Mutation::UpdateDoctorProfile, result)
    }

    // Patients

    pub async fn patient_profile(&self) -> Result<ApiResponse<Patient>, ClientError> {
        self.read(keys::patients::my_profile(), || async move {
            self.client.patients().my_profile().await
        })
        .await
    }

    pub async fn medical_summary(&self) -> Result<ApiResponse<MedicalSummary>, ClientError> {
        self.read(keys::patients::medical_summary(), || async move {
            self.client.patients().medical_summary().await
        })
        .await
    }

    pub async fn update_patient_profile(
        &self,
        update: &PatientProfileUpdate,
    ) -> Result<ApiResponse<Patient>, ClientError> {
        let result = self.client.patients().update_my_profile(update).await;
        self.settle(Mutation::UpdatePatientProfile, result)
    }

    pub async fn update_medical_info(
        &self,
        update: &MedicalInfoUpdate,
    ) -> Result<ApiResponse<Patient>, ClientError> {
        let result = self.client.patients().update_medical_info(update).await;
        self.settle(Mutation::UpdateMedicalInfo, result)
    }

    pub async fn update_emergency_contact(
        &self,
        contact: &EmergencyContact,
    ) -> Result<ApiResponse<Patient>, ClientError> {
        let result = self.client.patients().update_emergency_contact(contact).await;
        self.settle(Mutation::UpdateEmergencyContact, result)
    }

    // Clinics

    pub async fn clinics(
        &self,
        filters: &ClinicFilters,
    ) -> Result<ApiResponse<Paginated<Clinic>>, ClientError> {
        self.read(keys::clinics::list(Some(filters)), || async move {
            self.client.clinics().list(filters).await
        })
        .await
    }

    pub async fn clinic(
        &self,
        id: &str,
    ) -> Result<Option<ApiResponse<ClinicWithDoctors>>, ClientError> {
        if !has_id(id) {
            return Ok(None);
        }
        self.read(keys::clinics::detail(id), || async move { self.client.clinics().get(id).await })
            .await
            .map(Some)
    }

    pub async fn nearby_clinics(
        &self,
        lat: f64,
        lng: f64,
        max_distance: Option<u32>,
    ) -> Result<Option<ApiResponse<Vec<Clinic>>>, ClientError> {
        if !is_coordinate(lat) || !is_coordinate(lng) {
            return Ok(None);
        }
        let max_distance = max_distance.unwrap_or(DEFAULT_NEARBY_DISTANCE_M);
        self.read(keys::clinics::nearby(lat, lng, max_distance), || async move {
            self.client.clinics().nearby(lat, lng, Some(max_distance)).await
        })
        .await
        .map(Some)
    }

    pub async fn clinic_doctors(
        &self,
        clinic_id: &str,
    ) -> Result<Option<ApiResponse<Vec<DoctorPublicProfile>>>, ClientError> {
        if !has_id(clinic_id) {
            return Ok(None);
        }
        self.read(keys::clinics::doctors(clinic_id), || async move {
            self.client.clinics().doctors(clinic_id).await
        })
        .await
        .map(Some)
    }

    pub async fn search_clinics(
        &self,
        query: &str,
        city: Option<&str>,
    ) -> Result<Option<ApiResponse<Paginated<Clinic>>>, ClientError> {
        if !is_searchable(query) {
            return Ok(None);
        }
        self.read(keys::clinics::search(query, city), || async move {
            self.client.clinics().search(query, city).await
        })
        .await
        .map(Some)
    }

    // Schedules

    pub async fn my_schedules(&self) -> Result<ApiResponse<Vec<Schedule>>, ClientError> {
        self.read(keys::schedules::my_schedules(), || async move {
            self.client.schedules().mine().await
        })
        .await
    }

    pub async fn schedule(&self, id: &str) -> Result<Option<ApiResponse<Schedule>>, ClientError> {
        if !has_id(id) {
            return Ok(None);
        }
        self.read(keys::schedules::detail(id), || async move { self.client.schedules().get(id).await })
            .await
            .map(Some)
    }

    pub async fn create_schedule(
        &self,
        schedule: &CreateSchedule,
    ) -> Result<ApiResponse<Schedule>, ClientError> {
        let result = self.client.schedules().create(schedule).await;
        self.settle(Mutation::CreateSchedule, result)
    }

    pub async fn update_schedule(
        &self,
        id: &str,
        update: &ScheduleUpdate,
    ) -> Result<ApiResponse<Schedule>, ClientError> {
        let result = self.client.schedules().update(id, update).await;
        self.settle(Mutation::UpdateSchedule, result)
    }

    pub async fn delete_schedule(&self, id: &str) -> Result<ApiResponse<Value>, ClientError> {
        let result = self.client.schedules().delete(id).await;
        self.settle(Mutation::DeleteSchedule, result)
    }

    pub async fn add_schedule_exception(
        &self,
        id: &str,
        exception: &NewScheduleException,
    ) -> Result<ApiResponse<Schedule>, ClientError> {
        let result = self.client.schedules().add_exception(id, exception).await;
        self.settle(Mutation::AddScheduleException, result)
    }

    pub async fn remove_schedule_exception(
        &self,
        id: &str,
        date: NaiveDate,
    ) -> Result<ApiResponse<Schedule>, ClientError> {
        let result = self.client.schedules().remove_exception(id, date).await;
        self.settle(Mutation::RemoveScheduleException, result)
    }
}
