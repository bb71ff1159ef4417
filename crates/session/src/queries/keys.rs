//! Cache keys
//!
//! A key is an ordered list of segments rooted at a resource name. Filter
//! structs become one trailing segment holding their JSON form; leaving the
//! filters out yields the prefix used for invalidation.

use chrono::NaiveDate;
use medibook_core::types::{
    AppointmentFilters, ClinicFilters, DoctorSearchFilters, Specialty,
};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn root(resource: &str) -> Self {
        Self(vec![resource.to_string()])
    }

    #[must_use]
    pub fn push(mut self, segment: impl fmt::Display) -> Self {
        self.0.push(segment.to_string());
        self
    }

    /// Append `params` as one segment, or nothing when absent
    #[must_use]
    pub fn with_params<P: Serialize>(self, params: Option<&P>) -> Self {
        match params.and_then(|params| serde_json::to_string(params).ok()) {
            Some(json) => self.push(json),
            None => self,
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Segment-wise prefix check
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

pub mod auth {
    use super::QueryKey;

    pub fn all() -> QueryKey {
        QueryKey::root("auth")
    }

    pub fn current_user() -> QueryKey {
        all().push("current-user")
    }
}

pub mod appointments {
    use super::{AppointmentFilters, NaiveDate, QueryKey};

    pub fn all() -> QueryKey {
        QueryKey::root("appointments")
    }

    pub fn my_appointments(filters: Option<&AppointmentFilters>) -> QueryKey {
        all().push("my-appointments").with_params(filters)
    }

    pub fn doctor_appointments(filters: Option<&AppointmentFilters>) -> QueryKey {
        all().push("doctor-appointments").with_params(filters)
    }

    pub fn detail(id: &str) -> QueryKey {
        all().push("detail").push(id)
    }

    pub fn available_slots(doctor_id: &str, date: NaiveDate) -> QueryKey {
        all()
            .push("available-slots")
            .push(doctor_id)
            .push(date.format("%Y-%m-%d"))
    }

    pub fn stats() -> QueryKey {
        all().push("stats")
    }
}

pub mod doctors {
    use super::{DoctorSearchFilters, QueryKey, Specialty};

    pub fn all() -> QueryKey {
        QueryKey::root("doctors")
    }

    pub fn list(filters: Option<&DoctorSearchFilters>) -> QueryKey {
        all().push("list").with_params(filters)
    }

    pub fn detail(id: &str) -> QueryKey {
        all().push("detail").push(id)
    }

    pub fn my_profile() -> QueryKey {
        all().push("my-profile")
    }

    pub fn my_stats() -> QueryKey {
        all().push("my-stats")
    }

    pub fn top_rated(limit: u32) -> QueryKey {
        all().push("top-rated").push(limit)
    }

    pub fn specialty(specialty: Specialty, filters: Option<&DoctorSearchFilters>) -> QueryKey {
        all().push("specialty").push(specialty).with_params(filters)
    }

    pub fn search(query: &str, filters: Option<&DoctorSearchFilters>) -> QueryKey {
        all().push("search").push(query).with_params(filters)
    }
}

pub mod patients {
    use super::QueryKey;

    pub fn all() -> QueryKey {
        QueryKey::root("patients")
    }

    pub fn my_profile() -> QueryKey {
        all().push("my-profile")
    }

    pub fn medical_summary() -> QueryKey {
        all().push("medical-summary")
    }
}

pub mod clinics {
    use super::{ClinicFilters, QueryKey};

    pub fn all() -> QueryKey {
        QueryKey::root("clinics")
    }

    pub fn list(filters: Option<&ClinicFilters>) -> QueryKey {
        all().push("list").with_params(filters)
    }

    pub fn detail(id: &str) -> QueryKey {
        all().push("detail").push(id)
    }

    pub fn nearby(lat: f64, lng: f64, max_distance: u32) -> QueryKey {
        all().push("nearby").push(lat).push(lng).push(max_distance)
    }

    pub fn doctors(clinic_id: &str) -> QueryKey {
        all().push("doctors").push(clinic_id)
    }

    pub fn search(query: &str, city: Option<&str>) -> QueryKey {
        let key = all().push("search").push(query);
        match city {
            Some(city) => key.push(city),
            None => key,
        }
    }
}

pub mod schedules {
    use super::QueryKey;

    pub fn all() -> QueryKey {
        QueryKey::root("schedules")
    }

    pub fn my_schedules() -> QueryKey {
        all().push("my-schedules")
    }

    pub fn detail(id: &str) -> QueryKey {
        all().push("detail").push(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medibook_core::types::AppointmentStatus;

    #[test]
    fn test_filters_extend_the_invalidation_prefix() {
        let filters = AppointmentFilters {
            status: Some(AppointmentStatus::Pending),
            ..AppointmentFilters::default()
        };
        let key = appointments::my_appointments(Some(&filters));

        assert_eq!(key.segments().len(), 3);
        assert_eq!(key.segments()[2], r#"{"status":"pending"}"#);
        assert!(key.starts_with(&appointments::my_appointments(None)));
        assert!(key.starts_with(&appointments::all()));
        assert!(!key.starts_with(&appointments::doctor_appointments(None)));
    }

    #[test]
    fn test_prefix_is_segment_wise() {
        let profile = doctors::my_profile();
        let stats = doctors::my_stats();
        assert!(!stats.starts_with(&profile));
        assert!(!QueryKey::root("doctors-extra").starts_with(&doctors::all()));
    }

    #[test]
    fn test_display() {
        assert_eq!(auth::current_user().to_string(), "[auth, current-user]");
        assert_eq!(doctors::top_rated(10).to_string(), "[doctors, top-rated, 10]");
    }
}
