//! Wire types exchanged with the booking API

mod appointment;
mod clinic;
mod doctor;
mod enums;
mod envelope;
mod patient;
mod schedule;
mod stats;
mod user;

pub use appointment::{
    Appointment, AppointmentDoctor, AppointmentFilters, AppointmentWithDetails,
    CompleteAppointment, CreateAppointment,
};
pub use clinic::{
    Clinic, ClinicAddress, ClinicFilters, ClinicHours, ClinicWithDoctors, GeoPoint, GeoPointKind,
};
pub use doctor::{
    Certification, ClinicSummary, Doctor, DoctorProfileUpdate, DoctorPublicProfile,
    DoctorSearchFilters, DoctorWithUser, Education, SortOrder,
};
pub use enums::{
    AppointmentStatus, AppointmentType, BloodType, ConsultationMode, DayOfWeek, Degree, Gender,
    PaymentMethod, PaymentStatus, Role, ScheduleStatus, Specialty, WireValue,
};
pub use envelope::{ApiResponse, Paginated, Pagination};
pub use patient::{
    EmergencyContact, MedicalInfoUpdate, MedicalSummary, Patient, PatientProfileUpdate,
    PatientWithUser, PostalAddress, PreferredLanguage,
};
pub use schedule::{
    AvailableSlots, CreateSchedule, NewScheduleException, Schedule, ScheduleException,
    ScheduleUpdate, TimeSlot, WorkingHours,
};
pub use stats::{AppointmentStats, DoctorStats};
pub use user::{
    AuthTokens, ChangePassword, ConsultationFee, LoginCredentials, LoginResponse,
    RefreshResponse, RoleProfile, SignupRequest, User, UserProfileUpdate,
};
