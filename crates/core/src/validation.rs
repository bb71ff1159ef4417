//! Client-side form validation
//!
//! Forms are validated before any request is built; a form only turns into a
//! request DTO once every rule passes, so invalid input never reaches the
//! backend.

use crate::types::{
    BloodType, ConsultationFee, Degree, Gender, LoginCredentials, Role, SignupRequest, Specialty,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

static EGYPTIAN_PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+20|0)?1[0125][0-9]{8}$").expect("phone pattern is valid"));

pub const MIN_NAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_YEARS_OF_EXPERIENCE: u8 = 70;

/// A rule violated by user input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter your {0}")]
    Required(&'static str),

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("Email address is not valid")]
    InvalidEmail,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Years of experience must be between 0 and {MAX_YEARS_OF_EXPERIENCE}")]
    ExperienceOutOfRange,

    #[error("Please choose your {0}")]
    NotSelected(&'static str),

    #[error("Only patient and doctor accounts can sign up")]
    UnsupportedRole,
}

/// Common validation helpers
pub mod validators {
    use super::{EGYPTIAN_PHONE_RE, EMAIL_RE, ValidationError};

    /// Reject empty or whitespace-only values
    pub fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::Required(field));
        }
        Ok(())
    }

    /// Enforce a minimum length counted in characters
    pub fn min_length(value: &str, min: usize, field: &'static str) -> Result<(), ValidationError> {
        if value.chars().count() < min {
            return Err(ValidationError::TooShort { field, min });
        }
        Ok(())
    }

    pub fn validate_email(email: &str) -> Result<(), ValidationError> {
        require(email, "email")?;
        if !EMAIL_RE.is_match(email) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }

    /// Egyptian mobile numbers: `+20` or `0` prefix, then `1[0125]` and 8 digits
    pub fn is_valid_egyptian_phone(phone: &str) -> bool {
        let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
        EGYPTIAN_PHONE_RE.is_match(&compact)
    }
}

/// Raw login form input
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(self) -> Result<LoginCredentials, ValidationError> {
        let email = self.email.trim();
        validators::require(email, "email")?;
        validators::require(&self.password, "password")?;
        validators::validate_email(email)?;
        validators::min_length(&self.password, MIN_PASSWORD_LEN, "Password")?;

        Ok(LoginCredentials {
            email: email.to_string(),
            password: self.password,
        })
    }
}

/// Raw signup form input, collected over two steps
#[derive(Debug, Clone)]
pub struct SignupForm {
    pub role: Role,

    // Step 1: account
    pub full_name: String,
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,

    // Step 2: personal and professional details
    pub phone_number: String,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub blood_type: Option<BloodType>,
    pub specialty: Option<Specialty>,
    pub degree: Option<Degree>,
    pub license_number: String,
    pub years_of_experience: Option<i32>,
    pub fee_in_clinic: Option<f64>,
    pub fee_online: Option<f64>,
}

impl SignupForm {
    /// Blank form for the given role
    pub fn new(role: Role) -> Self {
        Self {
            role,
            full_name: String::new(),
            user_name: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            phone_number: String::new(),
            gender: None,
            date_of_birth: None,
            blood_type: None,
            specialty: None,
            degree: None,
            license_number: String::new(),
            years_of_experience: None,
            fee_in_clinic: None,
            fee_online: None,
        }
    }

    /// Account step: names, email and password
    pub fn validate_account_step(&self) -> Result<(), ValidationError> {
        validators::require(&self.full_name, "full name")?;
        validators::min_length(&self.full_name, MIN_NAME_LEN, "Full name")?;
        validators::require(&self.user_name, "username")?;
        validators::min_length(&self.user_name, MIN_NAME_LEN, "Username")?;
        validators::validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::Required("password"));
        }
        validators::min_length(&self.password, MIN_PASSWORD_LEN, "Password")?;
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }

    /// Details step: contact data plus the doctor's professional fields
    pub fn validate_details_step(&self) -> Result<(), ValidationError> {
        validators::require(&self.phone_number, "phone number")?;
        if self.gender.is_none() {
            return Err(ValidationError::NotSelected("gender"));
        }
        if self.date_of_birth.is_none() {
            return Err(ValidationError::Required("date of birth"));
        }

        match self.role {
            Role::Patient => Ok(()),
            Role::Doctor => {
                if self.specialty.is_none() {
                    return Err(ValidationError::NotSelected("specialty"));
                }
                if self.degree.is_none() {
                    return Err(ValidationError::NotSelected("degree"));
                }
                validators::require(&self.license_number, "license number")?;
                let years = self
                    .years_of_experience
                    .ok_or(ValidationError::Required("years of experience"))?;
                if !(0..=i32::from(MAX_YEARS_OF_EXPERIENCE)).contains(&years) {
                    return Err(ValidationError::ExperienceOutOfRange);
                }
                Ok(())
            }
            Role::Admin => Err(ValidationError::UnsupportedRole),
        }
    }

    /// Run both steps and build the request body
    pub fn validate(self) -> Result<SignupRequest, ValidationError> {
        self.validate_account_step()?;
        self.validate_details_step()?;

        let mut request = SignupRequest {
            full_name: self.full_name,
            user_name: self.user_name,
            email: self.email,
            password: self.password,
            phone_number: Some(self.phone_number),
            role: self.role,
            gender: self.gender,
            date_of_birth: self.date_of_birth,
            blood_type: None,
            specialty: None,
            degree: None,
            license_number: None,
            years_of_experience: None,
            consultation_fee: None,
        };

        match self.role {
            Role::Patient => request.blood_type = self.blood_type,
            Role::Doctor => {
                request.specialty = self.specialty;
                request.degree = self.degree;
                request.license_number = Some(self.license_number);
                request.years_of_experience = self
                    .years_of_experience
                    .and_then(|years| u8::try_from(years).ok());
                let fee = ConsultationFee {
                    in_clinic: self.fee_in_clinic,
                    online: self.fee_online,
                    ..ConsultationFee::default()
                };
                if !fee.is_empty() {
                    request.consultation_fee = Some(fee);
                }
            }
            Role::Admin => return Err(ValidationError::UnsupportedRole),
        }

        Ok(request)
    }
}
