//! CLI commands

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Subcommand};
use medibook_core::types::{
    AppointmentFilters, AppointmentStatus, AppointmentType, BloodType, ChangePassword,
    ClinicFilters, CompleteAppointment, ConsultationMode, CreateAppointment, CreateSchedule,
    DayOfWeek, Degree, DoctorSearchFilters, EmergencyContact, Gender, NewScheduleException, Role,
    Specialty, User, UserProfileUpdate, WorkingHours,
};
use medibook_core::{LoginForm, SignupForm};
use medibook_http::{ClientError, MedibookClient};
use medibook_session::{LOGIN_ROUTE, SessionError, SessionGate, home_for};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::CliConfig;
use crate::navigator::TerminalNavigator;
use crate::render;
use crate::state_dir::StateDir;
use crate::storage::FileTokenStorage;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "MEDIBOOK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create a patient or doctor account
    Signup(Box<SignupArgs>),

    /// Sign out and forget the stored tokens
    Logout,

    /// Show the signed-in account and its menu
    Whoami,

    /// Role dashboard with the current numbers
    Dashboard,

    /// Update the account record
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Browse doctors
    Doctors {
        #[command(subcommand)]
        command: DoctorCommands,
    },

    /// Book and manage appointments
    Appointments {
        #[command(subcommand)]
        command: AppointmentCommands,
    },

    /// Doctor working schedules
    Schedules {
        #[command(subcommand)]
        command: ScheduleCommands,
    },

    /// Browse clinics
    Clinics {
        #[command(subcommand)]
        command: ClinicCommands,
    },

    /// Patient records
    Patient {
        #[command(subcommand)]
        command: PatientCommands,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args)]
pub struct SignupArgs {
    #[arg(long, default_value = "patient")]
    role: Role,
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    user_name: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "MEDIBOOK_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long)]
    confirm_password: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    gender: Option<Gender>,
    /// Date of birth, YYYY-MM-DD
    #[arg(long)]
    date_of_birth: Option<NaiveDate>,
    #[arg(long)]
    blood_type: Option<BloodType>,
    #[arg(long)]
    specialty: Option<Specialty>,
    #[arg(long)]
    degree: Option<Degree>,
    #[arg(long, default_value = "")]
    license_number: String,
    #[arg(long)]
    years_of_experience: Option<i32>,
    #[arg(long)]
    fee_in_clinic: Option<f64>,
    #[arg(long)]
    fee_online: Option<f64>,
}

impl From<SignupArgs> for SignupForm {
    fn from(args: SignupArgs) -> Self {
        Self {
            role: args.role,
            full_name: args.full_name,
            user_name: args.user_name,
            email: args.email,
            password: args.password,
            confirm_password: args.confirm_password,
            phone_number: args.phone,
            gender: args.gender,
            date_of_birth: args.date_of_birth,
            blood_type: args.blood_type,
            specialty: args.specialty,
            degree: args.degree,
            license_number: args.license_number,
            years_of_experience: args.years_of_experience,
            fee_in_clinic: args.fee_in_clinic,
            fee_online: args.fee_online,
        }
    }
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Change name, username or phone
    Update {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        user_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Change the account password
    Password {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
    },
}

#[derive(Args, Default)]
pub struct DoctorFilterArgs {
    #[arg(long)]
    specialty: Option<Specialty>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    min_rating: Option<f64>,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    limit: Option<u32>,
}

impl From<DoctorFilterArgs> for DoctorSearchFilters {
    fn from(args: DoctorFilterArgs) -> Self {
        Self {
            specialty: args.specialty,
            city: args.city,
            min_rating: args.min_rating,
            page: args.page,
            limit: args.limit,
            ..Self::default()
        }
    }
}

#[derive(Subcommand)]
pub enum DoctorCommands {
    List {
        #[command(flatten)]
        filters: DoctorFilterArgs,
    },
    Show {
        id: String,
    },
    Search {
        query: String,
        #[command(flatten)]
        filters: DoctorFilterArgs,
    },
    /// Highest-rated doctors
    Top {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Free slots of a doctor on one day
    Slots {
        id: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
    },
    /// The signed-in doctor's own profile and numbers
    Me,
}

#[derive(Subcommand)]
pub enum AppointmentCommands {
    /// Your appointments; doctors see the ones booked with them
    List {
        #[arg(long)]
        status: Option<AppointmentStatus>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        page: Option<u32>,
    },
    Show {
        id: String,
    },
    Book {
        #[arg(long)]
        doctor: String,
        /// RFC 3339 timestamp, e.g. 2025-03-14T10:30:00Z
        #[arg(long)]
        at: DateTime<Utc>,
        #[arg(long, default_value = "consultation")]
        r#type: AppointmentType,
        #[arg(long, default_value = "in_clinic")]
        mode: ConsultationMode,
        #[arg(long)]
        clinic: Option<String>,
        #[arg(long)]
        complaint: Option<String>,
    },
    Cancel {
        id: String,
        #[arg(long)]
        reason: Option<String>,
    },
    Reschedule {
        id: String,
        #[arg(long)]
        at: DateTime<Utc>,
    },
    Confirm {
        id: String,
    },
    Complete {
        id: String,
        #[arg(long)]
        diagnosis: Option<String>,
        #[arg(long)]
        treatment: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    NoShow {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ScheduleCommands {
    List,
    Show {
        id: String,
    },
    /// Add a weekly working day
    Create {
        /// 0 = Sunday ... 6 = Saturday
        #[arg(long)]
        day: u8,
        /// HH:MM
        #[arg(long)]
        start: String,
        /// HH:MM
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "in_clinic")]
        mode: ConsultationMode,
        #[arg(long, default_value = "30")]
        slot_minutes: u32,
        #[arg(long)]
        clinic: Option<String>,
    },
    Delete {
        id: String,
    },
    /// Mark one day as a holiday
    AddException {
        id: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        reason: String,
    },
    RemoveException {
        id: String,
        #[arg(long)]
        date: NaiveDate,
    },
}

#[derive(Subcommand)]
pub enum ClinicCommands {
    List {
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    Show {
        id: String,
    },
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Metres
        #[arg(long)]
        max_distance: Option<u32>,
    },
    Search {
        query: String,
        #[arg(long)]
        city: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PatientCommands {
    Profile,
    /// Blood type, BMI, allergies
    Summary,
    EmergencyContact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        relationship: String,
        #[arg(long)]
        phone: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write the effective configuration to the config file
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

/// Text for the final error line
pub fn describe(err: &anyhow::Error) -> String {
    if let Some(err) = err.downcast_ref::<SessionError>() {
        return err.user_message();
    }
    if let Some(err) = err.downcast_ref::<ClientError>() {
        return err.user_message();
    }
    format!("{err:#}")
}

impl Commands {
    pub async fn execute(self, config: &CliConfig, state: &StateDir) -> Result<()> {
        if let Self::Config { command } = self {
            return command.execute(config, state);
        }

        state.create_directories()?;
        let client = MedibookClient::builder()
            .base_url(&config.api_url)
            .timeout(config.timeout())
            .token_storage(Arc::new(FileTokenStorage::open(state.tokens_file())))
            .build()?;
        let gate = SessionGate::new(client, Arc::new(TerminalNavigator));
        debug!(api = %config.api_url, "Session ready");

        self.run(&gate).await
    }

    async fn run(self, gate: &SessionGate) -> Result<()> {
        match self {
            Self::Login { email, password } => login(gate, email, password).await,
            Self::Signup(args) => signup(gate, *args).await,
            Self::Logout => logout(gate).await,
            Self::Whoami => whoami(gate).await,
            Self::Dashboard => dashboard(gate).await,
            Self::Profile { command } => command.execute(gate).await,
            Self::Doctors { command } => command.execute(gate).await,
            Self::Appointments { command } => command.execute(gate).await,
            Self::Schedules { command } => command.execute(gate).await,
            Self::Clinics { command } => command.execute(gate).await,
            Self::Patient { command } => command.execute(gate).await,
            Self::Config { .. } => bail!("Configuration commands do not need a session"),
        }
    }
}

/// Restore the session and make sure it may open `route`
async fn require_user(gate: &SessionGate, route: &str) -> Result<User> {
    gate.bootstrap().await;
    if gate.enforce(route) == Some(LOGIN_ROUTE) {
        return Err(SessionError::NotAuthenticated.into());
    }
    Ok(gate.current_user()?)
}

async fn require_role(gate: &SessionGate, role: Role) -> Result<User> {
    let user = require_user(gate, home_for(role)).await?;
    if user.role != role {
        bail!("This command is only available to {role} accounts");
    }
    Ok(user)
}

async fn login(gate: &SessionGate, email: String, password: String) -> Result<()> {
    let user = gate.login(LoginForm { email, password }).await?;
    info!(role = %user.role, "Signed in");
    println!("Welcome back, {}!", user.first_name());
    render::navigation(&user);
    Ok(())
}

async fn signup(gate: &SessionGate, args: SignupArgs) -> Result<()> {
    let response = gate.signup(args.into()).await?;
    println!(
        "{}",
        response
            .message
            .as_deref()
            .unwrap_or("Account created, you can sign in now.")
    );
    Ok(())
}

async fn logout(gate: &SessionGate) -> Result<()> {
    gate.logout().await?;
    println!("Signed out.");
    Ok(())
}

async fn whoami(gate: &SessionGate) -> Result<()> {
    let user = require_user(gate, "/dashboard/profile").await?;
    render::user(&user);
    render::navigation(&user);
    Ok(())
}

async fn dashboard(gate: &SessionGate) -> Result<()> {
    let user = require_user(gate, "/dashboard/profile").await?;
    println!("Hello, {}", user.first_name());

    let queries = gate.queries();
    match user.role {
        Role::Patient => {
            let stats = queries.appointment_stats().await?.into_data()?;
            render::appointment_stats(&stats);
            let upcoming = AppointmentFilters {
                status: Some(AppointmentStatus::Confirmed),
                limit: Some(5),
                ..AppointmentFilters::default()
            };
            let page = queries.my_appointments(&upcoming).await?.into_data()?;
            render::appointment_page(&page);
        }
        Role::Doctor => {
            let stats = queries.doctor_stats().await?.into_data()?;
            render::doctor_stats(&stats);
            let pending = AppointmentFilters {
                status: Some(AppointmentStatus::Pending),
                limit: Some(5),
                ..AppointmentFilters::default()
            };
            let page = queries.doctor_appointments(&pending).await?.into_data()?;
            render::appointment_page(&page);
        }
        Role::Admin => {}
    }
    render::navigation(&user);
    Ok(())
}

impl ProfileCommands {
    async fn execute(self, gate: &SessionGate) -> Result<()> {
        require_user(gate, "/dashboard/profile").await?;
        match self {
            Self::Update {
                full_name,
                user_name,
                phone,
            } => {
                let update = UserProfileUpdate {
                    full_name,
                    user_name,
                    phone_number: phone,
                    ..UserProfileUpdate::default()
                };
                let user = gate.update_profile(&update).await?;
                render::user(&user);
            }
            Self::Password { old, new } => {
                let request = ChangePassword {
                    old_password: old,
                    new_password: new,
                };
                gate.queries().change_password(&request).await?;
                println!("Password changed.");
            }
        }
        Ok(())
    }
}

impl DoctorCommands {
    async fn execute(self, gate: &SessionGate) -> Result<()> {
        let queries = gate.queries();
        match self {
            Self::List { filters } => {
                let page = queries.doctors(&filters.into()).await?.into_data()?;
                render::doctor_page(&page);
            }
            Self::Show { id } => {
                let doctor = queries
                    .doctor(&id)
                    .await?
                    .context("A doctor id is required")?
                    .into_data()?;
                render::doctor_card(&doctor);
            }
            Self::Search { query, filters } => {
                let Some(response) = queries.search_doctors(&query, &filters.into()).await?
                else {
                    bail!("Type at least 2 characters to search");
                };
                render::doctor_page(&response.into_data()?);
            }
            Self::Top { limit } => {
                for doctor in queries.top_rated_doctors(limit).await?.into_data()? {
                    render::doctor_card(&doctor);
                }
            }
            Self::Slots { id, date } => {
                let slots = queries
                    .available_slots(&id, Some(date))
                    .await?
                    .context("A doctor id is required")?
                    .into_data()?;
                render::slots(&slots);
            }
            Self::Me => {
                require_role(gate, Role::Doctor).await?;
                let profile = queries.doctor_profile().await?.into_data()?;
                println!(
                    "{} ({}), {} years",
                    profile.specialty.label(),
                    profile.degree,
                    profile.years_of_experience
                );
                render::doctor_stats(&queries.doctor_stats().await?.into_data()?);
            }
        }
        Ok(())
    }
}

impl AppointmentCommands {
    async fn execute(self, gate: &SessionGate) -> Result<()> {
        let user = require_user(gate, "/dashboard/appointments").await?;
        let queries = gate.queries();
        match self {
            Self::List {
                status,
                from,
                to,
                page,
            } => {
                let filters = AppointmentFilters {
                    status,
                    start_date: from,
                    end_date: to,
                    page,
                    limit: None,
                };
                let response = match user.role {
                    Role::Doctor => queries.doctor_appointments(&filters).await?,
                    Role::Patient | Role::Admin => queries.my_appointments(&filters).await?,
                };
                render::appointment_page(&response.into_data()?);
            }
            Self::Show { id } => {
                let appointment = queries
                    .appointment(&id)
                    .await?
                    .context("An appointment id is required")?
                    .into_data()?;
                render::appointment(&appointment);
            }
            Self::Book {
                doctor,
                at,
                r#type,
                mode,
                clinic,
                complaint,
            } => {
                let request = CreateAppointment {
                    doctor_user_id: doctor,
                    clinic_id: clinic,
                    scheduled_date: at,
                    appointment_type: r#type,
                    consultation_mode: mode,
                    chief_complaint: complaint,
                    symptoms: Vec::new(),
                    patient_notes: None,
                    is_follow_up: None,
                    previous_appointment_id: None,
                };
                let booked = queries.book_appointment(&request).await?.into_data()?;
                println!("Booked.");
                render::appointment(&booked);
            }
            Self::Cancel { id, reason } => {
                queries.cancel_appointment(&id, reason.as_deref()).await?;
                println!("Appointment cancelled.");
            }
            Self::Reschedule { id, at } => {
                queries.reschedule_appointment(&id, at).await?;
                println!("Appointment moved.");
            }
            Self::Confirm { id } => {
                queries.confirm_appointment(&id).await?;
                println!("Appointment confirmed.");
            }
            Self::Complete {
                id,
                diagnosis,
                treatment,
                notes,
            } => {
                let outcome = CompleteAppointment {
                    diagnosis,
                    treatment_plan: treatment,
                    doctor_notes: notes,
                    next_follow_up_date: None,
                };
                queries.complete_appointment(&id, &outcome).await?;
                println!("Appointment completed.");
            }
            Self::NoShow { id } => {
                queries.mark_no_show(&id).await?;
                println!("Marked as no-show.");
            }
        }
        Ok(())
    }
}

impl ScheduleCommands {
    async fn execute(self, gate: &SessionGate) -> Result<()> {
        require_role(gate, Role::Doctor).await?;
        let queries = gate.queries();
        match self {
            Self::List => {
                for schedule in queries.my_schedules().await?.into_data()? {
                    render::schedule(&schedule);
                }
            }
            Self::Show { id } => {
                let schedule = queries
                    .schedule(&id)
                    .await?
                    .context("A schedule id is required")?
                    .into_data()?;
                render::schedule(&schedule);
            }
            Self::Create {
                day,
                start,
                end,
                mode,
                slot_minutes,
                clinic,
            } => {
                let request = CreateSchedule {
                    is_recurring: true,
                    day_of_week: Some(DayOfWeek::try_from(day)?),
                    specific_date: None,
                    working_hours: WorkingHours {
                        start_time: start,
                        end_time: end,
                        break_start_time: None,
                        break_end_time: None,
                    },
                    consultation_mode: mode,
                    slot_duration: slot_minutes,
                    buffer_time: None,
                    clinic_id: clinic,
                    max_patients_per_slot: None,
                };
                let schedule = queries.create_schedule(&request).await?.into_data()?;
                render::schedule(&schedule);
            }
            Self::Delete { id } => {
                queries.delete_schedule(&id).await?;
                println!("Schedule deleted.");
            }
            Self::AddException { id, date, reason } => {
                let exception = NewScheduleException {
                    date,
                    reason,
                    is_available: false,
                    custom_working_hours: None,
                };
                let schedule = queries
                    .add_schedule_exception(&id, &exception)
                    .await?
                    .into_data()?;
                render::schedule(&schedule);
            }
            Self::RemoveException { id, date } => {
                queries.remove_schedule_exception(&id, date).await?;
                println!("Exception removed.");
            }
        }
        Ok(())
    }
}

impl ClinicCommands {
    async fn execute(self, gate: &SessionGate) -> Result<()> {
        let queries = gate.queries();
        match self {
            Self::List { city, page } => {
                let filters = ClinicFilters {
                    city,
                    page,
                    ..ClinicFilters::default()
                };
                let page = queries.clinics(&filters).await?.into_data()?;
                for clinic in &page.data {
                    render::clinic(clinic);
                }
            }
            Self::Show { id } => {
                let details = queries
                    .clinic(&id)
                    .await?
                    .context("A clinic id is required")?
                    .into_data()?;
                render::clinic(&details.clinic);
                for doctor in &details.doctor_profiles {
                    render::doctor_card(doctor);
                }
            }
            Self::Nearby {
                lat,
                lng,
                max_distance,
            } => {
                let Some(response) = queries.nearby_clinics(lat, lng, max_distance).await? else {
                    bail!("Both coordinates are required");
                };
                for clinic in response.into_data()? {
                    render::clinic(&clinic);
                }
            }
            Self::Search { query, city } => {
                let Some(response) = queries.search_clinics(&query, city.as_deref()).await? else {
                    bail!("Type at least 2 characters to search");
                };
                for clinic in &response.into_data()?.data {
                    render::clinic(clinic);
                }
            }
        }
        Ok(())
    }
}

impl PatientCommands {
    async fn execute(self, gate: &SessionGate) -> Result<()> {
        require_role(gate, Role::Patient).await?;
        let queries = gate.queries();
        match self {
            Self::Profile => {
                render::patient(&queries.patient_profile().await?.into_data()?);
            }
            Self::Summary => {
                render::medical_summary(&queries.medical_summary().await?.into_data()?);
            }
            Self::EmergencyContact {
                name,
                relationship,
                phone,
            } => {
                let contact = EmergencyContact {
                    name,
                    relationship,
                    phone_number: phone,
                };
                let patient = queries
                    .update_emergency_contact(&contact)
                    .await?
                    .into_data()?;
                render::patient(&patient);
            }
        }
        Ok(())
    }
}

impl ConfigCommands {
    fn execute(self, config: &CliConfig, state: &StateDir) -> Result<()> {
        match self {
            Self::Init { force } => {
                let path = state.config_file();
                if path.exists() && !force {
                    bail!("{} already exists, pass --force to overwrite", path.display());
                }
                config.save(&path)?;
                println!("Configuration written to {}", path.display());
            }
            Self::Show => {
                print!("{}", toml::to_string_pretty(config)?);
            }
        }
        Ok(())
    }
}
