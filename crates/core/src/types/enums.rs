//! Closed enumerations shared with the backend
//!
//! Every enum serializes to the exact wire value the API uses and parses back
//! from it, so CLI arguments and JSON payloads share one vocabulary.

use crate::CoreError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire representation
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(CoreError::unknown_variant(stringify!($name), other)),
                }
            }
        }
    };
}

wire_enum! {
    /// Account role, drives navigation and redirects
    Role {
        Patient => "patient",
        Doctor => "doctor",
        Admin => "admin",
    }
}

wire_enum! {
    Gender {
        Male => "male",
        Female => "female",
    }
}

wire_enum! {
    BloodType {
        APositive => "A+",
        ANegative => "A-",
        BPositive => "B+",
        BNegative => "B-",
        AbPositive => "AB+",
        AbNegative => "AB-",
        OPositive => "O+",
        ONegative => "O-",
    }
}

wire_enum! {
    /// Medical specialty of a doctor
    Specialty {
        GeneralPractice => "general_practice",
        InternalMedicine => "internal_medicine",
        FamilyMedicine => "family_medicine",
        GeneralSurgery => "general_surgery",
        CardiacSurgery => "cardiac_surgery",
        Neurosurgery => "neurosurgery",
        OrthopedicSurgery => "orthopedic_surgery",
        PlasticSurgery => "plastic_surgery",
        Gynecology => "gynecology",
        Obstetrics => "obstetrics",
        Pediatrics => "pediatrics",
        Neonatology => "neonatology",
        Radiology => "radiology",
        Pathology => "pathology",
        LaboratoryMedicine => "laboratory_medicine",
        Cardiology => "cardiology",
        Dermatology => "dermatology",
        Neurology => "neurology",
        Psychiatry => "psychiatry",
        Ophthalmology => "ophthalmology",
        Ent => "ent",
        Urology => "urology",
        Gastroenterology => "gastroenterology",
        Pulmonology => "pulmonology",
        Nephrology => "nephrology",
        Endocrinology => "endocrinology",
        Rheumatology => "rheumatology",
        Oncology => "oncology",
        Dentistry => "dentistry",
        PhysicalTherapy => "physical_therapy",
    }
}

wire_enum! {
    Degree {
        Md => "MD",
        Mbbs => "MBBS",
        Phd => "PhD",
        Mbbch => "MBBCh",
        Msc => "MSc",
        Fellowship => "Fellowship",
        Diploma => "Diploma",
    }
}

wire_enum! {
    AppointmentStatus {
        Pending => "pending",
        Confirmed => "confirmed",
        Cancelled => "cancelled",
        Completed => "completed",
        NoShow => "no_show",
        Rescheduled => "rescheduled",
    }
}

wire_enum! {
    AppointmentType {
        Checkup => "checkup",
        FollowUp => "follow_up",
        Consultation => "consultation",
        Emergency => "emergency",
        Surgery => "surgery",
        Vaccination => "vaccination",
        LabTest => "lab_test",
        Imaging => "imaging",
    }
}

wire_enum! {
    ConsultationMode {
        InClinic => "in_clinic",
        Online => "online",
        HomeVisit => "home_visit",
    }
}

wire_enum! {
    ScheduleStatus {
        Active => "active",
        Inactive => "inactive",
        Holiday => "holiday",
    }
}

wire_enum! {
    PaymentStatus {
        Pending => "pending",
        Completed => "completed",
        Failed => "failed",
        Refunded => "refunded",
        Cancelled => "cancelled",
    }
}

wire_enum! {
    PaymentMethod {
        Cash => "cash",
        CreditCard => "credit_card",
        DebitCard => "debit_card",
        Insurance => "insurance",
        MobileWallet => "mobile_wallet",
    }
}

/// Enum field of a backend record
///
/// Records decode leniently: a value this client does not know yet is kept
/// verbatim in `Other` instead of failing the whole response. Requests and
/// CLI arguments use the closed enum directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WireValue<T> {
    Known(T),
    Other(String),
}

impl<T: Copy> WireValue<T> {
    pub const fn known(&self) -> Option<T> {
        match self {
            Self::Known(value) => Some(*value),
            Self::Other(_) => None,
        }
    }
}

impl<T> From<T> for WireValue<T> {
    fn from(value: T) -> Self {
        Self::Known(value)
    }
}

impl<T: fmt::Display> fmt::Display for WireValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(value) => value.fmt(f),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

impl<T: Serialize> Serialize for WireValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Known(value) => value.serialize(serializer),
            Self::Other(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de, T: FromStr> Deserialize<'de> for WireValue<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.parse::<T>() {
            Ok(value) => Self::Known(value),
            Err(_) => Self::Other(raw),
        })
    }
}

/// Day of week, numbered from Sunday = 0 on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// Zero-based index, Sunday first
    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Sunday => "sunday",
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
        }
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| CoreError::unknown_variant("DayOfWeek", value.to_string()))
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.index()
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DayOfWeek {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<u8>() {
            return Self::try_from(index);
        }
        let lowered = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|day| day.name() == lowered)
            .ok_or_else(|| CoreError::unknown_variant("DayOfWeek", s))
    }
}
