//! Display labels and formatting for the Arabic interface

use crate::types::{
    AppointmentStatus, AppointmentType, ConsultationMode, DayOfWeek, Specialty, WireValue,
};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use std::str::FromStr;

pub const DEFAULT_STATUS_COLOR: &str = "bg-gray-100 text-gray-800";

impl Specialty {
    pub const fn label(self) -> &'static str {
        match self {
            Self::GeneralPractice => "طب عام",
            Self::InternalMedicine => "باطنة",
            Self::FamilyMedicine => "طب الأسرة",
            Self::GeneralSurgery => "جراحة عامة",
            Self::CardiacSurgery => "جراحة القلب",
            Self::Neurosurgery => "جراحة المخ والأعصاب",
            Self::OrthopedicSurgery => "جراحة العظام",
            Self::PlasticSurgery => "جراحة تجميل",
            Self::Gynecology => "نساء وتوليد",
            Self::Obstetrics => "توليد",
            Self::Pediatrics => "أطفال",
            Self::Neonatology => "حديثي الولادة",
            Self::Radiology => "أشعة",
            Self::Pathology => "باثولوجيا",
            Self::LaboratoryMedicine => "طب المختبرات",
            Self::Cardiology => "قلب",
            Self::Dermatology => "جلدية",
            Self::Neurology => "مخ وأعصاب",
            Self::Psychiatry => "طب نفسي",
            Self::Ophthalmology => "عيون",
            Self::Ent => "أنف وأذن وحنجرة",
            Self::Urology => "مسالك بولية",
            Self::Gastroenterology => "جهاز هضمي",
            Self::Pulmonology => "صدر وجهاز تنفسي",
            Self::Nephrology => "كلى",
            Self::Endocrinology => "غدد صماء",
            Self::Rheumatology => "روماتيزم",
            Self::Oncology => "أورام",
            Self::Dentistry => "أسنان",
            Self::PhysicalTherapy => "علاج طبيعي",
        }
    }
}

impl AppointmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "قيد الانتظار",
            Self::Confirmed => "مؤكد",
            Self::Cancelled => "ملغى",
            Self::Completed => "مكتمل",
            Self::NoShow => "لم يحضر",
            Self::Rescheduled => "تم إعادة الجدولة",
        }
    }

    /// Badge classes used by status chips
    pub const fn color(self) -> &'static str {
        match self {
            Self::Pending => "bg-yellow-100 text-yellow-800",
            Self::Confirmed => "bg-blue-100 text-blue-800",
            Self::Cancelled => "bg-red-100 text-red-800",
            Self::Completed => "bg-green-100 text-green-800",
            Self::NoShow => DEFAULT_STATUS_COLOR,
            Self::Rescheduled => "bg-purple-100 text-purple-800",
        }
    }
}

impl ConsultationMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::InClinic => "في العيادة",
            Self::Online => "أونلاين",
            Self::HomeVisit => "زيارة منزلية",
        }
    }
}

impl AppointmentType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Checkup => "كشف عادي",
            Self::FollowUp => "متابعة",
            Self::Consultation => "استشارة",
            Self::Emergency => "طارئ",
            Self::Surgery => "عملية",
            Self::Vaccination => "تطعيم",
            Self::LabTest => "تحليل",
            Self::Imaging => "أشعة",
        }
    }
}

impl DayOfWeek {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sunday => "الأحد",
            Self::Monday => "الإثنين",
            Self::Tuesday => "الثلاثاء",
            Self::Wednesday => "الأربعاء",
            Self::Thursday => "الخميس",
            Self::Friday => "الجمعة",
            Self::Saturday => "السبت",
        }
    }
}

macro_rules! wire_labels {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl WireValue<$ty> {
                /// Label of a known value, the raw wire value otherwise
                pub fn label(&self) -> &str {
                    match self {
                        Self::Known(value) => value.label(),
                        Self::Other(raw) => raw,
                    }
                }
            }
        )+
    };
}

wire_labels!(Specialty, AppointmentStatus, ConsultationMode, AppointmentType);

fn label_or_raw<T: FromStr>(raw: &str, label: impl Fn(T) -> &'static str) -> String {
    raw.parse::<T>()
        .map_or_else(|_| raw.to_string(), |value| label(value).to_string())
}

/// Label for a raw specialty wire value; unknown values come back unchanged
pub fn specialty_label(raw: &str) -> String {
    label_or_raw(raw, Specialty::label)
}

pub fn appointment_status_label(raw: &str) -> String {
    label_or_raw(raw, AppointmentStatus::label)
}

pub fn appointment_status_color(raw: &str) -> &'static str {
    raw.parse::<AppointmentStatus>()
        .map_or(DEFAULT_STATUS_COLOR, AppointmentStatus::color)
}

pub fn consultation_mode_label(raw: &str) -> String {
    label_or_raw(raw, ConsultationMode::label)
}

pub fn appointment_type_label(raw: &str) -> String {
    label_or_raw(raw, AppointmentType::label)
}

/// Day label by index, empty for anything outside 0..=6
pub fn day_label(index: u8) -> &'static str {
    DayOfWeek::try_from(index).map_or("", DayOfWeek::label)
}

/// `"14:30"` becomes `"2:30 م"`; input that is not `HH:MM` is returned as-is
pub fn format_time(time: &str) -> String {
    let Some((hours, minutes)) = time.split_once(':') else {
        return time.to_string();
    };
    let Ok(hour) = hours.trim().parse::<u32>() else {
        return time.to_string();
    };

    let period = if hour >= 12 { "م" } else { "ص" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour12}:{minutes} {period}")
}

const MONTHS_AR: [&str; 12] = [
    "يناير",
    "فبراير",
    "مارس",
    "أبريل",
    "مايو",
    "يونيو",
    "يوليو",
    "أغسطس",
    "سبتمبر",
    "أكتوبر",
    "نوفمبر",
    "ديسمبر",
];

const MINUTES_PER_HOUR: u64 = 60;
const MINUTES_PER_DAY: u64 = 24 * MINUTES_PER_HOUR;

/// Arabic forms of a time unit for one, two, three to ten, and eleven or more
struct UnitForms {
    one: &'static str,
    two: &'static str,
    few: &'static str,
    many: &'static str,
}

const MINUTE: UnitForms = UnitForms {
    one: "دقيقة واحدة",
    two: "دقيقتان",
    few: "دقائق",
    many: "دقيقة",
};
const HOUR: UnitForms = UnitForms {
    one: "ساعة واحدة",
    two: "ساعتان",
    few: "ساعات",
    many: "ساعة",
};
const DAY: UnitForms = UnitForms {
    one: "يوم واحد",
    two: "يومان",
    few: "أيام",
    many: "يوم",
};
const MONTH: UnitForms = UnitForms {
    one: "شهر واحد",
    two: "شهران",
    few: "أشهر",
    many: "شهر",
};
const YEAR: UnitForms = UnitForms {
    one: "سنة واحدة",
    two: "سنتان",
    few: "سنوات",
    many: "سنة",
};

impl UnitForms {
    fn count(&self, count: u64) -> String {
        match count {
            1 => self.one.to_string(),
            2 => self.two.to_string(),
            3..=10 => format!("{count} {}", self.few),
            _ => format!("{count} {}", self.many),
        }
    }
}

/// Long date with the Arabic month name, e.g. `15 يناير 2024`
pub fn format_date_ar(date: &impl Datelike) -> String {
    let month = MONTHS_AR[date.month0() as usize];
    format!("{} {month} {}", date.day(), date.year())
}

/// Distance between `at` and `now` in Arabic words, prefixed with `منذ`
/// for the past and `في خلال` for the future
pub fn format_relative_ar(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = at.signed_duration_since(now).num_minutes().unsigned_abs();
    let days = (minutes + MINUTES_PER_DAY / 2) / MINUTES_PER_DAY;

    let distance = if minutes < 1 {
        "أقل من دقيقة".to_string()
    } else if minutes < 45 {
        MINUTE.count(minutes)
    } else if minutes < MINUTES_PER_DAY {
        HOUR.count((minutes + MINUTES_PER_HOUR / 2) / MINUTES_PER_HOUR)
    } else if days < 30 {
        DAY.count(days.max(1))
    } else if days < 365 {
        MONTH.count((days + 15) / 30)
    } else {
        YEAR.count(days / 365)
    };

    if at > now {
        format!("في خلال {distance}")
    } else {
        format!("منذ {distance}")
    }
}

/// Whether `at` falls on the same calendar day as `now`, in `now`'s time zone
pub fn is_today<Tz: TimeZone>(at: DateTime<Utc>, now: &DateTime<Tz>) -> bool {
    at.with_timezone(&now.timezone()).date_naive() == now.date_naive()
}

pub fn is_past(at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    at < now
}

pub fn is_future(at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    at > now
}

/// Body mass index from height in centimetres and weight in kilograms,
/// rounded to two decimals
pub fn calculate_bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let meters = height_cm / 100.0;
    let bmi = weight_kg / (meters * meters);
    (bmi * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Underweight => "نحيف",
            Self::Normal => "طبيعي",
            Self::Overweight => "زيادة وزن",
            Self::Obese => "سمنة",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::Underweight => "text-blue-600",
            Self::Normal => "text-green-600",
            Self::Overweight => "text-yellow-600",
            Self::Obese => "text-red-600",
        }
    }
}

/// Group an Egyptian number as `+20 10x xxx xxxx` or `010x xxx xxxx`
pub fn format_egyptian_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    // Digits are ASCII, so byte slicing is safe from here on.
    let part = |from: usize, to: usize| digits.get(from..to.min(digits.len())).unwrap_or("");

    if digits.starts_with("20") {
        format!(
            "+{} {} {} {}",
            part(0, 2),
            part(2, 5),
            part(5, 8),
            part(8, digits.len())
        )
    } else if digits.starts_with('0') {
        format!("{} {} {}", part(0, 4), part(4, 7), part(7, digits.len()))
    } else {
        phone.to_string()
    }
}

/// Cut `text` to `max_chars` characters and append `...` when it was longer
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Up to two uppercase initials from a display name
pub fn initials(name: &str) -> String {
    name.split(' ')
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Whole-pound price in Egyptian pounds with thousands grouping
pub fn format_price(amount: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0 { "-" } else { "" };
    format!("{sign}{grouped} ج.م")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, NaiveDate};

    #[test]
    fn test_labels_fall_back_to_raw_values() {
        assert_eq!(specialty_label("cardiology"), "قلب");
        assert_eq!(specialty_label("veterinary"), "veterinary");

        let known = WireValue::Known(Specialty::Cardiology);
        assert_eq!(known.label(), "قلب");
        let unknown: WireValue<Specialty> = WireValue::Other("veterinary".into());
        assert_eq!(unknown.label(), "veterinary");
        assert_eq!(appointment_status_label("no_show"), "لم يحضر");
        assert_eq!(consultation_mode_label("online"), "أونلاين");
        assert_eq!(appointment_type_label("lab_test"), "تحليل");
        assert_eq!(appointment_type_label("massage"), "massage");
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(
            appointment_status_color("confirmed"),
            "bg-blue-100 text-blue-800"
        );
        assert_eq!(appointment_status_color("archived"), DEFAULT_STATUS_COLOR);
    }

    #[test]
    fn test_day_labels() {
        assert_eq!(day_label(0), "الأحد");
        assert_eq!(day_label(6), "السبت");
        assert_eq!(day_label(7), "");
    }

    #[test]
    fn test_format_time_uses_twelve_hour_clock() {
        assert_eq!(format_time("00:15"), "12:15 ص");
        assert_eq!(format_time("09:00"), "9:00 ص");
        assert_eq!(format_time("12:00"), "12:00 م");
        assert_eq!(format_time("18:45"), "6:45 م");
        assert_eq!(format_time("noon"), "noon");
    }

    #[test]
    fn test_bmi_and_category() {
        let bmi = calculate_bmi(175.0, 70.0);
        assert!((bmi - 22.86).abs() < f64::EPSILON);
        assert_eq!(BmiCategory::from_bmi(bmi), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(18.4).label(), "نحيف");
        assert_eq!(BmiCategory::from_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(30.0).label(), "سمنة");
    }

    #[test]
    fn test_egyptian_phone_formatting() {
        assert_eq!(format_egyptian_phone("01012345678"), "0101 234 5678");
        assert_eq!(format_egyptian_phone("+201012345678"), "+20 101 234 5678");
        assert_eq!(format_egyptian_phone("12345"), "12345");
    }

    #[test]
    fn test_truncate_and_initials() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 4), "abcd...");
        assert_eq!(truncate("مرحبا بكم", 5), "مرحبا...");
        assert_eq!(initials("mona adel hassan"), "MA");
        assert_eq!(initials("omar"), "O");
    }

    #[test]
    fn test_price_grouping() {
        assert_eq!(format_price(350.0), "350 ج.م");
        assert_eq!(format_price(12500.4), "12,500 ج.م");
        assert_eq!(format_price(1_000_000.0), "1,000,000 ج.م");
    }

    #[test]
    fn test_arabic_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(format_date_ar(&date), "15 يناير 2024");

        let at = Utc.with_ymd_and_hms(2024, 12, 3, 23, 30, 0).unwrap();
        assert_eq!(format_date_ar(&at), "3 ديسمبر 2024");
    }

    #[test]
    fn test_relative_time_in_arabic() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        assert_eq!(
            format_relative_ar(now + Duration::seconds(20), now),
            "في خلال أقل من دقيقة"
        );
        assert_eq!(
            format_relative_ar(now - Duration::minutes(5), now),
            "منذ 5 دقائق"
        );
        assert_eq!(
            format_relative_ar(now + Duration::minutes(90), now),
            "في خلال ساعتان"
        );
        assert_eq!(
            format_relative_ar(now - Duration::hours(1), now),
            "منذ ساعة واحدة"
        );
        assert_eq!(
            format_relative_ar(now + Duration::days(3), now),
            "في خلال 3 أيام"
        );
        assert_eq!(
            format_relative_ar(now - Duration::days(12), now),
            "منذ 12 يوم"
        );
        assert_eq!(
            format_relative_ar(now + Duration::days(60), now),
            "في خلال شهران"
        );
        assert_eq!(
            format_relative_ar(now - Duration::days(800), now),
            "منذ سنتان"
        );
    }

    #[test]
    fn test_today_past_and_future() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let earlier = now - Duration::hours(3);
        let later = now + Duration::hours(3);

        assert!(is_today(earlier, &now));
        assert!(is_past(earlier, now));
        assert!(!is_future(earlier, now));
        assert!(is_future(later, now));
        assert!(!is_past(now, now));
        assert!(!is_today(now - Duration::days(1), &now));

        // 23:00 UTC is already the next day in Cairo
        let cairo = FixedOffset::east_opt(2 * 3600).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 23, 0, 0).unwrap();
        let cairo_morning = cairo.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap();
        assert!(is_today(late, &cairo_morning));
        assert!(!is_today(late, &now.with_timezone(&cairo)));
    }
}
