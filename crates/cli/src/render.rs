//! Terminal output

use crate::navigator::command_for;
use chrono::{DateTime, Local, Utc};
use medibook_core::labels::{
    BmiCategory, calculate_bmi, format_date_ar, format_egyptian_phone, format_price,
    format_relative_ar, format_time, initials, is_today, truncate,
};
use medibook_core::types::{
    AppointmentStats, AppointmentWithDetails, AvailableSlots, Clinic, DoctorPublicProfile,
    DoctorStats, MedicalSummary, Paginated, Patient, Schedule, User,
};
use medibook_session::navigation_for;

const BIO_PREVIEW_CHARS: usize = 80;

fn local_time(at: DateTime<Utc>) -> String {
    let local = at.with_timezone(&Local);
    format!(
        "{} {}",
        format_date_ar(&local),
        format_time(&local.format("%H:%M").to_string())
    )
}

pub fn user(user: &User) {
    println!("[{}] {}", initials(&user.full_name), user.full_name);
    println!("  Username: {}", user.user_name);
    println!("  Email:    {}", user.email);
    if let Some(phone) = &user.phone_number {
        println!("  Phone:    {}", format_egyptian_phone(phone));
    }
    println!("  Role:     {}", user.role);
}

pub fn navigation(user: &User) {
    println!("Menu:");
    for item in navigation_for(user.role) {
        match command_for(item.href) {
            Some(command) => println!("  {:<18} {command}", item.label),
            None => println!("  {:<18} {}", item.label, item.href),
        }
    }
}

pub fn doctor_card(doctor: &DoctorPublicProfile) {
    let rating = doctor
        .rating
        .map_or_else(|| "-".to_string(), |rating| format!("{rating:.1}"));
    println!(
        "{}  {} ({})  rating {}  [{}]",
        doctor.full_name,
        doctor.specialty.label(),
        doctor.degree,
        rating,
        doctor.id
    );
    if let Some(fee) = doctor.consultation_fee.in_clinic {
        println!("  In clinic: {}", format_price(fee));
    }
    if let Some(fee) = doctor.consultation_fee.online {
        println!("  Online:    {}", format_price(fee));
    }
    if let Some(bio) = &doctor.bio {
        println!("  {}", truncate(bio, BIO_PREVIEW_CHARS));
    }
}

pub fn doctor_page(page: &Paginated<DoctorPublicProfile>) {
    for doctor in &page.data {
        doctor_card(doctor);
    }
    pagination(page);
}

pub fn appointment(item: &AppointmentWithDetails) {
    let appointment = &item.appointment;
    let scheduled = appointment.scheduled_date;
    let when = if is_today(scheduled, &Local::now()) {
        "اليوم".to_string()
    } else {
        format_relative_ar(scheduled, Utc::now())
    };
    println!(
        "#{}  {} ({})  {}  {}",
        appointment.appointment_number,
        local_time(scheduled),
        when,
        appointment.status.label(),
        appointment.consultation_mode.label()
    );
    println!(
        "  {}: {}  |  Patient: {}",
        appointment.appointment_type.label(),
        item.doctor.user.full_name,
        item.patient.full_name
    );
    if let Some(clinic) = &item.clinic {
        println!("  Clinic: {}, {}", clinic.name, clinic.address.city);
    }
    println!("  Fee: {}", format_price(appointment.total_fee));
}

pub fn appointment_page(page: &Paginated<AppointmentWithDetails>) {
    if page.data.is_empty() {
        println!("No appointments.");
    }
    for item in &page.data {
        appointment(item);
    }
    pagination(page);
}

fn pagination<T>(page: &Paginated<T>) {
    let meta = &page.pagination;
    println!(
        "Page {}/{} ({} total){}",
        meta.page,
        meta.total_pages.max(1),
        meta.total,
        if meta.has_next_page() { ", more with --page" } else { "" }
    );
}

pub fn appointment_stats(stats: &AppointmentStats) {
    println!(
        "Appointments: {} total, {} upcoming, {} today",
        stats.total, stats.upcoming, stats.today_appointments
    );
    println!(
        "  pending {}  confirmed {}  completed {}  cancelled {}  no-show {}",
        stats.pending, stats.confirmed, stats.completed, stats.cancelled, stats.no_show
    );
}

pub fn doctor_stats(stats: &DoctorStats) {
    println!(
        "Patients: {}  Appointments: {} ({} upcoming)",
        stats.total_patients, stats.total_appointments, stats.upcoming_appointments
    );
    println!(
        "Revenue: {} this month, {} total  Rating: {:.1} ({} reviews)",
        format_price(stats.monthly_revenue),
        format_price(stats.total_revenue),
        stats.average_rating,
        stats.total_reviews
    );
}

pub fn slots(slots: &AvailableSlots) {
    println!(
        "{}: {} of {} slots free",
        slots.date, slots.available_slots, slots.total_slots
    );
    for slot in slots.open_slots() {
        println!("  {}", local_time(slot.start_time));
    }
    if let Some(message) = &slots.message {
        println!("  {message}");
    }
}

pub fn clinic(clinic: &Clinic) {
    println!(
        "{}  {}, {}  {}{}",
        clinic.name,
        clinic.address.street,
        clinic.address.city,
        format_egyptian_phone(&clinic.phone_number),
        clinic
            .id
            .as_deref()
            .map_or_else(String::new, |id| format!("  [{id}]"))
    );
}

pub fn schedule(schedule: &Schedule) {
    let day = schedule
        .day_of_week
        .map_or_else(|| "one-off".to_string(), |day| day.label().to_string());
    let hours = schedule
        .working_hours
        .as_ref()
        .or(schedule.specific_date_working_hours.as_ref())
        .map_or_else(String::new, |hours| {
            format!(
                "{} - {}",
                format_time(&hours.start_time),
                format_time(&hours.end_time)
            )
        });
    println!(
        "{day}  {hours}  {}  {} min slots  {}{}",
        schedule.consultation_mode.label(),
        schedule.slot_duration,
        schedule.status,
        schedule
            .id
            .as_deref()
            .map_or_else(String::new, |id| format!("  [{id}]"))
    );
    for exception in &schedule.exceptions {
        println!(
            "  exception {}: {}",
            exception.date.format("%Y-%m-%d"),
            exception.reason
        );
    }
}

pub fn patient(patient: &Patient) {
    if let Some(blood_type) = &patient.blood_type {
        println!("Blood type: {blood_type}");
    }
    if let Some(contact) = &patient.emergency_contact {
        println!(
            "Emergency contact: {} ({}) {}",
            contact.name,
            contact.relationship,
            format_egyptian_phone(&contact.phone_number)
        );
    }
    if let Some(provider) = &patient.insurance_provider {
        println!("Insurance: {provider}");
    }
}

pub fn medical_summary(summary: &MedicalSummary) {
    if let Some(blood_type) = &summary.blood_type {
        println!("Blood type: {blood_type}");
    }
    let bmi = summary.bmi.or_else(|| {
        summary
            .height
            .zip(summary.weight)
            .map(|(height, weight)| calculate_bmi(height, weight))
    });
    if let Some(bmi) = bmi {
        println!("BMI: {bmi:.2} ({})", BmiCategory::from_bmi(bmi).label());
    }
    if !summary.allergies.is_empty() {
        println!("Allergies: {}", summary.allergies.join(", "));
    }
    if !summary.chronic_diseases.is_empty() {
        println!("Chronic diseases: {}", summary.chronic_diseases.join(", "));
    }
}
