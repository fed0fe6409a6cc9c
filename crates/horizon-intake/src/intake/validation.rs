use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use url::Url;

use super::domain::{ApplicationForm, ExperienceEntry, MAX_EXPERIENCE_ENTRIES};

const MIN_AGE_YEARS: i32 = 17;
const MAX_AGE_YEARS: i32 = 100;
const MIN_PHONE_LEN: usize = 12;

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z\s'-]+$").expect("name pattern compiles"))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}

/// Field-level validation outcome; `errors` maps wire field names to
/// human-readable messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn flag(&mut self, field: &str, message: &str) {
        self.errors.insert(field.to_string(), message.to_string());
    }
}

/// Validate a submission against the intake rules. Pure; `today` is passed in
/// so age bounds stay testable.
pub fn validate(form: &ApplicationForm, today: NaiveDate) -> ValidationReport {
    let mut report = ValidationReport::default();

    if form.first_name.trim().is_empty() {
        report.flag("firstName", "First name is required");
    } else if !name_pattern().is_match(&form.first_name) {
        report.flag("firstName", "First name must contain only letters");
    }

    if form.last_name.trim().is_empty() {
        report.flag("lastName", "Last name is required");
    } else if !name_pattern().is_match(&form.last_name) {
        report.flag("lastName", "Last name must contain only letters");
    }

    if !form.first_name.trim().is_empty()
        && !form.last_name.trim().is_empty()
        && form.first_name.to_lowercase() == form.last_name.to_lowercase()
    {
        report.flag("names", "First and last names must be different");
    }

    if form.email.trim().is_empty() {
        report.flag("email", "Email is required");
    } else if !email_pattern().is_match(&form.email) {
        report.flag("email", "Please enter a valid email address");
    }

    if form.dob.trim().is_empty() {
        report.flag("dob", "Date of birth is required");
    } else {
        match NaiveDate::parse_from_str(form.dob.trim(), "%Y-%m-%d") {
            Ok(dob) => check_age(&mut report, dob, today),
            Err(_) => report.flag("dob", "Date of birth must be a valid date"),
        }
    }

    if form.phone.trim().is_empty() {
        report.flag("phone", "Phone number is required");
    } else if form.phone.len() < MIN_PHONE_LEN {
        report.flag("phone", "Invalid phone number");
    }

    if form.availability.is_none() {
        report.flag("availability", "Please select your availability");
    }

    if let Some(raw) = form.linkedin_url.as_deref() {
        if !raw.trim().is_empty() && Url::parse(raw.trim()).is_err() {
            report.flag("linkedinURL", "Please enter a valid URL");
        }
    }

    check_experience(&mut report, &form.experience);

    if !form.preferred_countries().are_distinct() {
        report.flag(
            "preferredCountry",
            "Please choose three different destination countries",
        );
    }

    report
}

fn check_age(report: &mut ValidationReport, dob: NaiveDate, today: NaiveDate) {
    if dob > today {
        report.flag("dob", "Date of birth cannot be in the future");
        return;
    }

    let years = today.year() - dob.year();
    let months = today.month() as i32 - dob.month() as i32;
    let days = today.day() as i32 - dob.day() as i32;
    let before_birthday = months < 0 || (months == 0 && days < 0);

    if years < MIN_AGE_YEARS || (years == MIN_AGE_YEARS && before_birthday) {
        report.flag("dob", "You must be at least 17 years old");
    } else if years > MAX_AGE_YEARS {
        report.flag("dob", "Please enter a valid age (less than 100 years)");
    }
}

fn check_experience(report: &mut ValidationReport, experience: &[String]) {
    if experience.len() > MAX_EXPERIENCE_ENTRIES {
        report.flag("experience", "List at most three experience entries");
        return;
    }

    for raw in experience {
        if ExperienceEntry::parse(raw).is_err() {
            report.flag(
                "experience",
                "Experience entries must be in 'years:description' form",
            );
            return;
        }
    }
}
