use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for stored applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier for a file held by the resume bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub String);

/// Identifier for an admin-managed interest field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterestFieldId(pub String);

/// CEFR language proficiency tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum CefrLevel {
    #[default]
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    pub const fn label(self) -> &'static str {
        match self {
            CefrLevel::A1 => "A1",
            CefrLevel::A2 => "A2",
            CefrLevel::B1 => "B1",
            CefrLevel::B2 => "B2",
            CefrLevel::C1 => "C1",
            CefrLevel::C2 => "C2",
        }
    }
}

/// Highest diploma obtained, using the labels the public form offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Diploma {
    #[default]
    #[serde(rename = "CAP/BEP")]
    CapBep,
    #[serde(rename = "Bac")]
    Bac,
    #[serde(rename = "Bac+2")]
    BacPlus2,
    #[serde(rename = "Bac+3/4")]
    LicenceBachelor,
    #[serde(rename = "Bac+5")]
    MasterIngenieur,
    #[serde(rename = "Doctorat")]
    Doctorat,
}

/// Availability buckets offered on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    #[serde(rename = "0-1 months")]
    WithinOneMonth,
    #[serde(rename = "1-3 months")]
    OneToThreeMonths,
    #[serde(rename = "3-6 months")]
    ThreeToSixMonths,
    #[serde(rename = "6+ months")]
    BeyondSixMonths,
}

impl Availability {
    pub const fn label(self) -> &'static str {
        match self {
            Availability::WithinOneMonth => "0-1 months",
            Availability::OneToThreeMonths => "1-3 months",
            Availability::ThreeToSixMonths => "3-6 months",
            Availability::BeyondSixMonths => "6+ months",
        }
    }
}

/// Parse failures for the encoded domain strings.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomainParseError {
    #[error("experience entry '{0}' is not in 'years:description' form")]
    MalformedExperience(String),
    #[error("experience years '{0}' must be 0-10 or '10+'")]
    InvalidExperienceYears(String),
    #[error("preferred countries must encode three ':'-separated names, got '{0}'")]
    MalformedCountries(String),
}

/// Years component of an experience entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceYears {
    Exact(u8),
    TenPlus,
}

impl ExperienceYears {
    pub fn parse(raw: &str) -> Result<Self, DomainParseError> {
        let raw = raw.trim();
        if raw == "10+" {
            return Ok(Self::TenPlus);
        }
        raw.parse::<u8>()
            .ok()
            .filter(|years| *years <= 10)
            .map(Self::Exact)
            .ok_or_else(|| DomainParseError::InvalidExperienceYears(raw.to_string()))
    }

    pub fn label(self) -> String {
        match self {
            ExperienceYears::Exact(years) => years.to_string(),
            ExperienceYears::TenPlus => "10+".to_string(),
        }
    }
}

/// One line of the experience list, stored as `"years:description"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperienceEntry {
    pub years: ExperienceYears,
    pub description: String,
}

/// Applications carry at most this many experience entries.
pub const MAX_EXPERIENCE_ENTRIES: usize = 3;

impl ExperienceEntry {
    pub fn parse(raw: &str) -> Result<Self, DomainParseError> {
        let (years, description) = raw
            .split_once(':')
            .ok_or_else(|| DomainParseError::MalformedExperience(raw.to_string()))?;
        Ok(Self {
            years: ExperienceYears::parse(years)?,
            description: description.trim().to_string(),
        })
    }

    pub fn encode(&self) -> String {
        format!("{}:{}", self.years.label(), self.description)
    }
}

/// The three destination countries in rank order, stored as `"a:b:c"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferredCountries {
    pub first: String,
    pub second: String,
    pub third: String,
}

impl PreferredCountries {
    pub fn new(first: &str, second: &str, third: &str) -> Self {
        Self {
            first: first.trim().to_string(),
            second: second.trim().to_string(),
            third: third.trim().to_string(),
        }
    }

    /// All three present and pairwise distinct, ignoring case.
    pub fn are_distinct(&self) -> bool {
        let a = self.first.to_lowercase();
        let b = self.second.to_lowercase();
        let c = self.third.to_lowercase();
        !a.is_empty() && !b.is_empty() && !c.is_empty() && a != b && a != c && b != c
    }

    pub fn encode(&self) -> String {
        format!("{}:{}:{}", self.first, self.second, self.third)
    }

    pub fn parse(raw: &str) -> Result<Self, DomainParseError> {
        let mut parts = raw.split(':');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(first), Some(second), Some(third), None) => {
                Ok(Self::new(first, second, third))
            }
            _ => Err(DomainParseError::MalformedCountries(raw.to_string())),
        }
    }
}

/// Resume payload carried inside the submission body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeUpload {
    pub file_name: String,
    pub mime_type: String,
    /// Base64-encoded file content.
    pub data: String,
}

/// Flat submission record as posted by the public form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    /// Raw `YYYY-MM-DD` date of birth; validation parses it.
    #[serde(default)]
    pub dob: String,
    /// `"years:description"` strings, newest first.
    #[serde(default)]
    pub experience: Vec<String>,
    #[serde(default)]
    pub diploma: Diploma,
    #[serde(default)]
    pub french_level: CefrLevel,
    #[serde(default)]
    pub english_level: CefrLevel,
    #[serde(default)]
    pub target_job: String,
    #[serde(default)]
    pub availability: Option<Availability>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub preferred_country1: String,
    #[serde(default)]
    pub preferred_country2: String,
    #[serde(default)]
    pub preferred_country3: String,
    #[serde(default, rename = "linkedinURL")]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub challenge_id: String,
    #[serde(default)]
    pub captcha_answer: String,
    #[serde(default)]
    pub resume: Option<ResumeUpload>,
}

impl ApplicationForm {
    pub fn preferred_countries(&self) -> PreferredCountries {
        PreferredCountries::new(
            &self.preferred_country1,
            &self.preferred_country2,
            &self.preferred_country3,
        )
    }
}

/// Persisted application document.
///
/// Created once by a public submission, read and deleted by the admin panel,
/// never updated by the applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birthday: NaiveDate,
    pub experience: Vec<String>,
    pub diploma: Diploma,
    pub french_level: CefrLevel,
    pub english_level: CefrLevel,
    pub target_job: String,
    pub availability: Availability,
    pub phone: String,
    pub preferred_country: String,
    #[serde(rename = "linkedinURL")]
    pub linkedin_url: Option<String>,
    #[serde(rename = "resumeURL")]
    pub resume_file: Option<FileId>,
    pub created_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn applicant_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Admin-managed job category offered as a target-job option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestField {
    pub id: InterestFieldId,
    pub field: String,
    pub visible: bool,
}
