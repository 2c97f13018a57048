//! Domain models for the Produtivo backend.
//!
//! These structs mirror the rows served by the hosted database's REST
//! layer. Read DTOs are lenient (the roadmap must keep working when a row
//! carries a malformed date); write DTOs validate before they are sent.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Longest accepted product name / feature title
pub const MAX_TITLE_LEN: usize = 120;

// ============================================
// Feature status
// ============================================

/// Workflow status of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum FeatureStatus {
    #[default]
    Backlog,
    Doing,
    Done,
    Blocked,
}

impl FeatureStatus {
    pub fn all() -> &'static [FeatureStatus] {
        &[
            FeatureStatus::Backlog,
            FeatureStatus::Doing,
            FeatureStatus::Done,
            FeatureStatus::Blocked,
        ]
    }

    /// Cycle to the next status (backlog → doing → done → blocked → backlog)
    pub fn next(&self) -> Self {
        match self {
            FeatureStatus::Backlog => FeatureStatus::Doing,
            FeatureStatus::Doing => FeatureStatus::Done,
            FeatureStatus::Done => FeatureStatus::Blocked,
            FeatureStatus::Blocked => FeatureStatus::Backlog,
        }
    }

    /// Wire value stored in the `status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureStatus::Backlog => "backlog",
            FeatureStatus::Doing => "doing",
            FeatureStatus::Done => "done",
            FeatureStatus::Blocked => "blocked",
        }
    }
}

impl From<&str> for FeatureStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "doing" | "in_progress" | "in-progress" | "em_andamento" => FeatureStatus::Doing,
            "done" | "completed" | "concluido" | "concluída" | "concluida" => FeatureStatus::Done,
            "blocked" | "bloqueado" | "bloqueada" => FeatureStatus::Blocked,
            _ => FeatureStatus::Backlog,
        }
    }
}

impl From<String> for FeatureStatus {
    fn from(value: String) -> Self {
        FeatureStatus::from(value.as_str())
    }
}

impl From<FeatureStatus> for String {
    fn from(status: FeatureStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FeatureStatus::Backlog => "Backlog",
            FeatureStatus::Doing => "Doing",
            FeatureStatus::Done => "Done",
            FeatureStatus::Blocked => "Blocked",
        };
        f.pad(label)
    }
}

// ============================================
// Dates
// ============================================

/// Parse a calendar date from `YYYY-MM-DD` or an RFC 3339 / ISO timestamp.
///
/// Returns `None` for empty or malformed input.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Serde adapter for optional dates that never fails on bad input
mod lenient_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .and_then(|value| value.as_str())
            .and_then(super::parse_date))
    }

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_some(&d.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }
}

// ============================================
// Product DTOs
// ============================================

/// Product row (read)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDto {
    pub id: Uuid,
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProductDto {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed Product")
    }
}

/// Create product DTO (write)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CreateProductDto {
    pub name: String,
    pub description: Option<String>,
}

impl CreateProductDto {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title("Name", &self.name)
    }
}

/// Update product DTO (write)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UpdateProductDto {
    pub name: String,
    pub description: Option<String>,
}

impl UpdateProductDto {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title("Name", &self.name)
    }
}

// ============================================
// Feature DTOs
// ============================================

/// Feature row (read)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureDto {
    pub id: Uuid,
    pub product_id: Uuid,
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: FeatureStatus,
    #[serde(default, with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub progress: Option<i32>,
}

impl FeatureDto {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled Feature")
    }

    /// Start and end dates, when both are present and in order
    pub fn schedule(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end >= start => Some((start, end)),
            _ => None,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.schedule().is_some()
    }

    /// Progress clamped to 0..=100
    pub fn progress_pct(&self) -> Option<u8> {
        self.progress.map(|p| p.clamp(0, 100) as u8)
    }

    /// Past its end date and not done
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != FeatureStatus::Done && self.end_date.is_some_and(|end| end < today)
    }
}

/// Create feature DTO (write)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateFeatureDto {
    pub product_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: FeatureStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub progress: Option<i32>,
}

/// Update feature DTO (write). Absent dates are sent as `null` so an edit
/// can unschedule a feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateFeatureDto {
    pub title: String,
    pub description: Option<String>,
    pub status: FeatureStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub progress: Option<i32>,
}

impl UpdateFeatureDto {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_feature_fields(&self.title, self.start_date, self.end_date, self.progress)
    }
}

/// Body of a status-only PATCH
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureStatusPatch {
    pub status: FeatureStatus,
}

pub(crate) fn validate_title(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_TITLE_LEN,
        });
    }
    Ok(())
}

pub(crate) fn validate_schedule(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            Err(ValidationError::EndBeforeStart { start, end })
        }
        (Some(_), None) | (None, Some(_)) => Err(ValidationError::PartialSchedule),
        _ => Ok(()),
    }
}

fn validate_feature_fields(
    title: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    progress: Option<i32>,
) -> Result<(), ValidationError> {
    validate_title("Title", title)?;
    validate_schedule(start, end)?;
    if progress.is_some_and(|p| !(0..=100).contains(&p)) {
        return Err(ValidationError::InvalidProgress);
    }
    Ok(())
}

// ============================================
// Error handling
// ============================================

/// Error body returned by the REST layer on non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendError {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl BackendError {
    pub fn summary(&self) -> String {
        let message = self.message.as_deref().unwrap_or("unknown error");
        match (&self.code, &self.details) {
            (Some(code), Some(details)) => format!("{} ({}): {}", message, code, details),
            (Some(code), None) => format!("{} ({})", message, code),
            (None, Some(details)) => format!("{}: {}", message, details),
            (None, None) => message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(FeatureStatus::from("doing"), FeatureStatus::Doing);
        assert_eq!(FeatureStatus::from("in_progress"), FeatureStatus::Doing);
        assert_eq!(FeatureStatus::from("COMPLETED"), FeatureStatus::Done);
        assert_eq!(FeatureStatus::from("bloqueado"), FeatureStatus::Blocked);
        assert_eq!(FeatureStatus::from("whatever"), FeatureStatus::Backlog);
        assert_eq!(String::from(FeatureStatus::Blocked), "blocked");
    }

    #[test]
    fn test_status_cycle_returns_to_start() {
        let mut status = FeatureStatus::Backlog;
        for _ in 0..FeatureStatus::all().len() {
            status = status.next();
        }
        assert_eq!(status, FeatureStatus::Backlog);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-01-05"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05T10:30:00+00:00"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05T10:30:00.123"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("05/01/2024"), None);
    }

    #[test]
    fn test_feature_deserialization_is_lenient() {
        let json = r#"{
            "id": "7d0f2a4e-6a8e-4a53-9d36-8f3e4b1e2a10",
            "product_id": "0b5c1c8e-1f0a-4c43-8d2a-3a7d5e9c4b21",
            "title": "Checkout",
            "status": "in_progress",
            "start_date": "not a date",
            "end_date": "2024-02-10",
            "progress": 40
        }"#;
        let feature: FeatureDto = serde_json::from_str(json).unwrap();
        assert_eq!(feature.status, FeatureStatus::Doing);
        assert_eq!(feature.start_date, None);
        assert_eq!(feature.end_date, Some(date(2024, 2, 10)));
        assert!(!feature.is_scheduled());
        assert_eq!(feature.progress_pct(), Some(40));
    }

    #[test]
    fn test_feature_missing_optional_fields() {
        let json = r#"{
            "id": "7d0f2a4e-6a8e-4a53-9d36-8f3e4b1e2a10",
            "product_id": "0b5c1c8e-1f0a-4c43-8d2a-3a7d5e9c4b21",
            "title": null
        }"#;
        let feature: FeatureDto = serde_json::from_str(json).unwrap();
        assert_eq!(feature.display_title(), "Untitled Feature");
        assert_eq!(feature.status, FeatureStatus::Backlog);
        assert_eq!(feature.progress_pct(), None);
    }

    #[test]
    fn test_inverted_feature_is_not_scheduled() {
        let feature = FeatureDto {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            title: Some("Inverted".to_string()),
            description: None,
            status: FeatureStatus::Doing,
            start_date: Some(date(2024, 3, 10)),
            end_date: Some(date(2024, 3, 1)),
            progress: Some(250),
        };
        assert!(feature.schedule().is_none());
        assert_eq!(feature.progress_pct(), Some(100));
        assert!(feature.is_overdue(date(2024, 3, 2)));
    }

    #[test]
    fn test_create_product_validation() {
        let mut dto = CreateProductDto::default();
        assert_eq!(dto.validate(), Err(ValidationError::Required("Name")));

        dto.name = "   ".to_string();
        assert!(dto.validate().is_err());

        dto.name = "Produtivo".to_string();
        assert!(dto.validate().is_ok());

        dto.name = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(matches!(dto.validate(), Err(ValidationError::TooLong { .. })));
    }

    #[test]
    fn test_feature_validation() {
        let mut dto = UpdateFeatureDto {
            title: "Onboarding".to_string(),
            description: None,
            status: FeatureStatus::Backlog,
            start_date: None,
            end_date: None,
            progress: None,
        };
        assert!(dto.validate().is_ok());

        dto.start_date = Some(date(2024, 5, 10));
        assert_eq!(dto.validate(), Err(ValidationError::PartialSchedule));

        dto.end_date = Some(date(2024, 5, 1));
        assert!(matches!(
            dto.validate(),
            Err(ValidationError::EndBeforeStart { .. })
        ));

        dto.end_date = Some(date(2024, 5, 20));
        dto.progress = Some(101);
        assert_eq!(dto.validate(), Err(ValidationError::InvalidProgress));

        dto.progress = Some(100);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_update_feature_serializes_null_dates() {
        let dto = UpdateFeatureDto {
            title: "Search".to_string(),
            description: None,
            status: FeatureStatus::Done,
            start_date: None,
            end_date: None,
            progress: Some(100),
        };
        let value = serde_json::to_value(&dto).unwrap();
        assert_eq!(value["status"], "done");
        assert!(value["start_date"].is_null());
        assert!(value["end_date"].is_null());
    }

    #[test]
    fn test_backend_error_summary() {
        let err: BackendError = serde_json::from_str(
            r#"{"code":"23505","message":"duplicate key","details":"Key (name) exists","hint":null}"#,
        )
        .unwrap();
        assert_eq!(err.summary(), "duplicate key (23505): Key (name) exists");
    }
}
