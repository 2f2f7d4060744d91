//! Schedule result documents (`<scheduleResult>`).

use serde::Deserialize;

use super::{RawErrors, ResultError, flag, non_empty, parse_document, required};
use crate::error::Result;

/// Lifecycle state of a recurring schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleStatus {
    /// Schedule is being created.
    CreatePending,
    /// Schedule runs.
    Active,
    /// Schedule is paused.
    Paused,
    /// Schedule was cancelled.
    Cancelled,
    /// Schedule failed.
    Error,
    /// No schedule exists for the id.
    NonExisting,
    /// A value this client does not know.
    Other(String),
}

impl ScheduleStatus {
    fn parse(value: &str) -> Self {
        match value.trim() {
            "CREATE-PENDING" => Self::CreatePending,
            "ACTIVE" => Self::Active,
            "PAUSED" => Self::Paused,
            "CANCELLED" => Self::Cancelled,
            "ERROR" => Self::Error,
            "NON-EXISTING" => Self::NonExisting,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Parsed `<scheduleResult>` document returned by the `schedule` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleResult {
    /// Whether the schedule action was applied.
    pub operation_success: bool,
    /// Schedule identifier.
    pub schedule_id: Option<String>,
    /// State before the action.
    pub old_status: Option<ScheduleStatus>,
    /// State after the action.
    pub new_status: Option<ScheduleStatus>,
    /// Next execution time as reported by the gateway.
    pub scheduled_at: Option<String>,
    /// Errors in document order.
    pub errors: Vec<ResultError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScheduleResult {
    operation_success: Option<String>,
    schedule_id: Option<String>,
    old_status: Option<String>,
    new_status: Option<String>,
    scheduled_at: Option<String>,
    #[serde(default)]
    errors: RawErrors,
}

impl ScheduleResult {
    /// Parses a `<scheduleResult>` document; `operationSuccess` is required.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidResponse`](crate::GatewayError::InvalidResponse)
    /// if the body is not such a document.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let raw: RawScheduleResult = parse_document(body, "scheduleResult")?;
        let operation_success = required(raw.operation_success, "operationSuccess", body)?;

        Ok(Self {
            operation_success: flag(Some(&operation_success)),
            schedule_id: non_empty(raw.schedule_id),
            old_status: non_empty(raw.old_status).map(|v| ScheduleStatus::parse(&v)),
            new_status: non_empty(raw.new_status).map(|v| ScheduleStatus::parse(&v)),
            scheduled_at: non_empty(raw.scheduled_at),
            errors: raw.errors.into_errors(),
        })
    }

    /// First reported error, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<&ResultError> {
        self.errors.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GatewayError;

    #[test]
    fn test_parse_paused_schedule() {
        let body = br#"<scheduleResult xmlns="http://gateway/Schema/V2/ScheduleResult">
            <operationSuccess>true</operationSuccess>
            <scheduleId>SC-1234</scheduleId>
            <oldStatus>ACTIVE</oldStatus>
            <newStatus>PAUSED</newStatus>
            <scheduledAt>2030-01-01 00:00:00 UTC</scheduledAt>
        </scheduleResult>"#;

        let result = ScheduleResult::parse(body).unwrap();
        assert!(result.operation_success);
        assert_eq!(result.schedule_id.as_deref(), Some("SC-1234"));
        assert_eq!(result.old_status, Some(ScheduleStatus::Active));
        assert_eq!(result.new_status, Some(ScheduleStatus::Paused));
        assert!(result.first_error().is_none());
    }

    #[test]
    fn test_parse_failed_schedule() {
        let body = b"<scheduleResult><operationSuccess>false</operationSuccess>\
                     <newStatus>NON-EXISTING</newStatus><errors><error><message>Unknown \
                     schedule</message><code>7001</code></error></errors></scheduleResult>";

        let result = ScheduleResult::parse(body).unwrap();
        assert!(!result.operation_success);
        assert_eq!(result.new_status, Some(ScheduleStatus::NonExisting));
        assert_eq!(
            result.first_error().and_then(|e| e.message.as_deref()),
            Some("Unknown schedule")
        );
    }

    #[test]
    fn test_missing_operation_success_is_invalid() {
        let body = b"<scheduleResult><scheduleId>x</scheduleId></scheduleResult>";
        assert!(matches!(
            ScheduleResult::parse(body),
            Err(GatewayError::InvalidResponse { .. })
        ));
    }
}
