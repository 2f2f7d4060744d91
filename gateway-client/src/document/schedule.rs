use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;

use super::{ScheduleAction, XmlBuilder, transaction::format_amount};
use crate::{
    credential::Credential,
    error::{GatewayError, Result},
};

/// Unit of a schedule period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodUnit {
    /// Days.
    Day,
    /// Weeks.
    Week,
    /// Months.
    Month,
    /// Years.
    Year,
}

impl PeriodUnit {
    /// Wire value of the unit.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::Year => "YEAR",
        }
    }
}

/// Data of a `schedule` request.
///
/// Starting a schedule needs the registration, amount, currency and period;
/// every other action addresses an existing schedule by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleData {
    /// Registration the schedule charges.
    pub registration_id: Option<String>,
    /// Existing schedule.
    pub schedule_id: Option<String>,
    /// Amount per period.
    pub amount: Option<Decimal>,
    /// ISO 4217 currency code.
    pub currency: Option<String>,
    /// Number of units per period.
    pub period_length: Option<u32>,
    /// Period unit.
    pub period_unit: Option<PeriodUnit>,
    /// First execution, or the resume time when continuing.
    pub start_date_time: Option<DateTime<Utc>>,
}

impl ScheduleData {
    /// Data for starting a schedule on `registration_id`.
    #[must_use]
    pub fn start(
        registration_id: impl Into<String>,
        amount: Decimal,
        currency: impl Into<String>,
        period_length: u32,
        period_unit: PeriodUnit,
    ) -> Self {
        Self {
            registration_id: Some(registration_id.into()),
            amount: Some(amount),
            currency: Some(currency.into()),
            period_length: Some(period_length),
            period_unit: Some(period_unit),
            ..Self::default()
        }
    }

    /// Data addressing the existing schedule `schedule_id`.
    #[must_use]
    pub fn existing(schedule_id: impl Into<String>) -> Self {
        Self { schedule_id: Some(schedule_id.into()), ..Self::default() }
    }

    /// Sets the first execution or resume time.
    #[must_use]
    pub const fn with_start_date_time(mut self, at: DateTime<Utc>) -> Self {
        self.start_date_time = Some(at);
        self
    }

    /// Renders the `schedule` document for `action`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Document`] if a field the action needs is
    /// missing.
    pub fn render(
        &self,
        action: ScheduleAction,
        credential: &Credential,
        namespace_root: &str,
    ) -> Result<Vec<u8>> {
        self.validate(action)?;

        let namespace = format!("{namespace_root}Schedule");
        let mut xml = XmlBuilder::new()?;
        xml.open("schedule", &[("xmlns", namespace.as_str())])?;
        xml.credentials(credential)?;
        xml.open(action.element(), &[])?;

        match action {
            ScheduleAction::Start => {
                xml.optional("registrationId", self.registration_id.as_deref())?;
                if let Some(amount) = self.amount {
                    xml.text("amount", &format_amount(amount))?;
                }
                xml.optional("currency", self.currency.as_deref())?;
                if let Some(length) = self.period_length {
                    xml.text("periodLength", &length.to_string())?;
                }
                xml.optional("periodUnit", self.period_unit.map(PeriodUnit::as_str))?;
                xml.optional("startDateTime", self.start_date_time.map(format_time).as_deref())?;
            }
            ScheduleAction::Continue => {
                xml.optional("scheduleId", self.schedule_id.as_deref())?;
                xml.optional(
                    "continueDateTime",
                    self.start_date_time.map(format_time).as_deref(),
                )?;
            }
            ScheduleAction::Show | ScheduleAction::Pause | ScheduleAction::Cancel => {
                xml.optional("scheduleId", self.schedule_id.as_deref())?;
            }
        }

        xml.close(action.element())?;
        xml.close("schedule")?;
        Ok(xml.finish())
    }

    fn validate(&self, action: ScheduleAction) -> Result<()> {
        let missing = |field: &str| {
            GatewayError::Document(format!("{} requires {field}", action.element()))
        };
        match action {
            ScheduleAction::Start => {
                if self.registration_id.is_none() {
                    return Err(missing("registrationId"));
                }
                if self.amount.is_none() || self.currency.is_none() {
                    return Err(missing("amount and currency"));
                }
                if self.period_length.is_none_or(|length| length == 0) {
                    return Err(missing("a positive periodLength"));
                }
                if self.period_unit.is_none() {
                    return Err(missing("periodUnit"));
                }
            }
            ScheduleAction::Show
            | ScheduleAction::Pause
            | ScheduleAction::Continue
            | ScheduleAction::Cancel => {
                if self.schedule_id.is_none() {
                    return Err(missing("scheduleId"));
                }
            }
        }
        Ok(())
    }
}

fn format_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn credential() -> Credential {
        Credential::with_hashed_password("key", "secret", "merchant", "hash")
    }

    #[test]
    fn test_start_schedule_document() {
        let data = ScheduleData::start("REG-1", Decimal::new(999, 2), "EUR", 1, PeriodUnit::Month)
            .with_start_date_time(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());

        let xml =
            String::from_utf8(data.render(ScheduleAction::Start, &credential(), "ns/").unwrap())
                .unwrap();
        assert!(xml.contains("<schedule xmlns=\"ns/Schedule\">"));
        assert!(xml.contains(
            "<startSchedule><registrationId>REG-1</registrationId><amount>9.99</amount>\
             <currency>EUR</currency><periodLength>1</periodLength>\
             <periodUnit>MONTH</periodUnit>\
             <startDateTime>2030-01-01T00:00:00+00:00</startDateTime></startSchedule>"
        ));
    }

    #[test]
    fn test_cancel_schedule_document() {
        let xml = String::from_utf8(
            ScheduleData::existing("SC-7")
                .render(ScheduleAction::Cancel, &credential(), "ns/")
                .unwrap(),
        )
        .unwrap();
        assert!(xml.contains("<cancelSchedule><scheduleId>SC-7</scheduleId></cancelSchedule>"));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let err = ScheduleData::default()
            .render(ScheduleAction::Pause, &credential(), "ns/")
            .unwrap_err();
        assert!(matches!(err, GatewayError::Document(ref m) if m.contains("scheduleId")));

        let zero = ScheduleData::start("REG-1", Decimal::ONE, "EUR", 0, PeriodUnit::Day);
        assert!(zero.render(ScheduleAction::Start, &credential(), "ns/").is_err());
    }
}
