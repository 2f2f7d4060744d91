//! Typed request documents.
//!
//! Request data is held in plain structs and rendered to the gateway's XML by
//! an explicit element builder. Integrators that arrive with generic
//! key/value maps go through the [`field_map`] table instead of
//! per-key setter lookup.

use std::fmt::Display;

use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{
    credential::Credential,
    error::{GatewayError, Result},
};

mod customer;
pub mod field_map;
mod options;
mod schedule;
mod status;
mod transaction;

pub use customer::{Customer, CustomerData};
pub use options::OptionsRequest;
pub use schedule::{PeriodUnit, ScheduleData};
pub use status::StatusRequest;
pub use transaction::{TransactionData, TransactionIndicator};

/// Namespace prefix of the XML API; element-specific suffixes are appended.
pub const DEFAULT_NAMESPACE_ROOT: &str = "http://gateway.bankart.si/Schema/V2/";

/// Operation carried by a `transaction` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMethod {
    /// Store a payment instrument.
    Register,
    /// Finish a pending registration.
    CompleteRegister,
    /// Remove a stored payment instrument.
    Deregister,
    /// Reserve funds.
    Preauthorize,
    /// Finish a pending preauthorization.
    CompletePreauthorize,
    /// Release a preauthorization.
    Void,
    /// Collect preauthorized funds.
    Capture,
    /// Return collected funds.
    Refund,
    /// Charge immediately.
    Debit,
    /// Finish a pending debit.
    CompleteDebit,
    /// Pay out to the customer.
    Payout,
}

impl TransactionMethod {
    /// Element name of the method inside the transaction document.
    #[must_use]
    pub const fn element(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::CompleteRegister => "completeRegister",
            Self::Deregister => "deregister",
            Self::Preauthorize => "preauthorize",
            Self::CompletePreauthorize => "completePreauthorize",
            Self::Void => "void",
            Self::Capture => "capture",
            Self::Refund => "refund",
            Self::Debit => "debit",
            Self::CompleteDebit => "completeDebit",
            Self::Payout => "payout",
        }
    }
}

/// Operation carried by a `schedule` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleAction {
    /// Create and start a schedule.
    Start,
    /// Show a schedule.
    Show,
    /// Pause a schedule.
    Pause,
    /// Resume a paused schedule.
    Continue,
    /// Cancel a schedule.
    Cancel,
}

impl ScheduleAction {
    /// Element name of the action inside the schedule document.
    #[must_use]
    pub const fn element(self) -> &'static str {
        match self {
            Self::Start => "startSchedule",
            Self::Show => "showSchedule",
            Self::Pause => "pauseSchedule",
            Self::Continue => "continueSchedule",
            Self::Cancel => "cancelSchedule",
        }
    }
}

fn document_error(error: impl Display) -> GatewayError {
    GatewayError::Document(error.to_string())
}

/// Streaming element builder over a quick-xml writer.
pub(crate) struct XmlBuilder {
    writer: Writer<Vec<u8>>,
}

impl XmlBuilder {
    /// Starts a UTF-8 document with its XML declaration.
    pub(crate) fn new() -> Result<Self> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(document_error)?;
        Ok(Self { writer })
    }

    /// Opens `name` with `attributes`.
    pub(crate) fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Start(start)).map_err(document_error)
    }

    /// Closes `name`.
    pub(crate) fn close(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name))).map_err(document_error)
    }

    /// Writes `<name>text</name>` with `text` escaped.
    pub(crate) fn text(&mut self, name: &str, text: &str) -> Result<()> {
        self.open(name, &[])?;
        self.writer.write_event(Event::Text(BytesText::new(text))).map_err(document_error)?;
        self.close(name)
    }

    /// Writes `<name key="key">text</name>`.
    pub(crate) fn keyed(&mut self, name: &str, key: &str, text: &str) -> Result<()> {
        self.open(name, &[("key", key)])?;
        self.writer.write_event(Event::Text(BytesText::new(text))).map_err(document_error)?;
        self.close(name)
    }

    /// Writes the element only when `text` is present.
    pub(crate) fn optional(&mut self, name: &str, text: Option<&str>) -> Result<()> {
        match text {
            Some(text) => self.text(name, text),
            None => Ok(()),
        }
    }

    /// Writes the account credentials every document starts with.
    pub(crate) fn credentials(&mut self, credential: &Credential) -> Result<()> {
        self.text("username", credential.username())?;
        self.text("password", credential.password_hash())
    }

    /// Returns the rendered bytes.
    pub(crate) fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

impl std::fmt::Debug for XmlBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlBuilder").finish_non_exhaustive()
    }
}
