//! Uniform view over XML results.

use super::{
    ResultError, ReturnType, ScheduleResult, StatusResult, TransactionResult, TransactionStatus,
};

/// A transaction, schedule or status result seen through one interface.
///
/// # Examples
///
/// ```
/// use gateway_client::response::{PaymentResponse, TransactionResult};
///
/// let body = br#"<result>
///     <success>true</success>
///     <referenceId>123456</referenceId>
///     <returnType>REDIRECT</returnType>
///     <redirectUrl>http://example.com</redirectUrl>
/// </result>"#;
///
/// let response = PaymentResponse::from(TransactionResult::parse(body).unwrap());
/// assert!(response.is_successful());
/// assert!(response.is_redirect());
/// assert_eq!(response.redirect_url(), Some("http://example.com"));
/// assert_eq!(response.transaction_reference(), Some("123456"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentResponse {
    /// Result of a transaction request.
    Transaction(TransactionResult),
    /// Result of a schedule request.
    Schedule(ScheduleResult),
    /// Result of a status request.
    Status(StatusResult),
}

impl PaymentResponse {
    /// Whether the operation succeeded.
    ///
    /// - transaction: `success` and a return type other than `ERROR`
    /// - status: `operationSuccess` and transaction status `SUCCESS`
    /// - schedule: `operationSuccess`
    #[must_use]
    pub fn is_successful(&self) -> bool {
        match self {
            Self::Transaction(result) => result.success && result.return_type != ReturnType::Error,
            Self::Schedule(result) => result.operation_success,
            Self::Status(result) => {
                result.operation_success
                    && result.transaction_status == Some(TransactionStatus::Success)
            }
        }
    }

    /// Whether the customer must be redirected.
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Transaction(result) if result.return_type == ReturnType::Redirect)
    }

    /// Redirect target of a transaction result.
    #[must_use]
    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            Self::Transaction(result) => result.redirect_url.as_deref(),
            Self::Schedule(_) | Self::Status(_) => None,
        }
    }

    /// Gateway-side reference: `referenceId` or `transactionUuid`.
    #[must_use]
    pub fn transaction_reference(&self) -> Option<&str> {
        match self {
            Self::Transaction(result) => result.reference_id.as_deref(),
            Self::Status(result) => result.transaction_uuid.as_deref(),
            Self::Schedule(_) => None,
        }
    }

    /// Merchant-side id: `purchaseId` or `merchantTransactionId`.
    #[must_use]
    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            Self::Transaction(result) => result.purchase_id.as_deref(),
            Self::Status(result) => result.merchant_transaction_id.as_deref(),
            Self::Schedule(_) => None,
        }
    }

    /// All reported errors.
    #[must_use]
    pub fn errors(&self) -> &[ResultError] {
        match self {
            Self::Transaction(result) => &result.errors,
            Self::Schedule(result) => &result.errors,
            Self::Status(result) => &result.errors,
        }
    }

    /// Code of the first error, `0` when there is none.
    #[must_use]
    pub fn code(&self) -> i64 {
        self.errors().first().and_then(|error| error.code).unwrap_or(0)
    }

    /// Message of the first error.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.errors().first().and_then(|error| error.message.as_deref())
    }

    /// `operationSuccess` of status and schedule results; false for transactions.
    #[must_use]
    pub const fn is_operation_success(&self) -> bool {
        match self {
            Self::Status(result) => result.operation_success,
            Self::Schedule(result) => result.operation_success,
            Self::Transaction(_) => false,
        }
    }

    /// Transaction status of a status result.
    #[must_use]
    pub const fn transaction_status(&self) -> Option<&TransactionStatus> {
        match self {
            Self::Status(result) => result.transaction_status.as_ref(),
            Self::Transaction(_) | Self::Schedule(_) => None,
        }
    }

    /// Transaction type of a status result.
    #[must_use]
    pub fn transaction_type(&self) -> Option<&str> {
        match self {
            Self::Status(result) => result.transaction_type.as_deref(),
            Self::Transaction(_) | Self::Schedule(_) => None,
        }
    }
}

impl From<TransactionResult> for PaymentResponse {
    fn from(result: TransactionResult) -> Self {
        Self::Transaction(result)
    }
}

impl From<ScheduleResult> for PaymentResponse {
    fn from(result: ScheduleResult) -> Self {
        Self::Schedule(result)
    }
}

impl From<StatusResult> for PaymentResponse {
    fn from(result: StatusResult) -> Self {
        Self::Status(result)
    }
}
