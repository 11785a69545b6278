//! Observable events
//!
//! Every log line names one of these. Events are explicit and typed.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Account status
    /// Store account is usable
    AccountAvailable,
    /// No account is configured
    AccountMissing,
    /// Account access is restricted
    AccountRestricted,
    /// Account status could not be determined
    AccountIndeterminate,
    /// Account is temporarily unavailable
    AccountTemporarilyUnavailable,
    /// The status query itself failed
    AccountStatusFailed,

    // Codec
    /// A field was omitted from an encoded record
    FieldDropped,
    /// A blob was staged as an asset
    AssetStaged,
    /// A staged asset could not be read back
    AssetReadFailed,
    /// A record could not be turned back into its type
    RecordDecodeFailed,

    // Resolver
    /// A reference could not be resolved and was dropped
    ReferenceDropped,

    // Manager
    /// A record was dropped from a list fetch
    RecordDropped,
    /// A store call failed
    StoreCallFailed,
    /// An operation exceeded its timeout
    OperationTimedOut,
    /// A record was deleted
    RecordDeleted,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::AccountAvailable => "ACCOUNT_AVAILABLE",
            Event::AccountMissing => "ACCOUNT_MISSING",
            Event::AccountRestricted => "ACCOUNT_RESTRICTED",
            Event::AccountIndeterminate => "ACCOUNT_INDETERMINATE",
            Event::AccountTemporarilyUnavailable => "ACCOUNT_TEMPORARILY_UNAVAILABLE",
            Event::AccountStatusFailed => "ACCOUNT_STATUS_FAILED",
            Event::FieldDropped => "FIELD_DROPPED",
            Event::AssetStaged => "ASSET_STAGED",
            Event::AssetReadFailed => "ASSET_READ_FAILED",
            Event::RecordDecodeFailed => "RECORD_DECODE_FAILED",
            Event::ReferenceDropped => "REFERENCE_DROPPED",
            Event::RecordDropped => "RECORD_DROPPED",
            Event::StoreCallFailed => "STORE_CALL_FAILED",
            Event::OperationTimedOut => "OPERATION_TIMED_OUT",
            Event::RecordDeleted => "RECORD_DELETED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
