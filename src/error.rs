use crate::domain::{Account, Tag};
use thiserror::Error;

/// Fatal errors raised by an engine call.
///
/// Every variant identifies the offending event tag so an operator can trace the
/// failure back to the upstream row. A call that fails leaves the ledger untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("tag {tag}: {field} can't be null on \"{account}\"")]
    NullRequiredField {
        tag: Tag,
        account: Account,
        field: &'static str,
    },

    #[error(
        "tag {tag}: not enough balance on \"{account}\", {missing} left untransferred, price must be specified in order to go negative"
    )]
    InsufficientBalanceNoPrice {
        tag: Tag,
        account: Account,
        missing: f64,
    },

    #[error(
        "tag {tag}: can't finalize transfer {from} -> {to} {amount}, unable to match with initiating record"
    )]
    NoMatchingTransfer {
        tag: Tag,
        from: Account,
        to: Account,
        amount: f64,
    },

    #[error(
        "tag {tag}: can't finalize transfer {from} -> {to}, in/out amounts mismatch: {pending}, {amount}"
    )]
    AmountMismatch {
        tag: Tag,
        from: Account,
        to: Account,
        pending: f64,
        amount: f64,
    },

    #[error(
        "tag {tag}: attempt to transfer from account \"{account}\" that has negative balance records"
    )]
    NegativeLotInvariantViolation { tag: Tag, account: Account },
}

impl LedgerError {
    /// Tag of the event that triggered the error.
    pub fn tag(&self) -> Tag {
        match self {
            LedgerError::NullRequiredField { tag, .. }
            | LedgerError::InsufficientBalanceNoPrice { tag, .. }
            | LedgerError::NoMatchingTransfer { tag, .. }
            | LedgerError::AmountMismatch { tag, .. }
            | LedgerError::NegativeLotInvariantViolation { tag, .. } => *tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names_tag_account_and_amount() {
        let err = LedgerError::NoMatchingTransfer {
            tag: Tag::new(7),
            from: Account::new("a"),
            to: Account::new("b"),
            amount: 5.0,
        };
        assert_eq!(
            err.to_string(),
            "tag 7: can't finalize transfer a -> b 5, unable to match with initiating record"
        );
        assert_eq!(err.tag(), Tag::new(7));
    }

    #[test]
    fn test_null_field_message() {
        let err = LedgerError::NullRequiredField {
            tag: Tag::new(3),
            account: Account::new("main"),
            field: "price",
        };
        assert_eq!(err.to_string(), "tag 3: price can't be null on \"main\"");
    }
}
