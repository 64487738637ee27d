use serde::{Deserialize, Serialize};

use crate::accounts::RawStatus;

/// Presentation status of a vault transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    AwaitingConfirmations,
    AwaitingExecution,
    Cancelled,
    Failed,
    Success,
}

/// Map an on-chain proposal status to a presentation status.
///
/// An active proposal only counts as awaiting execution once approvals
/// strictly exceed the threshold. `Draft` and `Executing` have no
/// presentation status.
pub fn map_status(raw: RawStatus, threshold: u16, approved: usize) -> Option<TransactionStatus> {
    match raw {
        RawStatus::Active if approved > threshold as usize => {
            Some(TransactionStatus::AwaitingExecution)
        }
        RawStatus::Active => Some(TransactionStatus::AwaitingConfirmations),
        RawStatus::Cancelled => Some(TransactionStatus::Cancelled),
        RawStatus::Approved | RawStatus::Executed => Some(TransactionStatus::Success),
        RawStatus::Rejected => Some(TransactionStatus::Failed),
        RawStatus::Draft | RawStatus::Executing => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_above_threshold_awaits_execution() {
        assert_eq!(map_status(RawStatus::Active, 2, 3), Some(TransactionStatus::AwaitingExecution));
    }

    #[test]
    fn test_active_at_threshold_awaits_confirmations() {
        assert_eq!(
            map_status(RawStatus::Active, 2, 2),
            Some(TransactionStatus::AwaitingConfirmations)
        );
        assert_eq!(
            map_status(RawStatus::Active, 2, 0),
            Some(TransactionStatus::AwaitingConfirmations)
        );
    }

    #[test]
    fn test_terminal_statuses() {
        assert_eq!(map_status(RawStatus::Rejected, 2, 0), Some(TransactionStatus::Failed));
        assert_eq!(map_status(RawStatus::Cancelled, 2, 5), Some(TransactionStatus::Cancelled));
        assert_eq!(map_status(RawStatus::Approved, 2, 2), Some(TransactionStatus::Success));
        assert_eq!(map_status(RawStatus::Executed, 1, 0), Some(TransactionStatus::Success));
    }

    #[test]
    fn test_in_progress_statuses_unmapped() {
        assert_eq!(map_status(RawStatus::Draft, 2, 0), None);
        assert_eq!(map_status(RawStatus::Executing, 2, 3), None);
    }

    #[test]
    fn test_status_json_names() {
        let json = serde_json::to_string(&TransactionStatus::AwaitingConfirmations).unwrap();
        assert_eq!(json, "\"AWAITING_CONFIRMATIONS\"");
    }
}
