// Views over aggregated records. Order of the input is preserved.

use vault_core::RawStatus;

use crate::aggregate::VaultTxnRecord;

pub fn by_status(records: &[VaultTxnRecord], status: RawStatus) -> Vec<&VaultTxnRecord> {
    records.iter().filter(|r| r.status == status).collect()
}

/// Transactions still collecting votes.
pub fn queued(records: &[VaultTxnRecord]) -> Vec<&VaultTxnRecord> {
    by_status(records, RawStatus::Active)
}

/// Everything that is not queued.
pub fn history(records: &[VaultTxnRecord]) -> Vec<&VaultTxnRecord> {
    records.iter().filter(|r| r.status != RawStatus::Active).collect()
}
