//! Human-readable terminal output for `sol-vault`.

use vault_client::{MultisigInfo, VaultTxnRecord};
use vault_core::{RawStatus, TransactionStatus};

fn status_icon(status: RawStatus) -> &'static str {
    match status {
        RawStatus::Draft => "📝",
        RawStatus::Active => "🗳️",
        RawStatus::Approved => "👍",
        RawStatus::Executing => "⏳",
        RawStatus::Executed => "✅",
        RawStatus::Rejected => "❌",
        RawStatus::Cancelled => "🚫",
    }
}

fn tx_status_label(status: Option<TransactionStatus>) -> &'static str {
    match status {
        Some(TransactionStatus::AwaitingConfirmations) => "awaiting confirmations",
        Some(TransactionStatus::AwaitingExecution) => "awaiting execution",
        Some(TransactionStatus::Cancelled) => "cancelled",
        Some(TransactionStatus::Failed) => "failed",
        Some(TransactionStatus::Success) => "success",
        None => "-",
    }
}

pub fn print_records(records: &[&VaultTxnRecord]) {
    if records.is_empty() {
        println!("📭 No vault transactions");
        return;
    }

    println!("📋 {} vault transaction(s)", records.len());
    for record in records {
        let description = record
            .txn_summary
            .as_ref()
            .map(|s| s.tx_info.human_description.as_str())
            .unwrap_or("(not a recognized transfer)");
        println!(
            "   {} #{:<4} {:<10} {}/{}  {}",
            status_icon(record.status),
            record.index,
            record.status.as_str(),
            record.approved.len(),
            record.threshold,
            description
        );
    }
}

pub fn print_record(record: &VaultTxnRecord) {
    println!("{} Vault transaction #{}", status_icon(record.status), record.index);
    println!("   Status:     {}", record.status);
    println!("   Timestamp:  {}", record.timestamp);
    println!("   Approvals:  {}/{}", record.approved.len(), record.threshold);
    for member in &record.approved {
        println!("     ✔ {}", member);
    }
    for member in &record.rejected {
        println!("     ✘ {}", member);
    }
    for member in &record.cancelled {
        println!("     ⊘ {}", member);
    }

    let Some(summary) = &record.txn_summary else {
        println!("   Action:     not a recognized transfer");
        return;
    };
    let transfer = &summary.tx_info.transfer_info;
    println!("   Action:     {}", summary.tx_info.human_description);
    println!("   State:      {}", tx_status_label(summary.tx_status));
    println!("   From:       {}", summary.tx_info.sender.value);
    println!("   To:         {}", summary.tx_info.recipient.value);
    println!("   Token:      {} ({})", transfer.token_symbol, transfer.token_address);
    println!("   Amount:     {} (decimals {})", transfer.value, transfer.decimals);
    if let Some(details) = &record.txn_details {
        println!("   Multisig:   {}", details.safe_address);
    }
}

pub fn print_multisig(info: &MultisigInfo) {
    println!("📊 Multisig {}", info.address);
    println!("   Create key:     {}", info.create_key);
    println!("   Default vault:  {}", info.default_vault);
    println!(
        "   Threshold:      {}-of-{} voters ({} members)",
        info.threshold,
        info.voter_count,
        info.members.len()
    );
    println!("   Time lock:      {}s", info.time_lock);
    println!(
        "   Transactions:   {} (stale below {})",
        info.transaction_index, info.stale_transaction_index
    );
    for (i, m) in info.members.iter().enumerate() {
        let perms: String = [(m.initiate, 'I'), (m.vote, 'V'), (m.execute, 'E')]
            .iter()
            .map(|&(set, c)| if set { c } else { '-' })
            .collect();
        println!("   Member [{}]: {} [{}]", i, m.key, perms);
    }
}
