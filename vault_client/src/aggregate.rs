// Walks every transaction of a multisig and assembles one record per index.
//
// Aggregation is fail-fast: a missing or malformed account aborts the whole
// call. Undecodable transactions are not failures, they come back as records
// without a summary.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info};
use vault_core::{
    DecodedAction, Multisig, Proposal, RawStatus, SummaryInput, TokenInfo, TransactionDetails,
    TransactionSummary, VaultTransaction, build_details, build_summary, compute_multisig_pda,
    compute_proposal_pda, compute_transaction_pda, compute_vault_pda, pubkey_string,
};

use crate::decode::decode_vault_transaction;
use crate::error::ClientResult;
use crate::source::{AccountSource, fetch_anchor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxnType {
    Send,
}

/// One vault transaction together with its proposal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultTxnRecord {
    pub index: u64,
    #[serde(with = "pubkey_string")]
    pub create_key: Pubkey,
    #[serde(rename = "type")]
    pub txn_type: TxnType,
    pub threshold: u16,
    pub status: RawStatus,
    /// Unix seconds of the last proposal status change
    pub timestamp: i64,
    pub approved: Vec<String>,
    pub rejected: Vec<String>,
    pub cancelled: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded_action: Option<DecodedAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txn_summary: Option<TransactionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txn_details: Option<TransactionDetails>,
}

/// A loaded multisig and the addresses it was derived from.
#[derive(Debug, Clone)]
pub struct VaultContext {
    pub program_id: Pubkey,
    pub create_key: Pubkey,
    pub address: Pubkey,
    pub multisig: Multisig,
}

pub async fn load_multisig<S>(
    accounts: &S,
    program_id: &Pubkey,
    create_key: &Pubkey,
) -> ClientResult<VaultContext>
where
    S: AccountSource + ?Sized,
{
    let address = compute_multisig_pda(program_id, create_key);
    let multisig: Multisig = fetch_anchor(accounts, &address).await?;
    Ok(VaultContext { program_id: *program_id, create_key: *create_key, address, multisig })
}

fn base58_list(keys: &[Pubkey]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

/// Fetch, decode and summarize the transaction at `index`.
pub async fn fetch_vault_txn<S>(
    accounts: &S,
    ctx: &VaultContext,
    index: u64,
    tokens: &[TokenInfo],
) -> ClientResult<VaultTxnRecord>
where
    S: AccountSource + ?Sized,
{
    let transaction_pda = compute_transaction_pda(&ctx.program_id, &ctx.address, index);
    let proposal_pda = compute_proposal_pda(&ctx.program_id, &ctx.address, index);

    let transaction: VaultTransaction = fetch_anchor(accounts, &transaction_pda).await?;
    let proposal: Proposal = fetch_anchor(accounts, &proposal_pda).await?;

    let decoded_action = decode_vault_transaction(&transaction.message, accounts).await;
    if decoded_action.is_none() {
        debug!(index, transaction = %transaction_pda, "no transfer decoded");
    }

    let status = proposal.status.tag();
    let timestamp = proposal.status.timestamp();
    let vault_address = compute_vault_pda(&ctx.program_id, &ctx.address, transaction.vault_index);

    let txn_summary = build_summary(SummaryInput {
        status,
        threshold: ctx.multisig.threshold,
        approved: proposal.approved.len(),
        index,
        timestamp,
        vault_address: &vault_address,
        action: decoded_action.as_ref(),
        tokens,
    });
    let txn_details = txn_summary.as_ref().map(|s| build_details(s, &ctx.address));

    Ok(VaultTxnRecord {
        index,
        create_key: ctx.create_key,
        txn_type: TxnType::Send,
        threshold: ctx.multisig.threshold,
        status,
        timestamp,
        approved: base58_list(&proposal.approved),
        rejected: base58_list(&proposal.rejected),
        cancelled: base58_list(&proposal.cancelled),
        decoded_action,
        txn_summary,
        txn_details,
    })
}

/// All vault transactions of the multisig behind `create_key`, newest first.
pub async fn get_vault_txns<S>(
    accounts: &S,
    program_id: &Pubkey,
    create_key: &Pubkey,
    tokens: &[TokenInfo],
) -> ClientResult<Vec<VaultTxnRecord>>
where
    S: AccountSource + ?Sized,
{
    let ctx = load_multisig(accounts, program_id, create_key).await?;
    info!(
        multisig = %ctx.address,
        transactions = ctx.multisig.transaction_index,
        "loading vault transactions"
    );

    let mut records = Vec::new();
    for index in 1..=ctx.multisig.transaction_index {
        records.push(fetch_vault_txn(accounts, &ctx, index, tokens).await?);
    }

    sort_newest_first(&mut records);
    Ok(records)
}

/// Stable: records with equal timestamps keep their index order.
pub fn sort_newest_first(records: &mut [VaultTxnRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

// ---------------------------------------------------------------------------
// Multisig state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInfo {
    #[serde(with = "pubkey_string")]
    pub key: Pubkey,
    pub initiate: bool,
    pub vote: bool,
    pub execute: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultisigInfo {
    #[serde(with = "pubkey_string")]
    pub address: Pubkey,
    #[serde(with = "pubkey_string")]
    pub create_key: Pubkey,
    pub threshold: u16,
    pub time_lock: u32,
    pub transaction_index: u64,
    pub stale_transaction_index: u64,
    pub members: Vec<MemberInfo>,
    /// Members holding the vote permission; the threshold is out of these
    pub voter_count: usize,
    /// Vault 0, the one wallets show by default
    #[serde(with = "pubkey_string")]
    pub default_vault: Pubkey,
}

impl From<&VaultContext> for MultisigInfo {
    fn from(ctx: &VaultContext) -> Self {
        use vault_core::Permissions;

        let members = ctx
            .multisig
            .members
            .iter()
            .map(|m| MemberInfo {
                key: m.key,
                initiate: m.permissions.has(Permissions::INITIATE),
                vote: m.permissions.has(Permissions::VOTE),
                execute: m.permissions.has(Permissions::EXECUTE),
            })
            .collect();

        MultisigInfo {
            address: ctx.address,
            create_key: ctx.create_key,
            threshold: ctx.multisig.threshold,
            time_lock: ctx.multisig.time_lock,
            transaction_index: ctx.multisig.transaction_index,
            stale_transaction_index: ctx.multisig.stale_transaction_index,
            members,
            voter_count: ctx.multisig.voters().count(),
            default_vault: compute_vault_pda(&ctx.program_id, &ctx.address, 0),
        }
    }
}

pub async fn fetch_multisig_info<S>(
    accounts: &S,
    program_id: &Pubkey,
    create_key: &Pubkey,
) -> ClientResult<MultisigInfo>
where
    S: AccountSource + ?Sized,
{
    let ctx = load_multisig(accounts, program_id, create_key).await?;
    Ok(MultisigInfo::from(&ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::source::MemoryAccountSource;
    use solana_sdk::account::Account;
    use solana_sdk::system_program;
    use vault_core::{
        AnchorAccount, CompiledInstruction, Member, Permissions, ProposalStatus,
        SQUADS_PROGRAM_ID, VaultTransactionMessage,
    };

    const PROGRAM: Pubkey = SQUADS_PROGRAM_ID;

    fn key(b: u8) -> Pubkey {
        Pubkey::new_from_array([b; 32])
    }

    fn anchor_account<T: AnchorAccount>(value: &T) -> Account {
        Account {
            lamports: 1_000_000,
            data: value.to_account_data().unwrap(),
            owner: PROGRAM,
            executable: false,
            rent_epoch: 0,
        }
    }

    fn multisig(create_key: Pubkey, transaction_index: u64) -> Multisig {
        Multisig {
            create_key,
            config_authority: Pubkey::default(),
            threshold: 2,
            time_lock: 0,
            transaction_index,
            stale_transaction_index: 0,
            rent_collector: None,
            bump: 255,
            members: vec![
                Member { key: key(10), permissions: Permissions::all() },
                Member { key: key(11), permissions: Permissions { mask: Permissions::VOTE } },
            ],
        }
    }

    fn sol_message(lamports: u64) -> VaultTransactionMessage {
        let mut data = 2u32.to_le_bytes().to_vec();
        data.extend_from_slice(&lamports.to_le_bytes());
        VaultTransactionMessage {
            num_signers: 1,
            num_writable_signers: 1,
            num_writable_non_signers: 1,
            account_keys: vec![key(1), key(2), system_program::ID],
            instructions: vec![CompiledInstruction {
                program_id_index: 2,
                account_indexes: vec![0, 1],
                data,
            }],
            address_table_lookups: vec![],
        }
    }

    /// Ledger with `statuses.len()` native-transfer transactions.
    fn ledger(create_key: Pubkey, statuses: &[ProposalStatus]) -> MemoryAccountSource {
        let ms_pda = compute_multisig_pda(&PROGRAM, &create_key);
        let mut source = MemoryAccountSource::new();
        source.insert(ms_pda, anchor_account(&multisig(create_key, statuses.len() as u64)));

        for (i, status) in statuses.iter().enumerate() {
            let index = i as u64 + 1;
            let tx = VaultTransaction {
                multisig: ms_pda,
                creator: key(10),
                index,
                bump: 254,
                vault_index: 0,
                vault_bump: 253,
                ephemeral_signer_bumps: vec![],
                message: sol_message(index * 1_000),
            };
            let proposal = Proposal {
                multisig: ms_pda,
                transaction_index: index,
                status: *status,
                bump: 252,
                approved: vec![key(10)],
                rejected: vec![],
                cancelled: vec![],
            };
            source.insert(
                compute_transaction_pda(&PROGRAM, &ms_pda, index),
                anchor_account(&tx),
            );
            source.insert(
                compute_proposal_pda(&PROGRAM, &ms_pda, index),
                anchor_account(&proposal),
            );
        }
        source
    }

    #[tokio::test]
    async fn test_records_sorted_newest_first() {
        let create_key = key(42);
        let source = ledger(
            create_key,
            &[
                ProposalStatus::Executed { timestamp: 100 },
                ProposalStatus::Active { timestamp: 300 },
                ProposalStatus::Cancelled { timestamp: 200 },
            ],
        );

        let records = get_vault_txns(&source, &PROGRAM, &create_key, &[]).await.unwrap();
        let order: Vec<u64> = records.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert!(records.iter().all(|r| r.txn_summary.is_some()));
        assert_eq!(records[0].approved, vec![key(10).to_string()]);
        assert_eq!(records[0].threshold, 2);
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_index_order() {
        let create_key = key(42);
        let source = ledger(
            create_key,
            &[ProposalStatus::Executing, ProposalStatus::Executing, ProposalStatus::Executing],
        );

        let records = get_vault_txns(&source, &PROGRAM, &create_key, &[]).await.unwrap();
        let order: Vec<u64> = records.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert!(records.iter().all(|r| r.timestamp == 0));
    }

    #[tokio::test]
    async fn test_missing_proposal_aborts() {
        let create_key = key(42);
        let mut source = ledger(
            create_key,
            &[ProposalStatus::Active { timestamp: 1 }, ProposalStatus::Active { timestamp: 2 }],
        );
        let ms_pda = compute_multisig_pda(&PROGRAM, &create_key);
        let missing = compute_proposal_pda(&PROGRAM, &ms_pda, 2);
        source.remove(&missing);

        let err = get_vault_txns(&source, &PROGRAM, &create_key, &[]).await.unwrap_err();
        assert!(matches!(err, ClientError::AccountNotFound(a) if a == missing));
    }

    #[tokio::test]
    async fn test_missing_multisig() {
        let source = MemoryAccountSource::new();
        let err = get_vault_txns(&source, &PROGRAM, &key(42), &[]).await.unwrap_err();
        assert!(matches!(err, ClientError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_multisig() {
        let create_key = key(42);
        let source = ledger(create_key, &[]);
        let records = get_vault_txns(&source, &PROGRAM, &create_key, &[]).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_record_addresses() {
        let create_key = key(42);
        let source = ledger(create_key, &[ProposalStatus::Approved { timestamp: 5 }]);
        let ctx = load_multisig(&source, &PROGRAM, &create_key).await.unwrap();

        let record = fetch_vault_txn(&source, &ctx, 1, &[]).await.unwrap();
        let summary = record.txn_summary.unwrap();
        let details = record.txn_details.unwrap();
        let vault = compute_vault_pda(&PROGRAM, &ctx.address, 0);
        assert_eq!(summary.tx_info.sender.value, vault.to_string());
        assert_eq!(details.safe_address, ctx.address.to_string());
        assert_eq!(summary.timestamp, 5_000);
        assert_eq!(record.status, RawStatus::Approved);
    }

    #[tokio::test]
    async fn test_record_json_shape() {
        let create_key = key(42);
        let source = ledger(create_key, &[ProposalStatus::Draft { timestamp: 9 }]);
        let ctx = load_multisig(&source, &PROGRAM, &create_key).await.unwrap();
        let record = fetch_vault_txn(&source, &ctx, 1, &[]).await.unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "SEND");
        assert_eq!(json["status"], "Draft");
        assert_eq!(json["createKey"], create_key.to_string());
        assert_eq!(json["decodedAction"]["type"], "SOL_TRANSFER");
        assert_eq!(json["decodedAction"]["amount"], "1000");
        assert!(json["txnSummary"].get("txStatus").is_none());
    }

    #[tokio::test]
    async fn test_multisig_info() {
        let create_key = key(42);
        let source = ledger(create_key, &[ProposalStatus::Active { timestamp: 1 }]);

        let info = fetch_multisig_info(&source, &PROGRAM, &create_key).await.unwrap();
        assert_eq!(info.address, compute_multisig_pda(&PROGRAM, &create_key));
        assert_eq!(info.transaction_index, 1);
        assert_eq!(info.members.len(), 2);
        assert!(info.members[0].execute);
        assert!(!info.members[1].initiate && info.members[1].vote);
        assert_eq!(info.voter_count, 2);
        assert_eq!(info.default_vault, compute_vault_pda(&PROGRAM, &info.address, 0));
    }
}
