// Presentation records for decoded vault transactions.
//
// Field names follow the transaction shapes the wallet UI already renders
// (camelCase JSON, gateway-style enums).

use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::accounts::RawStatus;
use crate::instruction::{ActionKind, DecodedAction};
use crate::status::{TransactionStatus, map_status};
use crate::token::{TokenInfo, resolve_token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxInfoType {
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferDirection {
    Outgoing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferTokenType {
    #[serde(rename = "NATIVE_COIN")]
    NativeCoin,
    #[serde(rename = "ERC20")]
    Erc20,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressEx {
    pub value: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
}

impl AddressEx {
    fn unnamed(value: String) -> Self {
        Self { value, name: String::new(), logo_uri: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInfo {
    #[serde(rename = "type")]
    pub token_type: TransferTokenType,
    pub token_address: String,
    pub token_name: String,
    pub token_symbol: String,
    pub logo_uri: String,
    pub decimals: u8,
    /// Raw amount in base units
    pub value: String,
    pub trusted: bool,
    pub imitation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxInfo {
    #[serde(rename = "type")]
    pub info_type: TxInfoType,
    pub sender: AddressEx,
    pub recipient: AddressEx,
    pub direction: TransferDirection,
    pub transfer_info: TransferInfo,
    pub human_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    /// Transaction index as a string
    pub id: String,
    /// Milliseconds since the epoch
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_status: Option<TransactionStatus>,
    pub tx_info: TxInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    pub safe_address: String,
    pub tx_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_status: Option<TransactionStatus>,
    pub tx_info: TxInfo,
}

/// Everything the summary builder needs about one transaction.
#[derive(Debug, Clone, Copy)]
pub struct SummaryInput<'a> {
    pub status: RawStatus,
    pub threshold: u16,
    pub approved: usize,
    pub index: u64,
    /// Unix seconds of the last proposal status change
    pub timestamp: i64,
    /// Reported as the transfer sender. This is the vault PDA that signs the
    /// transfer, not the multisig PDA the wallet front-end passed here; the
    /// multisig address goes to `TransactionDetails::safe_address` instead.
    pub vault_address: &'a Pubkey,
    pub action: Option<&'a DecodedAction>,
    pub tokens: &'a [TokenInfo],
}

/// `amount / 10^decimals` for display only.
pub fn format_token_amount(amount: u64, decimals: u8) -> String {
    (amount as f64 / 10f64.powi(decimals as i32)).to_string()
}

/// Build the summary of a decoded transaction; `None` if nothing was decoded.
pub fn build_summary(input: SummaryInput<'_>) -> Option<TransactionSummary> {
    let action = input.action?;
    let tx_status = map_status(input.status, input.threshold, input.approved);
    let token = resolve_token(action, input.tokens);

    // amounts of unknown tokens cannot be scaled reliably
    let human_description = if token.known {
        format!(
            "Transfer {} {} To {}",
            format_token_amount(action.amount, token.info.decimals),
            token.info.symbol,
            action.destination
        )
    } else {
        "-".to_string()
    };

    let token_type = match action.kind {
        ActionKind::SolTransfer => TransferTokenType::NativeCoin,
        ActionKind::TokenTransfer => TransferTokenType::Erc20,
    };

    Some(TransactionSummary {
        id: input.index.to_string(),
        timestamp: input.timestamp.saturating_mul(1000),
        tx_status,
        tx_info: TxInfo {
            info_type: TxInfoType::Transfer,
            sender: AddressEx::unnamed(input.vault_address.to_string()),
            recipient: AddressEx::unnamed(action.destination.to_string()),
            direction: TransferDirection::Outgoing,
            transfer_info: TransferInfo {
                token_type,
                token_address: token.info.address,
                token_name: token.info.name,
                token_symbol: token.info.symbol,
                logo_uri: token.info.logo_uri,
                decimals: token.info.decimals,
                value: action.amount.to_string(),
                trusted: true,
                imitation: false,
            },
            human_description,
        },
    })
}

/// Details view of a summary for the given safe.
pub fn build_details(summary: &TransactionSummary, safe_address: &Pubkey) -> TransactionDetails {
    TransactionDetails {
        safe_address: safe_address.to_string(),
        tx_id: summary.id.clone(),
        tx_status: summary.tx_status,
        tx_info: summary.tx_info.clone(),
    }
}
