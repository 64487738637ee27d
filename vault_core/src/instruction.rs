// Binary instruction parsing for vault transaction messages.
//
// Two wire formats are recognized:
// - SPL Token `Transfer` (opcode 3) and `TransferChecked` (opcode 12):
//   u8 opcode, u64 LE amount, [u8 decimals]
// - System Program `Transfer`: u32 LE opcode 2, u64 LE lamports
//
// Token transfers need the token accounts behind source/destination to be
// resolved before they become a `DecodedAction`; that lookup is done by the
// caller (see `vault_client::decode`).

use serde::{Deserialize, Serialize};
use solana_program::program_error::ProgramError;
use solana_program::program_pack::Pack;
use solana_program::pubkey::Pubkey;
use solana_program::system_program;
use spl_token::instruction::TokenInstruction;

use crate::accounts::{CompiledInstruction, VaultTransactionMessage};
use crate::pubkey_string;

/// Base SPL token account state, shared by SPL Token and Token-2022.
pub use spl_token::state::Account as TokenAccount;

pub const TOKEN_2022_PROGRAM_ID: Pubkey =
    solana_program::pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

const SYSTEM_TRANSFER_OPCODE: u32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("program index {0} is outside the account table")]
    ProgramIndexOutOfRange(u8),

    #[error("program {0} is not handled by this parser")]
    UnsupportedProgram(Pubkey),

    #[error("instruction is not a transfer")]
    NotATransfer,

    #[error("instruction data truncated: need {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    #[error("instruction has no account at position {0}")]
    MissingAccount(usize),

    #[error("token instruction codec: {0}")]
    TokenCodec(#[from] ProgramError),

    #[error("account {address} is owned by {owner}, expected {expected}")]
    WrongOwner {
        address: Pubkey,
        owner: Pubkey,
        expected: Pubkey,
    },

    #[error("account {0} is not an initialized token account")]
    InvalidTokenAccount(Pubkey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    SolTransfer,
    TokenTransfer,
}

/// A vault transaction interpreted as a single outgoing transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Raw base units (lamports or token units)
    #[serde(with = "crate::u64_string")]
    pub amount: u64,
    /// Wallet receiving the funds. For token transfers this is the owner of
    /// the destination token account, not the token account itself.
    #[serde(rename = "to", with = "pubkey_string")]
    pub destination: Pubkey,
    /// Mint of the transferred token; `None` for native transfers
    #[serde(
        rename = "programId",
        with = "pubkey_string::option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub token_mint: Option<Pubkey>,
}

impl DecodedAction {
    pub fn sol_transfer(amount: u64, destination: Pubkey) -> Self {
        Self { kind: ActionKind::SolTransfer, amount, destination, token_mint: None }
    }

    pub fn token_transfer(amount: u64, destination: Pubkey, mint: Pubkey) -> Self {
        Self { kind: ActionKind::TokenTransfer, amount, destination, token_mint: Some(mint) }
    }
}

/// A token transfer instruction before its token accounts are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTransfer {
    pub program_id: Pubkey,
    /// Source token account
    pub source: Pubkey,
    /// Destination token account
    pub destination: Pubkey,
    pub amount: u64,
}

pub fn is_token_program(program_id: &Pubkey) -> bool {
    *program_id == spl_token::ID || *program_id == TOKEN_2022_PROGRAM_ID
}

fn instruction_program(
    message: &VaultTransactionMessage,
    ix: &CompiledInstruction,
) -> Result<Pubkey, DecodeError> {
    message
        .program_id(ix)
        .copied()
        .ok_or(DecodeError::ProgramIndexOutOfRange(ix.program_id_index))
}

fn instruction_account(
    message: &VaultTransactionMessage,
    ix: &CompiledInstruction,
    position: usize,
) -> Result<Pubkey, DecodeError> {
    message
        .account(ix, position)
        .copied()
        .ok_or(DecodeError::MissingAccount(position))
}

/// Parse `ix` as an SPL Token (or Token-2022) transfer.
pub fn parse_token_transfer(
    message: &VaultTransactionMessage,
    ix: &CompiledInstruction,
) -> Result<TokenTransfer, DecodeError> {
    let program_id = instruction_program(message, ix)?;
    if !is_token_program(&program_id) {
        return Err(DecodeError::UnsupportedProgram(program_id));
    }

    // TransferChecked puts the mint between source and destination
    let (amount, destination_position) = match TokenInstruction::unpack(&ix.data)? {
        TokenInstruction::Transfer { amount } => (amount, 1),
        TokenInstruction::TransferChecked { amount, .. } => (amount, 2),
        _ => return Err(DecodeError::NotATransfer),
    };

    Ok(TokenTransfer {
        program_id,
        source: instruction_account(message, ix, 0)?,
        destination: instruction_account(message, ix, destination_position)?,
        amount,
    })
}

/// Parse `ix` as a System Program transfer.
pub fn parse_native_transfer(
    message: &VaultTransactionMessage,
    ix: &CompiledInstruction,
) -> Result<DecodedAction, DecodeError> {
    let program_id = instruction_program(message, ix)?;
    if program_id != system_program::ID {
        return Err(DecodeError::UnsupportedProgram(program_id));
    }

    let truncated = DecodeError::Truncated { needed: 12, got: ix.data.len() };
    let Some((opcode, rest)) = ix.data.split_first_chunk::<4>() else {
        return Err(truncated);
    };
    if u32::from_le_bytes(*opcode) != SYSTEM_TRANSFER_OPCODE {
        return Err(DecodeError::NotATransfer);
    }
    let Some(lamports) = rest.first_chunk::<8>() else {
        return Err(truncated);
    };

    Ok(DecodedAction::sol_transfer(
        u64::from_le_bytes(*lamports),
        instruction_account(message, ix, 1)?,
    ))
}

/// First instruction of the message that parses as a native transfer.
pub fn first_native_transfer(message: &VaultTransactionMessage) -> Option<DecodedAction> {
    message
        .instructions
        .iter()
        .find_map(|ix| parse_native_transfer(message, ix).ok())
}

/// Validate and unpack a fetched token account.
///
/// `owner` is the account's owning program; it must match the program that
/// issued the transfer. Token-2022 accounts carry extensions after the base
/// layout, so only the first `Account::LEN` bytes are read.
pub fn unpack_token_account(
    program_id: &Pubkey,
    address: &Pubkey,
    owner: &Pubkey,
    data: &[u8],
) -> Result<TokenAccount, DecodeError> {
    if owner != program_id {
        return Err(DecodeError::WrongOwner {
            address: *address,
            owner: *owner,
            expected: *program_id,
        });
    }
    let base = data
        .get(..TokenAccount::LEN)
        .ok_or(DecodeError::InvalidTokenAccount(*address))?;
    TokenAccount::unpack(base).map_err(|_| DecodeError::InvalidTokenAccount(*address))
}
