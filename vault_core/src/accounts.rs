// Squads v4 account layouts.
//
// Every account body is an 8-byte Anchor discriminator followed by the Borsh
// encoding of the struct. Accounts are allocated with slack, so anything left
// after the last field is ignored.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use solana_program::pubkey::Pubkey;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("{account} account data too short ({len} bytes)")]
    TooShort { account: &'static str, len: usize },

    #[error("account data is not a {account} account (discriminator mismatch)")]
    DiscriminatorMismatch { account: &'static str },

    #[error("failed to deserialize {account} account: {source}")]
    Borsh {
        account: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// An Anchor account: discriminator-prefixed Borsh data.
pub trait AnchorAccount: BorshSerialize + BorshDeserialize + Sized {
    /// Struct name as declared in the on-chain program.
    const NAME: &'static str;

    /// First 8 bytes of `sha256("account:<NAME>")`.
    fn discriminator() -> [u8; 8] {
        let digest = Sha256::digest(format!("account:{}", Self::NAME).as_bytes());
        let mut out = [0u8; 8];
        out.copy_from_slice(&digest[..8]);
        out
    }

    fn try_from_account_data(data: &[u8]) -> Result<Self, LayoutError> {
        if data.len() < 8 {
            return Err(LayoutError::TooShort { account: Self::NAME, len: data.len() });
        }
        let (disc, mut body) = data.split_at(8);
        if disc != Self::discriminator().as_slice() {
            return Err(LayoutError::DiscriminatorMismatch { account: Self::NAME });
        }
        Self::deserialize(&mut body).map_err(|source| LayoutError::Borsh {
            account: Self::NAME,
            source,
        })
    }

    /// Encode as account data (discriminator + body).
    fn to_account_data(&self) -> std::io::Result<Vec<u8>> {
        let mut out = Self::discriminator().to_vec();
        self.serialize(&mut out)?;
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Multisig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Permissions {
    pub mask: u8,
}

impl Permissions {
    pub const INITIATE: u8 = 1 << 0;
    pub const VOTE: u8 = 1 << 1;
    pub const EXECUTE: u8 = 1 << 2;

    pub fn all() -> Self {
        Self { mask: Self::INITIATE | Self::VOTE | Self::EXECUTE }
    }

    pub fn has(&self, permission: u8) -> bool {
        self.mask & permission == permission
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Member {
    pub key: Pubkey,
    pub permissions: Permissions,
}

#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct Multisig {
    /// Key used to derive this multisig's PDA
    pub create_key: Pubkey,
    /// `Pubkey::default()` when the multisig is autonomous
    pub config_authority: Pubkey,
    pub threshold: u16,
    pub time_lock: u32,
    /// Highest transaction index assigned so far (1-based)
    pub transaction_index: u64,
    pub stale_transaction_index: u64,
    pub rent_collector: Option<Pubkey>,
    pub bump: u8,
    pub members: Vec<Member>,
}

impl AnchorAccount for Multisig {
    const NAME: &'static str = "Multisig";
}

impl Multisig {
    /// Members allowed to vote on proposals.
    pub fn voters(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.permissions.has(Permissions::VOTE))
    }
}

// ---------------------------------------------------------------------------
// Vault transaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    /// Indices into the message's `account_keys`
    pub account_indexes: Vec<u8>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct AddressTableLookup {
    pub account_key: Pubkey,
    pub writable_indexes: Vec<u8>,
    pub readonly_indexes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct VaultTransactionMessage {
    pub num_signers: u8,
    pub num_writable_signers: u8,
    pub num_writable_non_signers: u8,
    pub account_keys: Vec<Pubkey>,
    pub instructions: Vec<CompiledInstruction>,
    pub address_table_lookups: Vec<AddressTableLookup>,
}

impl VaultTransactionMessage {
    /// Program invoked by `ix`, if its index is inside the static key table.
    pub fn program_id(&self, ix: &CompiledInstruction) -> Option<&Pubkey> {
        self.account_keys.get(ix.program_id_index as usize)
    }

    /// The `position`-th account referenced by `ix`.
    pub fn account(&self, ix: &CompiledInstruction, position: usize) -> Option<&Pubkey> {
        let index = *ix.account_indexes.get(position)?;
        self.account_keys.get(index as usize)
    }
}

#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct VaultTransaction {
    pub multisig: Pubkey,
    pub creator: Pubkey,
    pub index: u64,
    pub bump: u8,
    /// Which vault of the multisig signs this transaction
    pub vault_index: u8,
    pub vault_bump: u8,
    pub ephemeral_signer_bumps: Vec<u8>,
    pub message: VaultTransactionMessage,
}

impl AnchorAccount for VaultTransaction {
    const NAME: &'static str = "VaultTransaction";
}

// ---------------------------------------------------------------------------
// Proposal
// ---------------------------------------------------------------------------

/// On-chain proposal status. Timestamps are unix seconds of the last change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum ProposalStatus {
    Draft { timestamp: i64 },
    Active { timestamp: i64 },
    Rejected { timestamp: i64 },
    Approved { timestamp: i64 },
    /// Deprecated by the program; carries no timestamp
    Executing,
    Executed { timestamp: i64 },
    Cancelled { timestamp: i64 },
}

/// Status tag without payload, as reported in vault transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawStatus {
    Draft,
    Active,
    Rejected,
    Approved,
    Executing,
    Executed,
    Cancelled,
}

impl RawStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RawStatus::Draft => "Draft",
            RawStatus::Active => "Active",
            RawStatus::Rejected => "Rejected",
            RawStatus::Approved => "Approved",
            RawStatus::Executing => "Executing",
            RawStatus::Executed => "Executed",
            RawStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for RawStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RawStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(RawStatus::Draft),
            "active" => Ok(RawStatus::Active),
            "rejected" => Ok(RawStatus::Rejected),
            "approved" => Ok(RawStatus::Approved),
            "executing" => Ok(RawStatus::Executing),
            "executed" => Ok(RawStatus::Executed),
            "cancelled" => Ok(RawStatus::Cancelled),
            other => Err(format!("unknown proposal status '{}'", other)),
        }
    }
}

impl ProposalStatus {
    pub fn tag(&self) -> RawStatus {
        match self {
            ProposalStatus::Draft { .. } => RawStatus::Draft,
            ProposalStatus::Active { .. } => RawStatus::Active,
            ProposalStatus::Rejected { .. } => RawStatus::Rejected,
            ProposalStatus::Approved { .. } => RawStatus::Approved,
            ProposalStatus::Executing => RawStatus::Executing,
            ProposalStatus::Executed { .. } => RawStatus::Executed,
            ProposalStatus::Cancelled { .. } => RawStatus::Cancelled,
        }
    }

    /// Unix seconds of the last status change; `0` for `Executing`.
    pub fn timestamp(&self) -> i64 {
        match *self {
            ProposalStatus::Draft { timestamp }
            | ProposalStatus::Active { timestamp }
            | ProposalStatus::Rejected { timestamp }
            | ProposalStatus::Approved { timestamp }
            | ProposalStatus::Executed { timestamp }
            | ProposalStatus::Cancelled { timestamp } => timestamp,
            ProposalStatus::Executing => 0,
        }
    }
}

#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct Proposal {
    pub multisig: Pubkey,
    pub transaction_index: u64,
    pub status: ProposalStatus,
    pub bump: u8,
    pub approved: Vec<Pubkey>,
    pub rejected: Vec<Pubkey>,
    pub cancelled: Vec<Pubkey>,
}

impl AnchorAccount for Proposal {
    const NAME: &'static str = "Proposal";
}
