// vault_core — account layouts, PDA helpers and pure decoding logic for
// Squads v4 vault transactions.
//
// Nothing in this crate performs I/O. Account lookups needed while decoding
// token transfers live in `vault_client`; this crate only parses bytes that
// have already been fetched.

pub mod accounts;
pub mod instruction;
pub mod pda;
pub mod status;
pub mod summary;
pub mod token;

pub use accounts::{
    AddressTableLookup, AnchorAccount, CompiledInstruction, LayoutError, Member, Multisig,
    Permissions, Proposal, ProposalStatus, RawStatus, VaultTransaction, VaultTransactionMessage,
};
pub use instruction::{
    ActionKind, DecodeError, DecodedAction, TOKEN_2022_PROGRAM_ID, TokenAccount, TokenTransfer,
    first_native_transfer, parse_native_transfer, parse_token_transfer, unpack_token_account,
};
pub use pda::{
    SQUADS_PROGRAM_ID, compute_multisig_pda, compute_proposal_pda, compute_transaction_pda,
    compute_vault_pda,
};
pub use status::{TransactionStatus, map_status};
pub use summary::{
    SummaryInput, TransactionDetails, TransactionSummary, TransferDirection, TransferInfo,
    TransferTokenType, TxInfo, TxInfoType, AddressEx, build_details, build_summary,
    format_token_amount,
};
pub use token::{NATIVE_TOKEN_ADDRESS, ResolvedToken, TokenInfo, TokenKind, resolve_token};

/// Serde helper for u64 amounts carried as decimal strings in JSON.
pub mod u64_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Serde helper that renders a `Pubkey` as its base58 string.
pub mod pubkey_string {
    use serde::{Deserialize, Deserializer, Serializer};
    use solana_program::pubkey::Pubkey;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(key: &Pubkey, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&key.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Pubkey, D::Error> {
        let s = String::deserialize(d)?;
        Pubkey::from_str(&s).map_err(serde::de::Error::custom)
    }

    /// Same as the parent module, for `Option<Pubkey>`.
    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(key: &Option<Pubkey>, s: S) -> Result<S::Ok, S::Error> {
            match key {
                Some(k) => s.serialize_some(&k.to_string()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Pubkey>, D::Error> {
            let s = Option::<String>::deserialize(d)?;
            s.map(|s| Pubkey::from_str(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
