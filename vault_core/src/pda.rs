// PDA derivation for Squads v4 accounts.
//
// Seeds mirror the on-chain program:
//   multisig:    ["multisig", "multisig", create_key]
//   transaction: ["multisig", multisig, "transaction", index_le]
//   proposal:    ["multisig", multisig, "transaction", index_le, "proposal"]
//   vault:       ["multisig", multisig, "vault", vault_index]

use solana_program::pubkey::Pubkey;

/// Squads v4 program on mainnet and devnet.
pub const SQUADS_PROGRAM_ID: Pubkey =
    solana_program::pubkey!("SQDS4ep65T869zMMBKyuUq6aD6EgTu8psMjkvj52pCf");

const SEED_PREFIX: &[u8] = b"multisig";
const SEED_MULTISIG: &[u8] = b"multisig";
const SEED_TRANSACTION: &[u8] = b"transaction";
const SEED_PROPOSAL: &[u8] = b"proposal";
const SEED_VAULT: &[u8] = b"vault";

pub fn compute_multisig_pda(program_id: &Pubkey, create_key: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[SEED_PREFIX, SEED_MULTISIG, create_key.as_ref()], program_id).0
}

pub fn compute_transaction_pda(program_id: &Pubkey, multisig: &Pubkey, index: u64) -> Pubkey {
    Pubkey::find_program_address(
        &[SEED_PREFIX, multisig.as_ref(), SEED_TRANSACTION, &index.to_le_bytes()],
        program_id,
    )
    .0
}

pub fn compute_proposal_pda(program_id: &Pubkey, multisig: &Pubkey, index: u64) -> Pubkey {
    Pubkey::find_program_address(
        &[
            SEED_PREFIX,
            multisig.as_ref(),
            SEED_TRANSACTION,
            &index.to_le_bytes(),
            SEED_PROPOSAL,
        ],
        program_id,
    )
    .0
}

pub fn compute_vault_pda(program_id: &Pubkey, multisig: &Pubkey, vault_index: u8) -> Pubkey {
    Pubkey::find_program_address(
        &[SEED_PREFIX, multisig.as_ref(), SEED_VAULT, &[vault_index]],
        program_id,
    )
    .0
}
