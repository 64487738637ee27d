// Turns a vault transaction message into at most one transfer action.
//
// Policy: first transfer wins. Passes run in `TRANSFER_PASSES` order, each pass
// walks the instructions in order and stops at the first instruction it can
// decode. Batched transfers therefore surface only their first transfer.

use solana_sdk::pubkey::Pubkey;
use tracing::debug;
use vault_core::{
    CompiledInstruction, DecodeError, DecodedAction, TokenAccount, VaultTransactionMessage,
    first_native_transfer, parse_token_transfer, unpack_token_account,
};

use crate::error::ClientError;
use crate::source::AccountSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPass {
    /// SPL Token / Token-2022 transfers, resolved through their token accounts
    Token,
    /// System Program lamport transfers
    Native,
}

pub const TRANSFER_PASSES: [TransferPass; 2] = [TransferPass::Token, TransferPass::Native];

/// Why a single instruction was skipped during the token pass.
#[derive(Debug, thiserror::Error)]
enum SkipReason {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Lookup(#[from] ClientError),
}

/// Decode `message` into a transfer. `None` means no instruction matched.
pub async fn decode_vault_transaction<S>(
    message: &VaultTransactionMessage,
    accounts: &S,
) -> Option<DecodedAction>
where
    S: AccountSource + ?Sized,
{
    for pass in TRANSFER_PASSES {
        let action = match pass {
            TransferPass::Token => first_token_transfer(message, accounts).await,
            TransferPass::Native => first_native_transfer(message),
        };
        if action.is_some() {
            return action;
        }
    }
    None
}

/// First instruction that decodes as a token transfer whose token accounts
/// can be loaded.
pub async fn first_token_transfer<S>(
    message: &VaultTransactionMessage,
    accounts: &S,
) -> Option<DecodedAction>
where
    S: AccountSource + ?Sized,
{
    for (position, ix) in message.instructions.iter().enumerate() {
        match token_transfer(message, ix, accounts).await {
            Ok(action) => return Some(action),
            Err(reason) => debug!(instruction = position, "skipping for token pass: {}", reason),
        }
    }
    None
}

async fn token_transfer<S>(
    message: &VaultTransactionMessage,
    ix: &CompiledInstruction,
    accounts: &S,
) -> Result<DecodedAction, SkipReason>
where
    S: AccountSource + ?Sized,
{
    let transfer = parse_token_transfer(message, ix)?;
    let source = load_token_account(accounts, &transfer.program_id, &transfer.source).await?;
    let destination =
        load_token_account(accounts, &transfer.program_id, &transfer.destination).await?;

    Ok(DecodedAction::token_transfer(transfer.amount, destination.owner, source.mint))
}

async fn load_token_account<S>(
    accounts: &S,
    program_id: &Pubkey,
    address: &Pubkey,
) -> Result<TokenAccount, SkipReason>
where
    S: AccountSource + ?Sized,
{
    let account = accounts
        .get_account(address)
        .await?
        .ok_or(ClientError::AccountNotFound(*address))?;
    Ok(unpack_token_account(program_id, address, &account.owner, &account.data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryAccountSource;
    use solana_sdk::account::Account;
    use solana_sdk::program_option::COption;
    use solana_sdk::program_pack::Pack;
    use solana_sdk::system_program;
    use spl_token::instruction::TokenInstruction;
    use spl_token::state::AccountState;
    use vault_core::{ActionKind, TOKEN_2022_PROGRAM_ID};

    fn key(b: u8) -> Pubkey {
        Pubkey::new_from_array([b; 32])
    }

    const VAULT: u8 = 1;
    const RECIPIENT: u8 = 2;
    const SRC_ATA: u8 = 5;
    const DST_ATA: u8 = 6;
    const MINT: u8 = 7;
    const DST_OWNER: u8 = 8;

    fn message(instructions: Vec<CompiledInstruction>) -> VaultTransactionMessage {
        message_for(spl_token::ID, instructions)
    }

    // keys: [vault, recipient, system, token program, src ata, dst ata]
    fn message_for(
        token_program: Pubkey,
        instructions: Vec<CompiledInstruction>,
    ) -> VaultTransactionMessage {
        VaultTransactionMessage {
            num_signers: 1,
            num_writable_signers: 1,
            num_writable_non_signers: 3,
            account_keys: vec![
                key(VAULT),
                key(RECIPIENT),
                system_program::ID,
                token_program,
                key(SRC_ATA),
                key(DST_ATA),
            ],
            instructions,
            address_table_lookups: vec![],
        }
    }

    fn sol_ix(lamports: u64) -> CompiledInstruction {
        let mut data = 2u32.to_le_bytes().to_vec();
        data.extend_from_slice(&lamports.to_le_bytes());
        CompiledInstruction { program_id_index: 2, account_indexes: vec![0, 1], data }
    }

    fn token_ix(amount: u64) -> CompiledInstruction {
        CompiledInstruction {
            program_id_index: 3,
            account_indexes: vec![4, 5, 0],
            data: TokenInstruction::Transfer { amount }.pack(),
        }
    }

    fn token_account(mint: Pubkey, owner: Pubkey, program: Pubkey) -> Account {
        let state = TokenAccount {
            mint,
            owner,
            amount: 10,
            delegate: COption::None,
            state: AccountState::Initialized,
            is_native: COption::None,
            delegated_amount: 0,
            close_authority: COption::None,
        };
        let mut data = vec![0u8; TokenAccount::LEN];
        TokenAccount::pack(state, &mut data).unwrap();
        Account { lamports: 2_039_280, data, owner: program, executable: false, rent_epoch: 0 }
    }

    /// Token-2022 layout: base account followed by the account type byte and
    /// extension data.
    fn token_2022_account(mint: Pubkey, owner: Pubkey) -> Account {
        let mut account = token_account(mint, owner, TOKEN_2022_PROGRAM_ID);
        account.data.extend_from_slice(&[2u8, 0, 0, 0, 0, 0]);
        account
    }

    fn ledger_with_token_accounts() -> MemoryAccountSource {
        let mut ledger = MemoryAccountSource::new();
        ledger.insert(key(SRC_ATA), token_account(key(MINT), key(VAULT), spl_token::ID));
        ledger.insert(key(DST_ATA), token_account(key(MINT), key(DST_OWNER), spl_token::ID));
        ledger
    }

    #[tokio::test]
    async fn test_token_transfer_resolves_owner_and_mint() {
        let ledger = ledger_with_token_accounts();
        let msg = message(vec![token_ix(500_000)]);

        let action = decode_vault_transaction(&msg, &ledger).await.unwrap();
        assert_eq!(action.kind, ActionKind::TokenTransfer);
        assert_eq!(action.amount, 500_000);
        assert_eq!(action.destination, key(DST_OWNER));
        assert_eq!(action.token_mint, Some(key(MINT)));
    }

    #[tokio::test]
    async fn test_token_pass_wins_over_earlier_native_transfer() {
        let ledger = ledger_with_token_accounts();
        let msg = message(vec![sol_ix(1), token_ix(3)]);

        let action = decode_vault_transaction(&msg, &ledger).await.unwrap();
        assert_eq!(action.kind, ActionKind::TokenTransfer);
        assert_eq!(action.amount, 3);
    }

    #[tokio::test]
    async fn test_missing_token_account_falls_back_to_native() {
        let mut ledger = ledger_with_token_accounts();
        ledger.remove(&key(DST_ATA));
        let msg = message(vec![token_ix(3), sol_ix(1_000)]);

        let action = decode_vault_transaction(&msg, &ledger).await.unwrap();
        assert_eq!(action, DecodedAction::sol_transfer(1_000, key(RECIPIENT)));
    }

    #[tokio::test]
    async fn test_foreign_owned_token_account_skipped() {
        let mut ledger = ledger_with_token_accounts();
        ledger.insert(key(SRC_ATA), token_account(key(MINT), key(VAULT), system_program::ID));
        let msg = message(vec![token_ix(3)]);

        assert!(decode_vault_transaction(&msg, &ledger).await.is_none());
    }

    #[tokio::test]
    async fn test_first_of_several_native_transfers() {
        let ledger = MemoryAccountSource::new();
        let msg = message(vec![sol_ix(11), sol_ix(22)]);

        let action = decode_vault_transaction(&msg, &ledger).await.unwrap();
        assert_eq!(action.amount, 11);
    }

    #[tokio::test]
    async fn test_undecodable_message() {
        let ledger = ledger_with_token_accounts();
        let msg = message(vec![CompiledInstruction {
            program_id_index: 0,
            account_indexes: vec![1],
            data: vec![0xde, 0xad, 0xbe, 0xef],
        }]);
        assert!(decode_vault_transaction(&msg, &ledger).await.is_none());
        assert!(decode_vault_transaction(&message(vec![]), &ledger).await.is_none());
    }

    #[tokio::test]
    async fn test_token_2022_transfer_checked_decodes() {
        let mut ledger = MemoryAccountSource::new();
        ledger.insert(key(SRC_ATA), token_2022_account(key(MINT), key(VAULT)));
        ledger.insert(key(DST_ATA), token_2022_account(key(MINT), key(DST_OWNER)));
        // mint sits at position 1; reuse the recipient slot for it
        let ix = CompiledInstruction {
            program_id_index: 3,
            account_indexes: vec![4, 1, 5, 0],
            data: TokenInstruction::TransferChecked { amount: 2_500_000, decimals: 6 }.pack(),
        };
        let msg = message_for(TOKEN_2022_PROGRAM_ID, vec![ix]);

        let action = decode_vault_transaction(&msg, &ledger).await.unwrap();
        assert_eq!(action, DecodedAction::token_transfer(2_500_000, key(DST_OWNER), key(MINT)));
    }

    #[tokio::test]
    async fn test_token_2022_transfer_with_spl_owned_accounts_skipped() {
        let ledger = ledger_with_token_accounts();
        let msg = message_for(TOKEN_2022_PROGRAM_ID, vec![token_ix(3)]);

        let reason = token_transfer(&msg, &msg.instructions[0], &ledger).await.unwrap_err();
        assert!(matches!(
            reason,
            SkipReason::Decode(DecodeError::WrongOwner { owner, expected, .. })
                if owner == spl_token::ID && expected == TOKEN_2022_PROGRAM_ID
        ));
        assert!(decode_vault_transaction(&msg, &ledger).await.is_none());
    }

    #[tokio::test]
    async fn test_native_amount_extremes() {
        let ledger = MemoryAccountSource::new();
        for lamports in [0, u64::MAX] {
            let msg = message(vec![sol_ix(lamports)]);
            let action = decode_vault_transaction(&msg, &ledger).await.unwrap();
            assert_eq!(action, DecodedAction::sol_transfer(lamports, key(RECIPIENT)));
        }
    }

    #[tokio::test]
    async fn test_native_payload_length_boundary() {
        let ledger = MemoryAccountSource::new();
        let exact = sol_ix(7);
        assert_eq!(exact.data.len(), 12);
        let mut short = exact.clone();
        short.data.truncate(11);

        let action = decode_vault_transaction(&message(vec![exact]), &ledger).await.unwrap();
        assert_eq!(action.amount, 7);
        assert!(decode_vault_transaction(&message(vec![short]), &ledger).await.is_none());
    }
}
