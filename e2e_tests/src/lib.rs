//! Ledger fixtures for end-to-end tests.
//!
//! `LedgerBuilder` lays out the accounts a Squads multisig would have on
//! chain (multisig, vault transactions, proposals, token accounts) in a
//! `MemoryAccountSource`, so the full fetch → decode → summarize pipeline
//! runs without a validator.

use solana_sdk::account::Account;
use solana_sdk::program_option::COption;
use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;
use spl_token::instruction::TokenInstruction;
use spl_token::state::{Account as TokenAccount, AccountState};
use vault_client::MemoryAccountSource;
use vault_core::{
    AnchorAccount, CompiledInstruction, Member, Multisig, NATIVE_TOKEN_ADDRESS, Permissions,
    Proposal, ProposalStatus, SQUADS_PROGRAM_ID, TokenInfo, TokenKind, VaultTransaction,
    VaultTransactionMessage, compute_multisig_pda, compute_proposal_pda, compute_transaction_pda,
    compute_vault_pda,
};

const RENT_EXEMPT_TOKEN_ACCOUNT: u64 = 2_039_280;

fn program_owned<T: AnchorAccount>(value: &T, owner: Pubkey) -> Account {
    Account {
        lamports: 5_000_000,
        data: value.to_account_data().expect("anchor account serialization"),
        owner,
        executable: false,
        rent_epoch: 0,
    }
}

/// A vault transaction waiting to be laid out.
pub struct PendingTxn {
    pub message: VaultTransactionMessage,
    pub vault_index: u8,
    pub status: ProposalStatus,
    /// How many members approved
    pub approvals: usize,
    pub rejections: usize,
}

impl PendingTxn {
    pub fn new(message: VaultTransactionMessage, status: ProposalStatus, approvals: usize) -> Self {
        Self { message, vault_index: 0, status, approvals, rejections: 0 }
    }

    pub fn vault(mut self, vault_index: u8) -> Self {
        self.vault_index = vault_index;
        self
    }

    pub fn rejections(mut self, rejections: usize) -> Self {
        self.rejections = rejections;
        self
    }
}

pub struct LedgerBuilder {
    program_id: Pubkey,
    create_key: Pubkey,
    threshold: u16,
    members: Vec<Member>,
    transactions: Vec<PendingTxn>,
    accounts: Vec<(Pubkey, Account)>,
}

impl LedgerBuilder {
    /// Three full-permission members, threshold 2.
    pub fn new(create_key: Pubkey) -> Self {
        let members = (0..3)
            .map(|_| Member { key: Pubkey::new_unique(), permissions: Permissions::all() })
            .collect();
        Self {
            program_id: SQUADS_PROGRAM_ID,
            create_key,
            threshold: 2,
            members,
            transactions: Vec::new(),
            accounts: Vec::new(),
        }
    }

    pub fn program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    pub fn threshold(mut self, threshold: u16) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn member(mut self, key: Pubkey, permissions: Permissions) -> Self {
        self.members.push(Member { key, permissions });
        self
    }

    /// Queue a transaction; indices are assigned in push order starting at 1.
    pub fn transaction(mut self, txn: PendingTxn) -> Self {
        self.transactions.push(txn);
        self
    }

    pub fn token_account(mut self, address: Pubkey, mint: Pubkey, owner: Pubkey) -> Self {
        self.accounts.push((address, token_account(mint, owner, spl_token::ID)));
        self
    }

    pub fn multisig_address(&self) -> Pubkey {
        compute_multisig_pda(&self.program_id, &self.create_key)
    }

    pub fn vault_address(&self, vault_index: u8) -> Pubkey {
        compute_vault_pda(&self.program_id, &self.multisig_address(), vault_index)
    }

    fn voters(&self, skip: usize, count: usize) -> Vec<Pubkey> {
        self.members.iter().skip(skip).take(count).map(|m| m.key).collect()
    }

    pub fn build(self) -> MemoryAccountSource {
        let multisig_pda = self.multisig_address();
        let mut source = MemoryAccountSource::new();

        let multisig = Multisig {
            create_key: self.create_key,
            config_authority: Pubkey::default(),
            threshold: self.threshold,
            time_lock: 0,
            transaction_index: self.transactions.len() as u64,
            stale_transaction_index: 0,
            rent_collector: None,
            bump: 255,
            members: self.members.clone(),
        };
        source.insert(multisig_pda, program_owned(&multisig, self.program_id));

        for (i, txn) in self.transactions.iter().enumerate() {
            let index = i as u64 + 1;
            let creator = self.members.first().map(|m| m.key).unwrap_or_default();
            let transaction = VaultTransaction {
                multisig: multisig_pda,
                creator,
                index,
                bump: 254,
                vault_index: txn.vault_index,
                vault_bump: 253,
                ephemeral_signer_bumps: vec![],
                message: txn.message.clone(),
            };
            let proposal = Proposal {
                multisig: multisig_pda,
                transaction_index: index,
                status: txn.status,
                bump: 252,
                approved: self.voters(0, txn.approvals),
                rejected: self.voters(txn.approvals, txn.rejections),
                cancelled: vec![],
            };
            source.insert(
                compute_transaction_pda(&self.program_id, &multisig_pda, index),
                program_owned(&transaction, self.program_id),
            );
            source.insert(
                compute_proposal_pda(&self.program_id, &multisig_pda, index),
                program_owned(&proposal, self.program_id),
            );
        }

        for (address, account) in self.accounts {
            source.insert(address, account);
        }
        source
    }
}

// ---------------------------------------------------------------------------
// Accounts and messages
// ---------------------------------------------------------------------------

pub fn token_account(mint: Pubkey, owner: Pubkey, program: Pubkey) -> Account {
    let state = TokenAccount {
        mint,
        owner,
        amount: 1_000_000_000,
        delegate: COption::None,
        state: AccountState::Initialized,
        is_native: COption::None,
        delegated_amount: 0,
        close_authority: COption::None,
    };
    let mut data = vec![0u8; TokenAccount::LEN];
    TokenAccount::pack(state, &mut data).expect("token account pack");
    Account {
        lamports: RENT_EXEMPT_TOKEN_ACCOUNT,
        data,
        owner: program,
        executable: false,
        rent_epoch: 0,
    }
}

/// `vault` sends `lamports` to `to` through the System Program.
pub fn native_transfer_message(
    vault: Pubkey,
    to: Pubkey,
    lamports: u64,
) -> VaultTransactionMessage {
    let mut data = 2u32.to_le_bytes().to_vec();
    data.extend_from_slice(&lamports.to_le_bytes());
    VaultTransactionMessage {
        num_signers: 1,
        num_writable_signers: 1,
        num_writable_non_signers: 1,
        account_keys: vec![vault, to, system_program::ID],
        instructions: vec![CompiledInstruction {
            program_id_index: 2,
            account_indexes: vec![0, 1],
            data,
        }],
        address_table_lookups: vec![],
    }
}

/// SPL Token `Transfer` of `amount` from `source` to `destination`,
/// authorized by `vault`.
pub fn token_transfer_message(
    vault: Pubkey,
    source: Pubkey,
    destination: Pubkey,
    amount: u64,
) -> VaultTransactionMessage {
    VaultTransactionMessage {
        num_signers: 1,
        num_writable_signers: 1,
        num_writable_non_signers: 2,
        account_keys: vec![vault, source, destination, spl_token::ID],
        instructions: vec![CompiledInstruction {
            program_id_index: 3,
            account_indexes: vec![1, 2, 0],
            data: TokenInstruction::Transfer { amount }.pack(),
        }],
        address_table_lookups: vec![],
    }
}

/// SPL Token `TransferChecked`; the mint sits between source and destination.
pub fn token_transfer_checked_message(
    vault: Pubkey,
    source: Pubkey,
    mint: Pubkey,
    destination: Pubkey,
    amount: u64,
    decimals: u8,
) -> VaultTransactionMessage {
    VaultTransactionMessage {
        num_signers: 1,
        num_writable_signers: 1,
        num_writable_non_signers: 2,
        account_keys: vec![vault, source, destination, mint, spl_token::ID],
        instructions: vec![CompiledInstruction {
            program_id_index: 4,
            account_indexes: vec![1, 3, 2, 0],
            data: TokenInstruction::TransferChecked { amount, decimals }.pack(),
        }],
        address_table_lookups: vec![],
    }
}

/// A message that invokes some unrelated program.
pub fn opaque_message(vault: Pubkey) -> VaultTransactionMessage {
    let program = Pubkey::new_unique();
    VaultTransactionMessage {
        num_signers: 1,
        num_writable_signers: 1,
        num_writable_non_signers: 0,
        account_keys: vec![vault, program],
        instructions: vec![CompiledInstruction {
            program_id_index: 1,
            account_indexes: vec![0],
            data: vec![0xf8, 0xc6, 0x9e, 0x91, 0xe1, 0x75, 0x87, 0xc8],
        }],
        address_table_lookups: vec![],
    }
}

// ---------------------------------------------------------------------------
// Token list
// ---------------------------------------------------------------------------

pub fn sol_token() -> TokenInfo {
    TokenInfo {
        kind: TokenKind::NativeToken,
        address: NATIVE_TOKEN_ADDRESS.to_string(),
        decimals: 9,
        symbol: "SOL".to_string(),
        name: "Solana".to_string(),
        logo_uri: "https://tokens.example/sol.png".to_string(),
    }
}

pub fn spl_token_info(mint: &Pubkey, symbol: &str, decimals: u8) -> TokenInfo {
    TokenInfo {
        kind: TokenKind::Token,
        address: mint.to_string(),
        decimals,
        symbol: symbol.to_string(),
        name: format!("{} Token", symbol),
        logo_uri: String::new(),
    }
}
