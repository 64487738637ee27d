// Where account data comes from.
//
// Decoding and aggregation only ever read accounts, so the ledger is reached
// through a single lookup method. The RPC implementation talks to a node; the
// in-memory one replays a fixed snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use vault_core::AnchorAccount;

use crate::error::{ClientError, ClientResult};

#[async_trait]
pub trait AccountSource: Send + Sync {
    /// `Ok(None)` when the account does not exist.
    async fn get_account(&self, address: &Pubkey) -> ClientResult<Option<Account>>;
}

pub struct RpcAccountSource {
    client: Arc<RpcClient>,
}

impl RpcAccountSource {
    pub fn new(url: String, commitment: CommitmentConfig) -> Self {
        Self { client: Arc::new(RpcClient::new_with_commitment(url, commitment)) }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

#[async_trait]
impl AccountSource for RpcAccountSource {
    async fn get_account(&self, address: &Pubkey) -> ClientResult<Option<Account>> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await
            .map_err(|e| ClientError::Rpc { address: *address, source: Box::new(e) })?;
        Ok(response.value)
    }
}

/// A fixed set of accounts, e.g. a captured ledger snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountSource {
    accounts: HashMap<Pubkey, Account>,
}

impl MemoryAccountSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: Pubkey, account: Account) -> Option<Account> {
        self.accounts.insert(address, account)
    }

    pub fn remove(&mut self, address: &Pubkey) -> Option<Account> {
        self.accounts.remove(address)
    }
}

#[async_trait]
impl AccountSource for MemoryAccountSource {
    async fn get_account(&self, address: &Pubkey) -> ClientResult<Option<Account>> {
        Ok(self.accounts.get(address).cloned())
    }
}

/// Fetch an Anchor account and decode it. A missing account is an error.
pub async fn fetch_anchor<T, S>(accounts: &S, address: &Pubkey) -> ClientResult<T>
where
    T: AnchorAccount,
    S: AccountSource + ?Sized,
{
    let account = accounts
        .get_account(address)
        .await?
        .ok_or(ClientError::AccountNotFound(*address))?;
    T::try_from_account_data(&account.data)
        .map_err(|source| ClientError::Layout { address: *address, source })
}
