// vault_client — reads Squads vault transactions through an account source
// (RPC node or in-memory snapshot) and turns them into summarized records.

pub mod aggregate;
pub mod decode;
pub mod error;
pub mod select;
pub mod source;
pub mod token_list;

pub use aggregate::{
    MemberInfo, MultisigInfo, TxnType, VaultContext, VaultTxnRecord, fetch_multisig_info,
    fetch_vault_txn, get_vault_txns, load_multisig, sort_newest_first,
};
pub use decode::{TRANSFER_PASSES, TransferPass, decode_vault_transaction, first_token_transfer};
pub use error::{ClientError, ClientResult};
pub use select::{by_status, history, queued};
pub use source::{AccountSource, MemoryAccountSource, RpcAccountSource, fetch_anchor};
pub use token_list::load_token_list;
