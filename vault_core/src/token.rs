use serde::{Deserialize, Serialize};

use crate::instruction::{ActionKind, DecodedAction};

/// Address the token list uses for the chain's native currency.
pub const NATIVE_TOKEN_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

const UNKNOWN_TOKEN: &str = "Unknown Token";
const UNKNOWN_TOKEN_DECIMALS: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Token,
    Nft,
    NativeToken,
}

/// Token list entry, in the shape served by the portfolio `/tokens` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub address: String,
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub logo_uri: String,
}

/// Outcome of a token lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub info: TokenInfo,
    /// `false` when `info` is a synthesized placeholder
    pub known: bool,
}

impl ResolvedToken {
    fn placeholder(address: String) -> Self {
        Self {
            info: TokenInfo {
                kind: TokenKind::Token,
                address,
                decimals: UNKNOWN_TOKEN_DECIMALS,
                symbol: UNKNOWN_TOKEN.to_string(),
                name: UNKNOWN_TOKEN.to_string(),
                logo_uri: String::new(),
            },
            known: false,
        }
    }
}

/// Find the token list entry describing what `action` moves.
///
/// Never fails: an unmatched action gets a 9-decimal "Unknown Token"
/// placeholder addressed by the action's mint.
pub fn resolve_token(action: &DecodedAction, tokens: &[TokenInfo]) -> ResolvedToken {
    let wanted = match (action.kind, action.token_mint) {
        (ActionKind::TokenTransfer, Some(mint)) => mint.to_string(),
        _ => NATIVE_TOKEN_ADDRESS.to_string(),
    };

    match tokens.iter().find(|t| t.address == wanted) {
        Some(info) => ResolvedToken { info: info.clone(), known: true },
        None => ResolvedToken::placeholder(wanted),
    }
}
