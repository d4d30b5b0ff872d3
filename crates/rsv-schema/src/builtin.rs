//! # Built-in API Contracts
//!
//! The four third-party response contracts the wallet consumes, embedded as
//! JSON Schema documents from `schemas/`:
//!
//! | Name                 | Upstream endpoint |
//! |----------------------|-------------------|
//! | `coingecko-price`    | CoinGecko `/simple/price` |
//! | `uniswap-token-list` | Uniswap token list documents |
//! | `0x-swap-price`      | 0x Swap API `/swap/allowance-holder/price` |
//! | `0x-swap-quote`      | 0x Swap API `/swap/allowance-holder/quote` |
//!
//! The quote contract reuses definitions of the price contract by
//! cross-document reference, so the two must be registered together.
//!
//! Schema `$ref` targets must never be renamed without checking every
//! reference across the documents.

use std::fmt;

use serde_json::Value;

use crate::error::SchemaError;

/// One of the embedded contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinSchema {
    CoinGeckoPrice,
    UniswapTokenList,
    ZeroExSwapPrice,
    ZeroExSwapQuote,
}

impl BuiltinSchema {
    /// Every built-in contract, in registration order.
    pub const ALL: [BuiltinSchema; 4] = [
        BuiltinSchema::CoinGeckoPrice,
        BuiltinSchema::UniswapTokenList,
        BuiltinSchema::ZeroExSwapPrice,
        BuiltinSchema::ZeroExSwapQuote,
    ];

    /// Registry name.
    pub fn name(self) -> &'static str {
        match self {
            BuiltinSchema::CoinGeckoPrice => "coingecko-price",
            BuiltinSchema::UniswapTokenList => "uniswap-token-list",
            BuiltinSchema::ZeroExSwapPrice => "0x-swap-price",
            BuiltinSchema::ZeroExSwapQuote => "0x-swap-quote",
        }
    }

    /// Look up a built-in contract by registry name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// The raw JSON Schema text.
    pub fn source(self) -> &'static str {
        match self {
            BuiltinSchema::CoinGeckoPrice => {
                include_str!("../schemas/coingecko-price.schema.json")
            }
            BuiltinSchema::UniswapTokenList => {
                include_str!("../schemas/uniswap-token-list.schema.json")
            }
            BuiltinSchema::ZeroExSwapPrice => include_str!("../schemas/0x-swap-price.schema.json"),
            BuiltinSchema::ZeroExSwapQuote => include_str!("../schemas/0x-swap-quote.schema.json"),
        }
    }

    /// The parsed JSON Schema document.
    ///
    /// # Errors
    ///
    /// Returns `SchemaLoadError` if the embedded text is not valid JSON.
    pub fn document(self) -> Result<Value, SchemaError> {
        serde_json::from_str(self.source()).map_err(|e| SchemaError::SchemaLoadError {
            schema_name: self.name().to_string(),
            reason: format!("invalid JSON: {e}"),
        })
    }
}

impl fmt::Display for BuiltinSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
