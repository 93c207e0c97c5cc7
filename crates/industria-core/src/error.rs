use std::num::ParseFloatError;

use crate::producer::ProducerId;

/// Catalog parse failures. Any of these is fatal to initialization; no
/// partial catalog is ever exposed.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("recipe manifest is missing its UTF-16 byte-order mark")]
    MissingBom,

    #[error("recipe manifest has a truncated UTF-16 code unit")]
    TruncatedUtf16,

    #[error("recipe manifest is not valid UTF-16: {0}")]
    Utf16(#[from] std::string::FromUtf16Error),

    #[error("failed to decode catalog document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no outer \"()\" on value {value:?}")]
    MissingOuterGroup { value: String },

    #[error("empty entry in {list:?}")]
    EmptyEntry { list: String },

    #[error("missing matched parenthesis in {entry:?}")]
    UnbalancedEntry { entry: String },

    #[error("expected a class reference and an amount in {entry:?}")]
    MalformedEntry { entry: String },

    #[error("missing quote decoration on {reference:?}")]
    MissingDecoration { reference: String },

    #[error("unknown item path: {path}")]
    UnknownPath { path: String },

    #[error("expected exactly one dot in {name}")]
    MalformedClassPath { name: String },

    #[error("unknown class name without known prefixes or suffixes: {name}")]
    UnknownClassName { name: String },

    #[error("failed to parse amount {value:?}: {source}")]
    BadAmount {
        value: String,
        source: ParseFloatError,
    },

    #[error("failed to parse manufacturing duration {value:?}: {source}")]
    BadDuration {
        value: String,
        source: ParseFloatError,
    },

    #[error("unknown producer: {value}")]
    UnknownProducerKind { value: String },

    #[error("invalid resource id: {id}")]
    InvalidResourceId { id: String },

    #[error("resource table is empty")]
    EmptyResourceTable,
}

/// Refusals raised while wiring supply relationships. All of these are
/// local: the contract in question is not created and the tick proceeds.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("production rate must be positive")]
    NonPositiveRate,

    #[error("{seller} cannot produce {product}")]
    WrongProduct { seller: String, product: String },

    #[error("{seller} cannot supply {product} at rate {rate}")]
    RateExhausted {
        seller: String,
        product: String,
        rate: f64,
    },

    #[error("{name} cannot produce anything")]
    CannotProduce { name: String },

    #[error("{name} cannot sell anything")]
    CannotSell { name: String },

    #[error("{name} cannot make purchases")]
    CannotBuy { name: String },

    #[error("no producer found for input {product}")]
    NoSellerFor { product: String },

    #[error("unknown producer {0}")]
    UnknownParty(ProducerId),

    #[error("cannot sign contract: {0}")]
    NoCapacity(Box<ContractError>),

    #[error("seller rejected contract: {0}")]
    SellerRejected(Box<ContractError>),

    #[error("buyer rejected contract: {0}")]
    BuyerRejected(Box<ContractError>),
}

/// Migration faults. Logged at error level by the move phase; never fatal.
#[derive(Debug, thiserror::Error)]
pub enum MoveError {
    #[error("producer {0} no longer exists")]
    MissingProducer(ProducerId),
}
