//! Error types for the Beck acceptance core.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("unknown UTXO: {0}")] UnknownUtxo(String),
    #[error("duplicate input: {0}")] DuplicateInput(String),
    #[error("invalid signature on input {index}")] InvalidSignature { index: usize },
    #[error("insufficient funds: have {have}, need {need}")] InsufficientFunds { have: u64, need: u64 },
    #[error("value overflow")] ValueOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("missing UTXO: {0}")] MissingUtxo(String),
    #[error("outpoint claimed twice: {0}")] DoubleSpend(String),
    #[error("insufficient input value: have {have}, need {need}")] InsufficientInputValue { have: u64, need: u64 },
    #[error("value overflow")] ValueOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("invalid signature bytes")] InvalidSignature,
    #[error("signature verification failed")] VerificationFailed,
    #[error("pubkey hash does not match expected")] PubkeyHashMismatch,
    #[error("input index out of bounds: {index} >= {len}")] InputIndexOutOfBounds { index: usize, len: usize },
}

#[derive(Error, Debug)]
pub enum BeckError {
    #[error(transparent)] Transaction(#[from] TransactionError),
    #[error(transparent)] Ledger(#[from] LedgerError),
    #[error(transparent)] Crypto(#[from] CryptoError),
}
