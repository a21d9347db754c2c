//! Core ledger types: outpoints, outputs, transactions.
//!
//! All monetary values are in becks (1 BECK = 10^8 becks) and use u64,
//! so output values cannot be negative by construction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte hash value.
///
/// Used for transaction IDs and pubkey hashes (both BLAKE3).
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The zero hash (32 zero bytes).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a Hash256 from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Reference to a specific output of a source transaction.
///
/// Equality is structural; `OutPoint` is the lookup key of the
/// [`UtxoSet`](crate::ledger::UtxoSet).
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash,
    bincode::Encode, bincode::Decode,
)]
pub struct OutPoint {
    /// Identity of the transaction that created the referenced output.
    pub txid: Hash256,
    /// Index of the output within that transaction.
    pub index: u64,
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.index)
    }
}

/// A transaction input: the outpoint being claimed plus its
/// authorization token.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct TxInput {
    /// The unspent output this input claims.
    pub claimed: OutPoint,
    /// Ed25519 signature (64 bytes) over the input's signing hash.
    pub signature: Vec<u8>,
    /// Ed25519 public key (32 bytes) of the claimed output's owner.
    pub public_key: Vec<u8>,
}

/// A claimable output: value and owner identity.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct TxOutput {
    /// Value in becks.
    pub value: u64,
    /// BLAKE3 hash of the owner's Ed25519 public key.
    pub pubkey_hash: Hash256,
}

/// A transaction transferring value from claimed outputs to new outputs.
///
/// Read-only from the core's perspective: the acceptance pipeline never
/// mutates a submitted transaction, it only classifies and commits it.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct Transaction {
    /// Inputs claiming previously unspent outputs.
    pub inputs: Vec<TxInput>,
    /// New outputs created by this transaction.
    pub outputs: Vec<TxOutput>,
}

impl Transaction {
    /// Compute the transaction's content-derived identity.
    ///
    /// BLAKE3 over an explicit byte layout of all claimed outpoints and
    /// all outputs, little-endian throughout. Signatures and public keys
    /// are excluded, so the identity is stable from the signer's
    /// perspective while still distinguishing otherwise-identical
    /// transactions by what they claim and create.
    pub fn txid(&self) -> Hash256 {
        let mut data = Vec::with_capacity(8 + self.inputs.len() * 40 + 8 + self.outputs.len() * 40);

        data.extend_from_slice(&(self.inputs.len() as u64).to_le_bytes());
        for input in &self.inputs {
            data.extend_from_slice(input.claimed.txid.as_bytes());
            data.extend_from_slice(&input.claimed.index.to_le_bytes());
        }

        data.extend_from_slice(&(self.outputs.len() as u64).to_le_bytes());
        for output in &self.outputs {
            data.extend_from_slice(&output.value.to_le_bytes());
            data.extend_from_slice(output.pubkey_hash.as_bytes());
        }

        Hash256(blake3::hash(&data).into())
    }

    /// Sum of all output values. Returns None on overflow.
    pub fn total_output_value(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.value))
    }

    /// Iterate over the outpoints claimed by this transaction's inputs.
    pub fn claimed_outpoints(&self) -> impl Iterator<Item = &OutPoint> {
        self.inputs.iter().map(|input| &input.claimed)
    }
}

/// A transaction accepted into the ledger, with its finalized identity.
///
/// Produced only by [`UtxoSet::apply`](crate::ledger::UtxoSet::apply) at
/// commit time. Fields are private and there is no mutating API: once a
/// transaction is finalized, its identity and fee are fixed. The carried
/// txid is the key under which the ledger holds the new outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcceptedTransaction {
    tx: Transaction,
    txid: Hash256,
    fee: u64,
}

impl AcceptedTransaction {
    pub(crate) fn new(tx: Transaction, txid: Hash256, fee: u64) -> Self {
        Self { tx, txid, fee }
    }

    /// The accepted transaction's content.
    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    /// The finalized identity.
    pub fn txid(&self) -> Hash256 {
        self.txid
    }

    /// Fee collected at the moment of acceptance, in becks.
    pub fn fee(&self) -> u64 {
        self.fee
    }

    /// Consume the record, returning the transaction content.
    pub fn into_transaction(self) -> Transaction {
        self.tx
    }
}
