//! The unspent output set.
//!
//! [`UtxoSet`] maps outpoints to their claimable outputs. It is the only
//! state the acceptance pipeline mutates: outputs leave the set when a
//! committed transaction claims them and enter it when a committed
//! transaction creates them. `Clone` produces an independent deep copy,
//! which is how the selector isolates tentative branches.

use std::collections::{HashMap, HashSet};
use std::collections::hash_map;

use crate::error::LedgerError;
use crate::types::{AcceptedTransaction, OutPoint, Transaction, TxOutput};

/// Mapping from outpoint to unspent output.
///
/// Invariant: every key present refers to an output not yet consumed by
/// any committed transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UtxoSet {
    utxos: HashMap<OutPoint, TxOutput>,
}

impl UtxoSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    /// Add an unspent output under the given outpoint.
    ///
    /// Returns the previously stored output if the outpoint was already
    /// present.
    pub fn insert(&mut self, outpoint: OutPoint, output: TxOutput) -> Option<TxOutput> {
        self.utxos.insert(outpoint, output)
    }

    /// Remove and return the output at the given outpoint.
    pub fn remove(&mut self, outpoint: &OutPoint) -> Option<TxOutput> {
        self.utxos.remove(outpoint)
    }

    /// Look up an unspent output. Returns `None` if spent or unknown.
    pub fn get(&self, outpoint: &OutPoint) -> Option<&TxOutput> {
        self.utxos.get(outpoint)
    }

    /// Check whether an outpoint is present and unspent.
    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.utxos.contains_key(outpoint)
    }

    /// Number of unspent outputs in the set.
    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    /// Whether the set holds no outputs.
    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Iterate over all unspent outputs.
    pub fn iter(&self) -> hash_map::Iter<'_, OutPoint, TxOutput> {
        self.utxos.iter()
    }

    /// Sum of all unspent output values. Returns None on overflow.
    pub fn total_value(&self) -> Option<u64> {
        self.utxos
            .values()
            .try_fold(0u64, |acc, out| acc.checked_add(out.value))
    }

    /// Commit a transaction: consume every claimed outpoint and create
    /// the transaction's outputs under its finalized identity.
    ///
    /// The commit is atomic. All claims are checked before the first
    /// mutation, so a failing transaction leaves the set untouched.
    ///
    /// Returns the finalized [`AcceptedTransaction`], whose fee is
    /// computed from the claimed values at this moment.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::MissingUtxo`] if a claimed outpoint is absent
    /// - [`LedgerError::DoubleSpend`] if the transaction claims the same
    ///   outpoint twice
    /// - [`LedgerError::ValueOverflow`] if value sums overflow
    /// - [`LedgerError::InsufficientInputValue`] if outputs exceed inputs
    pub fn apply(&mut self, tx: &Transaction) -> Result<AcceptedTransaction, LedgerError> {
        let mut seen = HashSet::with_capacity(tx.inputs.len());
        let mut total_input: u64 = 0;

        for input in &tx.inputs {
            let output = self
                .utxos
                .get(&input.claimed)
                .ok_or_else(|| LedgerError::MissingUtxo(input.claimed.to_string()))?;

            if !seen.insert(&input.claimed) {
                return Err(LedgerError::DoubleSpend(input.claimed.to_string()));
            }

            total_input = total_input
                .checked_add(output.value)
                .ok_or(LedgerError::ValueOverflow)?;
        }

        let total_output = tx
            .total_output_value()
            .ok_or(LedgerError::ValueOverflow)?;

        let fee = total_input
            .checked_sub(total_output)
            .ok_or(LedgerError::InsufficientInputValue {
                have: total_input,
                need: total_output,
            })?;

        let txid = tx.txid();

        for input in &tx.inputs {
            self.utxos.remove(&input.claimed);
        }
        for (index, output) in tx.outputs.iter().enumerate() {
            self.utxos.insert(
                OutPoint {
                    txid,
                    index: index as u64,
                },
                output.clone(),
            );
        }

        Ok(AcceptedTransaction::new(tx.clone(), txid, fee))
    }
}

impl FromIterator<(OutPoint, TxOutput)> for UtxoSet {
    fn from_iter<I: IntoIterator<Item = (OutPoint, TxOutput)>>(iter: I) -> Self {
        Self {
            utxos: iter.into_iter().collect(),
        }
    }
}
