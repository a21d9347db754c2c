//! Transaction validation against the unspent output set.
//!
//! Validation is a pure predicate: it never mutates the set and can be
//! re-run against any snapshot, including the hypothetical copies the
//! selector explores. A transaction is acceptable iff:
//!
//! 1. every claimed outpoint exists in the set,
//! 2. no outpoint is claimed by more than one of its inputs,
//! 3. each input's signature verifies against the claimed output's owner,
//! 4. output values are non-negative (guaranteed by u64; summation is
//!    overflow-checked instead),
//! 5. claimed input value covers output value (fee >= 0).
//!
//! Zero-value outputs are admitted. Any fault in signature or key
//! material classifies that one transaction as invalid; it never aborts
//! the batch.

use std::collections::HashSet;

use crate::crypto;
use crate::error::TransactionError;
use crate::ledger::UtxoSet;
use crate::types::Transaction;

/// Summary of a successfully validated transaction.
///
/// Contains the computed fee and value totals for use during selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransaction {
    /// Total value of all claimed inputs in becks.
    pub total_input: u64,
    /// Total value of all created outputs in becks.
    pub total_output: u64,
    /// Transaction fee in becks (`total_input - total_output`).
    pub fee: u64,
}

/// Validate a transaction against the given unspent output set.
///
/// Returns a [`ValidatedTransaction`] with the computed fee on success,
/// or the first rule violation encountered.
pub fn validate_transaction(
    ledger: &UtxoSet,
    tx: &Transaction,
) -> Result<ValidatedTransaction, TransactionError> {
    let mut seen = HashSet::with_capacity(tx.inputs.len());
    let mut total_input: u64 = 0;

    for (i, input) in tx.inputs.iter().enumerate() {
        let claimed = ledger
            .get(&input.claimed)
            .ok_or_else(|| TransactionError::UnknownUtxo(input.claimed.to_string()))?;

        if !seen.insert(&input.claimed) {
            return Err(TransactionError::DuplicateInput(input.claimed.to_string()));
        }

        crypto::verify_input(tx, i, &claimed.pubkey_hash)
            .map_err(|_| TransactionError::InvalidSignature { index: i })?;

        total_input = total_input
            .checked_add(claimed.value)
            .ok_or(TransactionError::ValueOverflow)?;
    }

    let total_output = tx
        .total_output_value()
        .ok_or(TransactionError::ValueOverflow)?;

    if total_input < total_output {
        return Err(TransactionError::InsufficientFunds {
            have: total_input,
            need: total_output,
        });
    }

    Ok(ValidatedTransaction {
        total_input,
        total_output,
        fee: total_input - total_output,
    })
}

/// The boolean acceptance predicate.
pub fn is_valid(ledger: &UtxoSet, tx: &Transaction) -> bool {
    validate_transaction(ledger, tx).is_ok()
}
