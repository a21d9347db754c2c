//! Public acceptance surface.
//!
//! [`Acceptor`] owns the unspent output set and runs the selector over
//! submitted batches. It is single-threaded and synchronous; wrap it in
//! a lock if concurrent access is needed.

use tracing::debug;

use crate::ledger::UtxoSet;
use crate::selector::{self, Selection};
use crate::types::{AcceptedTransaction, Transaction};
use crate::validation;

/// The transaction acceptance engine.
///
/// Holds a private deep copy of the initial snapshot; the caller's set
/// is never touched. Every [`handle`](Acceptor::handle) call mutates the
/// internal set with the accepted transactions' effects.
pub struct Acceptor {
    ledger: UtxoSet,
}

impl Acceptor {
    /// Create an acceptor over a private deep copy of `snapshot`.
    pub fn new(snapshot: &UtxoSet) -> Self {
        Self {
            ledger: snapshot.clone(),
        }
    }

    /// The current internal unspent output set.
    pub fn ledger(&self) -> &UtxoSet {
        &self.ledger
    }

    /// Whether `tx` is acceptable against the internal set right now.
    pub fn is_valid(&self, tx: &Transaction) -> bool {
        validation::is_valid(&self.ledger, tx)
    }

    /// Accept a batch of proposed transactions.
    ///
    /// Runs the fee-maximizing selector once against the internal set,
    /// mutating it, and returns the accepted transactions in the order
    /// they were committed (not necessarily the caller's order).
    ///
    /// An empty batch yields an empty result and leaves the set
    /// untouched; that is the one consistent policy for absent input.
    pub fn handle(&mut self, batch: &[Transaction]) -> Vec<AcceptedTransaction> {
        if batch.is_empty() {
            return Vec::new();
        }
        let Selection {
            accepted,
            total_fee,
        } = selector::select_max_fee(&mut self.ledger, batch);
        debug!(
            "handled batch: accepted {} of {}, total fee {total_fee}",
            accepted.len(),
            batch.len()
        );
        accepted
    }

    /// Accept a batch using the greedy heuristic
    /// ([`selector::select_greedy`]).
    ///
    /// Faster than [`handle`](Acceptor::handle) but **not fee-maximal**;
    /// callers relying on maximality must not use this variant.
    pub fn handle_greedy(&mut self, batch: &[Transaction]) -> Vec<AcceptedTransaction> {
        if batch.is_empty() {
            return Vec::new();
        }
        selector::select_greedy(&mut self.ledger, batch).accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::COIN;
    use crate::crypto::{self, KeyPair};
    use crate::types::{Hash256, OutPoint, TxInput, TxOutput};

    fn keypair(seed: u8) -> KeyPair {
        KeyPair::from_secret_bytes([seed; 32])
    }

    fn outpoint(tag: u8, index: u64) -> OutPoint {
        OutPoint {
            txid: Hash256([tag; 32]),
            index,
        }
    }

    fn signed_tx(claims: &[(OutPoint, &KeyPair)], outputs: &[(u64, Hash256)]) -> Transaction {
        let mut tx = Transaction {
            inputs: claims
                .iter()
                .map(|(op, _)| TxInput {
                    claimed: op.clone(),
                    signature: vec![],
                    public_key: vec![],
                })
                .collect(),
            outputs: outputs
                .iter()
                .map(|(value, pkh)| TxOutput {
                    value: *value,
                    pubkey_hash: *pkh,
                })
                .collect(),
        };
        for (i, (_, kp)) in claims.iter().enumerate() {
            crypto::sign_input(&mut tx, i, kp).unwrap();
        }
        tx
    }

    fn snapshot(entries: &[(OutPoint, u64, &KeyPair)]) -> UtxoSet {
        entries
            .iter()
            .map(|(op, value, kp)| {
                (
                    op.clone(),
                    TxOutput {
                        value: *value,
                        pubkey_hash: kp.public_key().pubkey_hash(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn new_takes_a_private_copy() {
        let alice = keypair(1);
        let o1 = outpoint(0x11, 0);
        let initial = snapshot(&[(o1.clone(), 10 * COIN, &alice)]);
        let mut acceptor = Acceptor::new(&initial);

        let tx = signed_tx(&[(o1.clone(), &alice)], &[(9 * COIN, Hash256([0xB0; 32]))]);
        let accepted = acceptor.handle(&[tx]);

        assert_eq!(accepted.len(), 1);
        // The caller's snapshot is untouched; only the internal set moved.
        assert!(initial.contains(&o1));
        assert!(!acceptor.ledger().contains(&o1));
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let alice = keypair(1);
        let initial = snapshot(&[(outpoint(0x11, 0), 10 * COIN, &alice)]);
        let mut acceptor = Acceptor::new(&initial);

        assert!(acceptor.handle(&[]).is_empty());
        assert_eq!(acceptor.ledger(), &initial);
    }

    #[test]
    fn is_valid_tracks_the_internal_set() {
        let alice = keypair(1);
        let o1 = outpoint(0x11, 0);
        let initial = snapshot(&[(o1.clone(), 10 * COIN, &alice)]);
        let mut acceptor = Acceptor::new(&initial);

        let tx = signed_tx(&[(o1.clone(), &alice)], &[(9 * COIN, Hash256([0xB0; 32]))]);
        assert!(acceptor.is_valid(&tx));

        acceptor.handle(&[tx.clone()]);

        // O1 is spent now; the same transaction no longer validates.
        assert!(!acceptor.is_valid(&tx));
    }

    #[test]
    fn repeated_handle_cannot_double_spend() {
        let alice = keypair(1);
        let o1 = outpoint(0x11, 0);
        let initial = snapshot(&[(o1.clone(), 10 * COIN, &alice)]);
        let mut acceptor = Acceptor::new(&initial);

        let tx = signed_tx(&[(o1.clone(), &alice)], &[(9 * COIN, Hash256([0xB0; 32]))]);
        assert_eq!(acceptor.handle(&[tx.clone()]).len(), 1);
        assert!(acceptor.handle(&[tx]).is_empty());
    }

    #[test]
    fn handle_returns_commit_order() {
        let alice = keypair(1);
        let bob = keypair(2);
        let o1 = outpoint(0x11, 0);
        let initial = snapshot(&[(o1.clone(), 10 * COIN, &alice)]);
        let mut acceptor = Acceptor::new(&initial);

        // The batch lists the dependent transaction first; commit order
        // has the parent first.
        let parent = signed_tx(
            &[(o1, &alice)],
            &[(9 * COIN, bob.public_key().pubkey_hash())],
        );
        let child = signed_tx(
            &[(OutPoint { txid: parent.txid(), index: 0 }, &bob)],
            &[(8 * COIN, Hash256([0xC0; 32]))],
        );

        let accepted = acceptor.handle(&[child.clone(), parent.clone()]);
        let txids: Vec<_> = accepted.iter().map(|a| a.txid()).collect();
        assert_eq!(txids, vec![parent.txid(), child.txid()]);
    }

    #[test]
    fn handle_greedy_commits_highest_fee_first() {
        let alice = keypair(1);
        let o1 = outpoint(0x11, 0);
        let initial = snapshot(&[(o1.clone(), 10 * COIN, &alice)]);
        let mut acceptor = Acceptor::new(&initial);

        let low = signed_tx(&[(o1.clone(), &alice)], &[(9 * COIN, Hash256([0xB0; 32]))]);
        let high = signed_tx(&[(o1.clone(), &alice)], &[(2 * COIN, Hash256([0xC0; 32]))]);

        let accepted = acceptor.handle_greedy(&[low, high.clone()]);
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].txid(), high.txid());
        assert_eq!(accepted[0].fee(), 8 * COIN);
    }
}
