//! Conflict detection over a transaction batch.
//!
//! Two transactions conflict iff their claimed outpoint sets intersect.
//! The relation is symmetric but not transitive; a committed selection
//! must be pairwise conflict-free.

use std::collections::{HashMap, HashSet};

use crate::types::{OutPoint, Transaction};

/// Whether `a` and `b` claim at least one common outpoint.
pub fn conflicts(a: &Transaction, b: &Transaction) -> bool {
    let claimed: HashSet<&OutPoint> = a.claimed_outpoints().collect();
    b.claimed_outpoints().any(|op| claimed.contains(op))
}

/// Partition a candidate list into conflict-free and contested indices.
///
/// A transaction is conflict-free iff it conflicts with none of the
/// others in `txs`. The partition is relative to this list only; the
/// selector recomputes it every pass as candidates are committed or
/// dropped. Both returned index lists preserve the input order.
pub fn partition_conflict_free(txs: &[Transaction]) -> (Vec<usize>, Vec<usize>) {
    let mut claimants: HashMap<&OutPoint, usize> = HashMap::new();
    for tx in txs {
        // Count each transaction once per distinct outpoint it claims.
        let distinct: HashSet<&OutPoint> = tx.claimed_outpoints().collect();
        for op in distinct {
            *claimants.entry(op).or_insert(0) += 1;
        }
    }

    let mut free = Vec::new();
    let mut contested = Vec::new();
    for (i, tx) in txs.iter().enumerate() {
        let shared = tx
            .claimed_outpoints()
            .any(|op| claimants.get(op).copied().unwrap_or(0) > 1);
        if shared {
            contested.push(i);
        } else {
            free.push(i);
        }
    }
    (free, contested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Hash256, TxInput, TxOutput};

    fn outpoint(tag: u8, index: u64) -> OutPoint {
        OutPoint {
            txid: Hash256([tag; 32]),
            index,
        }
    }

    fn tx_claiming(ops: &[OutPoint]) -> Transaction {
        Transaction {
            inputs: ops
                .iter()
                .map(|op| TxInput {
                    claimed: op.clone(),
                    signature: vec![],
                    public_key: vec![],
                })
                .collect(),
            outputs: vec![TxOutput {
                value: 1,
                pubkey_hash: Hash256::ZERO,
            }],
        }
    }

    #[test]
    fn conflicts_on_shared_outpoint() {
        let a = tx_claiming(&[outpoint(0x11, 0), outpoint(0x22, 0)]);
        let b = tx_claiming(&[outpoint(0x22, 0), outpoint(0x33, 0)]);
        assert!(conflicts(&a, &b));
        assert!(conflicts(&b, &a));
    }

    #[test]
    fn no_conflict_on_disjoint_claims() {
        let a = tx_claiming(&[outpoint(0x11, 0)]);
        let b = tx_claiming(&[outpoint(0x11, 1)]);
        assert!(!conflicts(&a, &b));
    }

    #[test]
    fn partition_all_free() {
        let txs = vec![
            tx_claiming(&[outpoint(0x11, 0)]),
            tx_claiming(&[outpoint(0x22, 0)]),
            tx_claiming(&[outpoint(0x33, 0)]),
        ];
        let (free, contested) = partition_conflict_free(&txs);
        assert_eq!(free, vec![0, 1, 2]);
        assert!(contested.is_empty());
    }

    #[test]
    fn partition_conflicting_pair() {
        let txs = vec![
            tx_claiming(&[outpoint(0x11, 0)]),
            tx_claiming(&[outpoint(0x11, 0)]),
        ];
        let (free, contested) = partition_conflict_free(&txs);
        assert!(free.is_empty());
        assert_eq!(contested, vec![0, 1]);
    }

    #[test]
    fn partition_mixed() {
        let txs = vec![
            tx_claiming(&[outpoint(0x11, 0)]),                  // contested with 2
            tx_claiming(&[outpoint(0x22, 0)]),                  // free
            tx_claiming(&[outpoint(0x11, 0), outpoint(0x33, 0)]), // contested with 0
        ];
        let (free, contested) = partition_conflict_free(&txs);
        assert_eq!(free, vec![1]);
        assert_eq!(contested, vec![0, 2]);
    }

    #[test]
    fn partition_is_relative_to_the_list() {
        let a = tx_claiming(&[outpoint(0x11, 0)]);
        let b = tx_claiming(&[outpoint(0x11, 0)]);

        let (free, _) = partition_conflict_free(&[a.clone(), b]);
        assert!(free.is_empty());

        // Alone, the same transaction is conflict-free.
        let (free, contested) = partition_conflict_free(&[a]);
        assert_eq!(free, vec![0]);
        assert!(contested.is_empty());
    }

    #[test]
    fn internal_duplicate_does_not_self_conflict() {
        // A tx claiming the same outpoint twice is invalid, but on its own
        // it is not in conflict with anyone else.
        let txs = vec![tx_claiming(&[outpoint(0x11, 0), outpoint(0x11, 0)])];
        let (free, contested) = partition_conflict_free(&txs);
        assert_eq!(free, vec![0]);
        assert!(contested.is_empty());
    }

    #[test]
    fn partition_empty_list() {
        let (free, contested) = partition_conflict_free(&[]);
        assert!(free.is_empty());
        assert!(contested.is_empty());
    }
}
