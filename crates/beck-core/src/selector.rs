//! Fee-maximizing batch selection.
//!
//! Given an unordered batch, [`select_max_fee`] commits the mutually
//! consistent subset with the highest total fee. Each pass validates the
//! remaining candidates against the current set, commits everything
//! conflict-free outright, and defers contested transactions to a
//! branch-and-explore search over cloned ledgers. Conflict-free
//! partitioning is the practical pruning step; the search itself is
//! exponential in the contested group size in the worst case.
//!
//! Tentative branches operate on independent clones of the [`UtxoSet`],
//! so a rejected branch leaves no trace on the real set or on sibling
//! branches. The search is sequential and deterministic: equal-fee
//! branches resolve to the earliest contested index.
//!
//! [`select_greedy`] is the labeled heuristic alternative; it is not
//! fee-maximal.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::conflict;
use crate::ledger::UtxoSet;
use crate::types::{AcceptedTransaction, Transaction};
use crate::validation;

/// Outcome of one selection run.
#[derive(Clone, Debug)]
pub struct Selection {
    /// Accepted transactions in commit order.
    pub accepted: Vec<AcceptedTransaction>,
    /// Sum of the accepted transactions' fees, each computed at its
    /// commit time.
    pub total_fee: u64,
}

/// Select and commit the fee-maximal mutually consistent subset of
/// `batch`, mutating `ledger` to the committed end state.
///
/// Transactions that never validate are silently dropped; losing sides
/// of a conflict are excluded, not reported as errors. Termination is
/// guaranteed: every recursion strictly shrinks the contested group.
pub fn select_max_fee(ledger: &mut UtxoSet, batch: &[Transaction]) -> Selection {
    debug!(
        "selecting over {} candidates against {} unspent outputs",
        batch.len(),
        ledger.len()
    );
    let solved = solve(ledger.clone(), batch.to_vec(), 0);
    *ledger = solved.ledger;
    debug!(
        "accepted {} transactions, total fee {}",
        solved.accepted.len(),
        solved.total_fee
    );
    Selection {
        accepted: solved.accepted,
        total_fee: solved.total_fee,
    }
}

/// Greedy per-pass heuristic: each pass commits only the single
/// highest-fee currently-valid transaction (ties broken by earliest
/// batch position) and defers all others to the next pass.
///
/// **Not fee-maximal.** A high-fee transaction can consume an output
/// whose alternative spender would have unlocked a more profitable
/// chain. Callers that need the optimal subset must use
/// [`select_max_fee`]; this variant trades that guarantee for
/// polynomial running time.
pub fn select_greedy(ledger: &mut UtxoSet, batch: &[Transaction]) -> Selection {
    let mut candidates = batch.to_vec();
    let mut accepted = Vec::new();
    let mut total_fee = 0u64;

    loop {
        let mut best: Option<(usize, u64)> = None;
        for (i, tx) in candidates.iter().enumerate() {
            if let Ok(validated) = validation::validate_transaction(ledger, tx) {
                if best.is_none_or(|(_, best_fee)| validated.fee > best_fee) {
                    best = Some((i, validated.fee));
                }
            }
        }

        let Some((i, _)) = best else { break };
        let tx = candidates.remove(i);
        match ledger.apply(&tx) {
            Ok(entry) => {
                total_fee = total_fee.saturating_add(entry.fee());
                accepted.push(entry);
            }
            Err(err) => trace!("greedy commit refused ({err})"),
        }
    }

    debug!(
        "greedy run accepted {} transactions, total fee {total_fee}",
        accepted.len()
    );
    Selection { accepted, total_fee }
}

/// One solved subproblem: the resulting set, the acceptances in commit
/// order, and their fee total.
struct Solved {
    ledger: UtxoSet,
    accepted: Vec<AcceptedTransaction>,
    total_fee: u64,
}

fn solve(mut ledger: UtxoSet, mut candidates: Vec<Transaction>, depth: usize) -> Solved {
    let mut accepted = Vec::new();
    let mut total_fee = 0u64;
    let mut contested: Vec<Transaction> = Vec::new();

    // Sweep: validate the remaining candidates, commit every conflict-free
    // valid one, set contested ones aside, and loop over the rest. A
    // commit can make a previously invalid candidate valid by creating
    // the very output it claims, so the invalid remainder is re-examined
    // every pass.
    while !candidates.is_empty() {
        let (valid, rest): (Vec<Transaction>, Vec<Transaction>) = candidates
            .into_iter()
            .partition(|tx| validation::is_valid(&ledger, tx));
        candidates = rest;
        if valid.is_empty() {
            break;
        }

        let (free, clashed) = conflict::partition_conflict_free(&valid);
        trace!(
            "pass at depth {depth}: {} valid, {} conflict-free, {} contested",
            valid.len(),
            free.len(),
            clashed.len()
        );

        let free_set: HashSet<usize> = free.into_iter().collect();
        for (i, tx) in valid.into_iter().enumerate() {
            if free_set.contains(&i) {
                match ledger.apply(&tx) {
                    Ok(entry) => {
                        total_fee = total_fee.saturating_add(entry.fee());
                        accepted.push(entry);
                    }
                    // Unreachable after validation; drop rather than loop.
                    Err(err) => trace!("conflict-free commit refused ({err})"),
                }
            } else {
                contested.push(tx);
            }
        }
    }

    // `candidates` now holds the transactions that never validated.
    if contested.is_empty() {
        return Solved { ledger, accepted, total_fee };
    }

    // A conflict-free commit from a later pass can consume an input a
    // contested candidate needed. Demote those to the leftover pool;
    // deeper recursions still revisit them.
    let (branchable, demoted): (Vec<Transaction>, Vec<Transaction>) = contested
        .into_iter()
        .partition(|tx| validation::is_valid(&ledger, tx));
    let mut leftovers = candidates;
    leftovers.extend(demoted);

    if branchable.is_empty() {
        return Solved { ledger, accepted, total_fee };
    }

    debug!(
        "branching over {} contested candidates at depth {depth}",
        branchable.len()
    );

    // Try each contested candidate as the next commit on a cloned set and
    // solve the rest of the problem behind it. Highest fee(t) + rest(t)
    // wins; the strictly-greater comparison resolves ties to the earliest
    // index.
    let mut best: Option<(u64, AcceptedTransaction, Solved)> = None;
    for (i, tx) in branchable.iter().enumerate() {
        let mut trial = ledger.clone();
        let entry = match trial.apply(tx) {
            Ok(entry) => entry,
            Err(err) => {
                trace!("branch {i} refused at commit ({err})");
                continue;
            }
        };

        let mut rest: Vec<Transaction> =
            Vec::with_capacity(branchable.len() - 1 + leftovers.len());
        rest.extend(
            branchable
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, other)| other.clone()),
        );
        rest.extend(leftovers.iter().cloned());

        let sub = solve(trial, rest, depth + 1);
        let score = entry.fee().saturating_add(sub.total_fee);
        trace!(
            "branch {i} at depth {depth}: fee {} + rest {} = {score}",
            entry.fee(),
            sub.total_fee
        );

        if best.as_ref().is_none_or(|(best_score, _, _)| score > *best_score) {
            best = Some((score, entry, sub));
        }
    }

    let Some((score, entry, sub)) = best else {
        return Solved { ledger, accepted, total_fee };
    };

    // Adopt the winning branch wholesale. The search is deterministic, so
    // this equals committing the winner to the real set and re-solving
    // the remainder.
    accepted.push(entry);
    accepted.extend(sub.accepted);
    total_fee = total_fee.saturating_add(score);
    Solved {
        ledger: sub.ledger,
        accepted,
        total_fee,
    }
}
