//! Transaction validation against a working UTXO set.
//!
//! Both entry points run transaction-by-transaction over the caller's
//! working set, never the original snapshot: a later transaction in the
//! batch may spend an earlier one's outputs, and a double-spend across the
//! batch is caught because the first spend already consumed the key.

use crate::constants::MAX_MONEY;
use crate::error::{LedgerError, TxError};
use crate::proof::ProofVerifier;
use crate::types::{short_id, OutPoint, Transaction, Value};
use crate::utxo::UtxoSet;
use std::collections::HashSet;
use tracing::trace;

/// Checks one transaction against `utxo` without mutating it. Returns the
/// fee surplus (inputs minus outputs; zero for coinbase).
///
/// Checks, in order: every claimed output exists, no output is claimed
/// twice within the transaction, every unlock proof authenticates against
/// the claimed output's owner, output values lie in `[0, MAX_MONEY]`, and
/// inputs cover outputs. A zero-input (coinbase) transaction is exempt from
/// the input-side checks.
pub fn check_transaction<V: ProofVerifier>(
    verifier: &V,
    utxo: &UtxoSet,
    tx: &Transaction,
) -> Result<Value, TxError> {
    let mut claimed: HashSet<OutPoint> = HashSet::new();
    let mut total_in: Value = 0;

    for (i, input) in tx.inputs().iter().enumerate() {
        let outpoint = input.outpoint();
        let spent = match utxo.lookup(&outpoint) {
            Some(output) => output,
            None => {
                return Err(TxError::UnknownInput {
                    input: i,
                    outpoint,
                })
            }
        };
        if !claimed.insert(outpoint) {
            return Err(TxError::DoubleSpendWithinTx { outpoint });
        }
        if !verifier.verify(&spent.owner, &input.unlock_proof, &tx.sig_hash(input)) {
            return Err(TxError::InvalidProof { input: i });
        }
        total_in = total_in.saturating_add(spent.value);
    }

    let mut total_out: Value = 0;
    for (i, output) in tx.outputs().iter().enumerate() {
        if output.value < 0 || output.value > MAX_MONEY {
            return Err(TxError::InvalidOutputValue {
                index: i,
                value: output.value,
            });
        }
        total_out = total_out.saturating_add(output.value);
    }

    if tx.is_coinbase() {
        return Ok(0);
    }
    if total_in < total_out {
        return Err(TxError::ValueOverspend {
            inputs: total_in,
            outputs: total_out,
        });
    }
    Ok(total_in - total_out)
}

/// Strict batch used for block acceptance: every transaction must be valid
/// or the whole batch fails, leaving `utxo` only useful to discard. Returns
/// the summed fee surplus of the batch.
pub fn apply_all<V: ProofVerifier>(
    verifier: &V,
    utxo: &mut UtxoSet,
    txs: &[Transaction],
) -> Result<Value, LedgerError> {
    let mut fees: Value = 0;
    for tx in txs {
        let fee = check_transaction(verifier, utxo, tx).map_err(|source| {
            LedgerError::InvalidTransaction {
                txid: tx.id(),
                source,
            }
        })?;
        apply_transaction(utxo, tx)?;
        fees = fees.saturating_add(fee);
    }
    Ok(fees)
}

/// Maximal mutually consistent subset of `txs`, in original relative order.
/// Rejected transactions are dropped from the result and not retried within
/// this call; `utxo` ends up reflecting the accepted subset.
pub fn filter_valid<V: ProofVerifier>(
    verifier: &V,
    utxo: &mut UtxoSet,
    txs: &[Transaction],
) -> Result<Vec<Transaction>, LedgerError> {
    let mut accepted = Vec::new();
    for tx in txs {
        match check_transaction(verifier, utxo, tx) {
            Ok(_) => {
                apply_transaction(utxo, tx)?;
                accepted.push(tx.clone());
            }
            Err(reason) => {
                trace!(tx = %short_id(&tx.id()), %reason, "transaction dropped");
            }
        }
    }
    Ok(accepted)
}

/// Consumes the claimed keys and adds the new `(tx.id, index)` outputs.
/// Only call after `check_transaction` accepted `tx` against this set; a
/// failure here is a ledger consistency bug, not bad input.
fn apply_transaction(utxo: &mut UtxoSet, tx: &Transaction) -> Result<(), LedgerError> {
    for input in tx.inputs() {
        utxo.remove(&input.outpoint())?;
    }
    for (i, output) in tx.outputs().iter().enumerate() {
        let outpoint = OutPoint {
            txid: tx.id(),
            index: i as u32,
        };
        utxo.add(outpoint, output.clone())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Input, Output};

    /// Accepts every proof; lets the tests focus on UTXO semantics.
    struct AcceptAll;

    impl ProofVerifier for AcceptAll {
        fn verify(&self, _owner: &[u8], _proof: &[u8], _message: &crate::types::Hash) -> bool {
            true
        }
    }

    /// Rejects every proof.
    struct RejectAll;

    impl ProofVerifier for RejectAll {
        fn verify(&self, _owner: &[u8], _proof: &[u8], _message: &crate::types::Hash) -> bool {
            false
        }
    }

    fn output(value: Value) -> Output {
        Output {
            value,
            owner: vec![0x02; 33],
        }
    }

    fn input(prev: &Transaction, index: u32) -> Input {
        Input {
            prev_txid: prev.id(),
            output_index: index,
            unlock_proof: vec![0u8; 64],
        }
    }

    /// One confirmed coinbase paying 25, plus the set holding its output.
    fn seeded_set() -> (UtxoSet, Transaction) {
        let coinbase = Transaction::coinbase(vec![output(25)]);
        let mut utxo = UtxoSet::new();
        utxo.add(
            OutPoint {
                txid: coinbase.id(),
                index: 0,
            },
            coinbase.outputs()[0].clone(),
        )
        .unwrap();
        (utxo, coinbase)
    }

    #[test]
    fn test_simple_spend_accepted_with_fee() {
        let (utxo, coinbase) = seeded_set();
        let tx = Transaction::new(vec![input(&coinbase, 0)], vec![output(10), output(12)]);

        let fee = check_transaction(&AcceptAll, &utxo, &tx).unwrap();
        assert_eq!(fee, 3);
    }

    #[test]
    fn test_unknown_input_rejected() {
        let (utxo, _) = seeded_set();
        let tx = Transaction::new(
            vec![Input {
                prev_txid: [9; 32],
                output_index: 0,
                unlock_proof: vec![0u8; 64],
            }],
            vec![output(5)],
        );

        let err = check_transaction(&AcceptAll, &utxo, &tx).unwrap_err();
        assert!(matches!(err, TxError::UnknownInput { input: 0, .. }));
    }

    #[test]
    fn test_double_spend_within_tx_rejected() {
        let (utxo, coinbase) = seeded_set();
        let tx = Transaction::new(
            vec![input(&coinbase, 0), input(&coinbase, 0)],
            vec![output(40)],
        );

        let err = check_transaction(&AcceptAll, &utxo, &tx).unwrap_err();
        assert!(matches!(err, TxError::DoubleSpendWithinTx { .. }));
    }

    #[test]
    fn test_invalid_proof_rejected() {
        let (utxo, coinbase) = seeded_set();
        let tx = Transaction::new(vec![input(&coinbase, 0)], vec![output(10)]);

        let err = check_transaction(&RejectAll, &utxo, &tx).unwrap_err();
        assert_eq!(err, TxError::InvalidProof { input: 0 });
    }

    #[test]
    fn test_overspend_rejected() {
        let (utxo, coinbase) = seeded_set();
        let tx = Transaction::new(vec![input(&coinbase, 0)], vec![output(26)]);

        let err = check_transaction(&AcceptAll, &utxo, &tx).unwrap_err();
        assert_eq!(
            err,
            TxError::ValueOverspend {
                inputs: 25,
                outputs: 26
            }
        );
    }

    #[test]
    fn test_negative_output_rejected() {
        let (utxo, coinbase) = seeded_set();
        let tx = Transaction::new(vec![input(&coinbase, 0)], vec![output(-1)]);

        let err = check_transaction(&AcceptAll, &utxo, &tx).unwrap_err();
        assert_eq!(
            err,
            TxError::InvalidOutputValue {
                index: 0,
                value: -1
            }
        );
    }

    #[test]
    fn test_coinbase_exempt_from_input_checks() {
        let utxo = UtxoSet::new();
        let coinbase = Transaction::coinbase(vec![output(25)]);

        let fee = check_transaction(&AcceptAll, &utxo, &coinbase).unwrap();
        assert_eq!(fee, 0);
    }

    #[test]
    fn test_chained_spend_within_batch_accepted() {
        let (mut utxo, coinbase) = seeded_set();
        let first = Transaction::new(vec![input(&coinbase, 0)], vec![output(25)]);
        let second = Transaction::new(vec![input(&first, 0)], vec![output(20)]);

        let accepted = filter_valid(&AcceptAll, &mut utxo, &[first, second.clone()]).unwrap();
        assert_eq!(accepted.len(), 2);
        assert!(utxo.contains(&OutPoint {
            txid: second.id(),
            index: 0
        }));
    }

    #[test]
    fn test_batch_double_spend_drops_second() {
        let (mut utxo, coinbase) = seeded_set();
        let first = Transaction::new(vec![input(&coinbase, 0)], vec![output(20)]);
        // Same claimed outpoint, different outputs: a competing spend.
        let second = Transaction::new(vec![input(&coinbase, 0)], vec![output(19)]);

        let accepted = filter_valid(&AcceptAll, &mut utxo, &[first.clone(), second]).unwrap();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id(), first.id());
    }

    #[test]
    fn test_filter_preserves_relative_order() {
        let (mut utxo, coinbase) = seeded_set();
        let bad = Transaction::new(
            vec![Input {
                prev_txid: [9; 32],
                output_index: 0,
                unlock_proof: vec![0u8; 64],
            }],
            vec![output(5)],
        );
        let good = Transaction::new(vec![input(&coinbase, 0)], vec![output(10), output(11)]);

        let accepted =
            filter_valid(&AcceptAll, &mut utxo, &[bad, good.clone()]).unwrap();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id(), good.id());
    }

    #[test]
    fn test_apply_all_accepts_full_batch() {
        let (mut utxo, coinbase) = seeded_set();
        let first = Transaction::new(vec![input(&coinbase, 0)], vec![output(23)]);
        let second = Transaction::new(vec![input(&first, 0)], vec![output(21)]);

        let fees = apply_all(&AcceptAll, &mut utxo, &[first, second]).unwrap();
        assert_eq!(fees, 4);
        assert_eq!(utxo.len(), 1);
    }

    #[test]
    fn test_apply_all_fails_whole_batch_on_one_rejection() {
        let (mut utxo, coinbase) = seeded_set();
        let good = Transaction::new(vec![input(&coinbase, 0)], vec![output(20)]);
        let bad = Transaction::new(vec![input(&coinbase, 0)], vec![output(19)]);

        let err = apply_all(&AcceptAll, &mut utxo, &[good, bad]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransaction { .. }));
    }
}
