//! Unlock-proof verification seam.
//!
//! The ledger consumes proof checking as a pure pass/fail capability. The
//! shipped implementation verifies ECDSA signatures over secp256k1; tests
//! substitute their own [`ProofVerifier`] when real key material would only
//! get in the way.

use crate::types::Hash;
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, VerifyOnly};

/// Pass/fail authentication of an unlock proof against an output owner.
/// Implementations must be pure and side-effect-free.
pub trait ProofVerifier {
    fn verify(&self, owner: &[u8], proof: &[u8], message: &Hash) -> bool;
}

/// ECDSA verification over secp256k1. Owners are serialized public keys
/// (33-byte compressed or 65-byte uncompressed); proofs are 64-byte compact
/// signatures over the transaction's signing digest.
pub struct Secp256k1Verifier {
    secp: Secp256k1<VerifyOnly>,
}

impl Secp256k1Verifier {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::verification_only(),
        }
    }
}

impl Default for Secp256k1Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ProofVerifier for Secp256k1Verifier {
    fn verify(&self, owner: &[u8], proof: &[u8], message: &Hash) -> bool {
        let pubkey = match PublicKey::from_slice(owner) {
            Ok(pubkey) => pubkey,
            Err(_) => return false,
        };
        let signature = match Signature::from_compact(proof) {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        let message = Message::from_digest(*message);
        self.secp.verify_ecdsa(&message, &signature, &pubkey).is_ok()
    }
}
