use log::debug;
use thiserror::Error;

use super::block::sha256_hex;

/// Default number of leading zero hex characters a proof must produce.
pub const DEFAULT_DIFFICULTY: usize = 4;

/// Candidates tried between two checks of the stop signal.
const STOP_CHECK_INTERVAL: u64 = 1024;

#[derive(Debug, Error)]
pub enum PowError {
    #[error("no proof found within {iterations} candidates")]
    Exhausted { iterations: u64 },

    #[error("proof search cancelled")]
    Cancelled,
}

/// Proof-of-Work engine: find `p'` such that `sha256("{p}{p'}")` starts with
/// `difficulty` zero hex characters, where `p` is the previous block's proof.
#[derive(Debug, Clone, Copy)]
pub struct ProofOfWork {
    difficulty: usize,
    max_iterations: Option<u64>,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

impl ProofOfWork {
    pub fn new(difficulty: usize) -> Self {
        Self {
            difficulty,
            max_iterations: None,
        }
    }

    /// Cap the search at `max` candidates (`None` searches forever).
    pub fn with_max_iterations(mut self, max: Option<u64>) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Digest of the concatenated decimal forms of both proofs.
    pub fn guess_hash(previous_proof: u64, candidate: u64) -> String {
        sha256_hex(format!("{previous_proof}{candidate}").as_bytes())
    }

    /// True iff the guess hash starts with `difficulty` zero characters.
    pub fn verify(&self, previous_proof: u64, candidate: u64) -> bool {
        let hash = Self::guess_hash(previous_proof, candidate);
        hash.len() >= self.difficulty && hash.bytes().take(self.difficulty).all(|c| c == b'0')
    }

    /// Linear search from 0 for the first valid proof.
    pub fn find_proof(&self, previous_proof: u64) -> Result<u64, PowError> {
        self.find_proof_until(previous_proof, || false)
    }

    /// Like [`find_proof`](Self::find_proof), but polls `should_stop` every
    /// few thousand candidates and bails out with `Cancelled` once it fires.
    pub fn find_proof_until<F>(&self, previous_proof: u64, should_stop: F) -> Result<u64, PowError>
    where
        F: Fn() -> bool,
    {
        let mut candidate: u64 = 0;
        loop {
            if self.max_iterations.is_some_and(|max| candidate >= max) {
                return Err(PowError::Exhausted {
                    iterations: candidate,
                });
            }
            if candidate % STOP_CHECK_INTERVAL == 0 && should_stop() {
                debug!("POW - search after proof {previous_proof} stopped at {candidate}");
                return Err(PowError::Cancelled);
            }
            if self.verify(previous_proof, candidate) {
                debug!(
                    "POW - found proof {candidate} after {} attempts (difficulty={})",
                    candidate + 1,
                    self.difficulty
                );
                return Ok(candidate);
            }
            candidate += 1;
        }
    }
}
