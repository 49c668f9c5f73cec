//! Longest-valid-chain consensus.
//!
//! Peers are queried concurrently, then their answers are scanned in the
//! order the peers were given. A candidate is adopted only if it is strictly
//! longer than the best seen so far, so among equally long valid chains the
//! first one scanned wins. Registry order is a `HashSet`'s, which makes that
//! tie-break arbitrary.

use futures_util::future::join_all;
use log::{info, warn};

use super::{Block, Blockchain, ProofOfWork};
use crate::error::{NodeError, Result};
use crate::network::{ChainFetcher, FetchError, PeerChain};

/// Check linkage and proof of every adjacent pair; reports the first failure.
pub fn validate_chain(chain: &[Block], pow: &ProofOfWork) -> Result<()> {
    for pair in chain.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        if curr.previous_hash != prev.hash() {
            return Err(NodeError::InvalidChain(format!(
                "block #{} does not link to block #{}",
                curr.index, prev.index
            )));
        }
        if !pow.verify(prev.proof, curr.proof) {
            return Err(NodeError::InvalidChain(format!(
                "block #{} carries an invalid proof {}",
                curr.index, curr.proof
            )));
        }
    }
    Ok(())
}

/// Empty and single-block chains are vacuously valid.
pub fn is_valid_chain(chain: &[Block], pow: &ProofOfWork) -> bool {
    validate_chain(chain, pow).is_ok()
}

/// Query every peer at once; answers come back in `peers` order.
pub async fn fetch_candidates(
    fetcher: &dyn ChainFetcher,
    peers: &[String],
) -> Vec<(String, std::result::Result<PeerChain, FetchError>)> {
    let requests = peers.iter().map(|peer| async move {
        let answer = fetcher.fetch_chain(peer).await;
        (peer.clone(), answer)
    });
    join_all(requests).await
}

/// Pick the longest valid candidate strictly longer than `local_len`.
/// Failed fetches and invalid chains are logged and skipped.
pub fn select_longest_chain<I>(
    local_len: usize,
    candidates: I,
    pow: &ProofOfWork,
) -> Option<(String, Vec<Block>)>
where
    I: IntoIterator<Item = (String, std::result::Result<PeerChain, FetchError>)>,
{
    let mut max_length = local_len;
    let mut best = None;

    for (peer, answer) in candidates {
        let candidate = match answer.and_then(|c| c.check_length().map(|_| c)) {
            Ok(c) => c,
            Err(e) => {
                warn!("CONSENSUS - skipping peer {peer}: {e}");
                continue;
            }
        };
        if candidate.length <= max_length {
            continue;
        }
        if let Err(e) = validate_chain(&candidate.chain, pow) {
            warn!("CONSENSUS - discarding chain from {peer}: {e}");
            continue;
        }
        max_length = candidate.length;
        best = Some((peer, candidate.chain));
    }

    best
}

/// Replace `local` with the best candidate, if any beats it. Returns whether
/// the chain was replaced.
pub fn resolve_conflicts<I>(
    local: &mut Blockchain,
    candidates: I,
    pow: &ProofOfWork,
) -> Result<bool>
where
    I: IntoIterator<Item = (String, std::result::Result<PeerChain, FetchError>)>,
{
    match select_longest_chain(local.len(), candidates, pow) {
        Some((peer, chain)) => {
            info!(
                "CONSENSUS - adopting chain of length {} from {peer} (local was {})",
                chain.len(),
                local.len()
            );
            local.replace_chain(chain)?;
            Ok(true)
        }
        None => {
            info!("CONSENSUS - local chain of length {} is authoritative", local.len());
            Ok(false)
        }
    }
}
