use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use actix_web::web;
use log::{debug, info, warn};

use crate::blockchain::consensus;
use crate::blockchain::pow::PowError;
use crate::blockchain::{Block, Blockchain, PeerRegistry, ProofOfWork};
use crate::config::NodeConfig;
use crate::error::{NodeError, Result};
use crate::network::ChainFetcher;
use crate::transaction::Transaction;

/// A running node: one chain, its peers and the proof-of-work engine.
///
/// The chain sits behind a single `RwLock`. Mining reads the tip, searches
/// for a proof with no lock held, then re-takes the write lock to append;
/// consensus fetches peers with no lock held and swaps the chain under the
/// write lock.
pub struct Node {
    identity: String,
    pow: ProofOfWork,
    chain: RwLock<Blockchain>,
    peers: RwLock<PeerRegistry>,
    fetcher: Arc<dyn ChainFetcher>,
    /// Bumped whenever the tip changes; in-flight proof searches watch it.
    tip_generation: Arc<AtomicU64>,
}

impl Node {
    pub fn new(config: &NodeConfig, fetcher: Arc<dyn ChainFetcher>) -> Result<Self> {
        let mut peers = PeerRegistry::new();
        peers.register_all(config.peers.as_slice())?;
        let pow = ProofOfWork::new(config.difficulty).with_max_iterations(config.max_iterations);

        info!(
            "NODE - id={} difficulty={} peers={}",
            config.node_id,
            pow.difficulty(),
            peers.len()
        );

        Ok(Self {
            identity: config.node_id.clone(),
            pow,
            chain: RwLock::new(Blockchain::new()),
            peers: RwLock::new(peers),
            fetcher,
            tip_generation: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Queue a transfer; returns the index of the block that will hold it.
    pub fn submit_transaction(&self, sender: &str, recipient: &str, amount: i64) -> Result<u64> {
        let tx = Transaction::checked(sender, recipient, amount)?;
        let mut bc = self.chain.write().expect("rwlock poisoned");
        let index = bc.new_transaction(tx)?;
        debug!(
            "TX - {sender} -> {recipient} ({amount}) queued for block #{index} (pool={})",
            bc.pending().len()
        );
        Ok(index)
    }

    /// Find the next proof, pay `miner` and forge the block.
    ///
    /// If the tip moves while searching (another block was appended or the
    /// chain was replaced), the search is abandoned and restarted on the new tip.
    pub async fn mine_next_block(&self, miner: &str) -> Result<Block> {
        let started = Instant::now();
        loop {
            let (last_proof, last_hash, generation) = {
                let bc = self.chain.read().expect("rwlock poisoned");
                let last = bc.last_block()?;
                (
                    last.proof,
                    last.hash(),
                    self.tip_generation.load(Ordering::SeqCst),
                )
            };

            let pow = self.pow;
            let tip = Arc::clone(&self.tip_generation);
            let search = web::block(move || {
                pow.find_proof_until(last_proof, || tip.load(Ordering::SeqCst) != generation)
            })
            .await
            .map_err(|e| NodeError::Internal(e.to_string()))?;

            let proof = match search {
                Ok(proof) => proof,
                Err(PowError::Cancelled) => {
                    warn!("MINER - tip moved during proof search, restarting");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let mut bc = self.chain.write().expect("rwlock poisoned");
            if bc.last_block()?.hash() != last_hash {
                warn!("MINER - proof {proof} is stale, restarting");
                continue;
            }
            bc.new_transaction(Transaction::reward(miner))?;
            let block = bc.new_block(proof, Some(last_hash))?.clone();
            self.tip_generation.fetch_add(1, Ordering::SeqCst);

            info!(
                "MINER - forged block #{} (proof={}, txs={} + reward, {} ms)",
                block.index,
                block.proof,
                block.data.iter().filter(|tx| !tx.is_reward()).count(),
                started.elapsed().as_millis()
            );
            return Ok(block);
        }
    }

    /// Snapshot of the chain and its length.
    pub fn get_chain(&self) -> (Vec<Block>, usize) {
        let bc = self.chain.read().expect("rwlock poisoned");
        (bc.chain().to_vec(), bc.len())
    }

    /// Add peers (all or nothing) and return the full normalized set.
    pub fn register_peers<S: AsRef<str>>(&self, addresses: &[S]) -> Result<Vec<String>> {
        let mut peers = self.peers.write().expect("rwlock poisoned");
        peers.register_all(addresses)?;
        info!("PEERS - {} known after registering {}", peers.len(), addresses.len());
        Ok(peers.addresses())
    }

    pub fn peers(&self) -> Vec<String> {
        self.peers.read().expect("rwlock poisoned").addresses()
    }

    /// Ask every peer for its chain and adopt the longest valid one if it
    /// beats ours. Unreachable peers and invalid chains are skipped.
    pub async fn resolve_consensus(&self) -> Result<(bool, Vec<Block>)> {
        let peers = self.peers();
        let candidates = consensus::fetch_candidates(self.fetcher.as_ref(), &peers).await;

        let mut bc = self.chain.write().expect("rwlock poisoned");
        let replaced = consensus::resolve_conflicts(&mut bc, candidates, &self.pow)?;
        if replaced {
            self.tip_generation.fetch_add(1, Ordering::SeqCst);
        }
        Ok((replaced, bc.chain().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::network::testing::StaticFetcher;

    fn node_with(fetcher: StaticFetcher, difficulty: usize) -> Node {
        let config = NodeConfig {
            node_id: "miner-1".into(),
            difficulty,
            ..NodeConfig::default()
        };
        Node::new(&config, Arc::new(fetcher)).unwrap()
    }

    fn peer_chain(len: usize, pow: &ProofOfWork) -> Vec<Block> {
        let mut bc = Blockchain::new();
        while bc.len() < len {
            let proof = pow.find_proof(bc.last_block().unwrap().proof).unwrap();
            bc.new_block(proof, None).unwrap();
        }
        bc.chain().to_vec()
    }

    #[actix_web::test]
    async fn mining_after_a_transfer() {
        let node = node_with(StaticFetcher::default(), 4);
        let genesis = node.get_chain().0[0].clone();

        let index = node.submit_transaction("alice", "bob", 5).unwrap();
        assert_eq!(index, 2);

        let block = node.mine_next_block(node.identity()).await.unwrap();
        assert_eq!(block.index, 2);
        assert_eq!(block.previous_hash, genesis.hash());
        assert_eq!(
            block.data,
            vec![
                Transaction::new("alice", "bob", 5),
                Transaction::new("0", "miner-1", 1),
            ]
        );
        assert!(ProofOfWork::new(4).verify(100, block.proof));

        let (chain, length) = node.get_chain();
        assert_eq!(length, 2);
        assert_eq!(chain[1], block);
        assert!(node.chain.read().unwrap().pending().is_empty());
        assert!(consensus::is_valid_chain(&chain, &ProofOfWork::new(4)));
    }

    #[test]
    fn submit_rejects_missing_parties() {
        let node = node_with(StaticFetcher::default(), 1);
        assert!(matches!(
            node.submit_transaction("", "bob", 1),
            Err(NodeError::Validation(_))
        ));
        assert!(node.chain.read().unwrap().pending().is_empty());
    }

    #[actix_web::test]
    async fn exhausted_search_leaves_chain_untouched() {
        let config = NodeConfig {
            difficulty: 64,
            max_iterations: Some(10),
            ..NodeConfig::default()
        };
        let node = Node::new(&config, Arc::new(StaticFetcher::default())).unwrap();
        node.submit_transaction("a", "b", 1).unwrap();

        let res = node.mine_next_block("m").await;
        assert!(matches!(res, Err(NodeError::Pow(PowError::Exhausted { .. }))));
        assert_eq!(node.get_chain().1, 1);
        assert_eq!(node.chain.read().unwrap().pending().len(), 1);
    }

    #[test]
    fn register_peers_normalizes_and_dedups() {
        let node = node_with(StaticFetcher::default(), 1);
        let mut peers = node
            .register_peers(&["http://127.0.0.1:5001", "127.0.0.1:5001", "http://10.0.0.2:5000/x"])
            .unwrap();
        peers.sort();
        assert_eq!(peers, vec!["10.0.0.2:5000", "127.0.0.1:5001"]);

        assert!(node.register_peers(&["http://"]).is_err());
        assert_eq!(node.peers().len(), 2);
    }

    #[actix_web::test]
    async fn resolve_without_peers_is_authoritative() {
        let node = node_with(StaticFetcher::default(), 1);
        let before = node.get_chain().0;
        let (replaced, chain) = node.resolve_consensus().await.unwrap();
        assert!(!replaced);
        assert_eq!(chain, before);
    }

    #[actix_web::test]
    async fn resolve_adopts_longest_valid_peer_chain() {
        let pow = ProofOfWork::new(2);
        let good = peer_chain(3, &pow);
        let mut bad = peer_chain(6, &pow);
        bad[4].previous_hash = "bogus".into();

        let fetcher = StaticFetcher::default()
            .with_chain("127.0.0.1:5001", good.clone())
            .with_chain("127.0.0.1:5002", bad)
            .unreachable("127.0.0.1:5003");
        let node = node_with(fetcher, 2);
        node.register_peers(&["127.0.0.1:5001", "127.0.0.1:5002", "127.0.0.1:5003"])
            .unwrap();

        let (replaced, chain) = node.resolve_consensus().await.unwrap();
        assert!(replaced);
        assert_eq!(chain, good);
        assert_eq!(node.get_chain().0, good);
    }

    #[actix_web::test]
    async fn chain_replaced_mid_search_restarts_on_new_tip() {
        // At difficulty 5 the proof after genesis takes ~888k candidates and
        // building the three-block peer chain takes roughly twice that, so the
        // local search is still running when consensus swaps the chain.
        let pow = ProofOfWork::new(5);
        let longer = peer_chain(3, &pow);
        let fetcher = StaticFetcher::default().with_chain("peer:1", longer.clone());
        let node = Arc::new(node_with(fetcher, 5));
        node.register_peers(&["peer:1"]).unwrap();
        node.submit_transaction("a", "b", 1).unwrap();

        let miner = Arc::clone(&node);
        let mining = actix_web::rt::spawn(async move { miner.mine_next_block("m").await });
        actix_web::rt::time::sleep(Duration::from_millis(20)).await;

        let (replaced, _) = node.resolve_consensus().await.unwrap();
        assert!(replaced);
        node.submit_transaction("c", "d", 2).unwrap();

        let block = mining.await.unwrap().unwrap();
        let last = longer.last().unwrap();
        assert_eq!(block.index, longer.len() as u64 + 1);
        assert_eq!(block.previous_hash, last.hash());
        assert!(pow.verify(last.proof, block.proof));
        assert_eq!(
            block.data,
            vec![
                Transaction::new("a", "b", 1),
                Transaction::new("c", "d", 2),
                Transaction::new("0", "m", 1),
            ]
        );

        let (chain, length) = node.get_chain();
        assert_eq!(length, 4);
        assert_eq!(&chain[..3], &longer[..]);
        assert!(consensus::is_valid_chain(&chain, &pow));
        assert!(node.chain.read().unwrap().pending().is_empty());
    }

    #[actix_web::test]
    async fn mining_continues_on_adopted_chain() {
        let pow = ProofOfWork::new(2);
        let longer = peer_chain(4, &pow);
        let fetcher = StaticFetcher::default().with_chain("peer:1", longer.clone());
        let node = node_with(fetcher, 2);
        node.register_peers(&["peer:1"]).unwrap();

        assert!(node.resolve_consensus().await.unwrap().0);
        let block = node.mine_next_block("m").await.unwrap();
        assert_eq!(block.index, 5);
        assert_eq!(block.previous_hash, longer[3].hash());
        assert!(pow.verify(longer[3].proof, block.proof));
    }
}
