use log::debug;

use super::block::{Block, GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use crate::error::{NodeError, Result};
use crate::transaction::Transaction;

/// In-memory chain plus the pool of transactions waiting to be mined.
#[derive(Debug)]
pub struct Blockchain {
    chain: Vec<Block>,
    current_transactions: Vec<Transaction>,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// Initialize a new blockchain holding only the genesis block.
    pub fn new() -> Self {
        let genesis = Block::new(1, Vec::new(), GENESIS_PROOF, GENESIS_PREVIOUS_HASH.to_string());
        Self {
            chain: vec![genesis],
            current_transactions: Vec::new(),
        }
    }

    /// Append a block carrying every pending transaction and empty the pool.
    /// `previous_hash` defaults to the hash of the current last block.
    pub fn new_block(&mut self, proof: u64, previous_hash: Option<String>) -> Result<&Block> {
        let previous_hash = match previous_hash {
            Some(hash) => hash,
            None => self.last_block()?.hash(),
        };
        let data = std::mem::take(&mut self.current_transactions);
        let block = Block::new(self.chain.len() as u64 + 1, data, proof, previous_hash);
        debug!(
            "CHAIN - appended block #{} ({} txs)",
            block.index,
            block.data.len()
        );
        self.chain.push(block);
        self.last_block()
    }

    /// Queue `tx` for the next block; returns the index that block will get.
    pub fn new_transaction(&mut self, tx: Transaction) -> Result<u64> {
        let next_index = self.last_block()?.index + 1;
        self.current_transactions.push(tx);
        Ok(next_index)
    }

    pub fn last_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(NodeError::EmptyChain)
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.current_transactions
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Swap the whole block sequence. The pending pool is kept.
    pub fn replace_chain(&mut self, chain: Vec<Block>) -> Result<()> {
        if chain.is_empty() {
            return Err(NodeError::EmptyChain);
        }
        self.chain = chain;
        Ok(())
    }
}
