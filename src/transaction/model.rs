use serde::{Deserialize, Serialize};

use crate::error::NodeError;

/// Sender used for the coinbase-style reward paid to the miner.
pub const REWARD_SENDER: &str = "0";

/// Amount credited to the miner for each forged block.
pub const MINING_REWARD: i64 = 1;

/// A transfer of `amount` from `sender` to `recipient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: i64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: i64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// Build a transaction from caller input, rejecting blank parties.
    /// The sign of `amount` is not checked.
    pub fn checked(sender: &str, recipient: &str, amount: i64) -> Result<Self, NodeError> {
        let sender = sender.trim();
        let recipient = recipient.trim();
        if sender.is_empty() {
            return Err(NodeError::Validation("sender required".into()));
        }
        if recipient.is_empty() {
            return Err(NodeError::Validation("recipient required".into()));
        }
        Ok(Self::new(sender, recipient, amount))
    }

    /// The reward transaction paying `miner` for a new block.
    pub fn reward(miner: &str) -> Self {
        Self::new(REWARD_SENDER, miner, MINING_REWARD)
    }

    pub fn is_reward(&self) -> bool {
        self.sender == REWARD_SENDER
    }
}
