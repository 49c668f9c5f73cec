use std::time::Duration;

use futures_util::future::BoxFuture;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::Block;

/// A peer's answer to `GET /chain`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerChain {
    pub chain: Vec<Block>,
    pub length: usize,
}

impl PeerChain {
    /// The advertised length must match what was actually sent.
    pub fn check_length(&self) -> Result<(), FetchError> {
        if self.length != self.chain.len() {
            return Err(FetchError::LengthMismatch {
                reported: self.length,
                actual: self.chain.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection failure, timeout or undecodable body.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("peer answered with status {0}")]
    Status(u16),

    #[error("peer reported length {reported} but sent {actual} blocks")]
    LengthMismatch { reported: usize, actual: usize },
}

/// Retrieves the current chain of a peer identified by `host[:port]`.
pub trait ChainFetcher: Send + Sync {
    fn fetch_chain<'a>(&'a self, address: &'a str) -> BoxFuture<'a, Result<PeerChain, FetchError>>;
}

/// Fetches `http://{peer}/chain` with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpChainFetcher {
    client: reqwest::Client,
}

impl HttpChainFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl ChainFetcher for HttpChainFetcher {
    fn fetch_chain<'a>(&'a self, address: &'a str) -> BoxFuture<'a, Result<PeerChain, FetchError>> {
        Box::pin(async move {
            let url = format!("http://{address}/chain");
            debug!("PEER - GET {url}");
            let resp = self.client.get(&url).send().await?;
            if !resp.status().is_success() {
                return Err(FetchError::Status(resp.status().as_u16()));
            }
            Ok(resp.json::<PeerChain>().await?)
        })
    }
}
