pub mod fetcher;

pub use fetcher::{ChainFetcher, FetchError, HttpChainFetcher, PeerChain};

#[cfg(test)]
pub use fetcher::testing;
