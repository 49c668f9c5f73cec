use std::collections::HashSet;

use url::Url;

use crate::error::{NodeError, Result};

/// Known neighbour nodes, stored as normalized `host[:port]` strings.
///
/// Iteration order is the `HashSet`'s and therefore unspecified.
#[derive(Debug, Default, Clone)]
pub struct PeerRegistry {
    nodes: HashSet<String>,
}

/// Reduce `http://192.168.0.5:5000/chain` (or a bare `192.168.0.5:5000`)
/// to `192.168.0.5:5000`.
pub fn normalize_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(NodeError::Validation("empty peer address".into()));
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    let url = Url::parse(&with_scheme)
        .map_err(|e| NodeError::Validation(format!("invalid peer address {trimmed:?}: {e}")))?;
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| NodeError::Validation(format!("peer address {trimmed:?} has no host")))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every address, or none of them if any fails to normalize.
    pub fn register_all<S: AsRef<str>>(&mut self, addresses: &[S]) -> Result<()> {
        let normalized = addresses
            .iter()
            .map(|a| normalize_address(a.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        self.nodes.extend(normalized);
        Ok(())
    }

    pub fn addresses(&self) -> Vec<String> {
        self.nodes.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
