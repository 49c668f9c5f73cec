pub mod block;
pub mod consensus;
pub mod model;
pub mod peers;
pub mod pow;

pub use block::Block;
pub use model::Blockchain;
pub use peers::PeerRegistry;
pub use pow::{DEFAULT_DIFFICULTY, ProofOfWork};
