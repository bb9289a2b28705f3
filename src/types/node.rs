use serde::{Deserialize, Serialize};

/// The subset of the on-chain node record the client needs
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeInfo {
    pub id: u32,
    pub farm_id: u32,
    pub twin_id: u32,
}
