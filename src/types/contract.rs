//! Contract batch input
//!
//! Items of the JSON list accepted by `batch-create-contracts`.

use serde::{Deserialize, Serialize};

/// One contract to create inside a `Utility.batch_all` call.
///
/// A non-empty `name` turns the item into a name contract; the node fields
/// are then ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchCreateContractData {
    #[serde(default)]
    pub node: u32,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub public_ips: u32,
    #[serde(default)]
    pub solution_provider_id: Option<u64>,
    #[serde(default)]
    pub name: String,
}

impl BatchCreateContractData {
    /// A name contract item
    pub fn name_contract(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A node contract item
    pub fn node_contract(
        node: u32,
        body: impl Into<String>,
        hash: impl Into<String>,
        public_ips: u32,
        solution_provider_id: Option<u64>,
    ) -> Self {
        Self {
            node,
            body: body.into(),
            hash: hash.into(),
            public_ips,
            solution_provider_id,
            name: String::new(),
        }
    }

    pub fn is_name_contract(&self) -> bool {
        !self.name.is_empty()
    }
}
