//! Deployment descriptor exchanged with nodes over RMB.
//!
//! Workload `data` and result `data` are type specific; they are carried as
//! opaque JSON so any workload kind passes through unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A declarative set of workloads bound to a node contract
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Deployment {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub twin_id: u32,
    #[serde(default)]
    pub contract_id: u64,
    #[serde(default)]
    pub metadata: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expiration: i64,
    #[serde(default)]
    pub signature_requirement: SignatureRequirement,
    #[serde(default)]
    pub workloads: Vec<Workload>,
}

impl Deployment {
    /// Find a workload by name
    pub fn workload(&self, name: &str) -> Option<&Workload> {
        self.workloads.iter().find(|w| w.name == name)
    }
}

/// Which twins must sign the deployment and with what weight
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SignatureRequirement {
    #[serde(default)]
    pub requests: Vec<SignatureRequest>,
    #[serde(default)]
    pub weight_required: u32,
    #[serde(default)]
    pub signatures: Vec<Signature>,
    #[serde(default)]
    pub signature_style: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SignatureRequest {
    pub twin_id: u32,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub weight: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Signature {
    pub twin_id: u32,
    /// Hex encoded signature
    pub signature: String,
    /// `sr25519` or `ed25519`
    #[serde(default)]
    pub signature_type: String,
}

/// A single workload (zmount, network, zmachine, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Workload {
    #[serde(default)]
    pub version: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub metadata: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub result: WorkloadResult,
}

/// Provisioning outcome reported by the node
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkloadResult {
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub state: String,
    #[serde(rename = "message", default)]
    pub error: String,
    #[serde(default)]
    pub data: Value,
}
