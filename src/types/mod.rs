pub mod contract;
pub mod deployment;
pub mod network;
pub mod node;

pub use contract::BatchCreateContractData;
pub use deployment::{
    Deployment, Signature, SignatureRequest, SignatureRequirement, Workload, WorkloadResult,
};
pub use network::PublicConfig;
pub use node::NodeInfo;
