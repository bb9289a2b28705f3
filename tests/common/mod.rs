//! In-memory doubles for the chain and the RMB peer.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use tfgrid_vclient::chain::{Error as ChainError, Identity, Substrate};
use tfgrid_vclient::rmb::RpcPeer;
use tfgrid_vclient::types::{BatchCreateContractData, NodeInfo};
use tfgrid_vclient::{Error, Result};

pub const ALICE: &str = "//Alice";
pub const HASH: &str = "0123456789abcdef0123456789abcdef";

#[derive(Debug, Clone, PartialEq)]
pub enum ChainCall {
    CreateName(String),
    CreateRent {
        node_id: u32,
        solution_provider: Option<u64>,
    },
    CreateNode {
        node_id: u32,
        body: String,
        hash: String,
        public_ips: u32,
        solution_provider: Option<u64>,
    },
    UpdateNode {
        contract_id: u64,
        body: String,
        hash: String,
    },
    Cancel(u64),
    BatchCreate(Vec<BatchCreateContractData>),
    BatchCancel(Vec<u64>),
    TwinByPubkey([u8; 32]),
    Node(u32),
}

/// Records every call; contract ids are handed out from 100 upwards.
pub struct MockSubstrate {
    pub calls: Mutex<Vec<ChainCall>>,
    pub twins: HashMap<[u8; 32], u32>,
    pub nodes: HashMap<u32, NodeInfo>,
    pub reject: bool,
    next_id: AtomicU64,
}

impl Default for MockSubstrate {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            twins: HashMap::new(),
            nodes: HashMap::new(),
            reject: false,
            next_id: AtomicU64::new(100),
        }
    }
}

impl MockSubstrate {
    pub fn new() -> Self {
        Self::default()
    }

    /// A chain that rejects every extrinsic
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn with_twin(mut self, identity: &Identity, twin_id: u32) -> Self {
        self.twins.insert(*identity.public_key(), twin_id);
        self
    }

    pub fn with_node(mut self, id: u32, twin_id: u32) -> Self {
        self.nodes.insert(
            id,
            NodeInfo {
                id,
                farm_id: 1,
                twin_id,
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<ChainCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ChainCall) -> std::result::Result<(), ChainError> {
        self.calls.lock().unwrap().push(call);
        if self.reject {
            return Err(ChainError::Transaction("extrinsic rejected".into()));
        }
        Ok(())
    }

    fn next(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl Substrate for MockSubstrate {
    async fn create_name_contract(
        &self,
        _identity: &Identity,
        name: &str,
    ) -> std::result::Result<u64, ChainError> {
        self.record(ChainCall::CreateName(name.to_string()))?;
        Ok(self.next())
    }

    async fn create_rent_contract(
        &self,
        _identity: &Identity,
        node_id: u32,
        solution_provider: Option<u64>,
    ) -> std::result::Result<u64, ChainError> {
        self.record(ChainCall::CreateRent {
            node_id,
            solution_provider,
        })?;
        Ok(self.next())
    }

    async fn create_node_contract(
        &self,
        _identity: &Identity,
        node_id: u32,
        body: &str,
        hash: &str,
        public_ips: u32,
        solution_provider: Option<u64>,
    ) -> std::result::Result<u64, ChainError> {
        self.record(ChainCall::CreateNode {
            node_id,
            body: body.to_string(),
            hash: hash.to_string(),
            public_ips,
            solution_provider,
        })?;
        Ok(self.next())
    }

    async fn update_node_contract(
        &self,
        _identity: &Identity,
        contract_id: u64,
        body: &str,
        hash: &str,
    ) -> std::result::Result<u64, ChainError> {
        self.record(ChainCall::UpdateNode {
            contract_id,
            body: body.to_string(),
            hash: hash.to_string(),
        })?;
        Ok(contract_id)
    }

    async fn cancel_contract(
        &self,
        _identity: &Identity,
        contract_id: u64,
    ) -> std::result::Result<(), ChainError> {
        self.record(ChainCall::Cancel(contract_id))
    }

    async fn batch_all_create_contract(
        &self,
        _identity: &Identity,
        contracts: &[BatchCreateContractData],
    ) -> std::result::Result<Vec<u64>, ChainError> {
        self.record(ChainCall::BatchCreate(contracts.to_vec()))?;
        Ok(contracts.iter().map(|_| self.next()).collect())
    }

    async fn batch_cancel_contract(
        &self,
        _identity: &Identity,
        contract_ids: &[u64],
    ) -> std::result::Result<(), ChainError> {
        self.record(ChainCall::BatchCancel(contract_ids.to_vec()))
    }

    async fn get_twin_by_pubkey(&self, public_key: &[u8; 32]) -> std::result::Result<u32, ChainError> {
        self.calls
            .lock()
            .unwrap()
            .push(ChainCall::TwinByPubkey(*public_key));
        self.twins
            .get(public_key)
            .copied()
            .ok_or_else(|| ChainError::NotFound("twin".into()))
    }

    async fn get_node(&self, node_id: u32) -> std::result::Result<NodeInfo, ChainError> {
        self.calls.lock().unwrap().push(ChainCall::Node(node_id));
        self.nodes
            .get(&node_id)
            .copied()
            .ok_or_else(|| ChainError::NotFound(format!("node {}", node_id)))
    }
}

/// A node answering the zos methods from memory. Deployments are keyed by
/// contract id.
#[derive(Default)]
pub struct MockNode {
    pub calls: Mutex<Vec<(u32, String, Value)>>,
    pub deployments: Mutex<HashMap<u64, Value>>,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(u32, String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    fn contract_id(payload: &Value) -> Result<u64> {
        payload["contract_id"]
            .as_u64()
            .ok_or_else(|| Error::call("remote error (code 400): missing contract_id"))
    }
}

#[async_trait]
impl RpcPeer for MockNode {
    async fn call_raw(&self, dst: u32, cmd: &str, payload: Value) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((dst, cmd.to_string(), payload.clone()));

        match cmd {
            "zos.network.list_wg_ports" => Ok(json!([3000, 3001, 3002])),
            "zos.network.public_config_get" => Ok(json!({
                "type": "macvlan",
                "ipv4": "185.206.122.33/24",
                "ipv6": "2a10:b600:1::cc4:0/64",
                "gw4": "185.206.122.1",
                "gw6": "2a10:b600:1::1",
                "domain": "gent02.dev.grid.tf"
            })),
            "zos.deployment.deploy" => {
                let id = Self::contract_id(&payload)?;
                self.deployments.lock().unwrap().insert(id, payload);
                Ok(Value::Null)
            }
            "zos.deployment.get" => {
                let id = Self::contract_id(&payload)?;
                self.deployments
                    .lock()
                    .unwrap()
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| Error::call("remote error (code 404): deployment not found"))
            }
            "zos.deployment.changes" => {
                let id = Self::contract_id(&payload)?;
                let deployments = self.deployments.lock().unwrap();
                let deployment = deployments
                    .get(&id)
                    .ok_or_else(|| Error::call("remote error (code 404): deployment not found"))?;
                Ok(deployment["workloads"].clone())
            }
            other => Err(Error::call(format!("remote error (code 404): unknown command {}", other))),
        }
    }
}

/// A peer that never answers
pub struct StalledNode;

#[async_trait]
impl RpcPeer for StalledNode {
    async fn call_raw(&self, _dst: u32, _cmd: &str, _payload: Value) -> Result<Value> {
        tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
        Ok(Value::Null)
    }
}

async fn stall<T>() -> std::result::Result<T, ChainError> {
    tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
    Err(ChainError::Transaction("never finalized".into()))
}

/// A chain whose every call waits a day before failing
pub struct StalledChain;

#[async_trait]
impl Substrate for StalledChain {
    async fn create_name_contract(&self, _: &Identity, _: &str) -> std::result::Result<u64, ChainError> {
        stall().await
    }

    async fn create_rent_contract(
        &self,
        _: &Identity,
        _: u32,
        _: Option<u64>,
    ) -> std::result::Result<u64, ChainError> {
        stall().await
    }

    async fn create_node_contract(
        &self,
        _: &Identity,
        _: u32,
        _: &str,
        _: &str,
        _: u32,
        _: Option<u64>,
    ) -> std::result::Result<u64, ChainError> {
        stall().await
    }

    async fn update_node_contract(
        &self,
        _: &Identity,
        _: u64,
        _: &str,
        _: &str,
    ) -> std::result::Result<u64, ChainError> {
        stall().await
    }

    async fn cancel_contract(&self, _: &Identity, _: u64) -> std::result::Result<(), ChainError> {
        stall().await
    }

    async fn batch_all_create_contract(
        &self,
        _: &Identity,
        _: &[BatchCreateContractData],
    ) -> std::result::Result<Vec<u64>, ChainError> {
        stall().await
    }

    async fn batch_cancel_contract(&self, _: &Identity, _: &[u64]) -> std::result::Result<(), ChainError> {
        stall().await
    }

    async fn get_twin_by_pubkey(&self, _: &[u8; 32]) -> std::result::Result<u32, ChainError> {
        stall().await
    }

    async fn get_node(&self, _: u32) -> std::result::Result<NodeInfo, ChainError> {
        stall().await
    }
}
