//! RMB commands: calls routed through the relay to a node's RPC endpoint.

use std::time::Duration;

use async_trait::async_trait;
use clap::{Args, Subcommand};
use serde_json::{json, Map, Value};

use crate::cli::session::{with_rpc, CommandOutput, RpcAction};
use crate::cli::utils::{parse_json, to_json};
use crate::cli::Cli;
use crate::error::Result;
use crate::rmb::{self, RpcPeer};
use crate::types::{Deployment, PublicConfig, Workload};

pub const CMD_DEPLOYMENT_CHANGES: &str = "zos.deployment.changes";
pub const CMD_DEPLOYMENT_DEPLOY: &str = "zos.deployment.deploy";
pub const CMD_DEPLOYMENT_GET: &str = "zos.deployment.get";
pub const CMD_LIST_WG_PORTS: &str = "zos.network.list_wg_ports";
pub const CMD_PUBLIC_CONFIG_GET: &str = "zos.network.public_config_get";

/// RMB command container
#[derive(Args, Clone, Debug)]
pub struct RmbCommand {
    #[command(subcommand)]
    pub command: RmbCommands,
}

/// Available RMB operations
#[derive(Subcommand, Clone, Debug)]
pub enum RmbCommands {
    /// Call any remote method with an optional JSON payload
    Call {
        /// Destination twin id
        #[arg(long)]
        dst: u32,
        /// Remote method name, e.g. zos.network.list_wg_ports
        #[arg(long)]
        cmd: String,
        /// JSON payload
        #[arg(long)]
        payload: Option<String>,
    },

    /// Workload changes of a deployment
    DeploymentChanges {
        #[arg(long)]
        dst: u32,
        #[arg(long, alias = "contract_id")]
        contract_id: u64,
    },

    /// Push a deployment to a node
    DeploymentDeploy {
        #[arg(long)]
        dst: u32,
        /// Deployment as JSON
        #[arg(long)]
        data: String,
    },

    /// Fetch a deployment
    DeploymentGet {
        #[arg(long)]
        dst: u32,
        /// Lookup arguments as a JSON object, e.g. {"contract_id": 42}
        #[arg(long)]
        data: String,
    },

    /// Wireguard ports in use on a node
    NodeTakenPorts {
        #[arg(long)]
        dst: u32,
    },

    /// Public network configuration of a node
    NodePublicConfig {
        #[arg(long)]
        dst: u32,
    },
}

impl RmbCommands {
    /// Decode flag values into the action to run. Malformed JSON fails here,
    /// before anything is connected.
    pub fn into_action(self) -> Result<Box<dyn RpcAction>> {
        Ok(match self {
            RmbCommands::Call { dst, cmd, payload } => {
                let payload = match payload.as_deref().map(str::trim) {
                    None | Some("") => Value::Null,
                    Some(raw) => parse_json("payload", raw)?,
                };
                Box::new(GenericCall { dst, cmd, payload })
            }
            RmbCommands::DeploymentChanges { dst, contract_id } => {
                Box::new(DeploymentChanges { dst, contract_id })
            }
            RmbCommands::DeploymentDeploy { dst, data } => Box::new(DeploymentDeploy {
                dst,
                deployment: parse_json("data", &data)
                    .map_err(|e| e.context("failed to unmarshal deployment"))?,
            }),
            RmbCommands::DeploymentGet { dst, data } => Box::new(DeploymentGet {
                dst,
                args: parse_json("data", &data)
                    .map_err(|e| e.context("failed to unmarshal data to get deployment"))?,
            }),
            RmbCommands::NodeTakenPorts { dst } => Box::new(NodeTakenPorts { dst }),
            RmbCommands::NodePublicConfig { dst } => Box::new(NodePublicConfig { dst }),
        })
    }
}

/// Named method with an arbitrary JSON payload; the reply is printed as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericCall {
    pub dst: u32,
    pub cmd: String,
    pub payload: Value,
}

#[async_trait]
impl RpcAction for GenericCall {
    async fn run(&self, peer: &dyn RpcPeer, timeout: Duration) -> Result<CommandOutput> {
        let reply: Value = rmb::call(peer, self.dst, &self.cmd, &self.payload, timeout).await?;
        Ok(CommandOutput::Text(to_json("reply", &reply)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentChanges {
    pub dst: u32,
    pub contract_id: u64,
}

#[async_trait]
impl RpcAction for DeploymentChanges {
    async fn run(&self, peer: &dyn RpcPeer, timeout: Duration) -> Result<CommandOutput> {
        let args = json!({ "contract_id": self.contract_id });
        let changes: Vec<Workload> = rmb::call(peer, self.dst, CMD_DEPLOYMENT_CHANGES, &args, timeout)
            .await
            .map_err(|e| {
                e.context(format!(
                    "failed to get deployment changes, contract_id: {}",
                    self.contract_id
                ))
            })?;
        Ok(CommandOutput::Text(to_json("deployment changes", &changes)?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentDeploy {
    pub dst: u32,
    pub deployment: Deployment,
}

#[async_trait]
impl RpcAction for DeploymentDeploy {
    async fn run(&self, peer: &dyn RpcPeer, timeout: Duration) -> Result<CommandOutput> {
        let _: Value = rmb::call(peer, self.dst, CMD_DEPLOYMENT_DEPLOY, &self.deployment, timeout)
            .await
            .map_err(|e| {
                e.context(format!(
                    "failed to deploy deployment, contract_id: {}",
                    self.deployment.contract_id
                ))
            })?;
        Ok(CommandOutput::Empty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentGet {
    pub dst: u32,
    pub args: Map<String, Value>,
}

#[async_trait]
impl RpcAction for DeploymentGet {
    async fn run(&self, peer: &dyn RpcPeer, timeout: Duration) -> Result<CommandOutput> {
        let deployment: Deployment = rmb::call(peer, self.dst, CMD_DEPLOYMENT_GET, &self.args, timeout)
            .await
            .map_err(|e| e.context("failed to get deployment"))?;
        Ok(CommandOutput::Text(to_json("deployment", &deployment)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeTakenPorts {
    pub dst: u32,
}

#[async_trait]
impl RpcAction for NodeTakenPorts {
    async fn run(&self, peer: &dyn RpcPeer, timeout: Duration) -> Result<CommandOutput> {
        let ports: Vec<u16> = rmb::call(peer, self.dst, CMD_LIST_WG_PORTS, &(), timeout)
            .await
            .map_err(|e| e.context("failed to get node taken ports"))?;
        Ok(CommandOutput::Text(to_json("taken ports", &ports)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodePublicConfig {
    pub dst: u32,
}

#[async_trait]
impl RpcAction for NodePublicConfig {
    async fn run(&self, peer: &dyn RpcPeer, timeout: Duration) -> Result<CommandOutput> {
        let config: PublicConfig = rmb::call(peer, self.dst, CMD_PUBLIC_CONFIG_GET, &(), timeout)
            .await
            .map_err(|e| e.context("failed to get node public configuration"))?;
        Ok(CommandOutput::Text(to_json("public configuration", &config)?))
    }
}

/// Execute RMB commands
pub async fn execute(cmd: RmbCommand, cli: &Cli) -> anyhow::Result<()> {
    let action = cmd.command.into_action()?;
    let config = cli.config()?;
    let mut stdout = std::io::stdout();
    with_rpc(&config, &cli.mnemonics, action.as_ref(), &mut stdout).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_call_without_payload_sends_null() {
        let cmd = RmbCommands::Call {
            dst: 11,
            cmd: CMD_LIST_WG_PORTS.into(),
            payload: None,
        };
        assert!(cmd.into_action().is_ok());

        let cmd = RmbCommands::Call {
            dst: 11,
            cmd: "zos.statistics.get".into(),
            payload: Some("{\"a\":".into()),
        };
        assert!(matches!(cmd.into_action(), Err(Error::Payload(_))));
    }

    #[test]
    fn test_deployment_get_requires_object() {
        let cmd = RmbCommands::DeploymentGet {
            dst: 11,
            data: "[1,2]".into(),
        };
        let err = cmd.into_action().err().unwrap();
        assert!(matches!(err, Error::Payload(_)));
        assert!(err.to_string().contains("failed to unmarshal data to get deployment"));
    }

    #[test]
    fn test_deploy_rejects_malformed_deployment() {
        let cmd = RmbCommands::DeploymentDeploy {
            dst: 11,
            data: "{\"version\": \"one\"}".into(),
        };
        assert!(matches!(cmd.into_action(), Err(Error::Payload(_))));
    }
}
