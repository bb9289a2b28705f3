//! Substrate commands: contracts, twins and signing on TFChain.

use async_trait::async_trait;
use clap::{Args, Subcommand};
use tracing::info;

use crate::chain::{Identity, Substrate};
use crate::cli::session::{node_twin, with_substrate, CommandOutput, SubstrateAction};
use crate::cli::utils::{check_deployment_hash, decode_hex, parse_json, to_json, SolutionProviderId};
use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::types::BatchCreateContractData;

/// Substrate command container
#[derive(Args, Clone, Debug)]
pub struct SubstrateCommand {
    #[command(subcommand)]
    pub command: SubstrateCommands,
}

/// Available substrate operations
#[derive(Subcommand, Clone, Debug)]
pub enum SubstrateCommands {
    /// Reserve a name
    CreateNameContract {
        #[arg(long)]
        name: String,
    },

    /// Rent a whole node
    CreateRentContract {
        #[arg(long, alias = "node_id")]
        node_id: u32,
        /// Solution provider id, 0 for none
        #[arg(long, alias = "solution_provider", default_value = "0")]
        solution_provider: SolutionProviderId,
    },

    /// Create a node contract for a deployment
    CreateNodeContract {
        #[arg(long, alias = "node_id")]
        node_id: u32,
        /// Deployment data stored with the contract
        #[arg(long, default_value = "")]
        body: String,
        /// Deployment hash (32 hex characters)
        #[arg(long)]
        hash: String,
        /// Number of public ips to reserve
        #[arg(long, alias = "public_ips", default_value_t = 0)]
        public_ips: u32,
        #[arg(long, alias = "solution_provider", default_value = "0")]
        solution_provider: SolutionProviderId,
    },

    /// Update body and hash of a node contract
    UpdateNodeContract {
        #[arg(long, alias = "contract_id")]
        contract_id: u64,
        #[arg(long, default_value = "")]
        body: String,
        #[arg(long)]
        hash: String,
    },

    /// Cancel a contract
    CancelContract {
        #[arg(long, alias = "contract_id")]
        contract_id: u64,
    },

    /// Create several contracts in one batch_all extrinsic
    BatchCreateContracts {
        /// JSON list of {node, body, hash, public_ips, solution_provider_id, name}
        #[arg(long, alias = "contracts_data")]
        contracts_data: String,
    },

    /// Cancel several contracts in one batch_all extrinsic
    BatchCancelContracts {
        /// JSON list of contract ids
        #[arg(long, alias = "contract_ids")]
        contract_ids: String,
    },

    /// Twin id of the mnemonic's account
    UserTwin,

    /// Twin id of a node
    NodeTwin {
        #[arg(long, alias = "node_id")]
        node_id: u32,
    },

    /// Sign a hex encoded hash, printing the hex signature
    Sign {
        #[arg(long)]
        hash: String,
    },
}

impl SubstrateCommands {
    /// Decode flag values into the action to run. Returns `None` for
    /// `node-twin`, which does not go through an identity.
    pub fn into_action(self) -> Result<Option<Box<dyn SubstrateAction>>> {
        let action: Box<dyn SubstrateAction> = match self {
            SubstrateCommands::CreateNameContract { name } => Box::new(CreateNameContract { name }),
            SubstrateCommands::CreateRentContract {
                node_id,
                solution_provider,
            } => Box::new(CreateRentContract {
                node_id,
                solution_provider: solution_provider.get(),
            }),
            SubstrateCommands::CreateNodeContract {
                node_id,
                body,
                hash,
                public_ips,
                solution_provider,
            } => {
                check_deployment_hash(&hash)?;
                Box::new(CreateNodeContract {
                    node_id,
                    body,
                    hash,
                    public_ips,
                    solution_provider: solution_provider.get(),
                })
            }
            SubstrateCommands::UpdateNodeContract {
                contract_id,
                body,
                hash,
            } => {
                check_deployment_hash(&hash)?;
                Box::new(UpdateNodeContract {
                    contract_id,
                    body,
                    hash,
                })
            }
            SubstrateCommands::CancelContract { contract_id } => {
                Box::new(CancelContract { contract_id })
            }
            SubstrateCommands::BatchCreateContracts { contracts_data } => {
                let contracts: Vec<BatchCreateContractData> =
                    parse_json("contracts-data", &contracts_data)
                        .map_err(|e| e.context("failed to decode contract data"))?;
                if contracts.is_empty() {
                    return Err(Error::payload("failed to decode contract data: empty list"));
                }
                for item in contracts.iter().filter(|c| !c.is_name_contract()) {
                    check_deployment_hash(&item.hash)
                        .map_err(|e| e.context(format!("contract on node {}", item.node)))?;
                }
                Box::new(BatchCreateContracts { contracts })
            }
            SubstrateCommands::BatchCancelContracts { contract_ids } => {
                let contract_ids: Vec<u64> = parse_json("contract-ids", &contract_ids)
                    .map_err(|e| e.context("failed to decode contract ids"))?;
                if contract_ids.is_empty() {
                    return Err(Error::payload("failed to decode contract ids: empty list"));
                }
                Box::new(BatchCancelContracts { contract_ids })
            }
            SubstrateCommands::UserTwin => Box::new(UserTwin),
            SubstrateCommands::NodeTwin { .. } => return Ok(None),
            SubstrateCommands::Sign { hash } => Box::new(SignHash {
                hash: decode_hex("hash", &hash)
                    .map_err(|e| e.context("failed to decode deployment hash"))?,
            }),
        };
        Ok(Some(action))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateNameContract {
    pub name: String,
}

#[async_trait]
impl SubstrateAction for CreateNameContract {
    async fn run(&self, sub: &dyn Substrate, identity: &Identity) -> Result<CommandOutput> {
        let id = sub
            .create_name_contract(identity, &self.name)
            .await
            .map_err(|e| Error::from(e).context(format!("failed to create name contract {}", self.name)))?;
        info!(contract_id = id, name = %self.name, "Name contract created");
        Ok(CommandOutput::Number(id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRentContract {
    pub node_id: u32,
    pub solution_provider: Option<u64>,
}

#[async_trait]
impl SubstrateAction for CreateRentContract {
    async fn run(&self, sub: &dyn Substrate, identity: &Identity) -> Result<CommandOutput> {
        let id = sub
            .create_rent_contract(identity, self.node_id, self.solution_provider)
            .await
            .map_err(|e| {
                Error::from(e).context(format!("failed to create rent contract, node_id: {}", self.node_id))
            })?;
        info!(contract_id = id, node_id = self.node_id, "Rent contract created");
        Ok(CommandOutput::Number(id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateNodeContract {
    pub node_id: u32,
    pub body: String,
    pub hash: String,
    pub public_ips: u32,
    pub solution_provider: Option<u64>,
}

#[async_trait]
impl SubstrateAction for CreateNodeContract {
    async fn run(&self, sub: &dyn Substrate, identity: &Identity) -> Result<CommandOutput> {
        let id = sub
            .create_node_contract(
                identity,
                self.node_id,
                &self.body,
                &self.hash,
                self.public_ips,
                self.solution_provider,
            )
            .await
            .map_err(|e| {
                Error::from(e).context(format!("failed to create node contract, node_id: {}", self.node_id))
            })?;
        info!(contract_id = id, node_id = self.node_id, "Node contract created");
        Ok(CommandOutput::Number(id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateNodeContract {
    pub contract_id: u64,
    pub body: String,
    pub hash: String,
}

#[async_trait]
impl SubstrateAction for UpdateNodeContract {
    async fn run(&self, sub: &dyn Substrate, identity: &Identity) -> Result<CommandOutput> {
        sub.update_node_contract(identity, self.contract_id, &self.body, &self.hash)
            .await
            .map_err(|e| {
                Error::from(e).context(format!(
                    "failed to update node contract, contract_id: {}",
                    self.contract_id
                ))
            })?;
        Ok(CommandOutput::Empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelContract {
    pub contract_id: u64,
}

#[async_trait]
impl SubstrateAction for CancelContract {
    async fn run(&self, sub: &dyn Substrate, identity: &Identity) -> Result<CommandOutput> {
        sub.cancel_contract(identity, self.contract_id)
            .await
            .map_err(|e| {
                Error::from(e).context(format!("failed to cancel contract, contract_id: {}", self.contract_id))
            })?;
        Ok(CommandOutput::Empty)
    }
}

/// Prints the created contract ids as a JSON list, in input order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCreateContracts {
    pub contracts: Vec<BatchCreateContractData>,
}

#[async_trait]
impl SubstrateAction for BatchCreateContracts {
    async fn run(&self, sub: &dyn Substrate, identity: &Identity) -> Result<CommandOutput> {
        let ids = sub
            .batch_all_create_contract(identity, &self.contracts)
            .await
            .map_err(|e| Error::from(e).context("failed to create contracts"))?;
        Ok(CommandOutput::Text(to_json("contract ids", &ids)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCancelContracts {
    pub contract_ids: Vec<u64>,
}

#[async_trait]
impl SubstrateAction for BatchCancelContracts {
    async fn run(&self, sub: &dyn Substrate, identity: &Identity) -> Result<CommandOutput> {
        sub.batch_cancel_contract(identity, &self.contract_ids)
            .await
            .map_err(|e| Error::from(e).context("failed to cancel contracts"))?;
        Ok(CommandOutput::Empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserTwin;

#[async_trait]
impl SubstrateAction for UserTwin {
    async fn run(&self, sub: &dyn Substrate, identity: &Identity) -> Result<CommandOutput> {
        let twin = sub
            .get_twin_by_pubkey(identity.public_key())
            .await
            .map_err(|e| {
                Error::from(e).context(format!("failed to get twin of {}", identity.ss58_address()))
            })?;
        Ok(CommandOutput::Number(twin as u64))
    }
}

/// Signs raw hash bytes; the chain is not contacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignHash {
    pub hash: Vec<u8>,
}

#[async_trait]
impl SubstrateAction for SignHash {
    async fn run(&self, _sub: &dyn Substrate, identity: &Identity) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(hex::encode(identity.sign(&self.hash))))
    }
}

/// Execute substrate commands
pub async fn execute(cmd: SubstrateCommand, cli: &Cli) -> anyhow::Result<()> {
    let config = cli.config()?;
    let mut stdout = std::io::stdout();

    if let SubstrateCommands::NodeTwin { node_id } = cmd.command {
        node_twin(&config, node_id, &mut stdout).await?;
        return Ok(());
    }

    if let Some(action) = cmd.command.into_action()? {
        with_substrate(&config, &cli.mnemonics, action.as_ref(), &mut stdout).await?;
    }
    Ok(())
}
