use async_trait::async_trait;
use subxt::{blocks::ExtrinsicEvents, dynamic::Value, PolkadotConfig};
use tracing::{debug, info};

use crate::chain::decode::{as_u64, find_in_composite};
use crate::chain::{Error, Identity, Substrate, TfchainClient};
use crate::types::{BatchCreateContractData, NodeInfo};

const SMART_CONTRACT_MODULE: &str = "SmartContractModule";
const UTILITY_MODULE: &str = "Utility";

/// Length of a deployment hash as stored on chain
pub const DEPLOYMENT_HASH_LEN: usize = 32;

/// Encode a deployment hash. The chain stores the 32 ASCII characters of the
/// hex md5 digest the node computes, not the decoded bytes.
pub fn deployment_hash_value(hash: &str) -> Result<Value, Error> {
    let bytes = hash.as_bytes();
    if bytes.len() != DEPLOYMENT_HASH_LEN {
        return Err(Error::Encoding(format!(
            "deployment hash must be {} bytes, got {}",
            DEPLOYMENT_HASH_LEN,
            bytes.len()
        )));
    }
    Ok(Value::from_bytes(bytes))
}

/// `Option<u64>` argument; `None` means no solution provider
pub fn solution_provider_value(solution_provider: Option<u64>) -> Value {
    match solution_provider {
        Some(id) => Value::unnamed_variant("Some", vec![Value::u128(id as u128)]),
        None => Value::unnamed_variant("None", vec![]),
    }
}

/// Named call arguments for `create_node_contract`
fn node_contract_fields(
    node_id: u32,
    body: &str,
    hash: &str,
    public_ips: u32,
    solution_provider: Option<u64>,
) -> Result<Vec<(&'static str, Value)>, Error> {
    Ok(vec![
        ("node_id", Value::u128(node_id as u128)),
        ("deployment_hash", deployment_hash_value(hash)?),
        ("deployment_data", Value::from_bytes(body.as_bytes())),
        ("public_ips", Value::u128(public_ips as u128)),
        (
            "solution_provider_id",
            solution_provider_value(solution_provider),
        ),
    ])
}

/// Wrap a smart contract pallet call into a `RuntimeCall` for batching
fn runtime_call(function: &str, fields: Vec<(&'static str, Value)>) -> Value {
    let pallet_call = Value::named_variant(function, fields);
    Value::unnamed_variant(SMART_CONTRACT_MODULE, vec![pallet_call])
}

/// Build the batched call for one item of a batch-create request
pub fn create_call_value(item: &BatchCreateContractData) -> Result<Value, Error> {
    if item.is_name_contract() {
        return Ok(runtime_call(
            "create_name_contract",
            vec![("name", Value::from_bytes(item.name.as_bytes()))],
        ));
    }

    let fields = node_contract_fields(
        item.node,
        &item.body,
        &item.hash,
        item.public_ips,
        item.solution_provider_id,
    )?;
    Ok(runtime_call("create_node_contract", fields))
}

/// Build the batched call cancelling one contract
pub fn cancel_call_value(contract_id: u64) -> Value {
    runtime_call(
        "cancel_contract",
        vec![("contract_id", Value::u128(contract_id as u128))],
    )
}

/// Contract ids carried by `SmartContractModule.<variant>` events, in the
/// order they were emitted.
fn contract_ids(events: &ExtrinsicEvents<PolkadotConfig>, variant: &str) -> Result<Vec<u64>, Error> {
    let mut ids = Vec::new();
    for event in events.iter() {
        let event = event.map_err(|e| Error::Decoding(format!("Failed to read events: {}", e)))?;
        if event.pallet_name() != SMART_CONTRACT_MODULE || event.variant_name() != variant {
            continue;
        }

        let fields = event
            .field_values()
            .map_err(|e| Error::Decoding(format!("Failed to decode {} event: {}", variant, e)))?;
        let id = find_in_composite(&fields, "contract_id")
            .and_then(as_u64)
            .ok_or_else(|| Error::Decoding(format!("{} event without contract_id", variant)))?;
        ids.push(id);
    }
    Ok(ids)
}

fn single_contract_id(events: &ExtrinsicEvents<PolkadotConfig>, variant: &str) -> Result<u64, Error> {
    contract_ids(events, variant)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound(format!("{} event", variant)))
}

impl TfchainClient {
    async fn submit_contract_call(
        &self,
        identity: &Identity,
        function: &str,
        fields: Vec<(&'static str, Value)>,
    ) -> Result<ExtrinsicEvents<PolkadotConfig>, Error> {
        let args = fields.into_iter().map(|(_, value)| value).collect();
        self.submit_extrinsic(SMART_CONTRACT_MODULE, function, args, &identity.signer())
            .await
    }

    async fn submit_batch_all(
        &self,
        identity: &Identity,
        calls: Vec<Value>,
    ) -> Result<ExtrinsicEvents<PolkadotConfig>, Error> {
        if calls.is_empty() {
            return Err(Error::Encoding("Cannot batch empty call list".to_string()));
        }
        let args = vec![Value::unnamed_composite(calls)];
        self.submit_extrinsic(UTILITY_MODULE, "batch_all", args, &identity.signer())
            .await
    }
}

#[async_trait]
impl Substrate for TfchainClient {
    async fn create_name_contract(&self, identity: &Identity, name: &str) -> Result<u64, Error> {
        let events = self
            .submit_contract_call(
                identity,
                "create_name_contract",
                vec![("name", Value::from_bytes(name.as_bytes()))],
            )
            .await?;
        let id = single_contract_id(&events, "ContractCreated")?;
        info!(contract_id = id, name, "Name contract created");
        Ok(id)
    }

    async fn create_rent_contract(
        &self,
        identity: &Identity,
        node_id: u32,
        solution_provider: Option<u64>,
    ) -> Result<u64, Error> {
        let fields = vec![
            ("node_id", Value::u128(node_id as u128)),
            (
                "solution_provider_id",
                solution_provider_value(solution_provider),
            ),
        ];
        let events = self
            .submit_contract_call(identity, "create_rent_contract", fields)
            .await?;
        let id = single_contract_id(&events, "ContractCreated")?;
        info!(contract_id = id, node_id, "Rent contract created");
        Ok(id)
    }

    async fn create_node_contract(
        &self,
        identity: &Identity,
        node_id: u32,
        body: &str,
        hash: &str,
        public_ips: u32,
        solution_provider: Option<u64>,
    ) -> Result<u64, Error> {
        let fields = node_contract_fields(node_id, body, hash, public_ips, solution_provider)?;
        let events = self
            .submit_contract_call(identity, "create_node_contract", fields)
            .await?;
        let id = single_contract_id(&events, "ContractCreated")?;
        info!(contract_id = id, node_id, "Node contract created");
        Ok(id)
    }

    async fn update_node_contract(
        &self,
        identity: &Identity,
        contract_id: u64,
        body: &str,
        hash: &str,
    ) -> Result<u64, Error> {
        let fields = vec![
            ("contract_id", Value::u128(contract_id as u128)),
            ("deployment_hash", deployment_hash_value(hash)?),
            ("deployment_data", Value::from_bytes(body.as_bytes())),
        ];
        let events = self
            .submit_contract_call(identity, "update_node_contract", fields)
            .await?;
        let id = single_contract_id(&events, "ContractUpdated")?;
        info!(contract_id = id, "Node contract updated");
        Ok(id)
    }

    async fn cancel_contract(&self, identity: &Identity, contract_id: u64) -> Result<(), Error> {
        self.submit_contract_call(
            identity,
            "cancel_contract",
            vec![("contract_id", Value::u128(contract_id as u128))],
        )
        .await?;
        info!(contract_id, "Contract cancelled");
        Ok(())
    }

    async fn batch_all_create_contract(
        &self,
        identity: &Identity,
        contracts: &[BatchCreateContractData],
    ) -> Result<Vec<u64>, Error> {
        let calls = contracts
            .iter()
            .map(create_call_value)
            .collect::<Result<Vec<_>, _>>()?;
        let events = self.submit_batch_all(identity, calls).await?;
        let ids = contract_ids(&events, "ContractCreated")?;
        debug!(?ids, "Batch created contracts");
        Ok(ids)
    }

    async fn batch_cancel_contract(
        &self,
        identity: &Identity,
        contract_ids: &[u64],
    ) -> Result<(), Error> {
        let calls = contract_ids.iter().copied().map(cancel_call_value).collect();
        self.submit_batch_all(identity, calls).await?;
        debug!(?contract_ids, "Batch cancelled contracts");
        Ok(())
    }

    async fn get_twin_by_pubkey(&self, public_key: &[u8; 32]) -> Result<u32, Error> {
        self.twin_id_by_account(public_key).await
    }

    async fn get_node(&self, node_id: u32) -> Result<NodeInfo, Error> {
        self.node(node_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subxt::ext::scale_value::{Composite, ValueDef};

    const HASH: &str = "a3f6c1d0e2b4958677a1b2c3d4e5f607";

    #[test]
    fn test_hash_must_be_32_bytes() {
        assert!(deployment_hash_value(HASH).is_ok());
        assert!(deployment_hash_value("abc").is_err());
        assert!(deployment_hash_value(&format!("{}00", HASH)).is_err());
    }

    #[test]
    fn test_solution_provider_encoding() {
        match solution_provider_value(None).value {
            ValueDef::Variant(v) => {
                assert_eq!(v.name, "None");
                assert!(v.values.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
        match solution_provider_value(Some(3)).value {
            ValueDef::Variant(v) => assert_eq!(v.name, "Some"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_name_item_becomes_name_contract_call() {
        let item = BatchCreateContractData {
            node: 9,
            hash: "ignored".into(),
            name: "site".into(),
            ..Default::default()
        };
        let call = create_call_value(&item).unwrap();
        let ValueDef::Variant(pallet) = call.value else {
            panic!("expected RuntimeCall variant");
        };
        assert_eq!(pallet.name, SMART_CONTRACT_MODULE);
        let Composite::Unnamed(inner) = pallet.values else {
            panic!("expected unnamed RuntimeCall payload");
        };
        let ValueDef::Variant(function) = &inner[0].value else {
            panic!("expected pallet call variant");
        };
        assert_eq!(function.name, "create_name_contract");
    }

    #[test]
    fn test_node_item_validates_hash() {
        let item = BatchCreateContractData::node_contract(9, "", "short", 0, None);
        assert!(create_call_value(&item).is_err());

        let item = BatchCreateContractData::node_contract(9, "", HASH, 1, Some(2));
        assert!(create_call_value(&item).is_ok());
    }
}
