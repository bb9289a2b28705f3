use parity_scale_codec::Encode;
use sp_core::crypto::AccountId32;
use subxt::dynamic::Value;
use tracing::debug;

use crate::chain::decode::{as_u32, find_u32};
use crate::chain::{Error, TfchainClient};
use crate::types::NodeInfo;

const TFGRID_MODULE: &str = "TfgridModule";

impl TfchainClient {
    /// Twin id registered for the account owning `public_key`
    pub async fn twin_id_by_account(&self, public_key: &[u8; 32]) -> Result<u32, Error> {
        let account = AccountId32::from(*public_key);
        let key = Value::from_bytes(account.encode());

        let value = self
            .storage(TFGRID_MODULE, "TwinIdByAccountID", vec![key])
            .await?
            .ok_or_else(|| Error::NotFound(format!("twin for account {}", account)))?;

        let twin_id = as_u32(&value)
            .ok_or_else(|| Error::Decoding(format!("unexpected twin id value {:?}", value)))?;
        debug!(twin_id, "Resolved twin");
        Ok(twin_id)
    }

    /// On-chain node record
    pub async fn node(&self, node_id: u32) -> Result<NodeInfo, Error> {
        let value = self
            .storage(TFGRID_MODULE, "Nodes", vec![Value::u128(node_id as u128)])
            .await?
            .ok_or_else(|| Error::NotFound(format!("node {}", node_id)))?;

        node_from_value(node_id, &value)
    }
}

fn node_from_value<T: std::fmt::Debug>(
    node_id: u32,
    value: &subxt::ext::scale_value::Value<T>,
) -> Result<NodeInfo, Error> {
    let twin_id = find_u32(value, "twin_id")
        .ok_or_else(|| Error::Decoding(format!("node {} without twin_id", node_id)))?;
    let farm_id = find_u32(value, "farm_id").unwrap_or_default();
    let id = find_u32(value, "id").unwrap_or(node_id);

    Ok(NodeInfo {
        id,
        farm_id,
        twin_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_from_value() {
        let value = Value::named_composite([
            ("version", Value::u128(5)),
            ("id", Value::u128(11)),
            ("farm_id", Value::u128(1)),
            ("twin_id", Value::u128(20)),
            ("location", Value::named_composite([("city", Value::string("Gent"))])),
        ]);

        let node = node_from_value(11, &value).unwrap();
        assert_eq!(
            node,
            NodeInfo {
                id: 11,
                farm_id: 1,
                twin_id: 20
            }
        );
    }

    #[test]
    fn test_node_without_twin() {
        let value = Value::named_composite([("id", Value::u128(11))]);
        assert!(matches!(
            node_from_value(11, &value),
            Err(Error::Decoding(_))
        ));
    }
}
