//! Node network configuration as reported over RMB.

use serde::{Deserialize, Deserializer, Serialize};

/// Public network configuration of a node.
///
/// Addresses are kept in the textual form the node reports (`1.2.3.4/24`,
/// `2a02::1`). Missing and `null` fields both read as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicConfig {
    /// Whether the public interface is a vlan or a macvlan
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ipv4: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ipv6: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub gw4: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub gw6: String,
    /// Node domain name, e.g. gent01.dev.grid.tf
    #[serde(default, deserialize_with = "null_as_empty")]
    pub domain: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_config_field_names() {
        let raw = r#"{"type":"macvlan","ipv4":"185.206.122.33/24","ipv6":"2a10:b600:1::cc4:0/64","gw4":"185.206.122.1","gw6":"2a10:b600:1::1","domain":"gent02.dev.grid.tf"}"#;
        let config: PublicConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.kind, "macvlan");
        assert_eq!(config.gw4, "185.206.122.1");

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["type"], "macvlan");
        assert_eq!(json["domain"], "gent02.dev.grid.tf");
    }

    #[test]
    fn test_missing_fields_default() {
        let config: PublicConfig = serde_json::from_str(r#"{"type":""}"#).unwrap();
        assert_eq!(config, PublicConfig::default());
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let raw = r#"{"type":"macvlan","ipv4":"185.206.122.33/24","ipv6":null,"gw4":"185.206.122.1","gw6":null,"domain":null}"#;
        let config: PublicConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.gw4, "185.206.122.1");
        assert_eq!(config.gw6, "");
        assert_eq!(config.ipv6, "");
        assert_eq!(config.domain, "");
    }
}
