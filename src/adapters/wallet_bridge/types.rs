//! Wallet bridge wire types

use serde::{Deserialize, Serialize};

use crate::domain::Network;

/// Body of `GET /network` and `PUT /network`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkBody {
    pub network: Network,
}

/// Error body returned by the bridge when the wallet refuses a call
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeErrorBody {
    #[serde(alias = "message")]
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_body() {
        let body: NetworkBody = serde_json::from_str(r#"{"network":"testnet"}"#).unwrap();
        assert_eq!(body.network, Network::Testnet);
        assert_eq!(
            serde_json::to_string(&NetworkBody { network: Network::Livenet }).unwrap(),
            r#"{"network":"livenet"}"#
        );
    }

    #[test]
    fn test_error_body_accepts_message_alias() {
        let body: BridgeErrorBody =
            serde_json::from_str(r#"{"message":"User rejected the request."}"#).unwrap();
        assert_eq!(body.error, "User rejected the request.");
    }
}
