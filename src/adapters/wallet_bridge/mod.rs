//! Wallet Bridge Adapter
//!
//! Implements `WalletPort` over HTTP. The bridge mirrors the wallet
//! extension's API:
//!
//! | Method | Path                        | Body                      |
//! |--------|-----------------------------|---------------------------|
//! | GET    | `/network`                  | `{"network": "livenet"}`  |
//! | PUT    | `/network`                  | `{"network": "testnet"}`  |
//! | GET    | `/accounts`                 | `["bc1q..."]`             |
//! | POST   | `/accounts/request`         | `["bc1q..."]`             |
//! | GET    | `/balance/{address}`        | `{confirmed, unconfirmed, total}` |
//! | GET    | `/inscriptions?offset&limit`| `{total, list}`           |

mod client;
mod types;

pub use client::{WalletBridgeClient, WalletBridgeConfig};
pub use types::NetworkBody;
