/// Bits purchases through the extension host
use serde::{Deserialize, Serialize};

/// Who started a transaction. Twitch reports every purchase on the channel to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initiator {
    CurrentUser,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
}

/// Transaction object delivered by the host on completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub initiator: Initiator,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub product: Option<Product>,
}

impl Transaction {
    pub fn by(initiator: Initiator) -> Self {
        Transaction {
            initiator,
            transaction_id: None,
            product: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionEvent {
    Complete(Transaction),
    Cancelled,
}

/// Purchase facility of the extension host.
///
/// Outcomes arrive later through the handler given to `listen`, not as a return value.
pub trait Commerce {
    fn request_purchase(&self, sku: &str);

    /// Replace the process-wide completion and cancellation handler
    fn listen(&self, handler: Box<dyn Fn(TransactionEvent)>);
}
