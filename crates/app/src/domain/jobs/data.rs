//! Job Data

use serde::{Deserialize, Serialize};

use crate::domain::orders::records::OrderUuid;

/// Work that can be deferred through the delay queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Job {
    /// Close the order and release its stock if it is still unpaid.
    CloseOrder { order_uuid: OrderUuid },
}

impl Job {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CloseOrder { .. } => "close_order",
        }
    }
}
