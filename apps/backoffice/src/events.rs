//! Domain events consumed by the back office.

use serde::{Deserialize, Serialize};

/// Events published after the POS commits a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A sale return row was committed and can be settled.
    SaleReturned { sale_return_id: String },
}

impl DomainEvent {
    pub fn sale_returned(sale_return_id: impl Into<String>) -> Self {
        DomainEvent::SaleReturned {
            sale_return_id: sale_return_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = DomainEvent::sale_returned("ret-1");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "sale_returned", "sale_return_id": "ret-1" })
        );

        let back: DomainEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
