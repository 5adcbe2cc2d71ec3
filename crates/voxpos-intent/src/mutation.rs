//! Resolved cart mutations.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Normalized cart verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Add,
    Remove,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Remove => "remove",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something the resolver recovered from and the caller should see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MutationFlag {
    /// The verb was not `add`/`remove`; the mutation defaulted to add.
    UnknownAction { raw: String },
    /// No catalog match and no usable price in the payload.
    Unpriced,
}

/// A normalized add/remove ready to apply to a cart.
///
/// Serializes with the same keys as a payload entry (`item`, `price`) so
/// clients can consume resolved and raw results alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMutation {
    pub action: Action,
    #[serde(rename = "item")]
    pub item_name: SmolStr,
    /// Always >= 1
    pub quantity: u32,
    /// Minor currency units; `None` only when unpriced
    #[serde(rename = "price")]
    pub unit_price: Option<u64>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<MutationFlag>,
}

impl ResolvedMutation {
    pub fn add(item_name: impl Into<SmolStr>, quantity: u32, unit_price: Option<u64>) -> Self {
        Self::new(Action::Add, item_name, quantity, unit_price)
    }

    pub fn remove(item_name: impl Into<SmolStr>, quantity: u32, unit_price: Option<u64>) -> Self {
        Self::new(Action::Remove, item_name, quantity, unit_price)
    }

    fn new(
        action: Action,
        item_name: impl Into<SmolStr>,
        quantity: u32,
        unit_price: Option<u64>,
    ) -> Self {
        Self {
            action,
            item_name: item_name.into(),
            quantity: quantity.max(1),
            unit_price,
            modifiers: Vec::new(),
            flags: Vec::new(),
        }
    }

    /// True when the verb had to be guessed.
    pub fn is_low_confidence(&self) -> bool {
        self.flags
            .iter()
            .any(|f| matches!(f, MutationFlag::UnknownAction { .. }))
    }

    pub fn is_unpriced(&self) -> bool {
        self.unit_price.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let mut mutation = ResolvedMutation::add("Iced Coffee", 2, Some(25000));
        mutation.modifiers.push("less sugar".to_string());

        let json = serde_json::to_value(&mutation).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "action": "add",
                "item": "Iced Coffee",
                "quantity": 2,
                "price": 25000,
                "modifiers": ["less sugar"]
            })
        );
    }

    #[test]
    fn test_flags() {
        let mut mutation = ResolvedMutation::add("Pizza", 1, None);
        assert!(mutation.is_unpriced());
        assert!(!mutation.is_low_confidence());

        mutation.flags.push(MutationFlag::UnknownAction {
            raw: "update".to_string(),
        });
        assert!(mutation.is_low_confidence());

        let json = serde_json::to_value(&mutation).unwrap();
        assert_eq!(json["flags"][0]["kind"], "unknown_action");
        assert_eq!(json["flags"][0]["raw"], "update");
    }

    #[test]
    fn test_quantity_floor() {
        assert_eq!(ResolvedMutation::remove("Coke", 0, None).quantity, 1);
    }
}
