//! Validated intent payload types.

use serde::{Deserialize, Serialize};

/// Classification of an utterance by the inference service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "Option<String>")]
pub enum IntentField {
    /// Ordering food, removing or changing items
    Transaction,
    /// A cart-wide command
    System,
    /// Absent or null
    Unset,
    /// Any other value the service produced
    Unrecognized(String),
}

impl IntentField {
    /// Decode an intent literal.
    pub fn from_literal(literal: &str) -> Self {
        match literal {
            "TRANSACTION" => IntentField::Transaction,
            "SYSTEM" => IntentField::System,
            other => IntentField::Unrecognized(other.to_string()),
        }
    }

    /// The wire form, `None` when unset.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            IntentField::Transaction => Some("TRANSACTION"),
            IntentField::System => Some("SYSTEM"),
            IntentField::Unset => None,
            IntentField::Unrecognized(raw) => Some(raw),
        }
    }
}

impl From<IntentField> for Option<String> {
    fn from(field: IntentField) -> Self {
        field.as_str().map(str::to_string)
    }
}

/// A cart-wide operation, independent of any item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlobalCommand {
    ClearCart,
    Checkout,
    ShowCart,
}

impl GlobalCommand {
    /// Decode a command literal. Only the exact upper-case forms are known.
    pub fn from_literal(literal: &str) -> Option<Self> {
        match literal {
            "CLEAR_CART" => Some(GlobalCommand::ClearCart),
            "CHECKOUT" => Some(GlobalCommand::Checkout),
            "SHOW_CART" => Some(GlobalCommand::ShowCart),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalCommand::ClearCart => "CLEAR_CART",
            GlobalCommand::Checkout => "CHECKOUT",
            GlobalCommand::ShowCart => "SHOW_CART",
        }
    }
}

impl std::fmt::Display for GlobalCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `global_command` field after decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "Option<String>")]
pub enum CommandField {
    Known(GlobalCommand),
    Unset,
    Unrecognized(String),
}

impl CommandField {
    pub fn from_literal(literal: &str) -> Self {
        match GlobalCommand::from_literal(literal) {
            Some(command) => CommandField::Known(command),
            None => CommandField::Unrecognized(literal.to_string()),
        }
    }

    pub fn known(&self) -> Option<GlobalCommand> {
        match self {
            CommandField::Known(command) => Some(*command),
            _ => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, CommandField::Unset)
    }
}

impl From<CommandField> for Option<String> {
    fn from(field: CommandField) -> Self {
        match field {
            CommandField::Known(command) => Some(command.as_str().to_string()),
            CommandField::Unset => None,
            CommandField::Unrecognized(raw) => Some(raw),
        }
    }
}

/// One per-segment entry of the payload, with safe defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResultEntry {
    /// Verb as produced by the service (not yet normalized)
    pub action: Option<String>,
    /// Item name as spoken/interpreted
    pub item: String,
    /// Requested quantity, if usable
    pub quantity: Option<i64>,
    /// Unit price supplied by the service, if any
    pub price: Option<f64>,
    /// Free-text annotations ("no chili", "less sugar")
    pub modifiers: Vec<String>,
}

impl RawResultEntry {
    /// An entry for `item` with every optional key at its default.
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            action: None,
            item: item.into(),
            quantity: Some(1),
            price: None,
            modifiers: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_quantity(mut self, quantity: Option<i64>) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_price(mut self, price: Option<f64>) -> Self {
        self.price = price;
        self
    }

    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifiers.push(modifier.into());
        self
    }
}

/// An intent payload that passed the validation boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPayload {
    pub intent: IntentField,
    pub global_command: CommandField,
    /// Entries in utterance order
    pub results: Vec<RawResultEntry>,
}

impl ValidatedPayload {
    /// A transaction over the given entries.
    pub fn transaction(results: Vec<RawResultEntry>) -> Self {
        Self {
            intent: IntentField::Transaction,
            global_command: CommandField::Unset,
            results,
        }
    }

    /// A system command with no entries.
    pub fn system(command: GlobalCommand) -> Self {
        Self {
            intent: IntentField::System,
            global_command: CommandField::Known(command),
            results: Vec::new(),
        }
    }
}
