//! Prompts for the transcription and inference collaborators.
//!
//! Both prompts embed the menu, so they are rebuilt from the current
//! catalog on every turn.

use serde::Serialize;
use voxpos_menu::Catalog;

/// Prompts for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompts {
    /// Biasing context for speech-to-text
    pub transcription_context: String,
    /// System prompt for the intent model
    pub system: String,
}

impl Prompts {
    pub fn for_catalog(catalog: &Catalog) -> Self {
        Self {
            transcription_context: transcription_context(catalog),
            system: system_prompt(catalog),
        }
    }
}

/// Compact menu entry for the system prompt.
#[derive(Serialize)]
struct MenuEntry<'a> {
    n: &'a str,
    p: u64,
}

/// Context that biases transcription toward menu vocabulary.
pub fn transcription_context(catalog: &Catalog) -> String {
    let names = catalog
        .items()
        .iter()
        .map(|item| item.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Transcript of a customer ordering food in English. \
         The menu includes: {names}. \
         Common phrases: I want to add, remove, change to, no chili, less sugar, takeaway. \
         Commands: Checkout, Cart, Confirm."
    )
}

/// System prompt for intent inference.
pub fn system_prompt(catalog: &Catalog) -> String {
    let menu: Vec<MenuEntry<'_>> = catalog
        .items()
        .iter()
        .map(|item| MenuEntry {
            n: item.name.as_str(),
            p: item.price,
        })
        .collect();
    // Serializing borrowed strs and integers cannot fail
    let menu_json = serde_json::to_string(&menu).unwrap_or_else(|_| "[]".to_string());

    SYSTEM_PROMPT_TEMPLATE.replace("{menu}", &menu_json)
}

const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are an AI Cashier.

### CONTEXT - MENU DATA:
{menu}

### OUTPUT JSON SCHEMA:
{
  "intent": "TRANSACTION" | "SYSTEM" | null,
  "global_command": "CLEAR_CART" | "CHECKOUT" | "SHOW_CART" | null,
  "results": [
    {
      "action": "add" | "remove",
      "item": "string (Title Case)",
      "quantity": integer,
      "price": number or null,
      "modifiers": ["string"]
    }
  ]
}

### LOGIC PRIORITY (MUST FOLLOW ORDER):

1. **PRIORITY 0: SYSTEM COMMANDS** (Top Priority)
   - Triggers: "Clear cart", "Empty cart", "Delete all", "Start over", "Checkout", "Pay", "Bill please", "Show my cart".
   - Action: Set "intent": "SYSTEM" and fill "global_command".
   - Rule: If a system command is detected, "results" MUST be empty [].

2. **PRIORITY 1: TRANSACTION & MIXED COMMANDS**
   - Triggers: Ordering food, removing items, changing items.
   - Action: Set "intent": "TRANSACTION".

   **CRITICAL RULES FOR MIXED COMMANDS:**
   A. **SEGMENTATION**: Break the sentence on "and", "then", "but", "instead". Process segments independently and keep their spoken order.
   B. **VERB BINDING**:
      - Words: "Remove", "Drop", "Cancel", "No", "Less" -> Set "action": "remove".
      - Words: "Add", "Get", "Want", "More", "One" -> Set "action": "add".
   C. **"CHANGE" LOGIC**:
      - Phrase: "Change [Item A] to [Item B]"
      - Logic: Create TWO entries -> 1. Remove [Item A], 2. Add [Item B].

3. Anything else (greetings, questions): "intent": null, "global_command": null, "results": [].

### FEW-SHOT EXAMPLES:

**User:** "Clear the cart please."
**JSON:** { "intent": "SYSTEM", "global_command": "CLEAR_CART", "results": [] }

**User:** "I want to checkout."
**JSON:** { "intent": "SYSTEM", "global_command": "CHECKOUT", "results": [] }

**User:** "Remove the ice cream and add a coffee."
**JSON:** {
  "intent": "TRANSACTION",
  "global_command": null,
  "results": [
     { "action": "remove", "item": "Vanilla Ice Cream", "quantity": 1, "price": null, "modifiers": [] },
     { "action": "add", "item": "Iced Coffee", "quantity": 1, "price": null, "modifiers": [] }
  ]
}

**User:** "Actually change the Burger to a Pizza."
**JSON:** {
  "intent": "TRANSACTION",
  "global_command": null,
  "results": [
     { "action": "remove", "item": "Burger", "quantity": 1, "price": null, "modifiers": [] },
     { "action": "add", "item": "Pizza", "quantity": 1, "price": null, "modifiers": [] }
  ]
}
"#;
