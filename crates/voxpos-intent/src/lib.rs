//! # Voxpos Intent Model
//!
//! The intent payload is the JSON object the inference service returns when
//! it interprets a customer's utterance. Nothing in it can be trusted: any
//! field may be absent, null, or of the wrong type. This crate decodes it
//! once, through [`validate`], into sum types with explicit unset and
//! unrecognized variants, so later stages never guess at shapes.
//!
//! ## Example
//!
//! ```json
//! {
//!   "intent": "TRANSACTION",
//!   "global_command": null,
//!   "results": [
//!     {"action": "remove", "item": "Vanilla Ice Cream", "quantity": 1, "price": null, "modifiers": []},
//!     {"action": "add", "item": "Iced Coffee", "quantity": 1, "price": null, "modifiers": ["less sugar"]}
//!   ]
//! }
//! ```

mod mutation;
mod payload;
mod validation;

pub use mutation::*;
pub use payload::*;
pub use validation::*;
