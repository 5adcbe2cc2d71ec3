//! Ordering turn driver for voxpos.
//!
//! One turn runs the engine pipeline over a single inference payload:
//! 1. Validation (a malformed payload aborts the turn, nothing is applied)
//! 2. Resolution against the catalog
//! 3. Application to the session cart, as a command or an ordered batch
//!
//! The payload is fully resolved before the cart is touched, so a turn that
//! fails early never leaves partial mutations behind.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use voxpos_cart::{BatchReport, Cart, CartSnapshot, CommandOutcome};
use voxpos_intent::{ValidatedPayload, ValidationError};
use voxpos_menu::Catalog;
use voxpos_resolver::{Resolution, Resolver, UnknownActionPolicy};

/// Turn configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnConfig {
    /// How unrecognized verbs are treated.
    pub unknown_action: UnknownActionPolicy,
}

/// Everything the caller needs after one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// Resolved payload: intent, global command, mutations, notes.
    #[serde(flatten)]
    pub resolution: Resolution,
    /// Present when mutations were applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchReport>,
    /// Final contents when the turn checked out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<CartSnapshot>,
    /// The cart after the turn.
    pub cart: CartSnapshot,
}

impl TurnOutcome {
    /// False when a batch stopped part-way.
    pub fn is_complete(&self) -> bool {
        self.batch.as_ref().map_or(true, |b| b.complete)
    }
}

/// Errors that abort a turn.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Run a turn over an already deserialized payload.
pub fn run_turn(
    raw: &Value,
    catalog: &Catalog,
    cart: &mut Cart,
    config: TurnConfig,
) -> Result<TurnOutcome, TurnError> {
    let payload = voxpos_intent::validate(raw)?;
    Ok(apply_payload(&payload, catalog, cart, config))
}

/// Run a turn over raw model output text.
pub fn run_text_turn(
    text: &str,
    catalog: &Catalog,
    cart: &mut Cart,
    config: TurnConfig,
) -> Result<TurnOutcome, TurnError> {
    let payload = voxpos_intent::parse_payload(text)?;
    Ok(apply_payload(&payload, catalog, cart, config))
}

/// Resolve a validated payload and apply it to the cart.
pub fn apply_payload(
    payload: &ValidatedPayload,
    catalog: &Catalog,
    cart: &mut Cart,
    config: TurnConfig,
) -> TurnOutcome {
    let resolution = Resolver::new(catalog)
        .with_unknown_action(config.unknown_action)
        .resolve(payload);

    let mut batch = None;
    let mut receipt = None;

    if let Some(command) = resolution.global_command {
        match cart.apply_command(command) {
            CommandOutcome::CheckedOut(final_cart) => receipt = Some(final_cart),
            CommandOutcome::Cleared(_) | CommandOutcome::Shown(_) => {}
        }
    } else if !resolution.results.is_empty() {
        let report = cart.apply_batch(&resolution.results);
        info!("Applied {}/{} mutations", report.applied, report.total);
        batch = Some(report);
    } else {
        debug!("Nothing to apply this turn");
    }

    TurnOutcome {
        resolution,
        batch,
        receipt,
        cart: cart.snapshot(),
    }
}
