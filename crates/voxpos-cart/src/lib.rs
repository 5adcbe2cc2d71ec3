//! Cart state machine for voxpos.
//!
//! A cart is either `Active` (accepting mutations) or `CheckedOut`.
//! Clearing empties the cart and leaves it active. Checking out reports the
//! final contents and total and then empties it; the next mutation after a
//! checkout starts a fresh active cart.
//!
//! The cart never computes payment. Totals only cover lines with a known
//! unit price.

use indexmap::IndexMap;
use serde::Serialize;
use smol_str::SmolStr;
use thiserror::Error;
use tracing::{debug, info, warn};
use voxpos_intent::{Action, GlobalCommand, ResolvedMutation};

/// Lifecycle state of a cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    #[default]
    Active,
    CheckedOut,
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    /// Display name of the first mutation that created the line
    pub name: SmolStr,
    pub quantity: u32,
    pub unit_price: Option<u64>,
}

impl CartLine {
    /// `None` when the line is unpriced.
    pub fn line_total(&self) -> Option<u64> {
        self.unit_price
            .map(|price| price.saturating_mul(u64::from(self.quantity)))
    }
}

/// Cart errors.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartError {
    #[error("quantity overflow for {item}: {current} + {added}")]
    QuantityOverflow {
        item: SmolStr,
        current: u32,
        added: u32,
    },
}

/// Point-in-time view of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    pub status: CartStatus,
    pub lines: Vec<CartLine>,
    /// Sum over priced lines, minor currency units
    pub total: u64,
    /// Lines that still need manual pricing
    pub unpriced_lines: usize,
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Outcome of applying a batch of mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Mutations applied, in order
    pub applied: usize,
    /// Mutations in the batch
    pub total: usize,
    pub complete: bool,
    /// The error that stopped the batch, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CartError>,
}

/// Result of a global command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Cleared(CartSnapshot),
    /// The receipt: contents and total at checkout.
    CheckedOut(CartSnapshot),
    Shown(CartSnapshot),
}

impl CommandOutcome {
    pub fn snapshot(&self) -> &CartSnapshot {
        match self {
            CommandOutcome::Cleared(s) | CommandOutcome::CheckedOut(s) | CommandOutcome::Shown(s) => s,
        }
    }
}

/// One session's cart, keyed by lower-cased item name.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: IndexMap<SmolStr, CartLine>,
    status: CartStatus,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> CartStatus {
        self.status
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Lines in the order they were first added.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    /// Quantity held for an item (0 if absent).
    pub fn quantity_of(&self, name: &str) -> u32 {
        self.lines
            .get(&item_key(name))
            .map_or(0, |line| line.quantity)
    }

    /// Sum of quantity x unit price over priced lines.
    pub fn total(&self) -> u64 {
        self.lines
            .values()
            .filter_map(CartLine::line_total)
            .fold(0u64, u64::saturating_add)
    }

    pub fn snapshot(&self) -> CartSnapshot {
        let lines: Vec<CartLine> = self.lines.values().cloned().collect();
        let unpriced_lines = lines.iter().filter(|l| l.unit_price.is_none()).count();
        CartSnapshot {
            status: self.status,
            lines,
            total: self.total(),
            unpriced_lines,
        }
    }

    /// Apply one mutation.
    ///
    /// A checked-out cart is reset to an empty active cart first, so any
    /// mutation after checkout, a remove included, starts a new order. A
    /// failed mutation leaves the cart as it was after that reset.
    pub fn apply(&mut self, mutation: &ResolvedMutation) -> Result<(), CartError> {
        if self.status == CartStatus::CheckedOut {
            info!("Starting a new cart after checkout");
            self.lines.clear();
            self.status = CartStatus::Active;
        }

        let key = item_key(&mutation.item_name);
        match mutation.action {
            Action::Add => self.add(key, mutation),
            Action::Remove => {
                self.remove(&key, mutation.quantity);
                Ok(())
            }
        }
    }

    /// Apply mutations in order, stopping at the first error.
    pub fn apply_batch(&mut self, mutations: &[ResolvedMutation]) -> BatchReport {
        let mut applied = 0;
        for mutation in mutations {
            if let Err(error) = self.apply(mutation) {
                warn!(
                    "Batch stopped after {}/{} mutations: {}",
                    applied,
                    mutations.len(),
                    error
                );
                return BatchReport {
                    applied,
                    total: mutations.len(),
                    complete: false,
                    error: Some(error),
                };
            }
            applied += 1;
        }

        BatchReport {
            applied,
            total: mutations.len(),
            complete: true,
            error: None,
        }
    }

    /// Apply a global command.
    pub fn apply_command(&mut self, command: GlobalCommand) -> CommandOutcome {
        match command {
            GlobalCommand::ClearCart => {
                self.clear();
                CommandOutcome::Cleared(self.snapshot())
            }
            GlobalCommand::Checkout => CommandOutcome::CheckedOut(self.checkout()),
            GlobalCommand::ShowCart => CommandOutcome::Shown(self.snapshot()),
        }
    }

    /// Empty the cart; it stays (or becomes) active.
    pub fn clear(&mut self) {
        info!("Clearing cart ({} lines)", self.lines.len());
        self.lines.clear();
        self.status = CartStatus::Active;
    }

    /// Close the cart and return its final contents.
    pub fn checkout(&mut self) -> CartSnapshot {
        self.status = CartStatus::CheckedOut;
        let receipt = self.snapshot();
        info!(
            "Checkout: {} lines, total {} ({} unpriced)",
            receipt.lines.len(),
            receipt.total,
            receipt.unpriced_lines
        );
        self.lines.clear();
        receipt
    }

    fn add(&mut self, key: SmolStr, mutation: &ResolvedMutation) -> Result<(), CartError> {
        match self.lines.get_mut(&key) {
            Some(line) => {
                let quantity = line.quantity.checked_add(mutation.quantity).ok_or_else(|| {
                    CartError::QuantityOverflow {
                        item: line.name.clone(),
                        current: line.quantity,
                        added: mutation.quantity,
                    }
                })?;
                line.quantity = quantity;
                if line.unit_price.is_none() {
                    line.unit_price = mutation.unit_price;
                }
            }
            None => {
                self.lines.insert(
                    key,
                    CartLine {
                        name: mutation.item_name.clone(),
                        quantity: mutation.quantity,
                        unit_price: mutation.unit_price,
                    },
                );
            }
        }
        Ok(())
    }

    fn remove(&mut self, key: &str, quantity: u32) {
        let Some(line) = self.lines.get_mut(key) else {
            debug!("Remove of '{}' ignored: not in cart", key);
            return;
        };

        if line.quantity <= quantity {
            self.lines.shift_remove(key);
        } else {
            line.quantity -= quantity;
        }
    }
}

fn item_key(name: &str) -> SmolStr {
    SmolStr::new(name.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coffee(quantity: u32) -> ResolvedMutation {
        ResolvedMutation::add("Iced Coffee", quantity, Some(25000))
    }

    #[test]
    fn test_add_then_remove() {
        let mut cart = Cart::new();
        cart.apply(&coffee(2)).unwrap();
        cart.apply(&ResolvedMutation::remove("Iced Coffee", 1, Some(25000)))
            .unwrap();

        assert_eq!(cart.quantity_of("Iced Coffee"), 1);
        assert_eq!(cart.total(), 25000);
    }

    #[test]
    fn test_remove_clamps_at_zero() {
        let mut cart = Cart::new();
        cart.apply(&ResolvedMutation::remove("Iced Coffee", 5, None))
            .unwrap();
        assert!(cart.is_empty());

        cart.apply(&coffee(2)).unwrap();
        cart.apply(&ResolvedMutation::remove("iced coffee", 5, None))
            .unwrap();
        assert_eq!(cart.quantity_of("Iced Coffee"), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_keys_ignore_case() {
        let mut cart = Cart::new();
        cart.apply(&coffee(1)).unwrap();
        cart.apply(&ResolvedMutation::add("ICED COFFEE", 1, Some(25000)))
            .unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of("iced coffee"), 2);
        assert_eq!(cart.snapshot().lines[0].name, "Iced Coffee");
    }

    #[test]
    fn test_add_fills_missing_price() {
        let mut cart = Cart::new();
        cart.apply(&ResolvedMutation::add("Pizza", 1, None)).unwrap();
        assert_eq!(cart.total(), 0);
        assert_eq!(cart.snapshot().unpriced_lines, 1);

        cart.apply(&ResolvedMutation::add("Pizza", 1, Some(90000)))
            .unwrap();
        assert_eq!(cart.total(), 180000);
        assert_eq!(cart.snapshot().unpriced_lines, 0);
    }

    #[test]
    fn test_total_skips_unpriced() {
        let mut cart = Cart::new();
        cart.apply(&coffee(2)).unwrap();
        cart.apply(&ResolvedMutation::add("Mystery Dish", 3, None))
            .unwrap();
        assert_eq!(cart.total(), 50000);
    }

    #[test]
    fn test_batch_order() {
        let mut cart = Cart::new();
        cart.apply(&ResolvedMutation::add("Vanilla Ice Cream", 1, Some(15000)))
            .unwrap();

        let report = cart.apply_batch(&[
            ResolvedMutation::remove("Vanilla Ice Cream", 1, Some(15000)),
            coffee(1),
        ]);

        assert!(report.complete);
        assert_eq!(report.applied, 2);
        let names: Vec<_> = cart.lines().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Iced Coffee"]);
    }

    #[test]
    fn test_batch_stops_on_overflow() {
        let mut cart = Cart::new();
        cart.apply(&coffee(u32::MAX)).unwrap();

        let report = cart.apply_batch(&[
            ResolvedMutation::add("Coke", 1, Some(15000)),
            coffee(1),
            ResolvedMutation::add("Sprite", 1, Some(15000)),
        ]);

        assert!(!report.complete);
        assert_eq!(report.applied, 1);
        assert_eq!(report.total, 3);
        assert!(matches!(
            report.error,
            Some(CartError::QuantityOverflow { .. })
        ));
        // Partial state: Coke applied, Sprite not
        assert_eq!(cart.quantity_of("Coke"), 1);
        assert_eq!(cart.quantity_of("Sprite"), 0);
        assert_eq!(cart.quantity_of("Iced Coffee"), u32::MAX);
    }

    #[test]
    fn test_clear_then_show() {
        let mut cart = Cart::new();
        cart.apply(&coffee(3)).unwrap();

        cart.apply_command(GlobalCommand::ClearCart);
        let outcome = cart.apply_command(GlobalCommand::ShowCart);

        let snapshot = outcome.snapshot();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.total, 0);
        assert_eq!(snapshot.status, CartStatus::Active);
    }

    #[test]
    fn test_checkout_reports_and_resets() {
        let mut cart = Cart::new();
        cart.apply(&coffee(2)).unwrap();
        cart.apply(&ResolvedMutation::add("Apple Pie", 1, Some(20000)))
            .unwrap();

        let outcome = cart.apply_command(GlobalCommand::Checkout);
        let CommandOutcome::CheckedOut(receipt) = outcome else {
            panic!("expected checkout");
        };
        assert_eq!(receipt.total, 70000);
        assert_eq!(receipt.lines.len(), 2);
        assert_eq!(receipt.status, CartStatus::CheckedOut);

        assert_eq!(cart.status(), CartStatus::CheckedOut);
        assert!(cart.is_empty());

        // Next mutation starts a new cart
        cart.apply(&coffee(1)).unwrap();
        assert_eq!(cart.status(), CartStatus::Active);
        assert_eq!(cart.total(), 25000);
    }

    #[test]
    fn test_remove_after_checkout_starts_new_cart() {
        let mut cart = Cart::new();
        cart.apply(&coffee(2)).unwrap();
        cart.checkout();

        cart.apply(&ResolvedMutation::remove("Iced Coffee", 1, Some(25000)))
            .unwrap();
        assert_eq!(cart.status(), CartStatus::Active);
        assert!(cart.is_empty());
        assert_eq!(cart.snapshot().total, 0);

        cart.apply(&ResolvedMutation::add("Coke", 1, Some(15000)))
            .unwrap();
        let names: Vec<_> = cart.lines().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Coke"]);
        assert_eq!(cart.total(), 15000);
    }

    #[test]
    fn test_show_is_read_only() {
        let mut cart = Cart::new();
        cart.apply(&coffee(1)).unwrap();
        let before = cart.snapshot();
        cart.apply_command(GlobalCommand::ShowCart);
        assert_eq!(cart.snapshot(), before);
    }

    #[test]
    fn test_snapshot_json() {
        let mut cart = Cart::new();
        cart.apply(&coffee(2)).unwrap();
        let json = serde_json::to_value(cart.snapshot()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "active",
                "lines": [{"name": "Iced Coffee", "quantity": 2, "unit_price": 25000}],
                "total": 50000,
                "unpriced_lines": 0
            })
        );
    }
}
