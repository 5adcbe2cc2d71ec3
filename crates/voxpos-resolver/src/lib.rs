//! Cart delta resolution for voxpos.
//!
//! This crate handles:
//! - Normalizing verbs from the inference service to `add`/`remove`
//! - Resolving item names against the catalog and injecting prices
//! - Defaulting quantities
//! - Deciding which global command, if any, a payload carries
//!
//! Entries are resolved in payload order, which is the order the customer
//! spoke them in. "Remove X and add Y" must reach the cart as remove-then-add.

use serde::Serialize;
use smol_str::SmolStr;
use tracing::{debug, info, warn};
use voxpos_intent::{
    Action, GlobalCommand, IntentField, MutationFlag, RawResultEntry,
    ResolvedMutation, ValidatedPayload,
};
use voxpos_menu::Catalog;

/// What to do with a verb that is neither `add` nor `remove`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownActionPolicy {
    /// Treat it as `add` and flag the mutation. An unrecognized verb must
    /// never drop an order silently.
    #[default]
    DefaultToAdd,
    /// Skip the entry and record a note.
    Reject,
}

impl std::str::FromStr for UnknownActionPolicy {
    type Err = String;

    /// Accepts `add` (or `default_to_add`) and `reject`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "add" | "default_to_add" => Ok(Self::DefaultToAdd),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "unknown action policy '{}' (expected 'add' or 'reject')",
                other
            )),
        }
    }
}

/// Result of resolving one payload.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub intent: IntentField,
    /// Global command to apply instead of mutations.
    pub global_command: Option<GlobalCommand>,
    /// Mutations in utterance order.
    pub results: Vec<ResolvedMutation>,
    /// Irregularities the resolver recovered from.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<ResolutionNote>,
}

impl Resolution {
    fn empty(intent: IntentField) -> Self {
        Self {
            intent,
            global_command: None,
            results: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// True when there is nothing to apply.
    pub fn is_noop(&self) -> bool {
        self.global_command.is_none() && self.results.is_empty()
    }

    pub fn has_unpriced(&self) -> bool {
        self.results.iter().any(ResolvedMutation::is_unpriced)
    }
}

/// A recovered irregularity, surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionNote {
    /// A system command arrived alongside transaction entries.
    DiscardedEntries { count: usize },
    /// `SYSTEM` intent without a recognized command.
    InconsistentSystemIntent { global_command: Option<String> },
    /// A transaction carried a global command.
    IgnoredCommand { global_command: String },
    /// An entry could not become a mutation.
    SkippedEntry { index: usize, reason: String },
}

/// Resolves validated payloads against a catalog.
pub struct Resolver<'a> {
    catalog: &'a Catalog,
    unknown_action: UnknownActionPolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            unknown_action: UnknownActionPolicy::default(),
        }
    }

    pub fn with_unknown_action(mut self, policy: UnknownActionPolicy) -> Self {
        self.unknown_action = policy;
        self
    }

    /// Resolve a payload into a command or an ordered list of mutations.
    pub fn resolve(&self, payload: &ValidatedPayload) -> Resolution {
        let mut resolution = Resolution::empty(payload.intent.clone());

        match &payload.intent {
            IntentField::System => self.resolve_system(payload, &mut resolution),
            IntentField::Transaction => self.resolve_transaction(payload, &mut resolution),
            other => {
                debug!("No actionable intent ({:?})", other.as_str());
            }
        }

        resolution
    }

    fn resolve_system(&self, payload: &ValidatedPayload, resolution: &mut Resolution) {
        match payload.global_command.known() {
            Some(command) => {
                info!("Global command: {}", command);
                resolution.global_command = Some(command);
                if !payload.results.is_empty() {
                    warn!(
                        "Discarding {} entries sent with {}",
                        payload.results.len(),
                        command
                    );
                    resolution.notes.push(ResolutionNote::DiscardedEntries {
                        count: payload.results.len(),
                    });
                }
            }
            None => {
                let raw: Option<String> = payload.global_command.clone().into();
                warn!("SYSTEM intent without a recognized command: {:?}", raw);
                resolution
                    .notes
                    .push(ResolutionNote::InconsistentSystemIntent {
                        global_command: raw,
                    });
            }
        }
    }

    fn resolve_transaction(&self, payload: &ValidatedPayload, resolution: &mut Resolution) {
        if !payload.global_command.is_unset() {
            let raw: Option<String> = payload.global_command.clone().into();
            let raw = raw.unwrap_or_default();
            warn!("Ignoring global command {} on a transaction", raw);
            resolution
                .notes
                .push(ResolutionNote::IgnoredCommand { global_command: raw });
        }

        for (index, entry) in payload.results.iter().enumerate() {
            match self.resolve_entry(entry) {
                Ok(mutation) => {
                    match mutation.action {
                        Action::Add => {
                            info!(" (+) {} x {}", mutation.quantity, mutation.item_name)
                        }
                        Action::Remove => {
                            info!(" (-) {} x {}", mutation.quantity, mutation.item_name)
                        }
                    }
                    resolution.results.push(mutation);
                }
                Err(reason) => {
                    warn!("Skipping entry {}: {}", index, reason);
                    resolution
                        .notes
                        .push(ResolutionNote::SkippedEntry { index, reason });
                }
            }
        }
    }

    /// Resolve one entry; `Err` carries the reason it was skipped.
    pub fn resolve_entry(&self, entry: &RawResultEntry) -> Result<ResolvedMutation, String> {
        let mut flags = Vec::new();

        // 1. Action normalization
        let action = match normalize_action(entry.action.as_deref()) {
            Ok(action) => action,
            Err(raw) => match self.unknown_action {
                UnknownActionPolicy::DefaultToAdd => {
                    warn!(
                        "Unknown action '{}' for {} -> defaulting to add",
                        raw, entry.item
                    );
                    flags.push(MutationFlag::UnknownAction { raw });
                    Action::Add
                }
                UnknownActionPolicy::Reject => {
                    return Err(format!("unknown action '{}'", raw));
                }
            },
        };

        // 2. Name resolution & price injection
        let requested = entry.item.trim();
        if requested.is_empty() {
            return Err("missing item name".to_string());
        }

        // The catalog price always wins; a payload price only fills in for
        // items the catalog does not carry.
        let (item_name, unit_price) = match self.catalog.lookup_by_name(requested) {
            Some(item) => (item.name.clone(), Some(item.price)),
            None => match payload_price(entry.price) {
                Some(price) => {
                    debug!("No catalog match for '{}', using payload price", requested);
                    (SmolStr::new(requested), Some(price))
                }
                None => {
                    debug!("No catalog match for '{}'", requested);
                    flags.push(MutationFlag::Unpriced);
                    (SmolStr::new(requested), None)
                }
            },
        };

        // 3. Quantity defaulting
        let quantity = normalize_quantity(entry.quantity);

        Ok(ResolvedMutation {
            action,
            item_name,
            quantity,
            unit_price,
            modifiers: entry.modifiers.clone(),
            flags,
        })
    }
}

/// Resolve a payload with the default policies.
pub fn resolve(payload: &ValidatedPayload, catalog: &Catalog) -> Resolution {
    Resolver::new(catalog).resolve(payload)
}

/// Normalize a verb. Missing or blank means `add`; `Err` carries the
/// normalized text of a verb that is not recognized.
pub fn normalize_action(raw: Option<&str>) -> Result<Action, String> {
    let normalized = match raw {
        None => return Ok(Action::Add),
        Some(raw) => raw.trim().to_lowercase(),
    };

    match normalized.as_str() {
        "" | "add" => Ok(Action::Add),
        "remove" => Ok(Action::Remove),
        _ => Err(normalized),
    }
}

/// Quantities that are missing or below one become one.
pub fn normalize_quantity(raw: Option<i64>) -> u32 {
    match raw {
        Some(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => 1,
    }
}

fn payload_price(raw: Option<f64>) -> Option<u64> {
    raw.filter(|p| p.is_finite() && *p >= 0.0)
        .map(|p| p.round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxpos_intent::CommandField;
    use voxpos_menu::MenuItem;

    fn menu() -> Catalog {
        Catalog::from_items(vec![
            MenuItem::new("16", "Iced Coffee", 25000),
            MenuItem::new("19", "Vanilla Ice Cream", 15000),
            MenuItem::new("13", "Coke", 15000),
        ])
        .unwrap()
    }

    #[test]
    fn test_action_normalization() {
        assert_eq!(normalize_action(Some("ADD")), Ok(Action::Add));
        assert_eq!(normalize_action(Some("Remove")), Ok(Action::Remove));
        assert_eq!(normalize_action(Some("  add ")), Ok(Action::Add));
        assert_eq!(normalize_action(None), Ok(Action::Add));
        assert_eq!(normalize_action(Some("")), Ok(Action::Add));
        assert_eq!(normalize_action(Some(" Update ")), Err("update".to_string()));
    }

    #[test]
    fn test_unknown_action_defaults_to_add() {
        let catalog = menu();
        let entry = RawResultEntry::new("Coke").with_action("change");
        let mutation = Resolver::new(&catalog).resolve_entry(&entry).unwrap();

        assert_eq!(mutation.action, Action::Add);
        assert!(mutation.is_low_confidence());
        assert_eq!(
            mutation.flags,
            vec![MutationFlag::UnknownAction {
                raw: "change".to_string()
            }]
        );
    }

    #[test]
    fn test_unknown_action_reject_policy() {
        let catalog = menu();
        let payload = ValidatedPayload::transaction(vec![
            RawResultEntry::new("Coke").with_action("update"),
            RawResultEntry::new("Coke").with_action("add"),
        ]);
        let resolution = Resolver::new(&catalog)
            .with_unknown_action(UnknownActionPolicy::Reject)
            .resolve(&payload);

        assert_eq!(resolution.results.len(), 1);
        assert_eq!(
            resolution.notes,
            vec![ResolutionNote::SkippedEntry {
                index: 0,
                reason: "unknown action 'update'".to_string()
            }]
        );
    }

    #[test]
    fn test_price_injection_and_canonical_name() {
        let catalog = menu();
        let entry = RawResultEntry::new("iced coffee");
        let mutation = Resolver::new(&catalog).resolve_entry(&entry).unwrap();

        assert_eq!(mutation.item_name, "Iced Coffee");
        assert_eq!(mutation.unit_price, Some(25000));
        assert!(mutation.flags.is_empty());
    }

    #[test]
    fn test_partial_name_stays_unpriced() {
        let catalog = menu();
        let entry = RawResultEntry::new("coffee");
        let mutation = Resolver::new(&catalog).resolve_entry(&entry).unwrap();

        assert_eq!(mutation.item_name, "coffee");
        assert_eq!(mutation.unit_price, None);
        assert_eq!(mutation.flags, vec![MutationFlag::Unpriced]);
    }

    #[test]
    fn test_payload_price_only_for_unknown_items() {
        let catalog = menu();
        let entry = RawResultEntry::new("Pizza").with_price(Some(90000.0));
        let mutation = Resolver::new(&catalog).resolve_entry(&entry).unwrap();
        assert_eq!(mutation.unit_price, Some(90000));
        assert!(!mutation.is_unpriced());

        // A catalog item keeps its catalog price and name
        let entry = RawResultEntry::new("iced coffee").with_price(Some(1.0));
        let mutation = Resolver::new(&catalog).resolve_entry(&entry).unwrap();
        assert_eq!(mutation.item_name, "Iced Coffee");
        assert_eq!(mutation.unit_price, Some(25000));

        // Negative prices are ignored and the catalog is consulted
        let entry = RawResultEntry::new("coke").with_price(Some(-5.0));
        let mutation = Resolver::new(&catalog).resolve_entry(&entry).unwrap();
        assert_eq!(mutation.item_name, "Coke");
        assert_eq!(mutation.unit_price, Some(15000));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("add".parse(), Ok(UnknownActionPolicy::DefaultToAdd));
        assert_eq!(
            "Default-To-Add".parse(),
            Ok(UnknownActionPolicy::DefaultToAdd)
        );
        assert_eq!(" REJECT ".parse(), Ok(UnknownActionPolicy::Reject));
        assert!("drop".parse::<UnknownActionPolicy>().is_err());
    }

    #[test]
    fn test_quantity_defaulting() {
        assert_eq!(normalize_quantity(None), 1);
        assert_eq!(normalize_quantity(Some(0)), 1);
        assert_eq!(normalize_quantity(Some(-3)), 1);
        assert_eq!(normalize_quantity(Some(4)), 4);
        assert_eq!(normalize_quantity(Some(i64::MAX)), u32::MAX);
    }

    #[test]
    fn test_iced_coffee_scenario() {
        let catalog = menu();
        let payload = ValidatedPayload::transaction(vec![
            RawResultEntry::new("Iced Coffee").with_quantity(None)
        ]);
        let resolution = resolve(&payload, &catalog);

        assert_eq!(
            resolution.results,
            vec![ResolvedMutation::add("Iced Coffee", 1, Some(25000))]
        );
    }

    #[test]
    fn test_order_preserved() {
        let catalog = menu();
        let payload = ValidatedPayload::transaction(vec![
            RawResultEntry::new("Vanilla Ice Cream").with_action("remove"),
            RawResultEntry::new("Iced Coffee").with_action("add"),
        ]);
        let resolution = resolve(&payload, &catalog);

        let order: Vec<_> = resolution
            .results
            .iter()
            .map(|m| (m.action, m.item_name.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (Action::Remove, "Vanilla Ice Cream"),
                (Action::Add, "Iced Coffee")
            ]
        );
    }

    #[test]
    fn test_system_command_discards_entries() {
        let catalog = menu();
        let mut payload = ValidatedPayload::system(GlobalCommand::ClearCart);
        payload.results.push(RawResultEntry::new("Coke"));

        let resolution = resolve(&payload, &catalog);
        assert_eq!(resolution.global_command, Some(GlobalCommand::ClearCart));
        assert!(resolution.results.is_empty());
        assert_eq!(
            resolution.notes,
            vec![ResolutionNote::DiscardedEntries { count: 1 }]
        );
    }

    #[test]
    fn test_system_without_command_is_noop() {
        let catalog = menu();
        let payload = ValidatedPayload {
            intent: IntentField::System,
            global_command: CommandField::Unrecognized("REFUND".to_string()),
            results: vec![RawResultEntry::new("Coke")],
        };

        let resolution = resolve(&payload, &catalog);
        assert!(resolution.is_noop());
        assert_eq!(
            resolution.notes,
            vec![ResolutionNote::InconsistentSystemIntent {
                global_command: Some("REFUND".to_string())
            }]
        );
    }

    #[test]
    fn test_neutral_intent_is_noop() {
        let catalog = menu();
        for intent in [
            IntentField::Unset,
            IntentField::Unrecognized("CHITCHAT".to_string()),
        ] {
            let payload = ValidatedPayload {
                intent,
                global_command: CommandField::Known(GlobalCommand::Checkout),
                results: vec![RawResultEntry::new("Coke")],
            };
            let resolution = resolve(&payload, &catalog);
            assert!(resolution.is_noop());
            assert!(resolution.notes.is_empty());
        }
    }

    #[test]
    fn test_transaction_ignores_stray_command() {
        let catalog = menu();
        let mut payload = ValidatedPayload::transaction(vec![RawResultEntry::new("Coke")]);
        payload.global_command = CommandField::Known(GlobalCommand::Checkout);

        let resolution = resolve(&payload, &catalog);
        assert_eq!(resolution.global_command, None);
        assert_eq!(resolution.results.len(), 1);
        assert_eq!(
            resolution.notes,
            vec![ResolutionNote::IgnoredCommand {
                global_command: "CHECKOUT".to_string()
            }]
        );
    }

    #[test]
    fn test_blank_item_skipped() {
        let catalog = menu();
        let payload = ValidatedPayload::transaction(vec![
            RawResultEntry::new("  "),
            RawResultEntry::new("Coke"),
        ]);
        let resolution = resolve(&payload, &catalog);
        assert_eq!(resolution.results.len(), 1);
        assert!(matches!(
            resolution.notes[0],
            ResolutionNote::SkippedEntry { index: 0, .. }
        ));
    }

    #[test]
    fn test_resolution_serializes_like_payload() {
        let catalog = menu();
        let payload = ValidatedPayload::transaction(vec![RawResultEntry::new("Coke")
            .with_quantity(Some(2))
            .with_modifier("no ice")]);
        let json = serde_json::to_value(resolve(&payload, &catalog)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "intent": "TRANSACTION",
                "global_command": null,
                "results": [
                    {"action": "add", "item": "Coke", "quantity": 2, "price": 15000, "modifiers": ["no ice"]}
                ]
            })
        );
    }
}
