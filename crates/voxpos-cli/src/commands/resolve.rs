//! Resolve command - run an intent payload through the turn pipeline.

use std::fs;
use std::path::Path;

use voxpos_cart::Cart;
use voxpos_driver::{run_text_turn, TurnConfig, TurnOutcome};
use voxpos_menu::Catalog;

pub(crate) fn run(file: &Path, json: bool) -> miette::Result<()> {
    let outcome = resolve_file(file)?;
    super::print_outcome(&outcome, json)?;

    if !outcome.is_complete() {
        return Err(miette::miette!("payload was only partially applied"));
    }
    Ok(())
}

fn resolve_file(file: &Path) -> miette::Result<TurnOutcome> {
    let source = fs::read_to_string(file)
        .map_err(|e| miette::miette!("Failed to read file: {}", e))?;

    let catalog = Catalog::seeded();
    let mut cart = Cart::new();
    run_text_turn(&source, &catalog, &mut cart, TurnConfig::default())
        .map_err(|e| miette::miette!("{}: {}", file.display(), e))
}
