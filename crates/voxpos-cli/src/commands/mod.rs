//! CLI commands.

pub mod menu;
pub mod order;
pub mod prompt;
pub mod resolve;
pub mod serve;

use voxpos_driver::TurnOutcome;

/// Format a price in minor units with thousands separators.
pub(crate) fn format_price(price: u64) -> String {
    let digits = price.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub(crate) fn print_outcome(outcome: &TurnOutcome, json: bool) -> miette::Result<()> {
    if json {
        let text = serde_json::to_string_pretty(outcome)
            .map_err(|e| miette::miette!("Failed to serialize outcome: {}", e))?;
        println!("{}", text);
        return Ok(());
    }

    let resolution = &outcome.resolution;
    println!(
        "Intent: {}",
        resolution.intent.as_str().unwrap_or("(none)")
    );
    if let Some(command) = resolution.global_command {
        println!("Command: {}", command);
    }

    if !resolution.results.is_empty() {
        println!("\nMutations:");
        for mutation in &resolution.results {
            let price = mutation
                .unit_price
                .map(format_price)
                .unwrap_or_else(|| "unpriced".to_string());
            let mut line = format!(
                "  {} {} x{} @ {}",
                mutation.action, mutation.item_name, mutation.quantity, price
            );
            if !mutation.modifiers.is_empty() {
                line.push_str(&format!(" ({})", mutation.modifiers.join(", ")));
            }
            if mutation.is_low_confidence() {
                line.push_str(" [unknown action]");
            }
            println!("{}", line);
        }
    }

    for note in &resolution.notes {
        println!("  note: {:?}", note);
    }

    if let Some(batch) = &outcome.batch {
        if let Some(err) = &batch.error {
            println!("\nBatch stopped after {}/{}: {}", batch.applied, batch.total, err);
        }
    }

    let cart = outcome.receipt.as_ref().unwrap_or(&outcome.cart);
    println!(
        "\n{}:",
        if outcome.receipt.is_some() { "Receipt" } else { "Cart" }
    );
    if cart.lines.is_empty() {
        println!("  (empty)");
    }
    for line in &cart.lines {
        let total = line
            .line_total()
            .map(format_price)
            .unwrap_or_else(|| "unpriced".to_string());
        println!("  {:<28} x{:<3} {:>10}", line.name, line.quantity, total);
    }
    println!("  {:<32} {:>10}", "Total", format_price(cart.total));
    if cart.unpriced_lines > 0 {
        println!("  ({} line(s) need manual pricing)", cart.unpriced_lines);
    }

    Ok(())
}
