//! Menu command - show the seed menu.

use voxpos_menu::Catalog;

use super::format_price;

pub(crate) fn run(json: bool) -> miette::Result<()> {
    let catalog = Catalog::seeded();

    if json {
        let text = serde_json::to_string_pretty(catalog.items())
            .map_err(|e| miette::miette!("Failed to serialize menu: {}", e))?;
        println!("{}", text);
        return Ok(());
    }

    println!("Menu ({} items)\n", catalog.len());
    for item in catalog.items() {
        println!("  {:>3}  {:<28} {:>10}", item.id, item.name, format_price(item.price));
    }

    Ok(())
}
