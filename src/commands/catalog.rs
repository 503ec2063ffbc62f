//! Print the card catalog to stdout.

use crate::catalog::Catalog;
use crate::config::WavecartConfig;

/// Lists every card in the configured catalog.
///
/// # Errors
/// - If the configuration or catalog cannot be loaded
pub fn handle_catalog() -> Result<(), anyhow::Error> {
    let config = WavecartConfig::load()?;
    let catalog = Catalog::load_or_default(config.catalog_path.as_deref())?;

    if catalog.cards.is_empty() {
        println!("The catalog is empty.");
        return Ok(());
    }

    println!();
    println!("Catalog ({} cards):", catalog.cards.len());
    println!();

    for card in &catalog.cards {
        println!("  {} • {}", card.id, card.title);
        println!(
            "    {} • {} • ${:.2}",
            card.category,
            card.duration_label(),
            card.price_usd
        );
        if !card.tags.is_empty() {
            println!("    Tags: {}", card.tags.join(", "));
        }
        println!();
    }

    Ok(())
}
