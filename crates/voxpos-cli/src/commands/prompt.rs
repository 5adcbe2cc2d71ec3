//! Prompt command - print the prompts built from the seed menu.

use voxpos_ai::Prompts;
use voxpos_menu::Catalog;

pub(crate) fn run() -> miette::Result<()> {
    let prompts = Prompts::for_catalog(&Catalog::seeded());

    println!("Transcription context:\n{}\n", prompts.transcription_context);
    println!("System prompt:\n{}", prompts.system);

    Ok(())
}
