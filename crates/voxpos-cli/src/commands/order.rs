//! Order command - run one voice ordering turn from an audio file.

use std::path::Path;

use voxpos_ai::{AssistantConfig, OrderAssistant, Prompts};
use voxpos_cart::Cart;
use voxpos_driver::{run_text_turn, TurnConfig};
use voxpos_menu::Catalog;

pub(crate) async fn run(audio_path: &Path, json: bool) -> miette::Result<()> {
    let audio = tokio::fs::read(audio_path)
        .await
        .map_err(|e| miette::miette!("Failed to read audio file: {}", e))?;

    let assistant = OrderAssistant::from_config(AssistantConfig::from_env())
        .map_err(|e| miette::miette!("{}", e))?;

    let catalog = Catalog::seeded();
    let prompts = Prompts::for_catalog(&catalog);
    let file_name = audio_path.file_name().and_then(|n| n.to_str());

    let interpretation = assistant
        .listen(&audio, file_name, &prompts)
        .await
        .map_err(|e| miette::miette!("Voice turn failed: {}", e))?;

    if !json {
        println!("Transcript: {}\n", interpretation.transcript);
    }

    let mut cart = Cart::new();
    let outcome = run_text_turn(
        &interpretation.raw_response,
        &catalog,
        &mut cart,
        TurnConfig::default(),
    )
    .map_err(|e| miette::miette!("Model returned an unusable payload: {}", e))?;

    super::print_outcome(&outcome, json)
}
