//! Serve command - run the HTTP server.

use tracing::{info, warn};
use voxpos_ai::{AssistantConfig, OrderAssistant};
use voxpos_driver::TurnConfig;
use voxpos_menu::Catalog;
use voxpos_resolver::UnknownActionPolicy;
use voxpos_server::{shutdown_signal, AppState, ServerConfig};

pub(crate) async fn run(
    host: Option<String>,
    port: Option<u16>,
    unknown_action: Option<UnknownActionPolicy>,
) -> miette::Result<()> {
    let config = server_config(ServerConfig::from_env(), host, port, unknown_action);

    let ai_config = AssistantConfig::from_env();
    let assistant = if ai_config.is_valid() {
        info!(
            "Voice assistant: {} / {} at {}",
            ai_config.transcription_model,
            ai_config.chat_model,
            ai_config.api_root()
        );
        Some(
            OrderAssistant::from_config(ai_config)
                .map_err(|e| miette::miette!("Failed to set up voice assistant: {}", e))?,
        )
    } else {
        warn!("No API key set (VOXPOS_API_KEY / OPENAI_API_KEY); /process_audio will return 503");
        None
    };

    let catalog = Catalog::seeded();
    info!("Loaded {} menu items", catalog.len());
    info!("Unknown action policy: {:?}", config.unknown_action);
    let state = AppState::new(catalog, assistant).with_turn_config(TurnConfig {
        unknown_action: config.unknown_action,
    });

    info!("Server ready. Press Ctrl+C to stop.");
    voxpos_server::serve(&config, state, shutdown_signal())
        .await
        .map_err(|e| miette::miette!("Server error on {}: {}", config.addr(), e))
}

/// Apply command-line overrides on top of the environment.
fn server_config(
    mut config: ServerConfig,
    host: Option<String>,
    port: Option<u16>,
    unknown_action: Option<UnknownActionPolicy>,
) -> ServerConfig {
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(policy) = unknown_action {
        config = config.with_unknown_action(policy);
    }
    config
}
