//! Mixdesk console library.
//!
//! Presentation layer for a digital audio mixer engine: reconciles the
//! engine's config and level snapshots into a channel model, renders channel
//! strips, and turns gestures into config patches.

#![warn(clippy::all, rust_2018_idioms)]

mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod labels;
pub mod layout;
pub mod meter;
pub mod model;
pub mod reconciler;
pub mod state;
mod strip;
mod ws;

pub use app::MixdeskApp;
pub use commands::{CommandEmitter, WheelDirection};
pub use config::{Config, ConfigOverrides};
pub use error::{LinkError, ReconcileError};
pub use model::{ChannelKey, ChannelKind, ChannelModel};
pub use reconciler::Reconciler;
pub use strip::format_gain;
pub use ws::EngineLink;

/// Open the console window. Must be called with a tokio runtime entered.
pub fn run_native_gui(config: Config) -> eframe::Result<()> {
    tracing::info!("Initializing mixdesk console for {}", config.engine_url);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_title("Mixdesk"),
        ..Default::default()
    };

    eframe::run_native(
        "Mixdesk",
        native_options,
        Box::new(move |cc| Ok(Box::new(MixdeskApp::new(cc, &config)))),
    )
}
