//! Main application structure.

use egui::{CentralPanel, Color32, Context, TopBottomPanel};
use instant::Instant;
use std::time::Duration;

use crate::commands::CommandEmitter;
use crate::config::Config;
use crate::labels::LabelDrafts;
use crate::layout::{GainContainers, LayoutProbe};
use crate::model::{ChannelKind, ChannelModel};
use crate::reconciler::{Applied, Reconciler};
use crate::state::{AppMessage, AppStateChannels, ConnectionState};
use crate::strip::{self, StripContext};
use crate::ws::EngineLink;

/// The mixer console application.
pub struct MixdeskApp {
    /// Channel-based communication with the engine link
    channels: AppStateChannels,
    /// Sole owner of the channel model
    reconciler: Reconciler,
    /// Outbound gesture commands
    commands: CommandEmitter,
    /// Slider geometry, remeasured after config snapshots and resizes
    probe: LayoutProbe,
    /// Gain containers measured during the last frame
    containers: GainContainers,
    /// Label edits in progress
    drafts: LabelDrafts,
    connection_state: ConnectionState,
    engine_url: String,
    /// Last rejected engine event, shown in the status bar
    error: Option<String>,
}

impl MixdeskApp {
    /// Create the app and start the engine link on the current tokio runtime.
    pub fn new(cc: &eframe::CreationContext<'_>, config: &Config) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let channels = AppStateChannels::new();
        let (out_tx, out_rx) = tokio::sync::mpsc::unbounded_channel();
        let commands = CommandEmitter::new(out_tx);

        EngineLink::new(config.engine_url.clone()).connect(
            channels.sender(),
            cc.egui_ctx.clone(),
            out_rx,
        );
        // Delivered as soon as the link is up
        commands.loaded();

        Self::from_parts(
            channels,
            commands,
            config.layout_settle,
            config.engine_url.clone(),
        )
    }

    /// Assemble an app around existing channels without starting a link.
    pub fn from_parts(
        channels: AppStateChannels,
        commands: CommandEmitter,
        layout_settle: Duration,
        engine_url: String,
    ) -> Self {
        Self {
            channels,
            reconciler: Reconciler::new(),
            commands,
            probe: LayoutProbe::new(layout_settle),
            containers: GainContainers::default(),
            drafts: LabelDrafts::new(),
            connection_state: ConnectionState::Disconnected,
            engine_url,
            error: None,
        }
    }

    pub fn model(&self) -> &ChannelModel {
        self.reconciler.model()
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn probe(&self) -> &LayoutProbe {
        &self.probe
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection_state
    }

    /// Drain everything the link delivered since the last frame, then
    /// commit any staged level merge.
    pub fn process_messages(&mut self, now: Instant) {
        while let Ok(msg) = self.channels.rx.try_recv() {
            match msg {
                AppMessage::Event(event) => {
                    let description = event.description();
                    match self.reconciler.apply(event) {
                        Ok(Applied::Config(applied)) => {
                            if applied.became_ready {
                                tracing::info!("Received first config from engine");
                            }
                            if applied.superseded_levels {
                                tracing::debug!("Config superseded a staged level merge");
                            }
                            self.drafts.retain_channels(self.reconciler.model());
                            self.probe.schedule(now);
                            self.error = None;
                        }
                        Ok(Applied::Levels(outcome)) => {
                            tracing::trace!("Levels: {:?}", outcome);
                        }
                        Err(e) => {
                            tracing::warn!("Rejected {}: {}", description, e);
                            self.error = Some(e.to_string());
                        }
                    }
                }
                AppMessage::ConnectionStateChanged(state) => {
                    tracing::info!("Connection state changed: {:?}", state);
                    self.connection_state = state;
                }
            }
        }

        self.reconciler.commit();
    }

    fn render_status_bar(&self, ctx: &Context) {
        TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let color = match self.connection_state {
                    ConnectionState::Connected => Color32::from_rgb(0, 200, 0),
                    ConnectionState::Disconnected => Color32::RED,
                    ConnectionState::Reconnecting { .. } => Color32::from_rgb(255, 165, 0),
                };
                ui.colored_label(color, "●");
                ui.label(self.connection_state.description());
                ui.separator();
                ui.label(&self.engine_url);

                let model = self.reconciler.model();
                ui.separator();
                ui.label(format!(
                    "{} inputs, {} outputs",
                    model.inputs().len(),
                    model.outputs().len()
                ));

                if let Some(error) = &self.error {
                    ui.separator();
                    ui.colored_label(Color32::RED, format!("Error: {}", error));
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let stats = self.reconciler.stats();
                    ui.label(format!(
                        "levels {} / dropped {}",
                        stats.levels_committed, stats.levels_dropped
                    ))
                    .on_hover_text(format!(
                        "Config snapshots: {}\nRejected level snapshots: {}",
                        stats.configs, stats.levels_rejected
                    ));
                });
            });
        });
    }

    fn render_console(&mut self, ctx: &Context) {
        self.containers = GainContainers::default();

        CentralPanel::default().show(ctx, |ui| {
            if !self.reconciler.is_ready() {
                ui.centered_and_justified(|ui| {
                    ui.label("Waiting for mixer configuration...");
                });
                return;
            }

            let section_height = ui.available_height() / 2.0;
            let model = self.reconciler.model();

            for kind in [ChannelKind::Input, ChannelKind::Output] {
                let mut strip_ctx = StripContext {
                    commands: &self.commands,
                    drafts: &mut self.drafts,
                    containers: &mut self.containers,
                    slider: self.probe.slider_size(kind),
                };
                ui.push_id(kind, |ui| {
                    ui.set_min_height(section_height);
                    strip::show_section(
                        ui,
                        kind,
                        model.channels(kind),
                        section_height,
                        &mut strip_ctx,
                    );
                });
                if kind == ChannelKind::Input {
                    ui.separator();
                }
            }
        });
    }

    fn run_frame(&mut self, ctx: &Context, now: Instant) {
        self.process_messages(now);

        // Sizes recorded last frame feed the measurement
        self.probe.observe_viewport(ctx.content_rect().size(), now);
        self.probe.poll(now, self.containers);

        self.render_status_bar(ctx);
        self.render_console(ctx);

        if let Some(wait) = self.probe.time_until_due(now) {
            ctx.request_repaint_after(wait);
        }
    }
}

impl eframe::App for MixdeskApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.run_frame(ctx, Instant::now());
    }
}
