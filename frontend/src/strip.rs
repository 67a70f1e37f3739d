//! Channel strip rendering.
//!
//! Strips read the reconciled model and emit commands; they never write
//! back to the model. A dragged slider therefore snaps to the engine's value
//! until the next config snapshot confirms the change.

use egui::{Align, Color32, CornerRadius, Layout, Rect, RichText, Sense, Ui, Vec2};
use mixdesk_types::mixer::{GAIN_MAX_DB, GAIN_MIN_DB, GAIN_STEP_DB};
use mixdesk_types::Channel;

use crate::commands::{CommandEmitter, WheelDirection};
use crate::labels::LabelDrafts;
use crate::layout::{GainContainers, SliderSize};
use crate::meter;
use crate::model::{ChannelKey, ChannelKind};

// ── Layout constants ─────────────────────────────────────────────────
/// Gap between strips
const STRIP_GAP: f32 = 2.0;
/// Inner margin inside each strip frame
const STRIP_MARGIN: f32 = 3.0;
/// Inner width of a strip
const STRIP_INNER: f32 = 84.0;
/// Width of the stereo meter
const METER_WIDTH: f32 = 14.0;
/// Width of the gain slider container
const GAIN_CONTAINER_WIDTH: f32 = 28.0;
/// Vertical space taken by everything except the meter/slider row
const RESERVED_HEIGHT: f32 = 120.0;
/// Extra height per route button row
const ROUTE_ROW_HEIGHT: f32 = 22.0;
/// The meter/slider row never gets shorter than this
const MIN_FADER_HEIGHT: f32 = 80.0;
/// Standard button height (mute, routes)
const BTN_H: f32 = 20.0;

/// Everything a strip needs besides its channel.
pub struct StripContext<'a> {
    pub commands: &'a CommandEmitter,
    pub drafts: &'a mut LabelDrafts,
    pub containers: &'a mut GainContainers,
    pub slider: SliderSize,
}

/// Gain readout rounded to a tenth of a dB, without trailing zeros.
pub fn format_gain(gain: f64) -> String {
    let rounded = (gain * 10.0).round() / 10.0;
    // Avoid "-0dB"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{}dB", rounded)
}

/// Render one row of strips (all inputs or all outputs).
pub fn show_section(
    ui: &mut Ui,
    kind: ChannelKind,
    channels: &[Channel],
    height: f32,
    strip: &mut StripContext<'_>,
) {
    let title = match kind {
        ChannelKind::Input => "Inputs",
        ChannelKind::Output => "Outputs",
    };
    ui.label(RichText::new(title).strong().size(13.0));

    if channels.is_empty() {
        ui.label(RichText::new("No channels").color(Color32::from_gray(120)));
        return;
    }

    // Inputs carry one route button per output
    let route_rows = channels.iter().map(|c| c.routes.len()).max().unwrap_or(0) as f32;
    let fader_height =
        (height - RESERVED_HEIGHT - route_rows * ROUTE_ROW_HEIGHT).max(MIN_FADER_HEIGHT);

    egui::ScrollArea::horizontal()
        .id_salt(title)
        .show(ui, |ui| {
            ui.horizontal_top(|ui| {
                ui.spacing_mut().item_spacing.x = STRIP_GAP;
                for (index, channel) in channels.iter().enumerate() {
                    // The first strip of each section is the one the layout probe measures
                    show_strip(ui, kind, channel, index == 0, fader_height, strip);
                }
            });
        });
}

fn show_strip(
    ui: &mut Ui,
    kind: ChannelKind,
    channel: &Channel,
    measured: bool,
    fader_height: f32,
    strip: &mut StripContext<'_>,
) {
    let key = ChannelKey {
        kind,
        id: channel.id,
    };

    egui::Frame::default()
        .fill(Color32::from_rgb(38, 38, 42))
        .corner_radius(CornerRadius::same(3))
        .inner_margin(STRIP_MARGIN)
        .show(ui, |ui| {
            ui.set_min_width(STRIP_INNER);
            ui.set_max_width(STRIP_INNER);

            ui.vertical_centered(|ui| {
                ui.spacing_mut().item_spacing.y = 2.0;

                show_label(ui, key, channel, strip);

                // ── Meter + gain slider ──
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing.x = 4.0;
                    meter::show_stereo(
                        ui,
                        Vec2::new(METER_WIDTH, fader_height),
                        channel.left_level,
                        channel.right_level,
                        channel.mute,
                    );

                    let allotted = Vec2::new(GAIN_CONTAINER_WIDTH, fader_height);
                    let container = ui.allocate_ui_with_layout(
                        allotted,
                        Layout::top_down(Align::Center),
                        |ui| {
                            ui.set_min_size(allotted);
                            show_gain_slider(ui, key, channel, strip.slider, strip.commands);
                        },
                    );
                    if measured {
                        // The slider may overflow until remeasured; record what was allotted
                        strip.containers.record(
                            kind,
                            Rect::from_min_size(container.response.rect.min, allotted),
                        );
                    }
                });

                ui.label(
                    RichText::new(format_gain(channel.gain))
                        .monospace()
                        .size(11.0),
                );

                // ── Routing buttons ──
                for route in &channel.routes {
                    if toggle_button(
                        ui,
                        &route.name,
                        route.enabled,
                        Color32::from_rgb(70, 110, 70),
                    )
                    .clicked()
                    {
                        strip
                            .commands
                            .toggle_route(channel.id, route.id, route.enabled);
                    }
                }

                if toggle_button(ui, "Mute", channel.mute, Color32::from_rgb(180, 40, 40))
                    .clicked()
                {
                    strip.commands.toggle_mute(key, channel.mute);
                }
            });
        });
}

/// Label, or a text field while it is being edited (double-click to start).
fn show_label(ui: &mut Ui, key: ChannelKey, channel: &Channel, strip: &mut StripContext<'_>) {
    if strip.drafts.is_editing(key) {
        let wants_focus = strip.drafts.take_focus_request(key);
        let Some(text) = strip.drafts.text_mut(key) else {
            return;
        };
        let response = ui.add(
            egui::TextEdit::singleline(text)
                .desired_width(STRIP_INNER - 4.0)
                .font(egui::TextStyle::Body)
                .horizontal_align(Align::Center),
        );
        if wants_focus {
            response.request_focus();
        }
        if response.lost_focus() {
            if ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                if let Some(label) = strip.drafts.confirm(key) {
                    strip.commands.commit_label(key, label);
                }
            } else {
                // Escape or clicking elsewhere abandons the edit
                strip.drafts.cancel(key);
            }
        }
    } else {
        let response = ui.add(
            egui::Label::new(RichText::new(channel.display_label()).strong().size(11.0))
                .sense(Sense::click()),
        );
        if response.double_clicked() {
            strip.drafts.begin(key, &channel.label);
        }
    }
}

fn show_gain_slider(
    ui: &mut Ui,
    key: ChannelKey,
    channel: &Channel,
    size: SliderSize,
    commands: &CommandEmitter,
) {
    let length = if size.is_measured() {
        size.width
    } else {
        ui.available_height()
    };
    ui.spacing_mut().slider_width = length;

    let mut gain = channel.gain;
    let response = ui.add(
        egui::Slider::new(&mut gain, GAIN_MIN_DB..=GAIN_MAX_DB)
            .vertical()
            .step_by(GAIN_STEP_DB)
            .show_value(false),
    );

    if response.double_clicked() {
        commands.reset_gain(key);
    } else if response.changed() {
        commands.set_gain(key, gain);
    }

    if response.hovered() {
        // Take the wheel so the enclosing scroll area does not move too
        let delta = ui.input_mut(|i| {
            let delta = i.raw_scroll_delta.y;
            i.raw_scroll_delta = Vec2::ZERO;
            i.smooth_scroll_delta = Vec2::ZERO;
            delta
        });
        if let Some(direction) = WheelDirection::from_scroll_delta(delta) {
            commands.nudge_gain(key, channel.gain, direction);
        }
    }
}

fn toggle_button(ui: &mut Ui, text: &str, active: bool, active_color: Color32) -> egui::Response {
    let fill = if active {
        active_color
    } else {
        Color32::from_rgb(48, 48, 52)
    };
    let text_col = if active {
        Color32::WHITE
    } else {
        Color32::from_gray(120)
    };
    ui.add(
        egui::Button::new(RichText::new(text).small().color(text_col))
            .fill(fill)
            .min_size(Vec2::new(STRIP_INNER - 4.0, BTN_H)),
    )
}
