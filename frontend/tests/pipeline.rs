//! Integration tests for the console pipeline: engine JSON in, model out,
//! gestures in, patch JSON out.

use instant::Instant;
use mixdesk_frontend::state::{AppMessage, AppStateChannels, ConnectionState};
use mixdesk_frontend::{ChannelKey, CommandEmitter, MixdeskApp, WheelDirection};
use mixdesk_types::{EngineEvent, UiMessage};
use serde_json::{json, Value};
use std::sync::mpsc::Sender;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

const CONFIG: &str = r#"{
    "type": "config",
    "data": {
        "inputs": [
            {"id": 0, "label": "Vocal", "gain": -6.5, "mute": false,
             "outputs": [{"id": 0, "name": "Main", "enabled": true},
                         {"id": 1, "name": "Monitor", "enabled": false}]},
            {"id": 1, "label": "", "gain": 40.0, "mute": true,
             "outputs": [{"id": 0, "name": "Main", "enabled": false},
                         {"id": 1, "name": "Monitor", "enabled": true}]}
        ],
        "outputs": [
            {"id": 0, "label": "Main", "gain": 0.0, "mute": false},
            {"id": 1, "label": "Monitor", "gain": -3.0, "mute": false}
        ]
    }
}"#;

const LEVELS: &str = r#"{
    "type": "levels",
    "data": {
        "inputs": [
            {"levelLeft": 0.01, "levelRight": 1.0},
            {"levelLeft": 0.0, "levelRight": 0.0}
        ],
        "outputs": [
            {"levelLeft": 1.0, "levelRight": 0.01},
            {"levelLeft": 0.0, "levelRight": 0.0}
        ]
    }
}"#;

/// Helper to create an app with no engine link attached.
fn create_test_app() -> (
    MixdeskApp,
    Sender<AppMessage>,
    UnboundedReceiver<UiMessage>,
) {
    let channels = AppStateChannels::new();
    let tx = channels.sender();
    let (out_tx, out_rx) = unbounded_channel();
    let app = MixdeskApp::from_parts(
        channels,
        CommandEmitter::new(out_tx),
        Duration::from_millis(10),
        "ws://127.0.0.1:9030/mixer".to_string(),
    );
    (app, tx, out_rx)
}

fn deliver(tx: &Sender<AppMessage>, json: &str) {
    let event: EngineEvent = serde_json::from_str(json).unwrap();
    tx.send(AppMessage::Event(event)).unwrap();
}

fn next_wire(rx: &mut UnboundedReceiver<UiMessage>) -> Value {
    let message = rx.try_recv().expect("a command should have been sent");
    serde_json::to_value(&message).unwrap()
}

#[test]
fn test_config_populates_model() {
    let (mut app, tx, _rx) = create_test_app();
    assert!(!app.reconciler().is_ready());

    deliver(&tx, CONFIG);
    app.process_messages(Instant::now());

    assert!(app.reconciler().is_ready());
    let model = app.model();
    assert_eq!(model.inputs().len(), 2);
    assert_eq!(model.outputs().len(), 2);

    let vocal = model.get(ChannelKey::input(0)).unwrap();
    assert_eq!(vocal.label, "Vocal");
    assert_eq!(vocal.gain, -6.5);
    assert!(vocal.route(0).unwrap().enabled);
    assert_eq!(vocal.left_level, None);

    // Out-of-range gain is clamped, empty label falls back
    let second = model.get(ChannelKey::input(1)).unwrap();
    assert_eq!(second.gain, 12.0);
    assert_eq!(second.display_label(), "Unnamed");
}

#[test]
fn test_incomplete_config_still_replaces_model() {
    let (mut app, tx, _rx) = create_test_app();
    deliver(&tx, CONFIG);
    app.process_messages(Instant::now());

    deliver(
        &tx,
        r#"{"type":"config","data":{"inputs":[{"label":"A","gain":null}],"outputs":null}}"#,
    );
    app.process_messages(Instant::now());

    let model = app.model();
    assert_eq!(model.inputs().len(), 1);
    assert!(model.outputs().is_empty());
    let only = model.get(ChannelKey::input(0)).unwrap();
    assert_eq!(only.label, "A");
    assert_eq!(only.gain, 0.0);
}

#[test]
fn test_config_then_levels_in_one_frame() {
    let (mut app, tx, _rx) = create_test_app();
    deliver(&tx, CONFIG);
    deliver(&tx, LEVELS);
    app.process_messages(Instant::now());

    let model = app.model();
    let vocal = model.get(ChannelKey::input(0)).unwrap();
    assert_eq!(vocal.left_level, Some(43.48));
    assert_eq!(vocal.right_level, Some(86.96));
    // Levels never touch configuration fields
    assert_eq!(vocal.gain, -6.5);

    let main = model.get(ChannelKey::output(0)).unwrap();
    assert_eq!(main.left_level, Some(86.96));
    assert_eq!(main.right_level, Some(43.48));
    assert_eq!(
        model.get(ChannelKey::output(1)).unwrap().left_level,
        Some(0.0)
    );
    assert_eq!(app.reconciler().stats().levels_committed, 1);
}

#[test]
fn test_levels_before_config_are_ignored() {
    let (mut app, tx, _rx) = create_test_app();
    deliver(&tx, LEVELS);
    app.process_messages(Instant::now());

    assert!(!app.reconciler().is_ready());
    assert!(app.model().is_empty());
    assert_eq!(app.reconciler().stats().levels_committed, 0);
}

#[test]
fn test_second_level_snapshot_in_a_frame_is_dropped() {
    let (mut app, tx, _rx) = create_test_app();
    deliver(&tx, CONFIG);
    app.process_messages(Instant::now());

    deliver(&tx, LEVELS);
    deliver(
        &tx,
        r#"{"type":"levels","data":{
            "inputs":[{"levelLeft":0.0,"levelRight":0.0},{"levelLeft":0.0,"levelRight":0.0}],
            "outputs":[{"levelLeft":0.0,"levelRight":0.0},{"levelLeft":0.0,"levelRight":0.0}]}}"#,
    );
    app.process_messages(Instant::now());

    // The first merge wins; the second arrived while it was in flight
    let stats = app.reconciler().stats();
    assert_eq!(stats.levels_committed, 1);
    assert_eq!(stats.levels_dropped, 1);
    assert_eq!(
        app.model().get(ChannelKey::input(0)).unwrap().left_level,
        Some(43.48)
    );

    // The gate is free again on the next frame
    deliver(
        &tx,
        r#"{"type":"levels","data":{
            "inputs":[{"levelLeft":0.0,"levelRight":0.0},{"levelLeft":0.0,"levelRight":0.0}],
            "outputs":[{"levelLeft":0.0,"levelRight":0.0},{"levelLeft":0.0,"levelRight":0.0}]}}"#,
    );
    app.process_messages(Instant::now());
    assert_eq!(
        app.model().get(ChannelKey::input(0)).unwrap().left_level,
        Some(0.0)
    );
}

#[test]
fn test_config_after_levels_wins() {
    let (mut app, tx, _rx) = create_test_app();
    deliver(&tx, CONFIG);
    app.process_messages(Instant::now());

    deliver(&tx, LEVELS);
    deliver(
        &tx,
        r#"{"type":"config","data":{"inputs":[{"id":7,"label":"Only","gain":0.0,"mute":false}],"outputs":[]}}"#,
    );
    app.process_messages(Instant::now());

    let model = app.model();
    assert_eq!(model.inputs().len(), 1);
    assert_eq!(model.inputs()[0].id, 7);
    assert_eq!(model.inputs()[0].left_level, None);
    assert!(!app.reconciler().has_pending_levels());
}

#[test]
fn test_mismatched_levels_are_rejected() {
    let (mut app, tx, _rx) = create_test_app();
    deliver(&tx, CONFIG);
    app.process_messages(Instant::now());

    deliver(
        &tx,
        r#"{"type":"levels","data":{"inputs":[{"levelLeft":1.0,"levelRight":1.0}],"outputs":[]}}"#,
    );
    app.process_messages(Instant::now());

    assert_eq!(app.reconciler().stats().levels_rejected, 1);
    assert_eq!(
        app.model().get(ChannelKey::input(0)).unwrap().left_level,
        None
    );

    // The gate was released, so a well-formed snapshot goes through
    deliver(&tx, LEVELS);
    app.process_messages(Instant::now());
    assert_eq!(app.reconciler().stats().levels_committed, 1);
}

#[test]
fn test_config_schedules_layout_measurement() {
    let (mut app, tx, _rx) = create_test_app();
    assert!(!app.probe().is_pending());

    let now = Instant::now();
    deliver(&tx, CONFIG);
    app.process_messages(now);

    assert!(app.probe().is_pending());
    assert_eq!(
        app.probe().time_until_due(now),
        Some(Duration::from_millis(10))
    );
}

#[test]
fn test_connection_state_is_tracked() {
    let (mut app, tx, _rx) = create_test_app();
    assert_eq!(app.connection_state(), ConnectionState::Disconnected);

    tx.send(AppMessage::ConnectionStateChanged(ConnectionState::Connected))
        .unwrap();
    app.process_messages(Instant::now());
    assert!(app.connection_state().is_connected());
}

#[test]
fn test_gestures_produce_wire_patches() {
    let (out_tx, mut rx) = unbounded_channel();
    let commands = CommandEmitter::new(out_tx);

    commands.loaded();
    assert_eq!(next_wire(&mut rx), json!({"type": "loaded"}));

    commands.set_gain(ChannelKey::input(3), -12.5);
    assert_eq!(
        next_wire(&mut rx),
        json!({"type": "config", "data": {"inputs": [{"id": 3, "gain": -12.5}]}})
    );

    commands.nudge_gain(ChannelKey::output(1), 11.0, WheelDirection::Up);
    assert_eq!(
        next_wire(&mut rx),
        json!({"type": "config", "data": {"outputs": [{"id": 1, "gain": 12.0}]}})
    );

    commands.reset_gain(ChannelKey::output(0));
    assert_eq!(
        next_wire(&mut rx),
        json!({"type": "config", "data": {"outputs": [{"id": 0, "gain": 0.0}]}})
    );

    commands.toggle_mute(ChannelKey::input(0), false);
    assert_eq!(
        next_wire(&mut rx),
        json!({"type": "config", "data": {"inputs": [{"id": 0, "mute": true}]}})
    );

    commands.toggle_route(2, 1, true);
    assert_eq!(
        next_wire(&mut rx),
        json!({"type": "config", "data": {"inputs": [
            {"id": 2, "outputs": [{"id": 1, "enabled": false}]}
        ]}})
    );

    commands.commit_label(ChannelKey::output(1), "Stage");
    assert_eq!(
        next_wire(&mut rx),
        json!({"type": "config", "data": {"outputs": [{"id": 1, "label": "Stage"}]}})
    );

    assert!(rx.try_recv().is_err());
}
