//! Channel-based plumbing between the engine link and the UI thread.

use mixdesk_types::EngineEvent;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Messages sent from the engine link to the main UI thread.
#[derive(Debug)]
pub enum AppMessage {
    /// Event received from the engine
    Event(EngineEvent),

    /// Engine connection state changed
    ConnectionStateChanged(ConnectionState),
}

/// Engine connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connected to the engine
    Connected,
    /// Disconnected from the engine
    Disconnected,
    /// Attempting to reconnect
    Reconnecting { attempt: u32 },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn description(&self) -> String {
        match self {
            ConnectionState::Connected => "Connected".to_string(),
            ConnectionState::Disconnected => "Disconnected".to_string(),
            ConnectionState::Reconnecting { attempt } => {
                format!("Reconnecting (attempt {})", attempt)
            }
        }
    }
}

/// Application state with channel-based communication.
pub struct AppStateChannels {
    /// Sender for app messages (cloned for each async operation)
    pub tx: Sender<AppMessage>,
    /// Receiver for app messages (owned by main UI thread)
    pub rx: Receiver<AppMessage>,
}

impl AppStateChannels {
    /// Create new application state channels.
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    /// Get a clone of the sender for use in async operations.
    pub fn sender(&self) -> Sender<AppMessage> {
        self.tx.clone()
    }
}

impl Default for AppStateChannels {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_description() {
        assert_eq!(ConnectionState::Connected.description(), "Connected");
        assert_eq!(
            ConnectionState::Reconnecting { attempt: 3 }.description(),
            "Reconnecting (attempt 3)"
        );
        assert!(!ConnectionState::Disconnected.is_connected());
    }

    #[test]
    fn test_channels_deliver_in_order() {
        let channels = AppStateChannels::new();
        let tx = channels.sender();
        tx.send(AppMessage::ConnectionStateChanged(
            ConnectionState::Reconnecting { attempt: 1 },
        ))
        .unwrap();
        tx.send(AppMessage::ConnectionStateChanged(ConnectionState::Connected))
            .unwrap();

        let received: Vec<_> = channels.rx.try_iter().collect();
        assert!(matches!(
            received[0],
            AppMessage::ConnectionStateChanged(ConnectionState::Reconnecting { attempt: 1 })
        ));
        assert!(matches!(
            received[1],
            AppMessage::ConnectionStateChanged(ConnectionState::Connected)
        ));
    }
}
