//! Registry of live sessions and the per-session outbound queue.
use std::collections::HashMap;

use bevy::prelude::*;
use serde::Serialize;

use super::components::ParticipantId;

/// Messages queued for delivery to a participant's client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NetMessage {
    BalanceUpdate { new_balance: i64, old_balance: i64 },
}

/// A participant's live connection.
#[derive(Debug, Clone)]
pub struct Session {
    display_name: String,
    attached_entity: Option<Entity>,
    outbox: Vec<NetMessage>,
}

impl Session {
    fn new(display_name: String) -> Self {
        Self {
            display_name,
            attached_entity: None,
            outbox: Vec::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Entity the participant currently controls, if any.
    pub fn attached_entity(&self) -> Option<Entity> {
        self.attached_entity
    }

    pub fn outbox(&self) -> &[NetMessage] {
        &self.outbox
    }
}

/// Connected sessions keyed by participant.
#[derive(Resource, Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<ParticipantId, Session>,
}

impl SessionRegistry {
    /// Opens a session, or renames the existing one on reconnect.
    pub fn connect(&mut self, participant: ParticipantId, display_name: impl Into<String>) {
        let display_name = display_name.into();
        match self.sessions.get_mut(&participant) {
            Some(session) => session.display_name = display_name,
            None => {
                self.sessions.insert(participant, Session::new(display_name));
            }
        }
    }

    /// Closes a session. Undelivered messages are discarded with it.
    pub fn disconnect(&mut self, participant: ParticipantId) -> Option<Session> {
        self.sessions.remove(&participant)
    }

    pub fn attach(&mut self, participant: ParticipantId, entity: Option<Entity>) -> bool {
        match self.sessions.get_mut(&participant) {
            Some(session) => {
                session.attached_entity = entity;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, participant: ParticipantId) -> Option<&Session> {
        self.sessions.get(&participant)
    }

    pub fn is_connected(&self, participant: ParticipantId) -> bool {
        self.sessions.contains_key(&participant)
    }

    /// Connected population used by the payout gate.
    pub fn player_count(&self) -> usize {
        self.sessions.len()
    }

    /// Queues a message for a connected participant. Returns `false` when the
    /// participant has no session and the message was dropped.
    pub fn send(&mut self, participant: ParticipantId, message: NetMessage) -> bool {
        match self.sessions.get_mut(&participant) {
            Some(session) => {
                session.outbox.push(message);
                true
            }
            None => false,
        }
    }

    pub fn drain_outbox(&mut self, participant: ParticipantId) -> Vec<NetMessage> {
        self.sessions
            .get_mut(&participant)
            .map(|session| std::mem::take(&mut session.outbox))
            .unwrap_or_default()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    fn participants(&self) -> Vec<ParticipantId> {
        self.sessions.keys().copied().collect()
    }
}

/// Stands in for the transport: drains every outbox and logs what would be sent.
pub fn flush_session_outboxes(mut registry: ResMut<SessionRegistry>) {
    for participant in registry.participants() {
        for message in registry.drain_outbox(participant) {
            match serde_json::to_string(&message) {
                Ok(payload) => debug!("-> {}: {}", participant, payload),
                Err(err) => warn!("Failed to encode message for {}: {}", participant, err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_to_disconnected_participant_is_dropped() {
        let mut registry = SessionRegistry::default();
        let message = NetMessage::BalanceUpdate {
            new_balance: 5,
            old_balance: 0,
        };

        assert!(!registry.send(ParticipantId::new(9), message));
        assert_eq!(registry.player_count(), 0);
    }

    #[test]
    fn reconnect_keeps_single_session() {
        let mut registry = SessionRegistry::default();
        let id = ParticipantId::new(1);
        registry.connect(id, "Ada");
        registry.connect(id, "Ada (2)");

        assert_eq!(registry.player_count(), 1);
        assert_eq!(registry.get(id).map(Session::display_name), Some("Ada (2)"));
    }

    #[test]
    fn outbox_drains_in_order() {
        let mut registry = SessionRegistry::default();
        let id = ParticipantId::new(3);
        registry.connect(id, "Bo");
        registry.send(
            id,
            NetMessage::BalanceUpdate {
                new_balance: 10,
                old_balance: 0,
            },
        );
        registry.send(
            id,
            NetMessage::BalanceUpdate {
                new_balance: 4,
                old_balance: 10,
            },
        );

        let drained = registry.drain_outbox(id);
        assert_eq!(drained.len(), 2);
        assert_eq!(
            drained[1],
            NetMessage::BalanceUpdate {
                new_balance: 4,
                old_balance: 10
            }
        );
        assert!(registry.get(id).map(|s| s.outbox().is_empty()).unwrap_or(false));
    }

    #[test]
    fn encodes_balance_update_with_tag() {
        let payload = serde_json::to_value(NetMessage::BalanceUpdate {
            new_balance: 7,
            old_balance: 2,
        })
        .expect("message should encode");
        assert_eq!(payload["type"], "balance_update");
        assert_eq!(payload["new_balance"], 7);
    }
}
