//! Pushes balance changes to connected clients and raises the cosmetic delta popup.
use bevy::{ecs::world::FromWorld, prelude::*};

use crate::session::{NetMessage, SessionRegistry};

use super::{
    balance::{BalanceChange, BalanceFeed, BalanceStore},
    events::{BalancePopup, BalanceRequested, PopupStyle},
};

/// The relay's own subscription to the balance store.
#[derive(Resource, Debug)]
pub struct BalanceRelay {
    feed: BalanceFeed,
}

impl FromWorld for BalanceRelay {
    fn from_world(world: &mut World) -> Self {
        let feed = world.resource_mut::<BalanceStore>().subscribe();
        Self { feed }
    }
}

/// Popup text and style for a change, or `None` when the balance did not move.
pub fn popup_for_change(change: &BalanceChange, store: &BalanceStore) -> Option<(String, PopupStyle)> {
    let delta = change.delta();
    if delta > 0 {
        Some((format!("+{}", store.stringify(delta)), PopupStyle::Medium))
    } else if delta < 0 {
        Some((
            format!("-{}", store.stringify(delta.saturating_neg())),
            PopupStyle::MediumCaution,
        ))
    } else {
        None
    }
}

/// Delivers every pending balance change. Changes for participants without a
/// session are dropped.
pub fn relay_balance_changes(
    relay: Res<BalanceRelay>,
    store: Res<BalanceStore>,
    mut sessions: ResMut<SessionRegistry>,
    mut popups: MessageWriter<BalancePopup>,
) {
    for change in relay.feed.drain() {
        let message = NetMessage::BalanceUpdate {
            new_balance: change.new_balance,
            old_balance: change.old_balance,
        };
        if !sessions.send(change.participant, message) {
            debug!(
                "Dropped balance update for {}: no active session",
                change.participant
            );
            continue;
        }

        let Some(entity) = sessions
            .get(change.participant)
            .and_then(|session| session.attached_entity())
        else {
            continue;
        };

        if let Some((text, style)) = popup_for_change(&change, &store) {
            popups.write(BalancePopup {
                participant: change.participant,
                entity,
                text,
                style,
            });
        }
    }
}

/// Answers balance requests with an update whose old and new balance are equal.
pub fn answer_balance_requests(
    mut requests: MessageReader<BalanceRequested>,
    store: Res<BalanceStore>,
    mut sessions: ResMut<SessionRegistry>,
) {
    for request in requests.read() {
        let balance = store.balance(request.participant);
        let message = NetMessage::BalanceUpdate {
            new_balance: balance,
            old_balance: balance,
        };
        if !sessions.send(request.participant, message) {
            debug!(
                "Balance request from {} dropped: no active session",
                request.participant
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ParticipantId;

    #[derive(Resource, Default)]
    struct CollectedPopups(Vec<BalancePopup>);

    fn collect_popups(
        mut popups: MessageReader<BalancePopup>,
        mut collected: ResMut<CollectedPopups>,
    ) {
        collected.0.extend(popups.read().cloned());
    }

    fn relay_app() -> App {
        let mut app = App::new();
        app.insert_resource(BalanceStore::default())
            .init_resource::<BalanceRelay>()
            .init_resource::<SessionRegistry>()
            .init_resource::<CollectedPopups>()
            .add_message::<BalancePopup>()
            .add_message::<BalanceRequested>()
            .add_systems(
                Update,
                (
                    relay_balance_changes,
                    answer_balance_requests,
                    collect_popups,
                )
                    .chain(),
            );
        app
    }

    #[test]
    fn popup_text_follows_sign() {
        let store = BalanceStore::default();
        let id = ParticipantId::new(1);
        let gain = BalanceChange {
            participant: id,
            old_balance: 0,
            new_balance: 30,
        };
        let loss = BalanceChange {
            participant: id,
            old_balance: 30,
            new_balance: 29,
        };
        let flat = BalanceChange {
            participant: id,
            old_balance: 3,
            new_balance: 3,
        };

        assert_eq!(
            popup_for_change(&gain, &store),
            Some(("+30 pennies".to_string(), PopupStyle::Medium))
        );
        assert_eq!(
            popup_for_change(&loss, &store),
            Some(("-1 penny".to_string(), PopupStyle::MediumCaution))
        );
        assert_eq!(popup_for_change(&flat, &store), None);
    }

    #[test]
    fn connected_participant_receives_update_and_popup() {
        let mut app = relay_app();
        let id = ParticipantId::new(1);
        let body = app.world_mut().spawn_empty().id();
        {
            let mut sessions = app.world_mut().resource_mut::<SessionRegistry>();
            sessions.connect(id, "Ada");
            sessions.attach(id, Some(body));
        }
        app.world_mut()
            .resource_mut::<BalanceStore>()
            .add_currency(id, 45);

        app.update();

        let sessions = app.world().resource::<SessionRegistry>();
        let outbox = sessions.get(id).map(|s| s.outbox().to_vec()).unwrap_or_default();
        assert_eq!(
            outbox,
            vec![NetMessage::BalanceUpdate {
                new_balance: 45,
                old_balance: 0
            }]
        );

        let popups = &app.world().resource::<CollectedPopups>().0;
        assert_eq!(popups.len(), 1);
        assert_eq!(popups[0].entity, body);
        assert_eq!(popups[0].text, "+45 pennies");
    }

    #[test]
    fn disconnected_participant_update_is_dropped() {
        let mut app = relay_app();
        let id = ParticipantId::new(2);
        app.world_mut()
            .resource_mut::<BalanceStore>()
            .add_currency(id, 10);

        app.update();

        assert_eq!(app.world().resource::<BalanceStore>().balance(id), 10);
        assert!(app.world().resource::<SessionRegistry>().get(id).is_none());
        assert!(app.world().resource::<CollectedPopups>().0.is_empty());

        // Reconnecting later does not replay the dropped update.
        app.world_mut()
            .resource_mut::<SessionRegistry>()
            .connect(id, "Late");
        app.update();
        let sessions = app.world().resource::<SessionRegistry>();
        assert!(sessions.get(id).map(|s| s.outbox().is_empty()).unwrap_or(false));
    }

    #[test]
    fn unattached_session_gets_update_without_popup() {
        let mut app = relay_app();
        let id = ParticipantId::new(3);
        app.world_mut()
            .resource_mut::<SessionRegistry>()
            .connect(id, "Ghost");
        app.world_mut()
            .resource_mut::<BalanceStore>()
            .add_currency(id, -5);

        app.update();

        let sessions = app.world().resource::<SessionRegistry>();
        assert_eq!(sessions.get(id).map(|s| s.outbox().len()), Some(1));
        assert!(app.world().resource::<CollectedPopups>().0.is_empty());
    }

    #[test]
    fn balance_request_echoes_current_balance() {
        let mut app = relay_app();
        let id = ParticipantId::new(4);
        app.world_mut()
            .resource_mut::<SessionRegistry>()
            .connect(id, "Cy");
        app.world_mut()
            .resource_mut::<BalanceStore>()
            .add_currency(id, 12);
        app.update();
        app.world_mut()
            .resource_mut::<SessionRegistry>()
            .drain_outbox(id);

        app.world_mut()
            .write_message(BalanceRequested { participant: id });
        app.update();

        let sessions = app.world().resource::<SessionRegistry>();
        assert_eq!(
            sessions.get(id).map(|s| s.outbox().to_vec()),
            Some(vec![NetMessage::BalanceUpdate {
                new_balance: 12,
                old_balance: 12
            }])
        );
    }
}
