//! Systems that spawn the demo crew and script what happens to them each round.
use bevy::prelude::*;

use crate::{
    currency::{BalanceRequested, BalanceStore, ObjectiveCompleted, RoundPayoutCompleted},
    roster::{CharacterBody, CharacterKind, Evacuating, JobAssignment, MindLink, Vitality},
    round::{RoundClock, RoundSettings, RoundStarted},
    session::{ParticipantId, ParticipantIdGenerator, SessionRegistry},
};

/// Fraction of the round left when the scripted outcomes are applied.
const SCRIPT_AT_FRACTION: f32 = 0.2;

#[derive(Component, Debug, Clone)]
pub struct DemoCrewMember {
    pub participant: ParticipantId,
    pub name: String,
    pub slot: u64,
}

/// Remembers which round already had its outcomes scripted.
#[derive(Resource, Debug, Default)]
pub struct DemoRoundScript {
    scripted_round: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptedOutcome {
    Evacuated,
    EvacuatedWithGreentext,
    Died,
    Disconnected,
}

fn outcome_for(slot: u64, round: u64) -> ScriptedOutcome {
    match (slot + round) % 4 {
        0 => ScriptedOutcome::Evacuated,
        1 => ScriptedOutcome::EvacuatedWithGreentext,
        2 => ScriptedOutcome::Died,
        _ => ScriptedOutcome::Disconnected,
    }
}

pub fn spawn_demo_crew(
    mut commands: Commands,
    mut ids: ResMut<ParticipantIdGenerator>,
    mut sessions: ResMut<SessionRegistry>,
) {
    let prototypes = [
        ("Ada", CharacterKind::Humanoid, "station engineer", 5, false),
        ("Bryn", CharacterKind::Humanoid, "assistant", 0, true),
        ("Cass", CharacterKind::BorgChassis, "cyborg", 2, false),
        ("Dov", CharacterKind::Humanoid, "security officer", 8, false),
        ("Eli", CharacterKind::BorgBrain, "positronic", 0, true),
    ];

    for (slot, (name, kind, job, bonus, antagonist_eligible)) in prototypes.into_iter().enumerate() {
        let participant = ids.next_id();
        let entity = commands
            .spawn((
                CharacterBody::new(kind),
                MindLink::owned_by(participant),
                Vitality::Alive,
                JobAssignment::new(job, bonus, antagonist_eligible),
                DemoCrewMember {
                    participant,
                    name: name.to_string(),
                    slot: slot as u64,
                },
                Name::new(format!("{} ({})", name, participant)),
            ))
            .id();

        sessions.connect(participant, name);
        sessions.attach(participant, Some(entity));
        info!("{} joins as {} {} ({})", participant, kind.label(), job, name);
    }
}

/// Revives the crew, clears evacuation, and reconnects anyone who dropped.
pub fn reset_crew_for_round(
    mut commands: Commands,
    mut started: MessageReader<RoundStarted>,
    mut sessions: ResMut<SessionRegistry>,
    mut crew: Query<(Entity, &DemoCrewMember, &mut Vitality)>,
) {
    if started.read().last().is_none() {
        return;
    }

    for (entity, member, mut vitality) in crew.iter_mut() {
        *vitality = Vitality::Alive;
        commands.entity(entity).remove::<Evacuating>();
        if !sessions.is_connected(member.participant) {
            sessions.connect(member.participant, member.name.clone());
            sessions.attach(member.participant, Some(entity));
            info!("{} reconnects for the new round", member.name);
        }
    }
}

/// Applies each crew member's scripted fate once the round is nearly over.
#[allow(clippy::too_many_arguments)]
pub fn play_out_round(
    mut commands: Commands,
    clock: Res<RoundClock>,
    settings: Res<RoundSettings>,
    mut script: ResMut<DemoRoundScript>,
    mut sessions: ResMut<SessionRegistry>,
    mut crew: Query<(Entity, &DemoCrewMember, &mut Vitality)>,
    mut completions: MessageWriter<ObjectiveCompleted>,
    mut requests: MessageWriter<BalanceRequested>,
) {
    let Some(round) = clock.current_round() else {
        return;
    };
    if script.scripted_round == Some(round) {
        return;
    }
    let Some(remaining) = clock.round_fraction_remaining(&settings) else {
        return;
    };
    if remaining > SCRIPT_AT_FRACTION {
        return;
    }
    script.scripted_round = Some(round);

    for (entity, member, mut vitality) in crew.iter_mut() {
        match outcome_for(member.slot, round) {
            ScriptedOutcome::Evacuated => {
                commands.entity(entity).insert(Evacuating);
                debug!("{} boards the evacuation shuttle", member.name);
            }
            ScriptedOutcome::EvacuatedWithGreentext => {
                commands.entity(entity).insert(Evacuating);
                completions.write(ObjectiveCompleted {
                    participant: member.participant,
                });
                debug!("{} completes their objectives and evacuates", member.name);
            }
            ScriptedOutcome::Died => {
                *vitality = Vitality::Dead;
                debug!("{} dies before the shuttle leaves", member.name);
            }
            ScriptedOutcome::Disconnected => {
                sessions.disconnect(member.participant);
                debug!("{} disconnects", member.name);
            }
        }
        requests.write(BalanceRequested {
            participant: member.participant,
        });
    }
}

fn payout_summary(
    round: u64,
    member: &DemoCrewMember,
    job: Option<&JobAssignment>,
    awarded: Option<i64>,
    store: &BalanceStore,
) -> String {
    let awarded = awarded
        .map(|amount| store.stringify(amount))
        .unwrap_or_else(|| "nothing".to_string());
    format!(
        "Round {}: {} the {} earned {} (balance {})",
        round,
        member.name,
        job.map_or("unassigned", |job| job.job.as_str()),
        awarded,
        store.stringify(store.balance(member.participant))
    )
}

pub fn log_payout_summaries(
    mut completed: MessageReader<RoundPayoutCompleted>,
    store: Res<BalanceStore>,
    crew: Query<(&DemoCrewMember, Option<&JobAssignment>)>,
) {
    for event in completed.read() {
        for (member, job) in crew.iter() {
            let awarded = event.report.amount_for(member.participant);
            info!(
                "{}",
                payout_summary(event.report.round, member, job, awarded, &store)
            );
        }
        let circulating: i64 = store
            .balances()
            .fold(0i64, |sum, (_, balance)| sum.saturating_add(balance));
        info!(
            "Round {}: {} held across {} accounts",
            event.report.round,
            store.stringify(circulating),
            store.len()
        );
    }
}
