//! Return to Base
//!
//! A garrison far from home picks the nearest base, mounts up, drives there
//! and reports back. Before committing, the commander simulates the action
//! to see where it would end up.
//!
//! Key concepts:
//! - Priority-ordered transitions re-evaluated on every tick
//! - Sharing a chosen target between transitions through an `AstVar`
//! - Simulating an action with checkpoints, then running it for real
//! - Waiting on the world state (`TickOutcome::Idle`)
//!
//! Run with: RUST_LOG=debug cargo run --example garrison_rtb

use cmdr_action::builder::{guarded_transition, CmdrActionBuilder, TransitionBuilder};
use cmdr_action::core::{
    ActionState, AstVar, Guard, Position, Priority, Target, WorldProperty, WorldState,
};
use cmdr_action::machine::TickOutcome;
use tracing_subscriber::prelude::*;

const BASES: [(u64, Position); 3] = [
    (1, Position::new(4000.0, 1200.0, 0.0)),
    (2, Position::new(900.0, 600.0, 0.0)),
    (3, Position::new(2500.0, 2500.0, 0.0)),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Return to Base ===\n");

    let mut world = WorldState::new();
    world.put(WorldProperty::Position, Position::new(1000.0, 1000.0, 0.0));

    let base = AstVar::new(Target::NULL);
    let chosen = base.clone();
    let destination = base.clone();

    let mut action = CmdrActionBuilder::new()
        .name("garrison_rtb")
        .world(world)
        .transition(
            TransitionBuilder::new()
                .name("select_base")
                .priority(Priority::TOP)
                .from(ActionState::START)
                .uses(&base)
                .effect(move |world| {
                    let here = world
                        .position(WorldProperty::Position)
                        .unwrap_or_default();
                    let nearest = BASES.iter().min_by(|a, b| {
                        here.distance_2d(&a.1).total_cmp(&here.distance_2d(&b.1))
                    });
                    match nearest {
                        Some((id, _)) => {
                            chosen.set(Target::Location(*id));
                            ActionState::RTB_SELECT_TARGET
                        }
                        None => ActionState::FAILED_OUT_OF_RANGE,
                    }
                }),
        )?
        .transition(
            TransitionBuilder::new()
                .name("mount_up")
                .from(ActionState::RTB_SELECT_TARGET)
                .effect(|world| {
                    world.set_flag(WorldProperty::AllCrewMounted, true);
                    world.set_flag(WorldProperty::AllInfantryMounted, true);
                    ActionState::READY_TO_MOVE
                }),
        )?
        .transition(
            TransitionBuilder::new()
                .name("move_out")
                .from(ActionState::READY_TO_MOVE)
                .when_flag(WorldProperty::AllCrewMounted)
                .uses(&base)
                .effect(move |world| {
                    if destination.get().is_null() {
                        return ActionState::FAILED_OUT_OF_RANGE;
                    }
                    world.set_flag(WorldProperty::Moving, true);
                    ActionState::RTB
                }),
        )?
        .transition(
            TransitionBuilder::new()
                .name("arrived")
                .from(ActionState::RTB)
                .when(|world| !world.flag(WorldProperty::Moving))
                .to(ActionState::RTB_SUCCESS),
        )?
        .transition(
            TransitionBuilder::new()
                .name("report")
                .priority(Priority::LOW)
                .from(ActionState::RTB_SUCCESS)
                .from(ActionState::FAILED_OUT_OF_RANGE)
                .to(ActionState::END),
        )?
        .add_transition(guarded_transition(
            "ambushed",
            Priority::TOP,
            ActionState::ALL,
            ActionState::END,
            Guard::flag(WorldProperty::AwareOfEnemy),
        ))
        .build()?;

    println!("Transitions in evaluation order: {:?}\n", action.transition_names());

    // Dry run: where would the action get to without outside help?
    let preview = action.simulate(|sim| sim.run(10))??;
    println!(
        "Simulation stops at {} after {} transitions ({:?})",
        preview.state, preview.transitions, preview.stop
    );
    println!("Base after simulation: {:?}\n", base.get());

    // Real run, with the engine reporting movement between ticks.
    for tick in 1..=10 {
        match action.tick()? {
            TickOutcome::Transitioned { transition, from, to } => {
                println!("  tick {tick}: {transition}: {from} -> {to}");
            }
            TickOutcome::Idle => {
                println!("  tick {tick}: waiting, garrison arrives");
                action.world_mut().set_flag(WorldProperty::Moving, false);
            }
            TickOutcome::Terminal => break,
        }
    }

    println!("\nFinal state: {}", action.current_state());
    println!("Chosen base: {:?}", base.get());
    println!("Path: {:?}", action.history().get_path());

    let json = action.snapshot().to_json()?;
    println!("\nSnapshot is {} bytes of JSON", json.len());

    println!("\n=== Example Complete ===");
    Ok(())
}
