use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::state::GameCommand;
use crate::common::tunables::Tunables;
use crate::plugins::geometry::CollisionIgnores;
use crate::plugins::mass::{Mass, MassDepleted, RadiusChanged, diameter_scale, publish_mass_change};
use crate::plugins::mover::{Goal, Mover};
use crate::plugins::path::{PathOccupancy, path_is_clear};
use crate::plugins::player::ChargeInput;
use crate::plugins::shot::systems::{despawn_shot, launch_shot};
use crate::plugins::shot::{Shot, ShotDetonated, follow_position, held_shot_bundle};

use super::{ChargeShooter, ChargeStep, RaceOutcome};

/// Press, hold and release for every shooter.
///
/// The press frame only spawns the shot; mass starts flowing on the next
/// frame, once the shot entity exists. A frame where the action is no longer
/// held releases, even if the `released` edge was missed.
pub fn drive_charge(
    mut commands: Commands,
    input: Res<ChargeInput>,
    tunables: Res<Tunables>,
    time: Res<Time>,
    mut ignores: ResMut<CollisionIgnores>,
    q_goal: Query<&Transform, (With<Goal>, Without<Shot>, Without<ChargeShooter>)>,
    mut q_owners: Query<(Entity, &mut ChargeShooter, &mut Mass, &Transform, Option<&Mover>), Without<Shot>>,
    mut q_shots: Query<(&mut Shot, &mut Transform, &mut RigidBody, &mut LinearVelocity), Without<ChargeShooter>>,
    mut radius_changed: MessageWriter<RadiusChanged>,
    mut depleted: MessageWriter<MassDepleted>,
) {
    let goal = q_goal.single().ok().map(|tf| tf.translation.truncate());
    let dt = time.delta_secs();

    for (owner, mut shooter, mut mass, owner_tf, mover) in &mut q_owners {
        let owner_pos = owner_tf.translation.truncate();

        if input.pressed {
            let moving = mover.is_some_and(Mover::is_moving);
            match shooter.can_start(&mass, moving, &tunables.charge) {
                Err(reason) => debug!("Charge press rejected for {owner:?}: {reason:?}"),
                Ok(()) => {
                    let Some(goal) = goal else {
                        debug!("No goal to aim at; ignoring press");
                        continue;
                    };
                    if let Err(e) = tunables.shot.validate(&tunables.mass, &tunables.charge) {
                        error!("Cannot spawn shot: {e}");
                        continue;
                    }

                    let pos = follow_position(owner_pos, goal, tunables.charge.spawn_offset);
                    let shot = commands
                        .spawn(held_shot_bundle(owner, pos, tunables.mass.base_radius))
                        .id();
                    ignores.ignore(owner, shot);
                    shooter.begin_charge(shot);
                    debug!("{owner:?} started charging {shot:?}");
                    continue;
                }
            }
        }

        let Some(shot_e) = shooter.charging_shot() else { continue };
        let Ok((mut shot, mut shot_tf, mut body, mut velocity)) = q_shots.get_mut(shot_e) else {
            debug!("Charging shot {shot_e:?} vanished; cancelling");
            shooter.cancel_charge();
            ignores.release(shot_e);
            continue;
        };

        let mut release = input.released || !input.held;
        if !release {
            let step = shooter.charge_tick(dt, &mut mass, &tunables.charge);
            if let ChargeStep::Transferred { change, .. } = step {
                publish_mass_change(owner, change, &mut radius_changed, &mut depleted);
                shot.set_mass(shooter.accumulated());
                shot_tf.scale = diameter_scale(shot.radius(tunables.mass.base_radius));
                if let Some(goal) = goal {
                    let pos = follow_position(owner_pos, goal, tunables.charge.spawn_offset);
                    shot_tf.translation.x = pos.x;
                    shot_tf.translation.y = pos.y;
                }
            }
            release = step.forces_release();
        }
        if !release {
            continue;
        }

        let Some(released) = shooter.release(&mass, &tunables.charge) else { continue };
        let from = shot_tf.translation.truncate();
        let dir = goal.map_or(Vec2::ZERO, |g| (g - from).normalize_or_zero());
        launch_shot(&mut commands, shot_e, &mut shot, &mut body, &mut velocity, dir, &tunables);

        if released.last_shot {
            info!("Last shot {shot_e:?} away; waiting for the path to clear");
        } else {
            debug!("{owner:?} released {shot_e:?} with mass {:.3}", shot.mass());
        }
    }
}

/// Feed detonations and path state into pending last-shot races.
pub fn resolve_last_shot(
    time: Res<Time>,
    mut detonations: MessageReader<ShotDetonated>,
    q_paths: Query<&PathOccupancy>,
    mut q_shooters: Query<(Entity, &mut ChargeShooter)>,
    mut commands_out: MessageWriter<GameCommand>,
) {
    let dt = time.delta_secs();

    for ev in detonations.read() {
        for (owner, mut shooter) in &mut q_shooters {
            if shooter.observe_detonation(ev.shot) {
                debug!("Last shot of {owner:?} detonated; polling the path");
            }
        }
    }

    let clear = path_is_clear(&q_paths);
    for (owner, mut shooter) in &mut q_shooters {
        match shooter.tick_race(dt, clear) {
            Some(RaceOutcome::Cleared) => info!("Last shot of {owner:?} cleared the path"),
            Some(RaceOutcome::Lost) => {
                info!("Last shot of {owner:?} ran out of time; path still blocked");
                commands_out.write(GameCommand::Lose);
            }
            None => {}
        }
    }
}

/// Cancel charging and release the shot when input is turned off.
pub fn disable_input(
    commands: &mut Commands,
    ignores: &mut CollisionIgnores,
    shooter: &mut ChargeShooter,
) {
    if let Some(shot) = shooter.set_input_enabled(false) {
        despawn_shot(commands, ignores, shot);
    }
}
