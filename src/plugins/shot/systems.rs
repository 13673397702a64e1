use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::{Layer, is_in_layer};
use crate::common::tunables::{InfectionTuning, Tunables};
use crate::plugins::geometry::{CollisionIgnores, box_overlap_distance};
use crate::plugins::obstacles::{Obstacle, owning_obstacle};

use super::{Lifetime, Shot, ShotDetonated};

/// `min(max_radius, base_radius + shot_radius · radius_per_shot_radius)`.
#[inline]
pub fn infection_radius(shot_radius: f32, tuning: &InfectionTuning) -> f32 {
    (tuning.base_radius + shot_radius * tuning.radius_per_shot_radius).min(tuning.max_radius)
}

/// Despawn a shot and drop its collision-ignore pairs.
pub fn despawn_shot(commands: &mut Commands, ignores: &mut CollisionIgnores, shot: Entity) {
    ignores.release(shot);
    commands.entity(shot).try_despawn();
}

/// Turn a held shot into a ballistic body moving along `dir`.
///
/// Swept CCD keeps a small fast shot from tunnelling through thin obstacles.
pub fn launch_shot(
    commands: &mut Commands,
    entity: Entity,
    shot: &mut Shot,
    body: &mut RigidBody,
    velocity: &mut LinearVelocity,
    dir: Vec2,
    tunables: &Tunables,
) -> bool {
    if !shot.launch() {
        return false;
    }

    *body = RigidBody::Dynamic;
    velocity.0 = dir * tunables.charge.shot_speed;

    commands.entity(entity).insert((
        SweptCcd::default(),
        Lifetime(Timer::from_seconds(tunables.shot.max_flight_secs, TimerMode::Once)),
    ));
    true
}

/// Detonate in-flight shots on their first obstacle contact and send the
/// infection wave out from the obstacle that was hit.
pub fn detonate_on_contact(
    mut commands: Commands,
    mut started: MessageReader<CollisionStart>,
    tunables: Res<Tunables>,
    ignores: Res<CollisionIgnores>,
    mut q_shots: Query<(&mut Shot, &Transform), Without<Obstacle>>,
    mut q_obstacles: Query<(Entity, &mut Obstacle, &Transform, Option<&CollisionLayers>), Without<Shot>>,
    q_parents: Query<&ChildOf>,
    mut detonated: MessageWriter<ShotDetonated>,
) {
    for ev in started.read() {
        for (shot_e, other) in [(ev.collider1, ev.collider2), (ev.collider2, ev.collider1)] {
            let Ok((mut shot, shot_tf)) = q_shots.get_mut(shot_e) else { continue };
            if ignores.is_ignored(shot_e, other) {
                continue;
            }

            let Some(hit) = owning_obstacle(
                other,
                |x| q_obstacles.contains(x),
                |x| q_parents.get(x).ok().map(|c| c.parent()),
            ) else {
                continue;
            };

            if !shot.detonate() {
                continue;
            }

            let Ok((_, _, hit_tf, _)) = q_obstacles.get(hit) else { continue };
            let epicenter = hit_tf.translation.truncate();
            let shot_radius = shot_tf.scale.x * 0.5;
            let radius = infection_radius(shot_radius, &tunables.infection);

            let mut armed = 0;
            for (e, mut obstacle, tf, layers) in &mut q_obstacles {
                if !obstacle.is_active() || layers.is_some_and(|l| !is_in_layer(l, Layer::Obstacle)) {
                    continue;
                }
                let Some(distance) =
                    box_overlap_distance(epicenter, radius, tf.translation.truncate(), obstacle.footprint())
                else {
                    continue;
                };

                let delay = distance * tunables.infection.wave_delay_per_meter;
                if obstacle.arm(delay) {
                    debug!("Obstacle {e:?} armed, explodes in {delay:.3}s + shake");
                    armed += 1;
                }
            }

            info!("Shot {shot_e:?} detonated at {epicenter}, infection radius {radius:.2}, armed {armed}");

            commands.entity(shot_e).insert(Lifetime(Timer::from_seconds(
                tunables.shot.destroy_delay_after_hit,
                TimerMode::Once,
            )));
            detonated.write(ShotDetonated {
                shot: shot_e,
                owner: shot.owner,
                epicenter,
                armed,
            });
        }
    }
}

/// Despawn shots whose flight or grace period ran out.
pub fn expire_shots(
    mut commands: Commands,
    time: Res<Time>,
    mut ignores: ResMut<CollisionIgnores>,
    mut q: Query<(Entity, &mut Lifetime), With<Shot>>,
) {
    for (e, mut lifetime) in &mut q {
        lifetime.tick(time.delta());
        if lifetime.is_finished() {
            despawn_shot(&mut commands, &mut ignores, e);
        }
    }
}
