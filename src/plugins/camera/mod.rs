//! Camera plugin (render-only).
//!
//! A system cannot hold `Query<&Transform>` and `Query<&mut Transform>` at the
//! same time unless Bevy can prove the queries are disjoint (B0001). The
//! `Without<...>` filters below are that proof.
//!
//! ```text
//! Startup:    spawn MainCamera, orthographic scale 1 / pixels_per_meter
//! PostUpdate: ease toward the player along the path
//! ```

use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::player::Player;

#[derive(Component)]
pub struct MainCamera {
    pub responsiveness: f32,
    /// Keep the player left of center so the path ahead is visible.
    pub lead: Vec2,
}

pub fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_camera).add_systems(
        PostUpdate,
        follow_player.before(TransformSystems::Propagate),
    );
}

fn spawn_camera(mut commands: Commands, tunables: Res<Tunables>) {
    let scale = 1.0 / tunables.pixels_per_meter.max(f32::EPSILON);
    commands.spawn((
        Name::new("MainCamera"),
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale,
            ..OrthographicProjection::default_2d()
        }),
        MainCamera {
            responsiveness: 5.0,
            lead: Vec2::new(6.0, 2.0),
        },
        Transform::from_xyz(6.0, 2.0, 999.0),
    ));
}

fn follow_player(
    time: Res<Time>,
    q_player: Query<&Transform, (With<Player>, Without<MainCamera>)>,
    mut q_cam: Query<(&mut Transform, &MainCamera), Without<Player>>,
) {
    let Ok(tf_player) = q_player.single() else { return };
    let Ok((mut tf_cam, cam)) = q_cam.single_mut() else { return };

    let alpha = 1.0 - (-cam.responsiveness * time.delta_secs()).exp();
    let target = tf_player.translation.truncate() + cam.lead;
    let current = tf_cam.translation.truncate();
    let next = current + (target - current) * alpha;

    tf_cam.translation.x = next.x;
    tf_cam.translation.y = next.y;
}
