use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::tunables::Tunables;

/// Meters throughout; shots fall under `Tunables::gravity`.
pub fn plugin(app: &mut App) {
    let g = app.world().resource::<Tunables>().gravity;
    app.add_plugins(PhysicsPlugins::default());
    app.insert_resource(Gravity(Vec2::new(0.0, -g)));
}
