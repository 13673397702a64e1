//! Core plugin: tunables, clear color and the per-frame set order.

use bevy::prelude::*;

use crate::common::sets::TickSet;
use crate::common::tunables::Tunables;

pub fn plugin(app: &mut App) {
    // A resource inserted up front (tests) wins over the file.
    if !app.world().contains_resource::<Tunables>() {
        let tunables = Tunables::load_or_default(&Tunables::config_path());
        app.insert_resource(tunables);
    }
    app.insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)));

    app.configure_sets(
        Update,
        (
            TickSet::Input,
            TickSet::Requests,
            TickSet::Charge,
            TickSet::Hazards,
            TickSet::Path,
            TickSet::Race,
            TickSet::Motion,
            TickSet::Commands,
            TickSet::Present,
        )
            .chain(),
    );
}
