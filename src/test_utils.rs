//! Test utilities for plugin testing

use crate::prelude::*;

/// Creates a minimal test app with core Bevy plugins needed for testing
///
/// Keyboard state is a bare resource rather than `InputPlugin`, whose
/// per-frame reset would drop presses made between updates.
pub fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.init_resource::<ButtonInput<KeyCode>>();
    app.add_event::<ViewerCommand>();

    app
}

/// Helper to simulate a key press
pub fn press_key(app: &mut App, key: KeyCode) {
    // Clear the input state to ensure just_pressed works correctly
    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .clear();
    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .press(key);
}

/// Helper to simulate a key release
pub fn release_key(app: &mut App, key: KeyCode) {
    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .release(key);
}
