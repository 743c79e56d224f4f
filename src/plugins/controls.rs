//! Controls plugin - Self-contained plugin pattern
//!
//! Translates keyboard input into [`ViewerCommand`] events.
//!
//! | Key      | Command            |
//! |----------|--------------------|
//! | `R`      | regenerate         |
//! | `A`      | cycle axis         |
//! | `C`      | cycle colored body |
//! | `Escape` | quit               |

use crate::prelude::*;

pub struct ControlsPlugin;

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ViewerCommand>();
        app.add_systems(Update, keyboard_input_handler);
    }
}

fn command_for_key(keycode: KeyCode) -> Option<ViewerCommand> {
    match keycode {
        KeyCode::KeyR => Some(ViewerCommand::Regenerate),
        KeyCode::KeyA => Some(ViewerCommand::CycleAxis),
        KeyCode::KeyC => Some(ViewerCommand::CycleColoredBody),
        #[cfg(not(target_arch = "wasm32"))]
        KeyCode::Escape => Some(ViewerCommand::Quit),
        _ => None,
    }
}

fn keyboard_input_handler(
    keys: Res<ButtonInput<KeyCode>>,
    mut commands: EventWriter<ViewerCommand>,
) {
    for &keycode in keys.get_just_pressed() {
        if let Some(command) = command_for_key(keycode) {
            commands.write(command);
        }
    }
}
