//! Scripted players: random key and mouse activity fed through `InputState`
//! so owner characters are driven exactly as a keyboard would drive them.

use glam::Vec2;
use input::{Binding, ControlBindings, ControlFrame, ElementState, InputState};
use movement::Character;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Screen point the scripted cursor orbits when aiming.
const AIM_ORIGIN: Vec2 = Vec2::new(640.0, 360.0);
const AIM_RADIUS: f32 = 120.0;

/// Held intent for one stretch of play.
#[derive(Debug, Clone, Copy, Default)]
struct Intent {
    horizontal: i8,
    vertical: i8,
    grab: bool,
    primary: bool,
    secondary_tap: bool,
    toggle_light: bool,
}

/// A bot that presses keys in randomly timed segments.
#[derive(Debug)]
pub struct ScriptedPlayer {
    bindings: ControlBindings,
    input: InputState,
    rng: StdRng,
    segment_end: f32,
    /// Secondary and light are taps: pressed on one frame, released on the next.
    taps_down: Vec<Binding>,
}

impl ScriptedPlayer {
    pub fn new(seed: u64, bindings: ControlBindings) -> Self {
        let mut input = InputState::new();
        input.set_aim_origin(AIM_ORIGIN);
        input.process_cursor_position((AIM_ORIGIN.x as f64 + AIM_RADIUS as f64, AIM_ORIGIN.y as f64));
        Self {
            bindings,
            input,
            rng: StdRng::seed_from_u64(seed),
            segment_end: 0.0,
            taps_down: Vec::new(),
        }
    }

    /// Input for the frame starting at `now` (character clock, seconds).
    pub fn frame(&mut self, now: f32) -> ControlFrame {
        self.input.begin_frame();
        for binding in std::mem::take(&mut self.taps_down) {
            set_held(&mut self.input, binding, false);
        }
        if now >= self.segment_end {
            let intent = self.roll_intent();
            self.segment_end = now + self.rng.gen_range(0.25..1.2);
            self.apply(intent);
        }
        self.input.control_frame(&self.bindings)
    }

    fn roll_intent(&mut self) -> Intent {
        let rng = &mut self.rng;
        Intent {
            horizontal: rng.gen_range(-1..=1),
            vertical: if rng.gen_bool(0.3) { rng.gen_range(-1..=1) } else { 0 },
            grab: rng.gen_bool(0.2),
            primary: rng.gen_bool(0.45),
            secondary_tap: rng.gen_bool(0.2),
            toggle_light: rng.gen_bool(0.03),
        }
    }

    fn apply(&mut self, intent: Intent) {
        let b = self.bindings.clone();
        set_held(&mut self.input, b.left, intent.horizontal < 0);
        set_held(&mut self.input, b.right, intent.horizontal > 0);
        set_held(&mut self.input, b.down, intent.vertical < 0);
        set_held(&mut self.input, b.up, intent.vertical > 0);
        set_held(&mut self.input, b.grab, intent.grab);
        set_held(&mut self.input, b.primary, intent.primary);

        if intent.secondary_tap {
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let cursor = AIM_ORIGIN + Vec2::new(angle.cos(), -angle.sin()) * AIM_RADIUS;
            self.input.process_cursor_position((cursor.x as f64, cursor.y as f64));
            self.tap(b.secondary);
        }
        if intent.toggle_light {
            self.tap(b.light);
        }
    }

    fn tap(&mut self, binding: Binding) {
        set_held(&mut self.input, binding, true);
        self.taps_down.push(binding);
    }
}

fn set_held(input: &mut InputState, binding: Binding, held: bool) {
    let state = if held {
        ElementState::Pressed
    } else {
        ElementState::Released
    };
    match binding {
        Binding::Key(key) => {
            if input.is_key_held(key) != held {
                input.process_keyboard(key, state);
            }
        }
        Binding::Mouse(button) => {
            if input.is_mouse_held(button) != held {
                input.process_mouse_button(button, state);
            }
        }
    }
}

/// Feed one frame of controls into a character.
pub fn drive(character: &mut Character, controls: &ControlFrame) {
    character.set_controller_input(controls.axis, controls.grab_held);
    if controls.primary.pressed {
        character.trigger_primary_action();
    }
    if controls.primary.released {
        character.release_primary_action();
    }
    if controls.secondary.pressed {
        character.trigger_secondary_action(controls.aim);
    }
    if controls.secondary.released {
        character.release_secondary_action();
    }
    if controls.toggle_light {
        character.toggle_light();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use input::ButtonEdge;
    use movement::{CharacterKind, MovementConfig, MovementState, Powerups, TalentRanks};

    fn frames(seed: u64, count: usize) -> Vec<ControlFrame> {
        let mut player = ScriptedPlayer::new(seed, ControlBindings::default());
        (0..count).map(|i| player.frame(i as f32 / 60.0)).collect()
    }

    #[test]
    fn same_seed_same_script() {
        assert_eq!(frames(7, 300), frames(7, 300));
    }

    #[test]
    fn axes_stay_digital() {
        for frame in frames(3, 600) {
            assert!([-1.0, 0.0, 1.0].contains(&frame.axis.x));
            assert!([-1.0, 0.0, 1.0].contains(&frame.axis.y));
        }
    }

    #[test]
    fn secondary_taps_release_next_frame() {
        let script = frames(11, 3000);
        let mut taps = 0;
        for pair in script.windows(2) {
            if pair[0].secondary.pressed {
                taps += 1;
                assert!(pair[1].secondary.released);
                assert!(pair[0].aim.length() > 0.99);
            }
        }
        assert!(taps > 0);
    }

    #[test]
    fn drive_routes_buttons_to_character() {
        let mut character = Character::new(
            CharacterKind::DoubleJumpExplorer,
            Vec2::new(0.0, 0.5),
            MovementConfig::default(),
            &TalentRanks::new(),
            Powerups::default(),
        );
        let controls = ControlFrame {
            axis: Vec2::new(1.0, 0.0),
            toggle_light: true,
            primary: ButtonEdge {
                pressed: true,
                held: true,
                released: false,
            },
            ..Default::default()
        };
        drive(&mut character, &controls);
        assert_eq!(character.body().controller, Vec2::new(1.0, 0.0));
        assert!(character.body().primary_held);
        assert!(!character.vitals().unwrap().light_active);
        assert_ne!(character.state(), MovementState::Dashing);
    }
}
