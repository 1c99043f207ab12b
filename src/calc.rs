use crate::clock::Clock;
use crate::display::DisplaySurface;
use crate::expr::{evaluate_display, format_truncated};
use crate::keypad::{Input, Key};
use crate::session::{SessionState, ERROR_MARKER, HIDDEN_INPUT_COUNT};
use crate::time_code::time_code;
use tracing::{debug, info};

/// Pressed twice in a row to open hidden entry
pub const SECRET_KEY: Key = Key::Point;
/// Adds the shown number to the hidden accumulator
pub const CONFIRM_KEY: Key = Key::Add;
/// Stops the decoy and shows the unshifted code
pub const REVEAL_KEY: Key = Key::Equals;

/// Operating phase, derived from the session flags
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Normal,
    HiddenAccumulating,
    Locked,
    LockedRevealing,
}

/// What the host must do with the periodic refresh after an input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    StartRefresh,
    StopRefresh,
}

/// The calculator and its hidden decoy mode.
///
/// Owns the session state and pushes every display change to the surface.
/// It never spawns anything: starting and stopping the refresh timer is left
/// to the host through the returned [`Effect`].
#[derive(Debug)]
pub struct Calculator<C: Clock, D: DisplaySurface> {
    pub session_state: SessionState,
    clock: C,
    surface: D,
}

impl<C: Clock, D: DisplaySurface> Calculator<C, D> {
    pub fn new(clock: C, mut surface: D) -> Self {
        let session_state = SessionState::default();
        surface.set_text(&session_state.display);
        Self {
            session_state,
            clock,
            surface,
        }
    }

    pub fn phase(&self) -> Phase {
        let s = &self.session_state;
        match (s.is_locked, s.auto_update_running, s.hidden_mode_active) {
            (true, true, _) => Phase::LockedRevealing,
            (true, false, _) => Phase::Locked,
            (false, _, true) => Phase::HiddenAccumulating,
            (false, _, false) => Phase::Normal,
        }
    }

    pub fn display(&self) -> &str {
        &self.session_state.display
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Value the decoy shows right now
    pub fn decoy_value(&self) -> i64 {
        time_code(self.clock.now()) - self.session_state.total_sum
    }

    pub fn handle(&mut self, input: Input) -> Effect {
        let before = self.phase();
        let effect = match input {
            Input::Key(key) => self.on_key(key),
            Input::BackgroundTap => self.start_decoy(),
        };
        let after = self.phase();
        if before != after {
            debug!(from = %before, to = %after, "phase change");
        }
        effect
    }

    /// Periodic refresh. Returns true when the display changed.
    pub fn on_tick(&mut self) -> bool {
        if !self.session_state.auto_update_running {
            return false;
        }
        let target = self.decoy_value().to_string();
        if self.session_state.display == target {
            return false;
        }
        self.set_display(target);
        true
    }

    fn on_key(&mut self, key: Key) -> Effect {
        if self.session_state.is_locked {
            return if key == REVEAL_KEY {
                self.reveal()
            } else {
                self.start_decoy()
            };
        }

        // the gesture leaves last_button alone, so a third press re-triggers it
        if key == SECRET_KEY && self.session_state.last_button == Some(SECRET_KEY) {
            self.enter_hidden_mode();
            return Effect::None;
        }

        if self.session_state.hidden_mode_active {
            self.hidden_key(key);
        } else {
            self.normal_key(key);
        }
        self.session_state.last_button = Some(key);
        Effect::None
    }

    fn normal_key(&mut self, key: Key) {
        match key {
            Key::Clear => self.set_display("0"),
            Key::Backspace => {
                let mut text = self.session_state.display.clone();
                if self.session_state.shows_error() || text.chars().count() <= 1 {
                    text = "0".to_string();
                } else {
                    text.pop();
                }
                self.set_display(text);
            }
            Key::Equals => match evaluate_display(&self.session_state.display) {
                Ok(result) => self.set_display(result),
                Err(err) => {
                    debug!(%err, "evaluation failed");
                    self.set_display(ERROR_MARKER);
                }
            },
            key => {
                let Some(glyph) = key.glyph() else {
                    return;
                };
                let current = if self.session_state.shows_error() {
                    "0"
                } else {
                    self.session_state.display.as_str()
                };
                let text = if current == "0" && key != Key::Point {
                    glyph.to_string()
                } else {
                    format!("{current}{glyph}")
                };
                self.set_display(text);
            }
        }
    }

    fn enter_hidden_mode(&mut self) {
        let s = &mut self.session_state;
        s.hidden_mode_active = true;
        s.hidden_inputs.clear();
        s.waiting_for_new_input = false;
        self.set_display("0");
    }

    fn hidden_key(&mut self, key: Key) {
        if key == CONFIRM_KEY {
            self.confirm_hidden_entry();
            return;
        }
        if !key.is_numeric_entry() {
            return;
        }
        let Some(glyph) = key.glyph() else {
            return;
        };

        let s = &mut self.session_state;
        let text = if s.waiting_for_new_input || s.display == "0" {
            s.waiting_for_new_input = false;
            glyph.to_string()
        } else {
            format!("{}{glyph}", s.display)
        };
        self.set_display(text);
    }

    fn confirm_hidden_entry(&mut self) {
        let value = match self.session_state.display.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                debug!("hidden entry is not a number, skipped");
                return;
            }
        };

        let s = &mut self.session_state;
        s.hidden_inputs.push(value);
        let total = s.hidden_total();

        if s.hidden_inputs.len() >= HIDDEN_INPUT_COUNT {
            // float to int casts saturate
            s.total_sum = total.trunc() as i64;
            s.is_locked = true;
            s.hidden_mode_active = false;
            s.waiting_for_new_input = false;
            s.auto_update_running = false;
            let text = s.total_sum.to_string();
            self.set_display(text);
            info!("decoy armed");
        } else {
            s.waiting_for_new_input = true;
            match format_truncated(total) {
                Ok(text) => self.set_display(text),
                Err(err) => debug!(%err, "running total not displayable"),
            }
        }
    }

    fn start_decoy(&mut self) -> Effect {
        if !self.session_state.is_locked || self.session_state.auto_update_running {
            return Effect::None;
        }
        self.session_state.auto_update_running = true;
        let text = self.decoy_value().to_string();
        self.set_display(text);
        Effect::StartRefresh
    }

    fn reveal(&mut self) -> Effect {
        let was_running = self.session_state.auto_update_running;
        self.session_state.auto_update_running = false;
        let text = time_code(self.clock.now()).to_string();
        self.set_display(text);
        if was_running {
            Effect::StopRefresh
        } else {
            Effect::None
        }
    }

    fn set_display(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.session_state.display != text {
            self.session_state.display = text;
            self.surface.set_text(&self.session_state.display);
        }
    }
}
