use crate::keypad::Key;

/// Marker shown when an expression cannot be evaluated
pub const ERROR_MARKER: &str = "Error";

/// Number of hidden entries that arm the decoy
pub const HIDDEN_INPUT_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub display: String,
    pub last_button: Option<Key>,
    pub hidden_mode_active: bool,
    pub hidden_inputs: Vec<f64>,
    pub is_locked: bool,
    pub total_sum: i64,
    pub waiting_for_new_input: bool,
    pub auto_update_running: bool,
}

impl SessionState {
    pub fn shows_error(&self) -> bool {
        self.display == ERROR_MARKER
    }

    /// Running sum of the hidden accumulator
    pub fn hidden_total(&self) -> f64 {
        self.hidden_inputs.iter().sum()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            display: "0".to_string(),
            last_button: None,
            hidden_mode_active: false,
            hidden_inputs: Vec::with_capacity(HIDDEN_INPUT_COUNT),
            is_locked: false,
            total_sum: 0,
            waiting_for_new_input: false,
            auto_update_running: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_a_fresh_calculator() {
        let state = SessionState::default();
        assert_eq!(state.display, "0");
        assert_eq!(state.last_button, None);
        assert!(!state.hidden_mode_active);
        assert!(state.hidden_inputs.is_empty());
        assert!(!state.is_locked);
        assert_eq!(state.total_sum, 0);
        assert!(!state.waiting_for_new_input);
        assert!(!state.auto_update_running);
    }

    #[test]
    fn hidden_total_sums_entries() {
        let state = SessionState {
            hidden_inputs: vec![1.5, 2.25, 10.0],
            ..SessionState::default()
        };
        assert_eq!(state.hidden_total(), 13.75);
    }

    #[test]
    fn shows_error_only_for_marker() {
        let mut state = SessionState::default();
        assert!(!state.shows_error());
        state.display = ERROR_MARKER.to_string();
        assert!(state.shows_error());
    }
}
