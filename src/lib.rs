// Library surface for headless/integration tests and reuse.
// Terminal rendering stays in the binary.
pub mod app_dirs;
pub mod calc;
pub mod clock;
pub mod config;
pub mod display;
pub mod expr;
pub mod keypad;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod time_code;
