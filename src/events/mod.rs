pub mod signal;
pub mod toggle;

pub use signal::MatchSignal;
pub use toggle::{KeyState, ToggleEdge, ToggleEvent};
