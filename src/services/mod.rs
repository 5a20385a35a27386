pub mod lifecycle;
pub mod press_dispatcher;
pub mod press_monitor;
pub mod signal_emitter;
pub mod toggle_listener;

pub use lifecycle::Lifecycle;
pub use press_monitor::PressMonitor;
