mod dbus_emitter;
mod log_emitter;
mod r#trait;

pub use self::r#trait::{create_signal_emitter, run_emitter, SignalEmitter};
