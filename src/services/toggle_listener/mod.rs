mod dry_toggle_listener;
mod toggle_listener;
mod r#trait;

pub use self::r#trait::{create_toggle_listener, ToggleListenerTrait};
