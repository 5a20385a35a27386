use crate::config::Config;
use crate::error::Result;
use crate::events::ToggleEvent;
use crate::utils::MonotonicClock;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Trait for toggle sources that can run in different modes
#[async_trait::async_trait]
pub trait ToggleListenerTrait {
    /// Run the listener, sending every accepted toggle into `events` in arrival order.
    /// Returns when the receiving side is closed.
    async fn run(self: Box<Self>, events: mpsc::Sender<ToggleEvent>) -> Result<()>;
}

/// Factory function to create an appropriate toggle listener based on the dry_run flag
pub fn create_toggle_listener(
    config: Arc<Config>,
    clock: MonotonicClock,
    dry_run: bool,
) -> Result<Box<dyn ToggleListenerTrait + Send>> {
    if dry_run {
        Ok(Box::new(
            super::dry_toggle_listener::DryRunToggleListener::new(clock),
        ))
    } else {
        Ok(Box::new(super::toggle_listener::RealToggleListener::new(
            config, clock,
        )?))
    }
}
