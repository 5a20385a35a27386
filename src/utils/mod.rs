pub mod clock;
pub mod device_finder;
pub mod permissions;

pub use clock::MonotonicClock;
pub use device_finder::DeviceFinder;

// Макросы условного логирования для горячего пути
#[macro_export]
macro_rules! debug_if_enabled {
    ($($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!($($arg)*);
        }
    };
}
