mod clock_trait;
mod manual_clock;
mod tokio_clock;

pub use clock_trait::Clock;
pub use manual_clock::ManualClock;
pub use tokio_clock::TokioClock;
