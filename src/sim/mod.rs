/// Day/hour/tick simulation clock.
pub mod clock;
pub mod engine;
/// Concurrency-factor sweep across chargepoint counts.
pub mod sweep;
pub mod types;
