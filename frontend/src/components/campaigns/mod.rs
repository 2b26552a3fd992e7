pub mod progress;
pub mod verification;
