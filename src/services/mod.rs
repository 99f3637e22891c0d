pub mod lookup;
pub mod progress;
pub mod submitter;
pub mod upload;
