pub mod controller;
pub mod exclusion;
pub mod state;

pub use controller::{CaptureController, CaptureEvent};
pub use exclusion::InsertedSuggestions;
pub use state::{CaptureDecision, FieldId, Observation, SessionState, TrackerState};
