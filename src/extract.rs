//! Tolerant parsers for generated text.
//!
//! Every parser here is total: any input, including the empty string, yields a complete
//! record. Fields that cannot be located fall back to fixed defaults, so a malformed reply
//! never surfaces as an error.

pub mod choice;
pub mod continuation;
pub mod feedback;
pub mod request;
pub mod shape;
pub mod story;

pub use choice::parse_choices;
pub use continuation::parse_continuation;
pub use feedback::parse_feedback;
pub use request::parse_request;
pub use story::{parse_story, StoryParts};
