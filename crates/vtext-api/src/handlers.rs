//! Request handlers.

pub mod fonts;
pub mod health;
pub mod jobs;

pub use fonts::*;
pub use health::*;
pub use jobs::*;
