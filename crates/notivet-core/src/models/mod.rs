//! Domain models for the NotiVet drug lookup.

mod drug;
mod matching;
mod species;

pub use drug::*;
pub use matching::*;
pub use species::*;
