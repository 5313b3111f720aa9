//! Grounded answer generation for NotiVet.
//!
//! This crate turns matched drug digests into a grounded prompt and sends it
//! to a text generation backend (an OpenAI-compatible chat completions API by
//! default).

pub mod assistant;
pub mod generator;
pub mod openai;
pub mod prompts;

pub use assistant::*;
pub use generator::*;
pub use openai::*;
pub use prompts::*;
