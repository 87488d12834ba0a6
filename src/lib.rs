#![forbid(unsafe_code)]

pub mod collect;
pub mod compose;
pub mod composite;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;

pub use config::{ColorKey, DecodePolicy, GridSpec, StitchConfig};
pub use error::{StitchError, StitchResult};
pub use output::{FinishOptions, OverwritePrompt, StdinPrompt};
pub use pipeline::stitch;
