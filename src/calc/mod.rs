pub mod bindings;
pub mod client;
pub mod wire;

pub use bindings::VariableBindings;
pub use client::{RecognitionClient, RecognitionService};
pub use wire::{DisplayResult, ResultEntry};
