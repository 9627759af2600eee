//! Domain layer for the weather agent
//!
//! Contains the conversation model (turns, tool invocations, tool results),
//! geographic value objects and the static location table.
//! This layer has no I/O and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
