//! Core data types for the Lorebook entity consolidation engine.
//!
//! This crate provides the request/response types exchanged with the
//! generative-text service and the canonical entity model shared by every
//! other Lorebook crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod debug_log;
mod entity;
mod logging;
mod message;
mod output;
mod policy;
mod request;
mod role;

pub use debug_log::AnalysisDebugLog;
pub use entity::{
    AgeBracket, Character, CharacterRole, ClothingStyle, EntitySet, Scene, SceneStructure,
    SceneType, Weapon,
};
pub use logging::{LogFormat, init_logging};
pub use message::{Message, MessageBuilder};
pub use output::Output;
pub use policy::{ChunkFailurePolicy, MergePolicy};
pub use request::{GenerateRequest, GenerateRequestBuilder, GenerateResponse};
pub use role::Role;
