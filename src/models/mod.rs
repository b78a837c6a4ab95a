// ABOUTME: Core data models for the intake wizard: entity kinds and the editable entity tree

pub mod entity;

pub use entity::{EntityDraft, EntityKind};
