//! Flat domain models the collection family produces.

mod entities;

pub use entities::{KnowledgeCard, Lesson, MediaAsset, Resource, StudentWork};
