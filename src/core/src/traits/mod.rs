//! Collaborator traits

pub mod engine;

pub use engine::PolicyEngine;
