//! Transient artifact storage between the two fan-out stages.

pub mod artifact_store;

pub use artifact_store::ArtifactStore;
