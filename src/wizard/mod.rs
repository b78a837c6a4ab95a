// ABOUTME: Multi-step intake wizard engine
// Step registry, challenge-type auto-population, draft persistence and the controller tying them together

pub mod controller;
pub mod draft;
pub mod phases;
pub mod steps;

pub use controller::{StepOutcome, WizardController, WizardMode, WizardState};
pub use draft::{
    DraftError, DraftSnapshot, DraftStorage, DraftStore, FileDraftStorage, MemoryDraftStorage,
    StorageError,
};
pub use phases::{
    AutoPopulationEngine, ChallengeType, EvaluationPhase, PhaseLayout, PopulationContext,
    PopulationOutcome,
};
pub use steps::{RegistryError, StepDescriptor, StepRegistry};
