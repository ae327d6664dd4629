//! ArciTEK - generation session orchestration for a music, image and story studio.
//!
//! The studio turns form input into generation requests, tracks each request
//! from submission to its single terminal outcome, and drives playback of
//! narrated stories.
//!
//! ```text
//! StudioCoordinator
//!   ├── GenerationOrchestrator<MusicDomain>
//!   ├── GenerationOrchestrator<ImageDomain>
//!   ├── GenerationOrchestrator<StoryDomain>
//!   └── NarrationController (once a story is fulfilled)
//!         ├── GenerationOrchestrator<NarrationDomain>
//!         └── Playback
//! ```
//!
//! All network access goes through the [`GenerationService`] trait;
//! [`HttpGenerationService`] is the production implementation.

pub mod client;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod export;
pub mod narration;
pub mod orchestrator;
pub mod playback;
pub mod service;
pub mod session;
pub mod telemetry;

pub use client::HttpGenerationService;
pub use coordinator::{StudioCoordinator, StudioSnapshot};
pub use error::{ErrorInfo, ErrorKind, StudioError};
pub use narration::NarrationController;
pub use orchestrator::{DomainSnapshot, GenerationOrchestrator, SubmitOutcome};
pub use playback::PlaybackState;
pub use service::{GenerationService, HealthStatus, ServiceError};
pub use session::{RequestSession, SessionId, SessionSnapshot, SessionStatus};
