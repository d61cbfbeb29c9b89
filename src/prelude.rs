//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from the annai crate.
//! Import this module to get access to the core functionality without having
//! to import each type individually.
//!
//! # Example
//!
//! ```rust
//! use annai::prelude::*;
//!
//! let mut session = JourneySession::init(MemoryStore::new(), EntryPoint::fresh());
//! session.start_journey(JourneyType::Ntb, None, None);
//! assert_eq!(session.phase(), JourneyPhase::Active);
//! ```

// Session and lifecycle
pub use crate::entry::EntryPoint;
pub use crate::session::{
    FileStore, JourneySession, MemoryStore, SCHEMA_VERSION, SessionStorage,
};

// Journey taxonomy and navigation
pub use crate::controller::{InactivityWatchdog, JourneyController, JourneyPhase, Scheduler};
pub use crate::journey::{JourneyType, UserType, build_steps};

// Catalog and steps
pub use crate::catalog::{ActionKind, PrimaryAction, ScreenRef, Step, StepCatalog, StepId};

// Form data
pub use crate::store::{FormDraft, FormStore};

// Error types
pub use crate::error::{DraftError, RestoreError, StorageError};

// Standard library re-exports commonly used with this crate
pub use std::time::{Duration, Instant};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
