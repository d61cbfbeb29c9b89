//! # Annai - Resumable Journey Engine
//!
//! **Annai** drives multi-path customer-onboarding journeys: it decides which
//! sequence of steps a user sees, persists progress across reloads, tracks
//! which fields have been edited away from a baseline, and supports mid-flow
//! branch-and-return (a KYC method switch, a resume-by-link re-entry). The
//! screens themselves are the host's concern; Annai is the router and the
//! change-tracking store behind them.
//!
//! ## Core Workflow
//!
//! The engine operates on a canonical catalog of steps and a closed set of
//! journey types. The primary workflow is:
//!
//! 1.  **Resolve the entry point**: parse the initial navigation URL with
//!     [`EntryPoint::from_url`] (or construct one directly) to detect a
//!     resume-by-link entry.
//! 2.  **Initialize the session**: [`JourneySession::init`] restores a saved
//!     session from storage — migrating older snapshot shapes — or starts
//!     fresh with the default journey pre-built.
//! 3.  **Drive navigation**: screens read the current step through the
//!     session and call `advance`/`retreat`/`jump_to`; mid-flow the journey
//!     can be switched or truncated without losing captured answers.
//! 4.  **Capture data**: screens merge partial updates into the form draft;
//!     the session maintains a reversible diff against the journey baseline.
//!
//! Every mutation is persisted write-through, so the session can be resumed
//! after any reload.
//!
//! ## Quick Start
//!
//! ```rust
//! use annai::prelude::*;
//! use serde_json::json;
//!
//! // Fresh launch: in-memory storage, no resume flag.
//! let mut session = JourneySession::init(MemoryStore::new(), EntryPoint::fresh());
//!
//! // The user picks the express savings-to-salary conversion.
//! let prefilled = FormDraft::from_pairs([("accountNumber", json!("00123456789"))]);
//! session.start_journey(JourneyType::EtbExpress, Some(prefilled), None);
//!
//! // The baseline absorbs prefilled values, so nothing counts as changed yet.
//! assert!(session.changed_fields().is_empty());
//!
//! // A screen captures a consent and moves on.
//! session.merge_draft(FormDraft::from_pairs([("autoConvertConsent", json!(true))]));
//! assert!(session.is_changed("autoConvertConsent"));
//! session.advance();
//!
//! let step = session.current_step().expect("journey has steps");
//! println!("now on: {} ({})", step.id, step.title);
//! ```
pub mod catalog;
pub mod controller;
pub mod entry;
pub mod error;
pub mod journey;
pub mod prelude;
pub mod session;
pub mod store;
