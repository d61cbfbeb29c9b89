//! Restoring a persisted session, including schema migration.
//!
//! Persisted state is stamped with a schema version. Version 1 is the legacy
//! layout: scalar values stored as raw strings and the baseline/changed keys
//! possibly absent. Version 2 (current) stores every value as JSON and always
//! writes the full key set. Step-list reconciliation against the catalog runs
//! for every version, because the catalog can change without a format change.

use crate::catalog::{Step, StepCatalog, StepId};
use crate::error::RestoreError;
use crate::journey::{JourneyType, UserType, build_steps};
use crate::session::storage::{SessionStorage, keys};
use crate::store::FormDraft;
use itertools::Itertools;
use serde_json::Value;
use tracing::{debug, warn};

/// Version stamped into snapshots written by this crate.
pub const SCHEMA_VERSION: u32 = 2;

/// Everything a session needs to pick up where it left off.
#[derive(Debug)]
pub struct RestoredSession {
    pub user_type: UserType,
    pub journey_type: Option<JourneyType>,
    pub steps: Vec<Step>,
    pub current_index: usize,
    pub branch: Option<StepId>,
    /// One-time fast-forward target for resume-by-link entries.
    pub pending_resume: Option<usize>,
    pub draft: FormDraft,
    pub baseline: FormDraft,
    pub prefilled: FormDraft,
    pub changed: Vec<String>,
}

/// Reads persisted state back. `Ok(None)` means no saved session; an error
/// means the snapshot is unusable and the caller must fall back to a reset.
pub fn load(
    storage: &impl SessionStorage,
    catalog: &StepCatalog,
    resume_entry: bool,
) -> Result<Option<RestoredSession>, RestoreError> {
    let (Some(user_type_raw), Some(index_raw), Some(steps_raw)) = (
        storage.get(keys::USER_TYPE),
        storage.get(keys::STEP_INDEX),
        storage.get(keys::JOURNEY_STEPS),
    ) else {
        return Ok(None);
    };

    let version = schema_version(storage)?;
    if version > SCHEMA_VERSION {
        return Err(RestoreError::InvalidShape(format!(
            "schema version {version} is newer than supported {SCHEMA_VERSION}"
        )));
    }
    if version < SCHEMA_VERSION {
        debug!(version, "migrating legacy session snapshot");
    }

    let user_type = UserType::parse(&unquote(&user_type_raw)).ok_or_else(|| {
        RestoreError::Corrupt {
            key: keys::USER_TYPE.to_string(),
            message: format!("unknown user type '{user_type_raw}'"),
        }
    })?;

    let journey_type = match storage.get(keys::JOURNEY_TYPE) {
        Some(raw) => Some(JourneyType::parse(&unquote(&raw)).ok_or_else(|| {
            RestoreError::Corrupt {
                key: keys::JOURNEY_TYPE.to_string(),
                message: format!("unknown journey type '{raw}'"),
            }
        })?),
        None => None,
    };

    let saved_steps: Vec<Step> = parse_json(keys::JOURNEY_STEPS, &steps_raw)?;
    let saved_index: usize = parse_json(keys::STEP_INDEX, &index_raw)?;

    if saved_steps.is_empty() {
        if saved_index > 0 {
            return Err(RestoreError::InvalidShape(
                "empty step list with nonzero step index".to_string(),
            ));
        }
        return Ok(None);
    }

    let (steps, current_index) =
        reconcile_steps(saved_steps, saved_index, journey_type, catalog)?;

    let branch = storage.get(keys::BRANCH_STEP_ID).and_then(|raw| {
        let id = StepId::new(unquote(&raw));
        if catalog.contains(&id) {
            Some(id)
        } else {
            debug!(step_id = %id, "restored branch screen no longer exists, dropping");
            None
        }
    });

    let draft = match storage.get(keys::FORM_DATA) {
        Some(raw) => parse_draft(keys::FORM_DATA, &raw)?,
        None => FormDraft::seeded(),
    };
    let baseline = match storage.get(keys::BASELINE_DATA) {
        Some(raw) => parse_draft(keys::BASELINE_DATA, &raw)?,
        // Legacy snapshots carry no baseline; the restored draft is the best
        // available zero-point.
        None => draft.clone(),
    };
    let prefilled = match storage.get(keys::PREFILLED_DATA) {
        Some(raw) => parse_draft(keys::PREFILLED_DATA, &raw)?,
        None => FormDraft::new(),
    };
    let changed: Vec<String> = match storage.get(keys::CHANGED_FIELDS) {
        Some(raw) => parse_json(keys::CHANGED_FIELDS, &raw)?,
        None => Vec::new(),
    };

    // Resume-by-link forces the user back to the first step for
    // re-verification, remembering where they were; the first advance()
    // consumes the remembered index as a one-time fast-forward.
    let (current_index, pending_resume) = if resume_entry && current_index > 0 {
        (0, Some(current_index))
    } else {
        (current_index, None)
    };

    Ok(Some(RestoredSession {
        user_type,
        journey_type,
        steps,
        current_index,
        branch,
        pending_resume,
        draft,
        baseline,
        prefilled,
        changed,
    }))
}

/// Applies the migration policy to a restored step list:
/// ids unknown to the catalog are filtered out; if the surviving list
/// structurally differs from the canonical list for its journey type, the
/// canonical list replaces it and the position is preserved by locating the
/// previously-current step id (falling back to 0). The index is always
/// re-clamped into range.
fn reconcile_steps(
    saved_steps: Vec<Step>,
    saved_index: usize,
    journey_type: Option<JourneyType>,
    catalog: &StepCatalog,
) -> Result<(Vec<Step>, usize), RestoreError> {
    let clamped = saved_index.min(saved_steps.len() - 1);
    let current_id = saved_steps[clamped].id.clone();

    let filtered: Vec<Step> = saved_steps
        .into_iter()
        .filter(|step| {
            let known = catalog.contains(&step.id);
            if !known {
                debug!(step_id = %step.id, "filtering retired step from restored journey");
            }
            known
        })
        .collect();

    let steps = match journey_type {
        Some(journey) => {
            let canonical = build_steps(journey, catalog);
            let filtered_ids: Vec<&StepId> = filtered.iter().map(|s| &s.id).collect_vec();
            let canonical_ids: Vec<&StepId> = canonical.iter().map(|s| &s.id).collect_vec();
            if filtered_ids != canonical_ids {
                warn!(journey = %journey, "restored step list is outdated, rebuilding canonical flow");
                canonical
            } else {
                filtered
            }
        }
        None => filtered,
    };

    if steps.is_empty() {
        return Err(RestoreError::InvalidShape(
            "no restored step survived catalog reconciliation".to_string(),
        ));
    }

    let index = steps
        .iter()
        .position(|step| step.id == current_id)
        .unwrap_or(0)
        .min(steps.len() - 1);

    Ok((steps, index))
}

fn schema_version(storage: &impl SessionStorage) -> Result<u32, RestoreError> {
    match storage.get(keys::SCHEMA_VERSION) {
        // Legacy snapshots predate the version stamp.
        None => Ok(1),
        Some(raw) => parse_json(keys::SCHEMA_VERSION, &raw),
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(key: &str, raw: &str) -> Result<T, RestoreError> {
    serde_json::from_str(raw).map_err(|e| RestoreError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn parse_draft(key: &str, raw: &str) -> Result<FormDraft, RestoreError> {
    let value: Value = parse_json(key, raw)?;
    FormDraft::from_value(value).map_err(|e| RestoreError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Scalar values were stored raw (unquoted) by the legacy layout and as JSON
/// strings by the current one; accept both.
fn unquote(raw: &str) -> String {
    serde_json::from_str::<String>(raw).unwrap_or_else(|_| raw.trim().to_string())
}
