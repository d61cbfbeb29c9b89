//! The mutable application draft, its baseline snapshot, and the reversible
//! changed-field diff between the two.

use crate::error::DraftError;
use ahash::AHashSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Well-known draft field keys the engine itself touches.
pub mod fields {
    pub const MOBILE_NUMBER: &str = "mobileNumber";
    pub const EMAIL: &str = "email";
    pub const PAN: &str = "pan";
    pub const WANTS_NOMINEE: &str = "wantsNominee";
    pub const NOMINEES: &str = "nominees";
    pub const AUTO_CONVERT_CONSENT: &str = "autoConvertConsent";
    pub const AUTO_CONVERT_STATUS: &str = "autoConvertStatus";
}

/// The application draft: a semantic mapping of applicant attributes.
///
/// Keys are open-ended (screens own their field names) but the payload is a
/// validated JSON object, with typed accessors for the fields the engine and
/// shell read themselves. Backed by a `BTreeMap` so serialization order is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormDraft {
    fields: BTreeMap<String, Value>,
}

impl FormDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// The seed applicant attributes a fresh journey starts from.
    pub fn seeded() -> Self {
        let mut draft = Self::new();
        draft.insert(fields::MOBILE_NUMBER, json!("9890001234"));
        draft.insert("dob", json!("1990-05-15"));
        draft.insert(fields::PAN, json!("ABCDE1234F"));
        draft.insert(fields::EMAIL, json!("a.sharma@example.com"));
        draft.insert("fatherName", json!("R. K. Sharma"));
        draft.insert("motherName", json!("Anita Sharma"));
        draft.insert("maritalStatus", json!("married"));
        draft.insert("permanentAddressLine1", json!("123, Green Park"));
        draft.insert("permanentAddressLine2", json!("Block C, New Delhi"));
        draft.insert("permanentAddressCity", json!("New Delhi"));
        draft.insert("permanentAddressState", json!("Delhi"));
        draft.insert("permanentAddressPincode", json!("110016"));
        draft.insert("sameAsPermanentAddress", json!(true));
        draft.insert("incomeRange", json!("10-15L"));
        draft.insert("usesPrimaryEmailForComms", json!(true));
        draft.insert("communicationEmail", json!(""));
        draft.insert(fields::WANTS_NOMINEE, json!(false));
        draft.insert(fields::NOMINEES, json!([]));
        // Regulatory declarations (mandatory)
        draft.insert("isPep", json!(false));
        draft.insert("isIndianNational", json!(true));
        draft.insert("isTaxResidentIndiaOnly", json!(true));
        // Consents
        draft.insert("ekycUidaiConsent", json!(false));
        draft.insert("vkycConsent", json!(false));
        draft.insert("vkycPresentInIndia", json!(false));
        // Auto conversion
        draft.insert(fields::AUTO_CONVERT_CONSENT, Value::Null);
        draft.insert(fields::AUTO_CONVERT_STATUS, json!("idle"));
        draft
    }

    /// Validates an externally supplied payload (e.g. restored from storage).
    /// Anything other than a JSON object is rejected.
    pub fn from_value(value: Value) -> Result<Self, DraftError> {
        match value {
            Value::Object(map) => Ok(Self {
                fields: map.into_iter().collect(),
            }),
            other => Err(DraftError::NotAnObject(other.to_string())),
        }
    }

    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Writes every entry of `patch` over this draft. Existing keys are
    /// overwritten; nothing is ever deleted.
    pub fn merge(&mut self, patch: FormDraft) {
        self.fields.extend(patch.fields);
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // --- Typed accessors for well-known fields ---

    fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn mobile_number(&self) -> Option<&str> {
        self.str_field(fields::MOBILE_NUMBER)
    }

    pub fn email(&self) -> Option<&str> {
        self.str_field(fields::EMAIL)
    }

    pub fn pan(&self) -> Option<&str> {
        self.str_field(fields::PAN)
    }

    pub fn wants_nominee(&self) -> bool {
        self.get(fields::WANTS_NOMINEE)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn nominee_count(&self) -> usize {
        self.get(fields::NOMINEES)
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

/// Structural deep equality between two optional field values.
///
/// A missing key compares equal to an explicit `Null`. Object comparison is
/// key-order-insensitive (`serde_json::Value` maps compare by content).
pub fn values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    a.unwrap_or(&Value::Null) == b.unwrap_or(&Value::Null)
}

/// Holds the draft, the baseline snapshot it is diffed against, the prefilled
/// payload the journey started with, and the set of changed fields.
///
/// The changed set is a reversible diff, not a sticky "touched" flag: a key
/// leaves the set when a later edit brings it back to equality with baseline.
#[derive(Debug, Clone)]
pub struct FormStore {
    draft: FormDraft,
    baseline: FormDraft,
    prefilled: FormDraft,
    changed: AHashSet<String>,
}

impl FormStore {
    /// A fresh store: seeded draft, baseline equal to it, nothing changed.
    pub fn new() -> Self {
        let draft = FormDraft::seeded();
        Self {
            baseline: draft.clone(),
            draft,
            prefilled: FormDraft::new(),
            changed: AHashSet::new(),
        }
    }

    /// Rebuilds a store from restored state. The changed set is taken as
    /// persisted; it is not recomputed, matching what was saved.
    pub fn restore(
        draft: FormDraft,
        baseline: FormDraft,
        prefilled: FormDraft,
        changed: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            draft,
            baseline,
            prefilled,
            changed: changed.into_iter().collect(),
        }
    }

    /// Journey start: merge the prefilled payload into the current draft and
    /// take a fresh baseline equal to the merged draft, so the changed set
    /// starts empty even when prefilled values differ from previous defaults.
    pub fn start(&mut self, prefilled: FormDraft) {
        self.draft.merge(prefilled.clone());
        self.baseline = self.draft.clone();
        self.changed.clear();
        self.prefilled = prefilled;
    }

    /// Applies a partial update. Atomic per call: the whole patch is written
    /// into the draft first, then changed-set membership is recomputed for
    /// exactly the patched keys.
    pub fn merge_draft(&mut self, patch: FormDraft) {
        let patched_keys: Vec<String> = patch.keys().cloned().collect();
        self.draft.merge(patch);
        for key in patched_keys {
            if values_equal(self.draft.get(&key), self.baseline.get(&key)) {
                self.changed.remove(&key);
            } else {
                self.changed.insert(key);
            }
        }
    }

    /// Replaces the baseline with the current draft and clears the diff.
    pub fn rebaseline(&mut self) {
        self.baseline = self.draft.clone();
        self.changed.clear();
    }

    /// Full teardown: everything empty, as after a journey reset.
    pub fn clear(&mut self) {
        self.draft = FormDraft::new();
        self.baseline = FormDraft::new();
        self.prefilled = FormDraft::new();
        self.changed.clear();
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn baseline(&self) -> &FormDraft {
        &self.baseline
    }

    pub fn prefilled(&self) -> &FormDraft {
        &self.prefilled
    }

    pub fn is_changed(&self, key: &str) -> bool {
        self.changed.contains(key)
    }

    /// The changed field names in deterministic (sorted) order.
    pub fn changed_fields(&self) -> Vec<String> {
        self.changed.iter().cloned().sorted().collect()
    }
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new()
    }
}
