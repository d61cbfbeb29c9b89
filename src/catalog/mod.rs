use crate::journey::JourneyType;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base (un-namespaced) step identifiers shared across journeys.
pub mod steps {
    pub const WELCOME: &str = "welcome";
    pub const KYC_CHOICE: &str = "kycChoice";
    pub const EKYC_HANDLER: &str = "ekycHandler";
    pub const PHYSICAL_KYC: &str = "physicalKyc";
    pub const PROFILE_DETAILS: &str = "profileDetails";
    pub const AUTO_CONVERSION: &str = "autoConversion";
    pub const CONVERSION_VERIFICATION: &str = "conversionVerification";
    pub const ETB_KYC_PROFILE: &str = "etbKycProfile";
    pub const REVIEW_APPLICATION: &str = "reviewApplication";
    pub const VIDEO_KYC: &str = "videoKyc";
    pub const COMPLETE: &str = "complete";
    pub const JOURNEY_SELECTION: &str = "journeySelection";
}

/// Identifier of a single journey step.
///
/// Ids are namespaced per journey (`"<journey>:<base>"`) so the same logical
/// step can carry journey-specific screen bindings while sharing a title.
/// Standalone screens (not part of any flow) use a plain base id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds the namespaced id for a base step within a journey.
    pub fn namespaced(journey: JourneyType, base: &str) -> Self {
        Self(format!("{}:{}", journey.as_str(), base))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The un-namespaced base id, e.g. `"kycChoice"` for `"ntb:kycChoice"`.
    pub fn base(&self) -> &str {
        self.0.rsplit(':').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StepId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One screen-sized unit of a journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub title: String,
}

/// Key of a renderable screen. The (out-of-scope) presentation layer maps
/// this to a concrete view; the engine only ever hands the key around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRef(pub &'static str);

impl fmt::Display for ScreenRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a screen's primary call-to-action does when activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Advance,
    Retreat,
    /// Jump to another step, given by its base id (resolved against the
    /// current journey at activation time).
    Jump(&'static str),
    /// The journey ends on this screen.
    Complete,
}

/// Declarative footer contract: each screen declares its primary action and
/// the shell renders it. Screens never push footer content into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimaryAction {
    pub label: &'static str,
    pub kind: ActionKind,
}

/// A step's full registration: display metadata, screen binding, footer action.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub step: Step,
    pub screen: ScreenRef,
    pub primary_action: PrimaryAction,
}

/// Static registry mapping a step id to display metadata and a renderable
/// screen. Pure lookup, no side effects; unknown ids resolve to `None` rather
/// than failing, since persisted data may reference ids from a prior schema.
#[derive(Debug, Clone)]
pub struct StepCatalog {
    entries: AHashMap<StepId, CatalogEntry>,
}

impl StepCatalog {
    /// The standard catalog: every journey's flow steps, the branch-only
    /// screens reachable from a KYC choice, and the standalone journey
    /// selection screen.
    ///
    /// Retired steps (`kycDetails`, `nomineeDetails`) are deliberately not
    /// registered; persisted references to them are filtered at load.
    pub fn standard() -> Self {
        let mut catalog = Self::empty();
        for &journey in JourneyType::ALL {
            for base in journey.catalog_step_ids() {
                catalog.register(StepId::namespaced(journey, base), base);
            }
        }
        catalog.register(StepId::new(steps::JOURNEY_SELECTION), steps::JOURNEY_SELECTION);
        catalog
    }

    /// An empty catalog. Useful for hosts that register their own screens and
    /// for exercising the engine's tolerance of unresolvable ids.
    pub fn empty() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }

    pub fn register(&mut self, id: StepId, base: &'static str) {
        let entry = CatalogEntry {
            step: Step {
                id: id.clone(),
                title: base_title(base).to_string(),
            },
            screen: screen_for(base),
            primary_action: action_for(base),
        };
        self.entries.insert(id, entry);
    }

    pub fn get(&self, id: &StepId) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    /// Resolve a step id to its screen. Tolerates unknown ids.
    pub fn resolve_screen(&self, id: &StepId) -> Option<ScreenRef> {
        self.entries.get(id).map(|entry| entry.screen)
    }

    pub fn contains(&self, id: &StepId) -> bool {
        self.entries.contains_key(id)
    }

    /// Clone out the `Step` registered under `id`, if any.
    pub fn step(&self, id: &StepId) -> Option<Step> {
        self.entries.get(id).map(|entry| entry.step.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for StepCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn base_title(base: &str) -> &'static str {
    match base {
        steps::WELCOME => "Verification",
        steps::KYC_CHOICE => "Select KYC",
        steps::EKYC_HANDLER => "e-KYC Verification",
        steps::PHYSICAL_KYC => "Physical KYC",
        steps::PROFILE_DETAILS => "Profile Details",
        steps::AUTO_CONVERSION => "Account Conversion",
        steps::CONVERSION_VERIFICATION => "Verification",
        steps::ETB_KYC_PROFILE => "Profile & Declarations",
        steps::REVIEW_APPLICATION => "Final Verification",
        steps::VIDEO_KYC => "Video KYC",
        steps::COMPLETE => "Submitted",
        steps::JOURNEY_SELECTION => "Select Journey",
        _ => "Step",
    }
}

fn screen_for(base: &str) -> ScreenRef {
    ScreenRef(match base {
        steps::WELCOME => "welcome",
        steps::KYC_CHOICE => "kyc_choice",
        steps::EKYC_HANDLER => "ekyc_handler",
        steps::PHYSICAL_KYC => "physical_kyc",
        steps::PROFILE_DETAILS => "profile_details",
        steps::AUTO_CONVERSION => "auto_conversion",
        steps::CONVERSION_VERIFICATION => "conversion_verification",
        steps::ETB_KYC_PROFILE => "etb_kyc_profile",
        steps::REVIEW_APPLICATION => "review_application",
        steps::VIDEO_KYC => "video_kyc",
        steps::COMPLETE => "complete",
        steps::JOURNEY_SELECTION => "journey_selection",
        _ => "missing",
    })
}

fn action_for(base: &str) -> PrimaryAction {
    match base {
        steps::WELCOME => PrimaryAction {
            label: "Verify & Continue",
            kind: ActionKind::Advance,
        },
        steps::KYC_CHOICE => PrimaryAction {
            label: "Continue",
            kind: ActionKind::Advance,
        },
        steps::EKYC_HANDLER => PrimaryAction {
            label: "Continue",
            kind: ActionKind::Advance,
        },
        steps::PHYSICAL_KYC => PrimaryAction {
            label: "Visit a Branch",
            kind: ActionKind::Complete,
        },
        steps::PROFILE_DETAILS | steps::ETB_KYC_PROFILE => PrimaryAction {
            label: "Save & Continue",
            kind: ActionKind::Advance,
        },
        steps::AUTO_CONVERSION => PrimaryAction {
            label: "Convert My Account",
            kind: ActionKind::Advance,
        },
        steps::CONVERSION_VERIFICATION => PrimaryAction {
            label: "Continue",
            kind: ActionKind::Advance,
        },
        steps::REVIEW_APPLICATION => PrimaryAction {
            label: "Submit Application",
            kind: ActionKind::Advance,
        },
        steps::VIDEO_KYC => PrimaryAction {
            label: "Start Video KYC",
            kind: ActionKind::Advance,
        },
        steps::COMPLETE => PrimaryAction {
            label: "Done",
            kind: ActionKind::Complete,
        },
        _ => PrimaryAction {
            label: "Continue",
            kind: ActionKind::Advance,
        },
    }
}
