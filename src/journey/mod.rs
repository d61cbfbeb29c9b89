//! Journey taxonomy and the graph builder that turns a journey type into its
//! ordered step list.

use crate::catalog::{Step, StepCatalog, StepId, steps};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The closed set of onboarding journeys.
///
/// Each variant maps to a fixed, hand-specified ordered step list embedding
/// the business rules for that path (see [`build_steps`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JourneyType {
    /// New to bank, optimized full flow.
    #[serde(rename = "ntb")]
    Ntb,
    /// New to bank after an automatic account conversion (no OTP, no e-KYC,
    /// no video KYC).
    #[serde(rename = "ntb-conversion")]
    NtbConversion,
    /// Existing customer whose KYC must be (re)done.
    #[serde(rename = "etb-nk")]
    EtbWithKyc,
    /// Existing customer using Aadhaar e-KYC. Legacy variant, kept for
    /// persisted sessions that still reference it.
    #[serde(rename = "etb-ak")]
    EtbAadhaarKyc,
    /// Existing customer, KYC already complete: express savings-to-salary
    /// conversion.
    #[serde(rename = "etb")]
    EtbExpress,
}

impl JourneyType {
    pub const ALL: &'static [JourneyType] = &[
        JourneyType::Ntb,
        JourneyType::NtbConversion,
        JourneyType::EtbWithKyc,
        JourneyType::EtbAadhaarKyc,
        JourneyType::EtbExpress,
    ];

    /// The journey a freshly reset session starts from.
    pub const DEFAULT: JourneyType = JourneyType::Ntb;

    pub fn as_str(&self) -> &'static str {
        match self {
            JourneyType::Ntb => "ntb",
            JourneyType::NtbConversion => "ntb-conversion",
            JourneyType::EtbWithKyc => "etb-nk",
            JourneyType::EtbAadhaarKyc => "etb-ak",
            JourneyType::EtbExpress => "etb",
        }
    }

    /// Parse the wire form. Accepts exactly the serde rename strings.
    pub fn parse(value: &str) -> Option<JourneyType> {
        JourneyType::ALL
            .iter()
            .copied()
            .find(|journey| journey.as_str() == value)
    }

    /// The ordered base step ids of this journey's main sequence.
    ///
    /// Distinct lists embed the flow business rules: the express flow skips
    /// profile capture and review entirely, the post-conversion flow drops
    /// e-KYC and video KYC, and so on.
    pub fn flow_step_ids(&self) -> &'static [&'static str] {
        match self {
            JourneyType::Ntb => &[
                steps::WELCOME,
                steps::KYC_CHOICE,
                steps::EKYC_HANDLER,
                steps::PROFILE_DETAILS,
                steps::REVIEW_APPLICATION,
                steps::VIDEO_KYC,
                steps::COMPLETE,
            ],
            JourneyType::NtbConversion => &[
                steps::WELCOME,
                steps::KYC_CHOICE,
                steps::PROFILE_DETAILS,
                steps::REVIEW_APPLICATION,
                steps::COMPLETE,
            ],
            JourneyType::EtbWithKyc => &[
                steps::WELCOME,
                steps::KYC_CHOICE,
                steps::CONVERSION_VERIFICATION,
                steps::ETB_KYC_PROFILE,
                steps::COMPLETE,
            ],
            JourneyType::EtbAadhaarKyc => &[
                steps::WELCOME,
                steps::KYC_CHOICE,
                steps::EKYC_HANDLER,
                steps::ETB_KYC_PROFILE,
                steps::COMPLETE,
            ],
            JourneyType::EtbExpress => &[
                steps::WELCOME,
                steps::AUTO_CONVERSION,
                steps::ETB_KYC_PROFILE,
                steps::CONVERSION_VERIFICATION,
                steps::COMPLETE,
            ],
        }
    }

    /// Every base step id the catalog must register for this journey: the
    /// main sequence plus branch-only detour screens reachable from it.
    pub fn catalog_step_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = self.flow_step_ids().to_vec();
        if ids.contains(&steps::KYC_CHOICE) {
            // The physical-KYC screen is reachable as a detour from the KYC
            // choice even though it is never part of the linear sequence.
            ids.push(steps::PHYSICAL_KYC);
        }
        ids
    }

    /// Whether this journey contains a KYC method choice at all.
    pub fn has_kyc_choice(&self) -> bool {
        self.flow_step_ids().contains(&steps::KYC_CHOICE)
    }
}

impl std::fmt::Display for JourneyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for JourneyType {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The kind of customer entering the funnel. Selects the natural journey for
/// a fresh start; the journey itself may still be switched mid-flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
    #[serde(rename = "ntb")]
    Ntb,
    #[serde(rename = "etb-nk")]
    EtbWithKyc,
    #[serde(rename = "etb")]
    EtbExpress,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Ntb => "ntb",
            UserType::EtbWithKyc => "etb-nk",
            UserType::EtbExpress => "etb",
        }
    }

    pub fn parse(value: &str) -> Option<UserType> {
        match value {
            "ntb" => Some(UserType::Ntb),
            "etb-nk" => Some(UserType::EtbWithKyc),
            "etb" => Some(UserType::EtbExpress),
            _ => None,
        }
    }

    /// The journey a user of this type starts on.
    pub fn natural_journey(&self) -> JourneyType {
        match self {
            UserType::Ntb => JourneyType::Ntb,
            UserType::EtbWithKyc => JourneyType::EtbWithKyc,
            UserType::EtbExpress => JourneyType::EtbExpress,
        }
    }
}

impl Default for UserType {
    fn default() -> Self {
        Self::Ntb
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Builds the ordered step list for a journey.
///
/// Deterministic and side-effect-free: the same input always yields an equal
/// list, so it can be called both at cold start and when switching flows
/// mid-journey. Ids that fail catalog resolution are filtered with a
/// diagnostic, so a sparse catalog yields a shorter (possibly empty) list.
pub fn build_steps(journey: JourneyType, catalog: &StepCatalog) -> Vec<Step> {
    journey
        .flow_step_ids()
        .iter()
        .filter_map(|base| {
            let id = StepId::namespaced(journey, base);
            let step = catalog.step(&id);
            if step.is_none() {
                warn!(step_id = %id, journey = %journey, "step missing from catalog, skipping");
            }
            step
        })
        .collect()
}
