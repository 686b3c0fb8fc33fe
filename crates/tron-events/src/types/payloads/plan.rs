//! Plan mode event payloads.

use serde::{Deserialize, Serialize};

/// Payload for `plan.mode_entered` events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanModeEnteredPayload {
    /// Skill that triggered plan mode, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_name: Option<String>,
    /// Tool names blocked while plan mode is active.
    #[serde(default)]
    pub blocked_tools: Vec<String>,
}

/// Payload for `plan.mode_exited` events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanModeExitedPayload {
    /// Why plan mode ended: "approved", "rejected", "cancelled".
    pub reason: String,
    /// Path to the written plan file, if one was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_path: Option<String>,
}
