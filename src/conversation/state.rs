//! Booking-flow conversation state.

use serde::{Deserialize, Serialize};

/// Where a session is in the counsellor/doctor booking flow.
///
/// Progresses: Idle → SelectingCollegeForCounsellor → SelectingCounsellor → Idle,
/// or Idle → SelectingDoctor → Idle. The selected college only exists while
/// choosing a counsellor, so it lives inside that variant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Idle,
    SelectingCollegeForCounsellor,
    SelectingCounsellor {
        #[serde(rename = "selectedCollegeId")]
        college_id: String,
    },
    SelectingDoctor,
}

impl ConversationState {
    /// The college picked for this flow, if any.
    pub fn selected_college_id(&self) -> Option<&str> {
        match self {
            Self::SelectingCounsellor { college_id } => Some(college_id),
            _ => None,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SelectingCollegeForCounsellor => "selecting_college_for_counsellor",
            Self::SelectingCounsellor { .. } => "selecting_counsellor",
            Self::SelectingDoctor => "selecting_doctor",
        }
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
