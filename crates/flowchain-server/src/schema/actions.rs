//! Action dispatch types.

use serde::{Deserialize, Serialize};

use crate::session::{DispatchOutcome, Frame};

/// `POST /workflow/actions` response: the outcome and the frame to draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub outcome: DispatchOutcome,
    pub frame: Frame,
}
