//! Replay scripts
//!
//! A replay script stands in for the presentation layer: it fixes the
//! viewport size and lists the events a user would have produced.
//!
//! ```json
//! {
//!   "viewport": { "width": 500, "height": 500 },
//!   "events": [
//!     { "type": "arm" },
//!     { "type": "pointer_down", "x": 100, "y": 50 },
//!     { "type": "pointer_move", "x": 300, "y": 250 },
//!     { "type": "pointer_up", "x": 300, "y": 250 }
//!   ]
//! }
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};
use cropshot_core::{
    CaptureSession,
    model::{CropBox, ViewportSize},
    selection::{CropChange, SelectionEvent},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    pub viewport: ViewportSize,
    #[serde(default)]
    pub events:   Vec<SelectionEvent>,
}

impl ReplayScript {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay script {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid replay script {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let script: Self = serde_json::from_str(text)?;
        if script.viewport.is_empty() {
            anyhow::bail!(
                "viewport must be non-empty, got {}x{}",
                script.viewport.width,
                script.viewport.height
            );
        }
        Ok(script)
    }

    /// Feeds the script to a session that already holds a capture and
    /// returns the crop in effect afterwards.
    pub fn replay(&self, session: &mut CaptureSession) -> Option<CropBox> {
        session.set_viewport(self.viewport);

        for (step, event) in self.events.iter().enumerate() {
            match session.handle_event(*event) {
                CropChange::Set(crop) => tracing::info!(step, %crop, "Replay committed crop"),
                CropChange::Cleared => tracing::info!(step, "Replay cleared crop"),
                CropChange::Unchanged => {
                    tracing::debug!(step, ?event, state = session.selection_state().name(), "Replay event")
                }
            }
        }

        session.crop_box()
    }
}
