//! Rendering surfaces that accept [`ViewUpdate`]s.

use crate::shared::error::DashboardError;
use crate::shared::presenter::{ViewNode, ViewTarget, ViewUpdate};
use std::collections::BTreeMap;
use tracing::warn;

/// Anything that can hold the dashboard's named output slots
pub trait RenderSurface {
    /// Apply one update, failing with [`DashboardError::TargetNotFound`] if the
    /// surface has no slot for its target.
    fn apply(&mut self, update: &ViewUpdate) -> Result<(), DashboardError>;
}

/// Apply a batch of updates, skipping (and logging) the ones whose target is
/// missing. Returns the number of updates applied.
pub fn apply_updates<S>(surface: &mut S, updates: &[ViewUpdate]) -> usize
where
    S: RenderSurface + ?Sized,
{
    let mut applied = 0;
    for update in updates {
        match surface.apply(update) {
            Ok(()) => applied += 1,
            Err(e) => warn!("skipping view update: {}", e),
        }
    }
    applied
}

/// Content of one slot
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SlotContent {
    #[default]
    Empty,
    Text(String),
    Children(Vec<ViewNode>),
}

/// In-memory surface: a registry of slots that a terminal front end draws from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewBoard {
    slots: BTreeMap<ViewTarget, SlotContent>,
}

impl ViewBoard {
    /// Board with a slot for every known target
    pub fn full() -> Self {
        Self::with_targets(ViewTarget::ALL)
    }

    /// Board with slots for the given targets only
    pub fn with_targets(targets: impl IntoIterator<Item = ViewTarget>) -> Self {
        Self {
            slots: targets
                .into_iter()
                .map(|t| (t, SlotContent::Empty))
                .collect(),
        }
    }

    pub fn has_slot(&self, target: ViewTarget) -> bool {
        self.slots.contains_key(&target)
    }

    pub fn slot(&self, target: ViewTarget) -> Option<&SlotContent> {
        self.slots.get(&target)
    }

    /// Text of a slot, empty if the slot is missing or holds children
    pub fn text(&self, target: ViewTarget) -> &str {
        match self.slots.get(&target) {
            Some(SlotContent::Text(text)) => text.as_str(),
            _ => "",
        }
    }

    /// Children of a slot, empty if the slot is missing or holds text
    pub fn children(&self, target: ViewTarget) -> &[ViewNode] {
        match self.slots.get(&target) {
            Some(SlotContent::Children(children)) => children.as_slice(),
            _ => &[],
        }
    }
}

impl RenderSurface for ViewBoard {
    fn apply(&mut self, update: &ViewUpdate) -> Result<(), DashboardError> {
        let slot = self
            .slots
            .get_mut(&update.target())
            .ok_or_else(|| DashboardError::TargetNotFound(update.target().id().to_string()))?;

        *slot = match update {
            ViewUpdate::SetText { text, .. } => SlotContent::Text(text.clone()),
            ViewUpdate::ReplaceChildren { children, .. } => SlotContent::Children(children.clone()),
        };
        Ok(())
    }
}
