//! The registry of renderable UI capabilities the intent router may select.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One renderable UI capability.
///
/// Created and edited by an external admin process; the core only reads
/// active descriptors in priority order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentDescriptor {
    /// Stable component name (the value the model must echo back).
    pub name: String,
    /// Human-readable display name.
    pub display_name: String,
    /// What the component shows.
    pub description: String,
    /// Intent trigger tags (e.g. "work", "career", "timeline").
    pub intent: Vec<String>,
    /// Path to the renderable component, relayed opaquely to the UI layer.
    pub component_path: String,
    /// Selection priority; higher wins ties in the manifest ordering.
    pub priority: i32,
    /// Whether the component may currently be selected.
    pub is_active: bool,
}

/// Read access to the component registry.
#[async_trait]
pub trait ComponentRegistry: Send + Sync {
    /// All active descriptors, ordered by descending priority.
    async fn active_components(&self) -> Result<Vec<ComponentDescriptor>>;
}
