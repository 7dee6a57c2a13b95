// ABOUTME: Capability trait implemented by mounted panel instances
// ABOUTME: Identity is by instance, so stale unmounts can be told apart from live panels

use std::fmt;
use std::sync::Arc;

use crate::ids::PanelId;

/// A mounted panel instance.
pub trait Panel: Send + Sync + fmt::Debug {
    fn panel_id(&self) -> &PanelId;

    /// Registered component name of the leaf this instance renders.
    fn component_type(&self) -> &str;

    /// Name of the component a wrapper decorates, when this instance is a wrapper.
    fn wrapped_component_type(&self) -> Option<&str> {
        None
    }

    /// True if either the component or the component it wraps has type `ty`.
    fn is_of_type(&self, ty: &str) -> bool {
        self.component_type() == ty || self.wrapped_component_type() == Some(ty)
    }
}

pub type PanelHandle = Arc<dyn Panel>;

/// Whether two handles refer to the same mounted instance.
pub fn is_same_panel(a: &PanelHandle, b: &PanelHandle) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
