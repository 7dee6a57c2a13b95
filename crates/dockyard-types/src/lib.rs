// ABOUTME: Pure data types with no cross-crate dependencies
// ABOUTME: Foundation layer for all other dockyard crates

pub mod closed;
pub mod config;
pub mod ids;
pub mod panel;
pub mod pattern;
pub mod props;
pub mod widget;

// Re-export commonly used types
pub use closed::ClosedPanel;
pub use config::{ComponentConfig, ContainerConfig, ItemConfig, LayoutConfig, StackConfig};
pub use ids::{PanelId, generate_id};
pub use panel::{Panel, PanelHandle, is_same_panel};
pub use pattern::ConfigPattern;
pub use props::{PanelMetadata, PanelProps, RuntimeProps};
pub use widget::{DragEvent, PanelOpenDetail, WidgetDescriptor, WidgetFetch};
