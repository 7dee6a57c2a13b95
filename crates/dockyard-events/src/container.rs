// ABOUTME: Events raised on a single panel container by the layout
// ABOUTME: Visibility, sizing and tab interaction notifications

/// Container-level events a panel can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerEvent {
    Resize,
    Show,
    Shown,
    Hide,
    /// The container's tab was created.
    Tab,
    TabClicked,
}

impl ContainerEvent {
    pub fn name(self) -> &'static str {
        match self {
            ContainerEvent::Resize => "resize",
            ContainerEvent::Show => "show",
            ContainerEvent::Shown => "shown",
            ContainerEvent::Hide => "hide",
            ContainerEvent::Tab => "tab",
            ContainerEvent::TabClicked => "tabClicked",
        }
    }
}
