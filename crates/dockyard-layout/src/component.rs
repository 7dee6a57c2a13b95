// ABOUTME: Components registered with the layout and the element trees they render
// ABOUTME: A component turns a leaf's props into an Element; wrappers name what they wrap

use std::fmt;
use std::sync::Arc;

use dockyard_types::PanelProps;

/// Output of a render: a named node with children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Names along the first-child path, outermost first.
    pub fn path(&self) -> Vec<&str> {
        let mut out = vec![self.name.as_str()];
        let mut current = self;
        while let Some(child) = current.children.first() {
            out.push(child.name.as_str());
            current = child;
        }
        out
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.children.is_empty() {
            f.write_str("(")?;
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{child}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// A renderable panel component.
pub trait Component: Send + Sync {
    /// Display name of the component.
    fn name(&self) -> &str;

    /// Name of the component this one decorates, if it is a wrapper.
    fn wrapped_name(&self) -> Option<&str> {
        None
    }

    fn render(&self, props: &PanelProps) -> Element;
}

pub type ComponentRef = Arc<dyn Component>;

/// A component built from a name and a render function.
pub struct FnComponent<F> {
    name: String,
    render: F,
}

impl<F> FnComponent<F>
where
    F: Fn(&PanelProps) -> Element + Send + Sync,
{
    pub fn new(name: impl Into<String>, render: F) -> Self {
        Self {
            name: name.into(),
            render,
        }
    }
}

impl<F> Component for FnComponent<F>
where
    F: Fn(&PanelProps) -> Element + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, props: &PanelProps) -> Element {
        (self.render)(props)
    }
}

/// Component that renders a single element named after itself.
pub fn named_component(name: impl Into<String>) -> ComponentRef {
    let name = name.into();
    let element = name.clone();
    Arc::new(FnComponent::new(name, move |_props: &PanelProps| {
        Element::new(element.clone())
    }))
}
