use crate::path::{Path, Segment};

/// Read-only view of a document node, the seam between the rendering
/// engine and a concrete document representation.
///
/// The engine never assumes a particular backing store. Anything that
/// can answer these queries can drive a template: the built-in
/// implementations cover [`JsonValue`](crate::JsonValue) and
/// [`YamlValue`](crate::YamlValue).
pub trait Node {
    /// Member of an object-like node, by key.
    fn child(&self, key: &str) -> Option<&dyn Node>;

    /// Element of an array-like node, by position.
    fn at(&self, index: usize) -> Option<&dyn Node>;

    /// Number of elements when the node is array-like, `None` otherwise.
    fn count(&self) -> Option<usize>;

    /// Key/value pairs when the node is object-like, in document order.
    /// Backends that cannot enumerate members may leave the default.
    fn entries(&self) -> Option<Vec<(&str, &dyn Node)>> {
        None
    }

    /// Whether the node enables a plain section.
    fn is_truthy(&self) -> bool;

    /// Textual form for variable substitution, `None` for containers.
    fn text(&self) -> Option<String>;

    /// Numeric value when the node is a number, used by comparisons.
    fn number(&self) -> Option<f64> {
        None
    }
}

struct Frame<'d> {
    node: &'d dyn Node,
    key: Option<&'d str>,
}

/// Scope stack holding borrowed document nodes, innermost last.
pub(crate) struct Stack<'d> {
    frames: Vec<Frame<'d>>,
}

pub(crate) enum Resolved<'d> {
    Node(&'d dyn Node),
    Key(&'d str),
    NotFound,
}

impl<'d> Stack<'d> {
    pub(crate) fn new(root: &'d dyn Node) -> Self {
        Stack {
            frames: vec![Frame { node: root, key: None }],
        }
    }

    pub(crate) fn push(&mut self, node: &'d dyn Node) {
        self.frames.push(Frame { node, key: None });
    }

    /// Pushes an object member together with its key, so that `*` can
    /// recover the key during object iteration.
    pub(crate) fn push_entry(&mut self, key: &'d str, node: &'d dyn Node) {
        self.frames.push(Frame {
            node,
            key: Some(key),
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.frames.truncate(len);
    }

    fn top(&self) -> &'d dyn Node {
        // the root frame is never popped
        self.frames[self.frames.len() - 1].node
    }

    /// Looks a path up against the stack. Dotted paths try every scope
    /// from innermost to outermost, `.` and pointer paths only consult
    /// the innermost scope, and `*` recovers the nearest enclosing
    /// iteration key.
    pub(crate) fn resolve(&self, path: &Path) -> Resolved<'d> {
        match path {
            Path::This => Resolved::Node(self.top()),
            Path::IterKey => self
                .frames
                .iter()
                .rev()
                .find_map(|frame| frame.key)
                .map_or(Resolved::NotFound, Resolved::Key),
            Path::Pointer(tokens) => {
                resolve_pointer(self.top(), tokens).map_or(Resolved::NotFound, Resolved::Node)
            }
            Path::Keys(segments) => self
                .frames
                .iter()
                .rev()
                .find_map(|frame| resolve_segments(frame.node, segments))
                .map_or(Resolved::NotFound, Resolved::Node),
        }
    }
}

fn resolve_segments<'d>(node: &'d dyn Node, segments: &[Segment]) -> Option<&'d dyn Node> {
    let mut current = node;
    for segment in segments {
        current = match segment {
            Segment::Name(name) => current.child(name)?,
            Segment::Index(index) => current
                .at(*index)
                .or_else(|| current.child(&index.to_string()))?,
        };
    }
    Some(current)
}

fn resolve_pointer<'d>(node: &'d dyn Node, tokens: &[String]) -> Option<&'d dyn Node> {
    let mut current = node;
    for token in tokens {
        current = current.child(token).or_else(|| {
            token
                .parse::<usize>()
                .ok()
                .and_then(|index| current.at(index))
        })?;
    }
    Some(current)
}
