//! Segment tree used for path matching.

use crate::method_router::MethodRouter;
use crate::params::Params;

/// Kind of a template segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SegmentKind {
    /// Literal text, e.g. `users`.
    Static(String),
    /// Named parameter, e.g. `{id}`.
    Param(String),
    /// Catch-all tail, e.g. `*path`.
    Wildcard(String),
}

/// Splits a template into segments. Empty segments are ignored, so
/// trailing slashes do not matter.
pub(crate) fn parse_template(template: &str) -> Vec<SegmentKind> {
    template
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            if let Some(name) = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                SegmentKind::Param(name.to_string())
            } else if let Some(name) = s.strip_prefix('*') {
                SegmentKind::Wildcard(name.to_string())
            } else {
                SegmentKind::Static(s.to_string())
            }
        })
        .collect()
}

/// A node of the segment tree.
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    segment: String,
    methods: Option<MethodRouter<T>>,
    /// Sorted by segment for binary search.
    static_children: Vec<Node<T>>,
    param_child: Option<(String, Box<Node<T>>)>,
    wildcard_child: Option<(String, MethodRouter<T>)>,
}

impl<T> Node<T> {
    fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            methods: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    pub(crate) fn root() -> Self {
        Self::new("")
    }

    /// Inserts `methods` at `segments`, merging into an existing route.
    ///
    /// Returns the number of method values dropped as duplicates.
    pub(crate) fn insert(&mut self, segments: &[SegmentKind], methods: MethodRouter<T>) -> usize {
        let Some((first, rest)) = segments.split_first() else {
            return match &mut self.methods {
                Some(existing) => existing.merge(methods),
                None => {
                    self.methods = Some(methods);
                    0
                }
            };
        };

        match first {
            SegmentKind::Static(segment) => {
                let index = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                {
                    Ok(index) => index,
                    Err(index) => {
                        self.static_children.insert(index, Node::new(segment.as_str()));
                        index
                    }
                };
                self.static_children[index].insert(rest, methods)
            }
            SegmentKind::Param(name) => {
                // one parameter child per level; the first name is kept
                let (_, child) = self
                    .param_child
                    .get_or_insert_with(|| (name.clone(), Box::new(Node::new(format!("{{{name}}}")))));
                child.insert(rest, methods)
            }
            SegmentKind::Wildcard(name) => match &mut self.wildcard_child {
                Some((_, existing)) => existing.merge(methods),
                None => {
                    self.wildcard_child = Some((name.clone(), methods));
                    0
                }
            },
        }
    }

    /// Finds the route for `segments`, capturing parameters into `params`.
    ///
    /// Literal children are tried before the parameter child, and the
    /// wildcard last. A failed branch leaves `params` as it found it.
    pub(crate) fn find<'a>(&'a self, segments: &[&str], params: &mut Params) -> Option<&'a MethodRouter<T>> {
        let Some((segment, rest)) = segments.split_first() else {
            return self.methods.as_ref();
        };

        if let Ok(index) = self
            .static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
        {
            if let Some(found) = self.static_children[index].find(rest, params) {
                return Some(found);
            }
        }

        if let Some((name, child)) = &self.param_child {
            let mark = params.len();
            params.push(name.as_str(), *segment);
            if let Some(found) = child.find(rest, params) {
                return Some(found);
            }
            params.truncate(mark);
        }

        if let Some((name, methods)) = &self.wildcard_child {
            params.push(name.as_str(), segments.join("/"));
            return Some(methods);
        }

        None
    }
}
