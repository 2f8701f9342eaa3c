//! Segment trie used for route matching.
//!
//! Routes are split on `/` and every segment becomes one trie level. A node
//! branches three ways:
//!
//! ```text
//!  Syntax    Kind       Matches
//!  users     static     exactly `users` (case-sensitive)
//!  :name     named      one non-empty segment, captured as `name`
//!  *name     wildcard   the rest of the path, captured as `/rest`
//! ```
//!
//! Matching is greedy per node: a static child is tried first, then the
//! named child, then the wildcard child. Once a branch is taken it is never
//! undone, so for `/users/me/settings` and `/users/:id` the path `/users/me`
//! does not match (the static `me` branch is taken and dead-ends).

use crate::error::RouteError;
use crate::params::Params;

#[derive(Clone, Debug, Eq, PartialEq)]
enum Kind {
    Root,
    Static(String),
    Param(String),
    Wildcard(String),
}

// A parsed segment of a route being inserted.
#[derive(Clone, Copy)]
enum Segment<'p> {
    Static(&'p str),
    Param(&'p str),
    Wildcard(&'p str),
}

/// A node of a routing trie. The root node is the trie itself.
///
/// ```rust
/// use trellis::Node;
///
/// let mut tree = Node::new();
/// tree.insert("/users/:id", "user").unwrap();
/// tree.insert("/users/me", "me").unwrap();
///
/// let matched = tree.at("/users/42").unwrap();
/// assert_eq!(*matched.value, "user");
/// assert_eq!(matched.params.get("id"), Some("42"));
///
/// // literal segments win over parameters
/// assert_eq!(*tree.at("/users/me").unwrap().value, "me");
/// ```
#[derive(Clone, Debug)]
pub struct Node<T> {
    kind: Kind,
    // First byte of each static child's literal, parallel to `statics`.
    indices: Vec<u8>,
    statics: Vec<Node<T>>,
    param: Option<Box<Node<T>>>,
    wildcard: Option<Box<Node<T>>>,
    value: Option<T>,
}

/// A successful lookup.
#[derive(Debug)]
pub struct Match<'n, T> {
    /// The value stored for the matched route.
    pub value: &'n T,
    /// Path parameters captured along the way, left to right.
    pub params: Params,
}

impl<T> Node<T> {
    pub fn new() -> Self {
        Self::with_kind(Kind::Root)
    }

    fn with_kind(kind: Kind) -> Self {
        Self {
            kind,
            indices: Vec::new(),
            statics: Vec::new(),
            param: None,
            wildcard: None,
            value: None,
        }
    }

    /// Inserts a route.
    ///
    /// Fails if the route is malformed, if a parameter at the same position
    /// was registered under another name, or if the same segment structure
    /// already holds a value.
    pub fn insert(&mut self, route: &str, value: T) -> Result<(), RouteError> {
        let segments = parse(route)?;

        let mut node = self;
        for segment in segments {
            node = node.child_for(segment, route)?;
        }

        if node.value.is_some() {
            return Err(RouteError::Duplicate { path: route.to_owned() });
        }
        node.value = Some(value);
        Ok(())
    }

    // Descends into the child for `segment`, creating it when absent.
    fn child_for(&mut self, segment: Segment<'_>, route: &str) -> Result<&mut Node<T>, RouteError> {
        match segment {
            Segment::Static(literal) => {
                let pos = match self.static_position(literal) {
                    Some(pos) => pos,
                    None => {
                        self.indices.push(first_byte(literal));
                        self.statics.push(Node::with_kind(Kind::Static(literal.to_owned())));
                        self.statics.len() - 1
                    }
                };
                Ok(&mut self.statics[pos])
            }
            Segment::Param(name) => {
                let child: &mut Node<T> = self
                    .param
                    .get_or_insert_with(|| Box::new(Node::with_kind(Kind::Param(name.to_owned()))));
                child.check_name(name, route)?;
                Ok(child)
            }
            Segment::Wildcard(name) => {
                let child: &mut Node<T> = self
                    .wildcard
                    .get_or_insert_with(|| Box::new(Node::with_kind(Kind::Wildcard(name.to_owned()))));
                child.check_name(name, route)?;
                Ok(child)
            }
        }
    }

    fn check_name(&self, name: &str, route: &str) -> Result<(), RouteError> {
        match &self.kind {
            Kind::Param(existing) | Kind::Wildcard(existing) if existing != name => {
                Err(RouteError::ParamConflict {
                    path: route.to_owned(),
                    name: name.to_owned(),
                    existing: existing.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    fn static_position(&self, literal: &str) -> Option<usize> {
        let first = first_byte(literal);
        self.indices
            .iter()
            .zip(&self.statics)
            .position(|(&b, child)| b == first && matches!(&child.kind, Kind::Static(s) if s == literal))
    }

    /// Looks up the value for a concrete path.
    pub fn at(&self, path: &str) -> Option<Match<'_, T>> {
        let mut rest = path.strip_prefix('/')?;
        let mut params = Params::new();
        let mut node = self;

        loop {
            let (segment, tail) = match rest.split_once('/') {
                Some((segment, tail)) => (segment, Some(tail)),
                None => (rest, None),
            };

            if let Some(pos) = node.static_position(segment) {
                node = &node.statics[pos];
            } else if let Some(child) = node.param.as_deref().filter(|_| !segment.is_empty()) {
                params.set(child.name(), segment);
                node = child;
            } else if let Some(child) = node.wildcard.as_deref() {
                params.set(child.name(), format!("/{rest}"));
                return child.value.as_ref().map(|value| Match { value, params });
            } else {
                return None;
            }

            match tail {
                Some(tail) => rest = tail,
                None => break,
            }
        }

        node.value.as_ref().map(|value| Match { value, params })
    }

    fn name(&self) -> &str {
        match &self.kind {
            Kind::Param(name) | Kind::Wildcard(name) => name,
            Kind::Static(literal) => literal,
            Kind::Root => "",
        }
    }

    /// Returns `true` if no route has been inserted.
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
            && self.statics.is_empty()
            && self.param.is_none()
            && self.wildcard.is_none()
    }
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn first_byte(literal: &str) -> u8 {
    literal.as_bytes().first().copied().unwrap_or(0)
}

// Splits and validates a route before anything is inserted, so a rejected
// route leaves the trie untouched.
fn parse(route: &str) -> Result<Vec<Segment<'_>>, RouteError> {
    let Some(rest) = route.strip_prefix('/') else {
        return Err(RouteError::MissingLeadingSlash { path: route.to_owned() });
    };

    let raw: Vec<&str> = rest.split('/').collect();
    let last = raw.len() - 1;

    raw.iter()
        .enumerate()
        .map(|(i, &segment)| {
            let parsed = if let Some(name) = segment.strip_prefix(':') {
                Segment::Param(name)
            } else if let Some(name) = segment.strip_prefix('*') {
                if i != last {
                    return Err(RouteError::WildcardNotLast { path: route.to_owned() });
                }
                Segment::Wildcard(name)
            } else {
                return Ok(Segment::Static(segment));
            };

            match parsed {
                Segment::Param("") | Segment::Wildcard("") => {
                    Err(RouteError::UnnamedParam { path: route.to_owned() })
                }
                parsed => Ok(parsed),
            }
        })
        .collect()
}
