//! Path-to-tree assembly.
//!
//! A flat list of store results becomes a nested mapping keyed by path
//! segment. Collisions between a leaf and a branch at the same slot resolve
//! deterministically: intermediate segments always win structurally over an
//! earlier leaf, and at an exact path the most recently processed parameter
//! wins.

use crate::param::{Parameter, QueryKey};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// A returned name did not structurally nest under the requested prefix.
///
/// This is a contract defect between the query and the store's response,
/// never a transient condition; assembly aborts with no partial tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedNameError {
    #[error("parameter {name:?} does not nest under the requested prefix {prefix:?}")]
    OutsidePrefix { name: String, prefix: String },
    #[error("parameter {name:?} yields an empty path segment under prefix {prefix:?}")]
    EmptySegment { name: String, prefix: String },
}

/// Either a terminal string value or a mapping of child nodes.
///
/// `BTreeMap` keeps output ordering stable across runs. Untagged
/// serialization renders a branch as an object and a leaf as a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParameterTree {
    Leaf(String),
    Branch(BTreeMap<String, ParameterTree>),
}

impl ParameterTree {
    fn empty_branch() -> Self {
        ParameterTree::Branch(BTreeMap::new())
    }
}

/// Assemble a flat parameter list into a nested tree rooted at `prefix`.
///
/// The root is always a branch, possibly empty. Parameters are applied in
/// input order, which makes the collision policy reproducible for a fixed
/// input.
pub fn assemble(
    parameters: &[Parameter],
    prefix: &QueryKey,
) -> Result<ParameterTree, MalformedNameError> {
    let mut root = BTreeMap::new();

    for parameter in parameters {
        let relative = relative_path(&parameter.name, prefix)?;
        let segments: Vec<&str> = relative.split('/').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(MalformedNameError::EmptySegment {
                name: parameter.name.clone(),
                prefix: prefix.as_str().to_string(),
            });
        }
        insert(&mut root, &segments, &parameter.value);
    }

    Ok(ParameterTree::Branch(root))
}

/// Strip the query prefix (and its trailing separator) from an absolute name.
fn relative_path<'a>(name: &'a str, prefix: &QueryKey) -> Result<&'a str, MalformedNameError> {
    let outside = || MalformedNameError::OutsidePrefix {
        name: name.to_string(),
        prefix: prefix.as_str().to_string(),
    };

    if prefix.is_root() {
        return name.strip_prefix('/').ok_or_else(outside);
    }

    // The remainder must itself begin with a slash: `/app` must not claim
    // `/apple/x`, and a name equal to the prefix has no relative path.
    let rest = name.strip_prefix(prefix.as_str()).ok_or_else(outside)?;
    rest.strip_prefix('/').ok_or_else(outside)
}

fn insert(root: &mut BTreeMap<String, ParameterTree>, segments: &[&str], value: &str) {
    let Some((last, intermediate)) = segments.split_last() else {
        return;
    };

    let mut cursor = root;
    for segment in intermediate {
        let slot = cursor
            .entry((*segment).to_string())
            .or_insert_with(ParameterTree::empty_branch);
        // A path cannot be both a final value and a namespace for children;
        // an earlier leaf here is discarded in favour of a branch.
        if matches!(slot, ParameterTree::Leaf(_)) {
            *slot = ParameterTree::empty_branch();
        }
        match slot {
            ParameterTree::Branch(children) => cursor = children,
            ParameterTree::Leaf(_) => unreachable!("slot was just made a branch"),
        }
    }

    // Last processed parameter wins at an exact path.
    cursor.insert((*last).to_string(), ParameterTree::Leaf(value.to_string()));
}
