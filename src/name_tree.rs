//! Flattening of PDF name trees (PDF 32000-1 §7.9.6).
//!
//! A name tree node is either a leaf carrying a `/Names` array of
//! `[key value key value ...]` pairs, or an intermediate node carrying a
//! `/Kids` array of child nodes. `/Limits` ranges are ignored: producers get
//! them wrong often enough that pruning on them loses entries.

use crate::capabilities::ObjectResolver;
use crate::resolver::{resolve, resolve_key, PdfText};
use lopdf::{Dictionary, Object};
use std::collections::{HashMap, HashSet};

/// A flat name → value mapping produced by [`flatten_name_tree`].
///
/// Values are the raw (usually indirect) objects found in the leaves.
/// A name seen twice keeps the value of its last occurrence, at the
/// position of its first occurrence.
#[derive(Debug, Clone, Default)]
pub struct FlattenedNames<'a> {
    entries: Vec<(String, &'a Object)>,
    index: HashMap<String, usize>,
}

impl<'a> FlattenedNames<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `name`, replacing any earlier value.
    pub fn insert(&mut self, name: String, value: &'a Object) {
        match self.index.get(&name) {
            Some(&slot) => self.entries[slot].1 = value,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&'a Object> {
        self.index.get(name).map(|&slot| self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &'a Object)> + '_ {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl<'a> IntoIterator for FlattenedNames<'a> {
    type Item = (String, &'a Object);
    type IntoIter = std::vec::IntoIter<(String, &'a Object)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Flatten the name tree rooted at `root` into a [`FlattenedNames`].
///
/// The walk is iterative and keeps a set of visited nodes, so cyclic or
/// self-referential `/Kids` terminate; a repeated node is skipped after its
/// first visit. At most `max_nodes` distinct nodes are visited. Kids that do
/// not resolve to a dictionary are skipped without affecting their siblings.
pub fn flatten_name_tree<'a, R>(
    source: &'a R,
    root: &'a Dictionary,
    max_nodes: usize,
) -> FlattenedNames<'a>
where
    R: ObjectResolver + ?Sized,
{
    let mut result = FlattenedNames::new();
    let mut visited: HashSet<*const Dictionary> = HashSet::new();
    let mut pending: Vec<&'a Dictionary> = vec![root];

    while let Some(node) = pending.pop() {
        if !visited.insert(node as *const Dictionary) {
            tracing::debug!("Skipping name tree node already visited");
            continue;
        }
        if visited.len() > max_nodes {
            tracing::warn!(
                max_nodes = max_nodes,
                collected = result.len(),
                "Name tree traversal halted at node limit"
            );
            break;
        }

        if let Some(pairs) = resolve_key::<&[Object], _>(source, node, b"Names") {
            collect_leaf_pairs(source, pairs, &mut result);
        }

        if let Some(kids) = resolve_key::<&[Object], _>(source, node, b"Kids") {
            // Reversed so the stack pops kids left to right.
            for kid in kids.iter().rev() {
                match resolve::<&Dictionary, _>(source, kid) {
                    Some(child) => pending.push(child),
                    None => tracing::debug!(kid = ?kid, "Skipping unresolvable name tree kid"),
                }
            }
        }
    }

    result
}

fn collect_leaf_pairs<'a, R>(source: &'a R, pairs: &'a [Object], result: &mut FlattenedNames<'a>)
where
    R: ObjectResolver + ?Sized,
{
    if pairs.len() % 2 != 0 {
        tracing::debug!(len = pairs.len(), "Name tree leaf has an unpaired trailing key");
    }

    for pair in pairs.chunks_exact(2) {
        match resolve::<PdfText, _>(source, &pair[0]) {
            Some(key) => result.insert(key.to_text_string(), &pair[1]),
            None => tracing::debug!(key = ?pair[0], "Skipping name tree key that is not a string"),
        }
    }
}
