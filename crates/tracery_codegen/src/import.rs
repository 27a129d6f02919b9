//! Import requirement table.
//!
//! Import requirements are keyed by (path, kind) and accumulate in
//! first-encounter order, with all buckets of one path kept contiguous.
//! That keeps generated import lines grouped by path, then by kind, and
//! stable across repeated compilations of the same document.

use tracery_schema::ImportKind;

/// All names required from one (path, kind) bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportGroup {
    pub path: String,
    pub kind: ImportKind,
    pub names: Vec<String>,
}

/// Accumulated import requirements, deduplicated by name within each
/// (path, kind) bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    groups: Vec<ImportGroup>,
}

impl ImportTable {
    /// Record one required name. Repeated names in the same bucket are
    /// dropped.
    pub fn add(&mut self, path: &str, kind: ImportKind, name: &str) {
        if let Some(group) = self
            .groups
            .iter_mut()
            .find(|g| g.path == path && g.kind == kind)
        {
            if !group.names.iter().any(|n| n == name) {
                group.names.push(name.to_string());
            }
        } else {
            let group = ImportGroup {
                path: path.to_string(),
                kind,
                names: vec![name.to_string()],
            };
            // All buckets of one path stay contiguous, so emitted import
            // lines group by path first, then by kind.
            match self.groups.iter().rposition(|g| g.path == path) {
                Some(index) => self.groups.insert(index + 1, group),
                None => self.groups.push(group),
            }
        }
    }

    /// Merge another table in, by value, preserving this table's order for
    /// buckets both tables hold.
    pub fn merge(&mut self, other: ImportTable) {
        for group in other.groups {
            for name in &group.names {
                self.add(&group.path, group.kind, name);
            }
        }
    }

    /// Buckets in table order.
    pub fn groups(&self) -> &[ImportGroup] {
        &self.groups
    }
}
