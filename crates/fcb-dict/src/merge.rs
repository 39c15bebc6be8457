//! Merging a patch dictionary into an existing one.

use crate::dictionary::Dictionary;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeKind {
    Added,
    Overwritten { old: String, new: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    /// Slash-separated key path of the affected entry.
    pub path: String,
    pub kind: ChangeKind,
}

/// Outcome of [`Dictionary::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    pub changes: Vec<Change>,
}

impl MergeReport {
    pub fn changed(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn overwritten(&self) -> impl Iterator<Item = &Change> {
        self.changes
            .iter()
            .filter(|c| matches!(c.kind, ChangeKind::Overwritten { .. }))
    }
}

impl Dictionary {
    /// Merge `patch` into `self`.
    ///
    /// Leaves compare by their rendered text, so `1` and `1.0` are equal.
    /// A key absent from `self` always counts as a change. When nothing
    /// changed, `self` is left untouched.
    ///
    /// With `replace == false` nested dictionaries merge key by key; with
    /// `replace == true` each top-level entry of `patch` replaces the whole
    /// existing subtree.
    pub fn update(&mut self, patch: &Dictionary, replace: bool) -> MergeReport {
        let mut report = MergeReport::default();
        collect_changes(self, patch, "", &mut report.changes);

        for change in &report.changes {
            match &change.kind {
                ChangeKind::Added => {
                    tracing::debug!(path = %change.path, "adding dictionary entry");
                }
                ChangeKind::Overwritten { old, new } => {
                    tracing::warn!(
                        path = %change.path,
                        old = %old,
                        new = %new,
                        "overriding existing dictionary entry"
                    );
                }
            }
        }

        if report.changed() {
            if replace {
                for (key, value) in patch.iter() {
                    self.insert(key, value.clone());
                }
            } else {
                merge_into(self, patch);
            }
        }
        report
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}/{key}")
    }
}

fn collect_changes(original: &Dictionary, patch: &Dictionary, prefix: &str, out: &mut Vec<Change>) {
    for (key, new) in patch.iter() {
        let path = join(prefix, key);
        match (original.get(key), new) {
            (None, _) => out.push(Change {
                path,
                kind: ChangeKind::Added,
            }),
            (Some(Value::Dict(old)), Value::Dict(new)) => collect_changes(old, new, &path, out),
            (Some(old), new) => {
                let (old, new) = (old.to_string(), new.to_string());
                if old != new {
                    out.push(Change {
                        path,
                        kind: ChangeKind::Overwritten { old, new },
                    });
                }
            }
        }
    }
}

fn merge_into(target: &mut Dictionary, patch: &Dictionary) {
    for (key, value) in patch.iter() {
        match (target.get_mut(key), value) {
            (Some(Value::Dict(existing)), Value::Dict(sub)) => merge_into(existing, sub),
            _ => {
                target.insert(key, value.clone());
            }
        }
    }
}
