/// A (type, property) pair whose value type could not yet be determined.
///
/// Exists only for the duration of a build pass: the pair is removed as soon
/// as a later document supplies a non-null value, and whatever is left at the
/// end of the pass is force-typed to string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedProperty {
    /// Qualified name of the owning resource type.
    pub type_name: String,
    /// Raw source field name (not yet normalized).
    pub property_name: String,
}

impl UnresolvedProperty {
    pub fn new(type_name: &str, property_name: &str) -> UnresolvedProperty {
        UnresolvedProperty {
            type_name: type_name.to_string(),
            property_name: property_name.to_string(),
        }
    }
}

/// Per-pass tracker of unresolved properties.
#[derive(Debug, Default)]
pub struct UnresolvedProperties {
    entries: Vec<UnresolvedProperty>,
}

impl UnresolvedProperties {
    pub fn new() -> UnresolvedProperties {
        UnresolvedProperties::default()
    }

    pub fn contains(&self, entry: &UnresolvedProperty) -> bool {
        self.entries.contains(entry)
    }

    pub fn insert(&mut self, entry: UnresolvedProperty) {
        if !self.contains(&entry) {
            self.entries.push(entry);
        }
    }

    pub fn remove(&mut self, entry: &UnresolvedProperty) {
        self.entries.retain(|e| e != entry);
    }

    /// Take all remaining entries, leaving the tracker empty.
    pub fn drain(&mut self) -> Vec<UnresolvedProperty> {
        std::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
