//! Insertion-ordered name -> entry container used for merged vocabulary sections
//!
//! Vocabulary order is preserved so attributes and variables appear in the
//! output file in the order the tables list them. Inserting a name that is
//! already present replaces the entry in place, which is how product and
//! instrument tables override the common ones.

/// Ordered mapping of vocabulary names to entries
#[derive(Debug, Clone, PartialEq)]
pub struct Section<T> {
    entries: Vec<(String, T)>,
}

impl<T> Section<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace, returning the previous entry if the name existed
    pub fn insert(&mut self, name: impl Into<String>, entry: T) -> Option<T> {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, entry)),
            None => {
                self.entries.push((name, entry));
                None
            }
        }
    }

    /// Merge another section into this one, later entries winning
    pub fn extend(&mut self, other: Section<T>) {
        for (name, entry) in other.entries {
            self.insert(name, entry);
        }
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entry)| entry)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(n, e)| (n.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(String, T)> for Section<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let mut section = Section::new();
        for (name, entry) in iter {
            section.insert(name, entry);
        }
        section
    }
}
