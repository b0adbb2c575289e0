//! Case-insensitive, insertion-ordered multi-map for query parameters
//!
//! A plain hash map cannot satisfy both guarantees the URL model needs:
//! case-insensitive name lookup *and* stable insertion-order iteration.
//! This keeps entries in a vector and scans on lookup, which is fine for
//! the handful of parameters real URLs carry.

/// Immutable view over the parameters of a URL.
#[derive(Clone, Debug, Default)]
pub struct Parameters {
    entries: Vec<(String, Vec<String>)>,
}

impl Parameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First value associated with `name`, if any
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name)?.first().map(String::as_str)
    }

    /// All values associated with `name`, in insertion order
    #[must_use]
    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get_all(name).is_some()
    }

    #[must_use]
    pub fn contains_value(&self, name: &str, value: &str) -> bool {
        self.get_all(name)
            .is_some_and(|values| values.iter().any(|v| v == value))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl PartialEq for Parameters {
    fn eq(&self, other: &Self) -> bool {
        if self.entries.len() != other.entries.len() {
            return false;
        }

        self.entries.iter().zip(&other.entries).all(
            |((name_a, values_a), (name_b, values_b))| {
                name_a.eq_ignore_ascii_case(name_b) && values_a == values_b
            },
        )
    }
}

impl Eq for Parameters {}

/// Mutable builder for [Parameters].
#[derive(Clone, Debug, Default)]
pub struct ParametersBuilder {
    entries: Vec<(String, Vec<String>)>,
}

impl ParametersBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value for `name`, creating the entry if necessary
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        match self.entry_mut(name) {
            Some(values) => values.push(value.into()),
            None => self.entries.push((name.to_owned(), vec![value.into()])),
        }
    }

    /// Add a name without any value (e.g. a bare `?flag` query entry)
    pub fn append_name(&mut self, name: &str) {
        if self.entry_mut(name).is_none() {
            self.entries.push((name.to_owned(), Vec::new()));
        }
    }

    /// Replace all values for `name`
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        match self.entry_mut(name) {
            Some(values) => {
                values.clear();
                values.push(value.into());
            },
            None => self.entries.push((name.to_owned(), vec![value.into()])),
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.entries
            .retain(|(entry_name, _)| !entry_name.eq_ignore_ascii_case(name));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Append every entry of `other` to this builder
    pub fn append_all(&mut self, other: &Parameters) {
        for (name, values) in other.entries() {
            if values.is_empty() {
                self.append_name(name);
            }
            for value in values {
                self.append(name, value.clone());
            }
        }
    }

    #[must_use]
    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get_all(name).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    #[must_use]
    pub fn build(&self) -> Parameters {
        Parameters {
            entries: self.entries.clone(),
        }
    }

    fn entry_mut(&mut self, name: &str) -> Option<&mut Vec<String>> {
        self.entries
            .iter_mut()
            .find(|(entry_name, _)| entry_name.eq_ignore_ascii_case(name))
            .map(|(_, values)| values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut builder = ParametersBuilder::new();
        builder.append("Key", "value");

        let params = builder.build();
        assert_eq!(params.get("key"), Some("value"));
        assert_eq!(params.get("KEY"), Some("value"));
        assert!(params.contains("kEy"));
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let mut builder = ParametersBuilder::new();
        builder.append("b", "1");
        builder.append("a", "2");
        builder.append("b", "3");

        let params = builder.build();
        let names: Vec<_> = params.names().collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(params.get_all("b").unwrap(), ["1", "3"]);
    }

    #[test]
    fn equality_ignores_name_case() {
        let mut a = ParametersBuilder::new();
        a.append("Key", "v");

        let mut b = ParametersBuilder::new();
        b.append("key", "v");

        assert_eq!(a.build(), b.build());
    }

    #[test]
    fn set_replaces_all_values() {
        let mut builder = ParametersBuilder::new();
        builder.append("a", "1");
        builder.append("a", "2");
        builder.set("A", "3");

        assert_eq!(builder.get_all("a").unwrap(), ["3"]);
    }
}
