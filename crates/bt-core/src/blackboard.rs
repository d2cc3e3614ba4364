use std::collections::{BTreeMap, HashMap};

/// Fact store consulted and mutated by tree nodes.
///
/// Facts are plain strings keyed by name. Implementations decide storage and ordering; callers
/// only rely on key uniqueness.
pub trait Blackboard {
    fn set_fact(&mut self, name: &str, value: &str);

    fn get_fact(&self, name: &str) -> Option<&str>;

    fn remove_fact(&mut self, name: &str);

    fn fact_exists(&self, name: &str) -> bool {
        self.get_fact(name).is_some()
    }

    /// Copy of every fact, ordered by name.
    fn snapshot(&self) -> BTreeMap<String, String>;
}

/// Plain dictionary blackboard; the default store of the tree interpreter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictBlackboard {
    facts: BTreeMap<String, String>,
}

impl DictBlackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn clear(&mut self) {
        self.facts.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.facts.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for DictBlackboard
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            facts: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Blackboard for DictBlackboard {
    fn set_fact(&mut self, name: &str, value: &str) {
        self.facts.insert(name.to_owned(), value.to_owned());
    }

    fn get_fact(&self, name: &str) -> Option<&str> {
        self.facts.get(name).map(String::as_str)
    }

    fn remove_fact(&mut self, name: &str) {
        self.facts.remove(name);
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        self.facts.clone()
    }
}

/// Hash-backed blackboard used by the bytecode VM.
///
/// Lookups of absent facts return an empty sentinel string instead of `None`, so opcode
/// handlers never branch on presence when they only need a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmBlackboard {
    facts: HashMap<String, String>,
}

impl VmBlackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_fact(&self, name: &str) -> bool {
        self.facts.contains_key(name)
    }

    /// Value of `name`, or `""` when the fact is absent.
    pub fn get(&self, name: &str) -> &str {
        self.facts.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn clear(&mut self) {
        self.facts.clear();
    }
}

impl<K, V> FromIterator<(K, V)> for VmBlackboard
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            facts: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Blackboard for VmBlackboard {
    fn set_fact(&mut self, name: &str, value: &str) {
        self.facts.insert(name.to_owned(), value.to_owned());
    }

    fn get_fact(&self, name: &str) -> Option<&str> {
        self.facts.get(name).map(String::as_str)
    }

    fn remove_fact(&mut self, name: &str) {
        self.facts.remove(name);
    }

    fn fact_exists(&self, name: &str) -> bool {
        self.has_fact(name)
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        self.facts
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
