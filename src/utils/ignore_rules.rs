use std::fmt;

/// Pure predicate over a single entry name
pub type IgnoreRule = fn(&str) -> bool;

/// Source maps only matter for debugging the dev build
pub fn is_source_map(name: &str) -> bool {
    name.ends_with(".map")
}

pub fn is_log_file(name: &str) -> bool {
    name.ends_with(".log")
}

/// Dotfiles: .DS_Store, .git, .vite caches and the like
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

pub fn is_node_modules(name: &str) -> bool {
    name == "node_modules"
}

pub fn is_bytecode_cache(name: &str) -> bool {
    name == "__pycache__"
}

/// Ordered set of named ignore rules, evaluated the same way at every
/// directory level. An entry is excluded as soon as one rule matches.
#[derive(Clone)]
pub struct IgnoreRuleSet {
    rules: Vec<(&'static str, IgnoreRule)>,
}

impl IgnoreRuleSet {
    /// Rule set that keeps everything
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Build artifacts that must never reach the runtime directory
    pub fn build_artifacts() -> Self {
        Self::empty()
            .with_rule("source-map", is_source_map)
            .with_rule("log-file", is_log_file)
            .with_rule("hidden", is_hidden)
            .with_rule("node-modules", is_node_modules)
            .with_rule("bytecode-cache", is_bytecode_cache)
    }

    pub fn with_rule(mut self, label: &'static str, rule: IgnoreRule) -> Self {
        self.rules.push((label, rule));
        self
    }

    /// Label of the first rule matching `name`, if any
    pub fn matching_rule(&self, name: &str) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|(_, rule)| rule(name))
            .map(|(label, _)| *label)
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.matching_rule(name).is_some()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.rules.iter().map(|(label, _)| *label).collect()
    }
}

impl Default for IgnoreRuleSet {
    fn default() -> Self {
        Self::build_artifacts()
    }
}

impl fmt::Debug for IgnoreRuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreRuleSet")
            .field("rules", &self.labels())
            .finish()
    }
}
