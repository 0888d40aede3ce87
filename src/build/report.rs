//! Build outcome summary

/// Targets whose recipes ran during one build, in completion order
///
/// A target reached through several paths may appear more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    rebuilt: Vec<String>,
}

impl BuildReport {
    pub(crate) fn record(&mut self, name: &str) {
        self.rebuilt.push(name.to_string());
    }

    /// Rebuilt target names in completion order
    pub fn rebuilt(&self) -> &[String] {
        &self.rebuilt
    }

    /// Whether the recipe of `name` ran at least once
    pub fn was_rebuilt(&self, name: &str) -> bool {
        self.rebuilt.iter().any(|n| n == name)
    }

    /// Whether no recipe ran
    pub fn is_up_to_date(&self) -> bool {
        self.rebuilt.is_empty()
    }
}
