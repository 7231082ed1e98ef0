//! Analyzer configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bounds and switches of the recognition pipeline.
///
/// All bounds exist to keep worst-case work near-linear in document length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    /// Maximum distinct entities per document.
    pub max_entities: usize,
    /// Maximum candidates a parser may return per position.
    pub max_lookahead: usize,
    /// Visible nodes scanned backwards for a territory before a city.
    pub territory_before_city_window: usize,
    /// Visible nodes scanned backwards for "this city" anaphora.
    pub city_behind_referent_window: usize,
    /// Separator nodes the hierarchy pass may skip between mentions.
    pub hierarchy_skip_limit: usize,
    /// Run the second (capitalized/flagged) territory pass.
    pub second_territory_pass: bool,
    /// Run ontology re-propagation after the city pass.
    pub ontology_repropagation: bool,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            max_entities: 2000,
            max_lookahead: 5,
            territory_before_city_window: 10,
            city_behind_referent_window: 500,
            hierarchy_skip_limit: 4,
            second_territory_pass: true,
            ontology_repropagation: true,
        }
    }
}

impl GeoConfig {
    /// Parse from JSON; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GeoConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject bounds that would disable recognition.
    pub fn validate(&self) -> Result<()> {
        if self.max_entities == 0 {
            return Err(Error::config("max_entities must be positive"));
        }
        if self.max_lookahead == 0 {
            return Err(Error::config("max_lookahead must be positive"));
        }
        Ok(())
    }

    /// Set the entity cap.
    #[must_use]
    pub fn with_max_entities(mut self, n: usize) -> Self {
        self.max_entities = n;
        self
    }

    /// Set the parser lookahead.
    #[must_use]
    pub fn with_max_lookahead(mut self, n: usize) -> Self {
        self.max_lookahead = n;
        self
    }

    /// Set the territory-before-city window.
    #[must_use]
    pub fn with_territory_before_city_window(mut self, n: usize) -> Self {
        self.territory_before_city_window = n;
        self
    }

    /// Set the anaphora window.
    #[must_use]
    pub fn with_city_behind_referent_window(mut self, n: usize) -> Self {
        self.city_behind_referent_window = n;
        self
    }

    /// Set the hierarchy skip limit.
    #[must_use]
    pub fn with_hierarchy_skip_limit(mut self, n: usize) -> Self {
        self.hierarchy_skip_limit = n;
        self
    }

    /// Enable or disable the second territory pass.
    #[must_use]
    pub fn with_second_territory_pass(mut self, on: bool) -> Self {
        self.second_territory_pass = on;
        self
    }

    /// Enable or disable ontology re-propagation.
    #[must_use]
    pub fn with_ontology_repropagation(mut self, on: bool) -> Self {
        self.ontology_repropagation = on;
        self
    }
}
