//! Persona catalog: the registry of personas available to campaigns.

use std::collections::HashSet;

use tracing::debug;

use super::registry::bundled_personas;
use super::types::Persona;
use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────
// Persona Catalog
// ─────────────────────────────────────────────────────────────────

/// Immutable, ordered set of personas.
#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    personas: Vec<Persona>,
}

impl PersonaCatalog {
    /// Build a catalog, rejecting empty or duplicate ids.
    pub fn new(personas: Vec<Persona>) -> Result<Self> {
        let mut seen = HashSet::new();
        for persona in &personas {
            if persona.id.trim().is_empty() {
                return Err(Error::config_field_invalid("personas.id", "persona id must not be empty"));
            }
            if !seen.insert(persona.id.as_str()) {
                return Err(Error::config_field_invalid(
                    "personas.id",
                    format!("duplicate persona id '{}'", persona.id),
                ));
            }
        }
        Ok(Self { personas })
    }

    /// The catalog shipped with the binary.
    pub fn bundled() -> Result<Self> {
        Self::new(bundled_personas()?)
    }

    /// Catalog from configured personas, or the bundled one when none are configured.
    pub fn from_config(configured: &[Persona]) -> Result<Self> {
        if configured.is_empty() {
            debug!("No personas configured, using bundled catalog");
            Self::bundled()
        } else {
            debug!(count = configured.len(), "Using configured personas");
            Self::new(configured.to_vec())
        }
    }

    /// Look up a persona by id.
    pub fn get(&self, id: &str) -> Result<&Persona> {
        self.personas
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::PersonaNotFound {
                persona_id: id.to_string(),
            })
    }

    /// All personas in configured order.
    pub fn all(&self) -> &[Persona] {
        &self.personas
    }

    pub fn ids(&self) -> Vec<String> {
        self.personas.iter().map(|p| p.id.clone()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.personas.iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }
}
