//! Bundled persona registry: the default catalog shipped with the binary.

use super::types::{Persona, PersonaFile};
use crate::error::{Error, Result};

const BUNDLED_PERSONAS: &str = include_str!("../../config/personas.toml");

/// Parse the bundled persona definitions.
pub fn bundled_personas() -> Result<Vec<Persona>> {
    let file: PersonaFile = toml::from_str(BUNDLED_PERSONAS).map_err(|e| Error::ConfigParse {
        message: format!("bundled persona catalog: {}", e),
        source: Some(e),
    })?;
    Ok(file.personas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog() {
        let personas = bundled_personas().unwrap();
        let ids: Vec<&str> = personas.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["founders", "creatives", "operations"]);
        assert!(personas.iter().all(|p| !p.focus.is_empty() && !p.tone.is_empty()));
    }

    #[test]
    fn test_bundled_tones() {
        let personas = bundled_personas().unwrap();
        assert_eq!(personas[0].tone, "executive, data-driven, strategic");
        assert_eq!(personas[2].name, "Operations Managers");
    }
}
