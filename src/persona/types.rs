//! Core persona types.
//!
//! A persona is a target audience segment. It parameterizes generation (focus
//! areas, tone) and keys the engagement metrics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One audience persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Stable identifier, e.g. `founders`.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Topics this audience cares about.
    #[serde(default)]
    pub focus: Vec<String>,

    /// Writing tone for this audience.
    #[serde(default)]
    pub tone: String,
}

impl Persona {
    #[cfg(test)]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        focus: &[&str],
        tone: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            focus: focus.iter().map(|s| s.to_string()).collect(),
            tone: tone.into(),
        }
    }

    /// Focus areas joined for prompts and listings.
    pub fn focus_list(&self) -> String {
        self.focus.join(", ")
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// TOML document shape for a persona list.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PersonaFile {
    #[serde(default)]
    pub personas: Vec<Persona>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_display_and_focus() {
        let p = Persona::new("founders", "Founders", &["ROI", "growth"], "executive");
        assert_eq!(p.to_string(), "Founders (founders)");
        assert_eq!(p.focus_list(), "ROI, growth");
    }

    #[test]
    fn test_persona_file_parse() {
        let toml_str = r#"
            [[personas]]
            id = "devs"
            name = "Developers"
            focus = ["APIs"]
        "#;
        let file: PersonaFile = toml::from_str(toml_str).unwrap();
        assert_eq!(file.personas.len(), 1);
        assert_eq!(file.personas[0].tone, "");
    }
}
