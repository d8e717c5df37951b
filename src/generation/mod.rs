//! Content generation
//!
//! The ContentGenerator port and its implementations: an OpenAI-compatible
//! chat client and an offline template generator.

mod openai;
mod template;
mod traits;

use std::sync::Arc;

use tracing::info;

use crate::config::OpenAiSettings;
use crate::error::Result;

pub use openai::OpenAiGenerator;
#[cfg(test)]
pub(crate) use openai::failing_endpoint;
pub use template::TemplateGenerator;
#[cfg(test)]
pub use template::TemplateConfig;
pub use traits::*;

/// Select the generator for the configured settings.
///
/// Without an API key the offline templates are used.
pub fn from_settings(settings: &OpenAiSettings) -> Result<Arc<dyn ContentGenerator>> {
    if settings.api_key.trim().is_empty() {
        info!("No OpenAI API key configured, using offline templates");
        Ok(Arc::new(TemplateGenerator::new()))
    } else {
        Ok(Arc::new(OpenAiGenerator::new(settings.clone())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selects_template_without_key() {
        let gen = from_settings(&OpenAiSettings::default()).unwrap();
        assert_eq!(gen.name(), "template");
    }

    #[test]
    fn test_selects_openai_with_key() {
        let settings = OpenAiSettings {
            api_key: "sk-test".to_string(),
            ..Default::default()
        };
        let gen = from_settings(&settings).unwrap();
        assert_eq!(gen.name(), "openai");
    }
}
