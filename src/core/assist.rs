//! AI assistance over a [`TextGenerator`]
//!
//! Prompt texts are sent in Spanish to match the language of the stored data.

use crate::core::traits::TextGenerator;
use crate::utils::error::{AppError, AppResult};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_IDEA_MODEL: &str = "gemini-3-pro-preview";

/// Upper bound on suggested tags
pub const MAX_TAGS: usize = 5;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QualityAudit {
    pub score: f64,
    pub feedback: String,
    #[serde(rename = "tono")]
    pub tone: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TagSuggestion {
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "etiquetas", default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratedPrompt {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "contenido")]
    pub content: String,
}

pub struct Assistant {
    generator: Arc<dyn TextGenerator>,
    model: String,
    idea_model: String,
}

impl Assistant {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            model: DEFAULT_MODEL.to_string(),
            idea_model: DEFAULT_IDEA_MODEL.to_string(),
        }
    }

    pub fn with_models(mut self, model: &str, idea_model: &str) -> Self {
        self.model = model.to_string();
        self.idea_model = idea_model.to_string();
        self
    }

    /// Rewrite `content` into a more effective prompt; an empty reply keeps the input
    pub async fn improve(&self, content: &str) -> AppResult<String> {
        let request = format!(
            "Eres un experto ingeniero de prompts. Mejora este prompt para que sea más efectivo, \
             detallado y profesional. Devuelve solo el texto del prompt.\n\nPrompt: {}",
            content
        );
        let reply = self.generator.generate_text(&self.model, &request).await?;
        let reply = reply.trim();

        if reply.is_empty() {
            tracing::debug!("empty improvement reply, keeping original content");
            Ok(content.to_string())
        } else {
            Ok(reply.to_string())
        }
    }

    /// Score the prompt from 1 to 10 with a short tip and its dominant tone
    pub async fn analyze_quality(&self, content: &str) -> AppResult<QualityAudit> {
        let request = format!(
            "Analiza la calidad de este prompt de IA. Evalúa del 1 al 10 basándote en \
             especificidad, contexto y claridad. Proporciona un consejo breve de mejora y \
             detecta el tono predominante.\n\nPrompt: {}",
            content
        );
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "score": { "type": "NUMBER" },
                "feedback": { "type": "STRING" },
                "tono": { "type": "STRING" }
            },
            "required": ["score", "feedback", "tono"]
        });

        let mut audit: QualityAudit = self.ask_json(&self.model, &request, &schema).await?;
        audit.score = audit.score.clamp(0.0, 10.0);
        Ok(audit)
    }

    /// One-word category plus at most [`MAX_TAGS`] tags
    pub async fn auto_tag(&self, content: &str) -> AppResult<TagSuggestion> {
        let request = format!(
            "Analiza este prompt. Categoría (1 palabra) y etiquetas (máx {}). JSON format.\n\nContenido: {}",
            MAX_TAGS, content
        );
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "categoria": { "type": "STRING" },
                "etiquetas": { "type": "ARRAY", "items": { "type": "STRING" } }
            },
            "required": ["categoria", "etiquetas"]
        });

        let mut suggestion: TagSuggestion = self.ask_json(&self.model, &request, &schema).await?;
        suggestion.tags.retain(|t| !t.trim().is_empty());
        suggestion.tags.truncate(MAX_TAGS);
        Ok(suggestion)
    }

    /// Turn a loose idea into a titled prompt
    pub async fn from_idea(&self, idea: &str) -> AppResult<GeneratedPrompt> {
        let request = format!(
            "Convierte esta idea en un prompt profesional y creativo con un título.\n\nIdea: {}",
            idea
        );
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "titulo": { "type": "STRING" },
                "contenido": { "type": "STRING" }
            },
            "required": ["titulo", "contenido"]
        });

        self.ask_json(&self.idea_model, &request, &schema).await
    }

    async fn ask_json<T: DeserializeOwned>(
        &self,
        model: &str,
        request: &str,
        schema: &serde_json::Value,
    ) -> AppResult<T> {
        let reply = self.generator.generate_json(model, request, schema).await?;
        serde_json::from_str(reply.trim()).map_err(|e| {
            tracing::warn!(model = %model, error = %e, "unparsable AI reply");
            AppError::Ai(format!("Unexpected reply from the AI service: {}", e))
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fake::CannedGenerator;
    use super::*;

    fn assistant(generator: CannedGenerator) -> (Arc<CannedGenerator>, Assistant) {
        let generator = Arc::new(generator);
        (generator.clone(), Assistant::new(generator))
    }

    #[tokio::test]
    async fn test_improve_returns_trimmed_reply() {
        let (_, assistant) = assistant(CannedGenerator::replying("  Better prompt\n"));
        assert_eq!(assistant.improve("bad").await.unwrap(), "Better prompt");
    }

    #[tokio::test]
    async fn test_improve_keeps_original_on_empty_reply() {
        let (_, assistant) = assistant(CannedGenerator::replying("   "));
        assert_eq!(assistant.improve("original").await.unwrap(), "original");
    }

    #[tokio::test]
    async fn test_analyze_parses_audit() {
        let (_, assistant) = assistant(CannedGenerator::replying(
            r#"{"score": 7.5, "feedback": "Add context", "tono": "Formal"}"#,
        ));
        let audit = assistant.analyze_quality("prompt").await.unwrap();
        assert_eq!(audit.score, 7.5);
        assert_eq!(audit.feedback, "Add context");
        assert_eq!(audit.tone, "Formal");
    }

    #[tokio::test]
    async fn test_unparsable_reply_is_ai_error() {
        let (_, assistant) = assistant(CannedGenerator::replying("not json"));
        let err = assistant.analyze_quality("prompt").await.unwrap_err();
        assert!(matches!(err, AppError::Ai(_)));
    }

    #[tokio::test]
    async fn test_auto_tag_caps_tags() {
        let (_, assistant) = assistant(CannedGenerator::replying(
            r#"{"categoria": "Marketing", "etiquetas": ["a", "b", "", "c", "d", "e", "f"]}"#,
        ));
        let suggestion = assistant.auto_tag("prompt").await.unwrap();
        assert_eq!(suggestion.category, "Marketing");
        assert_eq!(suggestion.tags, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_idea_uses_idea_model() {
        let (generator, assistant) = assistant(CannedGenerator::replying(
            r#"{"titulo": "Launch plan", "contenido": "Write a plan for {{product}}"}"#,
        ));
        let assistant = assistant.with_models("fast", "deep");
        let generated = assistant.from_idea("launch").await.unwrap();

        assert_eq!(generated.title, "Launch plan");
        assert_eq!(generator.models.lock().unwrap().as_slice(), ["deep"]);
    }

    #[tokio::test]
    async fn test_service_error_propagates() {
        let (_, assistant) = assistant(CannedGenerator::failing(AppError::Ai("quota".into())));
        assert_eq!(
            assistant.improve("x").await.unwrap_err(),
            AppError::Ai("quota".into())
        );
    }
}
