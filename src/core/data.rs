//! Core data structures for the prompt vault
//!
//! Field names on the wire follow the store's column names (`titulo`,
//! `contenido`, ...); the Rust side uses English names.

use crate::utils::format;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title given to prompts created without one
pub const DEFAULT_TITLE: &str = "Sin título";

/// Category label given to prompts created without one
pub const UNCATEGORIZED: &str = "Sin Categoría";

/// Color used when a category has no known swatch
pub const FALLBACK_COLOR: &str = "#94a3b8";

/// Built-in categories, always available for filtering and selection
pub const BUILTIN_CATEGORIES: [(&str, &str); 6] = [
    ("Marketing", "#6366f1"),
    ("Programación", "#10b981"),
    ("Escritura Creativa", "#f59e0b"),
    ("Productividad", "#ec4899"),
    ("Educación", "#8b5cf6"),
    (UNCATEGORIZED, FALLBACK_COLOR),
];

/// A stored prompt with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "contenido", default)]
    pub content: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "categoria", default)]
    pub category: Option<String>,
    #[serde(rename = "etiquetas", default, deserialize_with = "format::null_as_default")]
    pub tags: Vec<String>,
    #[serde(rename = "es_favorito", default, deserialize_with = "format::null_as_default")]
    pub favorite: bool,
    #[serde(rename = "creado_en")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "actualizado_en")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "calidad_score", default)]
    pub quality_score: Option<f64>,
    #[serde(rename = "calidad_feedback", default)]
    pub quality_feedback: Option<String>,
    #[serde(rename = "tono", default)]
    pub tone: Option<String>,
}

/// Immutable snapshot of a prompt's title and content before a content change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptVersion {
    pub id: String,
    pub prompt_id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "contenido")]
    pub content: String,
    #[serde(rename = "creado_en")]
    pub created_at: DateTime<Utc>,
}

/// Partial prompt as edited by the user; `id` decides create vs update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub favorite: Option<bool>,
    pub quality_score: Option<f64>,
    pub quality_feedback: Option<String>,
    pub tone: Option<String>,
}

/// Row inserted when a prompt is created, with defaults already applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPrompt {
    pub user_id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "contenido")]
    pub content: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "etiquetas")]
    pub tags: Vec<String>,
    #[serde(rename = "es_favorito")]
    pub favorite: bool,
    #[serde(rename = "calidad_score")]
    pub quality_score: f64,
    #[serde(rename = "calidad_feedback")]
    pub quality_feedback: String,
    #[serde(rename = "tono")]
    pub tone: String,
}

/// Column changes for an update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PromptChanges {
    #[serde(rename = "titulo", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "contenido", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "categoria", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "etiquetas", skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(rename = "es_favorito", skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    #[serde(rename = "calidad_score", skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    #[serde(rename = "calidad_feedback", skip_serializing_if = "Option::is_none")]
    pub quality_feedback: Option<String>,
    #[serde(rename = "tono", skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(rename = "actualizado_en")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPromptVersion {
    pub prompt_id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "contenido")]
    pub content: String,
}

/// A category label with its display color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "nombre")]
    pub name: String,
    pub color: String,
}

/// A user-defined category row as stored remotely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    pub color: String,
    #[serde(rename = "creado_en", default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCategory {
    pub user_id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    pub color: String,
}

/// Signed-in user as exposed by the session provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl UserProfile {
    /// Display name from metadata, then the email's local part, then a generic label
    pub fn resolve_name(id: String, email: Option<String>, metadata_name: Option<String>) -> Self {
        let email = email.unwrap_or_default();
        let name = metadata_name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| {
                email
                    .split('@')
                    .next()
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Usuario".to_string());
        Self { id, name, email }
    }
}

impl Prompt {
    /// Draft carrying every mutable field of this prompt
    pub fn to_draft(&self) -> PromptDraft {
        PromptDraft {
            id: Some(self.id.clone()),
            title: Some(self.title.clone()),
            content: Some(self.content.clone()),
            description: self.description.clone(),
            category: self.category.clone(),
            tags: Some(self.tags.clone()),
            favorite: Some(self.favorite),
            quality_score: self.quality_score,
            quality_feedback: self.quality_feedback.clone(),
            tone: self.tone.clone(),
        }
    }

    pub fn category_label(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => UNCATEGORIZED,
        }
    }
}

impl PromptDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Apply creation defaults to every absent field
    pub fn into_new_prompt(self, user_id: &str) -> NewPrompt {
        NewPrompt {
            user_id: user_id.to_string(),
            title: self
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            content: self.content.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            category: self
                .category
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            tags: self.tags.unwrap_or_default(),
            favorite: self.favorite.unwrap_or(false),
            quality_score: self.quality_score.unwrap_or(0.0),
            quality_feedback: self.quality_feedback.unwrap_or_default(),
            tone: self.tone.unwrap_or_default(),
        }
    }

    pub fn into_changes(self, updated_at: DateTime<Utc>) -> PromptChanges {
        PromptChanges {
            title: self.title,
            content: self.content,
            description: self.description,
            category: self.category,
            tags: self.tags,
            favorite: self.favorite,
            quality_score: self.quality_score,
            quality_feedback: self.quality_feedback,
            tone: self.tone,
            updated_at,
        }
    }

    /// Replace title and content with those of a past version
    pub fn revert_to(&mut self, version: &PromptVersion) {
        self.title = Some(version.title.clone());
        self.content = Some(version.content.clone());
    }
}

/// Built-in categories followed by user categories whose names are not built in
pub fn merge_categories(user_categories: &[CategoryRecord]) -> Vec<Category> {
    let mut merged: Vec<Category> = BUILTIN_CATEGORIES
        .iter()
        .map(|(name, color)| Category {
            name: name.to_string(),
            color: color.to_string(),
        })
        .collect();

    for record in user_categories {
        if !merged.iter().any(|c| c.name == record.name) {
            merged.push(Category {
                name: record.name.clone(),
                color: record.color.clone(),
            });
        }
    }

    merged
}

/// Display color for a category name
pub fn category_color<'a>(name: &str, categories: &'a [Category]) -> &'a str {
    categories
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.color.as_str())
        .unwrap_or(FALLBACK_COLOR)
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.title, self.category_label())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::Duration;

    pub fn prompt(id: &str, title: &str, content: &str, created: DateTime<Utc>) -> Prompt {
        Prompt {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            title: title.to_string(),
            content: content.to_string(),
            description: None,
            category: Some(UNCATEGORIZED.to_string()),
            tags: Vec::new(),
            favorite: false,
            created_at: created,
            updated_at: created,
            quality_score: None,
            quality_feedback: None,
            tone: None,
        }
    }

    pub fn days_ago(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
        now - Duration::days(days)
    }
}
