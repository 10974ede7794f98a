//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use pqrs_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Free-form metadata attached to documents and index entries.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Infrastructure topic a document or complaint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "vias_pavimentos")]
    RoadsAndPavements,
    #[serde(rename = "alumbrado_publico")]
    PublicLighting,
    #[serde(rename = "espacios_publicos")]
    PublicSpaces,
    #[serde(rename = "puentes_obras_arte")]
    BridgesAndStructures,
    #[serde(rename = "drenajes_alcantarillado")]
    DrainageAndSewerage,
    #[serde(rename = "senalizacion")]
    Signage,
    #[serde(rename = "mantenimiento_general")]
    GeneralMaintenance,
    #[serde(rename = "otros")]
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 8] = [
        Category::RoadsAndPavements,
        Category::PublicLighting,
        Category::PublicSpaces,
        Category::BridgesAndStructures,
        Category::DrainageAndSewerage,
        Category::Signage,
        Category::GeneralMaintenance,
        Category::Other,
    ];

    /// Wire label, as stored in the index and returned by the classifier.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RoadsAndPavements => "vias_pavimentos",
            Self::PublicLighting => "alumbrado_publico",
            Self::PublicSpaces => "espacios_publicos",
            Self::BridgesAndStructures => "puentes_obras_arte",
            Self::DrainageAndSewerage => "drenajes_alcantarillado",
            Self::Signage => "senalizacion",
            Self::GeneralMaintenance => "mantenimiento_general",
            Self::Other => "otros",
        }
    }

    /// Human-readable name ("vias_pavimentos" becomes "Vias Pavimentos").
    pub fn display_name(&self) -> String {
        self.label()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::RoadsAndPavements => "Problemas con vías, pavimentos, huecos y baches",
            Self::PublicLighting => "Problemas con luminarias, postes de luz e iluminación",
            Self::PublicSpaces => "Parques, plazas, andenes y mobiliario urbano",
            Self::BridgesAndStructures => "Puentes, túneles y obras de infraestructura mayor",
            Self::DrainageAndSewerage => "Sistemas de drenaje, alcantarillado e inundaciones",
            Self::Signage => "Señales de tránsito y demarcación vial",
            Self::GeneralMaintenance => "Mantenimiento general de infraestructura",
            Self::Other => "Otros temas relacionados con infraestructura",
        }
    }

    /// Strict lookup of a wire label.
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Map free-form classifier output onto the closed set.
    ///
    /// Output is trimmed and lowercased, then must equal a label exactly.
    /// Anything else is `Other`.
    pub fn from_label(raw: &str) -> Self {
        Self::parse(&raw.trim().to_lowercase()).unwrap_or(Self::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.trim()).ok_or_else(|| {
            AppError::Validation(format!(
                "Unknown category '{}'. Expected one of: {}",
                s,
                Self::ALL.map(|c| c.label()).join(", ")
            ))
        })
    }
}

/// Kind of citizen request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplaintType {
    #[serde(rename = "peticion")]
    Petition,
    #[serde(rename = "queja")]
    Complaint,
    #[serde(rename = "reclamo")]
    Claim,
    #[serde(rename = "sugerencia")]
    Suggestion,
}

impl ComplaintType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Petition => "peticion",
            Self::Complaint => "queja",
            Self::Claim => "reclamo",
            Self::Suggestion => "sugerencia",
        }
    }

    /// Spanish wording used in generated replies.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Petition => "petición",
            Self::Complaint => "queja",
            Self::Claim => "reclamo",
            Self::Suggestion => "sugerencia",
        }
    }
}

impl FromStr for ComplaintType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "peticion" | "petición" => Ok(Self::Petition),
            "queja" => Ok(Self::Complaint),
            "reclamo" => Ok(Self::Claim),
            "sugerencia" => Ok(Self::Suggestion),
            other => Err(AppError::Validation(format!(
                "Unknown complaint type '{}'. Expected one of: peticion, queja, reclamo, sugerencia",
                other
            ))),
        }
    }
}

/// A citizen request (petición, queja, reclamo o sugerencia).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintRequest {
    pub complaint_type: ComplaintType,

    /// Category chosen by the citizen; classified automatically when absent
    #[serde(default)]
    pub category: Option<Category>,

    pub title: String,
    pub description: String,

    #[serde(default)]
    pub location: Option<String>,

    pub citizen_name: String,
    pub citizen_email: String,

    #[serde(default)]
    pub citizen_phone: Option<String>,
}

impl ComplaintRequest {
    pub const MIN_TITLE_CHARS: usize = 5;
    pub const MAX_TITLE_CHARS: usize = 200;
    pub const MIN_DESCRIPTION_CHARS: usize = 10;

    /// Check field lengths and required fields.
    pub fn validate(&self) -> AppResult<()> {
        let title_len = self.title.chars().count();
        if !(Self::MIN_TITLE_CHARS..=Self::MAX_TITLE_CHARS).contains(&title_len) {
            return Err(AppError::Validation(format!(
                "Title must be between {} and {} characters (got {})",
                Self::MIN_TITLE_CHARS,
                Self::MAX_TITLE_CHARS,
                title_len
            )));
        }

        let description_len = self.description.chars().count();
        if description_len < Self::MIN_DESCRIPTION_CHARS {
            return Err(AppError::Validation(format!(
                "Description must be at least {} characters (got {})",
                Self::MIN_DESCRIPTION_CHARS,
                description_len
            )));
        }

        if self.citizen_name.trim().is_empty() {
            return Err(AppError::Validation("Citizen name is required".to_string()));
        }

        if self.citizen_email.trim().is_empty() {
            return Err(AppError::Validation(
                "Citizen email is required".to_string(),
            ));
        }

        Ok(())
    }
}

/// Reply produced for a complaint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintResponse {
    pub complaint_id: String,
    pub response: String,

    /// Title of every retrieved chunk, in ranked order (not deduplicated)
    pub reference_documents: Vec<String>,

    pub confidence: f32,
    pub detected_category: Category,

    /// Processing time in seconds
    pub elapsed_secs: f64,

    pub recommendations: Vec<String>,
}

/// A document submitted to the knowledge base.
///
/// Construct with `Document::new`, which validates the title and metadata;
/// serialized input (manifests) goes through it as well.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Human-readable key; chunk ids derive from it
    pub title: String,

    /// Full text body
    pub body: String,

    pub category: Category,

    pub created_at: DateTime<Utc>,

    /// Scalar values only (string, number, bool, null)
    pub metadata: Metadata,
}

impl Document {
    /// Create a new document stamped with the current time.
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        category: Category,
        metadata: Metadata,
    ) -> AppResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(AppError::Validation(
                "Document title cannot be empty".to_string(),
            ));
        }

        if let Some((key, _)) = metadata
            .iter()
            .find(|(_, v)| v.is_array() || v.is_object())
        {
            return Err(AppError::Validation(format!(
                "Metadata value for '{}' must be a scalar",
                key
            )));
        }

        Ok(Self {
            title,
            body: body.into(),
            category,
            created_at: Utc::now(),
            metadata,
        })
    }

    /// Override the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Identifier of the chunk at `index`.
    pub fn chunk_id(&self, index: usize) -> String {
        format!("{}_{}", self.title, index)
    }
}

/// The persisted unit inside a vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    pub category: Category,
    pub metadata: Metadata,
}

/// A ranked match returned by a vector index query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub text: String,
    pub category: Category,
    pub metadata: Metadata,

    /// `1 - distance`, in [0, 1]
    pub similarity: f32,
}

impl SearchResult {
    /// Title of the owning document, falling back to the entry id.
    pub fn title(&self) -> &str {
        self.metadata
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or(&self.id)
    }
}

/// Health of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    Active,
    Empty,
    Error,
}

/// Collection statistics, also used as the health-check payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub total_entries: usize,
    pub status: CollectionStatus,
}
