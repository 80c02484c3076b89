//! Recommended resources and their card buckets.

use serde::{Deserialize, Serialize};

/// Shown on a card when the resource has no (or an empty) description.
pub const DEFAULT_DESCRIPTION: &str =
    "Learn more about this resource and how it can enhance your teaching.";

/// A recommendation returned by the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Card heading.
    #[serde(default)]
    pub title: String,
    /// Free-form type label (e.g. `EdTech Tool`); drives [`ResourceKind`].
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Optional blurb.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Target of the "Learn More" link.
    #[serde(default = "default_link")]
    pub link: String,
}

fn default_link() -> String {
    "#".to_string()
}

impl Resource {
    /// Build a resource with a description.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            kind: kind.into(),
            description: Some(description.into()),
            link: link.into(),
        }
    }

    /// Style bucket of the card.
    #[must_use]
    pub fn bucket(&self) -> ResourceKind {
        ResourceKind::classify(&self.kind)
    }

    /// Description to display, falling back to [`DEFAULT_DESCRIPTION`].
    #[must_use]
    pub fn description_or_default(&self) -> &str {
        match self.description.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => DEFAULT_DESCRIPTION,
        }
    }
}

/// Card style bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Workshop,
    Tool,
    Strategy,
}

impl ResourceKind {
    /// Classify a type label by case-insensitive substring match.
    ///
    /// `workshop` wins over `tool`; anything else is a strategy.
    #[must_use]
    pub fn classify(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("workshop") {
            Self::Workshop
        } else if label.contains("tool") {
            Self::Tool
        } else {
            Self::Strategy
        }
    }

    /// CSS class name of the bucket.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Workshop => "workshop",
            Self::Tool => "tool",
            Self::Strategy => "strategy",
        }
    }
}

/// Resources shown before the first reply arrives.
#[must_use]
pub fn fallback_resources() -> Vec<Resource> {
    vec![
        Resource::new(
            "Workshop: Digital Pedagogy for Modern Classrooms",
            "Workshop",
            "Learn how to effectively integrate technology into your teaching practice.",
            "#",
        ),
        Resource::new(
            "Tool: Nearpod",
            "EdTech Tool",
            "Interactive lessons, videos, and activities to engage students in any setting.",
            "https://nearpod.com",
        ),
        Resource::new(
            "Strategy: Think-Pair-Share",
            "Teaching Strategy",
            "A collaborative learning strategy to encourage student participation.",
            "#",
        ),
    ]
}
