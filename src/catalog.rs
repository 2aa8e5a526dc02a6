//! Category catalog: built-in sports categories plus per-session custom ones.
//!
//! A category is a named, ordered list of natural-language prompts. The
//! built-in list is a process-wide constant; custom categories live in the
//! caller's session and are layered on top through [`Catalog`].

use crate::error::ServiceError;

/// Category name used when a prompt cannot be traced back to a selected category.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// A named group of related search prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub prompts: Vec<String>,
}

impl Category {
    pub fn new(name: impl Into<String>, prompts: Vec<String>) -> Self {
        Self {
            name: name.into(),
            prompts,
        }
    }

    /// Build a category from the custom-category form: a name and a
    /// comma-separated prompt list.
    ///
    /// Prompts are trimmed and blank entries dropped. Fails when the name is
    /// blank or no prompt survives.
    pub fn from_form(name: &str, prompts: &str) -> Result<Self, ServiceError> {
        let name = name.trim();
        let prompts = parse_prompt_list(prompts);

        if name.is_empty() || prompts.is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Please enter both class name and prompts.".into(),
            ));
        }

        Ok(Self::new(name, prompts))
    }

    pub fn has_prompt(&self, prompt: &str) -> bool {
        self.prompts.iter().any(|p| p == prompt)
    }
}

/// Split a comma-separated prompt list, trimming each entry.
pub fn parse_prompt_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

const BUILTIN: &[(&str, [&str; 5])] = &[
    (
        "AquaticSports",
        [
            "swimming competition",
            "diving event",
            "water polo match",
            "synchronized swimming",
            "open water swimming",
        ],
    ),
    (
        "AthleticEvents",
        [
            "track and field",
            "marathon running",
            "long jump competition",
            "javelin throw",
            "high jump event",
        ],
    ),
    (
        "GymnasticsEvents",
        [
            "artistic gymnastics",
            "rhythmic gymnastics",
            "trampoline gymnastics",
            "balance beam routine",
            "floor exercise performance",
        ],
    ),
    (
        "CombatSports",
        [
            "boxing match",
            "judo competition",
            "wrestling bout",
            "taekwondo fight",
            "fencing duel",
        ],
    ),
    (
        "TeamSports",
        [
            "basketball game",
            "volleyball match",
            "football (soccer) match",
            "handball game",
            "field hockey competition",
        ],
    ),
    (
        "CyclingSports",
        [
            "road cycling race",
            "track cycling event",
            "mountain bike competition",
            "BMX racing",
            "cycling time trial",
        ],
    ),
    (
        "RacquetSports",
        [
            "tennis match",
            "badminton game",
            "table tennis competition",
            "squash game",
            "tennis doubles match",
        ],
    ),
    (
        "RowingAndSailing",
        [
            "rowing competition",
            "sailing race",
            "canoe sprint",
            "kayak event",
            "windsurfing competition",
        ],
    ),
];

/// The built-in categories, in display order.
pub fn builtin_categories() -> Vec<Category> {
    BUILTIN
        .iter()
        .map(|(name, prompts)| {
            Category::new(*name, prompts.iter().map(|p| p.to_string()).collect())
        })
        .collect()
}

/// A prompt to be queried, tagged with the category it was resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptQuery {
    pub prompt: String,
    pub category: String,
}

/// Read-only view over built-in plus session categories.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    /// Built-ins first, then the session's custom categories in insertion order.
    pub fn with_custom(custom: &[Category]) -> Self {
        let mut categories = builtin_categories();
        categories.extend(custom.iter().cloned());
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// Expand a selection into the prompts to query.
    ///
    /// Walks the catalog in catalog order and collects the prompts of every
    /// category whose name is selected. Duplicates are kept: a prompt listed by
    /// two selected categories is queried twice.
    pub fn expand(&self, selected: &[String]) -> Vec<PromptQuery> {
        self.categories
            .iter()
            .filter(|c| selected.iter().any(|s| s == &c.name))
            .flat_map(|c| c.prompts.iter())
            .map(|prompt| PromptQuery {
                prompt: prompt.clone(),
                category: self.resolve_category(prompt, selected),
            })
            .collect()
    }

    /// First selected category name (in selection order) that lists `prompt`.
    pub fn resolve_category(&self, prompt: &str, selected: &[String]) -> String {
        selected
            .iter()
            .find(|name| {
                self.categories
                    .iter()
                    .any(|c| &c.name == *name && c.has_prompt(prompt))
            })
            .cloned()
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
    }
}
