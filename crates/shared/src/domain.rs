use chrono::Utc;
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(RecipeId);

impl RecipeId {
    /// Id derived from the current wall clock in milliseconds, used when the
    /// catalog does not assign one.
    pub fn from_timestamp() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    /// The catalog signals "no id" with a missing field or zero.
    pub fn is_assigned(&self) -> bool {
        self.0 != 0
    }
}

/// One recipe as the catalog returns it and as the local store persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl Recipe {
    pub fn name_matches(&self, lowercase_query: &str) -> bool {
        self.name.to_lowercase().contains(lowercase_query)
    }
}

/// Where a rendered recipe came from; decides how a delete is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeOrigin {
    Local,
    Remote,
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    pub image: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

impl NewRecipe {
    /// Builds a request from raw form text. Multi-line fields are split per
    /// line and each line is trimmed. Blank lines are kept as empty entries.
    pub fn from_form_text(
        name: &str,
        image: &str,
        ingredients: &str,
        instructions: &str,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            image: image.trim().to_string(),
            ingredients: split_lines(ingredients),
            instructions: split_lines(instructions),
        }
    }
}

fn split_lines(raw: &str) -> Vec<String> {
    raw.split('\n').map(|line| line.trim().to_string()).collect()
}
