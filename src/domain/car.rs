// Car domain model
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Car {
    pub id: String,
    pub name: String,
}

impl Car {
    pub fn new(id: String) -> Self {
        let name = Self::format_name(&id);
        Self { id, name }
    }

    pub fn with_name(id: String, name: String) -> Self {
        Self { id, name }
    }

    fn format_name(id: &str) -> String {
        // Convert "Red_Bull_" to "Red Bull"
        id.trim_end_matches('_').replace('_', " ")
    }
}
