use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub background: String,
    pub link_color: String,
    pub label_background: String,
    pub label_text: String,
    pub node_fallback_color: String,
    pub debug_colliding: String,
    pub debug_clear: String,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            background: "#111827".to_string(),
            link_color: "rgba(255, 255, 255, 0.2)".to_string(),
            label_background: "rgba(0, 0, 0, 0.6)".to_string(),
            label_text: "white".to_string(),
            node_fallback_color: "#6B7280".to_string(),
            debug_colliding: "rgba(255, 0, 0, 0.5)".to_string(),
            debug_clear: "rgba(0, 255, 0, 0.5)".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
