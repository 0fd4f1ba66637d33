//! Node identity - when two detections mean the same node

/// Composite identity of a derived node: its label set plus the fields
/// that distinguish it from every other node of that kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeIdentity {
    /// Labels in application order, primary label first
    pub labels: Vec<String>,
    /// Identity-defining fields, in kind order
    pub fields: Vec<(String, String)>,
}

impl NodeIdentity {
    pub fn new(labels: Vec<String>, fields: Vec<(String, String)>) -> Self {
        Self { labels, fields }
    }

    /// Render this identity to its canonical key string.
    ///
    /// With `match_labels` the label set participates; without it only the
    /// identity fields do, so `Paris (Location)` and `Paris (Person)`
    /// collapse into one node. Components are joined with the unit
    /// separator so field values cannot collide with the joiner.
    pub fn canonical_key(&self, match_labels: bool) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if match_labels {
            for label in &self.labels {
                parts.push(label);
            }
        }
        for (name, value) in &self.fields {
            parts.push(name);
            parts.push(value);
        }
        parts.join("\u{1f}")
    }
}

/// Turn a raw provider type tag into a node label.
///
/// Splits on underscores and whitespace and title-cases each segment:
/// `proper_noun` becomes `ProperNoun`, `OTHER` becomes `Other`.
pub fn type_label(raw: &str) -> String {
    raw.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect()
}
