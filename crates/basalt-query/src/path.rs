use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of an attribute path.
///
/// `expanded` marks the step as array-flattening: the value reached at
/// `name` is an array and every element continues the path separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathSegment {
    pub name: String,
    #[serde(default)]
    pub expanded: bool,
}

/// A dotted path addressing into a nested document.
///
/// The textual form uses `[]` steps for expansion:
/// - `"status"` — top-level attribute
/// - `"address.city"` — nested attribute
/// - `"tags.[]"` — every element of the `tags` array
/// - `"items.[].sku"` — `sku` of every element of `items`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributePath {
    pub segments: Vec<PathSegment>,
}

impl AttributePath {
    pub fn parse(path: &str) -> Self {
        let mut segments: Vec<PathSegment> = Vec::new();
        for part in path.split('.') {
            if part == "[]" {
                if let Some(last) = segments.last_mut() {
                    last.expanded = true;
                }
            } else {
                segments.push(PathSegment {
                    name: part.to_string(),
                    expanded: false,
                });
            }
        }
        Self { segments }
    }

    pub fn has_expansion(&self) -> bool {
        self.segments.iter().any(|s| s.expanded)
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment.name)?;
            if segment.expanded {
                write!(f, ".[]")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_path() {
        let path = AttributePath::parse("address.city");
        assert_eq!(path.segments.len(), 2);
        assert_eq!(path.segments[0].name, "address");
        assert!(!path.segments[0].expanded);
        assert!(!path.has_expansion());
    }

    #[test]
    fn parse_expanded_path() {
        let path = AttributePath::parse("items.[].sku");
        assert_eq!(path.segments.len(), 2);
        assert!(path.segments[0].expanded);
        assert!(!path.segments[1].expanded);
        assert!(path.has_expansion());
    }

    #[test]
    fn parse_trailing_expansion() {
        let path = AttributePath::parse("tags.[]");
        assert_eq!(path.segments.len(), 1);
        assert!(path.segments[0].expanded);
    }

    #[test]
    fn display_roundtrip() {
        for text in ["status", "address.city", "tags.[]", "items.[].sku"] {
            assert_eq!(AttributePath::parse(text).to_string(), text);
        }
    }

    #[test]
    fn expansion_distinguishes_paths() {
        assert_ne!(AttributePath::parse("tags"), AttributePath::parse("tags.[]"));
    }
}
