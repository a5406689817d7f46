use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Slug derived from the name: lowercase, non-word characters stripped,
/// whitespace collapsed to single hyphens.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true;
    for c in name.trim().to_lowercase().chars() {
        if c.is_alphanumeric() || c == '_' {
            slug.push(c);
            last_was_hyphen = false;
        } else if (c.is_whitespace() || c == '-') && !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Science Fiction"), "science-fiction");
    }

    #[test]
    fn strips_special_characters() {
        assert_eq!(slugify("Sci-Fi & Fantasy!"), "sci-fi-fantasy");
    }

    #[test]
    fn collapses_repeated_separators() {
        assert_eq!(slugify("a   b --- c"), "a-b-c");
    }

    #[test]
    fn trims_edges() {
        assert_eq!(slugify("  History  "), "history");
    }

    #[test]
    fn keeps_underscores_and_digits() {
        assert_eq!(slugify("Top_10 Picks"), "top_10-picks");
    }
}
