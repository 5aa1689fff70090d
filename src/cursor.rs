//! Cursor name allocation.

use uuid::Uuid;

/// Prefix shared by all generated cursor names.
pub const CURSOR_NAME_PREFIX: &str = "streamer_cursor_";

/// Source of the cursor identifier for one streaming execution.
///
/// The default generates a fresh, probabilistically unique name per run.
/// A fixed name disables that guarantee; uniqueness among cursors open in
/// the same transaction is then the caller's responsibility.
#[derive(Debug, Clone, Default)]
pub enum CursorName {
    #[default]
    Generated,
    Fixed(String),
}

impl CursorName {
    pub(crate) fn resolve(&self) -> String {
        match self {
            CursorName::Generated => generate(),
            CursorName::Fixed(name) => name.clone(),
        }
    }
}

/// Generate a cursor name that is a valid SQL identifier.
///
/// The UUID's hyphens are replaced with underscores to satisfy identifier
/// syntax.
pub fn generate() -> String {
    format!(
        "{CURSOR_NAME_PREFIX}{}",
        Uuid::new_v4().to_string().replace('-', "_")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_name_is_a_valid_identifier() {
        let name = generate();
        assert!(name.starts_with(CURSOR_NAME_PREFIX));
        assert!(
            name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
            "{name}"
        );
    }

    #[test]
    fn generated_names_do_not_repeat() {
        let names: HashSet<String> = (0..1000).map(|_| generate()).collect();
        assert_eq!(names.len(), 1000);
    }

    #[test]
    fn fixed_name_resolves_verbatim() {
        let name = CursorName::Fixed("my_cursor".into());
        assert_eq!(name.resolve(), "my_cursor");
        // A fixed name stays stable across resolutions.
        assert_eq!(name.resolve(), "my_cursor");
    }
}
