use std::fmt;
use std::hash::{Hash, Hasher};

/// A channel or participant name that compares case-insensitively.
///
/// Folding follows RFC 1459 on top of full Unicode lowercasing: letters are
/// lowercased and `[]\~` are treated as the lowercase forms of `{}|^`. The original spelling is kept
/// for display.
#[derive(Debug, Clone)]
pub struct Identifier {
    raw: String,
    folded: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        let raw = name.into();
        let folded = fold(&raw);
        Self { raw, folded }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn fold(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            '[' => '{',
            ']' => '}',
            '\\' => '|',
            '~' => '^',
            c => c,
        })
        .collect()
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_ascii_case_is_ignored() {
        assert_eq!(Identifier::new("Alice"), Identifier::new("aLICE"));
        assert_ne!(Identifier::new("alice"), Identifier::new("alicia"));
    }

    #[test]
    fn test_rfc1459_brackets_fold() {
        assert_eq!(Identifier::new("[Bot]~"), Identifier::new("{bot}^"));
        assert_eq!(Identifier::new("a\\b"), Identifier::new("A|B"));
    }

    #[test]
    fn test_non_ascii_letters_fold() {
        assert_eq!(Identifier::new("Ärger"), Identifier::new("ärger"));
        assert_eq!(Identifier::new("ΣΩΚΡΑΤΗΣ"), Identifier::new("σωκρατησ"));
        assert_ne!(Identifier::new("ärger"), Identifier::new("arger"));
    }

    #[test]
    fn test_display_keeps_original_spelling() {
        let id = Identifier::new("#RustLang");
        assert_eq!(id.to_string(), "#RustLang");
        assert_eq!(id, Identifier::new("#rustlang"));
    }

    #[test]
    fn test_usable_as_map_key() {
        let mut map = HashMap::new();
        map.insert(Identifier::new("Bob"), 1);
        assert_eq!(map.get(&Identifier::new("BOB")), Some(&1));
    }
}
