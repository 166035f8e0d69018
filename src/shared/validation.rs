use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for gallery category slugs
    /// Lowercase words joined by single underscores
    /// - Valid: "equipos_de_rescate", "cursos", "aula_2"
    /// - Invalid: "_cursos", "cursos_", "Cursos", "equipos de rescate"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[^\s_A-Z]+(?:_[^\s_A-Z]+)*$").unwrap();

    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Derive a category slug from its display name: trimmed, lowercased and
/// with every run of whitespace replaced by a single underscore.
pub fn slugify(name: &str) -> String {
    WHITESPACE_RUN
        .replace_all(name.trim(), "_")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_lowercases_and_joins_with_underscores() {
        assert_eq!(slugify("Equipos de Rescate"), "equipos_de_rescate");
        assert_eq!(slugify("Cursos"), "cursos");
        assert_eq!(slugify("  Aula   Principal "), "aula_principal");
        assert_eq!(slugify("Primeros\tAuxilios"), "primeros_auxilios");
    }

    #[test]
    fn test_slugify_keeps_accents() {
        assert_eq!(slugify("Capacitación Técnica"), "capacitación_técnica");
    }

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("equipos_de_rescate"));
        assert!(SLUG_REGEX.is_match("cursos"));
        assert!(SLUG_REGEX.is_match("aula_2"));
        assert!(SLUG_REGEX.is_match(&slugify("Capacitación Técnica")));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("_cursos")); // leading underscore
        assert!(!SLUG_REGEX.is_match("cursos_")); // trailing underscore
        assert!(!SLUG_REGEX.is_match("a__b")); // double underscore
        assert!(!SLUG_REGEX.is_match("Cursos")); // uppercase
        assert!(!SLUG_REGEX.is_match("equipos de rescate")); // space
        assert!(!SLUG_REGEX.is_match("")); // empty
    }
}
