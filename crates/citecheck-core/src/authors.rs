use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::NoAuthorMatch;

/// Surname: capital letter, lowercase rest, optional hyphenated parts ("Петров-Водкин").
const SURNAME: &str = r"\p{Lu}\p{Ll}+(?:-\p{Lu}?\p{Ll}+)*";

/// Splits a single author fragment into initials and surname.
///
/// Two accepted shapes, tried left to right at each position:
/// - initials first: `И.П. Иванов`, `И. Иванов`, `J.Smith`
/// - surname first: `Иванов И.П.`, `Иванов, И.`, `Smith J`
static SPLIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?:(?P<f>\p{{Lu}})\.?\s?(?:(?P<m>\p{{Lu}})\.?\s?)?(?P<l>{s}))|(?:(?P<l2>{s}),?\s(?P<f2>\p{{Lu}})\.?(?:\s?(?P<m2>\p{{Lu}})\.)?)",
        s = SURNAME
    ))
    .unwrap()
});

/// Finds author-looking fragments anywhere in a bibliography entry.
static DETECT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?:{s}[,.]?(?:\s?\p{{Lu}}\.){{1,2}})|(?:(?:\p{{Lu}}\.\s?){{1,2}}\s?{s})",
        s = SURNAME
    ))
    .unwrap()
});

/// A parsed author name.
///
/// Equality, hashing and ordering all go through `(surname, first_name,
/// middle_name)`, so two textual variants of one name collapse to one set member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Author {
    pub surname: String,
    pub first_name: String,
    pub middle_name: Option<String>,
}

impl Author {
    /// Parse a short fragment believed to name one author.
    pub fn parse(fragment: &str) -> Result<Self, NoAuthorMatch> {
        let caps = SPLIT_RE
            .captures(fragment)
            .ok_or_else(|| NoAuthorMatch(fragment.to_string()))?;

        let (surname, first, middle) = if caps.name("l").is_some() {
            (caps.name("l"), caps.name("f"), caps.name("m"))
        } else {
            (caps.name("l2"), caps.name("f2"), caps.name("m2"))
        };

        match (surname, first) {
            (Some(surname), Some(first)) => Ok(Self {
                surname: surname.as_str().to_string(),
                first_name: first.as_str().to_string(),
                middle_name: middle.map(|m| m.as_str().to_string()),
            }),
            _ => Err(NoAuthorMatch(fragment.to_string())),
        }
    }

    /// Every rendering under which this author may be cited in running text.
    pub fn surface_forms(&self) -> Vec<String> {
        let f = &self.first_name;
        let l = &self.surname;
        match &self.middle_name {
            None => vec![
                format!("{f}.{l}"),
                format!("{f}. {l}"),
                format!("{l} {f}."),
                format!("{l}, {f}."),
            ],
            Some(m) => vec![
                format!("{f}.{m}.{l}"),
                format!("{f}. {m}. {l}"),
                format!("{f}.{m}. {l}"),
                format!("{l} {f}.{m}."),
                format!("{l} {f}. {m}."),
                format!("{l}, {f}.{m}"),
                format!("{l}, {f}. {m}."),
            ],
        }
    }

    /// True if any surface form occurs verbatim in `text`.
    pub fn matches_in(&self, text: &str) -> bool {
        self.surface_forms().iter().any(|form| text.contains(form.as_str()))
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.middle_name {
            Some(m) => write!(f, "{} {}.{}.", self.surname, self.first_name, m),
            None => write!(f, "{} {}.", self.surname, self.first_name),
        }
    }
}

/// Find the author-looking fragments of a bibliography entry.
pub fn find_author_fragments(text: &str) -> Vec<&str> {
    DETECT_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Detect and parse every author in `text`, dropping fragments that do not parse.
pub fn parse_authors(text: &str) -> BTreeSet<Author> {
    let mut authors = BTreeSet::new();
    for fragment in find_author_fragments(text) {
        match Author::parse(fragment) {
            Ok(author) => {
                authors.insert(author);
            }
            Err(e) => tracing::debug!(error = %e, "dropping author fragment"),
        }
    }
    authors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(surname: &str, first: &str, middle: Option<&str>) -> Author {
        Author {
            surname: surname.to_string(),
            first_name: first.to_string(),
            middle_name: middle.map(|m| m.to_string()),
        }
    }

    #[test]
    fn test_parse_surname_first() {
        let a = Author::parse("Иванов И.П.").unwrap();
        assert_eq!(a, author("Иванов", "И", Some("П")));
    }

    #[test]
    fn test_parse_initials_first() {
        assert_eq!(
            Author::parse("И.П. Иванов").unwrap(),
            author("Иванов", "И", Some("П"))
        );
        assert_eq!(Author::parse("И. Иванов").unwrap(), author("Иванов", "И", None));
        assert_eq!(Author::parse("J.Smith").unwrap(), author("Smith", "J", None));
    }

    #[test]
    fn test_parse_surname_comma_initial() {
        assert_eq!(Author::parse("Петров, А.").unwrap(), author("Петров", "А", None));
        assert_eq!(
            Author::parse("Smith J.A.").unwrap(),
            author("Smith", "J", Some("A"))
        );
    }

    #[test]
    fn test_parse_hyphenated_surname() {
        assert_eq!(
            Author::parse("Петров-Водкин К.С.").unwrap(),
            author("Петров-Водкин", "К", Some("С"))
        );
    }

    #[test]
    fn test_parse_failure() {
        assert!(Author::parse("Иванов").is_err());
        assert!(Author::parse("название книги").is_err());
        assert!(Author::parse("").is_err());
    }

    #[test]
    fn test_surface_forms_round_trip() {
        let a = Author::parse("Иванов И.П.").unwrap();
        let forms = a.surface_forms();
        assert_eq!(forms.len(), 7);
        assert!(forms.contains(&"Иванов И.П.".to_string()), "{forms:?}");
        assert!(forms.contains(&"И.П. Иванов".to_string()), "{forms:?}");
    }

    #[test]
    fn test_surface_forms_without_middle() {
        let forms = author("Smith", "J", None).surface_forms();
        assert_eq!(forms, vec!["J.Smith", "J. Smith", "Smith J.", "Smith, J."]);
    }

    #[test]
    fn test_matches_in() {
        let a = author("Иванов", "И", Some("П"));
        assert!(a.matches_in("как отмечает И. П. Иванов, данный подход"));
        assert!(a.matches_in("(Иванов И.П., 2010)"));
        assert!(!a.matches_in("Иванов писал об этом"));
    }

    #[test]
    fn test_variants_collapse_in_set() {
        let set = parse_authors("Иванов И.П., И.П. Иванов, Иванов, И.П.");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_parse_authors_from_entry() {
        let set = parse_authors("Иванов И.П., Петров А.С. Теория систем. М.: Наука, 2010. 320 с.");
        assert_eq!(set.len(), 2);
        assert!(set.contains(&author("Иванов", "И", Some("П"))));
        assert!(set.contains(&author("Петров", "А", Some("С"))));
    }

    #[test]
    fn test_parse_authors_none() {
        assert!(parse_authors("Федеральный закон от 27.07.2006 № 152-ФЗ").is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(author("Иванов", "И", Some("П")).to_string(), "Иванов И.П.");
        assert_eq!(author("Smith", "J", None).to_string(), "Smith J.");
    }
}
