//! Declarative repository list parsing.
//!
//! One record per line: `owner/name [destination]`. Blank lines and lines
//! whose first non-whitespace byte is `#` are skipped. The first run of
//! whitespace splits the identifier from the destination; the destination is
//! trimmed but not further tokenized. A missing destination defaults to
//! `<default>/<name>`.
//!
//! Malformed identifiers are reported per line and parsing continues -
//! best-effort batch semantics, never short-circuiting.

use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

fn repo_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._-]+/[A-Za-z0-9._-]+$").expect("repo id pattern")
    })
}

/// Per-line parse failures. Non-fatal: the batch continues past them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("line {line}: '{token}' is not a valid owner/name identifier")]
    InvalidFormat { line: usize, token: String },
}

/// A validated `owner/name` repository identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    /// Parses and validates an `owner/name` token.
    pub fn parse(token: &str) -> Option<Self> {
        if !repo_id_pattern().is_match(token) {
            return None;
        }
        let (owner, name) = token.split_once('/')?;
        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Case-insensitive identity comparison, matching GitHub's handling of
    /// owner and repository names.
    pub fn matches(&self, other: &RepoId) -> bool {
        self.owner.eq_ignore_ascii_case(&other.owner)
            && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// One line of desired state: which repository belongs at which path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRecord {
    pub id: RepoId,
    pub dest: PathBuf,
}

/// Lazily parses the repository list.
///
/// Pure and restartable: parsing the same text twice yields identical
/// sequences. Items are `Err` for lines carrying a malformed identifier;
/// callers report those and keep going.
pub fn parse<'a>(
    text: &'a str,
    default_destination: &'a Path,
) -> impl Iterator<Item = Result<RepoRecord, RecordError>> + 'a {
    text.lines().enumerate().filter_map(move |(index, raw)| {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (token, rest) = match line.split_once(|c: char| c.is_whitespace()) {
            Some((token, rest)) => (token, rest.trim()),
            None => (line, ""),
        };

        let Some(id) = RepoId::parse(token) else {
            return Some(Err(RecordError::InvalidFormat {
                line: index + 1,
                token: token.to_string(),
            }));
        };

        let dest = if rest.is_empty() {
            default_destination.join(&id.name)
        } else {
            PathBuf::from(shellexpand::tilde(rest).into_owned())
        };

        Some(Ok(RepoRecord { id, dest }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DEFAULT: &str = "./repositories";

    fn parse_all(text: &str) -> Vec<Result<RepoRecord, RecordError>> {
        parse(text, Path::new(DEFAULT)).collect()
    }

    #[test]
    fn comments_and_blanks_never_produce_records() {
        let text = "# header comment\n\n   \n  # indented comment\n";
        assert!(parse_all(text).is_empty());
    }

    #[test]
    fn default_destination_uses_repo_name() {
        let records = parse_all("acme/widgets\n");
        assert_eq!(
            records,
            vec![Ok(RepoRecord {
                id: RepoId::parse("acme/widgets").unwrap(),
                dest: PathBuf::from("./repositories/widgets"),
            })]
        );
    }

    #[test]
    fn explicit_destination_is_trimmed_not_tokenized() {
        let records = parse_all("acme/widgets   ./code/my widgets  \n");
        let record = records[0].as_ref().unwrap();
        // Embedded spaces pass through; quoting is not interpreted.
        assert_eq!(record.dest, PathBuf::from("./code/my widgets"));
    }

    #[test]
    fn tabs_split_like_spaces() {
        let records = parse_all("acme/widgets\t./code/widgets\n");
        assert_eq!(
            records[0].as_ref().unwrap().dest,
            PathBuf::from("./code/widgets")
        );
    }

    #[test]
    fn malformed_identifier_is_reported_and_batch_continues() {
        let text = "acme/widgets\nnot a repo\nacme/gadgets extra/dest\nowner//name\n";
        let results = parse_all(text);
        assert_eq!(results.len(), 4);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1],
            Err(RecordError::InvalidFormat {
                line: 2,
                token: "not".to_string(),
            })
        );
        assert!(results[2].is_ok());
        assert!(results[3].is_err());
    }

    #[test]
    fn identifier_charset_is_enforced() {
        assert!(RepoId::parse("acme/widgets").is_some());
        assert!(RepoId::parse("a.b-c_d/w.x-y_z9").is_some());
        assert!(RepoId::parse("acme").is_none());
        assert!(RepoId::parse("acme/w idgets").is_none());
        assert!(RepoId::parse("acme/widgets/extra").is_none());
        assert!(RepoId::parse("ac me/widgets").is_none());
        assert!(RepoId::parse("").is_none());
    }

    #[test]
    fn identity_comparison_is_case_insensitive() {
        let a = RepoId::parse("Acme/Widgets").unwrap();
        let b = RepoId::parse("acme/widgets").unwrap();
        assert!(a.matches(&b));
        assert!(!a.matches(&RepoId::parse("acme/other").unwrap()));
    }

    #[test]
    fn reparsing_is_deterministic() {
        let text = "acme/widgets\nbad line\nacme/gadgets ./g\n";
        assert_eq!(parse_all(text), parse_all(text));
    }

    proptest! {
        /// The parser never panics and stays deterministic on arbitrary input.
        #[test]
        fn parser_total_on_arbitrary_input(text in "\\PC{0,200}") {
            let first = parse_all(&text);
            let second = parse_all(&text);
            prop_assert_eq!(first, second);
        }

        /// Every Ok record carries a validated identifier.
        #[test]
        fn ok_records_always_validate(text in "[a-zA-Z0-9._/ #-]{0,120}") {
            for item in parse_all(&text).into_iter().flatten() {
                prop_assert!(RepoId::parse(&item.id.to_string()).is_some());
            }
        }
    }
}
