//! # CODEOWNERS
//!
//! Parser and matcher for `CODEOWNERS` files.
//!
//! ## Format
//!
//! ```text
//! # comment
//! *               @org/maintainers
//! /data/tokens/   @org/tokens
//! *.md            @docs-team  docs@example.com
//! /data/legacy
//! ```
//!
//! The first token of a line is the pattern; the remaining tokens are
//! owners. A pattern is translated into one or two globs:
//!
//! - leading `/` or an inner `/` anchors it to the root, otherwise it may
//!   match at any depth (`**/` is prepended);
//! - a trailing `/` restricts it to the contents of a directory;
//! - any match also owns everything below it (`/**` is appended).

use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use thiserror::Error;

use crate::OwnershipResolver;

/// Locations searched for a CODEOWNERS file, relative to each candidate root.
pub const CODEOWNERS_LOCATIONS: [&str; 4] = [
    "CODEOWNERS",
    ".github/CODEOWNERS",
    ".gitlab/CODEOWNERS",
    "docs/CODEOWNERS",
];

/// Error loading a CODEOWNERS file.
#[derive(Error, Debug)]
pub enum CodeownersError {
    /// No CODEOWNERS file in `start` or any of its ancestors.
    #[error("could not find a CODEOWNERS file in \"{}\" or its parents", start.display())]
    NotFound {
        /// Directory the search started from.
        start: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("\"{}\" cannot be read: {source}", path.display())]
    Unreadable {
        /// CODEOWNERS path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A pattern could not be compiled.
    #[error("invalid CODEOWNERS pattern \"{pattern}\" on line {line}: {source}")]
    InvalidPattern {
        /// 1-based line number.
        line: usize,
        /// Pattern as written.
        pattern: String,
        /// Glob compiler error.
        source: globset::Error,
    },
}

#[derive(Debug)]
struct Rule {
    line: usize,
    pattern: String,
    matcher: GlobSet,
    owners: Vec<String>,
}

/// A parsed CODEOWNERS file bound to the root its patterns are relative to.
#[derive(Debug)]
pub struct CodeOwners {
    root: PathBuf,
    rules: Vec<Rule>,
    /// Anchors relative lookups when the root was found above the start.
    cwd: Option<PathBuf>,
}

impl CodeOwners {
    /// Find and load the nearest CODEOWNERS file, searching `start` and then
    /// each real parent directory. Patterns are relative to the directory
    /// the file was found for, also when it sits in `.github/`, `.gitlab/`
    /// or `docs/`.
    ///
    /// # Errors
    ///
    /// [`CodeownersError::NotFound`] if no candidate exists, or any load error.
    pub fn discover(start: &Path) -> Result<Self, CodeownersError> {
        let canonical = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
        for (depth, dir) in canonical.ancestors().enumerate() {
            for location in CODEOWNERS_LOCATIONS {
                let candidate = dir.join(location);
                if !candidate.is_file() {
                    continue;
                }
                tracing::debug!(path = %candidate.display(), depth, "found CODEOWNERS");
                // Found at the start: keep the caller's spelling so its paths strip cleanly.
                if depth == 0 {
                    return Self::from_file(&candidate, start);
                }
                let mut owners = Self::from_file(&candidate, dir)?;
                owners.cwd = std::env::current_dir().ok();
                return Ok(owners);
            }
        }
        Err(CodeownersError::NotFound {
            start: start.to_path_buf(),
        })
    }

    /// Load a specific CODEOWNERS file with patterns relative to `root`,
    /// normally the repository root.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or holds an invalid pattern.
    pub fn from_file(path: &Path, root: impl Into<PathBuf>) -> Result<Self, CodeownersError> {
        let contents = std::fs::read_to_string(path).map_err(|source| {
            CodeownersError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::parse(&contents, root)
    }

    /// Parse CODEOWNERS contents with patterns relative to `root`.
    ///
    /// # Errors
    ///
    /// [`CodeownersError::InvalidPattern`] for the first pattern that does
    /// not compile.
    pub fn parse(contents: &str, root: impl Into<PathBuf>) -> Result<Self, CodeownersError> {
        let mut rules = Vec::new();
        for (index, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let Some(pattern) = tokens.next() else {
                continue;
            };
            let owners = tokens.map(str::to_string).collect();
            let matcher = compile_pattern(pattern).map_err(|source| {
                CodeownersError::InvalidPattern {
                    line: index + 1,
                    pattern: pattern.to_string(),
                    source,
                }
            })?;
            rules.push(Rule {
                line: index + 1,
                pattern: pattern.to_string(),
                matcher,
                owners,
            });
        }

        let root = root.into();
        tracing::debug!(root = %root.display(), rules = rules.len(), "parsed CODEOWNERS");
        Ok(Self {
            root,
            rules,
            cwd: None,
        })
    }

    /// Directory the patterns are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the file holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn last_match(&self, path: &Path) -> Option<&Rule> {
        let anchored;
        let path = match &self.cwd {
            Some(cwd) if path.is_relative() => {
                anchored = cwd.join(path);
                anchored.as_path()
            }
            _ => path,
        };
        let relative = relative_slash_path(path, &self.root);
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matcher.is_match(&relative))
    }
}

impl OwnershipResolver for CodeOwners {
    fn owners_of(&self, path: &Path) -> &[String] {
        match self.last_match(path) {
            Some(rule) => {
                tracing::trace!(
                    path = %path.display(),
                    line = rule.line,
                    pattern = %rule.pattern,
                    "matched CODEOWNERS rule"
                );
                &rule.owners
            }
            None => &[],
        }
    }
}

/// `path` relative to `root`, with `/` separators and no `./` segments.
fn relative_slash_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn compile_pattern(pattern: &str) -> Result<GlobSet, globset::Error> {
    let dir_only = pattern.ends_with('/');
    let trimmed = pattern.trim_end_matches('/');
    let anchored = trimmed.starts_with('/') || trimmed.contains('/');
    let body = trimmed.trim_start_matches('/');

    let globs: Vec<String> = if body.is_empty() {
        vec!["**".to_string()]
    } else {
        let base = if anchored {
            body.to_string()
        } else {
            format!("**/{body}")
        };
        if dir_only {
            vec![format!("{base}/**")]
        } else {
            vec![format!("{base}/**"), base]
        }
    };

    let mut builder = GlobSetBuilder::new();
    for glob in globs {
        builder.add(GlobBuilder::new(&glob).literal_separator(true).build()?);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owners(co: &CodeOwners, path: &str) -> Vec<String> {
        co.owners_of(Path::new(path)).to_vec()
    }

    #[test]
    fn star_owns_everything() {
        let co = CodeOwners::parse("* @org/all", "/repo").unwrap();
        assert_eq!(owners(&co, "/repo/data/a.json"), vec!["@org/all"]);
        assert_eq!(owners(&co, "/repo/data"), vec!["@org/all"]);
        assert_eq!(owners(&co, "/repo/data/0xabc/deep/b.json"), vec!["@org/all"]);
    }

    #[test]
    fn last_matching_rule_wins() {
        let co = CodeOwners::parse(
            "* @org/all\n/data/tokens/ @org/tokens\n",
            "/repo",
        )
        .unwrap();
        assert_eq!(owners(&co, "/repo/data/tokens/t.json"), vec!["@org/tokens"]);
        assert_eq!(owners(&co, "/repo/data/other.json"), vec!["@org/all"]);
    }

    #[test]
    fn trailing_slash_matches_contents_not_directory_itself() {
        let co = CodeOwners::parse("/data/tokens/ @org/tokens", "/repo").unwrap();
        assert!(owners(&co, "/repo/data/tokens").is_empty());
        assert_eq!(owners(&co, "/repo/data/tokens/x/y.json"), vec!["@org/tokens"]);
    }

    #[test]
    fn unanchored_pattern_matches_at_any_depth() {
        let co = CodeOwners::parse("*.md @docs\nlogo.png @design", "/repo").unwrap();
        assert_eq!(owners(&co, "/repo/README.md"), vec!["@docs"]);
        assert_eq!(owners(&co, "/repo/data/nested/notes.md"), vec!["@docs"]);
        assert_eq!(owners(&co, "/repo/data/x/logo.png"), vec!["@design"]);
        assert!(owners(&co, "/repo/data/a.json").is_empty());
    }

    #[test]
    fn anchored_pattern_only_matches_from_root() {
        let co = CodeOwners::parse("data/a.json @a", "/repo").unwrap();
        assert_eq!(owners(&co, "/repo/data/a.json"), vec!["@a"]);
        assert!(owners(&co, "/repo/other/data/a.json").is_empty());
    }

    #[test]
    fn single_star_does_not_cross_directories_but_owns_matched_dirs() {
        let co = CodeOwners::parse("/data/* @d", "/repo").unwrap();
        assert_eq!(owners(&co, "/repo/data/a.json"), vec!["@d"]);
        // `data/sub` matches, so its contents are owned too.
        assert_eq!(owners(&co, "/repo/data/sub/b.json"), vec!["@d"]);
        assert!(owners(&co, "/repo/data").is_empty());
    }

    #[test]
    fn rule_without_owners_unassigns() {
        let co = CodeOwners::parse("* @org/all\n/data/legacy\n", "/repo").unwrap();
        assert!(owners(&co, "/repo/data/legacy/old.json").is_empty());
        assert_eq!(owners(&co, "/repo/data/current.json"), vec!["@org/all"]);
    }

    #[test]
    fn comments_blank_lines_and_multiple_owners() {
        let co = CodeOwners::parse(
            "# owners\n\n   \n/data/ @a @b  team@example.com\n",
            "/repo",
        )
        .unwrap();
        assert_eq!(co.len(), 1);
        assert_eq!(
            owners(&co, "/repo/data/x.json"),
            vec!["@a", "@b", "team@example.com"]
        );
    }

    #[test]
    fn relative_paths_are_matched_as_is() {
        let co = CodeOwners::parse("/data/ @d", "/repo").unwrap();
        assert_eq!(owners(&co, "data/x.json"), vec!["@d"]);
        assert_eq!(owners(&co, "./data/x.json"), vec!["@d"]);
    }

    #[test]
    fn invalid_pattern_reports_line() {
        let err = CodeOwners::parse("* @a\n/data/[ @b\n", "/repo").unwrap_err();
        match err {
            CodeownersError::InvalidPattern { line, pattern, .. } => {
                assert_eq!(line, 2);
                assert_eq!(pattern, "/data/[");
            }
            other => panic!("expected InvalidPattern, got: {other}"),
        }
    }

    #[test]
    fn discover_prefers_root_file_and_sets_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".github")).unwrap();
        std::fs::write(dir.path().join(".github/CODEOWNERS"), "* @github").unwrap();
        std::fs::write(dir.path().join("CODEOWNERS"), "* @root").unwrap();

        let co = CodeOwners::discover(dir.path()).unwrap();
        assert_eq!(co.root(), dir.path());
        assert_eq!(owners(&co, &dir.path().join("x").display().to_string()), vec!["@root"]);
    }

    #[test]
    fn discover_nested_location_uses_repository_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".github")).unwrap();
        std::fs::write(dir.path().join(".github/CODEOWNERS"), "/data/ @d").unwrap();
        std::fs::create_dir_all(dir.path().join("data/sub")).unwrap();
        let root = dir.path().canonicalize().unwrap();

        let co = CodeOwners::discover(&dir.path().join("data/sub")).unwrap();
        assert_eq!(co.root(), root);
        assert_eq!(
            co.owners_of(&root.join("data/sub/a.json")).to_vec(),
            vec!["@d".to_string()]
        );
    }

    #[cfg(unix)]
    #[test]
    fn discover_walks_real_parents_of_a_linked_start() {
        let repo = tempfile::tempdir().unwrap();
        std::fs::write(repo.path().join("CODEOWNERS"), "/data/ @d").unwrap();
        std::fs::create_dir_all(repo.path().join("data")).unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let link = elsewhere.path().join("data");
        std::os::unix::fs::symlink(repo.path().join("data"), &link).unwrap();

        // Lexical ancestors of `link` never reach the repository.
        let co = CodeOwners::discover(&link).unwrap();
        let root = repo.path().canonicalize().unwrap();
        assert_eq!(co.root(), root);
        assert_eq!(owners(&co, &root.join("data/a.json").display().to_string()), vec!["@d"]);
    }

    #[test]
    fn relative_paths_resolve_against_working_directory_when_root_is_above() {
        let mut co = CodeOwners::parse("/data/ @d", "/repo").unwrap();
        co.cwd = Some(PathBuf::from("/repo"));
        assert_eq!(owners(&co, "data/x.json"), vec!["@d"]);

        co.cwd = Some(PathBuf::from("/repo/nested"));
        assert!(owners(&co, "data/x.json").is_empty());
        // Absolute paths ignore the working directory.
        assert_eq!(owners(&co, "/repo/data/x.json"), vec!["@d"]);
    }

    #[test]
    fn explicit_file_matches_relative_to_given_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        let file = dir.path().join("config/CODEOWNERS");
        std::fs::write(&file, "/data/ @team").unwrap();

        let co = CodeOwners::from_file(&file, dir.path()).unwrap();
        assert_eq!(co.root(), dir.path());
        assert_eq!(
            owners(&co, &dir.path().join("data/a.json").display().to_string()),
            vec!["@team"]
        );
        assert!(owners(&co, &dir.path().join("config/data/a.json").display().to_string()).is_empty());
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("CODEOWNERS");
        let err = CodeOwners::from_file(&file, dir.path()).unwrap_err();
        assert!(matches!(&err, CodeownersError::Unreadable { path, .. } if *path == file));
        assert!(err.to_string().contains("cannot be read"));
    }
}
