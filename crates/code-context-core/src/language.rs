//! Language families and their structural boundary patterns.
//!
//! Each supported language family owns an ordered list of
//! [`BoundaryPattern`]s. The chunker tests every line against the
//! family's list; the first matching pattern wins, which makes the
//! ordering within each list the tie-break rule.
//!
//! Unknown language tags fall back to [`LanguageFamily::Generic`],
//! whose patterns cover the common `function`/`def`/`fn`/`class`
//! keywords, so chunking never fails on an unrecognized language.
//!
//! Dependency and export extraction live here too: best-effort,
//! line-oriented passes that return deduplicated names and an empty
//! list when nothing is recognized.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::models::FragmentKind;

/// A single structural boundary rule: when `regex` matches a line,
/// a new fragment of `kind` opens at that line.
pub struct BoundaryPattern {
    pub regex: Regex,
    pub kind: FragmentKind,
}

impl BoundaryPattern {
    fn new(pattern: &str, kind: FragmentKind) -> Self {
        Self {
            regex: Regex::new(pattern).expect("invalid boundary pattern"),
            kind,
        }
    }
}

/// Closed set of language families with recognized boundary patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageFamily {
    /// JavaScript, TypeScript, JSX, TSX.
    EcmaScript,
    Python,
    Rust,
    Go,
    /// Fallback for unrecognized language tags.
    Generic,
}

static ECMASCRIPT_PATTERNS: Lazy<Vec<BoundaryPattern>> = Lazy::new(|| {
    vec![
        BoundaryPattern::new(
            r"^\s*(?:export\s+)?(?:declare\s+)?interface\s+\w+",
            FragmentKind::Interface,
        ),
        BoundaryPattern::new(
            r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+\w+",
            FragmentKind::Class,
        ),
        BoundaryPattern::new(
            r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*\w*",
            FragmentKind::Function,
        ),
        BoundaryPattern::new(
            r"^\s*(?:export\s+)?const\s+\w+\s*(?::[^=]+)?=\s*(?:async\s+)?\(",
            FragmentKind::Function,
        ),
    ]
});

static PYTHON_PATTERNS: Lazy<Vec<BoundaryPattern>> = Lazy::new(|| {
    vec![
        BoundaryPattern::new(r"^\s*class\s+\w+", FragmentKind::Class),
        BoundaryPattern::new(r"^\s*(?:async\s+)?def\s+\w+", FragmentKind::Function),
    ]
});

static RUST_PATTERNS: Lazy<Vec<BoundaryPattern>> = Lazy::new(|| {
    vec![
        BoundaryPattern::new(
            r"^\s*(?:pub(?:\([\w: ]+\))?\s+)?trait\s+\w+",
            FragmentKind::Interface,
        ),
        BoundaryPattern::new(
            r"^\s*(?:pub(?:\([\w: ]+\))?\s+)?(?:struct|enum)\s+\w+",
            FragmentKind::Class,
        ),
        BoundaryPattern::new(
            r"^\s*(?:pub(?:\([\w: ]+\))?\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+\S+\s+)?fn\s+\w+",
            FragmentKind::Function,
        ),
        BoundaryPattern::new(r"^\s*impl\b", FragmentKind::Block),
    ]
});

static GO_PATTERNS: Lazy<Vec<BoundaryPattern>> = Lazy::new(|| {
    vec![
        BoundaryPattern::new(r"^type\s+\w+\s+interface\b", FragmentKind::Interface),
        BoundaryPattern::new(r"^type\s+\w+\s+struct\b", FragmentKind::Class),
        BoundaryPattern::new(r"^func\b", FragmentKind::Function),
        BoundaryPattern::new(r"^type\s+\w+", FragmentKind::Block),
    ]
});

static GENERIC_PATTERNS: Lazy<Vec<BoundaryPattern>> = Lazy::new(|| {
    vec![
        BoundaryPattern::new(r"^\s*(?:export\s+)?interface\s+\w+", FragmentKind::Interface),
        BoundaryPattern::new(
            r"^\s*(?:(?:public|private|protected|abstract|export|static)\s+)*(?:class|struct)\s+\w+",
            FragmentKind::Class,
        ),
        BoundaryPattern::new(
            r"^\s*(?:(?:public|private|protected|static|export|async)\s+)*(?:function|def|fn|func)\s+\w+",
            FragmentKind::Function,
        ),
        BoundaryPattern::new(r"^\s*type\s+\w+", FragmentKind::Block),
    ]
});

impl LanguageFamily {
    /// Resolve a language tag to its family. Unknown tags map to
    /// [`LanguageFamily::Generic`] rather than failing.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "javascript" | "js" | "jsx" | "typescript" | "ts" | "tsx" => Self::EcmaScript,
            "python" | "py" => Self::Python,
            "rust" | "rs" => Self::Rust,
            "go" | "golang" => Self::Go,
            _ => Self::Generic,
        }
    }

    /// The family's boundary patterns, in priority order.
    pub fn patterns(&self) -> &'static [BoundaryPattern] {
        match self {
            Self::EcmaScript => &ECMASCRIPT_PATTERNS,
            Self::Python => &PYTHON_PATTERNS,
            Self::Rust => &RUST_PATTERNS,
            Self::Go => &GO_PATTERNS,
            Self::Generic => &GENERIC_PATTERNS,
        }
    }

    /// Test a line against the family's patterns. First match wins.
    pub fn match_boundary(&self, line: &str) -> Option<FragmentKind> {
        self.patterns()
            .iter()
            .find(|p| p.regex.is_match(line))
            .map(|p| p.kind)
    }
}

static ES_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:import|export)\s+.*?from\s+['"]([^'"]+)['"]"#).unwrap());
static ES_REQUIRE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"require\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap());
static PY_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*import\s+([\w.]+)").unwrap());
static PY_FROM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*from\s+([\w.]+)\s+import").unwrap());
static RUST_USE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*use\s+([A-Za-z_]\w*)").unwrap());
static GO_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*(?:import\s+)?(?:\w+\s+)?"([^"]+)"\s*$"#).unwrap());
static GENERIC_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*import\s+(\S+)").unwrap());

/// Extract imported module names from source content. Best-effort:
/// unrecognized constructs simply contribute nothing. Output is
/// deduplicated and in first-seen order.
pub fn extract_dependencies(content: &str, language: &str) -> Vec<String> {
    let family = LanguageFamily::from_tag(language);
    let mut out = Vec::new();
    let mut seen = HashSet::new();

    let mut push = |name: &str| {
        if !name.is_empty() && seen.insert(name.to_string()) {
            out.push(name.to_string());
        }
    };

    for line in content.lines() {
        match family {
            LanguageFamily::EcmaScript => {
                if let Some(cap) = ES_IMPORT.captures(line) {
                    push(&cap[1]);
                }
                if let Some(cap) = ES_REQUIRE.captures(line) {
                    push(&cap[1]);
                }
            }
            LanguageFamily::Python => {
                if let Some(cap) = PY_FROM.captures(line) {
                    push(&cap[1]);
                } else if let Some(cap) = PY_IMPORT.captures(line) {
                    push(&cap[1]);
                }
            }
            LanguageFamily::Rust => {
                if let Some(cap) = RUST_USE.captures(line) {
                    let root = &cap[1];
                    if !matches!(root, "crate" | "self" | "super") {
                        push(root);
                    }
                }
            }
            LanguageFamily::Go => {
                if let Some(cap) = GO_IMPORT.captures(line) {
                    push(&cap[1]);
                }
            }
            LanguageFamily::Generic => {
                if let Some(cap) = GENERIC_IMPORT.captures(line) {
                    push(cap[1].trim_matches(|c| c == '"' || c == '\'' || c == ';'));
                }
            }
        }
    }

    out
}

static ES_EXPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*export\s+(?:default\s+)?(?:abstract\s+)?(?:async\s+)?(?:function\s*\*?|class|interface|enum|type|const|let|var)\s+(\w+)",
    )
    .unwrap()
});
static PY_TOPLEVEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:async\s+)?(?:def|class)\s+(\w+)").unwrap());
static RUST_PUB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*pub\s+(?:async\s+)?(?:unsafe\s+)?(?:fn|struct|enum|trait|type|const|static|mod)\s+(\w+)",
    )
    .unwrap()
});
static GO_EXPORTED_FUNC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^func\s+(?:\([^)]*\)\s+)?([A-Z]\w*)").unwrap());
static GO_EXPORTED_TYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^type\s+([A-Z]\w*)").unwrap());

/// Extract exported (publicly visible) symbol names from source
/// content. Best-effort and deduplicated, like
/// [`extract_dependencies`]. The generic family exposes nothing.
pub fn extract_exports(content: &str, language: &str) -> Vec<String> {
    let family = LanguageFamily::from_tag(language);
    let mut out = Vec::new();
    let mut seen = HashSet::new();

    let mut push = |name: &str| {
        if seen.insert(name.to_string()) {
            out.push(name.to_string());
        }
    };

    for line in content.lines() {
        match family {
            LanguageFamily::EcmaScript => {
                if let Some(cap) = ES_EXPORT.captures(line) {
                    push(&cap[1]);
                }
            }
            LanguageFamily::Python => {
                if let Some(cap) = PY_TOPLEVEL.captures(line) {
                    if !cap[1].starts_with('_') {
                        push(&cap[1]);
                    }
                }
            }
            LanguageFamily::Rust => {
                if let Some(cap) = RUST_PUB.captures(line) {
                    push(&cap[1]);
                }
            }
            LanguageFamily::Go => {
                if let Some(cap) = GO_EXPORTED_FUNC.captures(line) {
                    push(&cap[1]);
                } else if let Some(cap) = GO_EXPORTED_TYPE.captures(line) {
                    push(&cap[1]);
                }
            }
            LanguageFamily::Generic => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_resolution() {
        assert_eq!(LanguageFamily::from_tag("TypeScript"), LanguageFamily::EcmaScript);
        assert_eq!(LanguageFamily::from_tag("py"), LanguageFamily::Python);
        assert_eq!(LanguageFamily::from_tag("rust"), LanguageFamily::Rust);
        assert_eq!(LanguageFamily::from_tag("golang"), LanguageFamily::Go);
        assert_eq!(LanguageFamily::from_tag("cobol"), LanguageFamily::Generic);
    }

    #[test]
    fn test_ecmascript_boundaries() {
        let fam = LanguageFamily::EcmaScript;
        assert_eq!(
            fam.match_boundary("export function foo() {"),
            Some(FragmentKind::Function)
        );
        assert_eq!(
            fam.match_boundary("export default class Widget {"),
            Some(FragmentKind::Class)
        );
        assert_eq!(
            fam.match_boundary("interface Props {"),
            Some(FragmentKind::Interface)
        );
        assert_eq!(
            fam.match_boundary("const handler = async (req) => {"),
            Some(FragmentKind::Function)
        );
        assert_eq!(fam.match_boundary("  return x + 1;"), None);
    }

    #[test]
    fn test_rust_boundaries() {
        let fam = LanguageFamily::Rust;
        assert_eq!(
            fam.match_boundary("pub async fn handle() -> Result<()> {"),
            Some(FragmentKind::Function)
        );
        assert_eq!(
            fam.match_boundary("pub(crate) struct Inner {"),
            Some(FragmentKind::Class)
        );
        assert_eq!(fam.match_boundary("trait Render {"), Some(FragmentKind::Interface));
        assert_eq!(fam.match_boundary("impl Render for Page {"), Some(FragmentKind::Block));
    }

    #[test]
    fn test_first_pattern_wins_on_shared_match() {
        // "type X interface" also matches the trailing generic type rule;
        // the interface rule is listed first so it must win.
        let fam = LanguageFamily::Go;
        assert_eq!(
            fam.match_boundary("type Reader interface {"),
            Some(FragmentKind::Interface)
        );
        assert_eq!(
            fam.match_boundary("type Alias = map[string]int"),
            Some(FragmentKind::Block)
        );
    }

    #[test]
    fn test_extract_dependencies_ecmascript() {
        let src = "import { useState } from 'react';\nimport fs from 'fs';\nconst path = require('path');\nimport fs from 'fs';";
        let deps = extract_dependencies(src, "typescript");
        assert_eq!(deps, vec!["react", "fs", "path"]);
    }

    #[test]
    fn test_extract_dependencies_python() {
        let src = "import os\nfrom collections import defaultdict\nimport os.path";
        let deps = extract_dependencies(src, "python");
        assert_eq!(deps, vec!["os", "collections", "os.path"]);
    }

    #[test]
    fn test_extract_dependencies_rust_skips_relative() {
        let src = "use std::fmt;\nuse crate::models;\nuse serde::Serialize;";
        let deps = extract_dependencies(src, "rust");
        assert_eq!(deps, vec!["std", "serde"]);
    }

    #[test]
    fn test_extract_exports() {
        let src = "export function foo() {}\nexport const bar = 1;\nfunction hidden() {}";
        assert_eq!(extract_exports(src, "ts"), vec!["foo", "bar"]);

        let rust_src = "pub fn run() {}\nfn private() {}\npub struct Config;";
        assert_eq!(extract_exports(rust_src, "rust"), vec!["run", "Config"]);
    }

    #[test]
    fn test_extract_unrecognized_is_empty() {
        assert!(extract_dependencies("no imports here", "typescript").is_empty());
        assert!(extract_exports("nothing exported", "brainfuck").is_empty());
    }
}
