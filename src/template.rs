//! Template rendering
//!
//! Literal find/replace over a file loaded from the template folder. The
//! substitution map's keys are replaced in a single pass, so replacement
//! values are never re-scanned for further keys. No escaping, no includes,
//! no control flow.

use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    /// The named template does not exist under the template folder.
    #[error("template {0:?} missing")]
    Missing(String),
    #[error("failed to read template {name:?}: {source}")]
    Read {
        name: String,
        source: std::io::Error,
    },
    #[error("bad substitution pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Render `name` from `template_root`, replacing every occurrence of each
/// substitution key with its mapped value.
pub fn render(
    template_root: &Path,
    name: &str,
    substitutions: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let path = template_root.join(name);
    if !path.is_file() {
        return Err(TemplateError::Missing(name.to_string()));
    }
    let source = std::fs::read_to_string(&path).map_err(|source| TemplateError::Read {
        name: name.to_string(),
        source,
    })?;
    substitute(&source, substitutions)
}

/// One-pass substitution: keys are joined into an alternation, longest
/// first so overlapping keys prefer the longer match.
fn substitute(
    source: &str,
    substitutions: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    if substitutions.is_empty() {
        return Ok(source.to_string());
    }

    let mut keys: Vec<&String> = substitutions.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    let pattern = keys
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    let matcher = Regex::new(&pattern)?;

    let rendered = matcher.replace_all(source, |caps: &regex::Captures| {
        substitutions.get(&caps[0]).cloned().unwrap_or_default()
    });
    Ok(rendered.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn write_template(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_replaces_every_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "home.html", "<h1>{{STATUS}}</h1><p>{{STATUS}}</p>");
        let out = render(dir.path(), "home.html", &vars(&[("{{STATUS}}", "ON")])).unwrap();
        assert_eq!(out, "<h1>ON</h1><p>ON</p>");
        assert!(!out.contains("{{STATUS}}"));
    }

    #[test]
    fn test_single_pass_does_not_rescan_replacements() {
        // "{{A}}" expands to text containing "{{B}}"; a second pass would
        // corrupt it, a single pass must not.
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "t.html", "{{A}} and {{B}}");
        let out = render(
            dir.path(),
            "t.html",
            &vars(&[("{{A}}", "literal {{B}}"), ("{{B}}", "replaced")]),
        )
        .unwrap();
        assert_eq!(out, "literal {{B}} and replaced");
    }

    #[test]
    fn test_keys_with_regex_metacharacters() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "t.html", "cost: $PRICE (incl. tax)");
        let out = render(dir.path(), "t.html", &vars(&[("$PRICE", "42")])).unwrap();
        assert_eq!(out, "cost: 42 (incl. tax)");
    }

    #[test]
    fn test_longer_key_wins_overlap() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "t.html", "$NAME_FULL");
        let out = render(
            dir.path(),
            "t.html",
            &vars(&[("$NAME", "short"), ("$NAME_FULL", "long")]),
        )
        .unwrap();
        assert_eq!(out, "long");
    }

    #[test]
    fn test_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let err = render(dir.path(), "absent.html", &HashMap::new()).unwrap_err();
        assert!(matches!(err, TemplateError::Missing(_)));
    }

    #[test]
    fn test_empty_substitutions_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "t.html", "as-is {{UNTOUCHED}}");
        let out = render(dir.path(), "t.html", &HashMap::new()).unwrap();
        assert_eq!(out, "as-is {{UNTOUCHED}}");
    }
}
