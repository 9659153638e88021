use regex::Regex;

use crate::error::NameError;

#[derive(Debug)]
enum Segment {
    Literal(String),
    /// `{name}` (no regex) or `{name <regex>}`.
    Name(Option<Regex>),
}

/// A name-template: literal text interleaved with `{name}` / `{name
/// <regex>}` substitutions (spec.md §4.G). `{name}` expands to the whole
/// original name; `{name <regex>}` concatenates every capturing group of
/// applying `<regex>` to the original name, or the empty string on no
/// match.
#[derive(Debug)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, NameError> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            if &rest[open..] == "{" {
                return Err(invalid(source, "unterminated '{'"));
            }
            if !rest[open..].starts_with("{name") {
                return Err(invalid(source, "'{' must begin a {name} or {name <regex>} substitution"));
            }
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }

            let close = rest[open..].find('}').map(|i| open + i).ok_or_else(|| invalid(source, "unterminated '{'"))?;
            let inner = &rest[open + 1..close]; // "name" or "name <regex>"
            let pattern = inner.strip_prefix("name").unwrap_or(inner).trim();

            let segment = if pattern.is_empty() {
                Segment::Name(None)
            } else {
                let re = Regex::new(pattern).map_err(|e| invalid(source, &e.to_string()))?;
                Segment::Name(Some(re))
            };
            segments.push(segment);
            rest = &rest[close + 1..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Template { segments })
    }

    pub fn evaluate(&self, original: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Name(None) => out.push_str(original),
                Segment::Name(Some(re)) => {
                    if let Some(caps) = re.captures(original) {
                        for group in caps.iter().skip(1).flatten() {
                            out.push_str(group.as_str());
                        }
                    }
                }
            }
        }
        out
    }
}

fn invalid(template: &str, reason: &str) -> NameError {
    NameError::InvalidTemplate {
        template: template.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_substitution_copies_input() {
        let t = Template::parse("{name}-copy").unwrap();
        assert_eq!(t.evaluate("DC1"), "DC1-copy");
    }

    #[test]
    fn regex_substitution_concatenates_capture_groups() {
        let t = Template::parse(r"{name (\d+)}-new").unwrap();
        assert_eq!(t.evaluate("site42"), "42-new");
    }

    #[test]
    fn regex_with_no_match_expands_to_empty() {
        let t = Template::parse(r"prefix-{name (\d+)}").unwrap();
        assert_eq!(t.evaluate("nomatch"), "prefix-");
    }

    #[test]
    fn multiple_capture_groups_concatenate_in_order() {
        let t = Template::parse(r"{name (\w+)_(\w+)}").unwrap();
        assert_eq!(t.evaluate("DC1_branch"), "DC1branch");
    }

    #[test]
    fn unterminated_brace_is_rejected() {
        assert!(Template::parse("{name").is_err());
    }
}
