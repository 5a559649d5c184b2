//! Rule filter parsing.
//!
//! A rule filter is a small search query such as `subscription:newsletter`.
//! Parsing never fails: unknown keywords, free text, and malformed input
//! are dropped, so a filter degrades to "match on what was understood" or,
//! at worst, "match everything".

/// The only keyword the engine acts on.
pub const SUBSCRIPTION_KEYWORD: &str = "subscription";

/// Structured form of a rule filter. Rebuilt from the raw string on each
/// evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    /// Required subscription name, or `*` for "any subscription".
    pub subscription_filter: Option<String>,
}

impl SearchFilter {
    /// An empty filter matches every event.
    pub fn is_empty(&self) -> bool {
        self.subscription_filter.is_none()
    }
}

/// Parse a raw filter string.
pub fn parse_filter(filter: &str) -> SearchFilter {
    let mut parsed = SearchFilter::default();
    if is_match_all(filter) {
        return parsed;
    }

    for term in tokenize(filter) {
        if term.negated {
            continue;
        }
        let Some((keyword, value)) = term.keyword() else {
            continue;
        };
        if keyword == SUBSCRIPTION_KEYWORD && !value.is_empty() {
            parsed.subscription_filter = Some(value.to_string());
        }
    }

    parsed
}

/// True when the filter is blank or nothing but a `*` once quotes, colons,
/// and whitespace are stripped.
fn is_match_all(filter: &str) -> bool {
    let stripped: String = filter
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '"' | '\'' | ':'))
        .collect();
    stripped.is_empty() || stripped == "*"
}

// ── Tokenizer ───────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq)]
struct Term {
    /// Term text with quotes and the keyword separator removed.
    text: String,
    /// Byte offset in `text` where the first unquoted `:` stood.
    colon: Option<usize>,
    /// Leading `-`: an exclusion.
    negated: bool,
}

impl Term {
    fn keyword(&self) -> Option<(&str, &str)> {
        self.colon.map(|at| self.text.split_at(at))
    }
}

/// Split on unquoted whitespace. Single or double quotes group text (and
/// are dropped); inside a span only the opening quote character closes it.
/// An unterminated quote runs to the end of the input.
fn tokenize(input: &str) -> Vec<Term> {
    let mut terms = Vec::new();
    let mut current: Option<Term> = None;
    let mut quote: Option<char> = None;

    for ch in input.chars() {
        match (ch, quote) {
            ('"' | '\'', None) => {
                quote = Some(ch);
                current.get_or_insert_with(Term::default);
            }
            (c, Some(open)) if c == open => quote = None,
            (c, Some(_)) => current.get_or_insert_with(Term::default).text.push(c),
            (c, None) if c.is_whitespace() => {
                if let Some(term) = current.take() {
                    terms.push(term);
                }
            }
            ('-', None) if current.is_none() => {
                current = Some(Term {
                    negated: true,
                    ..Term::default()
                });
            }
            (':', None) => {
                let term = current.get_or_insert_with(Term::default);
                match term.colon {
                    None => term.colon = Some(term.text.len()),
                    Some(_) => term.text.push(':'),
                }
            }
            (c, None) => current.get_or_insert_with(Term::default).text.push(c),
        }
    }

    if let Some(term) = current {
        terms.push(term);
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(filter: &str) -> Option<String> {
        parse_filter(filter).subscription_filter
    }

    #[test]
    fn blank_and_wildcard_filters_are_empty() {
        for filter in ["", "   ", "*", " * ", "\"*\"", "'*'", ":*:", "\t\"*\"\n", "\"\""] {
            assert!(parse_filter(filter).is_empty(), "filter {filter:?} should match all");
        }
    }

    #[test]
    fn subscription_keyword_captured() {
        assert_eq!(subscription("subscription:newsletter").as_deref(), Some("newsletter"));
        assert_eq!(subscription("subscription:*").as_deref(), Some("*"));
    }

    #[test]
    fn keyword_must_match_exactly() {
        assert!(parse_filter("Subscription:Weekly").is_empty());
        assert!(parse_filter("SUBSCRIPTION:Weekly").is_empty());
        assert_eq!(subscription("subscription:Weekly").as_deref(), Some("Weekly"));
    }

    #[test]
    fn quoted_value_keeps_spaces() {
        assert_eq!(
            subscription(r#"subscription:"The Morning Brew""#).as_deref(),
            Some("The Morning Brew")
        );
    }

    #[test]
    fn single_quoted_value_is_unwrapped() {
        assert_eq!(subscription("subscription:'*'").as_deref(), Some("*"));
        assert_eq!(
            subscription("subscription:'The Brew'").as_deref(),
            Some("The Brew")
        );
    }

    #[test]
    fn other_quote_kind_is_literal_inside_a_span() {
        assert_eq!(
            subscription(r#"subscription:"Bob's Digest""#).as_deref(),
            Some("Bob's Digest")
        );
        assert_eq!(
            subscription(r#"subscription:'say "hi"'"#).as_deref(),
            Some(r#"say "hi""#)
        );
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        assert_eq!(
            subscription(r#"subscription:"Morning Brew"#).as_deref(),
            Some("Morning Brew")
        );
    }

    #[test]
    fn last_occurrence_wins() {
        assert_eq!(
            subscription("subscription:first subscription:second").as_deref(),
            Some("second")
        );
    }

    #[test]
    fn unknown_keywords_and_free_text_ignored() {
        assert_eq!(
            subscription("is:unread label:news hello subscription:digest world").as_deref(),
            Some("digest")
        );
        assert!(parse_filter("is:unread label:news hello").is_empty());
    }

    #[test]
    fn exclusions_are_not_captured() {
        assert!(parse_filter("-subscription:spam").is_empty());
        assert_eq!(
            subscription("-subscription:spam subscription:digest").as_deref(),
            Some("digest")
        );
    }

    #[test]
    fn empty_value_ignored() {
        assert!(parse_filter("subscription:").is_empty());
        assert!(parse_filter(r#"subscription:"""#).is_empty());
    }

    #[test]
    fn value_keeps_later_colons() {
        assert_eq!(subscription("subscription:a:b").as_deref(), Some("a:b"));
    }

    #[test]
    fn tokenizer_marks_negation_and_keyword() {
        let terms = tokenize(r#"-is:read "two words" key:"v w""#);
        assert_eq!(terms.len(), 3);
        assert!(terms[0].negated);
        assert_eq!(terms[0].keyword(), Some(("is", "read")));
        assert_eq!(terms[1].text, "two words");
        assert_eq!(terms[1].keyword(), None);
        assert_eq!(terms[2].keyword(), Some(("key", "v w")));
    }
}
