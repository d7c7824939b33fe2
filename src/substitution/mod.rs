//! Parsing of `Fn::Sub` template strings
//!
//! A substitution string interpolates `${Name}` (a reference), `${Name.Attribute}`
//! (an attribute of a resource) and `${!Name}` (the literal text `${Name}`).
//! The resolver uses the variables found here as implicit references.

pub mod lexer;

use crate::error::{Span, SubstitutionError};

use self::lexer::{lex, Token};

/// One piece of a parsed substitution string
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Plain text, copied as-is
    Text(String),
    /// An escaped `${!...}` sequence, rendered literally
    Literal(String),
    /// A `${...}` placeholder
    Variable(Variable),
}

/// A `${...}` placeholder in a substitution string
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Logical name, parameter, pseudo parameter or local variable
    pub name: String,
    /// Attribute for `${Name.Attribute}` placeholders
    pub attribute: Option<String>,
    pub span: Span,
}

impl Variable {
    fn from_body(body: &str, span: Span, template: &str) -> Result<Self, SubstitutionError> {
        if let Some(bad) = body
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, ':' | '.' | '_')))
        {
            return Err(SubstitutionError::new(
                template,
                span,
                format!("invalid character '{}' in variable '{}'", bad, body),
            ));
        }

        match body.split_once('.') {
            Some((name, attribute)) if !name.is_empty() && !attribute.is_empty() => Ok(Self {
                name: name.to_string(),
                attribute: Some(attribute.to_string()),
                span,
            }),
            Some(_) => Err(SubstitutionError::new(
                template,
                span,
                format!("malformed attribute variable '{}'", body),
            )),
            None => Ok(Self {
                name: body.to_string(),
                attribute: None,
                span,
            }),
        }
    }
}

/// Parse a substitution string into segments
pub fn parse(template: &str) -> Result<Vec<Segment>, SubstitutionError> {
    let mut segments: Vec<Segment> = Vec::new();

    for (token, span) in lex(template) {
        let token = token.map_err(|_| {
            SubstitutionError::new(template, span.clone(), "unexpected character")
        })?;

        match token {
            Token::Text(text) => push_text(&mut segments, &text),
            Token::Dollar => push_text(&mut segments, "$"),
            Token::Literal(name) => segments.push(Segment::Literal(name)),
            Token::Variable(body) => {
                segments.push(Segment::Variable(Variable::from_body(&body, span, template)?))
            }
            Token::Empty => {
                return Err(SubstitutionError::new(template, span, "empty variable"));
            }
            Token::Unterminated => {
                return Err(SubstitutionError::new(
                    template,
                    span,
                    "unterminated variable, expected '}'",
                ));
            }
        }
    }

    Ok(segments)
}

/// Collect the variables of a substitution string in order of appearance
pub fn variables(template: &str) -> Result<Vec<Variable>, SubstitutionError> {
    Ok(parse(template)?
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Variable(var) => Some(var),
            _ => None,
        })
        .collect())
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if let Some(Segment::Text(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Text(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_without_variables() {
        let segments = parse("us-east-1a").unwrap();
        assert_eq!(segments, vec![Segment::Text("us-east-1a".to_string())]);
    }

    #[test]
    fn test_parse_reference_and_attribute() {
        let vars = variables("${AWS::Region}-${Instance.PublicIp}").unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].name, "AWS::Region");
        assert_eq!(vars[0].attribute, None);
        assert_eq!(vars[1].name, "Instance");
        assert_eq!(vars[1].attribute.as_deref(), Some("PublicIp"));
        assert_eq!(vars[1].span, 15..35);
    }

    #[test]
    fn test_attribute_split_at_first_dot() {
        let vars = variables("${Db.Endpoint.Address}").unwrap();
        assert_eq!(vars[0].name, "Db");
        assert_eq!(vars[0].attribute.as_deref(), Some("Endpoint.Address"));
    }

    #[test]
    fn test_literal_is_not_a_variable() {
        let vars = variables("${!NotARef} and ${Real}").unwrap();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].name, "Real");
    }

    #[test]
    fn test_lone_dollar_merges_into_text() {
        let segments = parse("cost $5").unwrap();
        assert_eq!(segments, vec![Segment::Text("cost $5".to_string())]);
    }

    #[test]
    fn test_unterminated_error() {
        let err = parse("arn:${Bucket").unwrap_err();
        assert_eq!(err.span, 4..12);
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn test_empty_variable_error() {
        let err = parse("a${}b").unwrap_err();
        assert_eq!(err.span, 1..4);
    }

    #[test]
    fn test_invalid_character_error() {
        let err = parse("${Bad Name}").unwrap_err();
        assert!(err.message.contains("invalid character ' '"));
    }

    #[test]
    fn test_malformed_attribute_error() {
        assert!(parse("${Res.}").is_err());
        assert!(parse("${.Attr}").is_err());
    }
}
