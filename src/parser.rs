//! This module provides the parser for edge labels, utilizing the `pest` crate.
//! It splits a label into rule specs with the grammar in `label.pest` and interprets each spec
//! as a single transition rule. Bad specs become `CompileWarning`s instead of failing the label.

use crate::types::{CompileWarning, Direction, Edge};
use pest::{iterators::Pair, Parser as PestParser};
use pest_derive::Parser as PestParser;

/// Derives a `PestParser` for the edge label grammar defined in `label.pest`.
#[derive(PestParser)]
#[grammar = "label.pest"]
pub struct LabelParser;

/// One `;`-separated rule spec of a label, split into its comma-separated fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    /// The spec as written in the label.
    pub text: String,
    /// The fields with surrounding whitespace trimmed.
    pub fields: Vec<String>,
}

/// A rule spec interpreted as a transition, before its target is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedRule {
    pub read: char,
    /// `None` leaves the symbol under the head unchanged.
    pub write: Option<char>,
    pub direction: Direction,
}

/// Splits a label into its rule specs.
///
/// The grammar accepts every string, so an error here means the grammar itself is broken.
pub fn parse_label(label: &str) -> Result<Vec<RuleSpec>, Box<pest::error::Error<Rule>>> {
    let root = LabelParser::parse(Rule::label, label)
        .map_err(Box::new)?
        .next();

    Ok(root
        .map(|root| {
            root.into_inner()
                .filter(|p| p.as_rule() == Rule::spec)
                .map(parse_spec)
                .collect()
        })
        .unwrap_or_default())
}

/// Parses every rule of an edge label.
///
/// Well-formed rules are returned in label order; every spec that cannot be interpreted is
/// reported as a warning naming the edge.
pub fn parse_rules(edge: &Edge) -> (Vec<ParsedRule>, Vec<CompileWarning>) {
    let specs = match parse_label(&edge.label) {
        Ok(specs) => specs,
        Err(e) => {
            return (
                Vec::new(),
                vec![CompileWarning::UnparsableLabel {
                    edge: edge.id.clone(),
                    message: e.to_string(),
                }],
            )
        }
    };

    let mut rules = Vec::new();
    let mut warnings = Vec::new();

    for spec in specs {
        match interpret(&spec, &edge.id) {
            Ok(rule) => rules.push(rule),
            Err(warning) => warnings.push(warning),
        }
    }

    (rules, warnings)
}

/// Interprets a spec as `read,direction` or `read,write,direction`.
fn interpret(spec: &RuleSpec, edge: &str) -> Result<ParsedRule, CompileWarning> {
    match spec.fields.as_slice() {
        [read, direction] => Ok(ParsedRule {
            read: parse_symbol(read, spec, edge)?,
            write: None,
            direction: Direction::from_label(direction),
        }),
        [read, write, direction] => Ok(ParsedRule {
            read: parse_symbol(read, spec, edge)?,
            write: Some(parse_symbol(write, spec, edge)?),
            direction: Direction::from_label(direction),
        }),
        fields => Err(CompileWarning::MalformedRule {
            edge: edge.to_string(),
            spec: spec.text.clone(),
            fields: fields.len(),
        }),
    }
}

/// Parses a field that must hold exactly one tape symbol.
fn parse_symbol(field: &str, spec: &RuleSpec, edge: &str) -> Result<char, CompileWarning> {
    let mut chars = field.chars();

    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Ok(symbol),
        _ => Err(CompileWarning::InvalidSymbol {
            edge: edge.to_string(),
            spec: spec.text.clone(),
            field: field.to_string(),
        }),
    }
}

fn parse_spec(pair: Pair<Rule>) -> RuleSpec {
    let text = pair.as_str().to_string();
    let fields = pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::field)
        .map(|p| p.as_str().trim().to_string())
        .collect();

    RuleSpec { text, fields }
}
