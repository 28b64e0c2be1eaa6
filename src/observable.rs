// Copyright 2025 Cowboy AI, LLC.

//! Observables
//!
//! An [`Observable`] is a concept plus everything needed to say how it is
//! observed: unit or currency, numeric range, ordered value operators, an
//! inline value, and flags. Observables are produced by the composition
//! builder and are plain values afterwards.

use std::collections::BTreeSet;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::concept::Concept;
use crate::declaration::ObservableDeclaration;
use crate::mediation::{Currency, Mediation, NumericRange, Unit};
use crate::operators::ValueOperator;

/// What to do when resolution of an observable fails or yields no data
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum ResolutionDirective {
    /// Accept a missing resolution
    Missing,
    /// Accept a resolution with no data
    Nodata,
    /// Accept a resolution that raised an error
    Error,
}

/// Inline literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum Literal {
    /// Integer
    Integer(i64),
    /// Floating point number
    Number(f64),
    /// Text
    Text(String),
    /// Boolean
    Boolean(bool),
}

impl Literal {
    /// Identifier-safe form used in reference and observable names
    pub fn code_form(&self) -> String {
        match self {
            Literal::Integer(n) => format!("i{}", n.to_string().replace('-', "_")),
            Literal::Number(x) => format!("n{}", format!("{x:?}").replace(['.', '-'], "_")),
            Literal::Text(text) => format!(
                "s_{}",
                text.chars()
                    .map(|c| if c.is_alphanumeric() { c } else { '_' })
                    .collect::<String>()
            ),
            Literal::Boolean(b) => b.to_string(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(n) => write!(f, "{n}"),
            Literal::Number(x) => write!(f, "{x:?}"),
            Literal::Text(text) => write!(f, "{text:?}"),
            Literal::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// Operand of a value operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueOperand {
    /// A resolved concept
    Concept(Concept),
    /// A resolved observable
    Observable(Box<Observable>),
    /// A declaration still to be resolved through the builder
    Declaration(Box<ObservableDeclaration>),
    /// A literal value
    Literal(Literal),
}

/// Concept with mediation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observable {
    pub(crate) concept: Concept,
    pub(crate) urn: String,
    pub(crate) reference_name: String,
    pub(crate) name: String,
    pub(crate) stated_name: Option<String>,
    pub(crate) mediation: Option<Mediation>,
    pub(crate) range: Option<NumericRange>,
    pub(crate) value_operators: Vec<(ValueOperator, ValueOperand)>,
    pub(crate) default_value: Option<Literal>,
    pub(crate) resolution_directives: BTreeSet<ResolutionDirective>,
    pub(crate) optional: bool,
    pub(crate) collective: bool,
}

impl Observable {
    /// Observable over a concept, with no mediation
    pub fn promote(concept: Concept) -> Self {
        Self {
            urn: concept.urn().to_string(),
            reference_name: concept.reference_name().to_string(),
            name: concept.code_name(),
            collective: concept.is_collective(),
            concept,
            stated_name: None,
            mediation: None,
            range: None,
            value_operators: Vec::new(),
            default_value: None,
            resolution_directives: BTreeSet::new(),
            optional: false,
        }
    }

    /// Underlying concept
    pub fn concept(&self) -> &Concept {
        &self.concept
    }

    /// Display URN including mediation and value operators
    pub fn urn(&self) -> &str {
        &self.urn
    }

    /// Identifier-safe reference name
    pub fn reference_name(&self) -> &str {
        &self.reference_name
    }

    /// Stated name when given, computed name otherwise
    pub fn name(&self) -> &str {
        self.stated_name.as_deref().unwrap_or(&self.name)
    }

    /// Name given by the modeller
    pub fn stated_name(&self) -> Option<&str> {
        self.stated_name.as_deref()
    }

    /// Unit or currency
    pub fn mediation(&self) -> Option<&Mediation> {
        self.mediation.as_ref()
    }

    /// Unit, when the mediation is a unit
    pub fn unit(&self) -> Option<&Unit> {
        match &self.mediation {
            Some(Mediation::Unit(unit)) => Some(unit),
            _ => None,
        }
    }

    /// Currency, when the mediation is a currency
    pub fn currency(&self) -> Option<&Currency> {
        match &self.mediation {
            Some(Mediation::Currency(currency)) => Some(currency),
            _ => None,
        }
    }

    /// Numeric range
    pub fn range(&self) -> Option<&NumericRange> {
        self.range.as_ref()
    }

    /// Value operators in application order
    pub fn value_operators(&self) -> &[(ValueOperator, ValueOperand)] {
        &self.value_operators
    }

    /// Inline value
    pub fn default_value(&self) -> Option<&Literal> {
        self.default_value.as_ref()
    }

    /// Resolution directives
    pub fn resolution_directives(&self) -> &BTreeSet<ResolutionDirective> {
        &self.resolution_directives
    }

    /// `optional`
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// `each`
    pub fn is_collective(&self) -> bool {
        self.collective
    }
}

impl fmt::Display for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.urn)
    }
}

impl ObservableDeclaration {
    /// Whether the declaration is a plain concept expression
    pub fn is_bare(&self) -> bool {
        self.mediation.is_none()
            && self.range.is_none()
            && self.value_operators.is_empty()
            && self.default_value.is_none()
            && self.resolution_directives.is_empty()
            && !self.optional
            && self.stated_name.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic_type::{SemanticType, TypeSet};

    #[test]
    fn test_literal_code_forms() {
        assert_eq!(Literal::Integer(-3).code_form(), "i_3");
        assert_eq!(Literal::Integer(42).code_form(), "i42");
        assert_eq!(Literal::Number(-1.5).code_form(), "n_1_5");
        assert_eq!(Literal::Text("dry season".into()).code_form(), "s_dry_season");
        assert_eq!(Literal::Boolean(true).code_form(), "true");
    }

    #[test]
    fn test_promote() {
        let concept = Concept::new(
            "geo",
            "Elevation",
            SemanticType::types_for_keyword("length").unwrap_or_else(TypeSet::new),
        );
        let observable = Observable::promote(concept.clone());
        assert_eq!(observable.urn(), "geo:Elevation");
        assert_eq!(observable.reference_name(), "geo_elevation");
        assert_eq!(observable.name(), "elevation");
        assert!(observable.unit().is_none());
        assert_eq!(observable.concept(), &concept);
    }
}
