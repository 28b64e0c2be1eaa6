// Copyright 2025 Cowboy AI, LLC.

//! Semantic and value operators
//!
//! Unary semantic operators turn a concept into a different kind of concept
//! (`probability of`, `count of`, `ratio of ... to ...`). Value operators
//! restrict or transform the values an observable may take (`greater than`,
//! `by`, `where`).

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::semantic_type::{SemanticType, TypeSet};

/// Operators that produce a new concept from an argument concept
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum UnarySemanticOperator {
    /// Negation of a deniable trait
    Not,
    /// Presence of a countable
    Presence,
    /// Proportion of a trait or quantity in another
    Proportion,
    /// Percentage of a trait or quantity in another
    Percentage,
    /// Ratio of a quantity to another
    Ratio,
    /// Distance to a countable
    Distance,
    /// Probability of an event
    Probability,
    /// Uncertainty of a quality
    Uncertainty,
    /// Count of a countable
    Count,
    /// Value of an observable, optionally over another
    Value,
    /// Monetary value of an observable
    MonetaryValue,
    /// Occurrence of a countable
    Occurrence,
    /// Change in a quality, as a process
    Change,
    /// Change of a quality, as an event
    Changed,
    /// Rate of change of a quality
    Rate,
    /// Magnitude of a quantity
    Magnitude,
    /// Ordered level of a quantity
    Level,
    /// Type of a trait, as a class
    Type,
}

impl UnarySemanticOperator {
    /// Every operator, in declaration order
    pub const ALL: [UnarySemanticOperator; 18] = [
        Self::Not,
        Self::Presence,
        Self::Proportion,
        Self::Percentage,
        Self::Ratio,
        Self::Distance,
        Self::Probability,
        Self::Uncertainty,
        Self::Count,
        Self::Value,
        Self::MonetaryValue,
        Self::Occurrence,
        Self::Change,
        Self::Changed,
        Self::Rate,
        Self::Magnitude,
        Self::Level,
        Self::Type,
    ];

    /// Declaration keywords; the second one introduces the comparison
    pub fn declaration(self) -> (&'static str, Option<&'static str>) {
        match self {
            Self::Not => ("not", None),
            Self::Presence => ("presence of", None),
            Self::Proportion => ("proportion of", Some("in")),
            Self::Percentage => ("percentage of", Some("in")),
            Self::Ratio => ("ratio of", Some("to")),
            Self::Distance => ("distance to", None),
            Self::Probability => ("probability of", None),
            Self::Uncertainty => ("uncertainty of", None),
            Self::Count => ("count of", None),
            Self::Value => ("value of", Some("over")),
            Self::MonetaryValue => ("monetary value of", None),
            Self::Occurrence => ("occurrence of", None),
            Self::Change => ("change in", None),
            Self::Changed => ("changed", None),
            Self::Rate => ("change rate of", None),
            Self::Magnitude => ("magnitude of", None),
            Self::Level => ("level of", None),
            Self::Type => ("type of", None),
        }
    }

    /// Look an operator up by its leading keyword
    pub fn for_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.declaration().0 == code)
    }

    /// Whether the operator accepts a comparison concept
    pub fn takes_comparison(self) -> bool {
        self.declaration().1.is_some()
    }

    /// Tags an argument must carry at least one of
    pub fn allowed_operand_types(self) -> &'static [SemanticType] {
        use SemanticType as T;
        match self {
            Self::Not => &[T::Deniable],
            Self::Presence | Self::Distance | Self::Count | Self::Occurrence => &[T::Countable],
            Self::Proportion | Self::Percentage => &[T::Trait, T::Quantifiable],
            Self::Ratio | Self::Magnitude | Self::Level => &[T::Quantifiable],
            Self::Probability => &[T::Event],
            Self::Uncertainty | Self::Change | Self::Changed | Self::Rate => &[T::Quality],
            Self::Value | Self::MonetaryValue => &[T::Observable, T::Configuration],
            Self::Type => &[T::Trait],
        }
    }

    /// Whether an argument with these tags is accepted
    pub fn accepts(self, argument: &TypeSet) -> bool {
        argument.intersects(self.allowed_operand_types())
    }

    /// Tags of the concept produced from an argument with `original` tags
    pub fn apply(self, original: &TypeSet) -> TypeSet {
        let keyword = match self {
            Self::Not => {
                return original.clone().without(SemanticType::Deniable);
            }
            Self::Presence => "presence",
            Self::Proportion => "proportion",
            Self::Percentage => "percentage",
            Self::Ratio => "ratio",
            Self::Distance => "distance",
            Self::Probability => "probability",
            Self::Uncertainty => "uncertainty",
            Self::Count => "count",
            Self::Value => "value",
            Self::MonetaryValue => "monetary_value",
            Self::Occurrence => "occurrence",
            Self::Change => "change",
            Self::Changed => "changed",
            Self::Rate => "rate",
            Self::Magnitude => "magnitude",
            Self::Level => "level",
            Self::Type => "class",
        };
        let mut types = SemanticType::types_for_keyword(keyword).unwrap_or_default();
        if self == Self::Rate
            && (original.contains(SemanticType::Extensive)
                || original.contains(SemanticType::Intensive))
        {
            types.insert(SemanticType::Intensive);
        }
        types
    }

    /// Reference name of the result, e.g. `ratio_of_x_to_y`
    pub fn reference_name(self, argument: &str, comparison: Option<&str>) -> String {
        let (first, second) = self.declaration();
        let mut name = format!("{}_{}", first.replace(' ', "_"), argument);
        if let (Some(other), Some(keyword)) = (comparison, second) {
            name.push_str(&format!("_{keyword}_{other}"));
        }
        name
    }

    /// Display id of the result, e.g. `RatioOfXToY`
    pub fn display_id(self, argument: &str, comparison: Option<&str>) -> String {
        let (first, second) = self.declaration();
        let mut id = camel(first);
        id.push_str(argument);
        if let (Some(other), Some(keyword)) = (comparison, second) {
            id.push_str(&camel(keyword));
            id.push_str(other);
        }
        id
    }
}

impl fmt::Display for UnarySemanticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.declaration().0)
    }
}

/// Operators constraining or transforming an observable's values
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ValueOperator {
    By,
    DownTo,
    Greater,
    Lesser,
    GreaterOrEqual,
    LesserOrEqual,
    Equals,
    NotEquals,
    Where,
    SameAs,
    Without,
    Plus,
    Minus,
    Times,
    Over,
}

impl ValueOperator {
    /// Keyword form used in declarations and observable URNs
    pub fn declaration(self) -> &'static str {
        match self {
            Self::By => "by",
            Self::DownTo => "down to",
            Self::Greater => "greater than",
            Self::Lesser => "less than",
            Self::GreaterOrEqual => "greater than or equal to",
            Self::LesserOrEqual => "less than or equal to",
            Self::Equals => "equals",
            Self::NotEquals => "not equals",
            Self::Where => "where",
            Self::SameAs => "same as",
            Self::Without => "without",
            Self::Plus => "plus",
            Self::Minus => "minus",
            Self::Times => "times",
            Self::Over => "over",
        }
    }

    /// Identifier-safe form used in reference names
    pub fn text_form(self) -> String {
        self.declaration().replace(' ', "_")
    }
}

impl fmt::Display for ValueOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.declaration())
    }
}

fn camel(words: &str) -> String {
    words
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
