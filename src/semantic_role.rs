// Copyright 2025 Cowboy AI, LLC.

//! Roles a concept can play inside a composition
//!
//! The declaration order of the positional variants is the canonical order in
//! which modifiers are folded into identifiers. Changing it changes every
//! composite identifier ever minted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::axioms::ns;

/// Slot occupied by a concept in a composition request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticRole {
    /// `of`: the observable is inherent to this
    Inherent,
    /// `with`
    Compresent,
    /// `for`
    Goal,
    /// `causing`
    Caused,
    /// `caused by`
    Causant,
    /// `adjacent to`
    Adjacent,
    /// `during`
    Cooccurrent,
    /// Source of a relationship
    RelationshipSource,
    /// Target of a relationship
    RelationshipTarget,
    /// `during each`
    TemporalInherent,
    /// Attached trait
    Trait,
    /// Attached role
    Role,
    /// Comparison operand of a unary operator
    Comparison,
    /// Measurement unit
    Unit,
    /// Currency
    Currency,
    /// Value operator
    ValueOperator,
}

impl SemanticRole {
    /// Modifiers stored by position, in canonical order
    pub const POSITIONAL: [SemanticRole; 10] = [
        Self::Inherent,
        Self::Compresent,
        Self::Goal,
        Self::Caused,
        Self::Causant,
        Self::Adjacent,
        Self::Cooccurrent,
        Self::RelationshipSource,
        Self::RelationshipTarget,
        Self::TemporalInherent,
    ];

    /// Whether this role is a positional modifier
    pub fn is_positional(self) -> bool {
        Self::POSITIONAL.contains(&self)
    }

    /// Keyword prefix for display ids
    pub fn display_prefix(self) -> &'static str {
        match self {
            Self::Inherent => "Of",
            Self::Compresent => "With",
            Self::Goal => "For",
            Self::Caused | Self::RelationshipTarget => "To",
            Self::Causant => "From",
            Self::Adjacent => "AdjacentTo",
            Self::Cooccurrent => "During",
            Self::RelationshipSource => "Linking",
            Self::TemporalInherent => "DuringEach",
            Self::Trait | Self::Role => "As",
            Self::Comparison => "Versus",
            Self::Unit | Self::Currency => "In",
            Self::ValueOperator => "",
        }
    }

    /// Keyword fragment for reference names
    pub fn reference_prefix(self) -> &'static str {
        match self {
            Self::Inherent => "_of_",
            Self::Compresent => "_with_",
            Self::Goal => "_for_",
            Self::Caused | Self::RelationshipTarget => "_to_",
            Self::Causant => "_from_",
            Self::Adjacent => "_adjacent_",
            Self::Cooccurrent => "_during_",
            Self::RelationshipSource => "_linking_",
            Self::TemporalInherent => "_during_each_",
            Self::Trait | Self::Role => "_as_",
            Self::Comparison => "_versus_",
            Self::Unit | Self::Currency => "_in_",
            Self::ValueOperator => "_",
        }
    }

    /// Keyword used in textual declarations
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Inherent => "of",
            Self::Compresent => "with",
            Self::Goal => "for",
            Self::Caused => "causing",
            Self::Causant => "caused by",
            Self::Adjacent => "adjacent to",
            Self::Cooccurrent => "during",
            Self::RelationshipSource => "linking",
            Self::RelationshipTarget => "to",
            Self::TemporalInherent => "during each",
            Self::Trait => "is",
            Self::Role => "as",
            Self::Comparison => "versus",
            Self::Unit | Self::Currency => "in",
            Self::ValueOperator => "",
        }
    }

    /// Restriction property used when emitting axioms for this role
    pub fn property(self) -> Option<&'static str> {
        match self {
            Self::Inherent => Some(ns::IS_INHERENT_TO),
            Self::Compresent => Some(ns::HAS_COMPRESENT),
            Self::Goal => Some(ns::HAS_PURPOSE),
            Self::Caused => Some(ns::HAS_CAUSED),
            Self::Causant => Some(ns::HAS_CAUSANT),
            Self::Adjacent => Some(ns::IS_ADJACENT_TO),
            Self::Cooccurrent => Some(ns::OBSERVED_DURING),
            Self::RelationshipSource => Some(ns::IMPLIES_SOURCE),
            Self::RelationshipTarget => Some(ns::IMPLIES_DESTINATION),
            Self::TemporalInherent => Some(ns::HAS_TEMPORAL_INHERENT),
            Self::Role => Some(ns::HAS_ROLE),
            Self::Comparison => Some(ns::IS_COMPARED_TO),
            Self::Trait | Self::Unit | Self::Currency | Self::ValueOperator => None,
        }
    }
}

impl fmt::Display for SemanticRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_order_is_canonical() {
        let mut sorted = SemanticRole::POSITIONAL;
        sorted.sort();
        assert_eq!(sorted, SemanticRole::POSITIONAL);
        assert!(SemanticRole::Inherent < SemanticRole::Compresent);
        assert!(SemanticRole::Cooccurrent < SemanticRole::RelationshipSource);
    }

    #[test]
    fn test_every_positional_role_has_a_property() {
        for role in SemanticRole::POSITIONAL {
            assert!(role.property().is_some(), "{role} has no property");
            assert!(role.is_positional());
        }
        assert!(!SemanticRole::Trait.is_positional());
    }
}
