// Copyright 2025 Cowboy AI, LLC.

//! Semantic type classifier
//!
//! Every concept carries a set of [`SemanticType`] tags describing its
//! fundamental kind (quality, subject, event, ...) and derived modifiers
//! (abstract, extensive, monetary value, ...). This module holds the closed
//! tag enumeration, the named masks used to classify tag sets, and the pure
//! predicates the composition builder relies on.

use std::collections::BTreeSet;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Closed enumeration of semantic tags
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum SemanticType {
    Observable,
    Predicate,
    Quality,
    Process,
    Subject,
    Event,
    Relationship,
    Extensive,
    Intensive,
    Trait,
    Identity,
    Attribute,
    Realm,
    Subjective,
    Internal,
    Role,
    Deniable,
    Configuration,
    Abstract,
    Nothing,
    Ordering,
    Class,
    Quantity,
    Domain,
    Energy,
    Entropy,
    Length,
    Mass,
    Volume,
    Weight,
    Money,
    Duration,
    Area,
    Acceleration,
    Priority,
    ElectricPotential,
    Charge,
    Resistance,
    Resistivity,
    Pressure,
    Angle,
    Velocity,
    Temperature,
    Viscosity,
    Agent,
    Functional,
    Structural,
    Bidirectional,
    Unidirectional,
    Deliberative,
    Interactive,
    Reactive,
    DirectObservable,
    Countable,
    Uncertainty,
    Probability,
    Proportion,
    Percentage,
    Numerosity,
    Distance,
    Ratio,
    Value,
    Occurrence,
    Presence,
    Extent,
    Macro,
    Amount,
    Category,
    Magnitude,
    Quantifiable,
    Union,
    Intersection,
    MonetaryValue,
    Rescaling,
    Change,
    Rate,
    Changed,
    Sealed,
    AuthorityIdentity,
}

use SemanticType::*;

/// Exactly one of these must be present in a well-formed concept
pub const FUNDAMENTAL_TYPES: &[SemanticType] = &[
    Quality,
    Subject,
    Agent,
    Event,
    Configuration,
    Domain,
    Relationship,
    Extent,
    Process,
    Attribute,
    Realm,
    Identity,
    Role,
];

/// Kinds that can be the target of a model
pub const MODELABLE_TYPES: &[SemanticType] = &[
    Quality,
    Subject,
    Agent,
    Event,
    Configuration,
    Relationship,
    Process,
    Trait,
    Role,
    Domain,
];

/// Kinds a foundational concept may declare itself as
pub const DECLARABLE_TYPES: &[SemanticType] = &[
    Proportion,
    Probability,
    Distance,
    Value,
    Occurrence,
    Presence,
    Uncertainty,
    Numerosity,
    Rate,
    Class,
    Quantity,
    Energy,
    Entropy,
    Length,
    Mass,
    Volume,
    Weight,
    Money,
    Duration,
    Area,
    Acceleration,
    Priority,
    ElectricPotential,
    Charge,
    Identity,
    Domain,
    Resistance,
    Resistivity,
    Pressure,
    Angle,
    Velocity,
    Temperature,
    Viscosity,
    Ratio,
    Amount,
    Subject,
    Agent,
    Event,
    Relationship,
    Process,
    Configuration,
    Role,
    Attribute,
    Realm,
    Ordering,
];

/// Qualities that are always inherent to something else
pub const INHERENT_QUALITIES: &[SemanticType] = &[
    Proportion,
    Probability,
    Distance,
    Value,
    Occurrence,
    Presence,
    Uncertainty,
    Numerosity,
    Rate,
];

/// Kinds produced by unary semantic operators
pub const OPERATOR_TYPES: &[SemanticType] = &[
    Change,
    Numerosity,
    Distance,
    Magnitude,
    Occurrence,
    Presence,
    Probability,
    Proportion,
    Ratio,
    Class,
    Uncertainty,
    Value,
    MonetaryValue,
];

/// Specific quality kinds
pub const QUALITY_TYPES: &[SemanticType] = &[
    Class,
    Quantity,
    Energy,
    Entropy,
    Length,
    Mass,
    Volume,
    Weight,
    Money,
    Duration,
    Area,
    Acceleration,
    Priority,
    ElectricPotential,
    Charge,
    Resistance,
    Resistivity,
    Pressure,
    Angle,
    Velocity,
    Temperature,
    Viscosity,
    Uncertainty,
    Ratio,
    Proportion,
    Probability,
    Numerosity,
    Distance,
    Value,
    MonetaryValue,
    Occurrence,
    Presence,
    Amount,
    Rate,
];

/// Specific quality kinds plus the generic quality tag
pub const ALL_QUALITY_TYPES: &[SemanticType] = &[
    Class,
    Quality,
    Quantity,
    Energy,
    Entropy,
    Length,
    Mass,
    Volume,
    Weight,
    Money,
    Duration,
    Area,
    Acceleration,
    Priority,
    ElectricPotential,
    Charge,
    Resistance,
    Resistivity,
    Pressure,
    Angle,
    Velocity,
    Temperature,
    Viscosity,
    Uncertainty,
    Ratio,
    Proportion,
    Probability,
    Numerosity,
    Distance,
    Value,
    Occurrence,
    Presence,
    Amount,
    Rate,
    MonetaryValue,
];

/// Qualities observed as numbers
pub const CONTINUOUS_QUALITY_TYPES: &[SemanticType] = &[
    Quantity,
    Energy,
    Entropy,
    Length,
    Mass,
    Volume,
    Weight,
    Money,
    Duration,
    Area,
    Acceleration,
    Priority,
    ElectricPotential,
    Charge,
    Resistance,
    Resistivity,
    Pressure,
    Angle,
    Velocity,
    Temperature,
    Viscosity,
    Uncertainty,
    Ratio,
    Proportion,
    Probability,
    Numerosity,
    Distance,
    Value,
    Occurrence,
    Presence,
    Amount,
    Magnitude,
    Rate,
    MonetaryValue,
];

/// Kinds observed directly as countable things
pub const DIRECT_OBSERVABLE_TYPES: &[SemanticType] = &[
    DirectObservable,
    Subject,
    Agent,
    Event,
    Relationship,
    Process,
    Configuration,
    Countable,
    Abstract,
];

/// Kinds that can stand alone as an observable
pub const BASE_OBSERVABLE_TYPES: &[SemanticType] =
    &[Subject, Event, Relationship, Process, Quality, Agent];

/// Kinds that can stand alone as the target of a model
pub const BASE_MODELABLE_TYPES: &[SemanticType] = &[
    Subject,
    Event,
    Relationship,
    Process,
    Quality,
    Agent,
    Trait,
    Configuration,
];

/// The three mutually exclusive trait families
pub const TRAIT_TYPES: &[SemanticType] = &[Attribute, Realm, Identity];

/// Trait families plus the generic trait tag
pub const ALL_TRAIT_TYPES: &[SemanticType] = &[Attribute, Realm, Identity, Trait];

/// Representative tag precedence. Specializations come before the kinds they
/// specialize, so `Identity` is tested long before `Extensive`.
pub const CORE_TYPE_PRECEDENCE: &[SemanticType] = &[
    Process,
    Subject,
    Event,
    Relationship,
    Identity,
    Attribute,
    Realm,
    Ordering,
    Role,
    Configuration,
    Class,
    Quantity,
    Domain,
    Energy,
    Entropy,
    Length,
    Mass,
    Volume,
    Weight,
    Money,
    Duration,
    Area,
    Acceleration,
    Priority,
    ElectricPotential,
    Charge,
    Resistance,
    Resistivity,
    Pressure,
    Angle,
    Velocity,
    Temperature,
    Viscosity,
    Agent,
    Uncertainty,
    Probability,
    Proportion,
    Numerosity,
    Distance,
    Ratio,
    Value,
    MonetaryValue,
    Occurrence,
    Presence,
    Extent,
    Extensive,
    Intensive,
];

impl SemanticType {
    /// Whether this tag denotes a numeric quality
    pub fn is_numeric(self) -> bool {
        CONTINUOUS_QUALITY_TYPES.contains(&self)
    }

    /// Whether this tag denotes a quality of any kind
    pub fn is_quality(self) -> bool {
        ALL_QUALITY_TYPES.contains(&self)
    }

    /// Whether values of this kind may carry units
    pub fn admits_units(self) -> bool {
        matches!(self, Extensive | Intensive | Numerosity)
    }

    /// Whether values of this kind may carry a currency
    pub fn admits_currency(self) -> bool {
        matches!(self, MonetaryValue | Money)
    }

    /// Whether this tag denotes a countable, directly observed kind
    pub fn is_countable(self) -> bool {
        DIRECT_OBSERVABLE_TYPES.contains(&self)
    }

    /// Whether this tag is one of the trait families
    pub fn is_trait(self) -> bool {
        TRAIT_TYPES.contains(&self)
    }

    /// Whether this tag is a trait family or a role
    pub fn is_predicate(self) -> bool {
        self == Role || self.is_trait()
    }

    /// Full tag set for a declaration keyword such as `quantity` or `thing`.
    ///
    /// Keywords are matched case-insensitively, with `-` and spaces treated
    /// as `_`. Unknown keywords yield `None`.
    pub fn types_for_keyword(keyword: &str) -> Option<TypeSet> {
        let key = keyword.trim().to_lowercase().replace(['-', ' '], "_");
        let physical = |kind: SemanticType, property: SemanticType| {
            TypeSet::of(&[kind, Quality, property, Observable, Quantifiable])
        };
        let quantifiable = |kind: SemanticType| TypeSet::of(&[kind, Quality, Observable, Quantifiable]);
        let set = match key.as_str() {
            "thing" | "subject" => TypeSet::of(&[Subject, DirectObservable, Countable, Observable]),
            "class" | "type" => TypeSet::of(&[Class, Quality, Observable]),
            "level" => TypeSet::of(&[Class, Quality, Ordering, Observable]),
            "quantity" => TypeSet::of(&[Quantity, Quality, Observable, Quantifiable]),
            "quality" => TypeSet::of(&[Quality, Observable]),
            "ordering" => TypeSet::of(&[Ordering, Trait, Attribute, Predicate]),
            "attribute" => TypeSet::of(&[Attribute, Trait, Predicate]),
            "identity" => TypeSet::of(&[Identity, Trait, Predicate]),
            "role" => TypeSet::of(&[Role, Predicate]),
            "realm" => TypeSet::of(&[Realm, Trait, Predicate]),
            "domain" => TypeSet::of(&[Domain, Predicate]),
            "energy" => physical(Energy, Extensive),
            "entropy" => physical(Entropy, Intensive),
            "length" => physical(Length, Intensive),
            "mass" => physical(Mass, Extensive),
            "volume" => physical(Volume, Extensive),
            "weight" => physical(Weight, Extensive),
            "duration" => physical(Duration, Extensive),
            "area" => physical(Area, Extensive),
            "amount" => physical(Amount, Extensive),
            "acceleration" => physical(Acceleration, Intensive),
            "electric_potential" => physical(ElectricPotential, Intensive),
            "charge" => physical(Charge, Intensive),
            "resistance" => physical(Resistance, Intensive),
            "resistivity" => physical(Resistivity, Intensive),
            "pressure" => physical(Pressure, Intensive),
            "angle" => physical(Angle, Intensive),
            "velocity" => physical(Velocity, Intensive),
            "temperature" => physical(Temperature, Intensive),
            "viscosity" => physical(Viscosity, Intensive),
            "distance" => physical(Distance, Intensive),
            "magnitude" => TypeSet::of(&[Magnitude, Quality, Observable, Subjective, Quantifiable]),
            "monetary_value" => quantifiable(MonetaryValue),
            "money" => quantifiable(Money),
            "presence" => TypeSet::of(&[Presence, Quality, Observable]),
            "proportion" => quantifiable(Proportion),
            "percentage" => quantifiable(Percentage),
            "uncertainty" => quantifiable(Uncertainty),
            "rate" => quantifiable(Rate),
            "priority" => quantifiable(Priority),
            "value" => quantifiable(Value),
            "ratio" => quantifiable(Ratio),
            "count" | "numerosity" => quantifiable(Numerosity),
            "occurrence" => quantifiable(Occurrence),
            "probability" => quantifiable(Probability),
            "process" => TypeSet::of(&[Process, DirectObservable, Observable]),
            "change" => TypeSet::of(&[Change, Process, DirectObservable, Observable]),
            "changed" => TypeSet::of(&[Changed, Event, Countable, DirectObservable, Observable]),
            "agent" => TypeSet::of(&[Agent, DirectObservable, Countable, Observable]),
            "event" => TypeSet::of(&[Event, DirectObservable, Countable, Observable]),
            "relationship" => TypeSet::of(&[
                Relationship,
                Unidirectional,
                DirectObservable,
                Countable,
                Observable,
            ]),
            "bond" => TypeSet::of(&[
                Relationship,
                Bidirectional,
                DirectObservable,
                Countable,
                Observable,
            ]),
            "configuration" => TypeSet::of(&[Configuration, DirectObservable, Observable]),
            "extent" => TypeSet::of(&[Extent]),
            _ => return None,
        };
        Some(set)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Ordered set of semantic tags
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct TypeSet(BTreeSet<SemanticType>);

impl TypeSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set from a slice of tags
    pub fn of(tags: &[SemanticType]) -> Self {
        tags.iter().copied().collect()
    }

    /// Whether the set holds a tag
    pub fn contains(&self, tag: SemanticType) -> bool {
        self.0.contains(&tag)
    }

    /// Add a tag, returning whether it was new
    pub fn insert(&mut self, tag: SemanticType) -> bool {
        self.0.insert(tag)
    }

    /// Remove a tag, returning whether it was present
    pub fn remove(&mut self, tag: SemanticType) -> bool {
        self.0.remove(&tag)
    }

    /// Copy of this set with a tag added
    pub fn with(mut self, tag: SemanticType) -> Self {
        self.0.insert(tag);
        self
    }

    /// Copy of this set with a tag removed
    pub fn without(mut self, tag: SemanticType) -> Self {
        self.0.remove(&tag);
        self
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate tags in declaration order
    pub fn iter(&self) -> impl Iterator<Item = SemanticType> + '_ {
        self.0.iter().copied()
    }

    /// Tags also present in `mask`
    pub fn intersection(&self, mask: &[SemanticType]) -> TypeSet {
        self.iter().filter(|t| mask.contains(t)).collect()
    }

    /// Whether any tag is in `mask`
    pub fn intersects(&self, mask: &[SemanticType]) -> bool {
        self.iter().any(|t| mask.contains(&t))
    }

    /// Union of two sets
    pub fn union(&self, other: &TypeSet) -> TypeSet {
        self.0.union(&other.0).copied().collect()
    }

    /// Numeric quality
    pub fn is_numeric(&self) -> bool {
        self.intersects(CONTINUOUS_QUALITY_TYPES)
    }

    /// Any kind of quality
    pub fn is_quality(&self) -> bool {
        self.intersects(ALL_QUALITY_TYPES)
    }

    /// Countable, directly observed kind
    pub fn is_countable(&self) -> bool {
        self.iter()
            .any(|t| t != Abstract && DIRECT_OBSERVABLE_TYPES.contains(&t))
    }

    /// One of the trait families, or the generic trait tag
    pub fn is_trait(&self) -> bool {
        self.intersects(ALL_TRAIT_TYPES)
    }

    /// A role
    pub fn is_role(&self) -> bool {
        self.contains(Role)
    }

    /// Trait, role or explicit predicate
    pub fn is_predicate(&self) -> bool {
        self.is_trait() || self.contains(Role) || self.contains(Predicate)
    }

    /// May carry units
    pub fn admits_units(&self) -> bool {
        self.iter().any(SemanticType::admits_units)
    }

    /// May carry a currency
    pub fn admits_currency(&self) -> bool {
        self.iter().any(SemanticType::admits_currency)
    }

    /// Unfolds in time
    pub fn is_occurrent(&self) -> bool {
        self.contains(Process) || self.contains(Event)
    }

    /// Exists only as inherent to something else
    pub fn is_dependent(&self) -> bool {
        self.is_quality() || self.contains(Process)
    }

    /// Carries the abstract tag
    pub fn is_abstract(&self) -> bool {
        self.contains(Abstract)
    }

    /// Relationship kind
    pub fn is_relationship(&self) -> bool {
        self.contains(Relationship)
    }
}

impl FromIterator<SemanticType> for TypeSet {
    fn from_iter<I: IntoIterator<Item = SemanticType>>(iter: I) -> Self {
        TypeSet(iter.into_iter().collect())
    }
}

impl Extend<SemanticType> for TypeSet {
    fn extend<I: IntoIterator<Item = SemanticType>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl<'a> IntoIterator for &'a TypeSet {
    type Item = &'a SemanticType;
    type IntoIter = std::collections::btree_set::Iter<'a, SemanticType>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The single fundamental tag of a set.
///
/// Falls back to a lone trait family, then to `Role`, and finally to
/// `Nothing` when the set is not well formed.
pub fn fundamental_type(types: &TypeSet) -> SemanticType {
    let fundamental = types.intersection(FUNDAMENTAL_TYPES);
    if fundamental.len() == 1 {
        return fundamental.iter().next().unwrap_or(Nothing);
    }
    let traits = types.intersection(TRAIT_TYPES);
    if traits.len() == 1 {
        return traits.iter().next().unwrap_or(Nothing);
    }
    if types.contains(Role) {
        return Role;
    }
    Nothing
}

/// The tag used to pick a foundational concept for a set, or `None` when no
/// known tag matches.
pub fn representative_core_type(types: &TypeSet) -> Option<SemanticType> {
    CORE_TYPE_PRECEDENCE
        .iter()
        .copied()
        .find(|t| types.contains(*t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_wins_over_extensive() {
        let types = TypeSet::of(&[Extensive, Identity, Trait]);
        assert_eq!(representative_core_type(&types), Some(Identity));
    }

    #[test]
    fn test_mass_maps_to_mass() {
        let types = SemanticType::types_for_keyword("mass").unwrap();
        assert_eq!(representative_core_type(&types), Some(Mass));
    }

    #[test]
    fn test_no_representative() {
        let types = TypeSet::of(&[Observable, Countable]);
        assert_eq!(representative_core_type(&types), None);
        assert_eq!(representative_core_type(&TypeSet::new()), None);
    }

    #[test]
    fn test_fundamental_type() {
        let quality = SemanticType::types_for_keyword("quantity").unwrap();
        assert_eq!(fundamental_type(&quality), Quality);

        // two fundamental tags, but a single trait family
        let odd = TypeSet::of(&[Identity, Attribute, Realm]);
        assert_eq!(fundamental_type(&odd), Nothing);

        let role = TypeSet::of(&[Role, Predicate, Quality, Subject]);
        assert_eq!(fundamental_type(&role), Role);
    }

    #[test]
    fn test_set_predicates() {
        let quantity = SemanticType::types_for_keyword("quantity").unwrap();
        assert!(quantity.is_numeric());
        assert!(quantity.is_quality());
        assert!(quantity.is_dependent());
        assert!(!quantity.is_countable());
        assert!(!quantity.admits_units());

        let mass = SemanticType::types_for_keyword("mass").unwrap();
        assert!(mass.admits_units());
        assert!(!mass.admits_currency());

        let money = SemanticType::types_for_keyword("monetary value").unwrap();
        assert!(money.admits_currency());

        let event = SemanticType::types_for_keyword("event").unwrap();
        assert!(event.is_countable());
        assert!(event.is_occurrent());
        assert!(!event.is_dependent());

        let identity = SemanticType::types_for_keyword("identity").unwrap();
        assert!(identity.is_trait());
        assert!(identity.is_predicate());

        let role = SemanticType::types_for_keyword("role").unwrap();
        assert!(role.is_predicate());
        assert!(!role.is_trait());

        // abstract alone does not make something countable
        assert!(!TypeSet::of(&[Abstract, Quality]).is_countable());
    }

    #[test]
    fn test_keyword_normalization() {
        assert_eq!(
            SemanticType::types_for_keyword("Electric-Potential"),
            SemanticType::types_for_keyword("electric_potential")
        );
        assert!(SemanticType::types_for_keyword("unicorn").is_none());
    }

    #[test]
    fn test_rate_keyword_has_no_intensive_by_default() {
        let rate = SemanticType::types_for_keyword("rate").unwrap();
        assert!(rate.contains(Rate));
        assert!(!rate.contains(Intensive));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&TypeSet::of(&[MonetaryValue, Quality])).unwrap();
        assert_eq!(json, r#"["QUALITY","MONETARY_VALUE"]"#);
    }
}
