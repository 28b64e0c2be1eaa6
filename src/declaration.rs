// Copyright 2025 Cowboy AI, LLC.

//! Declarations
//!
//! Declarations are the syntactic side of concepts: already-parsed trees
//! handed over by the language front-end. The composition core never
//! classifies from them. It reads them to rebuild concepts and rewrites
//! their modifier fields to recompute canonical URNs.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::errors::{SemanticError, SemanticResult};
use crate::mediation::{Mediation, NumericRange};
use crate::observable::{Literal, ResolutionDirective, ValueOperand};
use crate::operators::{UnarySemanticOperator, ValueOperator};
use crate::semantic_role::SemanticRole;
use crate::semantic_type::{SemanticType, TypeSet};

/// Parsed concept expression
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Namespace of the main concept
    pub namespace: String,
    /// Name of the main concept
    pub name: String,
    /// Tags of the main concept
    pub types: TypeSet,
    /// `each`
    pub collective: bool,
    /// Attached traits
    pub traits: Vec<Declaration>,
    /// Attached roles
    pub roles: Vec<Declaration>,
    /// Positional modifiers
    pub modifiers: BTreeMap<SemanticRole, Declaration>,
    /// Unary operator applied to everything else
    pub operator: Option<UnarySemanticOperator>,
    /// Comparison operand of the operator
    pub comparison: Option<Box<Declaration>>,
}

impl Declaration {
    /// Reference to a single named concept
    pub fn named(namespace: impl Into<String>, name: impl Into<String>, types: TypeSet) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            types,
            ..Self::default()
        }
    }

    /// URN of the main concept
    pub fn main_urn(&self) -> String {
        format!("{}:{}", self.namespace, self.name)
    }

    /// Add a trait
    pub fn with_trait(mut self, declaration: Declaration) -> Self {
        self.traits.push(declaration);
        self
    }

    /// Add a role
    pub fn with_role(mut self, declaration: Declaration) -> Self {
        self.roles.push(declaration);
        self
    }

    /// Set a positional modifier
    pub fn with_modifier(mut self, role: SemanticRole, declaration: Declaration) -> Self {
        self.modifiers.insert(role, declaration);
        self
    }

    /// Apply a unary operator to the rest of the declaration
    pub fn with_operator(
        mut self,
        operator: UnarySemanticOperator,
        comparison: Option<Declaration>,
    ) -> Self {
        self.operator = Some(operator);
        self.comparison = comparison.map(Box::new);
        self
    }

    /// Mark as collective
    pub fn each(mut self) -> Self {
        self.collective = true;
        self
    }

    /// Whether anything beyond the main concept is declared
    pub fn is_composite(&self) -> bool {
        self.collective
            || self.operator.is_some()
            || !self.traits.is_empty()
            || !self.roles.is_empty()
            || !self.modifiers.is_empty()
    }

    /// Same declaration without its operator and comparison
    pub fn argument(&self) -> Declaration {
        Declaration {
            operator: None,
            comparison: None,
            ..self.clone()
        }
    }

    /// Canonical textual form
    pub fn urn(&self) -> String {
        let body = self.argument().render_body();
        match self.operator {
            None => body,
            Some(op) => {
                let argument = if self.argument().is_composite() {
                    format!("({body})")
                } else {
                    body
                };
                let mut text = format!("{} {}", op.declaration().0, argument);
                if let (Some(keyword), Some(comparison)) = (op.declaration().1, &self.comparison) {
                    text.push_str(&format!(" {} {}", keyword, comparison.nested()));
                }
                text
            }
        }
    }

    fn nested(&self) -> String {
        if self.is_composite() {
            format!("({})", self.urn())
        } else {
            self.urn()
        }
    }

    fn render_body(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if self.collective {
            parts.push("each".to_string());
        }
        let mut traits: Vec<String> = self.traits.iter().map(Declaration::nested).collect();
        traits.sort();
        parts.extend(traits);
        parts.push(self.main_urn());
        for (role, declaration) in &self.modifiers {
            parts.push(role.keyword().to_string());
            parts.push(declaration.nested());
        }
        if !self.roles.is_empty() {
            let mut roles: Vec<String> = self.roles.iter().map(Declaration::nested).collect();
            roles.sort();
            parts.push("as".to_string());
            parts.extend(roles);
        }
        parts.join(" ")
    }
}

/// Parsed observable: a concept expression plus mediation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservableDeclaration {
    /// Concept expression
    pub concept: Declaration,
    /// Unit or currency
    pub mediation: Option<Mediation>,
    /// Numeric range
    pub range: Option<NumericRange>,
    /// Ordered value operators
    pub value_operators: Vec<(ValueOperator, ValueOperand)>,
    /// Inline value
    pub default_value: Option<Literal>,
    /// Resolution directives
    pub resolution_directives: BTreeSet<ResolutionDirective>,
    /// `optional`
    pub optional: bool,
    /// Name given by the modeller
    pub stated_name: Option<String>,
}

impl ObservableDeclaration {
    /// Observable over a concept expression, with no mediation
    pub fn of(concept: Declaration) -> Self {
        Self {
            concept,
            ..Self::default()
        }
    }
}

/// Emergence trigger expression, by URN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerDeclaration {
    /// A single trigger concept
    Urn(String),
    /// Any operand suffices
    Union(Vec<TriggerDeclaration>),
    /// Every operand is required
    Intersection(Vec<TriggerDeclaration>),
}

/// Named concept definition (`quality Biomass is ...`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptStatement {
    /// Namespace
    pub namespace: String,
    /// Name
    pub name: String,
    /// Tags
    pub types: TypeSet,
    /// Parent URNs; the core type is used when empty
    pub parents: Vec<String>,
    /// Foundational concept this statement stands for
    pub core_peer: Option<String>,
    /// Adopted trait URNs
    pub traits: Vec<String>,
    /// Declared positional restrictions and roles
    pub restrictions: Vec<(SemanticRole, String)>,
    /// Emergence triggers
    pub emergence: Vec<TriggerDeclaration>,
    /// Label for humans
    pub label: Option<String>,
}

impl ConceptStatement {
    /// Statement with explicit tags
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, types: TypeSet) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            types,
            parents: Vec::new(),
            core_peer: None,
            traits: Vec::new(),
            restrictions: Vec::new(),
            emergence: Vec::new(),
            label: None,
        }
    }

    /// Statement whose tags come from a declaration keyword
    pub fn from_keyword(
        namespace: impl Into<String>,
        name: impl Into<String>,
        keyword: &str,
    ) -> SemanticResult<Self> {
        let types = SemanticType::types_for_keyword(keyword)
            .ok_or_else(|| SemanticError::invalid(format!("unknown concept keyword '{keyword}'")))?;
        Ok(Self::new(namespace, name, types))
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: SemanticType) -> Self {
        self.types.insert(tag);
        self
    }

    /// Add a parent
    pub fn with_parent(mut self, urn: impl Into<String>) -> Self {
        self.parents.push(urn.into());
        self
    }

    /// Stand in for a foundational concept
    pub fn as_core_peer(mut self, urn: impl Into<String>) -> Self {
        self.core_peer = Some(urn.into());
        self
    }

    /// Adopt a trait
    pub fn with_trait(mut self, urn: impl Into<String>) -> Self {
        self.traits.push(urn.into());
        self
    }

    /// Declare a positional restriction or role
    pub fn with_restriction(mut self, role: SemanticRole, urn: impl Into<String>) -> Self {
        self.restrictions.push((role, urn.into()));
        self
    }

    /// Declare an emergence trigger
    pub fn with_emergence(mut self, trigger: TriggerDeclaration) -> Self {
        self.emergence.push(trigger);
        self
    }

    /// Set the human label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// `namespace:name`
    pub fn urn(&self) -> String {
        format!("{}:{}", self.namespace, self.name)
    }

    /// Declaration referring to the defined concept
    pub fn declaration(&self) -> Declaration {
        Declaration::named(self.namespace.clone(), self.name.clone(), self.types.clone())
    }
}

/// Where declarations come from (parser, resource catalog)
#[cfg_attr(test, mockall::automock)]
pub trait DeclarationSource: Send + Sync {
    /// Resolve a URN, failing when unknown
    fn resolve(&self, urn: &str) -> SemanticResult<Declaration>;

    /// Declaration of a known concept, if any
    fn retrieve_concept(&self, urn: &str) -> Option<Declaration>;
}

/// Declaration source held in memory
#[derive(Debug, Default)]
pub struct InMemoryDeclarationCatalog {
    declarations: RwLock<HashMap<String, Declaration>>,
}

impl InMemoryDeclarationCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration under its canonical URN
    pub fn register(&self, declaration: Declaration) -> SemanticResult<()> {
        let mut map = self
            .declarations
            .write()
            .map_err(|_| SemanticError::LockPoisoned("declaration catalog".to_string()))?;
        map.insert(declaration.urn(), declaration);
        Ok(())
    }

    /// Number of declarations
    pub fn len(&self) -> usize {
        self.declarations.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DeclarationSource for InMemoryDeclarationCatalog {
    fn resolve(&self, urn: &str) -> SemanticResult<Declaration> {
        self.retrieve_concept(urn)
            .ok_or_else(|| SemanticError::DeclarationNotFound(urn.to_string()))
    }

    fn retrieve_concept(&self, urn: &str) -> Option<Declaration> {
        self.declarations.read().ok()?.get(urn).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn named(name: &str) -> Declaration {
        Declaration::named("geo", name, TypeSet::new())
    }

    #[test]
    fn test_simple_urn() {
        assert_eq!(named("Forest").urn(), "geo:Forest");
        assert!(!named("Forest").is_composite());
    }

    #[test]
    fn test_composite_urn_order() {
        let decl = named("Biomass")
            .with_modifier(SemanticRole::Causant, named("Rain"))
            .with_modifier(SemanticRole::Inherent, named("Forest"))
            .with_trait(named("Tropical"))
            .with_trait(named("Dry"));
        assert_eq!(
            decl.urn(),
            "geo:Dry geo:Tropical geo:Biomass of geo:Forest caused by geo:Rain"
        );
    }

    #[test]
    fn test_operator_urn() {
        let decl = named("Biomass")
            .with_modifier(SemanticRole::Inherent, named("Forest"))
            .with_operator(UnarySemanticOperator::Ratio, Some(named("Area")));
        assert_eq!(decl.urn(), "ratio of (geo:Biomass of geo:Forest) to geo:Area");
        assert_eq!(decl.argument().urn(), "geo:Biomass of geo:Forest");
    }

    #[test]
    fn test_relationship_urn() {
        let decl = named("Flow")
            .with_modifier(SemanticRole::RelationshipTarget, named("Sea"))
            .with_modifier(SemanticRole::RelationshipSource, named("River"));
        assert_eq!(decl.urn(), "geo:Flow linking geo:River to geo:Sea");
    }

    #[test]
    fn test_catalog_resolve() {
        let catalog = InMemoryDeclarationCatalog::new();
        catalog.register(named("Forest")).unwrap();
        assert_eq!(catalog.resolve("geo:Forest").unwrap(), named("Forest"));
        assert!(matches!(
            catalog.resolve("geo:Lake"),
            Err(SemanticError::DeclarationNotFound(_))
        ));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_statement_from_keyword() {
        let statement = ConceptStatement::from_keyword("geo", "Forest", "thing").unwrap();
        assert!(statement.types.contains(SemanticType::Subject));
        assert_eq!(statement.urn(), "geo:Forest");
        assert!(ConceptStatement::from_keyword("geo", "X", "nope").is_err());
    }

    #[test]
    fn test_mocked_source() {
        let mut source = MockDeclarationSource::new();
        source
            .expect_retrieve_concept()
            .times(1)
            .returning(|_| Some(Declaration::named("geo", "Forest", TypeSet::new())));
        assert!(source.retrieve_concept("geo:Forest").is_some());
    }
}
