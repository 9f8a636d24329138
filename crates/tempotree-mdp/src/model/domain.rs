use std::{collections::BTreeMap, fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    ActionSchema, FluentId, FluentTemplate, GroundFluent, MdpError, ObjectId, ProbabilityLaw,
    SchemaId, Term, TypeId, Universe,
};

/// How a domain is meant to be compiled; some domains declare resources differently per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainKind {
    #[default]
    Regular,
    RegularAsBaseline,
    Combination,
}

impl DomainKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DomainKind::Regular => "regular",
            DomainKind::RegularAsBaseline => "regular_as_baseline",
            DomainKind::Combination => "combination",
        }
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainKind {
    type Err = MdpError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "regular" => Ok(DomainKind::Regular),
            "regular_as_baseline" => Ok(DomainKind::RegularAsBaseline),
            "combination" => Ok(DomainKind::Combination),
            other => Err(MdpError::InvalidConfig(format!(
                "unknown domain type '{other}', expected regular, regular_as_baseline or combination"
            ))),
        }
    }
}

/// Explicit parameter tuples allowed per schema; schemas without an entry ground fully.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingMap {
    entries: BTreeMap<SchemaId, Vec<Vec<ObjectId>>>,
}

impl GroundingMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, schema: SchemaId, tuples: Vec<Vec<ObjectId>>) {
        self.entries.insert(schema, tuples);
    }

    pub fn get(&self, schema: SchemaId) -> Option<&[Vec<ObjectId>]> {
        self.entries.get(&schema).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An uncompiled planning problem: universe, schemas, initial values, goals and deadline.
#[derive(Debug, Clone)]
pub struct Domain {
    name: String,
    kind: DomainKind,
    universe: Arc<Universe>,
    schemas: Vec<ActionSchema>,
    initial: Vec<(GroundFluent, bool)>,
    goals: Vec<(GroundFluent, bool)>,
    deadline: u32,
    grounding_map: Option<GroundingMap>,
    size_params: Vec<u32>,
}

impl Domain {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DomainKind {
        self.kind
    }

    pub fn universe(&self) -> &Arc<Universe> {
        &self.universe
    }

    pub fn schemas(&self) -> &[ActionSchema] {
        &self.schemas
    }

    pub fn schema(&self, id: SchemaId) -> Option<&ActionSchema> {
        self.schemas.get(id.index())
    }

    pub fn schema_id(&self, name: &str) -> Result<SchemaId, MdpError> {
        self.schemas
            .iter()
            .position(|s| s.name == name)
            .map(SchemaId::from)
            .ok_or_else(|| MdpError::UnknownSchema {
                name: name.to_string(),
            })
    }

    /// Explicit initial values; every other ground fluent takes its declared default.
    pub fn initial_values(&self) -> &[(GroundFluent, bool)] {
        &self.initial
    }

    pub fn goals(&self) -> &[(GroundFluent, bool)] {
        &self.goals
    }

    pub fn deadline(&self) -> u32 {
        self.deadline
    }

    pub fn grounding_map(&self) -> Option<&GroundingMap> {
        self.grounding_map.as_ref()
    }

    /// Size parameters that distinguish compiled variants of this domain.
    pub fn size_params(&self) -> &[u32] {
        &self.size_params
    }

    pub fn with_deadline(mut self, deadline: u32) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_grounding_map(mut self, map: GroundingMap) -> Self {
        self.grounding_map = Some(map);
        self
    }

    /// Copy of the domain with the law of one probabilistic group replaced.
    pub fn with_law(&self, schema: &str, group: usize, law: ProbabilityLaw) -> Result<Self, MdpError> {
        let id = self.schema_id(schema)?;
        let mut domain = self.clone();
        let target = domain
            .schemas
            .get_mut(id.index())
            .and_then(|s| s.probabilistic.get_mut(group))
            .ok_or_else(|| MdpError::UnknownEffectGroup {
                schema: schema.to_string(),
                group,
            })?;
        check_targets(schema, group, target.targets.len(), &law)?;
        target.law = Arc::new(law);
        Ok(domain)
    }
}

fn check_targets(schema: &str, group: usize, targets: usize, law: &ProbabilityLaw) -> Result<(), MdpError> {
    match law.max_target() {
        Some(target) if target >= targets => Err(MdpError::InvalidOutcomeTarget {
            schema: schema.to_string(),
            group,
            target,
            targets,
        }),
        _ => Ok(()),
    }
}

/// Incremental authoring of a [`Domain`], validated by [`DomainBuilder::build`].
#[derive(Debug, Clone)]
pub struct DomainBuilder {
    name: String,
    kind: DomainKind,
    universe: Universe,
    schemas: Vec<ActionSchema>,
    initial: Vec<(GroundFluent, bool)>,
    goals: Vec<(GroundFluent, bool)>,
    deadline: u32,
    grounding_map: Option<GroundingMap>,
    size_params: Vec<u32>,
}

impl DomainBuilder {
    pub fn new(name: impl Into<String>, kind: DomainKind) -> Self {
        Self {
            name: name.into(),
            kind,
            universe: Universe::new(),
            schemas: Vec::new(),
            initial: Vec::new(),
            goals: Vec::new(),
            deadline: 0,
            grounding_map: None,
            size_params: Vec::new(),
        }
    }

    pub fn kind(&self) -> DomainKind {
        self.kind
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn user_type(&mut self, name: impl Into<String>) -> Result<TypeId, MdpError> {
        self.universe.add_type(name)
    }

    pub fn object(&mut self, name: impl Into<String>, ty: TypeId) -> Result<ObjectId, MdpError> {
        self.universe.add_object(name, ty)
    }

    pub fn objects<I, S>(&mut self, names: I, ty: TypeId) -> Result<Vec<ObjectId>, MdpError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .map(|name| self.universe.add_object(name, ty))
            .collect()
    }

    pub fn fluent(
        &mut self,
        name: impl Into<String>,
        params: &[TypeId],
        default: bool,
    ) -> Result<FluentId, MdpError> {
        self.universe.add_fluent(name, params, default)
    }

    pub fn initial(&mut self, fluent: FluentId, args: &[ObjectId], value: bool) -> &mut Self {
        self.initial.push((GroundFluent::new(fluent, args), value));
        self
    }

    pub fn goal(&mut self, fluent: FluentId, args: &[ObjectId], value: bool) -> &mut Self {
        self.goals.push((GroundFluent::new(fluent, args), value));
        self
    }

    pub fn deadline(&mut self, deadline: u32) -> &mut Self {
        self.deadline = deadline;
        self
    }

    pub fn size_params(&mut self, params: Vec<u32>) -> &mut Self {
        self.size_params = params;
        self
    }

    pub fn action(&mut self, schema: ActionSchema) -> Result<SchemaId, MdpError> {
        if self.schemas.iter().any(|s| s.name == schema.name) {
            return Err(MdpError::DuplicateName {
                kind: "action",
                name: schema.name,
            });
        }
        self.schemas.push(schema);
        Ok(SchemaId::from(self.schemas.len() - 1))
    }

    pub fn grounding(&mut self, schema: SchemaId, tuples: Vec<Vec<ObjectId>>) -> &mut Self {
        self.grounding_map
            .get_or_insert_with(GroundingMap::new)
            .insert(schema, tuples);
        self
    }

    pub fn build(self) -> Result<Domain, MdpError> {
        for (fluent, _) in self.initial.iter().chain(&self.goals) {
            self.universe.check_signature(fluent)?;
        }

        for schema in &self.schemas {
            for template in schema.templates() {
                check_template(&self.universe, schema, template)?;
            }
            for (group, effect) in schema.probabilistic.iter().enumerate() {
                check_targets(&schema.name, group, effect.targets.len(), &effect.law)?;
            }
        }

        if let Some(map) = &self.grounding_map {
            if let Some(schema) = map.entries.keys().find(|id| id.index() >= self.schemas.len()) {
                return Err(MdpError::UnknownSchema {
                    name: format!("#{}", schema.index()),
                });
            }
        }

        Ok(Domain {
            name: self.name,
            kind: self.kind,
            universe: Arc::new(self.universe),
            schemas: self.schemas,
            initial: self.initial,
            goals: self.goals,
            deadline: self.deadline,
            grounding_map: self.grounding_map,
            size_params: self.size_params,
        })
    }
}

/// A template must match its fluent's arity, and every term must have the parameter's type.
fn check_template(universe: &Universe, schema: &ActionSchema, template: &FluentTemplate) -> Result<(), MdpError> {
    let decl = universe
        .fluent(template.fluent)
        .ok_or_else(|| MdpError::UnknownFluent {
            name: format!("#{}", template.fluent.index()),
        })?;

    if decl.params.len() != template.args.len() {
        return Err(MdpError::SignatureMismatch {
            fluent: decl.name.clone(),
            detail: format!(
                "schema '{}' passes {} arguments, expected {}",
                schema.name,
                template.args.len(),
                decl.params.len()
            ),
        });
    }

    for (expected, term) in decl.params.iter().zip(&template.args) {
        let found = match term {
            Term::Param(index) => {
                schema
                    .params
                    .get(*index)
                    .ok_or_else(|| MdpError::UnboundParameter {
                        schema: schema.name.clone(),
                        index: *index,
                    })?
                    .1
            }
            Term::Object(object) => {
                universe
                    .object(*object)
                    .ok_or_else(|| MdpError::UnknownObject {
                        name: format!("#{}", object.index()),
                    })?
                    .ty
            }
        };

        if found != *expected {
            return Err(MdpError::SignatureMismatch {
                fluent: decl.name.clone(),
                detail: format!(
                    "schema '{}' passes a '{}' where '{}' is expected",
                    schema.name,
                    universe.type_name(found),
                    universe.type_name(*expected)
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OutcomeSpec, Timing};

    fn tiny() -> DomainBuilder {
        let mut builder = DomainBuilder::new("tiny", DomainKind::Regular);
        let part = builder.user_type("Part").expect("type");
        builder.object("a", part).expect("object");
        builder.fluent("got", &[part], false).expect("fluent");
        builder
    }

    #[test]
    fn build_rejects_mistyped_template() {
        let mut builder = tiny();
        let tool = builder.user_type("Tool").expect("type");
        let got = builder.universe().fluent_id("got").expect("fluent");

        let mut schema = ActionSchema::new("grab", 1);
        let t = schema.parameter("t", tool);
        schema.effect(crate::EffectTiming::End, FluentTemplate::new(got, [t]), true);
        builder.action(schema).expect("action");

        assert!(matches!(builder.build(), Err(MdpError::SignatureMismatch { .. })));
    }

    #[test]
    fn build_rejects_unbound_parameter() {
        let mut builder = tiny();
        let got = builder.universe().fluent_id("got").expect("fluent");

        let mut schema = ActionSchema::new("grab", 1);
        schema.precondition(Timing::Start, FluentTemplate::new(got, [Term::Param(2)]), true);
        builder.action(schema).expect("action");

        assert!(matches!(builder.build(), Err(MdpError::UnboundParameter { index: 2, .. })));
    }

    #[test]
    fn with_law_replaces_one_group_and_checks_targets() {
        let mut builder = tiny();
        let got = builder.universe().fluent_id("got").expect("fluent");
        let a = builder.universe().object_id("a").expect("object");

        let mut schema = ActionSchema::new("grab", 1);
        schema.probabilistic(
            vec![FluentTemplate::constant(got, &[a])],
            ProbabilityLaw::fixed(vec![OutcomeSpec::new(1.0, [(0, true)])]),
        );
        builder.action(schema).expect("action");
        let domain = builder.build().expect("domain");

        let swapped = domain
            .with_law(
                "grab",
                0,
                ProbabilityLaw::fixed(vec![OutcomeSpec::new(0.5, [(0, true)]), OutcomeSpec::unchanged(0.5)]),
            )
            .expect("swap");
        assert_eq!(swapped.schemas()[0].probabilistic[0].law.branches()[0].len(), 2);
        assert_eq!(domain.schemas()[0].probabilistic[0].law.branches()[0].len(), 1);

        assert!(matches!(
            domain.with_law("grab", 0, ProbabilityLaw::fixed(vec![OutcomeSpec::new(1.0, [(3, true)])])),
            Err(MdpError::InvalidOutcomeTarget { target: 3, .. })
        ));
        assert!(matches!(
            domain.with_law("grab", 1, ProbabilityLaw::fixed(Vec::new())),
            Err(MdpError::UnknownEffectGroup { .. })
        ));
    }

    #[test]
    fn domain_kind_parses_cli_names() {
        assert_eq!("regular_as_baseline".parse::<DomainKind>().expect("kind"), DomainKind::RegularAsBaseline);
        assert!("parallel".parse::<DomainKind>().is_err());
    }
}
