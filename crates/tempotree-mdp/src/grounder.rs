use std::{collections::BTreeSet, sync::Arc};

use itertools::Itertools;
use tracing::{debug, info};

use crate::{
    ActionSchema, AtomId, AtomTable, Domain, EffectGroup, FluentTemplate, GroundAction,
    GroundFluent, GroundProblem, Literal, MdpError, ObjectId, ProblemCore, SchemaId, Universe,
    model::render,
};

/// Instantiate every schema of `domain` into ground actions.
///
/// Schemas with a grounding-map entry use exactly the listed tuples, others the
/// full product of their parameter types. Output order is schema declaration
/// order, then tuple order, so grounding the same domain twice is identical.
pub fn ground(domain: &Domain) -> Result<GroundProblem, MdpError> {
    let universe = domain.universe();
    let mut atoms = AtomTable::new();

    let initial = initial_atoms(domain, &mut atoms)?;
    let goals = domain
        .goals()
        .iter()
        .map(|(fluent, value)| {
            universe.check_signature(fluent)?;
            Ok(Literal::new(atoms.intern(fluent.clone()), *value))
        })
        .collect::<Result<Vec<_>, MdpError>>()?;

    let mut actions = Vec::new();
    for (index, schema) in domain.schemas().iter().enumerate() {
        let id = SchemaId::from(index);
        let tuples = match domain.grounding_map().and_then(|map| map.get(id)) {
            Some(tuples) => {
                for tuple in tuples {
                    check_tuple(universe, schema, tuple)?;
                }
                tuples.to_vec()
            }
            None => cartesian(
                &schema
                    .params
                    .iter()
                    .map(|(_, ty)| universe.objects_of(*ty))
                    .collect::<Vec<_>>(),
            ),
        };

        debug!(schema = %schema.name, instances = tuples.len(), "grounding schema");
        for tuple in tuples {
            actions.push(instantiate(universe, &mut atoms, id, schema, tuple)?);
        }
    }

    info!(
        domain = domain.name(),
        actions = actions.len(),
        propositions = atoms.len(),
        "grounded domain"
    );

    Ok(GroundProblem {
        core: ProblemCore {
            name: domain.name().to_string(),
            universe: Arc::clone(universe),
            atoms: Arc::new(atoms),
            initial,
            goals,
            deadline: domain.deadline(),
        },
        actions,
    })
}

/// Default-true instances first, then explicit values in declaration order.
fn initial_atoms(domain: &Domain, atoms: &mut AtomTable) -> Result<BTreeSet<AtomId>, MdpError> {
    let universe = domain.universe();
    let mut initial = BTreeSet::new();

    for (fluent, decl) in universe.fluents() {
        if !decl.default {
            continue;
        }
        let candidates: Vec<Vec<ObjectId>> = decl.params.iter().map(|ty| universe.objects_of(*ty)).collect();
        for args in cartesian(&candidates) {
            initial.insert(atoms.intern(GroundFluent::new(fluent, args)));
        }
    }

    for (fluent, value) in domain.initial_values() {
        universe.check_signature(fluent)?;
        let atom = atoms.intern(fluent.clone());
        if *value {
            initial.insert(atom);
        } else {
            initial.remove(&atom);
        }
    }
    Ok(initial)
}

fn check_tuple(universe: &Universe, schema: &ActionSchema, tuple: &[ObjectId]) -> Result<(), MdpError> {
    if tuple.len() != schema.params.len() {
        return Err(MdpError::ArityMismatch {
            schema: schema.name.clone(),
            expected: schema.params.len(),
            found: tuple.len(),
        });
    }

    for ((parameter, expected), object) in schema.params.iter().zip(tuple) {
        let decl = universe
            .object(*object)
            .ok_or_else(|| MdpError::UnknownObject {
                name: format!("#{}", object.index()),
            })?;
        if decl.ty != *expected {
            return Err(MdpError::TypeMismatch {
                schema: schema.name.clone(),
                parameter: parameter.clone(),
                expected: universe.type_name(*expected),
                object: decl.name.clone(),
                found: universe.type_name(decl.ty),
            });
        }
    }
    Ok(())
}

fn instantiate(
    universe: &Universe,
    atoms: &mut AtomTable,
    id: SchemaId,
    schema: &ActionSchema,
    args: Vec<ObjectId>,
) -> Result<GroundAction, MdpError> {
    let mut bind = |template: &FluentTemplate| -> Result<AtomId, MdpError> {
        let ground = template
            .bind(&args)
            .ok_or_else(|| MdpError::UnboundParameter {
                schema: schema.name.clone(),
                index: template.params().map(|(_, index)| index).max().unwrap_or(0),
            })?;
        universe.check_signature(&ground)?;
        Ok(atoms.intern(ground))
    };

    let preconditions = schema
        .conditions
        .iter()
        .map(|c| Ok((c.timing, Literal::new(bind(&c.fluent)?, c.value))))
        .collect::<Result<Vec<_>, MdpError>>()?;
    let effects = schema
        .effects
        .iter()
        .map(|e| Ok((e.timing, Literal::new(bind(&e.fluent)?, e.value))))
        .collect::<Result<Vec<_>, MdpError>>()?;
    let resources = schema
        .resources
        .iter()
        .map(&mut bind)
        .collect::<Result<BTreeSet<_>, MdpError>>()?;

    let mut groups = Vec::with_capacity(schema.probabilistic.len());
    for effect in &schema.probabilistic {
        let targets = effect
            .targets
            .iter()
            .map(&mut bind)
            .collect::<Result<Vec<_>, MdpError>>()?;
        groups.push(EffectGroup {
            targets,
            law: Arc::clone(&effect.law),
            bindings: args.clone(),
        });
    }

    let name = render(&schema.name, args.iter().map(|o| universe.object_name(*o)));
    Ok(GroundAction {
        name,
        schema: id,
        args,
        duration: schema.duration,
        preconditions,
        effects,
        groups,
        resources,
        combinable: schema.combinable,
    })
}

/// All tuples picking one candidate per position; the last position varies fastest.
fn cartesian(candidates: &[Vec<ObjectId>]) -> Vec<Vec<ObjectId>> {
    if candidates.is_empty() {
        return vec![Vec::new()];
    }
    candidates
        .iter()
        .map(|options| options.iter().copied())
        .multi_cartesian_product()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cartesian_varies_last_position_fastest() {
        let a = ObjectId::from(0);
        let b = ObjectId::from(1);
        let c = ObjectId::from(2);

        let tuples = cartesian(&[vec![a, b], vec![c, a]]);
        assert_eq!(tuples, vec![vec![a, c], vec![a, a], vec![b, c], vec![b, a]]);
        assert_eq!(cartesian(&[]), vec![Vec::<ObjectId>::new()]);
        assert!(cartesian(&[vec![a], Vec::new()]).is_empty());
    }
}
