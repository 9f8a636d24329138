use serde::{Deserialize, Serialize};

use crate::{FluentId, GroundFluent, MdpError, ObjectId, TypeId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDecl {
    pub name: String,
    pub ty: TypeId,
}

/// A boolean predicate with an ordered parameter-type signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluentDecl {
    pub name: String,
    pub params: Vec<TypeId>,
    /// Value of every ground instance not set explicitly in the initial state.
    pub default: bool,
}

/// Read-only table of the types, objects and fluents of one domain.
///
/// Downstream stages share it through `Arc<Universe>`; names are only used
/// for lookups while authoring and for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    types: Vec<TypeDecl>,
    objects: Vec<ObjectDecl>,
    fluents: Vec<FluentDecl>,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type(&mut self, name: impl Into<String>) -> Result<TypeId, MdpError> {
        let name = name.into();
        if self.types.iter().any(|t| t.name == name) {
            return Err(MdpError::DuplicateName { kind: "type", name });
        }
        self.types.push(TypeDecl { name });
        Ok(TypeId::from(self.types.len() - 1))
    }

    pub fn add_object(&mut self, name: impl Into<String>, ty: TypeId) -> Result<ObjectId, MdpError> {
        let name = name.into();
        if self.types.get(ty.index()).is_none() {
            return Err(MdpError::UnknownType {
                name: format!("#{}", ty.index()),
            });
        }
        if self.objects.iter().any(|o| o.name == name) {
            return Err(MdpError::DuplicateName {
                kind: "object",
                name,
            });
        }
        self.objects.push(ObjectDecl { name, ty });
        Ok(ObjectId::from(self.objects.len() - 1))
    }

    pub fn add_fluent(
        &mut self,
        name: impl Into<String>,
        params: &[TypeId],
        default: bool,
    ) -> Result<FluentId, MdpError> {
        let name = name.into();
        if let Some(missing) = params.iter().find(|ty| self.types.get(ty.index()).is_none()) {
            return Err(MdpError::UnknownType {
                name: format!("#{}", missing.index()),
            });
        }
        if self.fluents.iter().any(|f| f.name == name) {
            return Err(MdpError::DuplicateName {
                kind: "fluent",
                name,
            });
        }
        self.fluents.push(FluentDecl {
            name,
            params: params.to_vec(),
            default,
        });
        Ok(FluentId::from(self.fluents.len() - 1))
    }

    pub fn type_id(&self, name: &str) -> Result<TypeId, MdpError> {
        self.types
            .iter()
            .position(|t| t.name == name)
            .map(TypeId::from)
            .ok_or_else(|| MdpError::UnknownType {
                name: name.to_string(),
            })
    }

    pub fn object_id(&self, name: &str) -> Result<ObjectId, MdpError> {
        self.objects
            .iter()
            .position(|o| o.name == name)
            .map(ObjectId::from)
            .ok_or_else(|| MdpError::UnknownObject {
                name: name.to_string(),
            })
    }

    pub fn fluent_id(&self, name: &str) -> Result<FluentId, MdpError> {
        self.fluents
            .iter()
            .position(|f| f.name == name)
            .map(FluentId::from)
            .ok_or_else(|| MdpError::UnknownFluent {
                name: name.to_string(),
            })
    }

    pub fn type_decl(&self, id: TypeId) -> Option<&TypeDecl> {
        self.types.get(id.index())
    }

    pub fn object(&self, id: ObjectId) -> Option<&ObjectDecl> {
        self.objects.get(id.index())
    }

    pub fn fluent(&self, id: FluentId) -> Option<&FluentDecl> {
        self.fluents.get(id.index())
    }

    pub fn fluents(&self) -> impl Iterator<Item = (FluentId, &FluentDecl)> {
        self.fluents
            .iter()
            .enumerate()
            .map(|(i, decl)| (FluentId::from(i), decl))
    }

    /// Objects of `ty` in declaration order.
    pub fn objects_of(&self, ty: TypeId) -> Vec<ObjectId> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.ty == ty)
            .map(|(i, _)| ObjectId::from(i))
            .collect()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub(crate) fn type_name(&self, id: TypeId) -> String {
        self.type_decl(id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| format!("#{}", id.index()))
    }

    pub(crate) fn object_name(&self, id: ObjectId) -> String {
        self.object(id)
            .map(|o| o.name.clone())
            .unwrap_or_else(|| format!("#{}", id.index()))
    }

    pub(crate) fn fluent_name(&self, id: FluentId) -> String {
        self.fluent(id)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| format!("#{}", id.index()))
    }

    /// Check arity and object types of a ground fluent against its declaration.
    pub fn check_signature(&self, ground: &GroundFluent) -> Result<(), MdpError> {
        let decl = self
            .fluent(ground.fluent)
            .ok_or_else(|| MdpError::UnknownFluent {
                name: format!("#{}", ground.fluent.index()),
            })?;

        if decl.params.len() != ground.args.len() {
            return Err(MdpError::SignatureMismatch {
                fluent: decl.name.clone(),
                detail: format!(
                    "expected {} arguments, got {}",
                    decl.params.len(),
                    ground.args.len()
                ),
            });
        }

        for (position, (expected, object)) in decl.params.iter().zip(&ground.args).enumerate() {
            let found = self
                .object(*object)
                .ok_or_else(|| MdpError::UnknownObject {
                    name: format!("#{}", object.index()),
                })?;
            if found.ty != *expected {
                return Err(MdpError::SignatureMismatch {
                    fluent: decl.name.clone(),
                    detail: format!(
                        "argument {position} expects '{}', got '{}' of type '{}'",
                        self.type_name(*expected),
                        found.name,
                        self.type_name(found.ty)
                    ),
                });
            }
        }
        Ok(())
    }

    /// Render a ground fluent as `name(obj, ...)`, or the bare name when nullary.
    pub fn describe(&self, ground: &GroundFluent) -> String {
        render(
            &self.fluent_name(ground.fluent),
            ground.args.iter().map(|o| self.object_name(*o)),
        )
    }
}

/// `name(a, b)` or `name` for an empty argument list.
pub(crate) fn render(name: &str, args: impl Iterator<Item = String>) -> String {
    let args: Vec<String> = args.collect();
    if args.is_empty() {
        name.to_string()
    } else {
        format!("{name}({})", args.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_check_rejects_wrong_types_and_arity() {
        let mut universe = Universe::new();
        let part = universe.add_type("Part").expect("type");
        let tool = universe.add_type("Tool").expect("type");
        let a = universe.add_object("a", part).expect("object");
        let t = universe.add_object("t", tool).expect("object");
        let got = universe.add_fluent("got", &[part], false).expect("fluent");

        assert!(universe.check_signature(&GroundFluent::new(got, vec![a])).is_ok());
        assert!(matches!(
            universe.check_signature(&GroundFluent::new(got, vec![t])),
            Err(MdpError::SignatureMismatch { .. })
        ));
        assert!(matches!(
            universe.check_signature(&GroundFluent::new(got, vec![a, a])),
            Err(MdpError::SignatureMismatch { .. })
        ));
        assert_eq!(universe.describe(&GroundFluent::new(got, vec![a])), "got(a)");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut universe = Universe::new();
        let part = universe.add_type("Part").expect("type");
        universe.add_object("a", part).expect("object");

        assert!(matches!(
            universe.add_object("a", part),
            Err(MdpError::DuplicateName { kind: "object", .. })
        ));
        assert!(matches!(
            universe.object_id("missing"),
            Err(MdpError::UnknownObject { .. })
        ));
    }
}
