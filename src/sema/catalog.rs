// src/sema/catalog.rs
//! Registry of host-exposed types and their members.
//!
//! The embedding application populates the catalog once, before any analysis
//! runs; during analysis it is shared by reference and never mutated, so
//! independent compilations may query one catalog concurrently.
//!
//! Lookups are keyed by name and arity. A `Dynamic` receiver never reaches
//! the catalog at all - the analyzer branches on the type tag first and
//! defers resolution to runtime dispatch.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::sema::types::{Type, TypeDefId};

/// The type-expression spelling that resolves to `Type::Dynamic`
pub const DYNAMIC_TYPE_NAME: &str = "def";

/// Handle to a method definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(u32);

impl MethodId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Handle to a field definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(u32);

impl FieldId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Handle to a constructor definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CtorId(u32);

impl CtorId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// What flavor of host type this is. The iteration analyzer dispatches on
/// this to pick the indexable, range, or iterable-protocol lowering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDefKind {
    /// Ordinary reference type; iterable only via the iteration protocol
    Class,
    /// Host array with a known element type, iterated by index
    Array { element: Type },
    /// Numeric range; iterated by counting, elements are `int`
    Range,
}

#[derive(Debug)]
pub struct TypeDef {
    pub id: TypeDefId,
    pub name: String,
    pub kind: TypeDefKind,
    /// Direct supertypes; assignability is the reflexive-transitive closure
    pub supertypes: SmallVec<[TypeDefId; 2]>,
    /// Overload sets by method name; arity disambiguates within a set
    methods: FxHashMap<String, SmallVec<[MethodId; 2]>>,
    fields: FxHashMap<String, FieldId>,
    constructors: SmallVec<[CtorId; 1]>,
}

/// A host method signature: declaring type, name, parameter types, return
/// type. Referenced by `MethodId` from IR nodes; never re-resolved after
/// analysis.
#[derive(Debug)]
pub struct MethodDef {
    pub id: MethodId,
    pub owner: TypeDefId,
    pub name: String,
    pub params: SmallVec<[Type; 4]>,
    pub return_type: Type,
}

impl MethodDef {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

#[derive(Debug)]
pub struct FieldDef {
    pub id: FieldId,
    pub owner: TypeDefId,
    pub name: String,
    pub ty: Type,
}

#[derive(Debug)]
pub struct CtorDef {
    pub id: CtorId,
    pub owner: TypeDefId,
    pub params: SmallVec<[Type; 4]>,
}

impl CtorDef {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Catalog of host-exposed types, populated pre-analysis and read-only after
#[derive(Debug, Default)]
pub struct TypeCatalog {
    type_defs: Vec<TypeDef>,
    method_defs: Vec<MethodDef>,
    field_defs: Vec<FieldDef>,
    ctor_defs: Vec<CtorDef>,
    type_by_name: FxHashMap<String, TypeDefId>,
    /// Host-declared reference conversions between unrelated concrete types
    conversions: FxHashSet<(TypeDefId, TypeDefId)>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Population - the host's one-time pre-analysis setup
    // ========================================================================

    fn register(&mut self, name: &str, kind: TypeDefKind) -> TypeDefId {
        let id = TypeDefId::new(self.type_defs.len() as u32);
        self.type_defs.push(TypeDef {
            id,
            name: name.to_string(),
            kind,
            supertypes: SmallVec::new(),
            methods: FxHashMap::default(),
            fields: FxHashMap::default(),
            constructors: SmallVec::new(),
        });
        self.type_by_name.insert(name.to_string(), id);
        id
    }

    pub fn register_class(&mut self, name: &str) -> TypeDefId {
        self.register(name, TypeDefKind::Class)
    }

    pub fn register_array(&mut self, name: &str, element: Type) -> TypeDefId {
        self.register(name, TypeDefKind::Array { element })
    }

    pub fn register_range(&mut self, name: &str) -> TypeDefId {
        self.register(name, TypeDefKind::Range)
    }

    /// Record `super_ty` as a direct supertype of `ty`
    pub fn add_supertype(&mut self, ty: TypeDefId, super_ty: TypeDefId) {
        self.type_defs[ty.index() as usize].supertypes.push(super_ty);
    }

    /// Register a method overload. Re-registering the same name and arity on
    /// the same type replaces the earlier entry.
    pub fn register_method(
        &mut self,
        ty: TypeDefId,
        name: &str,
        params: &[Type],
        return_type: Type,
    ) -> MethodId {
        let params = SmallVec::from_slice(params);
        let id = MethodId(self.method_defs.len() as u32);
        let arity = params.len();
        let replaced = self.type_defs[ty.index() as usize]
            .methods
            .get(name)
            .and_then(|overloads| {
                overloads
                    .iter()
                    .position(|&m| self.method_defs[m.index() as usize].arity() == arity)
            });
        self.method_defs.push(MethodDef {
            id,
            owner: ty,
            name: name.to_string(),
            params,
            return_type,
        });

        let overloads = self.type_defs[ty.index() as usize]
            .methods
            .entry(name.to_string())
            .or_default();
        match replaced {
            Some(slot) => overloads[slot] = id,
            None => overloads.push(id),
        }
        id
    }

    pub fn register_field(&mut self, ty: TypeDefId, name: &str, field_ty: Type) -> FieldId {
        let id = FieldId(self.field_defs.len() as u32);
        self.field_defs.push(FieldDef {
            id,
            owner: ty,
            name: name.to_string(),
            ty: field_ty,
        });
        self.type_defs[ty.index() as usize]
            .fields
            .insert(name.to_string(), id);
        id
    }

    pub fn register_constructor(&mut self, ty: TypeDefId, params: &[Type]) -> CtorId {
        let id = CtorId(self.ctor_defs.len() as u32);
        self.ctor_defs.push(CtorDef {
            id,
            owner: ty,
            params: SmallVec::from_slice(params),
        });
        self.type_defs[ty.index() as usize].constructors.push(id);
        id
    }

    /// Declare a host conversion from one concrete type to another that the
    /// hierarchy does not already relate. Resolved as an explicit-only
    /// reference cast.
    pub fn register_conversion(&mut self, from: TypeDefId, to: TypeDefId) {
        self.conversions.insert((from, to));
    }

    // ========================================================================
    // Lookup - read-only during analysis
    // ========================================================================

    pub fn get_type(&self, id: TypeDefId) -> &TypeDef {
        &self.type_defs[id.index() as usize]
    }

    pub fn get_method(&self, id: MethodId) -> &MethodDef {
        &self.method_defs[id.index() as usize]
    }

    pub fn get_field(&self, id: FieldId) -> &FieldDef {
        &self.field_defs[id.index() as usize]
    }

    pub fn get_ctor(&self, id: CtorId) -> &CtorDef {
        &self.ctor_defs[id.index() as usize]
    }

    /// Resolve a type name. `"def"` is the dynamic sentinel; everything else
    /// hits the concrete table.
    pub fn resolve_type(&self, name: &str) -> Option<Type> {
        if name == DYNAMIC_TYPE_NAME {
            return Some(Type::Dynamic);
        }
        self.type_by_name.get(name).copied().map(Type::Concrete)
    }

    /// Find the unique method with the given name and arity on the receiver
    /// type, searching the receiver first and then its supertypes.
    pub fn lookup_method(&self, ty: TypeDefId, name: &str, arity: usize) -> Option<MethodId> {
        let def = self.get_type(ty);
        if let Some(overloads) = def.methods.get(name)
            && let Some(&id) = overloads
                .iter()
                .find(|&&m| self.get_method(m).arity() == arity)
        {
            return Some(id);
        }
        def.supertypes
            .iter()
            .find_map(|&sup| self.lookup_method(sup, name, arity))
    }

    pub fn lookup_field(&self, ty: TypeDefId, name: &str) -> Option<FieldId> {
        let def = self.get_type(ty);
        if let Some(&id) = def.fields.get(name) {
            return Some(id);
        }
        def.supertypes
            .iter()
            .find_map(|&sup| self.lookup_field(sup, name))
    }

    pub fn lookup_constructor(&self, ty: TypeDefId, arity: usize) -> Option<CtorId> {
        self.get_type(ty)
            .constructors
            .iter()
            .copied()
            .find(|&c| self.get_ctor(c).arity() == arity)
    }

    /// Whether a value of `from` may stand where `to` is required without a
    /// conversion that can fail: reflexivity or a transitive supertype walk.
    pub fn is_assignable(&self, from: TypeDefId, to: TypeDefId) -> bool {
        if from == to {
            return true;
        }
        self.get_type(from)
            .supertypes
            .iter()
            .any(|&sup| self.is_assignable(sup, to))
    }

    pub fn has_conversion(&self, from: TypeDefId, to: TypeDefId) -> bool {
        self.conversions.contains(&(from, to))
    }

    /// Canonical name for error messages
    pub fn display_type(&self, ty: Type) -> &str {
        match ty {
            Type::Dynamic => DYNAMIC_TYPE_NAME,
            Type::Concrete(id) => &self.get_type(id).name,
        }
    }
}
