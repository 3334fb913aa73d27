// src/sema/scope.rs
//
// Nested lexical frames with slot allocation. Variables live in an arena
// with stable VarId indices so IR nodes can reference them after their
// declaring frame has popped; popping a frame only releases its name
// bindings and slot range, so sibling constructs reuse the same slots.

use rustc_hash::FxHashMap;

use crate::errors::SemanticError;
use crate::frontend::{Interner, Span, Symbol};
use crate::sema::types::Type;

/// Stable index into the scope's variable arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(u32);

impl VarId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// How a variable is named. Synthetic variables are minted by the analyzer
/// for lowered constructs and are invisible to user-level resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarName {
    User(Symbol),
    Synthetic(String),
}

impl VarName {
    pub fn display<'a>(&'a self, interner: &'a Interner) -> &'a str {
        match self {
            VarName::User(sym) => interner.resolve(*sym),
            VarName::Synthetic(name) => name,
        }
    }

    pub fn synthetic(&self) -> Option<&str> {
        match self {
            VarName::Synthetic(name) => Some(name),
            VarName::User(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct Variable {
    pub name: VarName,
    pub ty: Type,
    pub read_only: bool,
    /// Storage slot within the enclosing body; reused across sibling frames
    pub slot: u32,
}

#[derive(Debug, Default)]
struct Frame {
    names: FxHashMap<Symbol, VarId>,
    slot_base: u32,
}

/// Stack of lexical frames plus the variable arena for one compilation
#[derive(Debug)]
pub struct Scope {
    vars: Vec<Variable>,
    frames: Vec<Frame>,
    next_slot: u32,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            vars: Vec::new(),
            frames: vec![Frame::default()],
            next_slot: 0,
        }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Frame {
            names: FxHashMap::default(),
            slot_base: self.next_slot,
        });
    }

    /// Pop the innermost frame, releasing its name bindings and its slot
    /// range. Every push must be paired with a pop on all exit paths,
    /// including errors, or slot accounting for later siblings goes wrong.
    pub fn pop_frame(&mut self) {
        let frame = self.frames.pop().expect("pop_frame on root scope");
        self.next_slot = frame.slot_base;
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn next_slot(&self) -> u32 {
        self.next_slot
    }

    fn alloc(&mut self, name: VarName, ty: Type, read_only: bool) -> VarId {
        let id = VarId(self.vars.len() as u32);
        self.vars.push(Variable {
            name,
            ty,
            read_only,
            slot: self.next_slot,
        });
        self.next_slot += 1;
        id
    }

    /// Declare a user-visible variable in the innermost frame
    pub fn declare_variable(
        &mut self,
        span: Span,
        name: Symbol,
        ty: Type,
        read_only: bool,
        interner: &Interner,
    ) -> Result<VarId, SemanticError> {
        let frame = self.frames.last_mut().expect("scope has a root frame");
        if frame.names.contains_key(&name) {
            return Err(SemanticError::DuplicateDeclaration {
                name: interner.resolve(name).to_string(),
                span: span.into(),
            });
        }
        let id = self.alloc(VarName::User(name), ty, read_only);
        self.frames
            .last_mut()
            .expect("scope has a root frame")
            .names
            .insert(name, id);
        Ok(id)
    }

    /// Mint an internal variable for a lowered construct. Bypasses the
    /// duplicate check and user-visible resolution; the name is the prefix
    /// concatenated with the construct's source offset, so two instances of
    /// the same construct at distinct locations never collide even when one
    /// is nested inside the other.
    pub fn declare_internal(&mut self, ty: Type, prefix: &str, offset: usize) -> VarId {
        self.alloc(VarName::Synthetic(format!("{prefix}{offset}")), ty, true)
    }

    /// Resolve a user name, innermost frame first
    pub fn resolve(&self, name: Symbol) -> Option<VarId> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.names.get(&name).copied())
    }

    pub fn get(&self, id: VarId) -> &Variable {
        &self.vars[id.index() as usize]
    }

    /// Release the arena to the analysis output once the pass completes
    pub fn into_variables(self) -> Vec<Variable> {
        self.vars
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::types::TypeDefId;

    fn ty(i: u32) -> Type {
        Type::Concrete(TypeDefId::new(i))
    }

    #[test]
    fn declare_and_resolve() {
        let mut interner = Interner::new();
        let name = interner.intern("count");
        let mut scope = Scope::new();

        let id = scope
            .declare_variable(Span::default(), name, ty(0), false, &interner)
            .unwrap();
        assert_eq!(scope.resolve(name), Some(id));
        assert_eq!(scope.get(id).ty, ty(0));
    }

    #[test]
    fn duplicate_in_same_frame_fails() {
        let mut interner = Interner::new();
        let name = interner.intern("x");
        let mut scope = Scope::new();

        scope
            .declare_variable(Span::default(), name, ty(0), false, &interner)
            .unwrap();
        let err = scope
            .declare_variable(Span::default(), name, ty(0), false, &interner)
            .unwrap_err();
        assert!(matches!(err, SemanticError::DuplicateDeclaration { .. }));
    }

    #[test]
    fn inner_frame_shadows_outer() {
        let mut interner = Interner::new();
        let name = interner.intern("x");
        let mut scope = Scope::new();

        let outer = scope
            .declare_variable(Span::default(), name, ty(0), false, &interner)
            .unwrap();
        scope.push_frame();
        let inner = scope
            .declare_variable(Span::default(), name, ty(1), false, &interner)
            .unwrap();
        assert_eq!(scope.resolve(name), Some(inner));
        scope.pop_frame();
        assert_eq!(scope.resolve(name), Some(outer));
    }

    #[test]
    fn sibling_frames_reuse_slots() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let mut scope = Scope::new();

        scope.push_frame();
        let first = scope
            .declare_variable(Span::default(), a, ty(0), false, &interner)
            .unwrap();
        scope.pop_frame();

        scope.push_frame();
        let second = scope
            .declare_variable(Span::default(), b, ty(0), false, &interner)
            .unwrap();
        scope.pop_frame();

        // Distinct arena entries, same storage slot
        assert_ne!(first, second);
        assert_eq!(scope.get(first).slot, scope.get(second).slot);
        assert_eq!(scope.next_slot(), 0);
    }

    #[test]
    fn internal_names_distinct_by_offset() {
        let mut scope = Scope::new();
        let outer = scope.declare_internal(ty(0), "#itr", 10);
        let inner = scope.declare_internal(ty(0), "#itr", 42);

        assert_eq!(scope.get(outer).name.synthetic(), Some("#itr10"));
        assert_eq!(scope.get(inner).name.synthetic(), Some("#itr42"));
    }

    #[test]
    fn internal_variables_do_not_resolve() {
        let mut interner = Interner::new();
        let mut scope = Scope::new();
        scope.declare_internal(ty(0), "#itr", 7);

        let probe = interner.intern("#itr7");
        assert_eq!(scope.resolve(probe), None);
    }

    #[test]
    fn arena_survives_frame_pop() {
        let mut interner = Interner::new();
        let name = interner.intern("x");
        let mut scope = Scope::new();

        scope.push_frame();
        let id = scope
            .declare_variable(Span::default(), name, ty(3), true, &interner)
            .unwrap();
        scope.pop_frame();

        // The binding is gone but the variable record remains for the IR
        assert_eq!(scope.resolve(name), None);
        assert_eq!(scope.get(id).ty, ty(3));
        let vars = scope.into_variables();
        assert_eq!(vars.len(), 1);
    }
}
