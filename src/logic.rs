//! The logical foundation: sorts, symbols, terms and sequents.
//!
//! [`Symbols`] is the read-only oracle the rest of the kernel consults for
//! name and sort information; [`term::TermDag`] is the single creation point
//! for terms; [`sequent::Sequent`] holds proof obligations.

pub mod print;
pub mod sequent;
pub mod term;

use std::collections::HashMap;
use std::fmt;

use taclet_util::{
  FuncId, FuncVec, HashMapExt, LabelId, LabelVec, Modifiers, ProgId, ProgVec, SortId, SortVec,
  SvId, SvVec, VarId, VarVec,
};

/// The built-in sort of formulas. Always the first sort in a [`Symbols`] table.
pub const FORMULA: SortId = SortId(0);
/// The built-in sort of updates.
pub const UPDATE: SortId = SortId(1);
/// The built-in top sort of all object (non-formula, non-update) sorts.
pub const ANY: SortId = SortId(2);

/// A declared sort: a name, the direct supersorts, and modifier flags.
#[derive(Clone, Debug)]
pub struct SortDecl {
  /// The name of the sort.
  pub name: String,
  /// The direct supersorts. Object sorts implicitly extend [`ANY`].
  pub exts: Vec<SortId>,
  /// Modifier flags; see [`Modifiers::sort_data`].
  pub mods: Modifiers,
}

/// A declared function symbol. Predicates are functions into [`FORMULA`],
/// program variables are nullary [`Modifiers::ASSIGNABLE`] symbols.
#[derive(Clone, Debug)]
pub struct FuncDecl {
  /// The name of the symbol.
  pub name: String,
  /// The argument sorts; the arity is `args.len()`.
  pub args: Vec<SortId>,
  /// The result sort.
  pub ret: SortId,
  /// Modifier flags; see [`Modifiers::func_data`].
  pub mods: Modifiers,
}

/// A declared logic (bound) variable.
#[derive(Clone, Debug)]
pub struct VarDecl {
  /// The name of the variable.
  pub name: String,
  /// The sort of the variable.
  pub sort: SortId,
}

/// The syntactic category a schema variable ranges over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SvKind {
  /// A term of (a subsort of) the given sort.
  Term(SortId),
  /// A formula.
  Formula,
  /// A bound logic variable of (a subsort of) the given sort.
  Variable(SortId),
  /// An update.
  Update,
  /// A program fragment; only legal inside a modality.
  Program,
}

/// A declared schema variable: a rule-level placeholder, never part of a
/// concrete proof term.
#[derive(Clone, Debug)]
pub struct SvDecl {
  /// The name of the schema variable.
  pub name: String,
  /// The category of values it may be instantiated with.
  pub kind: SvKind,
}

/// An opaque program fragment, referenced by modal operators. The kernel
/// never looks inside; fragments are equal iff their ids are.
#[derive(Clone, Debug)]
pub struct ProgDecl {
  /// The display name of the fragment.
  pub name: String,
}

/// An attempt to declare a name that is already taken.
#[derive(Clone, Debug)]
pub struct Redeclaration {
  /// The error message.
  pub msg: String,
}

impl fmt::Display for Redeclaration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.msg.fmt(f) }
}

impl std::error::Error for Redeclaration {}

/// The namespaces of a proof environment: sorts with their subsort order,
/// function symbols, logic variables, schema variables, program fragments
/// and term labels. Loaded once, then treated as a read-only oracle.
#[derive(Debug)]
pub struct Symbols {
  /// The sort table.
  pub sorts: SortVec<SortDecl>,
  /// The function symbol table.
  pub funcs: FuncVec<FuncDecl>,
  /// The logic variable table.
  pub vars: VarVec<VarDecl>,
  /// The schema variable table.
  pub svs: SvVec<SvDecl>,
  /// The program fragment table.
  pub progs: ProgVec<ProgDecl>,
  /// The label name table.
  pub labels: LabelVec<String>,
  sort_names: HashMap<String, SortId>,
  func_names: HashMap<String, FuncId>,
  label_names: HashMap<String, LabelId>,
}

impl Default for Symbols {
  fn default() -> Self { Self::new() }
}

impl Symbols {
  /// Create a symbol table containing only the built-in sorts
  /// [`FORMULA`], [`UPDATE`] and [`ANY`].
  #[must_use]
  pub fn new() -> Symbols {
    let mut s = Symbols {
      sorts: SortVec::default(),
      funcs: FuncVec::default(),
      vars: VarVec::default(),
      svs: SvVec::default(),
      progs: ProgVec::default(),
      labels: LabelVec::default(),
      sort_names: HashMap::new(),
      func_names: HashMap::new(),
      label_names: HashMap::new(),
    };
    for name in ["formula", "update", "any"] {
      let id = s.sorts.push(SortDecl { name: name.into(), exts: vec![], mods: Modifiers::NONE });
      s.sort_names.insert(name.into(), id);
    }
    s
  }

  /// Declare a new sort. `exts` lists the direct supersorts; object sorts
  /// implicitly extend [`ANY`].
  pub fn add_sort(
    &mut self, name: impl Into<String>, exts: Vec<SortId>, mods: Modifiers,
  ) -> Result<SortId, Redeclaration> {
    let name = name.into();
    if self.sort_names.contains_key(&name) {
      return Err(Redeclaration { msg: format!("sort '{name}' redeclared") })
    }
    let id = self.sorts.push(SortDecl { name: name.clone(), exts, mods });
    self.sort_names.insert(name, id);
    Ok(id)
  }

  /// Declare a new function symbol.
  pub fn add_func(
    &mut self, name: impl Into<String>, args: Vec<SortId>, ret: SortId, mods: Modifiers,
  ) -> Result<FuncId, Redeclaration> {
    let name = name.into();
    let decl = FuncDecl { name: name.clone(), args, ret, mods };
    let id = FuncId(self.funcs.len() as u32);
    if let Some((_, e)) = self.func_names.try_insert_ext(name, id) {
      return Err(Redeclaration { msg: format!("function '{}' redeclared", e.key()) })
    }
    self.funcs.push(decl);
    Ok(id)
  }

  /// Declare a new logic variable. Variable names are not namespaced;
  /// distinct binders may reuse a declaration.
  pub fn add_var(&mut self, name: impl Into<String>, sort: SortId) -> VarId {
    self.vars.push(VarDecl { name: name.into(), sort })
  }

  /// Declare a new schema variable.
  pub fn add_schema_var(&mut self, name: impl Into<String>, kind: SvKind) -> SvId {
    self.svs.push(SvDecl { name: name.into(), kind })
  }

  /// Declare a new opaque program fragment.
  pub fn add_program(&mut self, name: impl Into<String>) -> ProgId {
    self.progs.push(ProgDecl { name: name.into() })
  }

  /// Intern a term label name.
  pub fn label(&mut self, name: impl Into<String>) -> LabelId {
    let name = name.into();
    if let Some(&id) = self.label_names.get(&name) { return id }
    let id = self.labels.push(name.clone());
    self.label_names.insert(name, id);
    id
  }

  /// Look up a sort by name.
  #[must_use]
  pub fn sort_by_name(&self, name: &str) -> Option<SortId> {
    self.sort_names.get(name).copied()
  }

  /// Look up a function symbol by name.
  #[must_use]
  pub fn func_by_name(&self, name: &str) -> Option<FuncId> {
    self.func_names.get(name).copied()
  }

  /// True if `s` is an object sort, i.e. neither [`FORMULA`] nor [`UPDATE`].
  #[must_use]
  pub fn is_object(&self, s: SortId) -> bool { s != FORMULA && s != UPDATE }

  /// The reflexive-transitive subsort check: is `sub` a subsort of `sup`?
  /// [`ANY`] is above every object sort; [`FORMULA`] and [`UPDATE`] relate
  /// only to themselves.
  #[must_use]
  pub fn extends_trans(&self, sub: SortId, sup: SortId) -> bool {
    if sub == sup { return true }
    if !self.is_object(sub) || !self.is_object(sup) { return false }
    if sup == ANY { return true }
    self.sorts[sub].exts.iter().any(|&e| self.extends_trans(e, sup))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn subsort_order() {
    let mut sy = Symbols::new();
    let obj = sy.add_sort("object", vec![], Modifiers::NONE).unwrap();
    let int = sy.add_sort("int", vec![obj], Modifiers::NONE).unwrap();
    assert!(sy.extends_trans(int, obj));
    assert!(sy.extends_trans(int, ANY));
    assert!(sy.extends_trans(int, int));
    assert!(!sy.extends_trans(obj, int));
    assert!(!sy.extends_trans(FORMULA, ANY));
    assert!(!sy.extends_trans(int, FORMULA));
  }

  #[test]
  fn redeclaration_rejected() {
    let mut sy = Symbols::new();
    sy.add_sort("s", vec![], Modifiers::NONE).unwrap();
    assert!(sy.add_sort("s", vec![], Modifiers::NONE).is_err());
    sy.add_func("f", vec![], ANY, Modifiers::NONE).unwrap();
    assert!(sy.add_func("f", vec![], ANY, Modifiers::NONE).is_err());
  }

  #[test]
  fn label_interning() {
    let mut sy = Symbols::new();
    let a = sy.label("origin");
    let b = sy.label("origin");
    assert_eq!(a, b);
    assert_ne!(a, sy.label("other"));
  }
}
