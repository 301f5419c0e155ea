//! The schema-variable instantiation store.
//!
//! A store is built up incrementally during one match attempt and discarded
//! on failure. All operations are pure: `add` returns a new store sharing
//! structure with the old one, so partially extended stores can be explored
//! without copying and abandoned without cleanup.

use std::fmt::{self, Display};

use taclet_util::{ProgId, SvId, TermId, VarId};

use crate::logic::print::{EnvDisplay, FormatEnv};
use crate::logic::term::TermDag;

/// A value bound to a schema variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstValue {
  /// A term (or formula, or update).
  Term(TermId),
  /// A bound logic variable, for variable schema variables.
  Var(VarId),
  /// A concrete program fragment, for program schema variables.
  Program(ProgId),
}

/// The instantiation store: schema-variable bindings plus the update
/// context collected on the walk from the sequent root to the match
/// position.
#[derive(Clone, Debug, Default)]
pub struct Instantiations {
  map: im::HashMap<SvId, InstValue>,
  updates: im::Vector<TermId>,
}

impl Instantiations {
  /// The empty store.
  #[must_use]
  pub fn new() -> Instantiations { Instantiations::default() }

  /// The value bound to `sv`, if any.
  #[must_use]
  pub fn get(&self, sv: SvId) -> Option<InstValue> { self.map.get(&sv).copied() }

  /// True if `sv` is bound.
  #[must_use]
  pub fn is_bound(&self, sv: SvId) -> bool { self.map.contains_key(&sv) }

  /// The number of bound schema variables.
  #[must_use]
  pub fn len(&self) -> usize { self.map.len() }

  /// True if nothing is bound and the update context is empty.
  #[must_use]
  pub fn is_empty(&self) -> bool { self.map.is_empty() && self.updates.is_empty() }

  /// Bind `sv` to `value`, returning the extended store. Rebinding to a
  /// structurally different value (terms compared modulo bound-variable
  /// renaming) fails with `None`; rebinding to an equal value is a no-op.
  #[must_use]
  pub fn add(&self, sv: SvId, value: InstValue, dag: &TermDag) -> Option<Instantiations> {
    if let Some(prev) = self.get(sv) {
      let consistent = match (prev, value) {
        (InstValue::Term(a), InstValue::Term(b)) => dag.eq_mod_renaming(a, b),
        _ => prev == value,
      };
      return if consistent { Some(self.clone()) } else { None }
    }
    let mut map = self.map.clone();
    map.insert(sv, value);
    Some(Instantiations { map, updates: self.updates.clone() })
  }

  /// Append an update to the update context (outermost first).
  #[must_use]
  pub fn add_update(&self, update: TermId) -> Instantiations {
    let mut updates = self.updates.clone();
    updates.push_back(update);
    Instantiations { map: self.map.clone(), updates }
  }

  /// The update context, outermost update first.
  pub fn update_context(&self) -> impl Iterator<Item = TermId> + '_ {
    self.updates.iter().copied()
  }

  /// True if the update context is nonempty.
  #[must_use]
  pub fn has_update_context(&self) -> bool { !self.updates.is_empty() }

  /// Iterate over the bound schema variables.
  pub fn bindings(&self) -> impl Iterator<Item = (SvId, InstValue)> + '_ {
    self.map.iter().map(|(&sv, &v)| (sv, v))
  }
}

impl EnvDisplay for InstValue {
  fn fmt(&self, fe: FormatEnv<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      InstValue::Term(t) => t.fmt(fe, f),
      InstValue::Var(v) => v.fmt(fe, f),
      InstValue::Program(p) => fe.symbols.progs[p].name.fmt(f),
    }
  }
}

impl EnvDisplay for Instantiations {
  fn fmt(&self, fe: FormatEnv<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (sv, v)) in self.bindings().enumerate() {
      if i > 0 { write!(f, ", ")? }
      write!(f, "{} := {}", fe.to(&sv), fe.to(&v))?;
    }
    write!(f, "}}")?;
    if self.has_update_context() {
      write!(f, " under")?;
      for u in self.update_context() {
        write!(f, " {{{}}}", fe.to(&u))?;
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::logic::{FORMULA, Symbols};
  use taclet_util::Modifiers;

  #[test]
  fn rebinding_must_be_consistent() {
    let mut sy = Symbols::new();
    let mut dag = TermDag::default();
    let int = sy.add_sort("int", vec![], Modifiers::NONE).unwrap();
    let sv = sy.add_schema_var("x", crate::logic::SvKind::Term(int));
    let five = sy.add_func("five", vec![], int, Modifiers::RIGID).unwrap();
    let six = sy.add_func("six", vec![], int, Modifiers::RIGID).unwrap();
    let t5 = dag.app(&sy, five, vec![]).unwrap();
    let t6 = dag.app(&sy, six, vec![]).unwrap();

    let store = Instantiations::new();
    let store = store.add(sv, InstValue::Term(t5), &dag).unwrap();
    assert!(store.add(sv, InstValue::Term(t5), &dag).is_some());
    assert!(store.add(sv, InstValue::Term(t6), &dag).is_none());
    // the original store is unaffected by failed extensions
    assert_eq!(store.get(sv), Some(InstValue::Term(t5)));
  }

  #[test]
  fn rebinding_allows_alpha_equal_terms() {
    let mut sy = Symbols::new();
    let mut dag = TermDag::default();
    let int = sy.add_sort("int", vec![], Modifiers::NONE).unwrap();
    let sv = sy.add_schema_var("phi", crate::logic::SvKind::Formula);
    let p = sy.add_func("p", vec![int], FORMULA, Modifiers::RIGID).unwrap();
    let x = sy.add_var("x", int);
    let y = sy.add_var("y", int);
    let xt = dag.var(&sy, x).unwrap();
    let yt = dag.var(&sy, y).unwrap();
    let px = dag.app(&sy, p, vec![xt]).unwrap();
    let py = dag.app(&sy, p, vec![yt]).unwrap();
    use crate::logic::term::{Binder, Quant};
    let all_x = dag.quant(&sy, Quant::Forall, vec![Binder::Var(x)], px).unwrap();
    let all_y = dag.quant(&sy, Quant::Forall, vec![Binder::Var(y)], py).unwrap();

    let store = Instantiations::new().add(sv, InstValue::Term(all_x), &dag).unwrap();
    assert!(store.add(sv, InstValue::Term(all_y), &dag).is_some());
  }

  #[test]
  fn update_context_order() {
    let store = Instantiations::new().add_update(TermId(3)).add_update(TermId(7));
    let ctx: Vec<_> = store.update_context().collect();
    assert_eq!(ctx, vec![TermId(3), TermId(7)]);
  }
}
