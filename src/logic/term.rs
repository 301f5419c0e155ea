//! The hash-consed term arena.
//!
//! Terms are immutable dag nodes identified by [`TermId`]; structurally
//! identical nodes are interned once, so subterm sharing is the default and
//! structural equality of label-free terms is id equality. Every node also
//! records its label-stripped shadow (`base`), which makes "equality
//! independent of attached labels" an O(1) comparison. Construction goes
//! through [`TermDag::term`], the single point that enforces arity and sort
//! well-formedness.

use std::collections::{HashMap, HashSet};
use std::fmt;

use taclet_util::{FuncId, LabelId, ProgId, SortId, SvId, TermId, TermVec, VarId};

use super::{ANY, FORMULA, SvKind, Symbols, UPDATE};

/// The two quantifier binders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quant {
  /// Universal quantification.
  Forall,
  /// Existential quantification.
  Exists,
}

/// The two modal operator kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModKind {
  /// The box (partial correctness) modality `[p]phi`.
  Box,
  /// The diamond (total correctness) modality `<p>phi`.
  Diamond,
}

/// The program fragment attached to a modality: concrete in proof terms,
/// a program schema variable in rule patterns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Program {
  /// An opaque concrete program fragment.
  Concrete(ProgId),
  /// A program schema variable.
  Schema(SvId),
}

/// A slot in the bound-variable list of a binder node: a concrete logic
/// variable in proof terms, a variable schema variable in rule patterns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Binder {
  /// A concrete bound variable.
  Var(VarId),
  /// A variable schema variable.
  Schema(SvId),
}

/// A term operator: the symbol at a node, determining arity and the sort
/// signature. Schema variables are operators too, legal only in patterns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpCode {
  /// The formula `true`.
  True,
  /// The formula `false`.
  False,
  /// Negation.
  Not,
  /// Conjunction.
  And,
  /// Disjunction.
  Or,
  /// Implication.
  Imp,
  /// Equality between two object terms.
  Equals,
  /// A quantifier; the node carries a nonempty bound-variable list.
  Quant(Quant),
  /// A declared function symbol (including predicates and program constants).
  Decl(FuncId),
  /// A bound logic variable occurrence.
  Var(VarId),
  /// A schema variable occurrence.
  SchemaVar(SvId),
  /// An elementary update `f := v`; the symbol must be assignable.
  ElemUpdate(FuncId),
  /// A parallel composition of two updates.
  ParallelUpdate,
  /// An update application `{u} t`.
  UpdateApplication,
  /// A modal operator with its program fragment.
  Modality(ModKind, Program),
  /// An explicit sort cast.
  Cast(SortId),
}

/// An interned term node. Equality and hashing are over all four fields;
/// label-independent structural equality goes through [`TermDag::eq_mod_labels`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TermNode {
  /// The operator at this node.
  pub op: OpCode,
  /// The child terms, in order.
  pub args: Box<[TermId]>,
  /// The variables bound at this node (nonempty only for quantifiers).
  pub bound: Box<[Binder]>,
  /// Attached labels, in attachment order. Irrelevant for structural
  /// equality, tracked for display.
  pub labels: Box<[LabelId]>,
}

#[derive(Debug)]
struct TermInfo {
  node: TermNode,
  sort: SortId,
  base: TermId,
  free_vars: Box<[VarId]>,
  has_schema: bool,
}

/// Errors from term construction. These are contract violations of the
/// caller, not match failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TermError {
  /// The operator expected a different number of children.
  ArityMismatch(OpCode, usize, usize),
  /// A child has a sort that does not fit the operator's signature.
  SortMismatch(OpCode, usize, SortId, SortId),
  /// A bound-variable list on a non-binder operator.
  UnexpectedBinder(OpCode),
  /// A quantifier without bound variables.
  MissingBinder(OpCode),
  /// A schema variable used in a binder slot that is not of variable kind.
  NotAVariableSv(SvId),
  /// A program schema variable used in term position.
  ProgramSvAsTerm(SvId),
  /// An elementary update whose left-hand side is not assignable.
  NotAssignable(FuncId),
}

impl fmt::Display for TermError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      TermError::ArityMismatch(op, expected, got) =>
        write!(f, "{op:?}: expected {expected} args, got {got}"),
      TermError::SortMismatch(op, i, expected, got) =>
        write!(f, "{op:?}: arg {i} has sort {got:?}, expected a subsort of {expected:?}"),
      TermError::UnexpectedBinder(op) => write!(f, "{op:?} does not bind variables"),
      TermError::MissingBinder(op) => write!(f, "{op:?} requires bound variables"),
      TermError::NotAVariableSv(sv) => write!(f, "schema variable {sv:?} cannot appear in a binder"),
      TermError::ProgramSvAsTerm(sv) => write!(f, "program schema variable {sv:?} in term position"),
      TermError::NotAssignable(func) => write!(f, "symbol {func:?} is not assignable"),
    }
  }
}

impl std::error::Error for TermError {}

type Result<T> = std::result::Result<T, TermError>;

/// The term arena. All terms of a proof environment live here; `TermId`s are
/// only meaningful relative to the dag that produced them.
#[derive(Debug, Default)]
pub struct TermDag {
  terms: TermVec<TermInfo>,
  map: HashMap<TermNode, TermId>,
}

impl TermDag {
  /// The number of distinct interned terms.
  #[must_use]
  pub fn len(&self) -> usize { self.terms.len() }

  /// True if no terms have been interned yet.
  #[must_use]
  pub fn is_empty(&self) -> bool { self.terms.is_empty() }

  /// The node for a term id.
  #[must_use]
  pub fn node(&self, t: TermId) -> &TermNode { &self.terms[t].node }

  /// The operator of a term.
  #[must_use]
  pub fn op(&self, t: TermId) -> OpCode { self.terms[t].node.op }

  /// The children of a term.
  #[must_use]
  pub fn args(&self, t: TermId) -> &[TermId] { &self.terms[t].node.args }

  /// The `i`-th child of a term.
  #[must_use]
  pub fn sub(&self, t: TermId, i: usize) -> TermId { self.terms[t].node.args[i] }

  /// The sort of a term, fixed at construction.
  #[must_use]
  pub fn sort(&self, t: TermId) -> SortId { self.terms[t].sort }

  /// The label-stripped shadow of a term.
  #[must_use]
  pub fn base(&self, t: TermId) -> TermId { self.terms[t].base }

  /// The free logic variables of a term, sorted.
  #[must_use]
  pub fn free_vars(&self, t: TermId) -> &[VarId] { &self.terms[t].free_vars }

  /// True if the term contains any schema variable (as an operator, a
  /// binder slot, or a modality program).
  #[must_use]
  pub fn has_schema(&self, t: TermId) -> bool { self.terms[t].has_schema }

  /// Structural equality independent of attached labels.
  #[must_use]
  pub fn eq_mod_labels(&self, a: TermId, b: TermId) -> bool { self.base(a) == self.base(b) }

  /// Intern a term, checking arity and sorts. This is the only way terms
  /// come into existence.
  pub fn term(
    &mut self, symbols: &Symbols, op: OpCode, args: Vec<TermId>, bound: Vec<Binder>,
    labels: Vec<LabelId>,
  ) -> Result<TermId> {
    let sort = self.check(symbols, op, &args, &bound)?;
    let node = TermNode {
      op,
      args: args.into_boxed_slice(),
      bound: bound.into_boxed_slice(),
      labels: labels.into_boxed_slice(),
    };
    if let Some(&id) = self.map.get(&node) { return Ok(id) }

    let base_args: Vec<TermId> = node.args.iter().map(|&a| self.base(a)).collect();
    let self_base = node.labels.is_empty() && base_args.iter().zip(&*node.args).all(|(a, b)| a == b);
    let base = if self_base {
      None
    } else {
      Some(self.term(symbols, op, base_args, node.bound.to_vec(), vec![])?)
    };

    let mut free: Vec<VarId> = match op {
      OpCode::Var(v) => vec![v],
      _ => {
        let mut free: Vec<VarId> =
          node.args.iter().flat_map(|&a| self.free_vars(a).iter().copied()).collect();
        free.retain(|v| !node.bound.contains(&Binder::Var(*v)));
        free
      }
    };
    free.sort_unstable();
    free.dedup();

    let has_schema = matches!(op, OpCode::SchemaVar(_) | OpCode::Modality(_, Program::Schema(_)))
      || node.bound.iter().any(|b| matches!(b, Binder::Schema(_)))
      || node.args.iter().any(|&a| self.has_schema(a));

    let id = TermId(self.terms.len() as u32);
    self.terms.push(TermInfo {
      node: node.clone(),
      sort,
      base: base.unwrap_or(id),
      free_vars: free.into_boxed_slice(),
      has_schema,
    });
    self.map.insert(node, id);
    Ok(id)
  }

  fn binder_sort(symbols: &Symbols, b: Binder) -> Result<SortId> {
    match b {
      Binder::Var(v) => Ok(symbols.vars[v].sort),
      Binder::Schema(sv) => match symbols.svs[sv].kind {
        SvKind::Variable(s) => Ok(s),
        _ => Err(TermError::NotAVariableSv(sv)),
      },
    }
  }

  fn check(&self, symbols: &Symbols, op: OpCode, args: &[TermId], bound: &[Binder]) -> Result<SortId> {
    if !bound.is_empty() && !matches!(op, OpCode::Quant(_)) {
      return Err(TermError::UnexpectedBinder(op))
    }
    let arity = |n: usize| -> Result<()> {
      if args.len() == n { Ok(()) } else { Err(TermError::ArityMismatch(op, n, args.len())) }
    };
    let formula_arg = |i: usize| -> Result<()> {
      if self.sort(args[i]) == FORMULA {
        Ok(())
      } else {
        Err(TermError::SortMismatch(op, i, FORMULA, self.sort(args[i])))
      }
    };
    match op {
      OpCode::True | OpCode::False => {
        arity(0)?;
        Ok(FORMULA)
      }
      OpCode::Not => {
        arity(1)?;
        formula_arg(0)?;
        Ok(FORMULA)
      }
      OpCode::And | OpCode::Or | OpCode::Imp => {
        arity(2)?;
        formula_arg(0)?;
        formula_arg(1)?;
        Ok(FORMULA)
      }
      OpCode::Equals => {
        arity(2)?;
        for i in 0..2 {
          if !symbols.is_object(self.sort(args[i])) {
            return Err(TermError::SortMismatch(op, i, ANY, self.sort(args[i])))
          }
        }
        Ok(FORMULA)
      }
      OpCode::Quant(_) => {
        arity(1)?;
        formula_arg(0)?;
        if bound.is_empty() { return Err(TermError::MissingBinder(op)) }
        for &b in bound {
          Self::binder_sort(symbols, b)?;
        }
        Ok(FORMULA)
      }
      OpCode::Decl(func) => {
        let decl = &symbols.funcs[func];
        arity(decl.args.len())?;
        for (i, (&a, &expected)) in args.iter().zip(&decl.args).enumerate() {
          let got = self.sort(a);
          if got == expected || symbols.extends_trans(got, expected) { continue }
          return Err(TermError::SortMismatch(op, i, expected, got))
        }
        Ok(decl.ret)
      }
      OpCode::Var(v) => {
        arity(0)?;
        Ok(symbols.vars[v].sort)
      }
      OpCode::SchemaVar(sv) => {
        arity(0)?;
        match symbols.svs[sv].kind {
          SvKind::Term(s) | SvKind::Variable(s) => Ok(s),
          SvKind::Formula => Ok(FORMULA),
          SvKind::Update => Ok(UPDATE),
          SvKind::Program => Err(TermError::ProgramSvAsTerm(sv)),
        }
      }
      OpCode::ElemUpdate(func) => {
        let decl = &symbols.funcs[func];
        if !decl.mods.contains(taclet_util::Modifiers::ASSIGNABLE) || !decl.args.is_empty() {
          return Err(TermError::NotAssignable(func))
        }
        arity(1)?;
        let got = self.sort(args[0]);
        if !symbols.extends_trans(got, decl.ret) {
          return Err(TermError::SortMismatch(op, 0, decl.ret, got))
        }
        Ok(UPDATE)
      }
      OpCode::ParallelUpdate => {
        arity(2)?;
        for i in 0..2 {
          if self.sort(args[i]) != UPDATE {
            return Err(TermError::SortMismatch(op, i, UPDATE, self.sort(args[i])))
          }
        }
        Ok(UPDATE)
      }
      OpCode::UpdateApplication => {
        arity(2)?;
        if self.sort(args[0]) != UPDATE {
          return Err(TermError::SortMismatch(op, 0, UPDATE, self.sort(args[0])))
        }
        Ok(self.sort(args[1]))
      }
      OpCode::Modality(..) => {
        arity(1)?;
        formula_arg(0)?;
        Ok(FORMULA)
      }
      OpCode::Cast(s) => {
        arity(1)?;
        if !symbols.is_object(s) {
          return Err(TermError::SortMismatch(op, 0, ANY, s))
        }
        let got = self.sort(args[0]);
        if !symbols.is_object(got) {
          return Err(TermError::SortMismatch(op, 0, ANY, got))
        }
        Ok(s)
      }
    }
  }

  /// The sort bound a replacement must satisfy at child position `i` of
  /// `parent`: the declared argument sort for applications, the built-in
  /// sort for logical operators, and the current child's own category for
  /// update targets.
  #[must_use]
  pub fn max_sort(&self, symbols: &Symbols, parent: TermId, i: usize) -> SortId {
    match self.op(parent) {
      OpCode::Decl(func) => symbols.funcs[func].args[i],
      OpCode::ElemUpdate(func) => symbols.funcs[func].ret,
      OpCode::ParallelUpdate => UPDATE,
      OpCode::UpdateApplication =>
        if i == 0 {
          UPDATE
        } else if self.sort(self.sub(parent, i)) == FORMULA {
          FORMULA
        } else {
          ANY
        },
      OpCode::Not | OpCode::And | OpCode::Or | OpCode::Imp | OpCode::Quant(_)
      | OpCode::Modality(..) => FORMULA,
      OpCode::Equals | OpCode::Cast(_) => ANY,
      OpCode::True | OpCode::False | OpCode::Var(_) | OpCode::SchemaVar(_) =>
        self.sort(self.sub(parent, i)),
    }
  }

  /// Structural equality modulo a consistent bijective renaming of bound
  /// variables. Free variables must match exactly; labels are ignored.
  #[must_use]
  pub fn eq_mod_renaming(&self, a: TermId, b: TermId) -> bool {
    let mut ren = Vec::new();
    self.eq_mod(a, b, &mut ren)
  }

  fn eq_mod(&self, a: TermId, b: TermId, ren: &mut Vec<(VarId, VarId)>) -> bool {
    let (a, b) = (self.base(a), self.base(b));
    if a == b && (ren.is_empty() || self.free_vars(a).is_empty()) { return true }
    let (na, nb) = (&self.terms[a].node, &self.terms[b].node);
    match (na.op, nb.op) {
      (OpCode::Var(x), OpCode::Var(y)) => {
        // the most recent binding of x must be y, and y must not be the
        // image of a different pattern-side variable
        match ren.iter().rev().find(|&&(x2, _)| x2 == x) {
          Some(&(_, y2)) => y2 == y,
          None => x == y && !ren.iter().any(|&(_, y2)| y2 == y),
        }
      }
      (opa, opb) => {
        if opa != opb || na.args.len() != nb.args.len() || na.bound.len() != nb.bound.len() {
          return false
        }
        let start = ren.len();
        for (&ba, &bb) in na.bound.iter().zip(&*nb.bound) {
          match (ba, bb) {
            (Binder::Var(x), Binder::Var(y)) => ren.push((x, y)),
            (Binder::Schema(s1), Binder::Schema(s2)) if s1 == s2 => {}
            _ => {
              ren.truncate(start);
              return false
            }
          }
        }
        let ok = na.args.iter().zip(&*nb.args).all(|(&ca, &cb)| self.eq_mod(ca, cb, ren));
        ren.truncate(start);
        ok
      }
    }
  }

  /// Collect every schema variable occurring in `t` into `out`.
  pub fn collect_schema_vars(&self, t: TermId, out: &mut HashSet<SvId>) {
    if !self.has_schema(t) { return }
    let node = &self.terms[t].node;
    match node.op {
      OpCode::SchemaVar(sv) | OpCode::Modality(_, Program::Schema(sv)) => {
        out.insert(sv);
      }
      _ => {}
    }
    for &b in &*node.bound {
      if let Binder::Schema(sv) = b {
        out.insert(sv);
      }
    }
    for &a in &*node.args {
      self.collect_schema_vars(a, out);
    }
  }

  // Convenience constructors.

  /// The formula `true`.
  pub fn tt(&mut self, symbols: &Symbols) -> Result<TermId> {
    self.term(symbols, OpCode::True, vec![], vec![], vec![])
  }

  /// The formula `false`.
  pub fn ff(&mut self, symbols: &Symbols) -> Result<TermId> {
    self.term(symbols, OpCode::False, vec![], vec![], vec![])
  }

  /// Negation.
  pub fn not(&mut self, symbols: &Symbols, t: TermId) -> Result<TermId> {
    self.term(symbols, OpCode::Not, vec![t], vec![], vec![])
  }

  /// Conjunction.
  pub fn and(&mut self, symbols: &Symbols, a: TermId, b: TermId) -> Result<TermId> {
    self.term(symbols, OpCode::And, vec![a, b], vec![], vec![])
  }

  /// Disjunction.
  pub fn or(&mut self, symbols: &Symbols, a: TermId, b: TermId) -> Result<TermId> {
    self.term(symbols, OpCode::Or, vec![a, b], vec![], vec![])
  }

  /// Implication.
  pub fn imp(&mut self, symbols: &Symbols, a: TermId, b: TermId) -> Result<TermId> {
    self.term(symbols, OpCode::Imp, vec![a, b], vec![], vec![])
  }

  /// Equality.
  pub fn eq(&mut self, symbols: &Symbols, a: TermId, b: TermId) -> Result<TermId> {
    self.term(symbols, OpCode::Equals, vec![a, b], vec![], vec![])
  }

  /// A function symbol application.
  pub fn app(&mut self, symbols: &Symbols, func: FuncId, args: Vec<TermId>) -> Result<TermId> {
    self.term(symbols, OpCode::Decl(func), args, vec![], vec![])
  }

  /// A bound variable occurrence.
  pub fn var(&mut self, symbols: &Symbols, v: VarId) -> Result<TermId> {
    self.term(symbols, OpCode::Var(v), vec![], vec![], vec![])
  }

  /// A schema variable occurrence.
  pub fn schema(&mut self, symbols: &Symbols, sv: SvId) -> Result<TermId> {
    self.term(symbols, OpCode::SchemaVar(sv), vec![], vec![], vec![])
  }

  /// A quantified formula.
  pub fn quant(
    &mut self, symbols: &Symbols, q: Quant, bound: Vec<Binder>, body: TermId,
  ) -> Result<TermId> {
    self.term(symbols, OpCode::Quant(q), vec![body], bound, vec![])
  }

  /// An elementary update `func := value`.
  pub fn elem_update(&mut self, symbols: &Symbols, func: FuncId, value: TermId) -> Result<TermId> {
    self.term(symbols, OpCode::ElemUpdate(func), vec![value], vec![], vec![])
  }

  /// An update application `{update} target`.
  pub fn update_app(&mut self, symbols: &Symbols, update: TermId, target: TermId) -> Result<TermId> {
    self.term(symbols, OpCode::UpdateApplication, vec![update, target], vec![], vec![])
  }

  /// A modal formula.
  pub fn modality(
    &mut self, symbols: &Symbols, kind: ModKind, prog: Program, body: TermId,
  ) -> Result<TermId> {
    self.term(symbols, OpCode::Modality(kind, prog), vec![body], vec![], vec![])
  }

  /// An explicit sort cast.
  pub fn cast(&mut self, symbols: &Symbols, sort: SortId, t: TermId) -> Result<TermId> {
    self.term(symbols, OpCode::Cast(sort), vec![t], vec![], vec![])
  }

  /// Attach labels to a term, preserving its structure. The result is
  /// base-equal to `t`.
  pub fn labeled(&mut self, symbols: &Symbols, t: TermId, labels: Vec<LabelId>) -> Result<TermId> {
    let node = self.node(t).clone();
    let mut all: Vec<LabelId> = node.labels.to_vec();
    for l in labels {
      if !all.contains(&l) { all.push(l) }
    }
    self.term(symbols, node.op, node.args.to_vec(), node.bound.to_vec(), all)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use taclet_util::Modifiers;

  fn setup() -> (Symbols, TermDag) { (Symbols::new(), TermDag::default()) }

  #[test]
  fn hash_consing_dedups() {
    let (mut sy, mut dag) = setup();
    let int = sy.add_sort("int", vec![], Modifiers::NONE).unwrap();
    let zero = sy.add_func("zero", vec![], int, Modifiers::RIGID).unwrap();
    let a = dag.app(&sy, zero, vec![]).unwrap();
    let b = dag.app(&sy, zero, vec![]).unwrap();
    assert_eq!(a, b);
    let e1 = dag.eq(&sy, a, b).unwrap();
    let e2 = dag.eq(&sy, b, a).unwrap();
    assert_eq!(e1, e2);
    assert_eq!(dag.len(), 2);
  }

  #[test]
  fn sort_checking_rejects_ill_formed() {
    let (mut sy, mut dag) = setup();
    let int = sy.add_sort("int", vec![], Modifiers::NONE).unwrap();
    let obj = sy.add_sort("object", vec![], Modifiers::NONE).unwrap();
    let zero = sy.add_func("zero", vec![], int, Modifiers::RIGID).unwrap();
    let f = sy.add_func("f", vec![obj], obj, Modifiers::RIGID).unwrap();
    let z = dag.app(&sy, zero, vec![]).unwrap();
    // int is not a subsort of object
    assert!(matches!(dag.app(&sy, f, vec![z]), Err(TermError::SortMismatch(..))));
    // arity violation
    assert!(matches!(dag.app(&sy, zero, vec![z]), Err(TermError::ArityMismatch(..))));
    // a term is not a formula
    assert!(matches!(dag.not(&sy, z), Err(TermError::SortMismatch(..))));
  }

  #[test]
  fn labels_do_not_affect_structural_equality() {
    let (mut sy, mut dag) = setup();
    let int = sy.add_sort("int", vec![], Modifiers::NONE).unwrap();
    let zero = sy.add_func("zero", vec![], int, Modifiers::RIGID).unwrap();
    let origin = sy.label("origin");
    let z = dag.app(&sy, zero, vec![]).unwrap();
    let zl = dag.labeled(&sy, z, vec![origin]).unwrap();
    assert_ne!(z, zl, "labelled occurrence is tracked separately");
    assert!(dag.eq_mod_labels(z, zl));
    let e1 = dag.eq(&sy, z, z).unwrap();
    let e2 = dag.eq(&sy, zl, z).unwrap();
    assert!(dag.eq_mod_labels(e1, e2));
  }

  #[test]
  fn alpha_equivalence() {
    let (mut sy, mut dag) = setup();
    let int = sy.add_sort("int", vec![], Modifiers::NONE).unwrap();
    let p = sy.add_func("p", vec![int], FORMULA, Modifiers::RIGID).unwrap();
    let x = sy.add_var("x", int);
    let y = sy.add_var("y", int);
    let xt = dag.var(&sy, x).unwrap();
    let yt = dag.var(&sy, y).unwrap();
    let px = dag.app(&sy, p, vec![xt]).unwrap();
    let py = dag.app(&sy, p, vec![yt]).unwrap();
    let all_x = dag.quant(&sy, Quant::Forall, vec![Binder::Var(x)], px).unwrap();
    let all_y = dag.quant(&sy, Quant::Forall, vec![Binder::Var(y)], py).unwrap();
    assert_ne!(all_x, all_y);
    assert!(dag.eq_mod_renaming(all_x, all_y));
    // free occurrences must match exactly
    assert!(!dag.eq_mod_renaming(px, py));
    // mixed bound/free: forall x. p(x) vs forall y. p(x)
    let all_y_px = dag.quant(&sy, Quant::Forall, vec![Binder::Var(y)], px).unwrap();
    assert!(!dag.eq_mod_renaming(all_x, all_y_px));
  }

  #[test]
  fn free_variables_are_tracked() {
    let (mut sy, mut dag) = setup();
    let int = sy.add_sort("int", vec![], Modifiers::NONE).unwrap();
    let p = sy.add_func("p", vec![int], FORMULA, Modifiers::RIGID).unwrap();
    let x = sy.add_var("x", int);
    let xt = dag.var(&sy, x).unwrap();
    let px = dag.app(&sy, p, vec![xt]).unwrap();
    assert_eq!(dag.free_vars(px), &[x]);
    let closed = dag.quant(&sy, Quant::Forall, vec![Binder::Var(x)], px).unwrap();
    assert!(dag.free_vars(closed).is_empty());
  }

  #[test]
  fn update_sorts() {
    let (mut sy, mut dag) = setup();
    let int = sy.add_sort("int", vec![], Modifiers::NONE).unwrap();
    let pv = sy.add_func("i", vec![], int, Modifiers::ASSIGNABLE).unwrap();
    let zero = sy.add_func("zero", vec![], int, Modifiers::RIGID).unwrap();
    let z = dag.app(&sy, zero, vec![]).unwrap();
    let u = dag.elem_update(&sy, pv, z).unwrap();
    assert_eq!(dag.sort(u), UPDATE);
    let tgt = dag.app(&sy, pv, vec![]).unwrap();
    let ua = dag.update_app(&sy, u, tgt).unwrap();
    assert_eq!(dag.sort(ua), int);
    // a rigid symbol is not assignable
    assert!(matches!(dag.elem_update(&sy, zero, z), Err(TermError::NotAssignable(_))));
  }
}
