//! Taclet application: turning a complete match into successor sequents.
//!
//! Application never mutates the input sequent. Each goal template yields
//! one successor sequent built from a clone of the input, so a failure
//! partway through leaves nothing half-applied.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use taclet_util::{SortId, SvId, TermId};

use crate::logic::Symbols;
use crate::logic::sequent::{Sequent, SequentFormula, Side};
use crate::logic::term::{Binder, OpCode, Program, TermDag, TermError};

use super::inst::{InstValue, Instantiations};
use super::matcher::MatchResult;
use super::Taclet;

/// Errors from taclet application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyError {
  /// The match result is incomplete; it cannot be applied until the
  /// missing input is supplied.
  IncompleteMatch,
  /// A schema variable in a goal template has no usable instantiation.
  MissingInstantiation(SvId),
  /// The replacement term does not fit the sort required at the target
  /// position and no cast can bridge the gap.
  SortCast {
    /// The sort of the replacement term.
    found: SortId,
    /// The maximal sort admissible at the position.
    required: SortId,
  },
  /// Term construction failed while building the instantiated result.
  Term(TermError),
}

impl From<TermError> for ApplyError {
  fn from(e: TermError) -> ApplyError { ApplyError::Term(e) }
}

impl fmt::Display for ApplyError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      ApplyError::IncompleteMatch => write!(f, "match result is incomplete"),
      ApplyError::MissingInstantiation(sv) =>
        write!(f, "no instantiation for schema variable {sv:?}"),
      ApplyError::SortCast { found, required } =>
        write!(f, "replacement of sort {found:?} does not fit required sort {required:?}"),
      ApplyError::Term(e) => e.fmt(f),
    }
  }
}

impl std::error::Error for ApplyError {}

/// Applies one taclet once. The applier memoizes template instantiation,
/// so shared template subterms are built a single time per application.
#[derive(Debug)]
pub struct Applier<'a> {
  symbols: &'a Symbols,
  taclet: &'a Taclet,
  memo: HashMap<TermId, TermId>,
}

impl<'a> Applier<'a> {
  /// Create an applier for `taclet`.
  #[must_use]
  pub fn new(symbols: &'a Symbols, taclet: &'a Taclet) -> Applier<'a> {
    Applier { symbols, taclet, memo: HashMap::new() }
  }

  /// Build the successor sequents for a complete match against `seq`,
  /// one per goal template, paired with the template's branch label.
  pub fn apply(
    &mut self, dag: &mut TermDag, seq: &Sequent, mr: &MatchResult,
  ) -> Result<Vec<(Option<String>, Sequent)>, ApplyError> {
    if !mr.complete() { return Err(ApplyError::IncompleteMatch) }
    // memo entries depend on the match's instantiation
    self.memo.clear();
    let ctx: Vec<TermId> = mr.inst.update_context().collect();
    let mut out = Vec::with_capacity(self.taclet.goals.len());
    for gt in &self.taclet.goals {
      let mut new_seq = seq.clone();
      if let (Some(template), Some(pos)) = (gt.replace_with, &mr.pos) {
        let with = self.instantiate(dag, &mr.inst, template)?;
        let root = pos.formula(seq).0;
        let new_root = self.rebuild(dag, root, &pos.path, with, crate::logic::FORMULA)?;
        new_seq.replace(pos.side, pos.index, SequentFormula(new_root));
      }
      for side in [Side::Antec, Side::Succ] {
        let mut adds = Vec::new();
        for sf in gt.add.side(side) {
          let mut t = self.instantiate(dag, &mr.inst, sf.0)?;
          // added formulas live under the collected update context
          for &u in ctx.iter().rev() {
            t = dag.update_app(self.symbols, u, t)?;
          }
          adds.push(SequentFormula(t));
        }
        if adds.is_empty() { continue }
        match &mr.pos {
          Some(pos) if pos.side == side => new_seq.insert_adjacent(side, pos.index, &adds),
          _ => new_seq.insert_front(side, &adds),
        }
      }
      out.push((gt.name.clone(), new_seq));
    }
    debug!("taclet {} produced {} goals", self.taclet.name, out.len());
    Ok(out)
  }

  /// Replace every schema variable in a goal-template term by its bound
  /// value. Subterms without schema variables are returned as-is.
  fn instantiate(
    &mut self, dag: &mut TermDag, inst: &Instantiations, t: TermId,
  ) -> Result<TermId, ApplyError> {
    if !dag.has_schema(t) { return Ok(t) }
    if let Some(&r) = self.memo.get(&t) { return Ok(r) }
    let node = dag.node(t).clone();
    let r = match node.op {
      OpCode::SchemaVar(sv) => match inst.get(sv) {
        Some(InstValue::Term(bound)) => bound,
        Some(InstValue::Var(v)) => dag.var(self.symbols, v)?,
        Some(InstValue::Program(_)) | None =>
          return Err(ApplyError::MissingInstantiation(sv)),
      },
      op => {
        let op = match op {
          OpCode::Modality(kind, Program::Schema(sv)) => match inst.get(sv) {
            Some(InstValue::Program(p)) => OpCode::Modality(kind, Program::Concrete(p)),
            _ => return Err(ApplyError::MissingInstantiation(sv)),
          },
          op => op,
        };
        let args = node
          .args
          .iter()
          .map(|&a| self.instantiate(dag, inst, a))
          .collect::<Result<Vec<_>, _>>()?;
        let bound = node
          .bound
          .iter()
          .map(|&b| match b {
            Binder::Schema(sv) => match inst.get(sv) {
              Some(InstValue::Var(v)) => Ok(Binder::Var(v)),
              _ => Err(ApplyError::MissingInstantiation(sv)),
            },
            b => Ok(b),
          })
          .collect::<Result<Vec<_>, _>>()?;
        dag.term(self.symbols, op, args, bound, node.labels.to_vec())?
      }
    };
    self.memo.insert(t, r);
    Ok(r)
  }

  /// Rebuild the formula `t` with `with` substituted at the end of `path`.
  /// Siblings off the path are reused unchanged; the replacement must fit
  /// the maximal sort of its position, with a cast inserted when both
  /// sorts are object sorts.
  fn rebuild(
    &mut self, dag: &mut TermDag, t: TermId, path: &[u32], with: TermId, required: SortId,
  ) -> Result<TermId, ApplyError> {
    let Some((&i, rest)) = path.split_first() else { return self.coerce(dag, with, required) };
    let i = i as usize;
    let child_required = dag.max_sort(self.symbols, t, i);
    let node = dag.node(t).clone();
    let new_child = self.rebuild(dag, node.args[i], rest, with, child_required)?;
    if new_child == node.args[i] { return Ok(t) }
    let mut args = node.args.to_vec();
    args[i] = new_child;
    Ok(dag.term(self.symbols, node.op, args, node.bound.to_vec(), node.labels.to_vec())?)
  }

  fn coerce(
    &mut self, dag: &mut TermDag, with: TermId, required: SortId,
  ) -> Result<TermId, ApplyError> {
    let found = dag.sort(with);
    if self.symbols.extends_trans(found, required) { return Ok(with) }
    if self.symbols.is_object(found) && self.symbols.is_object(required) {
      Ok(dag.cast(self.symbols, required, with)?)
    } else {
      Err(ApplyError::SortCast { found, required })
    }
  }
}
