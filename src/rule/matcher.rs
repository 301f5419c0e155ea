//! The pattern matcher: structural unification of taclet patterns against
//! sequent positions.
//!
//! Matching walks pattern and candidate in lock-step. Schema variables bind
//! on first contact and must agree (modulo bound-variable renaming) on every
//! later one; once committed, a binding is never undone to rescue the
//! overall match. Alternatives exist only at the granularity of whole
//! [`MatchResult`]s. Positions reachable only through vetoed update or
//! modality contexts produce no results at all.

use if_chain::if_chain;
use itertools::Itertools;
use log::trace;

use taclet_util::{SvId, TermId, VarId};

use crate::logic::sequent::{PosInOccurrence, Sequent, Side};
use crate::logic::term::{Binder, OpCode, Program, TermDag};
use crate::logic::{FORMULA, SvKind, Symbols, UPDATE};

use super::inst::{InstValue, Instantiations};
use super::{StateRestriction, Taclet, TacletKind};

/// Why a match result cannot be applied as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Incompleteness {
  /// The taclet has an assumes pattern and no formula combination of the
  /// sequent satisfies it; an assumption instantiation must be supplied
  /// by the caller.
  AssumesUnmatched,
  /// A schema variable referenced by the goal templates was not bound by
  /// find/assumes matching or the variable conditions.
  UnboundSv(SvId),
}

/// One way a taclet matches a sequent: an instantiation store, the match
/// position (absent for no-find taclets), and whether the match still
/// needs caller input.
#[derive(Clone, Debug)]
pub struct MatchResult {
  /// The find position, if the taclet has a find pattern.
  pub pos: Option<PosInOccurrence>,
  /// The accumulated instantiations, including the update context.
  pub inst: Instantiations,
  /// `None` if the match is ready to apply.
  pub incomplete: Option<Incompleteness>,
}

impl MatchResult {
  /// True if every goal-template schema variable is bound and all side
  /// conditions were discharged.
  #[must_use]
  pub fn complete(&self) -> bool { self.incomplete.is_none() }
}

/// A matcher for one taclet against one term dag.
#[derive(Debug)]
pub struct Matcher<'a> {
  dag: &'a TermDag,
  symbols: &'a Symbols,
  taclet: &'a Taclet,
}

impl<'a> Matcher<'a> {
  /// Create a matcher for `taclet`.
  #[must_use]
  pub fn new(dag: &'a TermDag, symbols: &'a Symbols, taclet: &'a Taclet) -> Matcher<'a> {
    Matcher { dag, symbols, taclet }
  }

  /// Enumerate every match of the taclet against `seq`, including
  /// incomplete ones. Ambiguous matches (distinct bindings arising from
  /// different positions or assumption choices) are all returned.
  #[must_use]
  pub fn matches(&self, seq: &Sequent) -> Vec<MatchResult> {
    let mut out = Vec::new();
    match self.taclet.kind {
      TacletKind::Rewrite(_) => {
        for side in [Side::Antec, Side::Succ] {
          for i in 0..seq.side(side).len() {
            self.scan_subterms(seq, PosInOccurrence::top(side, i), &mut out);
          }
        }
      }
      TacletKind::Antec => self.scan_top_level(seq, Side::Antec, &mut out),
      TacletKind::Succ => self.scan_top_level(seq, Side::Succ, &mut out),
      TacletKind::NoFind => self.finish(seq, None, Instantiations::new(), &mut out),
    }
    out
  }

  /// Match the taclet's find pattern at one given position, running the
  /// full update-prefix check from the formula root.
  #[must_use]
  pub fn match_at(&self, seq: &Sequent, pos: &PosInOccurrence) -> Vec<MatchResult> {
    let mut out = Vec::new();
    self.try_position(seq, pos.clone(), &mut out);
    out
  }

  fn scan_subterms(&self, seq: &Sequent, pos: PosInOccurrence, out: &mut Vec<MatchResult>) {
    self.try_position(seq, pos.clone(), out);
    let t = pos.sub_term(self.dag, seq);
    for i in 0..self.dag.args(t).len() {
      self.scan_subterms(seq, pos.clone().down(i as u32), out);
    }
  }

  fn scan_top_level(&self, seq: &Sequent, side: Side, out: &mut Vec<MatchResult>) {
    let Some(find) = self.taclet.find else { return };
    for i in 0..seq.side(side).len() {
      // top-level updates are ignored but transported into the context
      let mut pos = PosInOccurrence::top(side, i);
      let mut cand = seq.side(side)[i].0;
      let mut inst = Instantiations::new();
      while self.dag.op(cand) == OpCode::UpdateApplication {
        inst = inst.add_update(self.dag.sub(cand, 0));
        pos = pos.down(1);
        cand = self.dag.sub(cand, 1);
      }
      if let Some(inst) = self.match_term(find, cand, inst, &mut vec![]) {
        self.finish(seq, Some(pos.clone()), inst, out);
      }
    }
  }

  fn try_position(&self, seq: &Sequent, pos: PosInOccurrence, out: &mut Vec<MatchResult>) {
    let Some(find) = self.taclet.find else { return };
    let restriction = match self.taclet.kind {
      TacletKind::Rewrite(r) => r,
      _ => StateRestriction::None,
    };
    let Some(inst) = self.check_update_prefix(seq, &pos, restriction) else { return };
    let cand = pos.sub_term(self.dag, seq);
    if let Some(inst) = self.match_term(find, cand, inst, &mut vec![]) {
      self.finish(seq, Some(pos), inst, out);
    }
  }

  /// Collect the updates above `pos` into the update context, or veto the
  /// position. With no restriction the context is ignored entirely; with
  /// `InSequentState` any update entered through its target (or any
  /// modality) vetoes; with `SameUpdateLevel` an update with free
  /// variables (or any modality) vetoes.
  fn check_update_prefix(
    &self, seq: &Sequent, pos: &PosInOccurrence, restriction: StateRestriction,
  ) -> Option<Instantiations> {
    let mut inst = Instantiations::new();
    if restriction == StateRestriction::None { return Some(inst) }
    for (t, child) in pos.walk_down(self.dag, seq) {
      match self.dag.op(t) {
        OpCode::UpdateApplication if child == 1 => {
          if restriction == StateRestriction::InSequentState || self.veto(t) {
            trace!("taclet {}: update prefix vetoes position", self.taclet.name);
            return None
          }
          inst = inst.add_update(self.dag.sub(t, 0));
        }
        OpCode::Modality(..) => {
          trace!("taclet {}: modality above position", self.taclet.name);
          return None
        }
        _ => {}
      }
    }
    Some(inst)
  }

  /// An update application whose assignment pairs contain free variables
  /// (or any schema variable) may not be skipped at the same update level.
  fn veto(&self, t: TermId) -> bool {
    !self.dag.free_vars(t).is_empty() || self.dag.has_schema(t)
  }

  /// Lock-step structural match of `pat` against `cand`, extending `inst`.
  /// `ren` maps pattern-side binders to candidate-side variables and is
  /// scoped to the current traversal.
  fn match_term(
    &self, pat: TermId, cand: TermId, inst: Instantiations,
    ren: &mut Vec<(Binder, VarId)>,
  ) -> Option<Instantiations> {
    let (pn, cn) = (self.dag.node(pat), self.dag.node(cand));
    match pn.op {
      OpCode::SchemaVar(sv) => self.match_sv(sv, cand, inst),
      OpCode::Var(v) => {
        let OpCode::Var(w) = cn.op else { return None };
        let ok = match ren.iter().rev().find(|&&(b, _)| b == Binder::Var(v)) {
          Some(&(_, w2)) => w2 == w,
          None => v == w,
        };
        ok.then_some(inst)
      }
      OpCode::Modality(kind, prog) => {
        let OpCode::Modality(ckind, cprog) = cn.op else { return None };
        if kind != ckind { return None }
        let inst = match (prog, cprog) {
          (Program::Concrete(p), Program::Concrete(c)) if p == c => inst,
          (Program::Schema(sv), Program::Concrete(c)) => {
            inst.add(sv, InstValue::Program(c), self.dag)?
          }
          _ => return None,
        };
        self.match_term(pn.args[0], cn.args[0], inst, ren)
      }
      op => {
        if op != cn.op || pn.args.len() != cn.args.len() || pn.bound.len() != cn.bound.len() {
          return None
        }
        let start = ren.len();
        let mut inst = Some(inst);
        for (&pb, &cb) in pn.bound.iter().zip(&*cn.bound) {
          inst = inst.and_then(|i| self.match_binder(pb, cb, i, ren));
          if inst.is_none() { break }
        }
        if inst.is_some() {
          for (&pa, &ca) in pn.args.iter().zip(&*cn.args) {
            inst = inst.and_then(|i| self.match_term(pa, ca, i, ren));
            if inst.is_none() { break }
          }
        }
        ren.truncate(start);
        inst
      }
    }
  }

  /// Match one binder slot. The candidate slot must be concrete; a
  /// successful match records the pair in the renaming table.
  fn match_binder(
    &self, pb: Binder, cb: Binder, inst: Instantiations, ren: &mut Vec<(Binder, VarId)>,
  ) -> Option<Instantiations> {
    let Binder::Var(w) = cb else { return None };
    let inst = match pb {
      Binder::Var(v) => {
        if self.symbols.vars[v].sort != self.symbols.vars[w].sort { return None }
        inst
      }
      Binder::Schema(sv) => if_chain! {
        if let SvKind::Variable(s) = self.symbols.svs[sv].kind;
        if self.symbols.extends_trans(self.symbols.vars[w].sort, s);
        if let Some(next) = inst.add(sv, InstValue::Var(w), self.dag);
        then { next }
        else { return None }
      },
    };
    ren.push((pb, w));
    Some(inst)
  }

  /// Bind a schema-variable leaf to the candidate subterm, checking the
  /// kind and sort of the candidate.
  fn match_sv(
    &self, sv: SvId, cand: TermId, inst: Instantiations,
  ) -> Option<Instantiations> {
    let sort = self.dag.sort(cand);
    match self.symbols.svs[sv].kind {
      SvKind::Term(s) if self.symbols.extends_trans(sort, s) =>
        inst.add(sv, InstValue::Term(cand), self.dag),
      SvKind::Formula if sort == FORMULA => inst.add(sv, InstValue::Term(cand), self.dag),
      SvKind::Update if sort == UPDATE => inst.add(sv, InstValue::Term(cand), self.dag),
      SvKind::Variable(s) => {
        let OpCode::Var(w) = self.dag.op(cand) else { return None };
        if !self.symbols.extends_trans(self.symbols.vars[w].sort, s) { return None }
        inst.add(sv, InstValue::Var(w), self.dag)
      }
      _ => {
        trace!("schema variable {} rejects candidate", self.symbols.svs[sv].name);
        None
      }
    }
  }

  /// After a successful find match: fan out over assumption choices, then
  /// discharge variable conditions and check completeness.
  fn finish(
    &self, seq: &Sequent, pos: Option<PosInOccurrence>, inst: Instantiations,
    out: &mut Vec<MatchResult>,
  ) {
    let slots: Vec<(Side, TermId)> = match &self.taclet.assumes {
      Some(assumes) => assumes
        .antecedent
        .iter()
        .map(|sf| (Side::Antec, sf.0))
        .chain(assumes.succedent.iter().map(|sf| (Side::Succ, sf.0)))
        .collect(),
      None => vec![],
    };
    if slots.is_empty() {
      self.discharge(pos, inst, out);
      return
    }

    let found = pos.as_ref().map(|p| (p.side, p.index));
    let candidates: Vec<Vec<usize>> = slots
      .iter()
      .map(|&(side, _)| {
        (0..seq.side(side).len()).filter(|&i| found != Some((side, i))).collect()
      })
      .collect();

    let mut any = false;
    for combo in candidates.iter().map(|c| c.iter().copied()).multi_cartesian_product() {
      let mut cur = Some(inst.clone());
      for (&(side, pat), idx) in slots.iter().zip(combo) {
        cur = cur.and_then(|i| self.match_assumption(pat, seq.side(side)[idx].0, i));
        if cur.is_none() { break }
      }
      if let Some(inst) = cur {
        any = true;
        self.discharge(pos.clone(), inst, out);
      }
    }
    if !any {
      // surfaced as "needs more input", not as a failure
      out.push(MatchResult { pos, inst, incomplete: Some(Incompleteness::AssumesUnmatched) });
    }
  }

  /// Match one assumes-pattern formula against a candidate formula, which
  /// must carry the update context already collected for this match.
  fn match_assumption(
    &self, pat: TermId, mut cand: TermId, inst: Instantiations,
  ) -> Option<Instantiations> {
    let ctx: Vec<_> = inst.update_context().collect();
    for u in ctx {
      if self.dag.op(cand) != OpCode::UpdateApplication
        || !self.dag.eq_mod_labels(self.dag.sub(cand, 0), u)
      {
        return None
      }
      cand = self.dag.sub(cand, 1);
    }
    self.match_term(pat, cand, inst, &mut vec![])
  }

  /// Run the variable conditions and completeness check, pushing the
  /// final result.
  fn discharge(
    &self, pos: Option<PosInOccurrence>, inst: Instantiations, out: &mut Vec<MatchResult>,
  ) {
    if let Some(&sv) = self.taclet.template_svs().iter().find(|&&sv| !inst.is_bound(sv)) {
      out.push(MatchResult { pos, inst, incomplete: Some(Incompleteness::UnboundSv(sv)) });
      return
    }
    let mut inst = inst;
    for cond in &self.taclet.conditions {
      match cond.check(&inst, self.dag, self.symbols) {
        Some(next) => inst = next,
        None => {
          trace!("taclet {}: variable condition failed", self.taclet.name);
          return
        }
      }
    }
    out.push(MatchResult { pos, inst, incomplete: None });
  }
}
