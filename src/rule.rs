//! Taclets: schematic rewrite rules over sequents.
//!
//! A taclet packages a find pattern, an optional assumes pattern, goal
//! templates and side conditions. The four taclet variants (rewrite,
//! antecedent, succedent, no-find) are a tagged [`TacletKind`] sharing
//! one matching core.

pub mod apply;
pub mod inst;
pub mod matcher;

use std::collections::{HashMap, HashSet};
use std::fmt;

use taclet_util::{
  HashMapExt, Modifiers, RuleSetId, RuleSetVec, SvId, TacletId, TacletVec, TermId,
};

use crate::logic::sequent::Sequent;
use crate::logic::term::{OpCode, TermDag};
use crate::logic::{FORMULA, Symbols};
use inst::{InstValue, Instantiations};

/// Restrictions on the state context between the sequent root and a
/// rewrite taclet's match position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StateRestriction {
  /// No restriction; the update context is ignored entirely.
  #[default]
  None,
  /// All taclet constituents must live at the same update level: updates
  /// above the match position are collected into the update context, and
  /// an update with free variables (or a modality) vetoes the position.
  SameUpdateLevel,
  /// The find position must be evaluated in the same state as the sequent:
  /// any update or modality above the position vetoes it.
  InSequentState,
}

/// The taclet variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TacletKind {
  /// The find pattern may match any subterm position, subject to the
  /// state restriction.
  Rewrite(StateRestriction),
  /// The find pattern matches top-level antecedent formulas (below
  /// top-level updates, which enter the update context).
  Antec,
  /// Like [`TacletKind::Antec`] for the succedent.
  Succ,
  /// No find pattern; the taclet only adds formulas.
  NoFind,
}

/// One successor-goal description: formulas to add and an optional
/// replacement for the found position. Templates define the goal split;
/// each application yields one goal per template.
#[derive(Clone, Debug, Default)]
pub struct GoalTemplate {
  /// An optional branch label.
  pub name: Option<String>,
  /// The replacement for the found position, if any.
  pub replace_with: Option<TermId>,
  /// Formulas to add, as a sequent pattern.
  pub add: Sequent,
}

/// A side condition on an otherwise complete instantiation. Conditions are
/// evaluated last and either narrow/extend the store or fail the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariableCondition {
  /// The variable bound to `var` must not occur free in the term bound
  /// to `term`.
  NotFreeIn {
    /// A variable schema variable.
    var: SvId,
    /// A term or formula schema variable.
    term: SvId,
  },
  /// The term bound to the schema variable must be a rigid constant.
  Constant(SvId),
  /// Bind `target` to the `index`-th argument of the term bound to
  /// `source` (a content-extraction condition).
  ExtractArg {
    /// The schema variable whose instantiation is inspected.
    source: SvId,
    /// The argument position to extract.
    index: usize,
    /// The schema variable receiving the extracted subterm.
    target: SvId,
  },
}

impl VariableCondition {
  /// Evaluate the condition against a store. Returns the (possibly
  /// extended) store on success, `None` to fail the match. A condition
  /// whose schema variables are unbound fails.
  #[must_use]
  pub fn check(
    &self, inst: &Instantiations, dag: &TermDag, symbols: &Symbols,
  ) -> Option<Instantiations> {
    match *self {
      VariableCondition::NotFreeIn { var, term } => {
        let InstValue::Var(v) = inst.get(var)? else { return None };
        let InstValue::Term(t) = inst.get(term)? else { return None };
        if dag.free_vars(t).contains(&v) { None } else { Some(inst.clone()) }
      }
      VariableCondition::Constant(sv) => {
        let InstValue::Term(t) = inst.get(sv)? else { return None };
        match dag.op(t) {
          OpCode::Decl(func)
            if dag.args(t).is_empty()
              && symbols.funcs[func].mods.contains(Modifiers::RIGID) =>
            Some(inst.clone()),
          _ => None,
        }
      }
      VariableCondition::ExtractArg { source, index, target } => {
        let InstValue::Term(t) = inst.get(source)? else { return None };
        let &arg = dag.args(t).get(index)?;
        inst.add(target, InstValue::Term(arg), dag)
      }
    }
  }
}

/// An immutable taclet definition.
#[derive(Clone, Debug)]
pub struct Taclet {
  /// The rule name, unique within a library.
  pub name: String,
  /// The taclet variant.
  pub kind: TacletKind,
  /// The find pattern. Required except for [`TacletKind::NoFind`].
  pub find: Option<TermId>,
  /// The assumes sequent pattern, matched against other formulas of the
  /// same sequent.
  pub assumes: Option<Sequent>,
  /// The goal templates, one successor goal each.
  pub goals: Vec<GoalTemplate>,
  /// Side conditions on the instantiation.
  pub conditions: Vec<VariableCondition>,
  /// The rule sets this taclet belongs to.
  pub rule_sets: Vec<RuleSetId>,
  /// Attribute flags; see [`Modifiers::taclet_data`].
  pub attrs: Modifiers,
  pub(crate) template_svs: Vec<SvId>,
}

impl Taclet {
  /// A taclet with the given name and kind and no other content.
  #[must_use]
  pub fn new(name: impl Into<String>, kind: TacletKind) -> Taclet {
    Taclet {
      name: name.into(),
      kind,
      find: None,
      assumes: None,
      goals: vec![],
      conditions: vec![],
      rule_sets: vec![],
      attrs: Modifiers::NONE,
      template_svs: vec![],
    }
  }

  /// The schema variables referenced by the goal templates. An application
  /// is complete only once all of these are bound.
  #[must_use]
  pub fn template_svs(&self) -> &[SvId] { &self.template_svs }
}

/// Errors from loading a taclet into a library.
#[derive(Clone, Debug)]
pub enum TacletDefError {
  /// A find taclet without a find pattern, or a no-find taclet with one.
  FindMismatch(String),
  /// The find pattern of an antecedent/succedent taclet is not a formula.
  FindNotFormula(String),
  /// A taclet without goal templates.
  NoGoals(String),
  /// The taclet name is already taken.
  Redeclared(String),
  /// A rule set id that was never declared.
  UnknownRuleSet(String, RuleSetId),
}

impl fmt::Display for TacletDefError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TacletDefError::FindMismatch(name) =>
        write!(f, "taclet '{name}': find pattern does not fit the taclet kind"),
      TacletDefError::FindNotFormula(name) =>
        write!(f, "taclet '{name}': antecedent/succedent find pattern must be a formula"),
      TacletDefError::NoGoals(name) => write!(f, "taclet '{name}' has no goal templates"),
      TacletDefError::Redeclared(name) => write!(f, "taclet '{name}' redeclared"),
      TacletDefError::UnknownRuleSet(name, rs) =>
        write!(f, "taclet '{name}' refers to undeclared rule set {rs:?}"),
    }
  }
}

impl std::error::Error for TacletDefError {}

/// A named rule set, used by search strategies to filter and order rules.
#[derive(Clone, Debug)]
pub struct RuleSet {
  /// The rule set name.
  pub name: String,
  /// The member taclets, in registration order.
  pub members: Vec<TacletId>,
}

/// The loaded taclet library: taclets by id and name, partitioned into
/// rule sets. Loaded once, immutable afterwards.
#[derive(Debug, Default)]
pub struct TacletLib {
  taclets: TacletVec<Taclet>,
  by_name: HashMap<String, TacletId>,
  rule_sets: RuleSetVec<RuleSet>,
  rule_set_names: HashMap<String, RuleSetId>,
}

impl TacletLib {
  /// An empty library.
  #[must_use]
  pub fn new() -> TacletLib { TacletLib::default() }

  /// Declare a rule set.
  pub fn add_rule_set(&mut self, name: impl Into<String>) -> Result<RuleSetId, TacletDefError> {
    let name = name.into();
    let id = RuleSetId(self.rule_sets.len() as u32);
    if let Some((_, e)) = self.rule_set_names.try_insert_ext(name.clone(), id) {
      return Err(TacletDefError::Redeclared(e.key().clone()))
    }
    self.rule_sets.push(RuleSet { name, members: vec![] });
    Ok(id)
  }

  /// Load a taclet, validating its shape and caching the schema variables
  /// its goal templates reference.
  pub fn add_taclet(&mut self, mut taclet: Taclet, dag: &TermDag) -> Result<TacletId, TacletDefError> {
    match (taclet.kind, taclet.find) {
      (TacletKind::NoFind, None) => {}
      (TacletKind::NoFind, Some(_)) | (_, None) =>
        return Err(TacletDefError::FindMismatch(taclet.name)),
      (TacletKind::Antec | TacletKind::Succ, Some(find)) if dag.sort(find) != FORMULA =>
        return Err(TacletDefError::FindNotFormula(taclet.name)),
      _ => {}
    }
    if taclet.goals.is_empty() {
      return Err(TacletDefError::NoGoals(taclet.name))
    }
    for &rs in &taclet.rule_sets {
      if self.rule_sets.get(rs).is_none() {
        return Err(TacletDefError::UnknownRuleSet(taclet.name, rs))
      }
    }

    let mut svs = HashSet::new();
    for gt in &taclet.goals {
      if let Some(rw) = gt.replace_with {
        dag.collect_schema_vars(rw, &mut svs);
      }
      for sf in gt.add.antecedent.iter().chain(&gt.add.succedent) {
        dag.collect_schema_vars(sf.0, &mut svs);
      }
    }
    taclet.template_svs = svs.into_iter().collect();
    taclet.template_svs.sort_unstable();

    let id = TacletId(self.taclets.len() as u32);
    if let Some((_, e)) = self.by_name.try_insert_ext(taclet.name.clone(), id) {
      return Err(TacletDefError::Redeclared(e.key().clone()))
    }
    for &rs in &taclet.rule_sets {
      self.rule_sets[rs].members.push(id);
    }
    self.taclets.push(taclet);
    Ok(id)
  }

  /// The taclet with the given id.
  #[must_use]
  pub fn get(&self, id: TacletId) -> &Taclet { &self.taclets[id] }

  /// Look up a taclet by name.
  #[must_use]
  pub fn by_name(&self, name: &str) -> Option<TacletId> { self.by_name.get(name).copied() }

  /// Look up a rule set by name.
  #[must_use]
  pub fn rule_set_by_name(&self, name: &str) -> Option<RuleSetId> {
    self.rule_set_names.get(name).copied()
  }

  /// The rule set with the given id.
  #[must_use]
  pub fn rule_set(&self, id: RuleSetId) -> &RuleSet { &self.rule_sets[id] }

  /// Iterate over all taclets in declaration order.
  pub fn iter(&self) -> impl Iterator<Item = (TacletId, &Taclet)> { self.taclets.enum_iter() }

  /// Iterate over rule sets in declaration order.
  pub fn rule_sets(&self) -> impl Iterator<Item = (RuleSetId, &RuleSet)> {
    self.rule_sets.enum_iter()
  }

  /// The number of loaded taclets.
  #[must_use]
  pub fn len(&self) -> usize { self.taclets.len() }

  /// True if no taclets are loaded.
  #[must_use]
  pub fn is_empty(&self) -> bool { self.taclets.is_empty() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::logic::SvKind;
  use crate::logic::sequent::SequentFormula;

  #[test]
  fn library_validation() {
    let mut sy = Symbols::new();
    let mut dag = TermDag::default();
    let mut lib = TacletLib::new();
    let phi = sy.add_schema_var("phi", SvKind::Formula);
    let find = dag.schema(&sy, phi).unwrap();

    // missing find
    let t = Taclet::new("bad", TacletKind::Antec);
    assert!(matches!(lib.add_taclet(t, &dag), Err(TacletDefError::FindMismatch(_))));

    // no goals
    let mut t = Taclet::new("bad2", TacletKind::Antec);
    t.find = Some(find);
    assert!(matches!(lib.add_taclet(t, &dag), Err(TacletDefError::NoGoals(_))));

    let mut t = Taclet::new("ok", TacletKind::Antec);
    t.find = Some(find);
    t.goals.push(GoalTemplate {
      add: Sequent::new(vec![], vec![SequentFormula(find)]),
      ..GoalTemplate::default()
    });
    let id = lib.add_taclet(t, &dag).unwrap();
    assert_eq!(lib.by_name("ok"), Some(id));
    assert_eq!(lib.get(id).template_svs(), &[phi]);

    // duplicate name
    let mut t = Taclet::new("ok", TacletKind::Antec);
    t.find = Some(find);
    t.goals.push(GoalTemplate::default());
    assert!(matches!(lib.add_taclet(t, &dag), Err(TacletDefError::Redeclared(_))));
  }

  #[test]
  fn extract_arg_condition() {
    let mut sy = Symbols::new();
    let mut dag = TermDag::default();
    let int = sy.add_sort("int", vec![], Modifiers::NONE).unwrap();
    let plus = sy.add_func("plus", vec![int, int], int, Modifiers::RIGID).unwrap();
    let one = sy.add_func("one", vec![], int, Modifiers::RIGID).unwrap();
    let two = sy.add_func("two", vec![], int, Modifiers::RIGID).unwrap();
    let src = sy.add_schema_var("src", SvKind::Term(int));
    let tgt = sy.add_schema_var("tgt", SvKind::Term(int));

    let t1 = dag.app(&sy, one, vec![]).unwrap();
    let t2 = dag.app(&sy, two, vec![]).unwrap();
    let sum = dag.app(&sy, plus, vec![t1, t2]).unwrap();

    let inst = Instantiations::new().add(src, InstValue::Term(sum), &dag).unwrap();
    let cond = VariableCondition::ExtractArg { source: src, index: 1, target: tgt };
    let inst = cond.check(&inst, &dag, &sy).unwrap();
    assert_eq!(inst.get(tgt), Some(InstValue::Term(t2)));

    // out-of-range extraction fails the match
    let cond = VariableCondition::ExtractArg { source: src, index: 5, target: tgt };
    assert!(cond.check(&inst, &dag, &sy).is_none());
  }
}
