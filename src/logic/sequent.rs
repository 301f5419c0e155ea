//! Sequents, semisequent positions, and positions within formulas.

use taclet_util::TermId;

use super::term::TermDag;

/// A formula occurrence in a sequent. The wrapper keeps sequent bookkeeping
/// distinct from raw term ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequentFormula(pub TermId);

/// The two sides of a sequent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
  /// The antecedent (left of the turnstile).
  Antec,
  /// The succedent (right of the turnstile).
  Succ,
}

/// A proof obligation: `antecedent ==> succedent`, read as the conjunction
/// of the antecedent implying the disjunction of the succedent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sequent {
  /// The antecedent formulas, in order.
  pub antecedent: Vec<SequentFormula>,
  /// The succedent formulas, in order.
  pub succedent: Vec<SequentFormula>,
}

impl Sequent {
  /// Create a sequent from formula lists.
  #[must_use]
  pub fn new(antecedent: Vec<SequentFormula>, succedent: Vec<SequentFormula>) -> Sequent {
    Sequent { antecedent, succedent }
  }

  /// The empty sequent.
  #[must_use]
  pub fn empty() -> Sequent { Sequent::default() }

  /// True if both sides are empty.
  #[must_use]
  pub fn is_empty(&self) -> bool { self.antecedent.is_empty() && self.succedent.is_empty() }

  /// The formulas of one side.
  #[must_use]
  pub fn side(&self, side: Side) -> &[SequentFormula] {
    match side {
      Side::Antec => &self.antecedent,
      Side::Succ => &self.succedent,
    }
  }

  fn side_mut(&mut self, side: Side) -> &mut Vec<SequentFormula> {
    match side {
      Side::Antec => &mut self.antecedent,
      Side::Succ => &mut self.succedent,
    }
  }

  /// Replace the formula at `index` of `side`.
  pub fn replace(&mut self, side: Side, index: usize, formula: SequentFormula) {
    self.side_mut(side)[index] = formula;
  }

  /// Insert formulas immediately before `index` of `side`, preserving
  /// their order.
  pub fn insert_adjacent(&mut self, side: Side, index: usize, formulas: &[SequentFormula]) {
    let v = self.side_mut(side);
    let at = index.min(v.len());
    for (k, &f) in formulas.iter().enumerate() {
      v.insert(at + k, f);
    }
  }

  /// Insert formulas at the front of `side`, preserving their order.
  pub fn insert_front(&mut self, side: Side, formulas: &[SequentFormula]) {
    self.insert_adjacent(side, 0, formulas);
  }

  /// Content equality: same shape, formulas pairwise structurally equal
  /// independent of labels.
  #[must_use]
  pub fn eq_mod_labels(&self, other: &Sequent, dag: &TermDag) -> bool {
    let eq = |a: &[SequentFormula], b: &[SequentFormula]| {
      a.len() == b.len() && a.iter().zip(b).all(|(x, y)| dag.eq_mod_labels(x.0, y.0))
    };
    eq(&self.antecedent, &other.antecedent) && eq(&self.succedent, &other.succedent)
  }
}

/// A position in a sequent: a formula occurrence plus a path of child
/// indices from the formula root down to a subterm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PosInOccurrence {
  /// The side of the sequent.
  pub side: Side,
  /// The formula index within that side.
  pub index: usize,
  /// The child indices from the formula root to the addressed subterm;
  /// empty means the whole formula.
  pub path: Vec<u32>,
}

impl PosInOccurrence {
  /// A top-level position: the whole formula at `index` of `side`.
  #[must_use]
  pub fn top(side: Side, index: usize) -> PosInOccurrence {
    PosInOccurrence { side, index, path: vec![] }
  }

  /// Extend the path one step down into child `i`.
  #[must_use]
  pub fn down(mut self, i: u32) -> PosInOccurrence {
    self.path.push(i);
    self
  }

  /// The addressed formula.
  #[must_use]
  pub fn formula(&self, seq: &Sequent) -> SequentFormula { seq.side(self.side)[self.index] }

  /// The addressed subterm.
  #[must_use]
  pub fn sub_term(&self, dag: &TermDag, seq: &Sequent) -> TermId {
    let mut t = self.formula(seq).0;
    for &i in &self.path {
      t = dag.sub(t, i as usize);
    }
    t
  }

  /// Walk from the formula root towards the position, yielding at each
  /// step the term about to be descended and the child index taken.
  pub fn walk_down<'a>(
    &'a self, dag: &'a TermDag, seq: &Sequent,
  ) -> impl Iterator<Item = (TermId, u32)> + 'a {
    let mut t = self.formula(seq).0;
    self.path.iter().map(move |&i| {
      let here = t;
      t = dag.sub(t, i as usize);
      (here, i)
    })
  }
}
