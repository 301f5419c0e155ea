//! The automated prover: a saturation loop over the open goals of a proof.
//!
//! The strategy is deliberately plain. Trivially valid goals are closed
//! outright; otherwise the rule sets are tried in declaration order and the
//! first productive complete match is applied. Taclets outside every rule
//! set are never applied automatically, and neither are taclets marked
//! interactive-only. An application whose successor sequents all equal the
//! goal sequent is counted as exhausted at that goal instead of being
//! applied, so rewrites to a fixpoint terminate.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info};

use taclet_util::{GoalId, Modifiers, TacletId};

use crate::logic::sequent::Sequent;
use crate::logic::term::{OpCode, TermDag};
use crate::proof::{Proof, ProofError, Services};
use crate::rule::apply::Applier;

/// Limits and controls for one prover run.
#[derive(Clone, Debug)]
pub struct ProverConfig {
  /// The maximum number of rule applications.
  pub max_steps: usize,
  /// An optional wall-clock budget, checked between applications.
  pub timeout: Option<Duration>,
  /// Cooperative cancellation: set the flag from another thread to stop
  /// the run at the next application boundary.
  pub cancel: Arc<AtomicBool>,
}

impl Default for ProverConfig {
  fn default() -> ProverConfig {
    ProverConfig { max_steps: 10_000, timeout: None, cancel: Arc::default() }
  }
}

/// Why a prover run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
  /// Every goal was closed.
  Closed,
  /// No applicable rule remains on some open goal.
  Open,
  /// The cancel flag was set.
  Cancelled,
  /// The wall-clock budget ran out.
  TimedOut,
  /// The application limit was reached.
  MaxSteps,
}

/// The result of a prover run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProveResult {
  /// Why the run stopped.
  pub outcome: Outcome,
  /// The number of rule applications performed.
  pub steps: usize,
}

/// The automated prover.
#[derive(Debug)]
pub struct Prover<'a> {
  services: Services<'a>,
  config: ProverConfig,
}

impl<'a> Prover<'a> {
  /// Create a prover over the given services.
  #[must_use]
  pub fn new(services: Services<'a>, config: ProverConfig) -> Prover<'a> {
    Prover { services, config }
  }

  /// Run the saturation loop on `proof` until it closes or a limit is hit.
  pub fn run(&self, proof: &mut Proof, dag: &mut TermDag) -> Result<ProveResult, ProofError> {
    let deadline = self.config.timeout.map(|d| Instant::now() + d);
    let mut steps = 0;
    let mut exhausted: HashSet<(GoalId, TacletId)> = HashSet::new();
    fn done(outcome: Outcome, steps: usize) -> Result<ProveResult, ProofError> {
      info!("prover stopped: {outcome:?} after {steps} steps");
      Ok(ProveResult { outcome, steps })
    }
    'outer: loop {
      let trivial: Vec<GoalId> = proof
        .open_goals()
        .filter(|&(g, _)| proof.goal_sequent(g).is_some_and(|s| is_axiom(s, dag)))
        .map(|(g, _)| g)
        .collect();
      for g in trivial {
        proof.close_goal(g)?;
      }
      if proof.is_closed() { return done(Outcome::Closed, steps) }
      if self.config.cancel.load(Ordering::Relaxed) { return done(Outcome::Cancelled, steps) }
      if deadline.is_some_and(|d| Instant::now() >= d) { return done(Outcome::TimedOut, steps) }
      if steps >= self.config.max_steps { return done(Outcome::MaxSteps, steps) }

      let goals: Vec<GoalId> = proof.open_goals().map(|(g, _)| g).collect();
      for goal in goals {
        for (_, rs) in self.services.taclets.rule_sets() {
          for &tid in &rs.members {
            let taclet = self.services.taclets.get(tid);
            if taclet.attrs.contains(Modifiers::INTERACTIVE_ONLY) { continue }
            if exhausted.contains(&(goal, tid)) { continue }
            let apps = proof.find_applications(goal, tid, self.services, dag)?;
            for app in apps.iter().filter(|a| a.result.complete()) {
              let seq = match proof.goal_sequent(goal) {
                Some(s) => s.clone(),
                None => continue,
              };
              let sequents = Applier::new(self.services.symbols, taclet)
                .apply(dag, &seq, &app.result)
                .map_err(ProofError::Apply)?;
              if sequents.iter().all(|(_, s)| s.eq_mod_labels(&seq, dag)) { continue }
              proof.apply(app, self.services, dag)?;
              steps += 1;
              debug!("step {steps}: {} at goal {goal:?}", taclet.name);
              continue 'outer
            }
            exhausted.insert((goal, tid));
          }
        }
      }
      return done(Outcome::Open, steps)
    }
  }
}

/// A sequent that holds by inspection: `true` in the succedent, `false` in
/// the antecedent, or a formula on both sides (labels ignored).
#[must_use]
pub fn is_axiom(seq: &Sequent, dag: &TermDag) -> bool {
  if seq.succedent.iter().any(|sf| dag.op(sf.0) == OpCode::True) { return true }
  if seq.antecedent.iter().any(|sf| dag.op(sf.0) == OpCode::False) { return true }
  seq
    .antecedent
    .iter()
    .any(|a| seq.succedent.iter().any(|s| dag.eq_mod_labels(a.0, s.0)))
}
