//! End-to-end proofs through the public API.

use taclet_rs::{
  GoalTemplate, Modifiers, Outcome, Proof, ProofEvent, Prover, ProverConfig,
  Sequent, SequentFormula, Services, StateRestriction, SvKind, Symbols, Taclet, TacletKind,
  TacletLib, TermDag, FORMULA,
};

fn init_logging() {
  let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, simplelog::Config::default());
}

/// A propositional base: and_right, imp_right, and_left, all in one
/// rule set.
fn prop_rules(sy: &mut Symbols, dag: &mut TermDag) -> TacletLib {
  let mut lib = TacletLib::new();
  let rs = lib.add_rule_set("prop").unwrap();

  let a = sy.add_schema_var("a", SvKind::Formula);
  let b = sy.add_schema_var("b", SvKind::Formula);
  let asch = dag.schema(sy, a).unwrap();
  let bsch = dag.schema(sy, b).unwrap();

  let conj = dag.and(sy, asch, bsch).unwrap();
  let mut t = Taclet::new("and_right", TacletKind::Succ);
  t.find = Some(conj);
  t.rule_sets = vec![rs];
  t.goals.push(GoalTemplate {
    name: Some("left".into()),
    replace_with: Some(asch),
    ..GoalTemplate::default()
  });
  t.goals.push(GoalTemplate {
    name: Some("right".into()),
    replace_with: Some(bsch),
    ..GoalTemplate::default()
  });
  lib.add_taclet(t, dag).unwrap();

  let mut t = Taclet::new("and_left", TacletKind::Antec);
  t.find = Some(conj);
  t.rule_sets = vec![rs];
  t.goals.push(GoalTemplate {
    replace_with: Some(asch),
    add: Sequent::new(vec![SequentFormula(bsch)], vec![]),
    ..GoalTemplate::default()
  });
  lib.add_taclet(t, dag).unwrap();

  let imp = dag.imp(sy, asch, bsch).unwrap();
  let mut t = Taclet::new("imp_right", TacletKind::Succ);
  t.find = Some(imp);
  t.rule_sets = vec![rs];
  t.goals.push(GoalTemplate {
    replace_with: Some(bsch),
    add: Sequent::new(vec![SequentFormula(asch)], vec![]),
    ..GoalTemplate::default()
  });
  lib.add_taclet(t, dag).unwrap();

  lib
}

#[test]
fn propositional_proof_closes() {
  init_logging();
  let mut sy = Symbols::new();
  let mut dag = TermDag::default();
  let lib = prop_rules(&mut sy, &mut dag);

  // ==> (p & q) -> p
  let p = sy.add_func("p", vec![], FORMULA, Modifiers::RIGID).unwrap();
  let q = sy.add_func("q", vec![], FORMULA, Modifiers::RIGID).unwrap();
  let pf = dag.app(&sy, p, vec![]).unwrap();
  let qf = dag.app(&sy, q, vec![]).unwrap();
  let conj = dag.and(&sy, pf, qf).unwrap();
  let goal = dag.imp(&sy, conj, pf).unwrap();

  let mut proof = Proof::new(Sequent::new(vec![], vec![SequentFormula(goal)]));
  let events = proof.subscribe();
  let services = Services { symbols: &sy, taclets: &lib };
  let res = Prover::new(services, ProverConfig::default()).run(&mut proof, &mut dag).unwrap();
  assert_eq!(res.outcome, Outcome::Closed);
  assert!(proof.is_closed());

  let received: Vec<ProofEvent> = events.try_iter().collect();
  assert!(received.iter().any(|e| matches!(e, ProofEvent::NodesAdded { .. })));
  assert!(received.iter().any(|e| matches!(e, ProofEvent::GoalClosed(_))));
}

#[test]
fn rewrite_then_close() {
  init_logging();
  let mut sy = Symbols::new();
  let mut dag = TermDag::default();
  let mut lib = TacletLib::new();
  let rs = lib.add_rule_set("simplify").unwrap();

  let int = sy.add_sort("int", vec![], Modifiers::NONE).unwrap();
  let plus = sy.add_func("plus", vec![int, int], int, Modifiers::RIGID).unwrap();
  let zero = sy.add_func("zero", vec![], int, Modifiers::RIGID).unwrap();
  let x = sy.add_schema_var("x", SvKind::Term(int));
  let xs = dag.schema(&sy, x).unwrap();
  let z = dag.app(&sy, zero, vec![]).unwrap();
  let find = dag.app(&sy, plus, vec![xs, z]).unwrap();

  let mut t = Taclet::new("plus_zero", TacletKind::Rewrite(StateRestriction::None));
  t.find = Some(find);
  t.rule_sets = vec![rs];
  t.goals.push(GoalTemplate { replace_with: Some(xs), ..GoalTemplate::default() });
  lib.add_taclet(t, &dag).unwrap();

  // p(plus(a, zero)) ==> p(a)
  let a = sy.add_func("a", vec![], int, Modifiers::RIGID).unwrap();
  let pred = sy.add_func("p", vec![int], FORMULA, Modifiers::RIGID).unwrap();
  let at = dag.app(&sy, a, vec![]).unwrap();
  let sum = dag.app(&sy, plus, vec![at, z]).unwrap();
  let lhs = dag.app(&sy, pred, vec![sum]).unwrap();
  let rhs = dag.app(&sy, pred, vec![at]).unwrap();

  let mut proof = Proof::new(Sequent::new(vec![SequentFormula(lhs)], vec![SequentFormula(rhs)]));
  let services = Services { symbols: &sy, taclets: &lib };
  let res = Prover::new(services, ProverConfig::default()).run(&mut proof, &mut dag).unwrap();
  assert_eq!(res.outcome, Outcome::Closed);
  assert_eq!(res.steps, 1);
}

#[test]
fn labels_do_not_block_closing() {
  init_logging();
  let mut sy = Symbols::new();
  let mut dag = TermDag::default();
  let lib = TacletLib::new();

  let p = sy.add_func("p", vec![], FORMULA, Modifiers::RIGID).unwrap();
  let l = sy.label("origin");
  let pf = dag.app(&sy, p, vec![]).unwrap();
  let pl = dag.labeled(&sy, pf, vec![l]).unwrap();
  assert_ne!(pf, pl);

  let mut proof = Proof::new(Sequent::new(vec![SequentFormula(pl)], vec![SequentFormula(pf)]));
  let services = Services { symbols: &sy, taclets: &lib };
  let res = Prover::new(services, ProverConfig::default()).run(&mut proof, &mut dag).unwrap();
  assert_eq!(res.outcome, Outcome::Closed);
}

#[test]
fn rewriting_under_updates_respects_the_restriction() {
  init_logging();
  let mut sy = Symbols::new();
  let mut dag = TermDag::default();
  let mut lib = TacletLib::new();
  let rs = lib.add_rule_set("simplify").unwrap();

  let int = sy.add_sort("int", vec![], Modifiers::NONE).unwrap();
  let loc = sy.add_func("loc", vec![], int, Modifiers::ASSIGNABLE).unwrap();
  let one = sy.add_func("one", vec![], int, Modifiers::RIGID).unwrap();
  let p = sy.add_func("p", vec![], FORMULA, Modifiers::RIGID).unwrap();
  let pf = dag.app(&sy, p, vec![]).unwrap();
  let notnot = {
    let np = dag.not(&sy, pf).unwrap();
    dag.not(&sy, np).unwrap()
  };

  // not_not: !!a ~> a, usable under updates at the same level
  let a = sy.add_schema_var("a", SvKind::Formula);
  let asch = dag.schema(&sy, a).unwrap();
  let find = {
    let na = dag.not(&sy, asch).unwrap();
    dag.not(&sy, na).unwrap()
  };
  let mut t = Taclet::new("not_not", TacletKind::Rewrite(StateRestriction::SameUpdateLevel));
  t.find = Some(find);
  t.rule_sets = vec![rs];
  t.goals.push(GoalTemplate { replace_with: Some(asch), ..GoalTemplate::default() });
  lib.add_taclet(t, &dag).unwrap();

  // {loc := one} !!p ==> {loc := one} p
  let t1 = dag.app(&sy, one, vec![]).unwrap();
  let upd = dag.elem_update(&sy, loc, t1).unwrap();
  let lhs = dag.update_app(&sy, upd, notnot).unwrap();
  let rhs = dag.update_app(&sy, upd, pf).unwrap();

  let mut proof = Proof::new(Sequent::new(vec![SequentFormula(lhs)], vec![SequentFormula(rhs)]));
  let services = Services { symbols: &sy, taclets: &lib };
  let res = Prover::new(services, ProverConfig::default()).run(&mut proof, &mut dag).unwrap();
  assert_eq!(res.outcome, Outcome::Closed);
}

#[test]
fn assumption_based_closing() {
  init_logging();
  let mut sy = Symbols::new();
  let mut dag = TermDag::default();
  let mut lib = TacletLib::new();
  let rs = lib.add_rule_set("close").unwrap();

  // close_by_assumption: find phi in the succedent, assumes phi in the
  // antecedent, no successor goals beyond a trivially true one
  let phi = sy.add_schema_var("phi", SvKind::Formula);
  let phis = dag.schema(&sy, phi).unwrap();
  let tt = dag.tt(&sy).unwrap();
  let mut t = Taclet::new("close_by_assumption", TacletKind::Succ);
  t.find = Some(phis);
  t.assumes = Some(Sequent::new(vec![SequentFormula(phis)], vec![]));
  t.rule_sets = vec![rs];
  t.goals.push(GoalTemplate { replace_with: Some(tt), ..GoalTemplate::default() });
  lib.add_taclet(t, &dag).unwrap();

  let int = sy.add_sort("int", vec![], Modifiers::NONE).unwrap();
  let pred = sy.add_func("p", vec![int], FORMULA, Modifiers::RIGID).unwrap();
  let c = sy.add_func("c", vec![], int, Modifiers::RIGID).unwrap();
  let ct = dag.app(&sy, c, vec![]).unwrap();
  let pc = dag.app(&sy, pred, vec![ct]).unwrap();

  let mut proof = Proof::new(Sequent::new(vec![SequentFormula(pc)], vec![SequentFormula(pc)]));
  let services = Services { symbols: &sy, taclets: &lib };
  let res = Prover::new(services, ProverConfig::default()).run(&mut proof, &mut dag).unwrap();
  assert_eq!(res.outcome, Outcome::Closed);
}

#[test]
fn timeout_is_reported() {
  init_logging();
  let mut sy = Symbols::new();
  let mut dag = TermDag::default();
  let lib = TacletLib::new();
  let p = sy.add_func("p", vec![], FORMULA, Modifiers::RIGID).unwrap();
  let pf = dag.app(&sy, p, vec![]).unwrap();

  let mut proof = Proof::new(Sequent::new(vec![], vec![SequentFormula(pf)]));
  let services = Services { symbols: &sy, taclets: &lib };
  let config =
    ProverConfig { timeout: Some(std::time::Duration::ZERO), ..ProverConfig::default() };
  let res = Prover::new(services, config).run(&mut proof, &mut dag).unwrap();
  assert_eq!(res.outcome, Outcome::TimedOut);
}

#[test]
fn manual_application_and_pruning() {
  init_logging();
  let mut sy = Symbols::new();
  let mut dag = TermDag::default();
  let lib = prop_rules(&mut sy, &mut dag);

  let p = sy.add_func("p", vec![], FORMULA, Modifiers::RIGID).unwrap();
  let q = sy.add_func("q", vec![], FORMULA, Modifiers::RIGID).unwrap();
  let pf = dag.app(&sy, p, vec![]).unwrap();
  let qf = dag.app(&sy, q, vec![]).unwrap();
  let conj = dag.and(&sy, pf, qf).unwrap();
  let seq = Sequent::new(vec![], vec![SequentFormula(conj)]);

  let mut proof = Proof::new(seq.clone());
  let services = Services { symbols: &sy, taclets: &lib };
  let and_right = lib.by_name("and_right").unwrap();

  let (goal, _) = proof.open_goals().next().unwrap();
  let apps = proof.find_applications(goal, and_right, services, &dag).unwrap();
  let app = apps.iter().find(|a| a.result.complete()).unwrap();
  assert_eq!(app.result.inst.len(), 2);
  let opened = proof.apply(app, services, &mut dag).unwrap();
  assert_eq!(opened.len(), 2);

  // the two branches carry the template labels
  let root = proof.node(proof.root());
  let labels: Vec<_> =
    root.children.iter().map(|&c| proof.node(c).branch.clone()).collect();
  assert_eq!(labels, vec![Some("left".into()), Some("right".into())]);

  // prune back and observe the original sequent again
  let reopened = proof.prune_to(proof.root());
  assert_eq!(proof.goal_sequent(reopened), Some(&seq));
  assert_eq!(proof.num_open_goals(), 1);
}
