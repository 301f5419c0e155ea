//! The proof tree: nodes, open goals, rule application and pruning.
//!
//! A proof is a tree of nodes, each carrying the full sequent that held
//! when the node was created. Open leaves are tracked as goals with ids
//! that are never reused, so anything holding a stale [`GoalId`] after a
//! prune simply finds no goal behind it.

use std::collections::HashMap;
use std::fmt;

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, info};

use taclet_util::{GoalId, NodeId, NodeVec, TacletId};

use crate::logic::Symbols;
use crate::logic::sequent::Sequent;
use crate::logic::term::TermDag;
use crate::rule::TacletLib;
use crate::rule::apply::{Applier, ApplyError};
use crate::rule::matcher::{MatchResult, Matcher};

/// The read-only context needed to match and apply rules.
#[derive(Clone, Copy, Debug)]
pub struct Services<'a> {
  /// The symbol table.
  pub symbols: &'a Symbols,
  /// The loaded taclet library.
  pub taclets: &'a TacletLib,
}

/// The rule application recorded at an inner node.
#[derive(Clone, Debug)]
pub struct AppliedRule {
  /// The applied taclet.
  pub taclet: TacletId,
  /// The match it was applied with.
  pub result: MatchResult,
}

/// One node of the proof tree.
#[derive(Clone, Debug)]
pub struct Node {
  /// The parent node; `None` for the root.
  pub parent: Option<NodeId>,
  /// The sequent at this node.
  pub sequent: Sequent,
  /// The branch label from the goal template that created this node.
  pub branch: Option<String>,
  /// The rule applied at this node, creating its children.
  pub rule: Option<AppliedRule>,
  /// The child nodes, in goal-template order.
  pub children: Vec<NodeId>,
  /// The open goal sitting at this node, if it is an open leaf.
  pub goal: Option<GoalId>,
}

/// A taclet application offer: a match found at a specific goal. Stale
/// offers (the goal was closed or pruned away) are rejected at
/// application time.
#[derive(Clone, Debug)]
pub struct TacletApp {
  /// The goal the match was found at.
  pub goal: GoalId,
  /// The matched taclet.
  pub taclet: TacletId,
  /// The match itself.
  pub result: MatchResult,
}

/// Events emitted by the proof as it changes shape.
#[derive(Clone, Debug)]
pub enum ProofEvent {
  /// A rule application extended the tree.
  NodesAdded {
    /// The node the rule was applied at.
    parent: NodeId,
    /// The created children.
    children: Vec<NodeId>,
  },
  /// A goal was closed.
  GoalClosed(GoalId),
  /// The tree was pruned back to a node, reopening it.
  Pruned {
    /// The node the proof was pruned back to.
    node: NodeId,
    /// The fresh goal reopened at that node.
    reopened: GoalId,
  },
}

/// Errors from proof manipulation.
#[derive(Debug)]
pub enum ProofError {
  /// The goal id does not name an open goal (closed, pruned, or never
  /// existed).
  UnknownGoal(GoalId),
  /// The underlying taclet application failed.
  Apply(ApplyError),
}

impl From<ApplyError> for ProofError {
  fn from(e: ApplyError) -> ProofError { ProofError::Apply(e) }
}

impl fmt::Display for ProofError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ProofError::UnknownGoal(g) => write!(f, "no open goal {g:?}"),
      ProofError::Apply(e) => e.fmt(f),
    }
  }
}

impl std::error::Error for ProofError {}

/// The proof tree.
#[derive(Debug, Default)]
pub struct Proof {
  nodes: NodeVec<Node>,
  goals: HashMap<GoalId, NodeId>,
  next_goal: u32,
  cache: HashMap<(GoalId, TacletId), Vec<MatchResult>>,
  subscribers: Vec<Sender<ProofEvent>>,
}

impl Proof {
  /// Start a proof for `root`.
  #[must_use]
  pub fn new(root: Sequent) -> Proof {
    let mut proof = Proof::default();
    let id = proof.nodes.push(Node {
      parent: None,
      sequent: root,
      branch: None,
      rule: None,
      children: vec![],
      goal: None,
    });
    let goal = proof.fresh_goal(id);
    proof.nodes[id].goal = Some(goal);
    proof
  }

  /// The root node.
  #[must_use]
  pub fn root(&self) -> NodeId { NodeId(0) }

  /// The node with the given id.
  #[must_use]
  pub fn node(&self, id: NodeId) -> &Node { &self.nodes[id] }

  /// The number of nodes ever created, pruned subtrees included.
  #[must_use]
  pub fn num_nodes(&self) -> usize { self.nodes.len() }

  /// Iterate over the open goals.
  pub fn open_goals(&self) -> impl Iterator<Item = (GoalId, NodeId)> + '_ {
    self.goals.iter().map(|(&g, &n)| (g, n))
  }

  /// The number of open goals.
  #[must_use]
  pub fn num_open_goals(&self) -> usize { self.goals.len() }

  /// The sequent of an open goal, or `None` for a stale id.
  #[must_use]
  pub fn goal_sequent(&self, goal: GoalId) -> Option<&Sequent> {
    self.goals.get(&goal).map(|&n| &self.nodes[n].sequent)
  }

  /// True once no goals remain open.
  #[must_use]
  pub fn is_closed(&self) -> bool { self.goals.is_empty() }

  /// Subscribe to proof events. Dropped receivers are cleaned up lazily.
  pub fn subscribe(&mut self) -> Receiver<ProofEvent> {
    let (tx, rx) = unbounded();
    self.subscribers.push(tx);
    rx
  }

  fn emit(&mut self, ev: &ProofEvent) {
    self.subscribers.retain(|tx| tx.send(ev.clone()).is_ok());
  }

  fn fresh_goal(&mut self, node: NodeId) -> GoalId {
    let goal = GoalId(self.next_goal);
    self.next_goal += 1;
    self.goals.insert(goal, node);
    goal
  }

  /// Find every way `taclet` matches the sequent of `goal`, including
  /// incomplete matches. Results are cached per goal; the cache needs no
  /// invalidation because a goal's sequent never changes while it is open.
  pub fn find_applications(
    &mut self, goal: GoalId, taclet: TacletId, services: Services<'_>, dag: &TermDag,
  ) -> Result<Vec<TacletApp>, ProofError> {
    let &node = self.goals.get(&goal).ok_or(ProofError::UnknownGoal(goal))?;
    let nodes = &self.nodes;
    let results = self.cache.entry((goal, taclet)).or_insert_with(|| {
      Matcher::new(dag, services.symbols, services.taclets.get(taclet))
        .matches(&nodes[node].sequent)
    });
    Ok(results.iter().map(|r| TacletApp { goal, taclet, result: r.clone() }).collect())
  }

  /// Apply a taclet at the goal recorded in `app`. All successor sequents
  /// are built before the tree is touched, so an error leaves the proof
  /// unchanged. Returns the goals opened at the new leaves.
  pub fn apply(
    &mut self, app: &TacletApp, services: Services<'_>, dag: &mut TermDag,
  ) -> Result<Vec<GoalId>, ProofError> {
    let &node = self.goals.get(&app.goal).ok_or(ProofError::UnknownGoal(app.goal))?;
    let taclet = services.taclets.get(app.taclet);
    let sequents = Applier::new(services.symbols, taclet)
      .apply(dag, &self.nodes[node].sequent, &app.result)?;

    self.goals.remove(&app.goal);
    self.nodes[node].goal = None;
    self.nodes[node].rule =
      Some(AppliedRule { taclet: app.taclet, result: app.result.clone() });

    let mut children = Vec::with_capacity(sequents.len());
    let mut opened = Vec::with_capacity(sequents.len());
    for (branch, sequent) in sequents {
      let child = self.nodes.push(Node {
        parent: Some(node),
        sequent,
        branch,
        rule: None,
        children: vec![],
        goal: None,
      });
      let goal = self.fresh_goal(child);
      self.nodes[child].goal = Some(goal);
      children.push(child);
      opened.push(goal);
    }
    self.nodes[node].children = children.clone();
    debug!("applied {} at node {:?}, {} new goals", taclet.name, node, opened.len());
    self.emit(&ProofEvent::NodesAdded { parent: node, children });
    Ok(opened)
  }

  /// Close an open goal, removing it from the open set. The leaf stays in
  /// the tree as a closed leaf.
  pub fn close_goal(&mut self, goal: GoalId) -> Result<NodeId, ProofError> {
    let node = self.goals.remove(&goal).ok_or(ProofError::UnknownGoal(goal))?;
    self.nodes[node].goal = None;
    self.cache.retain(|&(g, _), _| g != goal);
    info!("goal {goal:?} closed at node {node:?}");
    self.emit(&ProofEvent::GoalClosed(goal));
    Ok(node)
  }

  /// Prune the proof back to `node`: discard the subtree below it along
  /// with its open goals, and reopen `node` with a fresh goal id. Cached
  /// match results of the discarded goals die with their ids.
  pub fn prune_to(&mut self, node: NodeId) -> GoalId {
    let mut stack = self.nodes[node].children.clone();
    while let Some(n) = stack.pop() {
      if let Some(goal) = self.nodes[n].goal.take() {
        self.goals.remove(&goal);
        self.cache.retain(|&(g, _), _| g != goal);
      }
      stack.extend(self.nodes[n].children.drain(..));
    }
    self.nodes[node].children.clear();
    self.nodes[node].rule = None;
    if let Some(goal) = self.nodes[node].goal.take() {
      self.goals.remove(&goal);
      self.cache.retain(|&(g, _), _| g != goal);
    }
    let reopened = self.fresh_goal(node);
    self.nodes[node].goal = Some(reopened);
    info!("pruned to node {node:?}, reopened as {reopened:?}");
    self.emit(&ProofEvent::Pruned { node, reopened });
    reopened
  }
}
