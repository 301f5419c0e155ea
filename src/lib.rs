//! A taclet-based sequent calculus engine: terms, schematic rewrite rules,
//! and a proof tree with an automated saturation prover.
//!
//! The pieces fit together like this: a [`Symbols`] table declares sorts,
//! function symbols, variables and schema variables; a [`TermDag`] interns
//! the terms built over them; a [`TacletLib`] holds the schematic rules; a
//! [`Proof`] tracks the tree of sequents produced by applying rules at its
//! open goals; and [`Prover`] drives rule application automatically.

// rust lints we want
#![warn(bare_trait_objects, elided_lifetimes_in_paths,
  missing_copy_implementations, missing_debug_implementations, future_incompatible,
  rust_2018_idioms, trivial_numeric_casts, variant_size_differences, unreachable_pub,
  unused, missing_docs)]
// all the clippy
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
// all the clippy::restriction lints we want
#![warn(clippy::float_arithmetic,
  clippy::get_unwrap, clippy::inline_asm_x86_att_syntax, clippy::integer_division,
  clippy::rc_buffer, clippy::rest_pat_in_fully_bound_structs,
  clippy::string_add, clippy::unwrap_used)]
// all the clippy lints we don't want
#![allow(clippy::cognitive_complexity, clippy::comparison_chain,
  clippy::default_trait_access, clippy::enum_glob_use, clippy::inline_always,
  clippy::manual_map, clippy::map_err_ignore, clippy::missing_const_for_fn,
  clippy::missing_errors_doc, clippy::missing_panics_doc, clippy::module_name_repetitions,
  clippy::multiple_crate_versions, clippy::option_if_let_else, clippy::redundant_pub_crate,
  clippy::semicolon_if_nothing_returned, clippy::shadow_unrelated, clippy::too_many_lines,
  clippy::use_self)]

pub mod logic;
pub mod proof;
pub mod prover;
pub mod rule;

pub use logic::print::{EnvDisplay, FormatEnv, Print, pretty_sequent};
pub use logic::sequent::{PosInOccurrence, Sequent, SequentFormula, Side};
pub use logic::term::{Binder, ModKind, OpCode, Program, Quant, TermDag, TermError};
pub use logic::{ANY, FORMULA, Symbols, SvKind, UPDATE};
pub use proof::{Proof, ProofError, ProofEvent, Services, TacletApp};
pub use prover::{Outcome, ProveResult, Prover, ProverConfig};
pub use rule::apply::{Applier, ApplyError};
pub use rule::inst::{InstValue, Instantiations};
pub use rule::matcher::{Incompleteness, MatchResult, Matcher};
pub use rule::{
  GoalTemplate, RuleSet, StateRestriction, Taclet, TacletDefError, TacletKind, TacletLib,
  VariableCondition,
};
pub use taclet_util::{
  BoxError, FuncId, GoalId, LabelId, Modifiers, NodeId, ProgId, RuleSetId, SortId, SvId,
  TacletId, TermId, VarId,
};
