//! Display of terms and sequents relative to a symbol table.
//!
//! Ids are meaningless on their own, so displayable values implement
//! [`EnvDisplay`] and are rendered through a [`FormatEnv`].

use std::fmt::{self, Display};

use pretty::{Arena, DocAllocator};
use taclet_util::{FuncId, SortId, SvId, TermId, VarId};

use super::sequent::{Sequent, SequentFormula, Side};
use super::term::{Binder, ModKind, OpCode, Program, Quant};
use super::{Symbols, term::TermDag};

/// The environment needed to print kernel values: names from [`Symbols`],
/// structure from the [`TermDag`].
#[derive(Copy, Clone, Debug)]
pub struct FormatEnv<'a> {
  /// The symbol table supplying names.
  pub symbols: &'a Symbols,
  /// The term arena supplying structure.
  pub dag: &'a TermDag,
}

/// A value paired with its [`FormatEnv`], displayable with `{}`.
#[derive(Debug)]
pub struct Print<'a, D: ?Sized> {
  /// The format environment.
  pub fe: FormatEnv<'a>,
  /// The value to display.
  pub e: &'a D,
}

impl<'a> FormatEnv<'a> {
  /// Pair a value with this environment for display.
  pub fn to<D: ?Sized>(self, e: &'a D) -> Print<'a, D> { Print { fe: self, e } }
}

/// Display relative to a [`FormatEnv`].
pub trait EnvDisplay {
  /// Write the value using the names in `fe`.
  fn fmt(&self, fe: FormatEnv<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<D: EnvDisplay + ?Sized> fmt::Display for Print<'_, D> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.e.fmt(self.fe, f) }
}

impl EnvDisplay for SortId {
  fn fmt(&self, fe: FormatEnv<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fe.symbols.sorts[*self].name.fmt(f)
  }
}

impl EnvDisplay for FuncId {
  fn fmt(&self, fe: FormatEnv<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fe.symbols.funcs[*self].name.fmt(f)
  }
}

impl EnvDisplay for VarId {
  fn fmt(&self, fe: FormatEnv<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fe.symbols.vars[*self].name.fmt(f)
  }
}

impl EnvDisplay for SvId {
  fn fmt(&self, fe: FormatEnv<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fe.symbols.svs[*self].name.fmt(f)
  }
}

impl EnvDisplay for Program {
  fn fmt(&self, fe: FormatEnv<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      Program::Concrete(p) => fe.symbols.progs[p].name.fmt(f),
      Program::Schema(sv) => sv.fmt(fe, f),
    }
  }
}

impl EnvDisplay for Binder {
  fn fmt(&self, fe: FormatEnv<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      Binder::Var(v) => write!(f, "{}:{}", fe.to(&v), fe.to(&fe.symbols.vars[v].sort)),
      Binder::Schema(sv) => sv.fmt(fe, f),
    }
  }
}

impl EnvDisplay for TermId {
  fn fmt(&self, fe: FormatEnv<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let node = fe.dag.node(*self);
    let arg = |i: usize| fe.to(&node.args[i]);
    match node.op {
      OpCode::True => write!(f, "true")?,
      OpCode::False => write!(f, "false")?,
      OpCode::Not => write!(f, "!{}", arg(0))?,
      OpCode::And => write!(f, "({} & {})", arg(0), arg(1))?,
      OpCode::Or => write!(f, "({} | {})", arg(0), arg(1))?,
      OpCode::Imp => write!(f, "({} -> {})", arg(0), arg(1))?,
      OpCode::Equals => write!(f, "{} = {}", arg(0), arg(1))?,
      OpCode::Quant(q) => {
        let q = match q {
          Quant::Forall => "\\forall",
          Quant::Exists => "\\exists",
        };
        write!(f, "{q} ")?;
        for (i, b) in node.bound.iter().enumerate() {
          if i > 0 { write!(f, ", ")? }
          b.fmt(fe, f)?;
        }
        write!(f, "; {}", arg(0))?;
      }
      OpCode::Decl(func) => {
        func.fmt(fe, f)?;
        if !node.args.is_empty() {
          write!(f, "(")?;
          for i in 0..node.args.len() {
            if i > 0 { write!(f, ", ")? }
            write!(f, "{}", arg(i))?;
          }
          write!(f, ")")?;
        }
      }
      OpCode::Var(v) => v.fmt(fe, f)?,
      OpCode::SchemaVar(sv) => sv.fmt(fe, f)?,
      OpCode::ElemUpdate(func) => write!(f, "{} := {}", fe.to(&func), arg(0))?,
      OpCode::ParallelUpdate => write!(f, "({} || {})", arg(0), arg(1))?,
      OpCode::UpdateApplication => write!(f, "{{{}}} {}", arg(0), arg(1))?,
      OpCode::Modality(ModKind::Box, p) => write!(f, "[{}] {}", fe.to(&p), arg(0))?,
      OpCode::Modality(ModKind::Diamond, p) => write!(f, "<{}> {}", fe.to(&p), arg(0))?,
      OpCode::Cast(s) => write!(f, "({}) {}", fe.to(&s), arg(0))?,
    }
    if !node.labels.is_empty() {
      write!(f, "<<")?;
      for (i, &l) in node.labels.iter().enumerate() {
        if i > 0 { write!(f, ", ")? }
        fe.symbols.labels[l].fmt(f)?;
      }
      write!(f, ">>")?;
    }
    Ok(())
  }
}

impl EnvDisplay for SequentFormula {
  fn fmt(&self, fe: FormatEnv<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(fe, f)
  }
}

impl EnvDisplay for Sequent {
  fn fmt(&self, fe: FormatEnv<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, sf) in self.antecedent.iter().enumerate() {
      if i > 0 { write!(f, ", ")? }
      sf.fmt(fe, f)?;
    }
    write!(f, " ==> ")?;
    for (i, sf) in self.succedent.iter().enumerate() {
      if i > 0 { write!(f, ", ")? }
      sf.fmt(fe, f)?;
    }
    Ok(())
  }
}

impl EnvDisplay for Side {
  fn fmt(&self, _: FormatEnv<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Side::Antec => write!(f, "antecedent"),
      Side::Succ => write!(f, "succedent"),
    }
  }
}

/// Render a sequent with line breaking at the given width, one formula
/// per broken line.
#[must_use]
pub fn pretty_sequent(fe: FormatEnv<'_>, seq: &Sequent, width: usize) -> String {
  let alloc = Arena::<'_, ()>::new();
  let semi = |formulas: &[SequentFormula]| {
    let docs = formulas.iter().map(|sf| alloc.text(format!("{}", fe.to(sf))));
    alloc.intersperse(docs, alloc.text(",").append(alloc.line()))
  };
  let doc = semi(&seq.antecedent)
    .append(alloc.line())
    .append(alloc.text("==>"))
    .append(alloc.line())
    .append(semi(&seq.succedent))
    .group();
  let mut out = String::new();
  // rendering to a String cannot fail
  let _ = doc.render_fmt(width, &mut out);
  out
}
