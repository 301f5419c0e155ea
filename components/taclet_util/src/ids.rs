//! Primitive index types that consuming crates will probably want.

use std::fmt;
use std::ops::{Deref, DerefMut, Index, IndexMut};

macro_rules! id_wrapper {
  ($id:ident: $ty:ty, $vec:ident) => {
    id_wrapper!($id: $ty, $vec,
      concat!("An index into a [`", stringify!($vec), "`]"));
  };
  ($id:ident: $ty:ty, $vec:ident, $svec:expr) => {
    #[doc=$svec]
    #[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Default)]
    pub struct $id(pub $ty);

    impl $id {
      /// Convert this newtyped integer into its underlying integer.
      #[must_use]
      pub fn into_inner(self) -> $ty { self.0 }
    }

    impl fmt::Debug for $id {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
    }

    /// A vector wrapper with a strongly typed index interface.
    #[derive(Clone, Debug)]
    pub struct $vec<T>(pub Vec<T>);

    #[allow(dead_code)]
    impl<T> $vec<T> {
      /// Get a reference to the element at the given index.
      #[must_use]
      pub fn get(&self, i: $id) -> Option<&T> { self.0.get(i.0 as usize) }

      /// Get a mutable reference to the element at the given index.
      #[must_use]
      pub fn get_mut(&mut self, i: $id) -> Option<&mut T> { self.0.get_mut(i.0 as usize) }

      /// Append an element, returning its index.
      pub fn push(&mut self, t: T) -> $id {
        let id = $id(self.0.len() as $ty);
        self.0.push(t);
        id
      }

      /// Returns the equivalent of `iter().enumerate()` but with the right indexing type.
      pub fn enum_iter(&self) -> impl Iterator<Item=($id, &T)> {
        self.0.iter().enumerate().map(|(i, t)| ($id(i as $ty), t))
      }
    }

    impl<T> Default for $vec<T> {
      fn default() -> $vec<T> { $vec(Vec::new()) }
    }

    impl<T> Index<$id> for $vec<T> {
      type Output = T;
      fn index(&self, i: $id) -> &T { &self.0[i.0 as usize] }
    }

    impl<T> IndexMut<$id> for $vec<T> {
      fn index_mut(&mut self, i: $id) -> &mut T { &mut self.0[i.0 as usize] }
    }

    impl<T> Deref for $vec<T> {
      type Target = Vec<T>;
      fn deref(&self) -> &Vec<T> { &self.0 }
    }

    impl<T> DerefMut for $vec<T> {
      fn deref_mut(&mut self) -> &mut Vec<T> { &mut self.0 }
    }
  };
}

id_wrapper!(SortId: u32, SortVec);
id_wrapper!(FuncId: u32, FuncVec);
id_wrapper!(VarId: u32, VarVec);
id_wrapper!(SvId: u32, SvVec);
id_wrapper!(ProgId: u32, ProgVec);
id_wrapper!(LabelId: u32, LabelVec);
id_wrapper!(TermId: u32, TermVec);
id_wrapper!(TacletId: u32, TacletVec);
id_wrapper!(RuleSetId: u32, RuleSetVec);
id_wrapper!(NodeId: u32, NodeVec);
id_wrapper!(GoalId: u32, GoalVec);

bitflags::bitflags! {
  /// Modifier flags for sorts, function symbols and taclets.
  #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
  pub struct Modifiers: u8 {
    /// The `abstract` sort modifier: no cast may target this sort.
    const ABSTRACT = 1;

    /// The `rigid` function modifier, marking a symbol whose interpretation
    /// does not depend on the program state.
    const RIGID = 2;

    /// The `assignable` function modifier, marking a nullary symbol that may
    /// appear as the left-hand side of an elementary update.
    const ASSIGNABLE = 4;

    /// The `interactiveOnly` taclet modifier: the automated search loop
    /// never selects this taclet.
    const INTERACTIVE_ONLY = 8;
  }
}

impl Modifiers {
  /// The null modifier set. Modifiers are represented as bitfields, so this is the same as `0`.
  pub const NONE: Modifiers = Self::empty();

  /// The set of modifiers valid on a sort declaration.
  #[must_use]
  pub fn sort_data() -> Modifiers { Modifiers::ABSTRACT }

  /// The set of modifiers valid on a function symbol declaration.
  #[must_use]
  pub fn func_data() -> Modifiers { Modifiers::RIGID | Modifiers::ASSIGNABLE }

  /// The set of modifiers valid on a taclet.
  #[must_use]
  pub fn taclet_data() -> Modifiers { Modifiers::INTERACTIVE_ONLY }

  /// Parses a string into a singleton [`Modifiers`], or [`NONE`](Self::NONE)
  /// if the string is not valid.
  #[must_use]
  pub fn parse_name(s: &str) -> Modifiers {
    match s {
      "abstract" => Modifiers::ABSTRACT,
      "rigid" => Modifiers::RIGID,
      "assignable" => Modifiers::ASSIGNABLE,
      "interactiveOnly" => Modifiers::INTERACTIVE_ONLY,
      _ => Modifiers::NONE,
    }
  }
}

impl fmt::Display for Modifiers {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.contains(Modifiers::ABSTRACT) { write!(f, "abstract ")? }
    if self.contains(Modifiers::RIGID) { write!(f, "rigid ")? }
    if self.contains(Modifiers::ASSIGNABLE) { write!(f, "assignable ")? }
    if self.contains(Modifiers::INTERACTIVE_ONLY) { write!(f, "interactiveOnly ")? }
    Ok(())
  }
}
