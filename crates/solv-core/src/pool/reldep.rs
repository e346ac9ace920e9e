//! Dependency expressions ("reldeps" in libsolv terms).
//!
//! A [`Dep`] is either a plain name, a versioned/arch relation, or one of the
//! structural combinators (AND/OR/WITH/COND/UNLESS/ELSE/NAMESPACE). Combinators
//! are kept as a tree and normalised to CNF/DNF on demand by the rule builder
//! rather than eagerly.

use std::fmt;

use super::{NameId, StringId};

/// Relational operator between a name and an EVR (epoch:version-release) string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Ne,
    /// No version constraint at all - matches any EVR.
    Any,
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelOp::Lt => "<",
            RelOp::Le => "<=",
            RelOp::Eq => "=",
            RelOp::Ge => ">=",
            RelOp::Gt => ">",
            RelOp::Ne => "!=",
            RelOp::Any => "",
        };
        f.write_str(s)
    }
}

/// A dependency expression as it appears in a solvable's provides/requires/
/// conflicts/obsoletes/recommends/suggests/supplements/enhances list.
#[derive(Debug, Clone, PartialEq)]
pub enum Dep {
    /// Plain name reference, e.g. `libfoo`.
    Name(NameId),
    /// Versioned relation, e.g. `libfoo >= 2.0-1`.
    Rel(NameId, RelOp, String),
    /// Architecture-qualified name, e.g. `libfoo.x86_64`.
    Arch(NameId, StringId),
    /// Structural combinators.
    And(Box<Dep>, Box<Dep>),
    Or(Box<Dep>, Box<Dep>),
    With(Box<Dep>, Box<Dep>),
    Cond(Box<Dep>, Box<Dep>),
    Unless(Box<Dep>, Box<Dep>),
    Else(Box<Dep>, Box<Dep>),
    /// `namespace(argument)` - resolved through the pool's namespace callback.
    Namespace(NameId, Option<String>),
}

impl Dep {
    pub fn name(&self) -> Option<NameId> {
        match self {
            Dep::Name(n) | Dep::Rel(n, ..) | Dep::Arch(n, _) | Dep::Namespace(n, _) => Some(*n),
            _ => None,
        }
    }

    pub fn is_simple(&self) -> bool {
        matches!(self, Dep::Name(_) | Dep::Rel(..) | Dep::Arch(..) | Dep::Namespace(..))
    }

    /// Flatten a top-level AND into its conjuncts. Non-AND deps are single-element.
    pub fn flatten_and(&self) -> Vec<&Dep> {
        let mut out = Vec::new();
        fn walk<'a>(d: &'a Dep, out: &mut Vec<&'a Dep>) {
            match d {
                Dep::And(a, b) => {
                    walk(a, out);
                    walk(b, out);
                }
                other => out.push(other),
            }
        }
        walk(self, &mut out);
        out
    }

    /// Flatten a top-level OR into its disjuncts. Non-OR deps are single-element.
    pub fn flatten_or(&self) -> Vec<&Dep> {
        let mut out = Vec::new();
        fn walk<'a>(d: &'a Dep, out: &mut Vec<&'a Dep>) {
            match d {
                Dep::Or(a, b) => {
                    walk(a, out);
                    walk(b, out);
                }
                other => out.push(other),
            }
        }
        walk(self, &mut out);
        out
    }
}
