//! Derivation table types.

use nst_transform::Topic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

/// One source field contributing to a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    /// Stage-1 field name: a type code or a synthetic sum label.
    pub code: &'static str,
    pub sign: Sign,
}

pub const fn plus(code: &'static str) -> Term {
    Term {
        code,
        sign: Sign::Plus,
    }
}

pub const fn minus(code: &'static str) -> Term {
    Term {
        code,
        sign: Sign::Minus,
    }
}

/// One output variable and the fields it is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Derivation {
    pub variable: &'static str,
    pub terms: &'static [Term],
}

/// A named derivation table and the stage-1 topics it reads.
#[derive(Debug, Clone, Copy)]
pub struct DerivationTable {
    pub name: &'static str,
    pub source_topics: &'static [Topic],
    pub derivations: &'static [Derivation],
}

impl DerivationTable {
    /// Output variable names, in column order.
    pub fn variables(&self) -> Vec<&'static str> {
        self.derivations.iter().map(|d| d.variable).collect()
    }

    /// Whether any derivation reads `code`.
    pub fn recognizes(&self, code: &str) -> bool {
        self.derivations
            .iter()
            .any(|d| d.terms.iter().any(|term| term.code == code))
    }
}
