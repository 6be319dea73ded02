//! The formula factory (C10): a minimal named-variable propositional formula AST with an
//! idempotent CNF conversion.
//!
//! `spec.md` treats formula construction and CNF conversion as an external collaborator ("opaque
//! formula factory"); this crate has no separate upstream formula crate to depend on, so it owns
//! a small one. Structurally this follows `varisat-formula::cnf::CnfFormula` in spirit — literals
//! keyed by name rather than by a pre-interned index, since that interning only happens once the
//! formula reaches an [`Engine`](crate::engine::Engine) (C5).

/// A propositional formula over named variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Formula {
    True,
    False,
    Var(Box<str>),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
}

impl Formula {
    pub fn var(name: impl Into<Box<str>>) -> Formula {
        Formula::Var(name.into())
    }

    pub fn not(f: Formula) -> Formula {
        match f {
            Formula::True => Formula::False,
            Formula::False => Formula::True,
            Formula::Not(inner) => *inner,
            other => Formula::Not(Box::new(other)),
        }
    }

    /// Conjunction, with the usual constant-folding: `True` operands are dropped, a `False`
    /// operand collapses the whole conjunction to `False`, nested `And`s are flattened, and an
    /// empty or single-element result is unwrapped.
    pub fn and(operands: impl IntoIterator<Item = Formula>) -> Formula {
        let mut flat = Vec::new();
        for f in operands {
            match f {
                Formula::True => {}
                Formula::False => return Formula::False,
                Formula::And(parts) => flat.extend(parts),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Formula::True,
            1 => flat.pop().unwrap(),
            _ => Formula::And(flat),
        }
    }

    /// Disjunction, with the dual constant-folding of [`Formula::and`].
    pub fn or(operands: impl IntoIterator<Item = Formula>) -> Formula {
        let mut flat = Vec::new();
        for f in operands {
            match f {
                Formula::False => {}
                Formula::True => return Formula::True,
                Formula::Or(parts) => flat.extend(parts),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Formula::False,
            1 => flat.pop().unwrap(),
            _ => Formula::Or(flat),
        }
    }

    /// If this formula is a literal (a variable or its negation), its name and polarity (`true`
    /// for a positive occurrence).
    pub fn as_literal(&self) -> Option<(&str, bool)> {
        match self {
            Formula::Var(name) => Some((name, true)),
            Formula::Not(inner) => match inner.as_ref() {
                Formula::Var(name) => Some((name, false)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Converts this formula to an equisatisfiable formula in conjunctive normal form: `True`,
    /// `False`, a literal, a disjunction of literals, or a conjunction of such clauses
    /// (`spec.md` §4.2's "formula of types: constant true, constant false, single literal,
    /// disjunction, conjunction"). Idempotent: converting an already-CNF formula returns an
    /// equal formula.
    pub fn to_cnf(&self) -> Formula {
        Formula::and(self.nnf().distribute())
    }

    /// Negation normal form: negations pushed down to the literals.
    fn nnf(&self) -> Formula {
        match self {
            Formula::True | Formula::False | Formula::Var(_) => self.clone(),
            Formula::Not(inner) => inner.nnf_negated(),
            Formula::And(parts) => Formula::and(parts.iter().map(Formula::nnf)),
            Formula::Or(parts) => Formula::or(parts.iter().map(Formula::nnf)),
        }
    }

    /// Negation normal form of `Formula::not(self.clone())`, computed without ever constructing
    /// the intermediate `Not` node.
    fn nnf_negated(&self) -> Formula {
        match self {
            Formula::True => Formula::False,
            Formula::False => Formula::True,
            Formula::Var(_) => Formula::Not(Box::new(self.clone())),
            Formula::Not(inner) => inner.nnf(),
            Formula::And(parts) => Formula::or(parts.iter().map(Formula::nnf_negated)),
            Formula::Or(parts) => Formula::and(parts.iter().map(Formula::nnf_negated)),
        }
    }

    /// Distributes `Or` over `And`, given that `self` is already in negation normal form. Returns
    /// the list of CNF clauses (each a disjunction of literals, or `True`/`False`) whose
    /// conjunction is equivalent to `self`.
    fn distribute(&self) -> Vec<Formula> {
        match self {
            Formula::And(parts) => parts.iter().flat_map(Formula::distribute).collect(),
            Formula::Or(parts) => parts
                .iter()
                .map(Formula::distribute)
                .fold(vec![Formula::False], |acc, clauses_for_part| {
                    let mut combined = Vec::with_capacity(acc.len() * clauses_for_part.len().max(1));
                    for a in &acc {
                        for b in &clauses_for_part {
                            combined.push(merge_clause(a, b));
                        }
                    }
                    combined
                }),
            other => vec![other.clone()],
        }
    }
}

/// Merges two CNF clauses (disjunctions of literals, or `True`/`False`) into their disjunction.
fn merge_clause(a: &Formula, b: &Formula) -> Formula {
    Formula::or(disjuncts(a).into_iter().chain(disjuncts(b)))
}

fn disjuncts(f: &Formula) -> Vec<Formula> {
    match f {
        Formula::Or(parts) => parts.clone(),
        other => vec![other.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conjuncts(f: &Formula) -> Vec<Formula> {
        match f {
            Formula::And(parts) => parts.clone(),
            other => vec![other.clone()],
        }
    }

    #[test]
    fn constants_fold() {
        assert_eq!(Formula::and(vec![Formula::True, Formula::True]), Formula::True);
        assert_eq!(
            Formula::and(vec![Formula::var("A"), Formula::False]),
            Formula::False
        );
        assert_eq!(Formula::or(vec![Formula::False, Formula::False]), Formula::False);
        assert_eq!(
            Formula::or(vec![Formula::var("A"), Formula::True]),
            Formula::True
        );
    }

    #[test]
    fn double_negation_cancels() {
        let a = Formula::var("A");
        assert_eq!(Formula::not(Formula::not(a.clone())), a);
    }

    #[test]
    fn de_morgan_over_and() {
        let f = Formula::not(Formula::and(vec![Formula::var("A"), Formula::var("B")]));
        let cnf = f.to_cnf();
        // ¬(A∧B) ≡ ¬A∨¬B: a single clause with both negative literals.
        match cnf {
            Formula::Or(parts) => {
                assert_eq!(parts.len(), 2);
                assert!(parts.contains(&Formula::not(Formula::var("A"))));
                assert!(parts.contains(&Formula::not(Formula::var("B"))));
            }
            other => panic!("expected a disjunction, got {:?}", other),
        }
    }

    #[test]
    fn distributes_or_over_and() {
        // A ∨ (B ∧ C) ≡ (A∨B) ∧ (A∨C)
        let f = Formula::or(vec![
            Formula::var("A"),
            Formula::and(vec![Formula::var("B"), Formula::var("C")]),
        ]);
        let clauses = conjuncts(&f.to_cnf());
        assert_eq!(clauses.len(), 2);
        for clause in &clauses {
            let lits: Vec<_> = disjuncts(clause);
            assert_eq!(lits.len(), 2);
            assert!(lits.contains(&Formula::var("A")));
        }
    }

    #[test]
    fn to_cnf_is_idempotent() {
        let f = Formula::not(Formula::or(vec![
            Formula::var("A"),
            Formula::and(vec![Formula::var("B"), Formula::not(Formula::var("C"))]),
        ]));
        let once = f.to_cnf();
        let twice = once.to_cnf();
        assert_eq!(once, twice);
    }

    #[test]
    fn implication_via_or_not() {
        // A → B encoded as ¬A ∨ B.
        let f = Formula::or(vec![Formula::not(Formula::var("A")), Formula::var("B")]);
        assert_eq!(f.clone().to_cnf(), f);
    }
}
