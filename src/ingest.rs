//! Clause ingestion (C5): converts a [`Formula`] to CNF and installs each conjunct into an
//! [`Engine`] as a clause, allocating variables on demand.

use log::trace;

use crate::engine::Engine;
use crate::error::EngineError;
use crate::formula::Formula;
use crate::lit::Lit;

/// Converts `formula` to CNF and installs every resulting clause into `engine`
/// (`spec.md` §4.2).
///
/// Returns `Err(EngineError::InvariantViolated)` if, after CNF conversion, some part of the
/// formula is neither a constant, a literal, a disjunction of literals, nor a conjunction of
/// such clauses — this can only happen if [`Formula::to_cnf`] itself is broken, since its
/// contract guarantees exactly this shape.
///
/// An unsatisfiable formula (e.g. the constant `False`, or a clause that reduces to the empty
/// clause) is not an error here: it is installed as an unsatisfiable clause base, and discovered
/// by the next call to [`Engine::solve`] (`spec.md` §4.1's `add_clause` "returns conflict iff the
/// base becomes unsatisfiable at root").
pub fn add_formula(engine: &mut Engine, formula: &Formula) -> Result<(), EngineError> {
    install_cnf(engine, &formula.to_cnf())
}

fn install_cnf(engine: &mut Engine, cnf: &Formula) -> Result<(), EngineError> {
    match cnf {
        Formula::True => Ok(()),
        Formula::And(conjuncts) => {
            trace!("installing {} clauses", conjuncts.len());
            for conjunct in conjuncts {
                install_clause(engine, conjunct)?;
            }
            Ok(())
        }
        other => install_clause(engine, other),
    }
}

fn install_clause(engine: &mut Engine, clause: &Formula) -> Result<(), EngineError> {
    match clause {
        Formula::True => Ok(()),
        Formula::False => {
            engine.add_clause(&[]);
            Ok(())
        }
        Formula::Or(parts) => {
            let mut lits = Vec::with_capacity(parts.len());
            for part in parts {
                lits.push(literal_of(engine, part)?);
            }
            engine.add_clause(&lits);
            Ok(())
        }
        _ => {
            let lit = literal_of(engine, clause)?;
            engine.add_clause(&[lit]);
            Ok(())
        }
    }
}

fn literal_of(engine: &mut Engine, formula: &Formula) -> Result<Lit, EngineError> {
    match formula.as_literal() {
        Some((name, positive)) => Ok(engine.intern_var(name).lit(positive)),
        None => Err(EngineError::InvariantViolated(format!(
            "unexpected formula shape after CNF conversion: {:?}",
            formula
        ))),
    }
}
