//! Property-based cross-validation (`spec.md` §8): random small 3-SAT-ish instances checked
//! against a brute-force model enumerator, plus an invariant check for the backbone definition
//! itself (positive/negative/optional partition, literal of a backbone variable true in every
//! model).

use std::collections::BTreeSet;

use proptest::prelude::*;

use backbone_sat::{backbone, config::BackboneConfig, engine::Engine, formula::Formula};

const MAX_VARS: usize = 12;

fn var_name(index: usize) -> String {
    format!("v{}", index)
}

/// A raw clause is a list of `(variable index, positive polarity)` pairs.
type RawClause = Vec<(usize, bool)>;

/// Generates a random CNF over `0..max_vars` variables, as raw clauses, alongside the variable
/// count actually used. Mirrors `varisat::test::sat_formula`'s "random partial assignment, then
/// clauses" shape loosely, but stays within `to_cnf`'s literal/disjunction/conjunction vocabulary
/// by constructing a [`Formula`] directly instead of going through an indexed `CnfFormula`.
fn raw_cnf(max_vars: usize, max_clauses: usize, max_clause_len: usize) -> impl Strategy<Value = (usize, Vec<RawClause>)> {
    (2..=max_vars).prop_flat_map(move |vars| {
        let clause = (1..=max_clause_len.min(vars)).prop_flat_map(move |len| {
            proptest::collection::vec((0..vars, proptest::bool::ANY), len)
        });
        (Just(vars), proptest::collection::vec(clause, 0..=max_clauses))
    })
}

fn formula_of(vars: usize, clauses: &[RawClause]) -> Formula {
    let _ = vars;
    Formula::and(clauses.iter().map(|clause| {
        Formula::or(clause.iter().map(|&(index, positive)| {
            let lit = Formula::var(var_name(index));
            if positive {
                lit
            } else {
                Formula::not(lit)
            }
        }))
    }))
}

/// All satisfying assignments of `clauses` over `vars` variables, each as a bit in `0..2^vars`
/// (bit `i` set means variable `i` is true), found by brute-force enumeration.
fn satisfying_assignments(vars: usize, clauses: &[RawClause]) -> Vec<u32> {
    assert!(vars <= 20, "brute force only reasonable for small instance counts");
    let mut models = Vec::new();
    'assignment: for bits in 0u32..(1u32 << vars) {
        for clause in clauses {
            let clause_satisfied = clause
                .iter()
                .any(|&(index, positive)| ((bits >> index) & 1 == 1) == positive);
            if !clause_satisfied {
                continue 'assignment;
            }
        }
        models.push(bits);
    }
    models
}

/// The backbone as computed directly from the set of satisfying assignments: a variable is
/// positive/negative iff every model agrees on its value, optional otherwise. Returns `None` if
/// there are no satisfying assignments at all.
fn brute_force_backbone(
    vars: usize,
    clauses: &[RawClause],
) -> Option<(BTreeSet<usize>, BTreeSet<usize>)> {
    let models = satisfying_assignments(vars, clauses);
    if models.is_empty() {
        return None;
    }
    let mut positive = BTreeSet::new();
    let mut negative = BTreeSet::new();
    for index in 0..vars {
        let all_true = models.iter().all(|&bits| (bits >> index) & 1 == 1);
        let all_false = models.iter().all(|&bits| (bits >> index) & 1 == 0);
        if all_true {
            positive.insert(index);
        } else if all_false {
            negative.insert(index);
        }
    }
    Some((positive, negative))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Cross-validates the whole driver against brute-force truth on random small instances,
    /// with the default (all-heuristics-on) configuration.
    #[test]
    fn matches_brute_force_enumeration((vars, clauses) in raw_cnf(MAX_VARS, 40, 3)) {
        let expected = brute_force_backbone(vars, &clauses);

        let formula = formula_of(vars, &clauses);
        let mut engine = Engine::new();
        backbone_sat::ingest::add_formula(&mut engine, &formula).unwrap();
        let relevant: Vec<String> = (0..vars).map(var_name).collect();
        let relevant_refs: Vec<&str> = relevant.iter().map(String::as_str).collect();
        let actual = backbone::compute(&mut engine, &[], &relevant_refs, BackboneConfig::default())
            .unwrap();

        match (expected, actual) {
            (None, None) => {}
            (Some((expected_positive, expected_negative)), Some(backbone)) => {
                let actual_positive: BTreeSet<usize> = (0..vars)
                    .filter(|&index| backbone.positive.contains(var_name(index).as_str()))
                    .collect();
                prop_assert_eq!(&actual_positive, &expected_positive);

                let actual_negative: BTreeSet<usize> = (0..vars)
                    .filter(|&index| backbone.negative.contains(var_name(index).as_str()))
                    .collect();
                prop_assert_eq!(&actual_negative, &expected_negative);

                for index in 0..vars {
                    let name = var_name(index);
                    let is_optional = !expected_positive.contains(&index) && !expected_negative.contains(&index);
                    prop_assert_eq!(backbone.optional.contains(name.as_str()), is_optional);
                }
            }
            (expected, actual) => {
                prop_assert!(
                    false,
                    "satisfiability mismatch: brute force = {:?}, engine = {:?}",
                    expected.is_some(),
                    actual.is_some()
                );
            }
        }
    }

    /// Every heuristic-flag combination must agree with the brute-force truth too, not just the
    /// default configuration (`spec.md` §8's flag-combination invariance, extended to randomized
    /// instances rather than the fixed scenario table).
    #[test]
    fn matches_brute_force_under_every_config(
        (vars, clauses) in raw_cnf(8, 20, 3),
        mask in 0u8..32,
    ) {
        let expected = brute_force_backbone(vars, &clauses);
        let config = BackboneConfig {
            initial_ub_check_for_rotatable_literals: mask & 1 != 0,
            initial_lb_check_for_up_zero_literals: mask & 2 != 0,
            check_for_up_zero_literals: mask & 4 != 0,
            check_for_complement_model_literals: mask & 8 != 0,
            check_for_rotatable_literals: mask & 16 != 0,
        };

        let formula = formula_of(vars, &clauses);
        let mut engine = Engine::new();
        backbone_sat::ingest::add_formula(&mut engine, &formula).unwrap();
        let relevant: Vec<String> = (0..vars).map(var_name).collect();
        let relevant_refs: Vec<&str> = relevant.iter().map(String::as_str).collect();
        let actual = backbone::compute(&mut engine, &[], &relevant_refs, config).unwrap();

        match (expected, actual) {
            (None, None) => {}
            (Some((expected_positive, expected_negative)), Some(backbone)) => {
                for index in 0..vars {
                    let name = var_name(index);
                    if expected_positive.contains(&index) {
                        prop_assert!(backbone.positive.contains(name.as_str()));
                    } else if expected_negative.contains(&index) {
                        prop_assert!(backbone.negative.contains(name.as_str()));
                    } else {
                        prop_assert!(backbone.optional.contains(name.as_str()));
                    }
                }
            }
            (expected, actual) => {
                prop_assert!(
                    false,
                    "satisfiability mismatch under mask {:#07b}: brute force = {:?}, engine = {:?}",
                    mask,
                    expected.is_some(),
                    actual.is_some()
                );
            }
        }
    }

    /// The three output sets must always partition `relevant` with no overlap, regardless of the
    /// instance.
    #[test]
    fn output_partitions_relevant_variables((vars, clauses) in raw_cnf(MAX_VARS, 30, 3)) {
        let formula = formula_of(vars, &clauses);
        let mut engine = Engine::new();
        backbone_sat::ingest::add_formula(&mut engine, &formula).unwrap();
        let relevant: Vec<String> = (0..vars).map(var_name).collect();
        let relevant_refs: Vec<&str> = relevant.iter().map(String::as_str).collect();

        if let Some(backbone) = backbone::compute(&mut engine, &[], &relevant_refs, BackboneConfig::default()).unwrap() {
            prop_assert!(backbone.positive.is_disjoint(&backbone.negative));
            prop_assert!(backbone.positive.is_disjoint(&backbone.optional));
            prop_assert!(backbone.negative.is_disjoint(&backbone.optional));
            for name in &relevant {
                let in_one = backbone.positive.contains(name.as_str())
                    || backbone.negative.contains(name.as_str())
                    || backbone.optional.contains(name.as_str());
                prop_assert!(in_one);
            }
        }
    }
}
