// tests/search_tests.rs

use qsim::search::{compare_strategies, exhaustive_search, hill_climb, PossibilitySpace, SearchConfig, SearchEngine};
use qsim::QsimError;

const GLOBAL_PEAK: &str = "x45";

// Four triangular peaks over 60 options; the one at 45 is highest.
fn rugged_landscape() -> PossibilitySpace {
    let peaks = [(8, 5.0), (22, 7.0), (45, 10.0), (55, 8.0)];
    let entries = (0..60i32).map(|i| {
        let value = peaks
            .iter()
            .map(|&(c, h): &(i32, f64)| (h - (i - c).abs() as f64 * 0.8).max(0.0))
            .fold(0.0, f64::max);
        (format!("x{:02}", i), value)
    });
    PossibilitySpace::new(entries).unwrap()
}

#[test]
fn test_explore_reference_case() -> Result<(), QsimError> {
    let engine = SearchEngine::seeded(0);
    let space = PossibilitySpace::new([("A", 0.1), ("B", 0.7), ("C", 0.2)])?;
    let outcome = engine.explore(&space)?;
    assert_eq!(outcome.best_label, "B");
    assert!((outcome.confidence - 0.7).abs() < 1e-9);
    assert_eq!(outcome.all_normalized.len(), 3);
    Ok(())
}

#[test]
fn test_greedy_gets_stuck() -> Result<(), QsimError> {
    let space = rugged_landscape();
    assert_eq!(exhaustive_search(&space).label, GLOBAL_PEAK);
    let greedy = hill_climb(&space, 5)?;
    assert_eq!(greedy.label, "x08");
    assert_eq!(greedy.value, 5.0);
    Ok(())
}

#[test]
fn test_tunnel_search_quality_over_seeds() -> Result<(), QsimError> {
    let space = rugged_landscape();
    let optimum = exhaustive_search(&space).value;
    let mut hits = 0;
    for seed in 0..100 {
        let mut engine = SearchEngine::seeded(seed);
        let outcome = engine.tunnel_search(&space, 2000)?;
        let greedy = hill_climb(&space, (seed as usize * 7) % space.len())?;

        assert!(
            outcome.best_value >= greedy.value,
            "seed {}: tunnel {} below greedy {}",
            seed, outcome.best_value, greedy.value
        );
        if outcome.best_value == optimum {
            assert_eq!(outcome.best_label, GLOBAL_PEAK);
            hits += 1;
        }
    }
    assert!(hits >= 95, "global optimum found in only {}/100 runs", hits);
    Ok(())
}

#[test]
fn test_seeded_search_is_reproducible() -> Result<(), QsimError> {
    let space = rugged_landscape();
    let config = SearchConfig { neighborhood_radius: 3, tunneling_rate: 0.1, ..SearchConfig::seeded(42) };
    let a = SearchEngine::new(config.clone())?.tunnel_search(&space, 400)?;
    let b = SearchEngine::new(config)?.tunnel_search(&space, 400)?;
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn test_search_argument_errors() -> Result<(), QsimError> {
    let mut engine = SearchEngine::seeded(1);
    let space = rugged_landscape();
    assert!(matches!(engine.tunnel_search(&space, 0), Err(QsimError::InvalidArgument { .. })));
    assert!(matches!(PossibilitySpace::new(Vec::<(String, f64)>::new()), Err(QsimError::InvalidArgument { .. })));
    assert!(matches!(
        PossibilitySpace::new([("a", 1.0), ("a", 2.0)]),
        Err(QsimError::InvalidArgument { .. })
    ));
    Ok(())
}

#[test]
fn test_objective_search() -> Result<(), QsimError> {
    // maximise -(x - 37)^2 over 0..100 without materialising weights
    let labels: Vec<String> = (0..100).map(|i| i.to_string()).collect();
    let mut engine = SearchEngine::seeded(8);
    let outcome = engine.tunnel_search_with(&labels, |i, _| -((i as f64 - 37.0).powi(2)), 300)?;
    assert_eq!(outcome.best_label, "37");
    assert_eq!(outcome.best_value, 0.0);
    Ok(())
}

#[test]
fn test_strategy_comparison_harness() -> Result<(), QsimError> {
    let space = rugged_landscape();
    let mut engine = SearchEngine::seeded(17);
    let cmp = compare_strategies(&mut engine, &space, 2000, 20)?;
    assert_eq!(cmp.optimum, 10.0);
    assert_eq!(cmp.exhaustive.hit_rate, 1.0);
    assert_eq!(cmp.exhaustive.mean_evaluations, 60.0);
    assert!(cmp.tunnel.hit_rate >= cmp.hill_climb.hit_rate);
    assert!(cmp.tunnel.mean_value >= cmp.hill_climb.mean_value);
    Ok(())
}
