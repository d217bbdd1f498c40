//! End-to-end runs through the public API: deck -> model tree -> simulator
//! -> batch -> histogram, and histogram -> fit.

use approx::assert_relative_eq;

use junction_stats::app::pipeline::{run_fit_on, run_simulation};
use junction_stats::domain::{FitModelSpec, FitRunConfig, NoObservablePolicy, SimulateConfig};
use junction_stats::fit::SymmetricNonresonant;
use junction_stats::io::{Deck, read_histogram, write_histogram};
use junction_stats::sim::{BatchOptions, run_batch};
use junction_stats::transport::registries;

const RESONANT_CHANNEL: &str = "
    model symmetriconesitechannel
        distribution epsilon constant 0
        distribution gamma constant 1
        distribution a constant 0
    endmodel
";

fn two_channel_deck() -> String {
    format!(
        "# two identical resonant channels at zero bias
model transportjunction
    distribution ef constant 0
    distribution v constant 0
{RESONANT_CHANNEL}{RESONANT_CHANNEL}endmodel
observable static
observable zerobias
observable bias
"
    )
}

const SPREAD_DECK: &str = "
model SymmetricOneSite
    distribution ef constant 0
    distribution v constant 0
    distribution epsilon uniform -1 1
    distribution gamma constant 0.1
    distribution a constant 0
endmodel
observable StaticConductance
trials 500
seed 7
bin 20 log
";

fn config(deck: &Deck, histogram: Option<std::path::PathBuf>) -> SimulateConfig {
    SimulateConfig {
        deck: "inline.deck".into(),
        trials: deck.trials.unwrap_or(100),
        seed: deck.seed.unwrap_or(1),
        output: None,
        histogram_output: histogram,
        policy: NoObservablePolicy::Skip,
        max_redraws: 10,
        chunk_size: 64,
    }
}

#[test]
fn resonant_one_site_conducts_one_quantum() {
    let deck = Deck::parse(
        "model symmetriconesite
distribution ef constant 0
distribution v constant 0
distribution epsilon constant 0
distribution gamma constant 1
distribution a constant 0
endmodel
observable static",
    )
    .unwrap();
    let (models, observables) = registries();
    let sim = deck.simulator(&models, &observables).unwrap();

    let output = run_batch(&sim, &BatchOptions { trials: 10, ..BatchOptions::default() }).unwrap();
    assert_eq!(output.rows.len(), 10);
    for row in &output.rows {
        assert_relative_eq!(row[0], 1.0, epsilon = 1e-12);
    }
}

#[test]
fn junction_sums_its_channels() {
    let deck = Deck::parse(&two_channel_deck()).unwrap();
    let (models, observables) = registries();
    let sim = deck.simulator(&models, &observables).unwrap();
    assert_eq!(sim.model().num_parameters(), 2 + 3 + 3);
    assert_eq!(
        sim.observable_names(),
        vec!["StaticConductance", "ZeroBiasConductance", "AppliedBias"]
    );

    let output = run_batch(&sim, &BatchOptions { trials: 5, ..BatchOptions::default() }).unwrap();
    for row in &output.rows {
        assert_relative_eq!(row[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(row[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(row[2], 0.0);
    }
}

#[test]
fn channel_outside_a_junction_is_rejected_at_its_line() {
    let deck = Deck::parse(&format!("{RESONANT_CHANNEL}\nobservable static")).unwrap();
    let (models, observables) = registries();
    let err = deck.simulator(&models, &observables).unwrap_err();
    assert_eq!(err.line, 2);
    assert!(err.message.contains("full model"));
}

#[test]
fn batches_are_reproducible_for_a_seed() {
    let deck = Deck::parse(SPREAD_DECK).unwrap();
    let (models, observables) = registries();

    let first = run_simulation(&config(&deck, None), &deck, &deck.bins, &models, &observables).unwrap();
    let second = run_simulation(&config(&deck, None), &deck, &deck.bins, &models, &observables).unwrap();
    assert_eq!(first.output.rows, second.output.rows);
    assert_eq!(first.output.rows.len(), 500);
    assert!(first.histogram.is_none());

    for row in &first.output.rows {
        assert!(row[0] > 0.0099 && row[0] <= 1.0, "conductance {} out of range", row[0]);
    }
}

#[test]
fn simulated_histogram_is_written_and_read_back() {
    let deck = Deck::parse(SPREAD_DECK).unwrap();
    let (models, observables) = registries();
    let path = std::env::temp_dir().join(format!("jstat-hist-{}.dat", std::process::id()));

    let run = run_simulation(
        &config(&deck, Some(path.clone())),
        &deck,
        &deck.bins,
        &models,
        &observables,
    )
    .unwrap();
    let hist = run.histogram.expect("histogram requested");
    assert_eq!(hist.samples(), 500);
    assert_eq!(hist.dropped(), 0);
    assert_eq!(hist.counts().iter().sum::<usize>(), 500);

    write_histogram(&path, &hist).unwrap();
    let points = read_histogram(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(points.len(), 20);
    assert!(points.windows(2).all(|w| w[0].0 < w[1].0));
    assert!(points.iter().all(|(_, density)| *density >= 0.0));
}

#[test]
fn mismatched_bin_lines_fail_before_any_trial() {
    let deck = Deck::parse(
        "model symmetriconesite
distribution ef constant 0
distribution v constant 0
distribution epsilon constant 0
distribution gamma constant 1
distribution a constant 0
endmodel
observable static
bin 10 linear
bin 10 linear
trials 1000000",
    )
    .unwrap();
    let (models, observables) = registries();

    let config = config(&deck, Some("hist.dat".into()));
    let err = run_simulation(&config, &deck, &deck.bins, &models, &observables).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("expected 1, found 2"));
}

#[test]
fn fit_recovers_a_nonresonant_histogram() {
    let truth = [60.0, 12.0, 2.0];
    let data: Vec<(f64, f64)> = (0..40)
        .map(|i| 0.005 + i as f64 * 0.005)
        .map(|g| (g, SymmetricNonresonant::density(&truth, g)))
        .collect();
    let config = FitRunConfig {
        input: "inline.dat".into(),
        model: FitModelSpec::SymmetricNonresonant,
        max_iterations: 500,
        tolerance: 1e-10,
        export: None,
    };

    let run = run_fit_on(&config, &data).unwrap();
    assert!(run.report.converged);
    assert_eq!(run.report.points, 40);
    assert_eq!(run.report.parameters[0].name, "c");
    for (got, want) in run.report.parameters.iter().zip(truth) {
        assert_relative_eq!(got.value, want, max_relative = 1e-5);
    }
}

#[test]
fn columns_come_from_a_single_draw() {
    let deck = Deck::parse(
        "model symmetriconesite
distribution ef uniform -0.5 0.5
distribution v uniform 0.1 1.0
distribution epsilon normal 0 0.5
distribution gamma lognormal -2 0.5
distribution a uniform -0.2 0.2
endmodel
observable bias
observable static
observable current",
    )
    .unwrap();
    let (models, observables) = registries();
    let sim = deck.simulator(&models, &observables).unwrap();

    let output = run_batch(&sim, &BatchOptions { trials: 200, seed: 3, ..BatchOptions::default() })
        .unwrap();
    assert_eq!(output.rows.len(), 200);
    for row in &output.rows {
        assert_relative_eq!(row[2], row[1] * row[0], max_relative = 1e-10);
    }
}

#[test]
fn full_model_as_channel_is_rejected_for_every_seed() {
    let text = "model transportjunction
distribution ef constant 0
distribution v constant 0
model symmetriconesite
distribution ef constant 0
distribution v constant 0
distribution epsilon normal 0 1
distribution gamma constant 1
distribution a constant 0
endmodel
endmodel
observable static";
    let (models, observables) = registries();
    for seed in 0..5 {
        let mut deck = Deck::parse(text).unwrap();
        deck.seed = Some(seed);
        let err = deck.simulator(&models, &observables).unwrap_err();
        assert_eq!(err.line, 4);
        assert!(err.message.contains("Incompatible submodel"), "{}", err.message);
    }
}
