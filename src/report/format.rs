//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the simulation/fitting code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::SimulationRun;
use crate::domain::{FitReport, SimulateConfig};
use crate::model::{ModelRegistry, ObservableRegistry};

/// Format the summary of a `simulate` run.
pub fn format_simulation_summary(run: &SimulationRun, config: &SimulateConfig) -> String {
    let mut out = String::new();

    out.push_str("=== jstat - Conductance Simulation ===\n");
    out.push_str(&format!("Deck: {}\n", config.deck.display()));
    out.push_str(&format!("Model: {}\n", run.model));
    out.push_str(&format!("Observables: {}\n", run.columns.join(", ")));
    out.push_str(&format!(
        "Trials: {} | seed={} | policy={:?}\n",
        config.trials, config.seed, config.policy
    ));
    out.push_str(&format!(
        "Rows: {} | skipped={} | redraws={}\n",
        run.output.rows.len(),
        run.output.skipped,
        run.output.redraws
    ));

    if !run.output.rows.is_empty() {
        out.push_str("\nColumn ranges:\n");
        for (j, name) in run.columns.iter().enumerate() {
            let (lo, hi, sum) = run.output.rows.iter().map(|row| row[j]).fold(
                (f64::INFINITY, f64::NEG_INFINITY, 0.0),
                |(lo, hi, sum), v| (lo.min(v), hi.max(v), sum + v),
            );
            let mean = sum / run.output.rows.len() as f64;
            out.push_str(&format!(
                "  {name:<24} min={lo:>12.4e} mean={mean:>12.4e} max={hi:>12.4e}\n"
            ));
        }
    }

    if let Some(hist) = &run.histogram {
        out.push_str(&format!(
            "\nHistogram: {} bins | binned={} | dropped={}\n",
            hist.counts().len(),
            hist.samples(),
            hist.dropped()
        ));
    }

    out
}

/// Format a fit report.
pub fn format_fit_summary(report: &FitReport) -> String {
    let mut out = String::new();

    out.push_str("=== jstat - Histogram Fit ===\n");
    out.push_str(&format!("Model: {}\n", report.model));
    out.push_str(&format!("Points: {}\n", report.points));
    out.push_str(&format!(
        "Guesses: {} tried | {} converged\n",
        report.guesses_tried, report.guesses_converged
    ));

    let params: Vec<String> = report
        .parameters
        .iter()
        .map(|p| format!("{}={:.4e}", p.name, p.value))
        .collect();
    out.push_str(&format!("Fit: {}\n", params.join(", ")));
    out.push_str(&format!(
        "SSE: {:.6e} | iterations={}{}\n",
        report.sse,
        report.iterations,
        if report.converged { "" } else { " | NOT CONVERGED" }
    ));

    out
}

/// List registered model and observable names.
pub fn format_model_listing(models: &ModelRegistry, observables: &ObservableRegistry) -> String {
    let mut out = String::new();
    out.push_str("Models:\n");
    for name in models.names() {
        let kind = match models.factory(name) {
            Ok(factory) if factory.is_composite() => "composite".to_string(),
            Ok(factory) if !factory.model_type().is_generic() => {
                format!("{} submodel", factory.model_type())
            }
            _ => "model".to_string(),
        };
        out.push_str(&format!("  {name:<28} {kind}\n"));
    }
    out.push_str("Observables:\n");
    for name in observables.names() {
        out.push_str(&format!("  {name}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NamedValue;

    #[test]
    fn fit_summary_flags_unconverged_fits() {
        let mut report = FitReport {
            model: "Symmetric Nonresonant".into(),
            parameters: vec![
                NamedValue {
                    name: "c".into(),
                    value: 60.0,
                },
                NamedValue {
                    name: "d".into(),
                    value: 12.0,
                },
            ],
            sse: 0.5,
            iterations: 500,
            converged: false,
            guesses_tried: 36,
            guesses_converged: 0,
            points: 40,
        };
        let text = format_fit_summary(&report);
        assert!(text.contains("c=6.0000e1, d=1.2000e1"));
        assert!(text.contains("NOT CONVERGED"));

        report.converged = true;
        assert!(!format_fit_summary(&report).contains("NOT CONVERGED"));
    }

    #[test]
    fn listing_names_every_model() {
        let (models, observables) = crate::transport::registries();
        let text = format_model_listing(&models, &observables);
        assert!(text.contains("transportjunction            composite"));
        assert!(text.contains("symmetriconesitechannel      Channel submodel"));
        assert!(text.contains("  zerobias\n"));
    }
}
