//! Write simulated rows, histograms and fit reports.
//!
//! Rows and histograms are whitespace-separated text, one record per line,
//! so they load directly into gnuplot or numpy. Fit reports are JSON.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::domain::FitReport;
use crate::error::AppError;
use crate::histogram::BinnedHistogram;

fn create(path: &Path, what: &str) -> Result<BufWriter<File>, AppError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| AppError::new(2, format!("Failed to create {what} '{}': {e}", path.display())))
}

fn write_err(what: &'static str) -> impl Fn(std::io::Error) -> AppError {
    move |e| AppError::new(2, format!("Failed to write {what}: {e}"))
}

/// Write one line per simulated row, columns in observable order.
pub fn write_rows(path: &Path, header: &[&str], rows: &[Vec<f64>]) -> Result<(), AppError> {
    let mut out = create(path, "output file")?;
    writeln!(out, "# {}", header.join(" ")).map_err(write_err("output header"))?;
    for row in rows {
        let line: Vec<String> = row.iter().map(|v| format!("{v:.6e}")).collect();
        writeln!(out, "{}", line.join(" ")).map_err(write_err("output row"))?;
    }
    out.flush().map_err(write_err("output file"))
}

/// Write `center... density` per bin. 2D histograms get a blank line
/// between rows of the first axis (gnuplot's `splot` layout).
pub fn write_histogram(path: &Path, hist: &BinnedHistogram) -> Result<(), AppError> {
    let mut out = create(path, "histogram file")?;
    let stride = if hist.ndim() > 1 {
        hist.centers(hist.ndim() - 1).len()
    } else {
        0
    };
    for (i, (coords, density)) in hist.rows().into_iter().enumerate() {
        if stride > 0 && i > 0 && i % stride == 0 {
            writeln!(out).map_err(write_err("histogram row"))?;
        }
        let mut fields: Vec<String> = coords.iter().map(|v| format!("{v:.6e}")).collect();
        fields.push(format!("{density:.6e}"));
        writeln!(out, "{}", fields.join(" ")).map_err(write_err("histogram row"))?;
    }
    out.flush().map_err(write_err("histogram file"))
}

/// Read a 1D histogram (`x density` per line; `#` comments and blank lines
/// are skipped).
pub fn read_histogram(path: &Path) -> Result<Vec<(f64, f64)>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open histogram '{}': {e}", path.display())))?;

    let mut points = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| AppError::new(2, format!("Failed to read histogram: {e}")))?;
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        let fields: Vec<&str> = content.split_whitespace().collect();
        let [x, y] = fields[..] else {
            return Err(AppError::new(
                2,
                format!("Histogram line {}: expected two columns, found {}.", idx + 1, fields.len()),
            ));
        };
        let parse = |s: &str| {
            s.parse::<f64>().map_err(|_| {
                AppError::new(2, format!("Histogram line {}: unable to parse \"{s}\".", idx + 1))
            })
        };
        points.push((parse(x)?, parse(y)?));
    }
    Ok(points)
}

pub fn write_fit_json(path: &Path, report: &FitReport) -> Result<(), AppError> {
    let mut out = create(path, "fit JSON")?;
    serde_json::to_writer_pretty(&mut out, report)
        .map_err(|e| AppError::new(2, format!("Failed to write fit JSON: {e}")))?;
    writeln!(out).map_err(write_err("fit JSON"))?;
    out.flush().map_err(write_err("fit JSON"))
}

pub fn read_fit_json(path: &Path) -> Result<FitReport, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open fit JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid fit JSON: {e}")))
}
