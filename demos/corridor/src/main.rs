//! corridor — reference scenario for the bussim corridor simulator.
//!
//! Runs 20 buses along a 20-stop, 40 km corridor for 6000 s, writes the
//! per-tick output tables, then compares a slowly and a quickly degrading
//! corridor (1 % vs 10 % dynamic change) and optionally aggregates
//! replications of the GPS matrix.
//!
//! ```text
//! corridor                 # built-in scenario
//! corridor scenario.json   # override any field, see `Scenario`
//! RUST_LOG=debug corridor  # per-bus dispatch / dwell / finish events
//! ```
//!
//! Tables are written as CSV unless the binary is built with `--features
//! sqlite` or `--features parquet`.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;

use bs_agent::BusStatus;
use bs_core::{InitialConditions, ModelParams, SimConfig, SimRng};
use bs_output::{ModelOutputObserver, OutputWriter};
use bs_sim::{Model, ModelBuilder, ModelObserver, NoopObserver, Snapshot, TickSummary, replicate};

// ── Scenario ──────────────────────────────────────────────────────────────────

/// Everything the binary needs, loadable from JSON.  Missing fields fall
/// back to the reference scenario.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct Scenario {
    params:         ModelParams,
    sim:            SimConfig,
    /// Free-flow traffic speed at t = 0 (m/s).
    traffic_speed:  f64,
    output_dir:     PathBuf,
    /// Dynamic-change percentages to compare after the main run.
    compare_rates:  Vec<f64>,
    /// GPS-matrix replications; 0 skips them.
    replications:   usize,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            params:        ModelParams::default(),
            sim:           SimConfig { seed: 42, output_interval_ticks: 6 },
            traffic_speed: 14.0,
            output_dir:    PathBuf::from("output/corridor"),
            compare_rates: vec![1.0, 10.0],
            replications:  20,
        }
    }
}

fn load_scenario() -> Result<Scenario> {
    match std::env::args().nth(1) {
        None => Ok(Scenario::default()),
        Some(path) => {
            let file = File::open(&path).with_context(|| format!("opening {path}"))?;
            serde_json::from_reader(file).with_context(|| format!("parsing {path}"))
        }
    }
}

// ── Observer wrapper to count rows ───────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:         ModelOutputObserver<W>,
    snapshot_rows: usize,
    summary_rows:  usize,
    boardings:     u64,
    alightings:    u64,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: ModelOutputObserver<W>) -> Self {
        Self { inner, snapshot_rows: 0, summary_rows: 0, boardings: 0, alightings: 0 }
    }
}

impl<W: OutputWriter> ModelObserver for CountingObserver<W> {
    fn on_tick_end(&mut self, summary: &TickSummary) {
        self.summary_rows += 1;
        self.boardings += summary.boardings;
        self.alightings += summary.alightings;
        self.inner.on_tick_end(summary);
    }

    fn on_snapshot(&mut self, snapshot: &Snapshot<'_>) {
        self.snapshot_rows += snapshot.buses.len();
        self.inner.on_snapshot(snapshot);
    }

    fn on_sim_end(&mut self, final_state: &Snapshot<'_>) {
        self.inner.on_sim_end(final_state);
    }
}

// ── Output backend ────────────────────────────────────────────────────────────

#[cfg(feature = "parquet")]
const BACKEND: &str = "parquet";
#[cfg(all(feature = "sqlite", not(feature = "parquet")))]
const BACKEND: &str = "sqlite";
#[cfg(not(any(feature = "sqlite", feature = "parquet")))]
const BACKEND: &str = "csv";

#[cfg(feature = "parquet")]
fn open_writer(dir: &Path) -> Result<bs_output::ParquetWriter> {
    Ok(bs_output::ParquetWriter::new(dir)?)
}

#[cfg(all(feature = "sqlite", not(feature = "parquet")))]
fn open_writer(dir: &Path) -> Result<bs_output::SqliteWriter> {
    Ok(bs_output::SqliteWriter::new(dir)?)
}

#[cfg(not(any(feature = "sqlite", feature = "parquet")))]
fn open_writer(dir: &Path) -> Result<bs_output::CsvWriter> {
    Ok(bs_output::CsvWriter::new(dir)?)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn build(scenario: &Scenario, params: ModelParams, initial: &InitialConditions) -> Result<Model> {
    Ok(ModelBuilder::new(params, initial.clone())
        .config(scenario.sim.clone())
        .build()?)
}

fn finished_count(model: &Model) -> usize {
    model.buses.iter().filter(|b| b.status == BusStatus::Finished).count()
}

/// Mean of every recorded headway across all stops.
fn mean_headway(model: &Model) -> Option<f64> {
    let headways: Vec<f64> = model.stop_headways().into_iter().flatten().collect();
    (!headways.is_empty()).then(|| headways.iter().sum::<f64>() / headways.len() as f64)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), value)?;
    Ok(())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let scenario = load_scenario()?;
    let params = &scenario.params;

    println!("=== corridor — bussim reference scenario ===");
    println!(
        "Stops: {}  |  Spacing: {} m  |  Buses: {}  |  Horizon: {} s  |  Seed: {}",
        params.stop_count,
        params.stop_spacing,
        params.fleet_size(),
        params.end_time,
        scenario.sim.seed,
    );
    println!();

    // 1. Initial demand, drawn once and shared by every run below.
    let mut root = SimRng::new(scenario.sim.seed);
    let initial = InitialConditions::sampled(params, scenario.traffic_speed, &mut root.child(1));

    // 2. Main run with output.
    fs::create_dir_all(&scenario.output_dir)
        .with_context(|| format!("creating {}", scenario.output_dir.display()))?;
    let mut model = build(&scenario, params.clone(), &initial)?;

    let writer = open_writer(&scenario.output_dir)?;
    let mut obs = CountingObserver::new(ModelOutputObserver::new(writer));

    let t0 = Instant::now();
    model.run(&mut obs);
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    write_json(&scenario.output_dir.join("gps.json"), &model.gps_matrix())?;
    write_json(&scenario.output_dir.join("ground_truth.json"), &model.ground_truth_matrix())?;
    write_json(&scenario.output_dir.join("stop_arrivals.json"), &model.stop_arrivals())?;

    println!("Simulation complete in {:.3} s ({})", elapsed.as_secs_f64(), model.clock);
    println!("  output backend : {BACKEND} ({})", scenario.output_dir.display());
    println!("  bus_snapshots  : {} rows", obs.snapshot_rows);
    println!("  tick_summaries : {} rows", obs.summary_rows);
    println!("  boardings / alightings : {} / {}", obs.boardings, obs.alightings);
    println!("  buses finished : {}/{}", finished_count(&model), model.buses.len());
    if let Some(h) = mean_headway(&model) {
        println!("  mean stop headway : {h:.1} s (dispatch headway {} s)", params.headway);
    }
    println!();

    // 3. Dynamic-change comparison.
    if !scenario.compare_rates.is_empty() {
        println!("{:<12} {:>10} {:>14} {:>16}", "Change (%)", "Finished", "Final speed", "Mean headway");
        println!("{}", "-".repeat(55));
        for &rate in &scenario.compare_rates {
            let p = ModelParams { increase_rate: rate, ..params.clone() };
            let mut m = build(&scenario, p, &initial)?;
            m.run(&mut NoopObserver);
            println!(
                "{:<12} {:>10} {:>14.2} {:>16}",
                rate,
                format!("{}/{}", finished_count(&m), m.buses.len()),
                m.environment.traffic_speed,
                mean_headway(&m).map_or_else(|| "-".to_owned(), |h| format!("{h:.1}")),
            );
        }
        println!();
    }

    // 4. Replications.
    if scenario.replications > 0 {
        let t0 = Instant::now();
        let summary = replicate(params, &initial, scenario.replications, scenario.sim.seed)?;
        info!("{} replications in {:.3} s", summary.runs, t0.elapsed().as_secs_f64());

        let spread = summary
            .std
            .last()
            .map(|row| row.iter().copied().fold(0.0_f64, f64::max))
            .unwrap_or(0.0);
        println!("Replications: {}  |  max final-tick position std: {spread:.1} m", summary.runs);

        write_json(
            &scenario.output_dir.join("replications.json"),
            &serde_json::json!({ "runs": summary.runs, "mean": summary.mean, "std": summary.std }),
        )?;
    }

    Ok(())
}
