//! Independent replications of one configuration.
//!
//! Replication `i` runs with seed `SimRng::new(seed).child_seed(i)`.  The
//! seeds are derived up front, so each replication owns its model and seed
//! and the result does not depend on the `parallel` feature or on thread
//! scheduling.

use log::info;

use bs_core::{InitialConditions, ModelParams, SimRng};

use crate::{ModelBuilder, NoopObserver, SimError, SimResult};

/// Per-cell statistics of the GPS matrices of several runs.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationSummary {
    pub runs: usize,
    /// `ticks × buses` mean position.
    pub mean: Vec<Vec<f64>>,
    /// `ticks × buses` population standard deviation.
    pub std:  Vec<Vec<f64>>,
}

/// Run `runs` independent models and aggregate their GPS matrices.
///
/// With the `parallel` Cargo feature the runs execute on Rayon's thread pool.
pub fn replicate(
    params:  &ModelParams,
    initial: &InitialConditions,
    runs:    usize,
    seed:    u64,
) -> SimResult<ReplicationSummary> {
    if runs == 0 {
        return Err(SimError::Config("replicate needs at least one run".into()));
    }
    params.validate()?;
    initial.validate(params)?;

    let mut root = SimRng::new(seed);
    let seeds: Vec<u64> = (0..runs as u64).map(|i| root.child_seed(i)).collect();
    info!("replicating {runs} runs from seed {seed}");

    let run_one = |&run_seed: &u64| -> SimResult<Vec<Vec<f64>>> {
        let mut model = ModelBuilder::new(params.clone(), initial.clone())
            .seed(run_seed)
            .output_interval(0)
            .build()?;
        model.run(&mut NoopObserver);
        Ok(model.gps_matrix())
    };

    #[cfg(not(feature = "parallel"))]
    let matrices = seeds.iter().map(run_one).collect::<SimResult<Vec<_>>>()?;

    #[cfg(feature = "parallel")]
    let matrices = {
        use rayon::prelude::*;
        seeds.par_iter().map(run_one).collect::<SimResult<Vec<_>>>()?
    };

    Ok(summarize(&matrices))
}

/// Cell-wise mean and population standard deviation.  All matrices share
/// the shape of the first.
pub(crate) fn summarize(matrices: &[Vec<Vec<f64>>]) -> ReplicationSummary {
    let runs = matrices.len();
    let n = runs as f64;
    let Some(first) = matrices.first() else {
        return ReplicationSummary { runs, mean: Vec::new(), std: Vec::new() };
    };

    let mut mean: Vec<Vec<f64>> = first.iter().map(|row| vec![0.0; row.len()]).collect();
    for m in matrices {
        for (acc_row, row) in mean.iter_mut().zip(m) {
            for (acc, &x) in acc_row.iter_mut().zip(row) {
                *acc += x;
            }
        }
    }
    for v in mean.iter_mut().flatten() {
        *v /= n;
    }

    let mut std: Vec<Vec<f64>> = first.iter().map(|row| vec![0.0; row.len()]).collect();
    for m in matrices {
        for ((acc_row, mean_row), row) in std.iter_mut().zip(&mean).zip(m) {
            for ((acc, &mu), &x) in acc_row.iter_mut().zip(mean_row).zip(row) {
                *acc += (x - mu).powi(2) / n;
            }
        }
    }
    for v in std.iter_mut().flatten() {
        *v = v.sqrt();
    }

    ReplicationSummary { runs, mean, std }
}
