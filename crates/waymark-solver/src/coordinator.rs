// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! The exact search portfolio.
//!
//! `ExactSearchCoordinator` owns a set of independently built branch and
//! bound workers. Each worker's `Model` captures the coordination state's
//! best distance as a ceiling when the worker is added; a running worker is
//! never re-tightened, only workers added later see a better ceiling.
//!
//! Running the portfolio spawns one scoped thread per worker. Workers share a
//! `SharedIncumbent`, a stop flag and a solution counter, and stream
//! `PortfolioEvent`s to the calling thread, which drives the observer until
//! every worker has finished.

use crossbeam::channel::{RecvTimeoutError, Sender};
use rand::{SeedableRng, rngs::StdRng};
use std::{
    ops::ControlFlow,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};
use waymark_bnb::{
    branching::{
        decision::DecisionBuilder, lexical::IndexOrderBuilder, lookahead::LookaheadBuilder, nearest::NearestNeighborBuilder,
        randomized::RandomizedBuilder,
    },
    monitor::{
        frontier::{FrontierSamplingConfig, FrontierSamplingMonitor},
        log::LogTreeSearchMonitor,
    },
    portfolio::BnbPortfolioSolver,
};
use waymark_model::{
    matrix::DistanceMatrix,
    model::{Model, ModelBuilder},
    tour::Tour,
};
use waymark_search::{
    coordination::SharedCoordinationState,
    incumbent::SharedIncumbent,
    monitor::{
        composite::CompositeMonitor,
        interrupt::InterruptMonitor,
        search_monitor::SearchMonitor,
        solution::SolutionMonitor,
        time_limit::TimeLimitMonitor,
    },
    num::SolverNumeric,
    portfolio::{PortfolioSolver, PortfolioSolverContext, PortfolioSolverResult},
    result::SolverResult,
};

/// Clock check mask of the per-worker progress log.
const LOG_CLOCK_CHECK_MASK: u64 = 0xFFF;

/// A message from a portfolio worker thread.
#[derive(Debug, Clone)]
pub enum PortfolioEvent<T> {
    /// A worker accepted a tour with this objective.
    SolutionFound { worker: usize, objective: T },
    /// A worker returned from its search.
    WorkerFinished {
        worker: usize,
        result: PortfolioSolverResult<T>,
    },
}

impl<T> PortfolioEvent<T> {
    #[inline]
    pub fn worker(&self) -> usize {
        match self {
            PortfolioEvent::SolutionFound { worker, .. }
            | PortfolioEvent::WorkerFinished { worker, .. } => *worker,
        }
    }
}

/// What a portfolio run leaves behind.
#[derive(Debug, Clone)]
pub struct PortfolioRun<T> {
    /// One result per worker that reported back.
    pub results: Vec<PortfolioSolverResult<T>>,
    /// The best tour any worker installed in the shared incumbent.
    pub incumbent: Option<Tour<T>>,
    /// Tours accepted across all workers.
    pub solutions_found: u64,
    /// Whether the portfolio stop flag was raised.
    pub stopped: bool,
    pub duration: Duration,
}

impl<T> PortfolioRun<T>
where
    T: SolverNumeric,
{
    /// Returns `true` if any worker proved its tour optimal.
    #[inline]
    pub fn optimality_proven(&self) -> bool {
        self.results
            .iter()
            .any(|r| matches!(r.result(), SolverResult::Optimal(_)))
    }
}

struct PortfolioWorker<'a, T>
where
    T: SolverNumeric,
{
    name: String,
    model: Model<T>,
    solver: Box<dyn PortfolioSolver<T> + 'a>,
}

/// Forwards accepted tours to the orchestrating thread.
struct EventForwardingMonitor<T> {
    worker: usize,
    sender: Sender<PortfolioEvent<T>>,
}

impl<T> SearchMonitor<T> for EventForwardingMonitor<T>
where
    T: SolverNumeric,
{
    fn name(&self) -> &str {
        "EventForwardingMonitor"
    }

    fn on_solution_found(&mut self, tour: &Tour<T>) {
        // A closed receiver only means nobody is listening any more.
        let _ = self.sender.send(PortfolioEvent::SolutionFound {
            worker: self.worker,
            objective: tour.objective_value(),
        });
    }
}

/// Owns the exact search workers of a hybrid run.
pub struct ExactSearchCoordinator<'a, T>
where
    T: SolverNumeric,
{
    matrix: Arc<DistanceMatrix<T>>,
    coordination: Arc<SharedCoordinationState>,
    workers: Vec<PortfolioWorker<'a, T>>,
    incumbent: SharedIncumbent<T>,
    stop_signal: AtomicBool,
    solutions_found: AtomicU64,
    solution_limit: Option<u64>,
    time_limit: Option<Duration>,
}

impl<'a, T> std::fmt::Debug for ExactSearchCoordinator<'a, T>
where
    T: SolverNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.workers.iter().map(|w| w.name.as_str()).collect();
        f.debug_struct("ExactSearchCoordinator")
            .field("num_cities", &self.matrix.num_cities())
            .field("workers", &names)
            .field("solution_limit", &self.solution_limit)
            .field("time_limit", &self.time_limit)
            .finish()
    }
}

impl<'a, T> ExactSearchCoordinator<'a, T>
where
    T: SolverNumeric,
{
    /// Creates a coordinator without workers.
    pub fn new(matrix: Arc<DistanceMatrix<T>>, coordination: Arc<SharedCoordinationState>) -> Self {
        Self {
            matrix,
            coordination,
            workers: Vec::new(),
            incumbent: SharedIncumbent::new(),
            stop_signal: AtomicBool::new(false),
            solutions_found: AtomicU64::new(0),
            solution_limit: None,
            time_limit: None,
        }
    }

    /// Builds the default portfolio of `portfolio_size` workers.
    ///
    /// The first three workers order values by nearest successor, one step
    /// look-ahead and city index; every further worker uses a random order
    /// seeded with `base_seed + index`. Every worker samples its frontier.
    pub fn with_default_portfolio(
        matrix: Arc<DistanceMatrix<T>>,
        coordination: Arc<SharedCoordinationState>,
        portfolio_size: usize,
        frontier: FrontierSamplingConfig,
        base_seed: u64,
        log_interval: Option<Duration>,
    ) -> Self {
        let mut coordinator = Self::new(matrix, coordination);
        for index in 0..portfolio_size {
            coordinator.add_default_worker(index, frontier, base_seed, log_interval);
        }
        coordinator
    }

    #[inline]
    pub fn with_solution_limit(mut self, solution_limit: Option<u64>) -> Self {
        self.solution_limit = solution_limit;
        self
    }

    #[inline]
    pub fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Adds a worker whose model is capped by the current best distance.
    pub fn add_worker<S>(&mut self, solver: S) -> &mut Self
    where
        S: PortfolioSolver<T> + 'a,
    {
        self.add_boxed_worker(Box::new(solver))
    }

    pub fn add_boxed_worker(&mut self, solver: Box<dyn PortfolioSolver<T> + 'a>) -> &mut Self {
        let name = format!("{}#{}", solver.name(), self.workers.len());
        self.push_worker(name, solver)
    }

    fn push_worker(&mut self, name: String, solver: Box<dyn PortfolioSolver<T> + 'a>) -> &mut Self {
        let model = self.snapshot_model();
        tracing::debug!(worker = %name, ceiling = ?model.ceiling(), "portfolio worker built");
        self.workers.push(PortfolioWorker {
            name,
            model,
            solver,
        });
        self
    }

    fn add_default_worker(
        &mut self,
        index: usize,
        frontier: FrontierSamplingConfig,
        base_seed: u64,
        log_interval: Option<Duration>,
    ) {
        let n = self.matrix.num_cities();
        match index {
            0 => self.add_sampling_worker(
                NearestNeighborBuilder::preallocated(n),
                frontier,
                log_interval,
            ),
            1 => self.add_sampling_worker(LookaheadBuilder::preallocated(n), frontier, log_interval),
            2 => self.add_sampling_worker(IndexOrderBuilder, frontier, log_interval),
            _ => {
                let rng = StdRng::seed_from_u64(base_seed.wrapping_add(index as u64));
                self.add_sampling_worker(
                    RandomizedBuilder::preallocated(n, rng),
                    frontier,
                    log_interval,
                )
            }
        };
    }

    fn add_sampling_worker<B>(
        &mut self,
        decision_builder: B,
        frontier: FrontierSamplingConfig,
        log_interval: Option<Duration>,
    ) -> &mut Self
    where
        B: DecisionBuilder<T> + Send + 'a,
    {
        let index = self.workers.len();
        let name = format!("{}#{}", decision_builder.name(), index);
        let sampler = FrontierSamplingMonitor::new(Arc::clone(&self.coordination), frontier);
        let mut solver = BnbPortfolioSolver::preallocated(self.matrix.num_cities(), decision_builder)
            .with_frontier_sampling(sampler);
        if let Some(interval) = log_interval {
            solver = solver.with_log_monitor(LogTreeSearchMonitor::new(
                name.clone(),
                interval,
                LOG_CLOCK_CHECK_MASK,
            ));
        }
        self.push_worker(name, Box::new(solver))
    }

    fn snapshot_model(&self) -> Model<T> {
        let mut builder = ModelBuilder::new(Arc::clone(&self.matrix));
        builder.with_optional_ceiling(self.coordination.ceiling::<T>());
        builder.build()
    }

    #[inline]
    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Returns the ceiling each worker was built with.
    pub fn ceilings(&self) -> impl Iterator<Item = Option<T>> + '_ {
        self.workers.iter().map(|w| w.model.ceiling())
    }

    #[inline]
    pub fn coordination(&self) -> &Arc<SharedCoordinationState> {
        &self.coordination
    }

    #[inline]
    pub fn incumbent(&self) -> &SharedIncumbent<T> {
        &self.incumbent
    }

    /// Runs every worker to completion on its own thread.
    ///
    /// `observer` is called on the calling thread with every event, and with
    /// `None` whenever `poll_interval` passes without one. Returning
    /// `ControlFlow::Break` raises the portfolio stop flag; the call still
    /// waits for every worker to return.
    ///
    /// # Panics
    ///
    /// Panics if no worker was added, and resumes the panic of any worker
    /// thread.
    pub fn run<F>(&mut self, poll_interval: Duration, mut observer: F) -> PortfolioRun<T>
    where
        F: FnMut(Option<&PortfolioEvent<T>>) -> ControlFlow<()>,
    {
        assert!(
            !self.workers.is_empty(),
            "called `ExactSearchCoordinator::run` with no portfolio workers"
        );

        self.stop_signal.store(false, Ordering::SeqCst);
        self.solutions_found.store(0, Ordering::SeqCst);
        let start_time = Instant::now();
        let num_workers = self.workers.len();

        let (sender, receiver) = crossbeam::channel::unbounded();
        let mut results: Vec<Option<PortfolioSolverResult<T>>> =
            (0..num_workers).map(|_| None).collect();

        let incumbent = &self.incumbent;
        let stop_signal = &self.stop_signal;
        let solutions_found = &self.solutions_found;
        let solution_limit = self.solution_limit;
        let time_limit = self.time_limit;

        std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .workers
                .iter_mut()
                .enumerate()
                .map(|(index, worker)| {
                    let sender = sender.clone();
                    scope.spawn(move || {
                        let mut monitor = CompositeMonitor::<T>::with_capacity(4);
                        monitor.add_monitor(InterruptMonitor::new(stop_signal));
                        monitor.add_monitor(SolutionMonitor::new(solutions_found, solution_limit));
                        if let Some(limit) = time_limit {
                            monitor.add_monitor(TimeLimitMonitor::new(limit));
                        }
                        monitor.add_monitor(EventForwardingMonitor {
                            worker: index,
                            sender: sender.clone(),
                        });

                        let context =
                            PortfolioSolverContext::new(&worker.model, incumbent, &mut monitor);
                        let result = worker.solver.invoke(context);
                        tracing::debug!(worker = %worker.name, result = %result, "portfolio worker finished");

                        if matches!(result.result(), SolverResult::Optimal(_)) {
                            stop_signal.store(true, Ordering::SeqCst);
                        }
                        // A closed receiver only means nobody is listening any more.
                        let _ = sender.send(PortfolioEvent::WorkerFinished {
                            worker: index,
                            result,
                        });
                    })
                })
                .collect();
            drop(sender);

            let mut finished = 0;
            while finished < num_workers {
                let flow = match receiver.recv_timeout(poll_interval) {
                    Ok(event) => {
                        let flow = observer(Some(&event));
                        if let PortfolioEvent::WorkerFinished { worker, result } = event {
                            results[worker] = Some(result);
                            finished += 1;
                        }
                        flow
                    }
                    Err(RecvTimeoutError::Timeout) => observer(None),
                    Err(RecvTimeoutError::Disconnected) => break,
                };
                if flow.is_break() && !stop_signal.swap(true, Ordering::SeqCst) {
                    tracing::info!("portfolio stop requested by the orchestrator");
                }
            }

            for handle in handles {
                if let Err(payload) = handle.join() {
                    std::panic::resume_unwind(payload);
                }
            }
        });

        PortfolioRun {
            results: results.into_iter().flatten().collect(),
            incumbent: self.incumbent.snapshot(),
            solutions_found: self.solutions_found.load(Ordering::SeqCst),
            stopped: self.stop_signal.load(Ordering::SeqCst),
            duration: start_time.elapsed(),
        }
    }
}
