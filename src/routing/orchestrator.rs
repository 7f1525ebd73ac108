use bevy::prelude::*;
use std::time::{Duration, Instant};
use super::components::Routable;
use super::error::RouteError;
use super::graph::NavGraphs;
use super::scheduler::{RouteHost, RouteScheduler, SchedulerStats, TickSettings};

/// Request a full route recompute (the editor's refresh button).
#[derive(Event, Message, Debug, Clone, Default)]
pub struct RestartRoutes;

/// A resolution pass finished; every routable's path lists are final.
#[derive(Event, Message, Debug, Clone)]
pub struct RoutesResolved {
    pub pass: u32,
    pub paths: usize,
    pub stats: SchedulerStats,
    pub elapsed: Duration,
}

/// A resolution pass hit an invariant violation and was dropped.
#[derive(Event, Message, Debug, Clone)]
pub struct PassAborted {
    pub pass: u32,
    pub error: RouteError,
}

/// Pass-scoped orchestration state.
///
/// `resolved` is the single completion flag for the whole pass. It is
/// cleared by `restart` and set by `advance` when the last job (the sort)
/// has run. Nothing else in the route core reads or writes it.
#[derive(Resource, Debug, Default)]
pub struct RouteOrchestrator {
    resolved: bool,
    dirty: bool,
    pass: u32,
    started_at: Option<Instant>,
    aborted: Option<RouteError>,
}

impl RouteOrchestrator {
    /// Invalidate the current routes; a new pass starts on the next frame.
    pub fn set_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Number of passes started so far; the current pass id.
    pub fn pass(&self) -> u32 {
        self.pass
    }

    pub fn aborted(&self) -> Option<&RouteError> {
        self.aborted.as_ref()
    }

    /// Clear every routable's routes and queue a fresh pass over `entities`.
    pub fn restart<H: RouteHost>(&mut self, host: &mut H, scheduler: &mut RouteScheduler, entities: &[Entity]) -> usize {
        host.for_each_routable(&mut |_: Entity, routable: &mut Routable| routable.clear_all());
        let jobs = scheduler.collect_jobs(entities);

        self.pass += 1;
        self.resolved = false;
        self.dirty = false;
        self.aborted = None;
        self.started_at = Some(Instant::now());

        info!(
            "[ROUTES] pass {} started: {} routables, {} jobs",
            self.pass,
            entities.len(),
            jobs
        );
        jobs
    }

    /// Run one scheduler tick. Returns the completion summary on the tick
    /// that finishes the pass.
    ///
    /// Any error drops the queue and marks the pass aborted. A stale graph or
    /// corrupt job additionally panics in debug builds.
    pub fn advance<H: RouteHost>(
        &mut self,
        host: &mut H,
        scheduler: &mut RouteScheduler,
        graphs: &NavGraphs,
        settings: &TickSettings,
    ) -> Result<Option<RoutesResolved>, RouteError> {
        if self.resolved || scheduler.is_idle() {
            return Ok(None);
        }

        let report = match scheduler.tick(host, graphs, settings) {
            Ok(report) => report,
            Err(error) => {
                scheduler.clear();
                self.started_at = None;
                self.aborted = Some(error.clone());
                let invariant_broken = matches!(error, RouteError::StaleGraph { .. } | RouteError::CorruptJob(_));
                if cfg!(debug_assertions) && invariant_broken {
                    panic!("[ROUTES] pass {} aborted: {}", self.pass, error);
                }
                return Err(error);
            }
        };

        if !report.exhausted {
            return Ok(None);
        }

        self.resolved = true;
        let mut paths = 0;
        host.for_each_routable(&mut |_: Entity, routable: &mut Routable| paths += routable.path_count());
        let elapsed = self.started_at.take().map(|t| t.elapsed()).unwrap_or_default();
        let stats = scheduler.stats();

        info!(
            "[ROUTES] pass {} resolved in {:?} over {} ticks: {} paths ({} found, {} unreachable, {} abandoned)",
            self.pass, elapsed, stats.ticks, paths, stats.found, stats.not_found, stats.abandoned
        );

        Ok(Some(RoutesResolved { pass: self.pass, paths, stats, elapsed }))
    }
}
