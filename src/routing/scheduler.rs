use bevy::prelude::*;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use super::components::Routable;
use super::config::RouteConfig;
use super::error::RouteError;
use super::graph::NavGraphs;
use super::heuristic::Heuristic;
use super::jobs::{JobOutcome, ResolveJob, RouteJob};
use super::types::{Cell, Faction};

/// What the scheduler needs from the world: liveness, positions and the
/// route store. Implemented over a Bevy query by `QueryHost`.
pub trait RouteHost {
    fn is_active(&self, entity: Entity) -> bool;
    fn cell_of(&self, entity: Entity) -> Option<Cell>;
    fn routable_mut(&mut self, entity: Entity) -> Option<&mut Routable>;
    fn for_each_routable(&mut self, f: &mut dyn FnMut(Entity, &mut Routable));
}

/// Per-tick knobs, lifted out of `RouteConfig` once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSettings {
    pub budget: Duration,
    pub batch: usize,
    pub overrun_slack: Duration,
    pub heuristic: Heuristic,
}

impl From<&RouteConfig> for TickSettings {
    fn from(config: &RouteConfig) -> Self {
        Self {
            budget: config.time_budget(),
            batch: config.expansion_batch,
            overrun_slack: config.overrun_slack(),
            heuristic: config.heuristic,
        }
    }
}

impl Default for TickSettings {
    fn default() -> Self {
        Self::from(&RouteConfig::default())
    }
}

/// Counters for the current pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub collected: usize,
    pub found: usize,
    pub not_found: usize,
    pub abandoned: usize,
    pub sorted: usize,
    pub ticks: usize,
    pub overruns: usize,
}

impl SchedulerStats {
    fn record(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Found => self.found += 1,
            JobOutcome::NotFound => self.not_found += 1,
            JobOutcome::Abandoned => self.abandoned += 1,
            JobOutcome::Sorted => self.sorted += 1,
            JobOutcome::Running => {}
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub elapsed: Duration,
    pub jobs_finished: usize,
    /// The queue ran dry during this tick.
    pub exhausted: bool,
    pub overrun: bool,
}

/// Owns the job queue of the current resolution pass.
///
/// Jobs run strictly in collection order. Only the head job is ever in
/// flight; the next one starts when it completes or is abandoned.
#[derive(Resource, Default, Debug)]
pub struct RouteScheduler {
    jobs: VecDeque<RouteJob>,
    stats: SchedulerStats,
}

impl RouteScheduler {
    /// Replace the queue with one search per unordered pair per faction
    /// (faction-major), followed by the sort job. Any previous in-flight
    /// state is dropped.
    pub fn collect_jobs(&mut self, entities: &[Entity]) -> usize {
        self.jobs.clear();
        self.stats = SchedulerStats::default();

        for faction in Faction::ALL {
            for (a, &from) in entities.iter().enumerate() {
                for &to in &entities[a + 1..] {
                    self.jobs.push_back(RouteJob::Resolve(ResolveJob::new(from, to, faction)));
                }
            }
        }
        self.jobs.push_back(RouteJob::Sort);

        self.stats.collected = self.jobs.len();
        self.stats.collected
    }

    /// Drop every queued job without running it.
    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    pub fn is_idle(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.jobs.len()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn head(&self) -> Option<&RouteJob> {
        self.jobs.front()
    }

    /// Resume jobs from the head of the queue until the budget is spent or
    /// the queue is empty.
    pub fn tick<H: RouteHost>(
        &mut self,
        host: &mut H,
        graphs: &NavGraphs,
        settings: &TickSettings,
    ) -> Result<TickReport, RouteError> {
        let started = Instant::now();
        let mut report = TickReport::default();
        self.stats.ticks += 1;

        while let Some(job) = self.jobs.front_mut() {
            let remaining = settings.budget.saturating_sub(started.elapsed());
            let outcome = match job {
                RouteJob::Resolve(job) => {
                    let graph = graphs
                        .get(job.faction())
                        .ok_or(RouteError::MissingGraph(job.faction()))?;
                    job.resume(host, graph, settings.heuristic, remaining, settings.batch)?
                }
                RouteJob::Sort => {
                    host.for_each_routable(&mut |_: Entity, routable: &mut Routable| routable.sort_all());
                    JobOutcome::Sorted
                }
            };

            if !outcome.is_finished() {
                break;
            }
            self.stats.record(outcome);
            self.jobs.pop_front();
            report.jobs_finished += 1;

            if started.elapsed() >= settings.budget {
                break;
            }
        }

        report.elapsed = started.elapsed();
        report.exhausted = self.jobs.is_empty();
        if report.elapsed > settings.budget + settings.overrun_slack {
            report.overrun = true;
            self.stats.overruns += 1;
            warn!(
                "[ROUTES] tick took {:?}, budget {:?} (+{:?} slack)",
                report.elapsed, settings.budget, settings.overrun_slack
            );
        }

        Ok(report)
    }
}
