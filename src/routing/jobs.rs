use bevy::prelude::*;
use std::time::Duration;
use super::error::RouteError;
use super::graph::NavGraph;
use super::heuristic::Heuristic;
use super::path::RoutePath;
use super::scheduler::RouteHost;
use super::search::{SearchState, SearchStatus};
use super::types::Faction;

/// A unit of scheduler work. Closed set of variants; the scheduler matches
/// on it instead of dispatching through a trait object.
#[derive(Debug)]
pub enum RouteJob {
    /// Resolve the route between two entities for one faction.
    Resolve(ResolveJob),
    /// Sort every routable's path lists. Queued last in each pass.
    Sort,
}

/// Lifecycle of a resolve job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    InProgress,
    Completed,
    Abandoned,
}

/// What one resume of a job achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Running,
    Found,
    NotFound,
    Abandoned,
    Sorted,
}

impl JobOutcome {
    pub fn is_finished(self) -> bool {
        self != JobOutcome::Running
    }
}

#[derive(Debug)]
enum Phase {
    Pending,
    InProgress(Box<SearchState>),
    Completed,
    Abandoned,
}

/// Search job for one unordered entity pair and one faction.
///
/// Holds only its endpoints until first resumed: cells are taken from the
/// entities' positions at that moment, not at collection time.
#[derive(Debug)]
pub struct ResolveJob {
    from: Entity,
    to: Entity,
    faction: Faction,
    phase: Phase,
}

impl ResolveJob {
    pub fn new(from: Entity, to: Entity, faction: Faction) -> Self {
        Self { from, to, faction, phase: Phase::Pending }
    }

    pub fn endpoints(&self) -> (Entity, Entity) {
        (self.from, self.to)
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    pub fn state(&self) -> JobState {
        match self.phase {
            Phase::Pending => JobState::Pending,
            Phase::InProgress(_) => JobState::InProgress,
            Phase::Completed => JobState::Completed,
            Phase::Abandoned => JobState::Abandoned,
        }
    }

    /// Advance the job for up to `budget`.
    ///
    /// Endpoint liveness is checked on every resume. A lost endpoint abandons
    /// the job silently and nothing is written. Paths are written only when
    /// the search completes, both halves at once.
    pub fn resume<H: RouteHost>(
        &mut self,
        host: &mut H,
        graph: &NavGraph,
        heuristic: Heuristic,
        budget: Duration,
        batch: usize,
    ) -> Result<JobOutcome, RouteError> {
        match self.phase {
            Phase::Completed | Phase::Abandoned => {
                return Err(RouteError::CorruptJob("resolve job resumed after it finished"));
            }
            Phase::Pending | Phase::InProgress(_) => {}
        }

        if !host.is_active(self.from) || !host.is_active(self.to) {
            debug!(
                "[ROUTES] abandoning {} job {:?} -> {:?}: endpoint no longer active",
                self.faction.name(),
                self.from,
                self.to
            );
            self.phase = Phase::Abandoned;
            return Ok(JobOutcome::Abandoned);
        }

        if matches!(self.phase, Phase::Pending) {
            let (Some(start), Some(end)) = (host.cell_of(self.from), host.cell_of(self.to)) else {
                self.phase = Phase::Abandoned;
                return Ok(JobOutcome::Abandoned);
            };
            if let Some(routable) = host.routable_mut(self.from) {
                routable.set_last_resolved_cell(start);
            }
            if let Some(routable) = host.routable_mut(self.to) {
                routable.set_last_resolved_cell(end);
            }
            self.phase = Phase::InProgress(Box::new(SearchState::begin(start, end, graph, heuristic)));
        }

        let Phase::InProgress(search) = &mut self.phase else {
            return Err(RouteError::CorruptJob("resolve job has no search in progress"));
        };

        match search.step(graph, budget, batch)? {
            SearchStatus::Running => Ok(JobOutcome::Running),
            SearchStatus::NotFound => {
                self.phase = Phase::Completed;
                Ok(JobOutcome::NotFound)
            }
            SearchStatus::Found(cells) => {
                let there = RoutePath::new(self.to, cells, self.faction, false);
                let back = there.reversed_towards(self.from);
                if let Some(routable) = host.routable_mut(self.from) {
                    routable.add(self.faction, there);
                }
                if let Some(routable) = host.routable_mut(self.to) {
                    routable.add(self.faction, back);
                }
                self.phase = Phase::Completed;
                Ok(JobOutcome::Found)
            }
        }
    }
}
