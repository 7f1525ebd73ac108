use fixedbitset::FixedBitSet;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};
use super::error::RouteError;
use super::graph::NavGraph;
use super::heuristic::Heuristic;
use super::types::{step_cost, Cell};

const NO_PARENT: u32 = u32::MAX;

/// Result of one `SearchState::step` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStatus {
    /// Budget spent; call `step` again next tick.
    Running,
    /// Cells from origin to destination, both inclusive.
    Found(Vec<Cell>),
    /// Open set exhausted, or an endpoint is not walkable.
    NotFound,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub expansions: usize,
    pub steps: usize,
}

/// Open-set entry. Ordered so the max-heap pops the lowest f first and,
/// on equal f, the earliest insertion.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f32,
    seq: u64,
    index: u32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Resumable, time-boxed A* over one `NavGraph`.
///
/// All transient scores live here (dense arrays sized to the graph), so any
/// number of searches can run interleaved over the same graph without
/// touching each other. Re-keying is lazy: an improved node is pushed again
/// and the stale entry is dropped when it surfaces already closed.
#[derive(Debug, Clone)]
pub struct SearchState {
    destination: Cell,
    destination_index: usize,
    heuristic: Heuristic,
    generation: u64,
    open: BinaryHeap<OpenEntry>,
    g_score: Vec<f32>,
    parent: Vec<u32>,
    opened: FixedBitSet,
    closed: FixedBitSet,
    next_seq: u64,
    pending: Option<SearchStatus>,
    finished: bool,
    stats: SearchStats,
}

impl SearchState {
    /// Prepare a search. Trivial cases (same cell, blocked endpoint) are
    /// decided here and reported by the first `step` without expanding.
    pub fn begin(origin: Cell, destination: Cell, graph: &NavGraph, heuristic: Heuristic) -> Self {
        let len = graph.len();
        let mut state = Self {
            destination,
            destination_index: graph.index(destination).unwrap_or(usize::MAX),
            heuristic,
            generation: graph.generation(),
            open: BinaryHeap::new(),
            g_score: vec![f32::INFINITY; len],
            parent: vec![NO_PARENT; len],
            opened: FixedBitSet::with_capacity(len),
            closed: FixedBitSet::with_capacity(len),
            next_seq: 0,
            pending: None,
            finished: false,
            stats: SearchStats::default(),
        };

        if !graph.is_walkable(origin) || !graph.is_walkable(destination) {
            state.pending = Some(SearchStatus::NotFound);
        } else if origin == destination {
            state.pending = Some(SearchStatus::Found(vec![origin]));
        } else if let Some(start) = graph.index(origin) {
            state.g_score[start] = 0.0;
            state.opened.insert(start);
            state.push(start, heuristic.estimate(origin, destination));
        }

        state
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn push(&mut self, index: usize, f: f32) {
        self.open.push(OpenEntry { f, seq: self.next_seq, index: index as u32 });
        self.next_seq += 1;
    }

    /// Advance the search for roughly `budget`.
    ///
    /// Elapsed time is checked once per `batch` expansions, so a call can
    /// overshoot the budget by at most one batch. At least one batch runs on
    /// every call, which guarantees progress even with a zero budget.
    pub fn step(&mut self, graph: &NavGraph, budget: Duration, batch: usize) -> Result<SearchStatus, RouteError> {
        if graph.generation() != self.generation {
            return Err(RouteError::StaleGraph { expected: self.generation, found: graph.generation() });
        }
        if self.finished {
            return Err(RouteError::CorruptJob("search resumed after it finished"));
        }
        self.stats.steps += 1;

        if let Some(status) = self.pending.take() {
            self.finished = true;
            return Ok(status);
        }

        let started = Instant::now();
        let batch = batch.max(1);
        loop {
            for _ in 0..batch {
                let Some(entry) = self.open.pop() else {
                    self.finished = true;
                    return Ok(SearchStatus::NotFound);
                };
                let current = entry.index as usize;
                if self.closed.contains(current) {
                    continue;
                }
                self.closed.insert(current);
                self.stats.expansions += 1;

                if current == self.destination_index {
                    self.finished = true;
                    return Ok(SearchStatus::Found(self.backtrace(graph, current)));
                }

                let cell = graph.cell_at(current);
                let g = self.g_score[current];
                for neighbor in graph.neighbors(cell) {
                    let Some(next) = graph.index(neighbor) else { continue };
                    if self.closed.contains(next) {
                        continue;
                    }
                    let tentative = g + step_cost(cell, neighbor);
                    if !self.opened.contains(next) || tentative < self.g_score[next] {
                        self.g_score[next] = tentative;
                        self.parent[next] = current as u32;
                        self.opened.insert(next);
                        let f = tentative + self.heuristic.estimate(neighbor, self.destination);
                        self.push(next, f);
                    }
                }
            }

            if started.elapsed() >= budget {
                return Ok(SearchStatus::Running);
            }
        }
    }

    fn backtrace(&self, graph: &NavGraph, end: usize) -> Vec<Cell> {
        let mut cells = vec![graph.cell_at(end)];
        let mut current = end;
        while self.parent[current] != NO_PARENT {
            current = self.parent[current] as usize;
            cells.push(graph.cell_at(current));
        }
        cells.reverse();
        cells
    }
}
