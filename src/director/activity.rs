//! Per-entity activity scores with scheduled decay
//!
//! Every contribution to a score is paired with a pending decay of the same
//! amount, so a score returns to exactly zero once all of its contributions
//! have expired.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::VecDeque;

use crate::registry::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityKind {
    Activity,
    Signals { boost: f64 },
}

/// Entry of the rolling activity log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRecord {
    pub agent: EntityId,
    #[serde(flatten)]
    pub kind: ActivityKind,
    /// Seconds since the frame loop started
    pub at: f64,
}

#[derive(Debug, Clone)]
struct PendingDecay {
    agent: EntityId,
    due: f64,
    amount: f64,
}

#[derive(Debug, Clone)]
pub struct ActivityTracker {
    /// Insertion order is first-seen order
    scores: IndexMap<EntityId, f64>,
    decays: Vec<PendingDecay>,
    log: VecDeque<ActivityRecord>,
    log_capacity: usize,
    decay_window: f64,
}

impl ActivityTracker {
    pub fn new(decay_window: f64, log_capacity: usize) -> Self {
        Self {
            scores: IndexMap::new(),
            decays: Vec::new(),
            log: VecDeque::with_capacity(log_capacity),
            log_capacity,
            decay_window,
        }
    }

    /// Add `amount` now and schedule its removal one decay window later
    pub fn contribute(&mut self, agent: &EntityId, amount: f64, now: f64) {
        if !(amount.is_finite() && amount > 0.0) {
            return;
        }
        *self.scores.entry(agent.clone()).or_insert(0.0) += amount;
        self.decays.push(PendingDecay {
            agent: agent.clone(),
            due: now + self.decay_window,
            amount,
        });
    }

    /// Apply every decay due at or before `now`
    pub fn process_decays(&mut self, now: f64) {
        let scores = &mut self.scores;
        self.decays.retain(|decay| {
            if decay.due > now {
                return true;
            }
            if let Some(score) = scores.get_mut(&decay.agent) {
                *score -= decay.amount;
                if *score < 1e-9 {
                    *score = 0.0;
                }
            }
            false
        });
        if self.decays.is_empty() {
            // Nothing left to subtract; erase float residue
            for score in self.scores.values_mut() {
                *score = 0.0;
            }
        }
    }

    pub fn record(&mut self, record: ActivityRecord) {
        if self.log_capacity == 0 {
            return;
        }
        while self.log.len() >= self.log_capacity {
            self.log.pop_front();
        }
        self.log.push_back(record);
    }

    pub fn score(&self, agent: &EntityId) -> f64 {
        self.scores.get(agent).copied().unwrap_or(0.0)
    }

    /// Highest positive score; ties go to the entity seen first
    pub fn best(&self) -> Option<&EntityId> {
        let mut best: Option<(&EntityId, f64)> = None;
        for (agent, &score) in &self.scores {
            if score <= 0.0 {
                continue;
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((agent, score));
            }
        }
        best.map(|(agent, _)| agent)
    }

    /// Scores sorted descending, at most `limit` entries
    pub fn top(&self, limit: usize) -> Vec<(EntityId, f64)> {
        let mut ranked: Vec<_> = self
            .scores
            .iter()
            .filter(|(_, &s)| s > 0.0)
            .map(|(a, &s)| (a.clone(), s))
            .collect();
        // Stable sort keeps first-seen order among equals
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(limit);
        ranked
    }

    pub fn log(&self) -> impl DoubleEndedIterator<Item = &ActivityRecord> {
        self.log.iter()
    }

    pub fn pending_decays(&self) -> usize {
        self.decays.len()
    }

    /// Cancel pending decays and forget all scores
    pub fn clear_scores(&mut self) {
        self.scores.clear();
        self.decays.clear();
    }
}
