//! Validated, ordered step graph

use crate::core::step::Step;
use anyhow::{bail, Result};
use std::collections::{HashMap, HashSet};

/// A validated step graph with a fixed execution order.
///
/// Construction rejects duplicate IDs, unknown dependencies, cycles and any
/// fatal step that (transitively) depends on a warn-only one. The order is a
/// topological sort with ties broken by declaration order, so it is stable
/// across runs of the same inventory.
#[derive(Debug, Clone)]
pub struct Plan {
    steps: Vec<Step>,
    execution_order: Vec<usize>,
}

impl Plan {
    pub fn new(steps: Vec<Step>) -> Result<Self> {
        let mut seen_ids = HashSet::new();
        for step in &steps {
            if !seen_ids.insert(step.id.clone()) {
                bail!("Duplicate step ID: {}", step.id);
            }
        }

        let index: HashMap<String, usize> = steps
            .iter()
            .enumerate()
            .map(|(i, step)| (step.id.clone(), i))
            .collect();

        for step in &steps {
            for dep in &step.depends_on {
                if !index.contains_key(dep) {
                    bail!("Step '{}' depends on unknown step '{}'", step.id, dep);
                }
            }
        }

        // A fatal step behind a warn-only dependency could be reached after
        // that dependency failed, which would defeat the fatal guarantee.
        for step in &steps {
            if !step.is_fatal() {
                continue;
            }
            let mut frontier: Vec<&str> = step.depends_on.iter().map(String::as_str).collect();
            let mut seen: HashSet<&str> = HashSet::new();
            while let Some(dep_id) = frontier.pop() {
                if !seen.insert(dep_id) {
                    continue;
                }
                let dep = &steps[index[dep_id]];
                if !dep.is_fatal() {
                    bail!(
                        "Fatal step '{}' depends on warn-only step '{}'",
                        step.id,
                        dep.id
                    );
                }
                frontier.extend(dep.depends_on.iter().map(String::as_str));
            }
        }

        let execution_order = Self::topological_sort(&steps, &index)?;

        Ok(Self {
            steps,
            execution_order,
        })
    }

    /// Repeatedly place the first declared step whose dependencies are all
    /// placed. When nothing can be placed, the remainder forms a cycle.
    fn topological_sort(steps: &[Step], index: &HashMap<String, usize>) -> Result<Vec<usize>> {
        let mut placed = vec![false; steps.len()];
        let mut order = Vec::with_capacity(steps.len());

        while order.len() < steps.len() {
            let next = (0..steps.len()).find(|&i| {
                !placed[i]
                    && steps[i]
                        .depends_on
                        .iter()
                        .all(|dep| placed[index[dep.as_str()]])
            });

            match next {
                Some(i) => {
                    placed[i] = true;
                    order.push(i);
                }
                None => {
                    let stuck = steps
                        .iter()
                        .enumerate()
                        .find(|(i, _)| !placed[*i])
                        .map(|(_, step)| step.id.clone())
                        .unwrap_or_default();
                    bail!("Cycle detected in dependency graph involving step '{}'", stuck);
                }
            }
        }

        Ok(order)
    }

    /// Steps in execution order.
    pub fn execution_order(&self) -> impl Iterator<Item = &Step> + '_ {
        self.execution_order.iter().map(|&i| &self.steps[i])
    }

    /// Step IDs in execution order.
    pub fn step_ids(&self) -> Vec<String> {
        self.execution_order().map(|step| step.id.clone()).collect()
    }

    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// All steps that transitively depend on `step_id`.
    pub fn dependents_of(&self, step_id: &str) -> HashSet<String> {
        let mut dependents = HashSet::new();
        let mut frontier = vec![step_id.to_string()];
        while let Some(current) = frontier.pop() {
            for step in &self.steps {
                if step.depends_on.contains(&current) && dependents.insert(step.id.clone()) {
                    frontier.push(step.id.clone());
                }
            }
        }
        dependents
    }
}
