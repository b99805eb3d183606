//! Source group scheduler.
//!
//! Assigns each source group its simulated arrival time and orders batch
//! production accordingly. The scheduler only sequences logical timestamps;
//! it never sleeps. A caller that wants real elapsed-time staggering wraps
//! the returned plan with its own delays between events.

use sapling_core::{SimTime, SourceGroup};

/// One scheduled emission event: a source group arriving at a simulated
/// time. `group` indexes into the slice the plan was built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emission {
    /// Index of the source group in the configuration
    pub group: usize,

    /// Simulated arrival time for every batch the group emits
    pub sim_time: SimTime,
}

/// Order the groups by simulated arrival, earliest first.
///
/// Ties keep declaration order (stable sort). The plan is finite and can be
/// re-generated at will; each event yields the group's tables to the load
/// controller in the group's declared order.
pub fn plan(groups: &[SourceGroup]) -> Vec<Emission> {
    let mut emissions: Vec<Emission> = groups
        .iter()
        .enumerate()
        .map(|(group, g)| Emission {
            group,
            sim_time: g.arrival,
        })
        .collect();

    emissions.sort_by_key(|e| e.sim_time.instant());
    emissions
}
