// JobSleuth - core/health.rs
//
// Mastercard subsystem health: L3 / L6 status from the accepted records.

use crate::core::model::{JobRecord, SubsystemStatus, SubsystemTag};
use crate::util::constants;
use indexmap::IndexMap;

/// Status of every monitored subsystem, in `SubsystemTag::all()` order.
///
/// A subsystem with no job is `NotDetected`. Otherwise it is `Active` when
/// any of its jobs is in an active state (`SELW`, `DEQA`), regardless of
/// where that job sits among the others, and `Inactive` when none is.
pub fn detect_subsystems(records: &[JobRecord]) -> IndexMap<SubsystemTag, SubsystemStatus> {
    let mut statuses: IndexMap<SubsystemTag, SubsystemStatus> = SubsystemTag::all()
        .iter()
        .map(|tag| (*tag, SubsystemStatus::NotDetected))
        .collect();

    for (tag, status) in statuses.iter_mut() {
        let mut members = records
            .iter()
            .filter(|r| r.job_name.starts_with(tag.prefix()))
            .peekable();

        if members.peek().is_none() {
            continue;
        }

        *status = if members.any(|r| is_active_state(&r.state)) {
            SubsystemStatus::Active
        } else {
            SubsystemStatus::Inactive
        };

        tracing::debug!(subsystem = %tag, status = %status, "Subsystem status derived");
    }

    statuses
}

fn is_active_state(state: &str) -> bool {
    constants::ACTIVE_SUBSYSTEM_STATES.contains(&state)
}
