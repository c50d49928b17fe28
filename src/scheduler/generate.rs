use super::{conflicts, util, SchedError, Scheduler};
use crate::calendar;
use crate::model::{
    AssignmentId, Department, PositionId, ScheduleGenRequest, ShiftAssignment, ShiftStatus,
    StaffId,
};
use crate::repository::AssignmentRepository;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Génère un brouillon de planning pour un service, un jour après l'autre.
///
/// Affectation round-robin (`offset % pool`) sur le personnel actif du
/// service. Les jours déjà couverts, ou dont la candidate viole une règle,
/// sont sautés sans erreur. Rien n'est écrit si le service n'a personne :
/// les candidates sont mises de côté et insérées d'un bloc à la fin.
pub(super) fn generate_schedule<R: AssignmentRepository + ?Sized>(
    scheduler: &mut Scheduler<'_, R>,
    actor: &StaffId,
    request: &ScheduleGenRequest,
) -> Result<Vec<ShiftAssignment>, SchedError> {
    if request.num_days == 0 {
        return Ok(Vec::new());
    }

    let directory = scheduler.directory;
    let pool = directory.eligible_pool(&request.department);
    if pool.is_empty() {
        return Err(SchedError::NoEligibleStaff(request.department.clone()));
    }

    let department = directory
        .find_department(&request.department)
        .ok_or_else(|| SchedError::not_found("department", &request.department))?;
    if !department.active {
        return Err(SchedError::ValidationFailed(format!(
            "department {} is inactive",
            department.id
        )));
    }
    let shift_hours = department.default_shift_hours.max(1);
    if shift_hours > Department::MAX_SHIFT_HOURS {
        return Err(SchedError::ValidationFailed(format!(
            "department {} has default_shift_hours {} (max {})",
            department.id,
            shift_hours,
            Department::MAX_SHIFT_HOURS
        )));
    }
    let position = directory
        .positions_of(&request.department)
        .find(|p| p.active)
        .ok_or_else(|| {
            SchedError::ValidationFailed(format!(
                "department {} has no active duty position",
                department.id
            ))
        })?;
    let department_positions: HashSet<&PositionId> = directory
        .positions_of(&request.department)
        .map(|p| &p.id)
        .collect();

    let zone = scheduler.opts.zone;
    let now = scheduler.clock.now();
    let existing = scheduler.repo.all()?;
    let mut staged: Vec<ShiftAssignment> = Vec::new();

    for (offset, date) in calendar::days(request.start_date, request.num_days).enumerate() {
        if !department.requires_weekend_coverage && util::is_weekend(date) {
            debug!(%date, "weekend not covered, skipping");
            continue;
        }
        if util::department_day_taken(
            existing.iter().chain(staged.iter()),
            &department_positions,
            date,
            zone,
        ) {
            debug!(%date, department = %department.id, "day already covered, skipping");
            continue;
        }

        let assignee = pool[offset % pool.len()];
        let start = zone.start_of(date, scheduler.opts.duty_start);
        let end = calendar::plus_hours(start, shift_hours).ok_or_else(|| {
            SchedError::ValidationFailed(format!("shift starting {start} ends out of range"))
        })?;
        let candidate = ShiftAssignment {
            id: AssignmentId::random(),
            position: position.id.clone(),
            staff: assignee.id.clone(),
            start,
            end,
            is_emergency: position.is_emergency,
            status: ShiftStatus::Draft,
            notes: None,
            created_by: actor.clone(),
            created_at: now,
            updated_at: now,
        };

        match conflicts::check(&candidate, existing.iter().chain(staged.iter()), zone) {
            Ok(()) => staged.push(candidate),
            Err(conflict) => {
                warn!(
                    %date,
                    staff = %conflict.staff,
                    kind = ?conflict.kind,
                    "candidate rejected, day left open"
                );
            }
        }
    }

    scheduler.repo.insert_all(staged.clone())?;
    info!(
        department = %department.id,
        created = staged.len(),
        requested = request.num_days,
        "schedule generated"
    );
    Ok(staged)
}
