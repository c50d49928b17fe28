use super::{conflicts, util, SchedError, Scheduler};
use crate::model::{
    AssignmentId, ShiftAssignment, ShiftDraft, ShiftPatch, ShiftStatus, StaffId,
};
use crate::repository::AssignmentRepository;
use tracing::debug;

pub(super) fn create<R: AssignmentRepository + ?Sized>(
    scheduler: &mut Scheduler<'_, R>,
    actor: &StaffId,
    draft: ShiftDraft,
) -> Result<ShiftAssignment, SchedError> {
    let position = util::active_position(scheduler.directory, &draft.position)?;
    util::active_staff(scheduler.directory, &draft.staff)?;
    util::ensure_time_range(draft.start, draft.end)?;

    let now = scheduler.clock.now();
    let record = ShiftAssignment {
        id: AssignmentId::random(),
        is_emergency: draft.is_emergency.unwrap_or(position.is_emergency),
        position: draft.position,
        staff: draft.staff,
        start: draft.start,
        end: draft.end,
        status: draft.status.unwrap_or(ShiftStatus::Draft),
        notes: draft.notes,
        created_by: actor.clone(),
        created_at: now,
        updated_at: now,
    };

    let existing = scheduler.repo.for_staff(&record.staff)?;
    conflicts::check(&record, &existing, scheduler.opts.zone)?;

    scheduler.repo.insert(record.clone())?;
    debug!(id = %record.id, staff = %record.staff, actor = %actor, "assignment created");
    Ok(record)
}

pub(super) fn update<R: AssignmentRepository + ?Sized>(
    scheduler: &mut Scheduler<'_, R>,
    actor: &StaffId,
    id: &AssignmentId,
    patch: ShiftPatch,
) -> Result<ShiftAssignment, SchedError> {
    let current = scheduler
        .repo
        .get(id)?
        .ok_or_else(|| util::not_found_assignment(id))?;

    let moves = patch.moves_assignment();
    let mut merged = current.clone();

    if let Some(next) = patch.status {
        if !current.status.can_become(next) {
            return Err(SchedError::transition(current.status, next));
        }
        merged.status = next;
    }
    if let Some(position) = patch.position {
        util::active_position(scheduler.directory, &position)?;
        merged.position = position;
    }
    if let Some(staff) = patch.staff {
        util::active_staff(scheduler.directory, &staff)?;
        merged.staff = staff;
    }
    if let Some(start) = patch.start {
        merged.start = start;
    }
    if let Some(end) = patch.end {
        merged.end = end;
    }
    if let Some(flag) = patch.is_emergency {
        merged.is_emergency = flag;
    }
    if let Some(notes) = patch.notes {
        merged.notes = Some(notes);
    }
    util::ensure_time_range(merged.start, merged.end)?;

    if moves {
        let existing = scheduler.repo.for_staff(&merged.staff)?;
        conflicts::check(&merged, &existing, scheduler.opts.zone)?;
    }

    merged.updated_at = scheduler.clock.now();
    scheduler.repo.replace(merged.clone())?;
    debug!(id = %merged.id, status = %merged.status, actor = %actor, "assignment updated");
    Ok(merged)
}

pub(super) fn delete<R: AssignmentRepository + ?Sized>(
    scheduler: &mut Scheduler<'_, R>,
    actor: &StaffId,
    id: &AssignmentId,
) -> Result<ShiftAssignment, SchedError> {
    let removed = scheduler
        .repo
        .remove(id)?
        .ok_or_else(|| util::not_found_assignment(id))?;
    debug!(id = %removed.id, actor = %actor, "assignment deleted");
    Ok(removed)
}

pub(super) fn check_reassignment<R: AssignmentRepository + ?Sized>(
    scheduler: &Scheduler<'_, R>,
    shift: &AssignmentId,
    receiver: &StaffId,
) -> Result<(), SchedError> {
    let mut candidate = scheduler
        .repo
        .get(shift)?
        .ok_or_else(|| util::not_found_assignment(shift))?;
    util::active_staff(scheduler.directory, receiver)?;

    candidate.staff = receiver.clone();
    let existing = scheduler.repo.for_staff(receiver)?;
    conflicts::check(&candidate, &existing, scheduler.opts.zone)?;
    Ok(())
}
