use super::SchedError;
use crate::calendar::CalendarZone;
use crate::model::{
    AssignmentId, Directory, DutyPosition, PositionId, ShiftAssignment, StaffId, StaffMember,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use std::collections::HashSet;

pub(super) fn active_position<'d>(
    directory: &'d Directory,
    id: &PositionId,
) -> Result<&'d DutyPosition, SchedError> {
    let position = directory
        .find_position(id)
        .ok_or_else(|| SchedError::not_found("position", id))?;
    if !position.active {
        return Err(SchedError::ValidationFailed(format!(
            "position {id} is inactive"
        )));
    }
    Ok(position)
}

pub(super) fn active_staff<'d>(
    directory: &'d Directory,
    id: &StaffId,
) -> Result<&'d StaffMember, SchedError> {
    let member = directory
        .find_staff(id)
        .ok_or_else(|| SchedError::not_found("staff member", id))?;
    if !member.active {
        return Err(SchedError::ValidationFailed(format!(
            "staff member {id} is inactive"
        )));
    }
    Ok(member)
}

pub(super) fn ensure_time_range(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), SchedError> {
    if end <= start {
        return Err(SchedError::ValidationFailed(
            "end must be strictly after start".to_string(),
        ));
    }
    Ok(())
}

pub(super) fn not_found_assignment(id: &AssignmentId) -> SchedError {
    SchedError::not_found("assignment", id)
}

pub(super) fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Le service a-t-il déjà une garde (non annulée) ce jour-là, sur l'un de
/// ses postes ?
pub(super) fn department_day_taken<'a>(
    assignments: impl IntoIterator<Item = &'a ShiftAssignment>,
    department_positions: &HashSet<&PositionId>,
    date: NaiveDate,
    zone: CalendarZone,
) -> bool {
    assignments.into_iter().any(|a| {
        a.status.blocks_day()
            && department_positions.contains(&a.position)
            && zone.date_of(a.start) == date
    })
}
