use super::{Conflict, ConflictKind};
use crate::calendar::{self, CalendarZone};
use crate::model::{ShiftAssignment, StaffId};
use std::collections::BTreeMap;

/// Vérifie qu'une affectation candidate respecte les règles dures face à
/// `existing` : pas deux gardes le même jour, pas de garde le lendemain
/// d'une autre. Seules les gardes non annulées de la même personne (autre
/// id que la candidate) comptent. Le contrôle du repos ne regarde que la
/// veille, jamais le lendemain.
pub fn check<'a, I>(
    candidate: &ShiftAssignment,
    existing: I,
    zone: CalendarZone,
) -> Result<(), Conflict>
where
    I: IntoIterator<Item = &'a ShiftAssignment>,
{
    if !candidate.status.blocks_day() {
        return Ok(());
    }

    let day = zone.date_of(candidate.start);
    let peers: Vec<&ShiftAssignment> = existing
        .into_iter()
        .filter(|e| participates(e, candidate))
        .collect();

    if let Some(e) = peers.iter().find(|e| zone.date_of(e.start) == day) {
        return Err(conflict(ConflictKind::DoubleBooking, candidate, e, day));
    }

    if let Some(previous_day) = calendar::previous_day(day) {
        if let Some(e) = peers.iter().find(|e| zone.date_of(e.start) == previous_day) {
            return Err(conflict(ConflictKind::MissingRestDay, candidate, e, day));
        }
    }

    Ok(())
}

/// Parcourt un ensemble d'affectations et liste toutes les paires en
/// infraction (même jour ou repos manquant), personne par personne.
pub fn audit(assignments: &[ShiftAssignment], zone: CalendarZone) -> Vec<Conflict> {
    let mut by_staff: BTreeMap<&StaffId, Vec<&ShiftAssignment>> = BTreeMap::new();
    for a in assignments.iter().filter(|a| a.status.blocks_day()) {
        by_staff.entry(&a.staff).or_default().push(a);
    }

    let mut out = Vec::new();
    for shifts in by_staff.values_mut() {
        shifts.sort_by_key(|s| s.start);

        for (idx, a) in shifts.iter().enumerate() {
            let a_day = zone.date_of(a.start);
            for b in shifts.iter().skip(idx + 1) {
                let b_day = zone.date_of(b.start);
                let kind = if b_day == a_day {
                    ConflictKind::DoubleBooking
                } else if calendar::next_day(a_day) == Some(b_day) {
                    ConflictKind::MissingRestDay
                } else {
                    continue;
                };
                out.push(conflict(kind, b, a, b_day));
            }
        }
    }

    out
}

fn participates(existing: &ShiftAssignment, candidate: &ShiftAssignment) -> bool {
    existing.staff == candidate.staff
        && existing.status.blocks_day()
        && existing.id != candidate.id
}

fn conflict(
    kind: ConflictKind,
    candidate: &ShiftAssignment,
    existing: &ShiftAssignment,
    date: chrono::NaiveDate,
) -> Conflict {
    Conflict {
        kind,
        staff: candidate.staff.clone(),
        date,
        existing: existing.id.clone(),
        candidate: candidate.id.clone(),
    }
}
