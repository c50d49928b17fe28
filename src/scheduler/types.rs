use crate::calendar::CalendarZone;
use crate::model::{AssignmentId, DepartmentId, StaffId};
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Options du moteur
#[derive(Debug, Clone, Copy)]
pub struct SchedulerOptions {
    /// Fuseau de référence pour les comparaisons au jour près.
    pub zone: CalendarZone,
    /// Heure de prise de garde des affectations générées (heure locale).
    pub duty_start: NaiveTime,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            zone: CalendarZone::utc(),
            duty_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// deux gardes le même jour
    DoubleBooking,
    /// garde le lendemain d'une autre
    MissingRestDay,
}

/// Violation d'une règle dure entre `candidate` et `existing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub staff: StaffId,
    /// Jour de début de la garde candidate.
    pub date: NaiveDate,
    pub existing: AssignmentId,
    pub candidate: AssignmentId,
}

/// Discriminant stable des erreurs, pour les couches d'affichage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DoubleBooking,
    MissingRestDay,
    NotFound,
    InvalidTransition,
    NoEligibleStaff,
    ValidationFailed,
    Storage,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("{staff} already has a shift on {date} (assignment {conflicting})")]
    DoubleBooking {
        staff: StaffId,
        date: NaiveDate,
        conflicting: AssignmentId,
    },
    #[error("{staff} needs a rest day on {date} after assignment {previous}")]
    MissingRestDay {
        staff: StaffId,
        date: NaiveDate,
        previous: AssignmentId,
    },
    #[error("unknown {entity}: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("no eligible staff in department {0}")]
    NoEligibleStaff(DepartmentId),
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SchedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchedError::DoubleBooking { .. } => ErrorKind::DoubleBooking,
            SchedError::MissingRestDay { .. } => ErrorKind::MissingRestDay,
            SchedError::NotFound { .. } => ErrorKind::NotFound,
            SchedError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            SchedError::NoEligibleStaff(_) => ErrorKind::NoEligibleStaff,
            SchedError::ValidationFailed(_) => ErrorKind::ValidationFailed,
            SchedError::Other(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        SchedError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn transition(from: impl ToString, to: impl ToString) -> Self {
        SchedError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl From<Conflict> for SchedError {
    fn from(c: Conflict) -> Self {
        match c.kind {
            ConflictKind::DoubleBooking => SchedError::DoubleBooking {
                staff: c.staff,
                date: c.date,
                conflicting: c.existing,
            },
            ConflictKind::MissingRestDay => SchedError::MissingRestDay {
                staff: c.staff,
                date: c.date,
                previous: c.existing,
            },
        }
    }
}
