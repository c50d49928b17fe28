#![forbid(unsafe_code)]
//! Garde — moteur d'affectation des tableaux de garde hospitaliers.
//!
//! - Pas de double affectation le même jour, repos obligatoire le lendemain
//!   d'une garde (y compris après une garde d'urgence).
//! - Génération round-robin par service, sautant les jours déjà couverts.
//! - Demandes de congé / échange / préférence avec circuit de revue.
//! - Dépôts injectés ; stockage fichiers (JSON/CSV) fourni à côté.
//! - Instants en UTC ; comparaisons au jour près dans un fuseau de référence.

pub mod calendar;
pub mod io;
pub mod model;
pub mod repository;
pub mod review;
pub mod scheduler;
pub mod storage;

pub use calendar::{CalendarZone, Clock, FixedClock, SystemClock};
pub use model::{
    AssignmentId, Decision, Department, DepartmentId, Directory, DutyPosition, PositionId,
    Request, RequestDraft, RequestId, RequestKind, RequestPatch, RequestReviewInput,
    RequestStatus, ScheduleGenRequest, ShiftAssignment, ShiftDraft, ShiftPatch, ShiftStatus,
    StaffId, StaffMember, StaffRole,
};
pub use repository::{AssignmentRepository, InMemoryAssignments, InMemoryRequests, RequestStore};
pub use review::ReviewDesk;
pub use scheduler::{Conflict, ConflictKind, ErrorKind, SchedError, Scheduler, SchedulerOptions};
pub use storage::{JsonStorage, Ledger, Storage};
