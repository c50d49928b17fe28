mod assignment;
pub mod conflicts;
mod generate;
mod types;
mod util;

pub use types::{Conflict, ConflictKind, ErrorKind, SchedError, SchedulerOptions};

use crate::calendar::{Clock, SystemClock};
use crate::model::{
    AssignmentId, Directory, ScheduleGenRequest, ShiftAssignment, ShiftDraft, ShiftPatch,
    ShiftStatus, StaffId,
};
use crate::repository::AssignmentRepository;

/// Moteur d'affectation : valide puis écrit dans le dépôt emprunté.
///
/// Le dépôt est emprunté en `&mut` pour toute la durée d'une unité de
/// travail : lecture, validation et écriture ne peuvent pas s'entrelacer
/// avec un autre écrivain.
pub struct Scheduler<'a, R: AssignmentRepository + ?Sized> {
    repo: &'a mut R,
    directory: &'a Directory,
    opts: SchedulerOptions,
    clock: Box<dyn Clock + 'a>,
}

impl<'a, R: AssignmentRepository + ?Sized> Scheduler<'a, R> {
    pub fn new(repo: &'a mut R, directory: &'a Directory, opts: SchedulerOptions) -> Self {
        Self {
            repo,
            directory,
            opts,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock<C: Clock + 'a>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn options(&self) -> SchedulerOptions {
        self.opts
    }

    pub fn directory(&self) -> &Directory {
        self.directory
    }

    pub fn assignments(&self) -> Result<Vec<ShiftAssignment>, SchedError> {
        Ok(self.repo.all()?)
    }

    pub fn create_assignment(
        &mut self,
        actor: &StaffId,
        draft: ShiftDraft,
    ) -> Result<ShiftAssignment, SchedError> {
        assignment::create(self, actor, draft)
    }

    pub fn update_assignment(
        &mut self,
        actor: &StaffId,
        id: &AssignmentId,
        patch: ShiftPatch,
    ) -> Result<ShiftAssignment, SchedError> {
        assignment::update(self, actor, id, patch)
    }

    pub fn delete_assignment(
        &mut self,
        actor: &StaffId,
        id: &AssignmentId,
    ) -> Result<ShiftAssignment, SchedError> {
        assignment::delete(self, actor, id)
    }

    pub fn publish(
        &mut self,
        actor: &StaffId,
        id: &AssignmentId,
    ) -> Result<ShiftAssignment, SchedError> {
        self.update_assignment(actor, id, ShiftPatch::status(ShiftStatus::Published))
    }

    pub fn complete(
        &mut self,
        actor: &StaffId,
        id: &AssignmentId,
    ) -> Result<ShiftAssignment, SchedError> {
        self.update_assignment(actor, id, ShiftPatch::status(ShiftStatus::Completed))
    }

    pub fn cancel(
        &mut self,
        actor: &StaffId,
        id: &AssignmentId,
    ) -> Result<ShiftAssignment, SchedError> {
        self.update_assignment(actor, id, ShiftPatch::status(ShiftStatus::Cancelled))
    }

    pub fn generate_schedule(
        &mut self,
        actor: &StaffId,
        request: &ScheduleGenRequest,
    ) -> Result<Vec<ShiftAssignment>, SchedError> {
        generate::generate_schedule(self, actor, request)
    }

    /// Vérifie qu'une garde existante pourrait passer à `receiver` sans
    /// conflit. N'écrit rien.
    pub fn check_reassignment(
        &self,
        shift: &AssignmentId,
        receiver: &StaffId,
    ) -> Result<(), SchedError> {
        assignment::check_reassignment(self, shift, receiver)
    }

    /// Toutes les paires en infraction dans le dépôt.
    pub fn audit(&self) -> Result<Vec<Conflict>, SchedError> {
        let all = self.repo.all()?;
        Ok(conflicts::audit(&all, self.opts.zone))
    }
}
