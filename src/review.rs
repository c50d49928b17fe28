//! Demandes (congé, échange, préférence) et leur circuit de validation.
//!
//! `pending → approved | rejected | cancelled`, sans retour. Seule la revue
//! renseigne `reviewed_by`, `reviewed_at` et `review_notes`. Le demandeur
//! peut modifier sa demande tant qu'elle est en attente, et la supprimer
//! tant qu'elle n'a pas été tranchée.

use crate::calendar::{Clock, SystemClock};
use crate::model::{
    AssignmentId, Decision, Request, RequestDraft, RequestId, RequestKind, RequestPatch,
    RequestReviewInput, RequestStatus, StaffId,
};
use crate::repository::{AssignmentRepository, RequestStore};
use crate::scheduler::{SchedError, Scheduler};
use chrono::NaiveDate;
use tracing::{debug, info};

pub struct ReviewDesk<'a, S: RequestStore + ?Sized> {
    store: &'a mut S,
    clock: Box<dyn Clock + 'a>,
}

impl<'a, S: RequestStore + ?Sized> ReviewDesk<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self {
            store,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock<C: Clock + 'a>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Dépose une demande au nom de `actor`, en attente de revue.
    pub fn submit(&mut self, actor: &StaffId, draft: RequestDraft) -> Result<Request, SchedError> {
        check_fields(
            actor,
            draft.kind,
            draft.start_date,
            draft.end_date,
            draft.swap_shift.as_ref(),
            draft.swap_with.as_ref(),
        )?;

        let now = self.clock.now();
        let request = Request {
            id: RequestId::random(),
            requester: actor.clone(),
            kind: draft.kind,
            status: RequestStatus::Pending,
            start_date: draft.start_date,
            end_date: draft.end_date,
            reason: draft.reason,
            swap_shift: draft.swap_shift,
            swap_with: draft.swap_with,
            created_at: now,
            updated_at: now,
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
        };
        self.store.insert(request.clone())?;
        debug!(id = %request.id, requester = %actor, "request submitted");
        Ok(request)
    }

    /// Statue sur une demande en attente.
    ///
    /// L'approbation d'un échange nommant un destinataire revalide la garde
    /// chez celui-ci ; en cas de conflit l'approbation échoue avec ce conflit
    /// et la demande reste en attente. L'échange lui-même n'est pas exécuté.
    pub fn review<R: AssignmentRepository + ?Sized>(
        &mut self,
        reviewer: &StaffId,
        input: RequestReviewInput,
        scheduler: &Scheduler<'_, R>,
    ) -> Result<Request, SchedError> {
        let mut request = self.load_pending(&input.request, input.decision.outcome())?;

        if input.decision == Decision::Approve && request.kind == RequestKind::Swap {
            validate_swap(&request, scheduler)?;
        }

        let now = self.clock.now();
        request.status = input.decision.outcome();
        request.reviewed_by = Some(reviewer.clone());
        request.reviewed_at = Some(now);
        request.review_notes = input.notes;
        request.updated_at = now;

        self.store.replace(request.clone())?;
        info!(id = %request.id, status = %request.status, reviewer = %reviewer, "request reviewed");
        Ok(request)
    }

    /// Retire une demande en attente ; réservé au demandeur.
    pub fn withdraw(&mut self, actor: &StaffId, id: &RequestId) -> Result<Request, SchedError> {
        let mut request = self.load_pending(id, RequestStatus::Cancelled)?;
        ensure_requester(&request, actor, "withdraw")?;

        request.status = RequestStatus::Cancelled;
        request.updated_at = self.clock.now();
        self.store.replace(request.clone())?;
        debug!(id = %request.id, "request withdrawn");
        Ok(request)
    }

    /// Modifie une demande en attente ; réservé au demandeur. Les champs de
    /// revue ne sont jamais touchés.
    pub fn amend(
        &mut self,
        actor: &StaffId,
        id: &RequestId,
        patch: RequestPatch,
    ) -> Result<Request, SchedError> {
        let mut request = self.load_pending(id, RequestStatus::Pending)?;
        ensure_requester(&request, actor, "amend")?;

        if let Some(start) = patch.start_date {
            request.start_date = start;
        }
        if let Some(end) = patch.end_date {
            request.end_date = end;
        }
        if let Some(reason) = patch.reason {
            request.reason = Some(reason);
        }
        if let Some(shift) = patch.swap_shift {
            request.swap_shift = Some(shift);
        }
        if let Some(with) = patch.swap_with {
            request.swap_with = Some(with);
        }
        check_fields(
            &request.requester,
            request.kind,
            request.start_date,
            request.end_date,
            request.swap_shift.as_ref(),
            request.swap_with.as_ref(),
        )?;

        request.updated_at = self.clock.now();
        self.store.replace(request.clone())?;
        debug!(id = %request.id, "request amended");
        Ok(request)
    }

    /// Supprime une demande du demandeur. Une demande déjà tranchée
    /// (approuvée ou rejetée) reste au dossier.
    pub fn delete(&mut self, actor: &StaffId, id: &RequestId) -> Result<Request, SchedError> {
        let request = self
            .store
            .get(id)?
            .ok_or_else(|| SchedError::not_found("request", id))?;
        ensure_requester(&request, actor, "delete")?;
        if request.reviewed_by.is_some() {
            return Err(SchedError::ValidationFailed(format!(
                "request {id} was reviewed ({}) and cannot be deleted",
                request.status
            )));
        }

        let removed = self
            .store
            .remove(id)?
            .ok_or_else(|| SchedError::not_found("request", id))?;
        debug!(id = %removed.id, actor = %actor, "request deleted");
        Ok(removed)
    }

    /// Demandes en attente, les plus anciennes d'abord.
    pub fn pending(&self) -> Result<Vec<Request>, SchedError> {
        let mut out: Vec<Request> = self
            .store
            .all()?
            .into_iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .collect();
        out.sort_by_key(|r| r.created_at);
        Ok(out)
    }

    pub fn for_staff(&self, staff: &StaffId) -> Result<Vec<Request>, SchedError> {
        Ok(self
            .store
            .all()?
            .into_iter()
            .filter(|r| &r.requester == staff)
            .collect())
    }

    fn load_pending(&self, id: &RequestId, target: RequestStatus) -> Result<Request, SchedError> {
        let request = self
            .store
            .get(id)?
            .ok_or_else(|| SchedError::not_found("request", id))?;
        if request.status.is_terminal() {
            return Err(SchedError::transition(request.status, target));
        }
        Ok(request)
    }
}

fn check_fields(
    requester: &StaffId,
    kind: RequestKind,
    start_date: NaiveDate,
    end_date: NaiveDate,
    swap_shift: Option<&AssignmentId>,
    swap_with: Option<&StaffId>,
) -> Result<(), SchedError> {
    if end_date < start_date {
        return Err(SchedError::ValidationFailed(
            "request end date is before its start date".to_string(),
        ));
    }
    if kind == RequestKind::Swap && swap_shift.is_none() {
        return Err(SchedError::ValidationFailed(
            "swap request must name the offered shift".to_string(),
        ));
    }
    if swap_with == Some(requester) {
        return Err(SchedError::ValidationFailed(
            "cannot swap a shift with oneself".to_string(),
        ));
    }
    Ok(())
}

fn ensure_requester(request: &Request, actor: &StaffId, action: &str) -> Result<(), SchedError> {
    if &request.requester != actor {
        return Err(SchedError::ValidationFailed(format!(
            "only {} may {action} request {}",
            request.requester, request.id
        )));
    }
    Ok(())
}

fn validate_swap<R: AssignmentRepository + ?Sized>(
    request: &Request,
    scheduler: &Scheduler<'_, R>,
) -> Result<(), SchedError> {
    let Some(shift_id) = request.swap_shift.as_ref() else {
        return Err(SchedError::ValidationFailed(
            "swap request has no offered shift".to_string(),
        ));
    };
    let shift = scheduler
        .assignments()?
        .into_iter()
        .find(|a| &a.id == shift_id)
        .ok_or_else(|| SchedError::not_found("assignment", shift_id))?;

    if shift.staff != request.requester {
        return Err(SchedError::ValidationFailed(format!(
            "shift {shift_id} is not assigned to {}",
            request.requester
        )));
    }
    if !shift.status.blocks_day() {
        return Err(SchedError::ValidationFailed(format!(
            "shift {shift_id} is cancelled"
        )));
    }

    // sans destinataire, la garde est proposée aux volontaires
    match request.swap_with.as_ref() {
        Some(receiver) => scheduler.check_reassignment(shift_id, receiver),
        None => Ok(()),
    }
}
