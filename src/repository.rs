//! Dépôts injectés dans le moteur : affectations et demandes.
//!
//! Le moteur ne garde aucun état entre deux opérations ; chaque validation
//! relit l'état courant du dépôt avant d'écrire.

use crate::model::{AssignmentId, Request, RequestId, ShiftAssignment, StaffId};
use anyhow::bail;
use serde::{Deserialize, Serialize};

pub trait AssignmentRepository {
    /// Toutes les affectations, dans l'ordre d'insertion.
    fn all(&self) -> anyhow::Result<Vec<ShiftAssignment>>;

    fn get(&self, id: &AssignmentId) -> anyhow::Result<Option<ShiftAssignment>>;

    /// Affectations d'une personne (toutes, annulées comprises).
    fn for_staff(&self, staff: &StaffId) -> anyhow::Result<Vec<ShiftAssignment>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|a| &a.staff == staff)
            .collect())
    }

    fn insert(&mut self, assignment: ShiftAssignment) -> anyhow::Result<()>;

    /// Remplace l'enregistrement de même id.
    fn replace(&mut self, assignment: ShiftAssignment) -> anyhow::Result<()>;

    fn remove(&mut self, id: &AssignmentId) -> anyhow::Result<Option<ShiftAssignment>>;

    /// Insère un lot d'un seul tenant (génération).
    fn insert_all(&mut self, batch: Vec<ShiftAssignment>) -> anyhow::Result<()> {
        for assignment in batch {
            self.insert(assignment)?;
        }
        Ok(())
    }
}

pub trait RequestStore {
    fn all(&self) -> anyhow::Result<Vec<Request>>;
    fn get(&self, id: &RequestId) -> anyhow::Result<Option<Request>>;
    fn insert(&mut self, request: Request) -> anyhow::Result<()>;
    fn replace(&mut self, request: Request) -> anyhow::Result<()>;
    fn remove(&mut self, id: &RequestId) -> anyhow::Result<Option<Request>>;
}

/// Dépôt d'affectations en mémoire (sérialisé tel quel dans le ledger).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryAssignments {
    items: Vec<ShiftAssignment>,
}

impl InMemoryAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[ShiftAssignment] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<ShiftAssignment>> for InMemoryAssignments {
    fn from(items: Vec<ShiftAssignment>) -> Self {
        Self { items }
    }
}

impl AssignmentRepository for InMemoryAssignments {
    fn all(&self) -> anyhow::Result<Vec<ShiftAssignment>> {
        Ok(self.items.clone())
    }

    fn get(&self, id: &AssignmentId) -> anyhow::Result<Option<ShiftAssignment>> {
        Ok(self.items.iter().find(|a| &a.id == id).cloned())
    }

    fn for_staff(&self, staff: &StaffId) -> anyhow::Result<Vec<ShiftAssignment>> {
        Ok(self
            .items
            .iter()
            .filter(|a| &a.staff == staff)
            .cloned()
            .collect())
    }

    fn insert(&mut self, assignment: ShiftAssignment) -> anyhow::Result<()> {
        if self.items.iter().any(|a| a.id == assignment.id) {
            bail!("duplicate assignment id {}", assignment.id);
        }
        self.items.push(assignment);
        Ok(())
    }

    fn replace(&mut self, assignment: ShiftAssignment) -> anyhow::Result<()> {
        match self.items.iter_mut().find(|a| a.id == assignment.id) {
            Some(slot) => {
                *slot = assignment;
                Ok(())
            }
            None => bail!("no assignment {} to replace", assignment.id),
        }
    }

    fn remove(&mut self, id: &AssignmentId) -> anyhow::Result<Option<ShiftAssignment>> {
        Ok(self
            .items
            .iter()
            .position(|a| &a.id == id)
            .map(|pos| self.items.remove(pos)))
    }

    fn insert_all(&mut self, batch: Vec<ShiftAssignment>) -> anyhow::Result<()> {
        if let Some(dup) = batch
            .iter()
            .find(|b| self.items.iter().any(|a| a.id == b.id))
        {
            bail!("duplicate assignment id {}", dup.id);
        }
        self.items.extend(batch);
        Ok(())
    }
}

/// Stock de demandes en mémoire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryRequests {
    items: Vec<Request>,
}

impl InMemoryRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Request] {
        &self.items
    }
}

impl RequestStore for InMemoryRequests {
    fn all(&self) -> anyhow::Result<Vec<Request>> {
        Ok(self.items.clone())
    }

    fn get(&self, id: &RequestId) -> anyhow::Result<Option<Request>> {
        Ok(self.items.iter().find(|r| &r.id == id).cloned())
    }

    fn insert(&mut self, request: Request) -> anyhow::Result<()> {
        if self.items.iter().any(|r| r.id == request.id) {
            bail!("duplicate request id {}", request.id);
        }
        self.items.push(request);
        Ok(())
    }

    fn replace(&mut self, request: Request) -> anyhow::Result<()> {
        match self.items.iter_mut().find(|r| r.id == request.id) {
            Some(slot) => {
                *slot = request;
                Ok(())
            }
            None => bail!("no request {} to replace", request.id),
        }
    }

    fn remove(&mut self, id: &RequestId) -> anyhow::Result<Option<Request>> {
        Ok(self
            .items
            .iter()
            .position(|r| &r.id == id)
            .map(|pos| self.items.remove(pos)))
    }
}
