use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifiant fort pour un membre du personnel
    StaffId
);
string_id!(
    /// Identifiant fort pour un service (clinique)
    DepartmentId
);
string_id!(
    /// Identifiant fort pour un poste de garde (« salle »)
    PositionId
);
string_id!(
    /// Identifiant fort pour une affectation
    AssignmentId
);
string_id!(
    /// Identifiant fort pour une demande
    RequestId
);

fn yes() -> bool {
    true
}

fn default_shift_hours() -> u32 {
    24
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Administrator,
    Staff,
}

/// Membre du personnel. Appartient à l'annuaire ; le moteur ne fait que lire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: StaffId,
    pub display_name: String,
    pub role: StaffRole,
    pub department: DepartmentId,
    #[serde(default = "yes")]
    pub active: bool,
}

impl StaffMember {
    pub fn new<D: Into<String>>(display_name: D, department: DepartmentId) -> Self {
        Self {
            id: StaffId::random(),
            display_name: display_name.into(),
            role: StaffRole::Staff,
            department,
            active: true,
        }
    }
}

/// Service hospitalier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    /// Durée d'une garde générée, en heures.
    #[serde(default = "default_shift_hours")]
    pub default_shift_hours: u32,
    #[serde(default = "yes")]
    pub requires_weekend_coverage: bool,
    #[serde(default = "yes")]
    pub active: bool,
}

impl Department {
    /// Durée maximale d'une garde générée.
    pub const MAX_SHIFT_HOURS: u32 = 72;

    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            id: DepartmentId::random(),
            name: name.into(),
            default_shift_hours: default_shift_hours(),
            requires_weekend_coverage: true,
            active: true,
        }
    }
}

/// Poste de garde (« salle ») rattaché à un service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyPosition {
    pub id: PositionId,
    pub name: String,
    pub department: DepartmentId,
    /// Une garde d'urgence impose un repos le lendemain.
    #[serde(default)]
    pub is_emergency: bool,
    #[serde(default = "yes")]
    pub active: bool,
}

impl DutyPosition {
    pub fn new<N: Into<String>>(name: N, department: DepartmentId, is_emergency: bool) -> Self {
        Self {
            id: PositionId::random(),
            name: name.into(),
            department,
            is_emergency,
            active: true,
        }
    }
}

/// Annuaire en lecture seule : personnel, services, postes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub staff: Vec<StaffMember>,
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub positions: Vec<DutyPosition>,
}

impl Directory {
    pub fn find_staff<'a>(&'a self, id: &StaffId) -> Option<&'a StaffMember> {
        self.staff.iter().find(|s| &s.id == id)
    }
    pub fn find_department<'a>(&'a self, id: &DepartmentId) -> Option<&'a Department> {
        self.departments.iter().find(|d| &d.id == id)
    }
    pub fn find_position<'a>(&'a self, id: &PositionId) -> Option<&'a DutyPosition> {
        self.positions.iter().find(|p| &p.id == id)
    }

    /// Personnel actif du service, dans l'ordre de l'annuaire.
    pub fn eligible_pool(&self, department: &DepartmentId) -> Vec<&StaffMember> {
        self.staff
            .iter()
            .filter(|s| s.active && &s.department == department)
            .collect()
    }

    pub fn positions_of<'a>(
        &'a self,
        department: &'a DepartmentId,
    ) -> impl Iterator<Item = &'a DutyPosition> + 'a {
        self.positions.iter().filter(move |p| &p.department == department)
    }
}

/// Cycle de vie d'une affectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Draft,
    Published,
    Completed,
    Cancelled,
}

impl ShiftStatus {
    /// Transitions : `draft → published → completed`, `draft|published →
    /// cancelled`. Rester dans le même état est toujours permis.
    pub fn can_become(self, next: ShiftStatus) -> bool {
        use ShiftStatus::*;
        self == next
            || matches!(
                (self, next),
                (Draft, Published) | (Published, Completed) | (Draft | Published, Cancelled)
            )
    }

    /// Une garde annulée libère la journée.
    pub fn blocks_day(self) -> bool {
        self != ShiftStatus::Cancelled
    }
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShiftStatus::Draft => "draft",
            ShiftStatus::Published => "published",
            ShiftStatus::Completed => "completed",
            ShiftStatus::Cancelled => "cancelled",
        })
    }
}

/// Affectation d'un membre du personnel à un poste (UTC, `[start, end)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    pub id: AssignmentId,
    pub position: PositionId,
    pub staff: StaffId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub is_emergency: bool,
    pub status: ShiftStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_by: StaffId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShiftAssignment {
    /// Durée en minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Entrée de création d'une affectation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftDraft {
    pub position: PositionId,
    pub staff: StaffId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// `None` : reprend le drapeau du poste.
    #[serde(default)]
    pub is_emergency: Option<bool>,
    #[serde(default)]
    pub status: Option<ShiftStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Modification partielle d'une affectation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftPatch {
    #[serde(default)]
    pub position: Option<PositionId>,
    #[serde(default)]
    pub staff: Option<StaffId>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_emergency: Option<bool>,
    #[serde(default)]
    pub status: Option<ShiftStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ShiftPatch {
    pub fn status(status: ShiftStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Le patch déplace-t-il la garde (personne ou date) ?
    pub fn moves_assignment(&self) -> bool {
        self.staff.is_some() || self.start.is_some()
    }
}

/// Demande de génération d'un planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleGenRequest {
    pub department: DepartmentId,
    pub start_date: NaiveDate,
    pub num_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Leave,
    Swap,
    Preference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        self != RequestStatus::Pending
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Cancelled => "cancelled",
        })
    }
}

/// Demande de congé, d'échange ou de préférence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub requester: StaffId,
    pub kind: RequestKind,
    pub status: RequestStatus,
    /// Plage de jours inclusive.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_shift: Option<AssignmentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_with: Option<StaffId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<StaffId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
}

/// Entrée de création d'une demande.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDraft {
    pub kind: RequestKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub swap_shift: Option<AssignmentId>,
    #[serde(default)]
    pub swap_with: Option<StaffId>,
}

/// Modification d'une demande encore en attente. Le type de demande ne
/// change pas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestPatch {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub swap_shift: Option<AssignmentId>,
    #[serde(default)]
    pub swap_with: Option<StaffId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn outcome(self) -> RequestStatus {
        match self {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestReviewInput {
    pub request: RequestId,
    pub decision: Decision,
    #[serde(default)]
    pub notes: Option<String>,
}
