#![allow(dead_code)]
use chrono::{DateTime, Duration, TimeZone, Utc};
use garde::{
    Department, DepartmentId, Directory, DutyPosition, FixedClock, PositionId, ShiftDraft,
    StaffId, StaffMember, StaffRole,
};

/// Annuaire de test :
/// - cardiologie : alice, bob, carol (actifs, dans cet ordre), eve (inactive)
/// - urgences : dan, poste d'urgence
/// - pédiatrie : un poste, personne d'actif
pub struct Fixture {
    pub directory: Directory,
    pub cardio: DepartmentId,
    pub er: DepartmentId,
    pub pediatrics: DepartmentId,
    pub cardio_room: PositionId,
    pub er_room: PositionId,
    pub alice: StaffId,
    pub bob: StaffId,
    pub carol: StaffId,
    pub dan: StaffId,
    pub eve: StaffId,
    pub admin: StaffId,
}

fn department(id: &str, name: &str) -> Department {
    let mut d = Department::new(name);
    d.id = DepartmentId::new(id);
    d
}

fn member(id: &str, name: &str, department: &DepartmentId) -> StaffMember {
    let mut m = StaffMember::new(name, department.clone());
    m.id = StaffId::new(id);
    m
}

fn position(id: &str, department: &DepartmentId, is_emergency: bool) -> DutyPosition {
    let mut p = DutyPosition::new(id, department.clone(), is_emergency);
    p.id = PositionId::new(id);
    p
}

pub fn fixture() -> Fixture {
    let admin_dept = department("admin", "Administration");
    let cardio = department("cardio", "Cardiology");
    let er = department("er", "Emergency Department");
    let pediatrics = department("peds", "Pediatrics");

    let mut admin = member("admin", "Admin User", &admin_dept.id);
    admin.role = StaffRole::Administrator;
    let mut eve = member("eve", "Eve", &cardio.id);
    eve.active = false;
    let mut nobody = member("paul", "Paul", &pediatrics.id);
    nobody.active = false;

    let staff = vec![
        admin,
        member("alice", "Alice", &cardio.id),
        member("dan", "Dan", &er.id),
        member("bob", "Bob", &cardio.id),
        eve,
        member("carol", "Carol", &cardio.id),
        nobody,
    ];

    let positions = vec![
        position("er-1", &er.id, true),
        position("cardio-oncall", &cardio.id, false),
        position("peds-oncall", &pediatrics.id, false),
    ];

    Fixture {
        cardio: cardio.id.clone(),
        er: er.id.clone(),
        pediatrics: pediatrics.id.clone(),
        directory: Directory {
            staff,
            departments: vec![admin_dept, cardio, er, pediatrics],
            positions,
        },
        cardio_room: PositionId::new("cardio-oncall"),
        er_room: PositionId::new("er-1"),
        alice: StaffId::new("alice"),
        bob: StaffId::new("bob"),
        carol: StaffId::new("carol"),
        dan: StaffId::new("dan"),
        eve: StaffId::new("eve"),
        admin: StaffId::new("admin"),
    }
}

/// 2025-07-`day` à `hour`:00 UTC.
pub fn july(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, day, hour, 0, 0).unwrap()
}

pub fn clock() -> FixedClock {
    FixedClock(july(1, 9))
}

/// Garde de 24h à partir du 2025-07-`day` 08:00 UTC.
pub fn draft(position: &PositionId, staff: &StaffId, day: u32) -> ShiftDraft {
    let start = july(day, 8);
    ShiftDraft {
        position: position.clone(),
        staff: staff.clone(),
        start,
        end: start + Duration::hours(24),
        is_emergency: None,
        status: None,
        notes: None,
    }
}
