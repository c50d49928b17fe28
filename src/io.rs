use crate::calendar::CalendarZone;
use crate::model::{
    Department, DepartmentId, Directory, DutyPosition, PositionId, StaffId, StaffMember, StaffRole,
};
use crate::scheduler::SchedulerOptions;
use crate::storage::Ledger;
use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Import du personnel depuis CSV: header `id,display_name,role,department[,active]`
pub fn import_staff_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<StaffMember>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = required(&rec, 0, "id")?;
        let display = required(&rec, 1, "display_name")?;
        let role = parse_role(required(&rec, 2, "role")?)
            .with_context(|| format!("invalid role for staff {id}"))?;
        let department = required(&rec, 3, "department")?;
        let active = optional_bool(&rec, 4)
            .with_context(|| format!("invalid active value for staff {id}"))?
            .unwrap_or(true);
        out.push(StaffMember {
            id: StaffId::new(id),
            display_name: display.to_string(),
            role,
            department: DepartmentId::new(department),
            active,
        });
    }
    Ok(out)
}

/// Import des services: header
/// `id,name[,default_shift_hours][,requires_weekend_coverage][,active]`
pub fn import_departments_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Department>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = required(&rec, 0, "id")?;
        let name = required(&rec, 1, "name")?;
        let mut department = Department::new(name);
        department.id = DepartmentId::new(id);
        if let Some(raw) = rec.get(2).map(str::trim).filter(|s| !s.is_empty()) {
            let hours: u32 = raw
                .parse()
                .with_context(|| format!("invalid default_shift_hours for department {id}"))?;
            if hours == 0 || hours > Department::MAX_SHIFT_HOURS {
                bail!(
                    "default_shift_hours must be within 1..={} for department {id}",
                    Department::MAX_SHIFT_HOURS
                );
            }
            department.default_shift_hours = hours;
        }
        if let Some(flag) = optional_bool(&rec, 3)? {
            department.requires_weekend_coverage = flag;
        }
        if let Some(flag) = optional_bool(&rec, 4)? {
            department.active = flag;
        }
        out.push(department);
    }
    Ok(out)
}

/// Import des postes de garde: header `id,name,department,is_emergency[,active]`
pub fn import_positions_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<DutyPosition>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = required(&rec, 0, "id")?;
        let name = required(&rec, 1, "name")?;
        let department = required(&rec, 2, "department")?;
        let is_emergency = parse_bool(required(&rec, 3, "is_emergency")?)
            .with_context(|| format!("invalid is_emergency value for position {id}"))?;
        let mut position = DutyPosition::new(name, DepartmentId::new(department), is_emergency);
        position.id = PositionId::new(id);
        if let Some(flag) = optional_bool(&rec, 4)? {
            position.active = flag;
        }
        out.push(position);
    }
    Ok(out)
}

fn required<'r>(rec: &'r StringRecord, idx: usize, field: &str) -> anyhow::Result<&'r str> {
    let value = rec
        .get(idx)
        .with_context(|| format!("missing {field}"))?
        .trim();
    if value.is_empty() {
        bail!("empty {field}");
    }
    Ok(value)
}

fn optional_bool(rec: &StringRecord, idx: usize) -> anyhow::Result<Option<bool>> {
    match rec.get(idx).map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_bool(raw).map(Some),
        None => Ok(None),
    }
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" => Ok(true),
        "false" | "0" | "no" | "n" | "non" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

fn parse_role(s: &str) -> anyhow::Result<StaffRole> {
    match s.to_ascii_lowercase().as_str() {
        "admin" | "administrator" => Ok(StaffRole::Administrator),
        "staff" | "user" => Ok(StaffRole::Staff),
        _ => bail!("expected admin or staff"),
    }
}

/// Instant RFC3339, ou date seule `YYYY-MM-DD` prise à `default_time` dans
/// le fuseau de référence.
pub fn parse_instant(
    raw: &str,
    zone: CalendarZone,
    default_time: NaiveTime,
) -> anyhow::Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date/datetime: {raw}"))?;
    Ok(zone.start_of(date, default_time))
}

/// Export JSON du ledger (jolie mise en forme)
pub fn export_ledger_json<P: AsRef<Path>>(path: P, ledger: &Ledger) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(ledger)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des affectations:
/// header `id,position,staff,staff_name,start,end,emergency,status`
pub fn export_assignments_csv<P: AsRef<Path>>(path: P, ledger: &Ledger) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_assignments_csv(file, ledger)
}

/// Même format que [`export_assignments_csv`], vers n'importe quel flux.
pub fn write_assignments_csv<W: std::io::Write>(writer: W, ledger: &Ledger) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(false).from_writer(writer);
    w.write_record([
        "id",
        "position",
        "staff",
        "staff_name",
        "start",
        "end",
        "emergency",
        "status",
    ])?;
    for a in ledger.assignments.as_slice() {
        let name = staff_name(&ledger.directory, &a.staff);
        let start = a.start.to_rfc3339();
        let end = a.end.to_rfc3339();
        let status = a.status.to_string();
        w.write_record([
            a.id.as_str(),
            a.position.as_str(),
            a.staff.as_str(),
            name,
            start.as_str(),
            end.as_str(),
            if a.is_emergency { "true" } else { "false" },
            status.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn staff_name<'d>(directory: &'d Directory, id: &StaffId) -> &'d str {
    directory
        .find_staff(id)
        .map(|s| s.display_name.as_str())
        .unwrap_or("")
}

/// Fichier d'options du moteur (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsFile {
    /// Décalage du fuseau de référence, en minutes à l'est d'UTC.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_duty_start")]
    pub duty_start: NaiveTime,
}

impl Default for OptionsFile {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            duty_start: default_duty_start(),
        }
    }
}

fn default_duty_start() -> NaiveTime {
    SchedulerOptions::default().duty_start
}

impl OptionsFile {
    pub fn into_options(self) -> anyhow::Result<SchedulerOptions> {
        let zone = CalendarZone::from_offset_minutes(self.utc_offset_minutes)
            .with_context(|| format!("utc offset out of range: {}", self.utc_offset_minutes))?;
        Ok(SchedulerOptions {
            zone,
            duty_start: self.duty_start,
        })
    }
}

pub fn load_options<P: AsRef<Path>>(path: P) -> anyhow::Result<SchedulerOptions> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading options {}", path.display()))?;
    let file: OptionsFile = serde_json::from_slice(&data)
        .with_context(|| format!("parsing options {}", path.display()))?;
    file.into_options()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_instant_accepts_rfc3339_and_plain_dates() {
        let zone = CalendarZone::from_offset_minutes(60).unwrap();
        let eight = NaiveTime::from_hms_opt(8, 0, 0).unwrap();

        let explicit = parse_instant("2025-07-10T20:00:00+02:00", zone, eight).unwrap();
        assert_eq!(explicit, Utc.with_ymd_and_hms(2025, 7, 10, 18, 0, 0).unwrap());

        let plain = parse_instant("2025-07-10", zone, eight).unwrap();
        assert_eq!(plain, Utc.with_ymd_and_hms(2025, 7, 10, 7, 0, 0).unwrap());

        assert!(parse_instant("10/07/2025", zone, eight).is_err());
    }

    #[test]
    fn options_file_defaults_and_bounds() {
        let file: OptionsFile = serde_json::from_str("{}").unwrap();
        let opts = file.into_options().unwrap();
        assert_eq!(opts.zone, CalendarZone::utc());
        assert_eq!(opts.duty_start, NaiveTime::from_hms_opt(8, 0, 0).unwrap());

        let bad = OptionsFile {
            utc_offset_minutes: 25 * 60,
            ..OptionsFile::default()
        };
        assert!(bad.into_options().is_err());
    }

    #[test]
    fn booleans_accept_french_and_english() {
        assert!(parse_bool("Oui").unwrap());
        assert!(!parse_bool("no").unwrap());
        assert!(parse_bool("peut-être").is_err());
        assert_eq!(parse_role("Admin").unwrap(), StaffRole::Administrator);
    }
}
