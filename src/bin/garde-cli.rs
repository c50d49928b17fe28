#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use garde::{
    io,
    calendar,
    model::{
        AssignmentId, Decision, DepartmentId, PositionId, RequestDraft, RequestId, RequestKind,
        RequestPatch, RequestReviewInput, ScheduleGenRequest, ShiftDraft, ShiftPatch,
        ShiftStatus, StaffId,
    },
    review::ReviewDesk,
    scheduler::{ConflictKind, Scheduler, SchedulerOptions},
    storage::{JsonStorage, Storage},
    CalendarZone,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI du tableau de garde (ledger JSON local)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du ledger
    #[arg(long, global = true, default_value = "ledger.json")]
    ledger: String,

    /// Fichier JSON d'options du moteur
    #[arg(long, global = true)]
    options: Option<String>,

    /// Décalage du fuseau de référence en minutes (prioritaire sur --options)
    #[arg(long, global = true, allow_hyphen_values = true)]
    utc_offset: Option<i32>,

    /// Heure de prise de garde, HH:MM (prioritaire sur --options)
    #[arg(long, global = true)]
    duty_start: Option<String>,

    /// Identifiant de l'acteur (déjà authentifié)
    #[arg(long, global = true, default_value = "admin")]
    actor: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer le personnel depuis un CSV
    ImportStaff {
        #[arg(long)]
        csv: String,
    },

    /// Importer les services depuis un CSV
    ImportDepartments {
        #[arg(long)]
        csv: String,
    },

    /// Importer les postes de garde depuis un CSV
    ImportPositions {
        #[arg(long)]
        csv: String,
    },

    /// Créer une affectation
    CreateShift {
        #[arg(long)]
        position: String,
        #[arg(long)]
        staff: String,
        /// RFC3339 ou YYYY-MM-DD (heure de prise de garde)
        #[arg(long)]
        start: String,
        /// RFC3339 ou YYYY-MM-DD ; 24h après le début par défaut
        #[arg(long)]
        end: Option<String>,
        /// Force le drapeau urgence (sinon celui du poste)
        #[arg(long)]
        emergency: Option<bool>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Modifier une affectation (revalide si personne ou date changent)
    UpdateShift {
        #[arg(long)]
        id: String,
        #[arg(long)]
        staff: Option<String>,
        #[arg(long)]
        position: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Force le drapeau urgence
        #[arg(long)]
        emergency: Option<bool>,
        /// Nouveau statut (transitions contrôlées)
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },

    /// Supprimer une affectation
    DeleteShift {
        #[arg(long)]
        id: String,
    },

    /// Publier une affectation
    Publish {
        #[arg(long)]
        id: String,
    },

    /// Annuler une affectation (libère la journée)
    Cancel {
        #[arg(long)]
        id: String,
    },

    /// Marquer une affectation comme effectuée
    Complete {
        #[arg(long)]
        id: String,
    },

    /// Générer un brouillon de planning round-robin pour un service
    Generate {
        #[arg(long)]
        department: String,
        /// YYYY-MM-DD
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        days: u32,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Vérifier les conflits
    Check {
        /// Export CSV des conflits (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Déposer une demande au nom de l'acteur
    Request {
        #[arg(long, value_enum)]
        kind: KindArg,
        /// YYYY-MM-DD
        #[arg(long)]
        start: NaiveDate,
        /// YYYY-MM-DD ; le jour de début par défaut
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        reason: Option<String>,
        /// Garde proposée (échange)
        #[arg(long)]
        shift: Option<String>,
        /// Destinataire de l'échange
        #[arg(long)]
        with: Option<String>,
    },

    /// Statuer sur une demande en attente
    Review {
        #[arg(long)]
        id: String,
        #[arg(long, value_enum)]
        decision: DecisionArg,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Retirer une demande en attente
    Withdraw {
        #[arg(long)]
        id: String,
    },

    /// Modifier une demande en attente (demandeur uniquement)
    AmendRequest {
        #[arg(long)]
        id: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        shift: Option<String>,
        #[arg(long)]
        with: Option<String>,
    },

    /// Supprimer une demande non tranchée (demandeur uniquement)
    DeleteRequest {
        #[arg(long)]
        id: String,
    },

    /// Lister les demandes en attente
    Pending,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Leave,
    Swap,
    Preference,
}

impl From<KindArg> for RequestKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Leave => RequestKind::Leave,
            KindArg::Swap => RequestKind::Swap,
            KindArg::Preference => RequestKind::Preference,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StatusArg {
    Draft,
    Published,
    Completed,
    Cancelled,
}

impl From<StatusArg> for ShiftStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Draft => ShiftStatus::Draft,
            StatusArg::Published => ShiftStatus::Published,
            StatusArg::Completed => ShiftStatus::Completed,
            StatusArg::Cancelled => ShiftStatus::Cancelled,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecisionArg {
    Approve,
    Reject,
}

impl From<DecisionArg> for Decision {
    fn from(d: DecisionArg) -> Self {
        match d {
            DecisionArg::Approve => Decision::Approve,
            DecisionArg::Reject => Decision::Reject,
        }
    }
}

fn scheduler_options(cli: &Cli) -> Result<SchedulerOptions> {
    let mut opts = match &cli.options {
        Some(path) => io::load_options(path)?,
        None => SchedulerOptions::default(),
    };
    if let Some(minutes) = cli.utc_offset {
        opts.zone = CalendarZone::from_offset_minutes(minutes)
            .with_context(|| format!("utc offset out of range: {minutes}"))?;
    }
    if let Some(raw) = &cli.duty_start {
        opts.duty_start = NaiveTime::parse_from_str(raw, "%H:%M")
            .with_context(|| format!("invalid duty start: {raw}"))?;
    }
    Ok(opts)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let opts = scheduler_options(&cli)?;
    let actor = StaffId::new(&cli.actor);
    let storage = JsonStorage::open(&cli.ledger)?;
    let mut ledger = storage.load_or_default()?;

    let code = match cli.cmd {
        Commands::ImportStaff { csv } => {
            let staff = io::import_staff_csv(csv)?;
            println!("imported {} staff member(s)", staff.len());
            ledger.directory.staff.extend(staff);
            storage.save(&ledger)?;
            0
        }
        Commands::ImportDepartments { csv } => {
            let departments = io::import_departments_csv(csv)?;
            println!("imported {} department(s)", departments.len());
            ledger.directory.departments.extend(departments);
            storage.save(&ledger)?;
            0
        }
        Commands::ImportPositions { csv } => {
            let positions = io::import_positions_csv(csv)?;
            println!("imported {} position(s)", positions.len());
            ledger.directory.positions.extend(positions);
            storage.save(&ledger)?;
            0
        }
        Commands::CreateShift {
            position,
            staff,
            start,
            end,
            emergency,
            notes,
        } => {
            let start = io::parse_instant(&start, opts.zone, opts.duty_start)?;
            let end = match end {
                Some(raw) => io::parse_instant(&raw, opts.zone, opts.duty_start)?,
                None => calendar::plus_hours(start, 24)
                    .with_context(|| format!("shift starting {start} ends out of range"))?,
            };
            let draft = ShiftDraft {
                position: PositionId::new(position),
                staff: StaffId::new(staff),
                start,
                end,
                is_emergency: emergency,
                status: None,
                notes,
            };
            let created = Scheduler::new(&mut ledger.assignments, &ledger.directory, opts)
                .create_assignment(&actor, draft)?;
            storage.save(&ledger)?;
            println!("{}", created.id);
            0
        }
        Commands::UpdateShift {
            id,
            staff,
            position,
            start,
            end,
            notes,
            emergency,
            status,
        } => {
            let patch = ShiftPatch {
                position: position.map(PositionId::new),
                staff: staff.map(StaffId::new),
                start: start
                    .map(|raw| io::parse_instant(&raw, opts.zone, opts.duty_start))
                    .transpose()?,
                end: end
                    .map(|raw| io::parse_instant(&raw, opts.zone, opts.duty_start))
                    .transpose()?,
                notes,
                is_emergency: emergency,
                status: status.map(ShiftStatus::from),
            };
            let updated = Scheduler::new(&mut ledger.assignments, &ledger.directory, opts)
                .update_assignment(&actor, &AssignmentId::new(id), patch)?;
            storage.save(&ledger)?;
            println!("{} {}", updated.id, updated.status);
            0
        }
        Commands::DeleteShift { id } => {
            Scheduler::new(&mut ledger.assignments, &ledger.directory, opts)
                .delete_assignment(&actor, &AssignmentId::new(id))?;
            storage.save(&ledger)?;
            0
        }
        Commands::Publish { id } => {
            Scheduler::new(&mut ledger.assignments, &ledger.directory, opts)
                .publish(&actor, &AssignmentId::new(id))?;
            storage.save(&ledger)?;
            0
        }
        Commands::Cancel { id } => {
            Scheduler::new(&mut ledger.assignments, &ledger.directory, opts)
                .cancel(&actor, &AssignmentId::new(id))?;
            storage.save(&ledger)?;
            0
        }
        Commands::Complete { id } => {
            Scheduler::new(&mut ledger.assignments, &ledger.directory, opts)
                .complete(&actor, &AssignmentId::new(id))?;
            storage.save(&ledger)?;
            0
        }
        Commands::Generate {
            department,
            start,
            days,
        } => {
            let request = ScheduleGenRequest {
                department: DepartmentId::new(department),
                start_date: start,
                num_days: days,
            };
            let created = Scheduler::new(&mut ledger.assignments, &ledger.directory, opts)
                .generate_schedule(&actor, &request)?;
            storage.save(&ledger)?;
            println!("generated {} assignment(s) over {} day(s)", created.len(), days);
            0
        }
        Commands::List { out_json, out_csv } => {
            if let Some(path) = out_json {
                io::export_ledger_json(path, &ledger)?;
            }
            if let Some(path) = out_csv {
                io::export_assignments_csv(path, &ledger)?;
            }
            // impression compacte
            for a in ledger.assignments.as_slice() {
                let who = ledger
                    .directory
                    .find_staff(&a.staff)
                    .map(|s| s.display_name.as_str())
                    .unwrap_or(a.staff.as_str());
                println!(
                    "{} | {} → {} | {} | {}{}",
                    a.id,
                    a.start.to_rfc3339(),
                    a.end.to_rfc3339(),
                    who,
                    a.status,
                    if a.is_emergency { " | emergency" } else { "" }
                );
            }
            0
        }
        Commands::Check { report } => {
            let conflicts = Scheduler::new(&mut ledger.assignments, &ledger.directory, opts).audit()?;
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                if let Some(path) = report {
                    // CSV simple
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["staff_id", "date", "existing", "candidate", "kind"])?;
                    for c in &conflicts {
                        let date = c.date.to_string();
                        w.write_record([
                            c.staff.as_str(),
                            date.as_str(),
                            c.existing.as_str(),
                            c.candidate.as_str(),
                            match c.kind {
                                ConflictKind::DoubleBooking => "double",
                                ConflictKind::MissingRestDay => "rest",
                            },
                        ])?;
                    }
                    w.flush()?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Request {
            kind,
            start,
            end,
            reason,
            shift,
            with,
        } => {
            let draft = RequestDraft {
                kind: kind.into(),
                start_date: start,
                end_date: end.unwrap_or(start),
                reason,
                swap_shift: shift.map(AssignmentId::new),
                swap_with: with.map(StaffId::new),
            };
            let request = ReviewDesk::new(&mut ledger.requests).submit(&actor, draft)?;
            storage.save(&ledger)?;
            println!("{}", request.id);
            0
        }
        Commands::Review {
            id,
            decision,
            notes,
        } => {
            let input = RequestReviewInput {
                request: RequestId::new(id),
                decision: decision.into(),
                notes,
            };
            let request = {
                let scheduler = Scheduler::new(&mut ledger.assignments, &ledger.directory, opts);
                ReviewDesk::new(&mut ledger.requests).review(&actor, input, &scheduler)?
            };
            storage.save(&ledger)?;
            println!("{} {}", request.id, request.status);
            0
        }
        Commands::Withdraw { id } => {
            ReviewDesk::new(&mut ledger.requests).withdraw(&actor, &RequestId::new(id))?;
            storage.save(&ledger)?;
            0
        }
        Commands::AmendRequest {
            id,
            start,
            end,
            reason,
            shift,
            with,
        } => {
            let patch = RequestPatch {
                start_date: start,
                end_date: end,
                reason,
                swap_shift: shift.map(AssignmentId::new),
                swap_with: with.map(StaffId::new),
            };
            let request =
                ReviewDesk::new(&mut ledger.requests).amend(&actor, &RequestId::new(id), patch)?;
            storage.save(&ledger)?;
            println!("{} {} → {}", request.id, request.start_date, request.end_date);
            0
        }
        Commands::DeleteRequest { id } => {
            ReviewDesk::new(&mut ledger.requests).delete(&actor, &RequestId::new(id))?;
            storage.save(&ledger)?;
            0
        }
        Commands::Pending => {
            for r in ReviewDesk::new(&mut ledger.requests).pending()? {
                println!(
                    "{} | {:?} | {} | {} → {}",
                    r.id, r.kind, r.requester, r.start_date, r.end_date
                );
            }
            0
        }
    };

    std::process::exit(code);
}
