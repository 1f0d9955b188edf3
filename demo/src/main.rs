//! SIWES Tracker — Demo CLI
//!
//! Runs one or all of the placement-lifecycle scenarios. Each scenario uses
//! real tracker components (geofence validator, logbook manager, review and
//! inspection gates, best-effort audit recorder) wired over the in-memory
//! store with a hand-advanced clock.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- presence
//!   cargo run -p demo -- logbook
//!   cargo run -p demo -- review-cycle
//!   cargo run -p demo -- inspection

use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use siwes_audit::{BestEffortRecorder, InMemoryAuditStore};
use siwes_contracts::{
    error::TrackResult,
    identity::{
        ActorContext, ActorId, Role, Student, StudentId, Supervisor, SupervisorId,
        SupervisorKind,
    },
    records::{ComplianceStatus, Location, LocationId},
};
use siwes_core::{traits::AuditSink, ManualClock};
use siwes_store::MemoryStore;
use siwes_tracker::{
    AdminDesk, InspectionGate, LogbookManager, PresenceValidator, ReviewGate, TrackerConfig,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// SIWES tracker demo.
///
/// Each subcommand walks one slice of a student placement: geofenced
/// presence, the daily logbook, the Friday review lock, and the terminal
/// inspection.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "SIWES placement tracker demo",
    long_about = "Runs SIWES tracker scenarios showing geofenced presence validation,\n\
                  tamper-evident logbook entries, the weekly review lock, the final\n\
                  inspection gate, and the audit trail behind all of them."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every scenario in sequence against one shared placement.
    RunAll,
    /// Scenario 1: on-site and off-site GPS presence submissions.
    Presence,
    /// Scenario 2: daily logbook entries and the same-day edit window.
    Logbook,
    /// Scenario 3: the Friday review and the atomic week lock.
    ReviewCycle,
    /// Scenario 4: the post-end-date final inspection.
    Inspection,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging. Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all(),
        Command::Presence => World::seeded().presence_scenario(),
        Command::Logbook => World::seeded().logbook_scenario(),
        Command::ReviewCycle => World::seeded().review_scenario(),
        Command::Inspection => World::seeded().inspection_scenario(),
    };

    match result {
        Ok(()) => {
            println!("All selected scenarios completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_all() -> TrackResult<()> {
    let world = World::seeded();
    world.presence_scenario()?;
    world.logbook_scenario()?;
    world.review_scenario()?;
    world.inspection_scenario()?;
    world.print_trail()?;
    Ok(())
}

// ── Demo world ────────────────────────────────────────────────────────────────

/// One placement: a student at a Lagos work site, a verified industry
/// supervisor, an institution supervisor, and an administrator, all over a
/// shared in-memory store and a hand-advanced clock.
struct World {
    clock: Arc<ManualClock>,
    recorder: Arc<BestEffortRecorder>,
    presence: PresenceValidator,
    logbook: LogbookManager,
    review: ReviewGate,
    inspection: InspectionGate,
    admin: AdminDesk,
    student_id: StudentId,
    industry_id: SupervisorId,
    institution_id: SupervisorId,
    admin_id: ActorId,
}

impl World {
    fn seeded() -> Self {
        let store = MemoryStore::new();
        let audit_store = Arc::new(InMemoryAuditStore::new());
        let recorder = Arc::new(BestEffortRecorder::new(audit_store.clone()));
        // The placement runs 2024-01-01 through 2024-06-28; the demo opens
        // on the Monday of week 3.
        let clock = Arc::new(ManualClock::on_date(date(2024, 1, 15)));
        let config = TrackerConfig::default();

        let location_id = LocationId::new();
        store.put_location(Location {
            id: location_id,
            company_name: "Delta Fabrication Ltd, Lagos".to_string(),
            latitude: 6.5244,
            longitude: 3.3792,
            allowed_radius_meters: 100.0,
        });

        let student_id = StudentId::new();
        store.put_student(Student {
            id: student_id,
            matric_number: "ENG/2020/031".to_string(),
            full_name: "Amina Bello".to_string(),
            location_id: None,
            siwes_start_date: Some(date(2024, 1, 1)),
            siwes_end_date: Some(date(2024, 6, 28)),
        });

        let industry_id = SupervisorId::new();
        store.put_supervisor(Supervisor {
            id: industry_id,
            full_name: "Mr. Okafor".to_string(),
            kind: SupervisorKind::Industry,
            verified: false,
        });

        let institution_id = SupervisorId::new();
        store.put_supervisor(Supervisor {
            id: institution_id,
            full_name: "Dr. Musa".to_string(),
            kind: SupervisorKind::Institution,
            verified: true,
        });

        let admin_id = ActorId(uuid::Uuid::new_v4());
        store.put_admin(admin_id);

        let audit: Arc<dyn AuditSink> = recorder.clone();
        let presence = PresenceValidator::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            audit.clone(),
            clock.clone(),
            config.clone(),
        );
        let logbook = LogbookManager::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            audit.clone(),
            clock.clone(),
        );
        let review = ReviewGate::new(
            store.identity_directory(),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            audit.clone(),
            clock.clone(),
            config,
        );
        let inspection = InspectionGate::new(
            store.identity_directory(),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            audit.clone(),
            clock.clone(),
        );
        let admin = AdminDesk::new(
            store.identity_directory(),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            audit_store,
            audit,
            clock.clone(),
        );

        let world = World {
            clock,
            recorder,
            presence,
            logbook,
            review,
            inspection,
            admin,
            student_id,
            industry_id,
            institution_id,
            admin_id,
        };

        // Administrative setup: verify the industry supervisor, then wire
        // up the placement.
        let by = world.admin_actor();
        world
            .admin
            .verify_supervisor(&by, industry_id)
            .expect("seed: verify supervisor");
        world
            .admin
            .assign_supervisor(&by, student_id, industry_id)
            .expect("seed: assign supervisor");
        world
            .admin
            .assign_location(&by, student_id, location_id)
            .expect("seed: assign location");

        world
    }

    fn student_actor(&self) -> ActorContext {
        ActorContext::new(self.student_id.into(), Role::Student)
    }

    fn industry_actor(&self) -> ActorContext {
        ActorContext::supervisor(self.industry_id.into(), SupervisorKind::Industry, true)
    }

    fn institution_actor(&self) -> ActorContext {
        ActorContext::supervisor(self.institution_id.into(), SupervisorKind::Institution, true)
    }

    fn admin_actor(&self) -> ActorContext {
        ActorContext::new(self.admin_id, Role::Admin)
    }

    // ── Scenarios ─────────────────────────────────────────────────────────────

    fn presence_scenario(&self) -> TrackResult<()> {
        println!("── Scenario: geofenced presence ──");
        let who = self.student_actor();

        let on_site = self.presence.submit_presence(&who, 6.5244, 3.3792)?;
        println!(
            "  on-site submission:  {:?} ({} m from the reference point)",
            on_site.status, on_site.distance_meters
        );

        // Roughly 1.5 km north of the work site.
        let off_site = self.presence.submit_presence(&who, 6.5380, 3.3792)?;
        println!(
            "  off-site submission: {:?} ({} m — outside the 100 m fence, still recorded)",
            off_site.status, off_site.distance_meters
        );

        let history = self.presence.presence_history(&who)?;
        println!("  presence history now holds {} record(s)", history.len());
        println!();
        Ok(())
    }

    fn logbook_scenario(&self) -> TrackResult<()> {
        println!("── Scenario: daily logbook ──");
        let who = self.student_actor();

        let presence = self.presence.submit_presence(&who, 6.5244, 3.3792)?;
        let entry = self.logbook.submit_entry(
            &who,
            "Morning: measured and cut cable trays for panel room.",
            Some(presence.id),
        )?;
        println!(
            "  created entry for {} (week {}), hash {}…",
            entry.entry_date,
            entry.week_number,
            &entry.content_hash[..12]
        );

        let updated = self.logbook.submit_entry(
            &who,
            "Morning: cable trays. Afternoon: terminated feeder lines.",
            Some(presence.id),
        )?;
        println!(
            "  same-day edit reused entry {} with fresh hash {}…",
            updated.id,
            &updated.content_hash[..12]
        );
        println!();
        Ok(())
    }

    fn review_scenario(&self) -> TrackResult<()> {
        println!("── Scenario: weekly review and lock ──");
        let student = self.student_actor();
        let supervisor = self.industry_actor();

        self.clock.set_date(date(2024, 1, 15));
        self.logbook
            .submit_entry(&student, "Commissioning checks on the east line.", None)?;

        // 2024-01-17 is a Wednesday.
        self.clock.set_date(date(2024, 1, 17));
        match self.review.submit_review(&supervisor, self.student_id, 3, "good week") {
            Err(e) => println!("  Wednesday submission rejected: {e}"),
            Ok(_) => println!("  unexpected: review accepted midweek"),
        }

        // 2024-01-19 is a Friday.
        self.clock.set_date(date(2024, 1, 19));
        let review = self
            .review
            .submit_review(&supervisor, self.student_id, 3, "good week")?;
        println!(
            "  Friday review committed for week {}, hash {}…",
            review.week_number,
            &review.review_hash[..12]
        );

        // Back on Monday's (now locked) entry.
        self.clock.set_date(date(2024, 1, 15));
        match self.logbook.submit_entry(&student, "late edit", None) {
            Err(e) => println!("  post-review edit rejected: {e}"),
            Ok(_) => println!("  unexpected: locked entry accepted an edit"),
        }
        println!();
        Ok(())
    }

    fn inspection_scenario(&self) -> TrackResult<()> {
        println!("── Scenario: final inspection ──");
        let who = self.institution_actor();

        self.clock.set_date(date(2024, 6, 20));
        match self.inspection.submit_inspection(
            &who,
            self.student_id,
            "early visit",
            ComplianceStatus::Compliant,
        ) {
            Err(e) => println!("  pre-end-date inspection rejected: {e}"),
            Ok(_) => println!("  unexpected: early inspection accepted"),
        }

        self.clock.set_date(date(2024, 7, 1));
        let inspection = self.inspection.submit_inspection(
            &who,
            self.student_id,
            "All weeks reviewed; attendance consistent with presence logs.",
            ComplianceStatus::Compliant,
        )?;
        println!(
            "  inspection recorded: {:?}, hash {}…",
            inspection.compliance_status,
            &inspection.inspection_hash[..12]
        );

        match self.inspection.submit_inspection(
            &who,
            self.student_id,
            "second opinion",
            ComplianceStatus::NonCompliant,
        ) {
            Err(e) => println!("  second inspection rejected: {e}"),
            Ok(_) => println!("  unexpected: duplicate inspection accepted"),
        }
        println!();
        Ok(())
    }

    fn print_trail(&self) -> TrackResult<()> {
        // Drain the recorder queue so the trail is complete.
        self.recorder.flush();
        println!("── Audit trail (newest first) ──");
        for event in self.admin.audit_trail(&self.admin_actor(), 50, 0)? {
            println!(
                "  [{}] {:<22} {:<28} success={}",
                event.created_at.format("%Y-%m-%d"),
                event.action.to_string(),
                event.resource,
                event.success
            );
        }
        println!();
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("demo dates are valid")
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("SIWES Placement Tracker");
    println!("Lifecycle Demo");
    println!("=======================");
    println!();
    println!("Enforcement per operation:");
    println!("  [1] Geofence: haversine distance vs. the assigned location's radius");
    println!("  [2] Logbook: server-dated entries, SHA-256 creation fingerprints");
    println!("  [3] Review: Friday-only, write-once, atomically locks the week");
    println!("  [4] Inspection: post-end-date, write-once, terminal");
    println!("  [5] Audit: best-effort append-only trail, rejections included");
    println!();
}
