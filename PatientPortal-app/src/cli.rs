//! Command-line interface
//!
//! Usage:
//!   patient_portal add-bp <systolic> <diastolic> [--at <rfc3339>] [--note <text>]
//!   patient_portal add-glucose <value> --unit <mmol/L|mg/dL>
//!   patient_portal add-weight <value> [--unit <kg|lb>]
//!   patient_portal list [--kind <kind>] [--page <n> --size <n>]
//!   patient_portal latest <kind> | delta <kind> | series <kind> | stats <kind>
//!   patient_portal book <doctor> <specialty> <date> <time> [--modality video]
//!   patient_portal complete <id> | cancel <id> | remove <id>
//!   patient_portal upcoming [--limit <n>] | summary

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use patient_portal_domain::entities::{Modality, ReadingKind};

#[derive(Debug, Parser)]
#[command(name = "patient_portal")]
#[command(author = "PatientPortal Team")]
#[command(version = "0.1.0")]
#[command(about = "Record health readings and appointments, classify and chart them", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Storage backend: memory, file or sqlite (overrides PORTAL_STORE_BACKEND)
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Directory for the state files (overrides PORTAL_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Record a blood pressure reading
    AddBp {
        /// Systolic pressure in mmHg
        systolic: String,
        /// Diastolic pressure in mmHg
        diastolic: String,
        /// When the reading was taken (RFC 3339, default now)
        #[arg(long)]
        at: Option<String>,
        /// Free-text note
        #[arg(long)]
        note: Option<String>,
    },

    /// Record a blood glucose reading
    AddGlucose {
        /// Glucose value
        value: String,
        /// mmol/L or mg/dL
        #[arg(short, long)]
        unit: Option<String>,
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },

    /// Record a weight reading
    AddWeight {
        /// Weight value
        value: String,
        /// kg (default) or lb
        #[arg(short, long)]
        unit: Option<String>,
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },

    /// Delete a reading
    Remove { id: Uuid },

    /// List readings in insertion order, or one page newest first
    List {
        #[arg(short, long, value_parser = parse_kind)]
        kind: Option<ReadingKind>,
        /// Page number, starting at 1
        #[arg(long)]
        page: Option<usize>,
        /// Page size
        #[arg(long, default_value = "20")]
        size: usize,
    },

    /// Latest reading of a type with its classification
    Latest {
        #[arg(value_parser = parse_kind)]
        kind: ReadingKind,
    },

    /// Change between the two latest readings of a type
    Delta {
        #[arg(value_parser = parse_kind)]
        kind: ReadingKind,
    },

    /// Chart points of a type, oldest first
    Series {
        #[arg(value_parser = parse_kind)]
        kind: ReadingKind,
        /// Number of points (default PORTAL_SERIES_WINDOW)
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Average, range and direction of a type
    Stats {
        #[arg(value_parser = parse_kind)]
        kind: ReadingKind,
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Book an appointment
    Book {
        doctor: String,
        specialty: String,
        /// YYYY-MM-DD
        date: NaiveDate,
        /// HH:MM
        #[arg(value_parser = parse_time)]
        time: NaiveTime,
        #[arg(short, long, value_parser = parse_modality, default_value = "in_person")]
        modality: Modality,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Mark an appointment as completed
    Complete { id: Uuid },

    /// Cancel an appointment
    Cancel { id: Uuid },

    /// Scheduled appointments from today on, soonest first
    Upcoming {
        /// Maximum number shown (default PORTAL_UPCOMING_LIMIT)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Reference date (default today, UTC)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Dashboard overview with alerts
    Summary {
        /// Reference time (RFC 3339, default now)
        #[arg(long, value_parser = parse_instant)]
        now: Option<DateTime<Utc>>,
    },
}

fn parse_kind(s: &str) -> Result<ReadingKind, String> {
    ReadingKind::parse(s).ok_or_else(|| format!("unknown reading type '{}' (blood_pressure, glucose, weight)", s))
}

fn parse_modality(s: &str) -> Result<Modality, String> {
    Modality::parse(s).ok_or_else(|| format!("unknown modality '{}' (in_person, video)", s))
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| format!("'{}' is not a time (HH:MM)", s))
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| format!("'{}' is not an RFC 3339 date-time", s))
}
