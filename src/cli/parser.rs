use crate::export::ServiceExport;
use clap::{Args, Parser, Subcommand};

/// Command-line interface definition for cats
/// Church attendance check-in with SQLite
#[derive(Parser)]
#[command(
    name = "cats",
    version = env!("CARGO_PKG_VERSION"),
    about = "Church attendance tracking: check people in, print name tags and follow up on who was missing",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Acting user (defaults to `default_user` from the configuration)
    #[arg(global = true, long = "user", short = 'u')]
    pub user: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init {
        /// Create the first (Admin) account with this username
        #[arg(long = "admin", value_name = "USERNAME")]
        admin: Option<String>,
    },

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/vim/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Create a backup copy of the database
    Backup {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long, help = "Compress the backup into a .zip archive")]
        compress: bool,

        #[arg(long, short = 'f', help = "Overwrite an existing file without asking")]
        force: bool,
    },

    /// Manage accounts and roles
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage families
    Family {
        #[command(subcommand)]
        action: FamilyAction,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Staff people views
    Person {
        #[command(subcommand)]
        action: PersonAction,
    },

    /// Check people into today's service
    Checkin {
        /// Run as the self-service kiosk (Greeter or Admin role)
        #[arg(long)]
        kiosk: bool,

        #[command(subcommand)]
        action: CheckinAction,
    },

    /// Kiosk status and appearance
    Kiosk {
        #[command(subcommand)]
        action: KioskAction,
    },

    /// Render printable name tags
    Print {
        #[command(subcommand)]
        action: PrintAction,
    },

    /// Manage church services
    Service {
        #[command(subcommand)]
        action: ServiceAction,
    },

    /// Staff reports
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },

    /// System settings
    Setting {
        #[command(subcommand)]
        action: SettingAction,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Create an account (the first one needs no acting user)
    Add {
        username: String,
        #[arg(long)]
        staff: bool,
        #[arg(long)]
        superuser: bool,
        /// Role group (Greeter, Admin, Pastor); repeatable
        #[arg(long = "group", short = 'g')]
        groups: Vec<String>,
    },
    /// List accounts
    List,
    /// Add a role to an account
    Grant { username: String, group: String },
    /// Remove a role from an account
    Revoke { username: String, group: String },
    /// Change account flags
    Set {
        username: String,
        #[arg(long)]
        staff: Option<bool>,
        #[arg(long)]
        superuser: Option<bool>,
        #[arg(long)]
        active: Option<bool>,
    },
}

#[derive(Subcommand)]
pub enum FamilyAction {
    /// Create a family ("Smith Family" is stored as "Smith")
    Add {
        name: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List families with member counts
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a family and its members
    Show { id: i64 },
    /// Rename a family or change its notes
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a family (members are kept)
    Del { id: i64 },
}

#[derive(Subcommand)]
pub enum TagAction {
    Add { name: String },
    List,
    Del { name: String },
    /// Attach a tag to a person
    Attach { person_id: i64, tag: String },
    /// Detach a tag from a person
    Detach { person_id: i64, tag: String },
}

/// Person fields shared by `person add` and `person edit`.
#[derive(Args, Default, Clone)]
pub struct PersonFields {
    #[arg(long)]
    pub first: Option<String>,
    #[arg(long)]
    pub middle: Option<String>,
    #[arg(long)]
    pub last: Option<String>,
    #[arg(long)]
    pub street: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub postal: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Pastor role only
    #[arg(long = "confidential")]
    pub confidential_notes: Option<String>,
    /// 1-12, 0 clears
    #[arg(long = "birth-month")]
    pub birth_month: Option<u32>,
    /// 1-31, 0 clears
    #[arg(long = "birth-day")]
    pub birth_day: Option<u32>,
    /// Path to a photo, empty clears
    #[arg(long)]
    pub photo: Option<String>,
    /// m/member or v/visitor
    #[arg(long = "type")]
    pub member_type: Option<String>,
    /// Family id, 0 clears
    #[arg(long)]
    pub family: Option<i64>,
    #[arg(long)]
    pub active: Option<bool>,
}

#[derive(Subcommand)]
pub enum PersonAction {
    /// Create a person
    Add {
        #[command(flatten)]
        fields: PersonFields,
    },
    /// List people, optionally filtered on name, phone or email
    List {
        #[arg(long, short = 'q')]
        query: Option<String>,
    },
    /// Person detail with attendance history and possible duplicates
    Show { id: i64 },
    /// Update a person
    Edit {
        id: i64,
        #[command(flatten)]
        fields: PersonFields,
    },
    /// Delete a person and their attendance
    Del { id: i64 },
    /// Quick search (JSON, 3+ characters, 12 results max)
    Search {
        query: String,
        /// Group matches by family
        #[arg(long)]
        groups: bool,
    },
}

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Search people by name, grouped by family
    Find { query: String },
    /// Check in an existing person
    Person {
        id: i64,
        /// Write the name tag HTML to this file
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Register a visitor and check them in
    Visitor {
        #[arg(long)]
        first: String,
        #[arg(long, default_value = "")]
        middle: String,
        #[arg(long)]
        last: String,
        #[arg(long, default_value = "")]
        street: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long = "birth-month", default_value = "")]
        birth_month: String,
        #[arg(long = "birth-day", default_value = "")]
        birth_day: String,
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Check in several people (e.g. a family) and print their tags
    Selected {
        /// Comma-separated person ids
        #[arg(long, default_value = "")]
        ids: String,
        /// Used when no ids are given
        #[arg(long)]
        primary: Option<i64>,
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum KioskAction {
    /// Today's service and whether the kiosk may check people in
    Status,
    /// Kiosk appearance resolved from settings
    Theme,
}

#[derive(Subcommand)]
pub enum PrintAction {
    /// Name tag for one attendance
    Tag {
        attendance_id: i64,
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Name tags for several attendances, in the given order
    Batch {
        /// Comma-separated attendance ids
        #[arg(long)]
        ids: String,
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ServiceAction {
    /// Services with attendance counts, newest first
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Attendees, missing members and first-time visitors
    Show { id: i64 },
    /// Create (or show) today's service, or the one on --date
    Today {
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },
    Close { id: i64 },
    Reopen { id: i64 },
    /// Check in a missing member
    CheckIn { id: i64, person_id: i64 },
    /// Remove an attendance from the service
    Undo { id: i64, attendance_id: i64 },
    /// Live counts as JSON
    Counts { id: i64 },
    /// CSV export of attendees or first-time visitors
    Export {
        id: i64,
        #[arg(long, value_enum)]
        kind: ServiceExport,
        /// Defaults to <kind>_<date>.csv in the current directory
        #[arg(long, value_name = "FILE")]
        file: Option<String>,
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum ReportAction {
    /// Active members without attendance at a service (latest by default)
    Missing {
        #[arg(long)]
        service: Option<i64>,
        #[arg(long)]
        csv: bool,
        #[arg(long, value_name = "FILE", requires = "csv")]
        file: Option<String>,
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Visitors attending for the first time
    FirstTime {
        #[arg(long)]
        service: Option<i64>,
        #[arg(long)]
        csv: bool,
        #[arg(long, value_name = "FILE", requires = "csv")]
        file: Option<String>,
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Audit log, newest first
    Audit {
        /// checkin, undo_checkin, print_nametag, service_close, service_reopen, setting_change
        #[arg(long)]
        action: Option<String>,
        #[arg(long, short = 's')]
        search: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
pub enum SettingAction {
    /// All settings grouped by section
    List,
    /// Print one value
    Get { key: String },
    /// Validate and store one value
    Set { key: String, value: String },
    /// Apply a YAML map of key: value pairs (all or nothing)
    Import { file: String },
    /// Upload the kiosk logo image
    Logo { file: String },
    /// Available label and heading fonts
    Fonts,
    /// Available admin skins
    Skins,
}
