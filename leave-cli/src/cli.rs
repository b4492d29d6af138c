use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use leave_core::LeaveType;

#[derive(Debug, Parser)]
#[command(name = "leave")]
#[command(about = "Team leave and holiday tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the annual or monthly leave dashboard
    Report(ReportArgs),
    /// Show one member's month as a calendar
    Calendar {
        member: String,
        #[arg(long)]
        year: Option<i32>,
        /// Month number, 1-12
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },
    /// Record or clear leave on one or more days
    Mark {
        member: String,
        /// Days as YYYY-MM-DD
        #[arg(required = true)]
        dates: Vec<NaiveDate>,
        #[arg(long, value_enum, default_value_t = MarkKind::Full)]
        kind: MarkKind,
    },
    /// Manage team members
    #[command(subcommand)]
    Member(MemberCommand),
    /// Manage public and custom holidays
    #[command(subcommand)]
    Holiday(HolidayCommand),
    /// Set a member's birthday (MM-DD or YYYY-MM-DD)
    Birthday { member: String, date: String },
    /// Set a member's work anniversary
    Anniversary {
        member: String,
        start_year: i32,
        /// MM-DD
        month_day: String,
    },
    /// Exchange data with the configured sync endpoint
    #[command(subcommand)]
    Sync(SyncCommand),
    /// Print config path and create default file if missing
    ConfigPath,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Defaults to the current year
    #[arg(long)]
    pub year: Option<i32>,
    /// Month number, 1-12; omit for the annual view
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,
    /// Limit the report to one member
    #[arg(long)]
    pub member: Option<String>,
    /// Print the metrics as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum MemberCommand {
    Add { name: String },
    /// Remove a member together with their leave and special dates
    Remove { name: String },
    List,
}

#[derive(Debug, Subcommand)]
pub enum HolidayCommand {
    Add {
        date: NaiveDate,
        name: String,
        /// Region of a public holiday
        #[arg(long, conflicts_with = "custom")]
        region: Option<String>,
        /// Record a team-specific holiday instead of a public one
        #[arg(long)]
        custom: bool,
    },
    /// Remove every holiday on a date
    Remove { date: NaiveDate },
}

#[derive(Debug, Subcommand)]
pub enum SyncCommand {
    /// Send local data to the endpoint
    Push,
    /// Replace local data with the endpoint's copy
    Pull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarkKind {
    Full,
    Morning,
    Afternoon,
    Clear,
}

impl MarkKind {
    pub fn leave_type(self) -> Option<LeaveType> {
        match self {
            MarkKind::Full => Some(LeaveType::Full),
            MarkKind::Morning => Some(LeaveType::Morning),
            MarkKind::Afternoon => Some(LeaveType::Afternoon),
            MarkKind::Clear => None,
        }
    }
}
