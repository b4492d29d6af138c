use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use leave_core::analytics::{Analytics, Period, Scope};
use leave_core::calendar::month_view;
use leave_core::pending::PendingBuffer;
use leave_core::{AdminError, LeaveType, PublicHoliday, TeamData};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::info;

use crate::cli::{Commands, HolidayCommand, MemberCommand, ReportArgs, SyncCommand};
use crate::config::LeaveConfig;
use crate::report::{render_calendar, render_metrics};
use crate::storage::{load_team, save_team};
use crate::sync::{SyncClient, SyncOutcome};

pub async fn run(command: Commands, config: &LeaveConfig) -> Result<()> {
    let today = Local::now().date_naive();

    match command {
        Commands::Report(args) => {
            let data = load_team(&config.data_path)?;
            println!("{}", report(&data, today, &args)?);
        }
        Commands::Calendar {
            member,
            year,
            month,
        } => {
            let data = load_team(&config.data_path)?;
            let year = year.unwrap_or(today.year());
            let month = month.unwrap_or(today.month());
            println!("{}", calendar(&data, &member, year, month)?);
        }
        Commands::Mark {
            member,
            dates,
            kind,
        } => {
            let mut data = load_team(&config.data_path)?;
            let changed = mark(&mut data, &member, &dates, kind.leave_type(), Utc::now())?;
            persist(config, &data).await?;
            println!("Updated {changed} day(s) for {member}");
        }
        Commands::Member(cmd) => {
            let mut data = load_team(&config.data_path)?;
            match cmd {
                MemberCommand::List => {
                    for member in data.members() {
                        let color = data.member_color(member).unwrap_or_default();
                        println!("{member}  {color}");
                    }
                    return Ok(());
                }
                MemberCommand::Add { name } => data.add_member(&name)?,
                MemberCommand::Remove { name } => data.remove_member(&name)?,
            }
            persist(config, &data).await?;
        }
        Commands::Holiday(cmd) => {
            let mut data = load_team(&config.data_path)?;
            apply_holiday(&mut data, cmd)?;
            persist(config, &data).await?;
        }
        Commands::Birthday { member, date } => {
            let mut data = load_team(&config.data_path)?;
            data.set_birthday(&member, &date)?;
            info!(%member, %date, "set birthday");
            persist(config, &data).await?;
        }
        Commands::Anniversary {
            member,
            start_year,
            month_day,
        } => {
            let mut data = load_team(&config.data_path)?;
            data.set_anniversary(&member, start_year, &month_day)?;
            info!(%member, start_year, %month_day, "set work anniversary");
            persist(config, &data).await?;
        }
        Commands::Sync(cmd) => sync(config, cmd).await?,
        Commands::ConfigPath => {
            let path = LeaveConfig::config_path()?;
            LeaveConfig::ensure_exists(&path)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn sync_client(config: &LeaveConfig) -> Result<Option<SyncClient>> {
    config
        .sync_url
        .as_deref()
        .map(|url| SyncClient::new(url, Duration::from_secs(config.sync_timeout_secs)))
        .transpose()
}

/// Saves locally, then mirrors to the sync endpoint when one is configured.
async fn persist(config: &LeaveConfig, data: &TeamData) -> Result<()> {
    save_team(&config.data_path, data)?;
    if let Some(client) = sync_client(config)? {
        client.push(data).await;
    }
    Ok(())
}

async fn sync(config: &LeaveConfig, cmd: SyncCommand) -> Result<()> {
    let client = sync_client(config)?
        .context("No sync URL configured. Set sync_url in the config or LEAVE_SYNC_URL.")?;

    match cmd {
        SyncCommand::Push => {
            let data = load_team(&config.data_path)?;
            match client.push(&data).await {
                SyncOutcome::Pushed => println!("Pushed {} member(s)", data.members().len()),
                _ => println!("Sync endpoint unavailable, data kept locally"),
            }
        }
        SyncCommand::Pull => match client.pull().await {
            SyncOutcome::Pulled(data) => {
                save_team(&config.data_path, &data)?;
                println!("Pulled {} member(s)", data.members().len());
            }
            _ => println!("Sync endpoint unavailable, local data unchanged"),
        },
    }
    Ok(())
}

fn ensure_member(data: &TeamData, member: &str) -> Result<()> {
    if !data.has_member(member) {
        return Err(AdminError::MemberNotFound(member.to_string()).into());
    }
    Ok(())
}

pub fn report(data: &TeamData, today: NaiveDate, args: &ReportArgs) -> Result<String> {
    let year = args.year.unwrap_or(today.year());
    let period = match args.month {
        Some(month) => Period::month(year, month)?,
        None => Period::year(year)?,
    };
    let scope = match &args.member {
        Some(member) => {
            ensure_member(data, member)?;
            Scope::member(member.as_str())
        }
        None => Scope::Team,
    };

    let metrics = Analytics::new(data, today).metrics(period, &scope);
    if args.json {
        return serde_json::to_string_pretty(&metrics).context("Failed to serialize metrics");
    }
    Ok(render_metrics(&metrics))
}

pub fn calendar(data: &TeamData, member: &str, year: i32, month: u32) -> Result<String> {
    ensure_member(data, member)?;
    // Validates the year and month
    Period::month(year, month)?;
    Ok(render_calendar(&month_view(
        data,
        &PendingBuffer::new(),
        member,
        year,
        month,
    )))
}

/// Stages `value` on every date through the pending buffer and commits month by month.
/// Returns how many days changed.
pub fn mark(
    data: &mut TeamData,
    member: &str,
    dates: &[NaiveDate],
    value: Option<LeaveType>,
    now: DateTime<Utc>,
) -> Result<usize> {
    ensure_member(data, member)?;
    if dates.is_empty() {
        bail!("No dates given");
    }

    let mut by_month: BTreeMap<(i32, u32), Vec<u32>> = BTreeMap::new();
    for date in dates {
        by_month
            .entry((date.year(), date.month()))
            .or_default()
            .push(date.day());
    }

    let mut pending = PendingBuffer::new();
    let mut changed = 0;
    for ((year, month), days) in by_month {
        pending.focus(member, year, month, now);
        for day in days {
            pending.set(data.leave(), day, value, now)?;
        }
        changed += pending.commit(data.leave_mut(), now);
    }
    Ok(changed)
}

fn apply_holiday(data: &mut TeamData, cmd: HolidayCommand) -> Result<()> {
    match cmd {
        HolidayCommand::Add {
            date,
            name,
            region,
            custom,
        } => {
            if custom {
                data.add_custom_holiday(date, &name)?;
            } else {
                data.add_public_holiday(
                    date,
                    PublicHoliday::new(name.as_str(), region.unwrap_or_default()),
                )?;
            }
            info!(%date, %name, custom, "added holiday");
        }
        HolidayCommand::Remove { date } => {
            data.remove_holiday(date)?;
            info!(%date, "removed holidays");
        }
    }
    Ok(())
}
