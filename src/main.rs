use chrono::NaiveDate;
use clap::Parser;
use colored::*;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use usagers_eligibility::{
    cli::{Cli, Commands, InteractionAction, JournalAction},
    config::{Config, OutputFormat},
    eligibility::{
        self, parse_date, Clock, EligibilityChecker, FixedClock, Household, PermitKind, SystemClock,
    },
    error::{self, CaseError},
    roles,
    storage::{
        record_interaction, save_task, set_task_status, Database, Interaction, InteractionDraft, InteractionKind,
        JournalTask, KeyValueStore, Priority, Record, Repository, TaskDraft, TaskStatus,
    },
    utils,
};

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            init_tracing("info");
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.filter);

    if let Err(e) = run(cli, &config) {
        error!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli, config: &Config) -> error::Result<()> {
    let clock = resolve_clock(cli.today.as_deref(), config)?;
    let format = match cli.format.as_deref() {
        Some(raw) => raw.parse::<OutputFormat>().map_err(CaseError::InvalidInput)?,
        None => config.output.format,
    };

    match cli.command {
        Commands::Role { label } => show_role(&label, format),

        Commands::Age { birth_date } => show_age(&birth_date, clock.today(), format),

        Commands::Permit { nationality, permit, expiry } => show_permit(
            nationality.as_deref(),
            permit.as_deref(),
            expiry.as_deref(),
            clock.today(),
            format,
        ),

        Commands::Household { file, verbose } => {
            info!("Assessing household from {}", file);
            assess_household(&file, EligibilityChecker::new(clock), verbose, format)
        }

        Commands::Journal { action } => {
            let db = Database::new(&config.database.path)?;
            run_journal(&db, action, clock.today(), format)
        }

        Commands::Interaction { action } => {
            let db = Database::new(&config.database.path)?;
            run_interaction(&db, action, format)
        }

        Commands::Stats => {
            let db = Database::new(&config.database.path)?;
            show_stats(&db, format)
        }

        Commands::Init => {
            info!("Initializing...");
            initialize(config, clock.today())
        }
    }
}

/// `--today` wins over `clock.reference_date`; otherwise the host calendar.
fn resolve_clock(today: Option<&str>, config: &Config) -> error::Result<Box<dyn Clock>> {
    if let Some(raw) = today {
        let date = parse_date(raw).ok_or_else(|| CaseError::InvalidInput(format!("Invalid --today date: {}", raw)))?;
        return Ok(Box::new(FixedClock(date)));
    }

    Ok(match config.reference_date()? {
        Some(date) => {
            info!("Using configured reference date {}", date);
            Box::new(FixedClock(date))
        }
        None => Box::new(SystemClock),
    })
}

fn show_role(label: &str, format: OutputFormat) -> error::Result<()> {
    let normalized = roles::normalize(Some(label));
    let canonical = roles::canonicalize_role(Some(label));
    let counted = roles::is_child_counted(canonical.as_str(), Some(label));

    if format == OutputFormat::Json {
        let out = serde_json::json!({
            "input": label,
            "normalized": normalized,
            "canonical": canonical,
            "display": canonical.display(),
            "counted": counted,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Input:      {}", label);
    println!("Normalized: {}", normalized);
    println!("Canonical:  {}", canonical.to_string().cyan());
    println!("Display:    {}", roles::to_display_role(Some(canonical.as_str())));
    println!("Counted:    {}", utils::format_flag(counted));
    Ok(())
}

fn show_age(birth_date: &str, today: NaiveDate, format: OutputFormat) -> error::Result<()> {
    let age = eligibility::years_diff(Some(birth_date), today);
    if parse_date(birth_date).is_none() {
        warn!("Birth date {:?} is not a calendar date, age defaults to 0", birth_date);
    }

    if format == OutputFormat::Json {
        let out = serde_json::json!({ "birthDate": birth_date, "today": today, "age": age });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Age on {}: {}", today, age.to_string().cyan());
    }
    Ok(())
}

fn show_permit(
    nationality: Option<&str>,
    permit: Option<&str>,
    expiry: Option<&str>,
    today: NaiveDate,
    format: OutputFormat,
) -> error::Result<()> {
    let kind = PermitKind::parse(permit);
    let status = eligibility::permit_status(nationality, &kind, eligibility::clock::parse_optional_date(expiry), today);
    let valid = eligibility::is_permit_valid(nationality, permit, expiry, today);

    if format == OutputFormat::Json {
        let out = serde_json::json!({
            "nationality": nationality,
            "permit": kind,
            "today": today,
            "valid": valid,
            "detail": status,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Permit:  {}", kind);
    println!("Valid:   {}", utils::format_flag(valid));
    println!("Detail:  {}", status.describe());
    Ok(())
}

fn assess_household(
    file: &str,
    checker: EligibilityChecker,
    verbose: bool,
    format: OutputFormat,
) -> error::Result<()> {
    let raw = std::fs::read_to_string(file)?;
    let household: Household = serde_json::from_str(&raw)?;

    let summary = checker.assess_household(&household);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    summary.print_summary();

    if summary.flagged_members() > 0 {
        println!(
            "\n{}",
            format!("{} member(s) need a caseworker's attention", summary.flagged_members()).yellow()
        );
    }

    if verbose {
        println!("\n{}", "Reasons:".yellow());
        for (index, member) in household.members.iter().enumerate() {
            let name = member.display_name().unwrap_or_else(|| format!("Member {}", index + 1));
            println!("  {}: {}", name, checker.eligibility_reason(member));
        }
    }

    Ok(())
}

fn run_journal(db: &Database, action: JournalAction, today: NaiveDate, format: OutputFormat) -> error::Result<()> {
    let journal: Repository<JournalTask, _> = Repository::new(db);

    match action {
        JournalAction::Add { owner, title, id, due, priority, tags } => {
            let due_date = due
                .map(|raw| {
                    parse_date(&raw).ok_or_else(|| CaseError::InvalidInput(format!("Invalid due date: {}", raw)))
                })
                .transpose()?;
            let priority = priority
                .map(|raw| raw.parse::<Priority>().map_err(CaseError::InvalidInput))
                .transpose()?;

            let task = save_task(
                &journal,
                TaskDraft {
                    id,
                    owner_id: owner,
                    title,
                    due_date,
                    priority,
                    tags,
                },
            )?;
            println!("{} {}", "✓ Task saved:".green(), task.id);
            Ok(())
        }

        JournalAction::List { owner } => {
            let tasks = match owner.as_deref() {
                Some(owner) => journal.list_by_owner(owner)?,
                None => journal.list_all()?,
            };
            let heading = owner.unwrap_or_else(|| "all applicants".to_string());

            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
                return Ok(());
            }

            if tasks.is_empty() {
                println!("No tasks for {}", heading);
                return Ok(());
            }

            let widths = [16, 8, 11, 12, 8, 40];
            println!("{}", format!("=== Journal {} ===", heading).cyan().bold());
            utils::print_table_border(105);
            utils::print_table_row(&["Id", "Owner", "Status", "Due", "Priority", "Title"], &widths);
            utils::print_table_border(105);
            for task in &tasks {
                let due = match task.due_date {
                    Some(d) if task.is_overdue(today) => format!("{}!", d),
                    Some(d) => d.to_string(),
                    None => "-".to_string(),
                };
                let priority = task
                    .priority()
                    .map(|p| format!("{:?}", p).to_lowercase())
                    .unwrap_or_else(|| "-".to_string());
                utils::print_table_row(
                    &[
                        &utils::format_id(&task.id),
                        &task.owner_id,
                        &task.status.to_string(),
                        &due,
                        &priority,
                        &task.title,
                    ],
                    &widths,
                );
            }
            utils::print_table_border(105);

            let overdue = tasks.iter().filter(|t| t.is_overdue(today)).count();
            if overdue > 0 {
                println!("{}", format!("{} overdue task(s)", overdue).red());
            }
            Ok(())
        }

        JournalAction::Start { id } => {
            let task = set_task_status(&journal, &id, TaskStatus::InProgress)?;
            println!("{} {}", "✓ Task started:".green(), task.title);
            Ok(())
        }

        JournalAction::Done { id } => {
            let task = set_task_status(&journal, &id, TaskStatus::Done)?;
            println!("{} {}", "✓ Task done:".green(), task.title);
            Ok(())
        }

        JournalAction::Remove { id, yes } => {
            if !yes && !utils::confirm_action(&format!("Remove task {}?", id)) {
                println!("Cancelled");
                return Ok(());
            }
            if !journal.remove_by_id(&id)? {
                return Err(CaseError::RecordNotFound(format!("task {}", id)));
            }
            println!("{} {}", "✓ Task removed:".green(), id);
            Ok(())
        }
    }
}

fn run_interaction(db: &Database, action: InteractionAction, format: OutputFormat) -> error::Result<()> {
    let interactions: Repository<Interaction, _> = Repository::new(db);

    match action {
        InteractionAction::Add { owner, kind, summary, id, tags } => {
            let kind = kind.parse::<InteractionKind>().map_err(CaseError::InvalidInput)?;
            let interaction = record_interaction(
                &interactions,
                InteractionDraft {
                    id,
                    owner_id: owner,
                    kind,
                    summary,
                    tags,
                },
            )?;
            println!("{} {}", "✓ Interaction saved:".green(), interaction.id);
            Ok(())
        }

        InteractionAction::List { owner } => {
            let listed = interactions.list_by_owner(&owner)?;

            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&listed)?);
                return Ok(());
            }

            if listed.is_empty() {
                println!("No interactions for {}", owner);
                return Ok(());
            }

            let widths = [16, 23, 10, 50];
            println!("{}", format!("=== Interactions {} ===", owner).cyan().bold());
            utils::print_table_border(105);
            utils::print_table_row(&["Id", "When", "Kind", "Summary"], &widths);
            utils::print_table_border(105);
            for interaction in &listed {
                utils::print_table_row(
                    &[
                        &utils::format_id(&interaction.id),
                        &utils::format_timestamp(&interaction.occurred_at),
                        &format!("{:?}", interaction.kind),
                        &interaction.summary,
                    ],
                    &widths,
                );
            }
            utils::print_table_border(105);
            Ok(())
        }

        InteractionAction::Remove { id, yes } => {
            if !yes && !utils::confirm_action(&format!("Remove interaction {}?", id)) {
                println!("Cancelled");
                return Ok(());
            }
            if !interactions.remove_by_id(&id)? {
                return Err(CaseError::RecordNotFound(format!("interaction {}", id)));
            }
            println!("{} {}", "✓ Interaction removed:".green(), id);
            Ok(())
        }
    }
}

fn show_stats(db: &Database, format: OutputFormat) -> error::Result<()> {
    let stats = db.stats()?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "=== Case Records ===".cyan().bold());
    println!("  Journal tasks:  {}", stats.get(JournalTask::NAMESPACE).copied().unwrap_or(0));
    println!("  Interactions:   {}", stats.get(Interaction::NAMESPACE).copied().unwrap_or(0));
    Ok(())
}

fn initialize(config: &Config, today: NaiveDate) -> error::Result<()> {
    println!("{}", "Initializing case database...".green());
    let _db = Database::new(&config.database.path)?;
    println!("{}", "✓ Database initialized".green());
    println!("{}", "✓ Configuration loaded".green());
    println!("\n{}", "Configuration:".cyan());
    println!("  Database:       {}", config.database.path);
    println!("  Log filter:     {}", config.logging.filter);
    println!("  Output format:  {:?}", config.output.format);
    println!("  Today:          {}", today);

    println!("\n{}", "Ready to use! Try running:".cyan());
    println!("  {} to canonicalize a role", "usagers role \"Enfant (DV)\"".yellow());
    println!("  {} to assess a household", "usagers household demos/household.json".yellow());
    println!("  {} to view record counts", "usagers stats".yellow());
    Ok(())
}

