use chrono::Utc;
use clap::{ArgGroup, Parser, Subcommand};
use overload_core::*;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "overload")]
#[command(about = "Progressive overload training scheduler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Act as this owner instead of the configured one
    #[arg(long, global = true)]
    owner: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what to do today (default)
    Today {
        #[arg(long)]
        json: bool,
    },

    /// Create a program and generate its first four weeks
    Create {
        /// burpees, pushups or pullups
        #[arg(long)]
        exercise: String,

        /// submax or ladder
        #[arg(long)]
        method: String,

        /// Reps achieved in your most recent max test
        #[arg(long)]
        test_max: u32,

        /// 3 or 4
        #[arg(long)]
        days_per_week: u32,

        /// Training weekdays, e.g. mon,wed,fri
        #[arg(long, value_delimiter = ',', required = true)]
        days: Vec<String>,

        /// Weeks between max tests (defaults to the configured value)
        #[arg(long)]
        test_every_weeks: Option<u32>,

        #[arg(long)]
        json: bool,
    },

    /// List programs, active first
    List {
        #[arg(long)]
        json: bool,
    },

    /// Show a program and its upcoming days
    Show {
        program_id: Uuid,

        #[arg(long)]
        json: bool,
    },

    /// Show finished (done or skipped) days of a program
    History { program_id: Uuid },

    /// Log a completed workout day
    #[command(group(ArgGroup::new("result").required(true).args(["reps", "steps"])))]
    Done {
        day_id: Uuid,

        /// Reps performed in each submax set, e.g. 8,8,8,7,7
        #[arg(long, value_delimiter = ',')]
        reps: Option<Vec<u32>>,

        /// Ladder steps completed, e.g. 1,2,3,4,5
        #[arg(long, value_delimiter = ',')]
        steps: Option<Vec<u32>>,

        #[arg(long)]
        json: bool,
    },

    /// Log a max test and re-base the program
    Test {
        day_id: Uuid,

        /// Reps achieved in the test
        #[arg(long)]
        max: u32,

        #[arg(long)]
        json: bool,
    },

    /// Skip a planned workout or test day
    Skip { day_id: Uuid },

    /// Deactivate a program (its schedule is kept)
    Deactivate { program_id: Uuid },

    /// Export every day of a program as CSV
    Export {
        program_id: Uuid,

        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    overload_core::logging::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            match e.kind() {
                ErrorKind::Validation => ExitCode::from(2),
                ErrorKind::Conflict => ExitCode::from(3),
                ErrorKind::Persistence => ExitCode::from(1),
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let owner = cli.owner.unwrap_or_else(|| config.user.owner.clone());

    let scheduler = Scheduler::new(FileStore::open(&data_dir)?);

    match cli.command {
        Some(Commands::Today { json }) => cmd_today(&scheduler, &owner, json),
        Some(Commands::Create {
            exercise,
            method,
            test_max,
            days_per_week,
            days,
            test_every_weeks,
            json,
        }) => {
            let request = NewProgram {
                exercise: exercise.parse()?,
                method: method.parse()?,
                test_max,
                days_per_week,
                preferred_days: days
                    .iter()
                    .map(|d| parse_weekday(d))
                    .collect::<Result<Vec<_>>>()?,
                test_every_weeks: test_every_weeks.unwrap_or(config.schedule.test_every_weeks),
            };
            cmd_create(&scheduler, &owner, request, json)
        }
        Some(Commands::List { json }) => cmd_list(&scheduler, &owner, json),
        Some(Commands::Show { program_id, json }) => {
            cmd_show(&scheduler, &owner, program_id, json)
        }
        Some(Commands::History { program_id }) => cmd_history(&scheduler, &owner, program_id),
        Some(Commands::Done {
            day_id,
            reps,
            steps,
            json,
        }) => {
            let result = match (reps, steps) {
                (Some(actual_reps), None) => DayResult::Submax {
                    actual_reps,
                    completed_at: None,
                },
                (None, Some(steps)) => DayResult::Ladder {
                    steps,
                    completed_at: None,
                },
                _ => {
                    return Err(Error::Validation(
                        "pass exactly one of --reps or --steps".into(),
                    ))
                }
            };
            cmd_done(&scheduler, &owner, day_id, result, json)
        }
        Some(Commands::Test { day_id, max, json }) => {
            cmd_test(&scheduler, &owner, day_id, max, json)
        }
        Some(Commands::Skip { day_id }) => {
            scheduler.skip_day(&owner, day_id)?;
            println!("✓ Day {} skipped", day_id);
            Ok(())
        }
        Some(Commands::Deactivate { program_id }) => {
            scheduler.deactivate_program(&owner, program_id)?;
            println!("✓ Program {} deactivated", program_id);
            Ok(())
        }
        Some(Commands::Export { program_id, out }) => {
            cmd_export(&scheduler, &owner, program_id, out)
        }
        None => {
            // Default to "today" command
            cmd_today(&scheduler, &owner, false)
        }
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_today(scheduler: &Scheduler<FileStore>, owner: &str, json: bool) -> Result<()> {
    let pick = scheduler.resolve_today(owner, Utc::now())?;

    if json {
        let value = match &pick {
            Some(p) => serde_json::json!({ "program": p.program, "day": p.day }),
            None => serde_json::Value::Null,
        };
        return print_json(&value);
    }

    match pick {
        Some(pick) => display_day(&pick.program, &pick.day),
        None => println!("Nothing scheduled today."),
    }
    Ok(())
}

fn cmd_create(
    scheduler: &Scheduler<FileStore>,
    owner: &str,
    request: NewProgram,
    json: bool,
) -> Result<()> {
    let created = scheduler.create_program(owner, request, Utc::now())?;

    if json {
        return print_json(&serde_json::json!({
            "program": created.program,
            "days_generated": created.days_generated,
        }));
    }

    println!("✓ Program created: {}", created.program.id);
    println!(
        "  {} {}, test max {}, starting at {}",
        created.program.method,
        created.program.exercise,
        created.program.test_max,
        created.program.state
    );
    println!("  {} days scheduled", created.days_generated);
    Ok(())
}

fn cmd_list(scheduler: &Scheduler<FileStore>, owner: &str, json: bool) -> Result<()> {
    let programs = scheduler.list_programs(owner)?;

    if json {
        return print_json(&serde_json::json!(programs));
    }

    if programs.is_empty() {
        println!("No programs yet.");
        return Ok(());
    }

    for program in &programs {
        println!(
            "{} {} {} {} (max {}, {}){}",
            program.id,
            program.created_at.date_naive(),
            program.exercise,
            program.method,
            program.test_max,
            program.state,
            if program.active { "" } else { " [inactive]" }
        );
    }
    Ok(())
}

fn cmd_show(
    scheduler: &Scheduler<FileStore>,
    owner: &str,
    program_id: Uuid,
    json: bool,
) -> Result<()> {
    let view = scheduler.get_program(owner, program_id, Utc::now())?;

    if json {
        return print_json(&serde_json::json!({ "program": view.program, "days": view.days }));
    }

    println!(
        "{} {} (max {}, {}){}",
        view.program.exercise,
        view.program.method,
        view.program.test_max,
        view.program.state,
        if view.program.active { "" } else { " [inactive]" }
    );
    for day in &view.days {
        display_day_line(day);
    }
    Ok(())
}

fn cmd_history(scheduler: &Scheduler<FileStore>, owner: &str, program_id: Uuid) -> Result<()> {
    let days = scheduler.program_history(owner, program_id)?;

    if days.is_empty() {
        println!("No finished days yet.");
    }
    for day in &days {
        display_day_line(day);
    }
    Ok(())
}

fn cmd_done(
    scheduler: &Scheduler<FileStore>,
    owner: &str,
    day_id: Uuid,
    result: DayResult,
    json: bool,
) -> Result<()> {
    let outcome = scheduler.complete_workout_day(owner, day_id, result, Utc::now())?;

    if json {
        return print_json(&serde_json::json!({
            "previous_state": outcome.previous_state,
            "state": outcome.state,
            "refreshed_day": outcome.refreshed_day,
        }));
    }

    println!("\n✓ Workout logged!");
    if outcome.state == outcome.previous_state {
        println!("  Holding at {}", outcome.state);
    } else {
        println!("  {} → {}", outcome.previous_state, outcome.state);
    }
    Ok(())
}

fn cmd_test(
    scheduler: &Scheduler<FileStore>,
    owner: &str,
    day_id: Uuid,
    max: u32,
    json: bool,
) -> Result<()> {
    let outcome = scheduler.complete_test_day(owner, day_id, max, Utc::now())?;

    if json {
        return print_json(&serde_json::json!({
            "test_max": outcome.test_max,
            "state": outcome.state,
            "days_generated": outcome.days_generated,
            "refreshed_day": outcome.refreshed_day,
        }));
    }

    println!("\n✓ Test logged: {} reps", outcome.test_max);
    println!("  Program re-based to {}", outcome.state);
    println!("  {} new days scheduled", outcome.days_generated);
    Ok(())
}

fn cmd_export(
    scheduler: &Scheduler<FileStore>,
    owner: &str,
    program_id: Uuid,
    out: Option<PathBuf>,
) -> Result<()> {
    match out {
        Some(path) => {
            let rows = scheduler.export_program(owner, program_id, File::create(&path)?)?;
            println!("✓ Exported {} days to {}", rows, path.display());
        }
        None => {
            scheduler.export_program(owner, program_id, io::stdout().lock())?;
        }
    }
    Ok(())
}

fn display_day_line(day: &ProgramDay) {
    let detail = match (&day.result, &day.plan) {
        (Some(result), _) => result.summary(),
        (None, Some(plan)) => plan.summary(),
        (None, None) => String::new(),
    };
    println!(
        "  {} {} {:<7} {:<7} {}",
        day.id, day.date, day.day_type, day.status, detail
    );
}

fn display_day(program: &Program, day: &ProgramDay) {
    println!("\n╭─────────────────────────────────────────╮");
    println!(
        "│  {} DAY · {} {}",
        day.day_type.to_string().to_uppercase(),
        program.exercise,
        program.method
    );
    println!("╰─────────────────────────────────────────╯");
    println!();

    match &day.plan {
        Some(Plan::Submax { sets, .. }) => {
            for (i, set) in sets.iter().enumerate() {
                println!(
                    "  → Set {}: {} reps, rest {}s",
                    i + 1,
                    set.target_reps,
                    set.rest_seconds
                );
            }
        }
        Some(Plan::Ladder {
            steps,
            rest_between_steps_seconds,
            rest_between_ladders_seconds,
            ..
        }) => {
            let steps: Vec<String> = steps.iter().map(|s| s.to_string()).collect();
            println!("  → Ladder: {}", steps.join(" · "));
            println!(
                "  → Rest {}s between steps, {}s between ladders",
                rest_between_steps_seconds, rest_between_ladders_seconds
            );
        }
        Some(Plan::Test { instructions, .. }) => {
            println!("  → {}", instructions);
        }
        None => println!("  Rest day."),
    }

    println!();
    println!("  Status: {}", day.status);
    println!("  Day id: {}", day.id);
    println!();
}
