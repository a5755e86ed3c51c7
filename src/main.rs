use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod admin;
mod config;
mod dashboard;
mod data;
mod error;
mod greeting;
mod metrics;
mod models;
mod pagination;
mod report;
mod search;
mod session;
mod views;

use config::DashboardConfig;
use models::StudentRecord;
use pagination::Paginator;
use session::{Session, Viewer};

const GREETING_REFRESH: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "registration-dashboard")]
#[command(about = "Course registration dashboard for student progress and payments", long_about = None)]
struct Cli {
    /// Registration export (JSON with a "Form Responses 1" table)
    #[arg(long, global = true, env = "REGISTRATION_DATA")]
    data: Option<PathBuf>,

    /// Payment ledger to merge onto registrations by full name
    #[arg(long, global = true, env = "REGISTRATION_LEDGER")]
    ledger: Option<PathBuf>,

    /// Viewer identity: "admin" or a student index
    #[arg(long = "as", global = true, default_value = "admin")]
    viewer: String,

    /// Terminal width used to choose between table and card layouts
    #[arg(long, global = true, env = "COLUMNS", default_value_t = 120)]
    columns: u16,

    /// Colour progress bars by band
    #[arg(long, global = true)]
    color: bool,

    #[arg(long, global = true, default_value_t = pagination::DEFAULT_PAGE_SIZE)]
    page_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the built-in sample registrations as JSON
    Seed {
        #[arg(long, default_value = "registrations.json")]
        out: PathBuf,
    },
    #[command(flatten)]
    View(ViewCommand),
}

#[derive(Subcommand)]
enum ViewCommand {
    /// Print headline statistics
    Stats,
    /// List one page of students
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,
    },
    /// Show the full record for one student
    Show {
        /// Row in the full list (admins only; students always see their own record)
        #[arg(long)]
        index: Option<usize>,
    },
    /// Browse, search and open students interactively
    Browse,
    /// Student home view with a greeting
    Home {
        /// Student to preview (admins only; students always see their own home)
        #[arg(long)]
        index: Option<usize>,
        /// Keep running and refresh the greeting every minute
        #[arg(long)]
        watch: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export summary rows as CSV
    Export {
        #[arg(long, default_value = "students.csv")]
        out: PathBuf,
    },
}

fn load(config: &DashboardConfig) -> anyhow::Result<Vec<StudentRecord>> {
    let mut students = match &config.data_path {
        Some(path) => data::load_students(path)
            .with_context(|| format!("failed to load registrations from {}", path.display()))?,
        None => {
            info!("no registration export given, using built-in sample data");
            data::seed()
        }
    };

    if let Some(path) = &config.ledger_path {
        let ledger = data::load_ledger(path)
            .with_context(|| format!("failed to load payment ledger from {}", path.display()))?;
        let applied = data::apply_ledger(&mut students, &ledger);
        info!(applied, "merged payment ledger");
    }

    Ok(students)
}

fn print_home(student: &StudentRecord, config: &DashboardConfig, viewer: Viewer) {
    let derived = metrics::derive(student, config.total_fee);
    let band = metrics::ProgressBand::for_percentage(derived.progress_percentage);
    println!("{}", greeting::greet_now(&student.full_name));
    println!("Track your progress in the African Website Builders course");
    println!();
    println!(
        "Course Progress  {}% ({})",
        derived.progress_percentage,
        band.label()
    );
    println!("School           {}", student.school_name);
    println!("Role             {}", student.role_at_school);
    println!("Study Device     {}", student.study_device);
    println!();
    print!("{}", views::render_detail(student, &config.view_config(viewer)));
}

fn browse(students: &[StudentRecord], config: &DashboardConfig) -> anyhow::Result<()> {
    let mut session = admin::AdminSession::new(
        students,
        config.view_config(Viewer::Admin),
        config.layout(),
        config.page_size,
    );
    print!("{}", session.render());
    println!("Type 'help' for commands.");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let Some(command) = admin::Command::parse(&line) else {
            continue;
        };
        match session.apply(command) {
            admin::Outcome::Redraw => print!("{}", session.render()),
            admin::Outcome::Unchanged => {}
            admin::Outcome::Help => println!("{}", admin::HELP),
            admin::Outcome::Quit => break,
        }
    }

    Ok(())
}

async fn watch_greeting(full_name: &str) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(GREETING_REFRESH);
    // first tick completes immediately and the home view already printed it
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                println!("{}", greeting::greet_now(full_name));
            }
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for ctrl-c")?;
                info!("stopping greeting refresh");
                return Ok(());
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "registration_dashboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = DashboardConfig {
        data_path: cli.data,
        ledger_path: cli.ledger,
        page_size: cli.page_size,
        columns: cli.columns,
        color: cli.color,
        ..DashboardConfig::default()
    };

    let command = match cli.command {
        Commands::Seed { out } => {
            std::fs::write(&out, data::to_json(&data::seed())?)?;
            println!("Sample registrations written to {}.", out.display());
            return Ok(());
        }
        Commands::View(command) => command,
    };

    let students = load(&config)?;
    let viewer: Viewer = cli.viewer.parse()?;
    let session = Session::new(viewer, &students)?;
    info!(?viewer, students = students.len(), "dataset ready");

    match command {
        ViewCommand::Stats => {
            let students = session.require_admin()?;
            print!("{}", views::render_stats(&dashboard::compute_stats(students, config.total_fee)));
        }
        ViewCommand::List {
            search: query,
            page,
        } => {
            let students = session.require_admin()?;
            let filtered = search::filter_students(students, query.as_deref().unwrap_or(""));
            let mut pager = Paginator::new(config.page_size, filtered.len());
            pager.go_to_page(page);
            print!(
                "{}",
                views::render_summary(
                    pager.slice(&filtered),
                    pager.offset() + 1,
                    config.layout(),
                    &config.view_config(viewer),
                )
            );
            println!("{}", views::render_page_footer(&pager.meta()));
        }
        ViewCommand::Show { index } => {
            let student = session.student(index)?;
            print!("{}", views::render_detail(student, &config.view_config(viewer)));
        }
        ViewCommand::Browse => {
            let students = session.require_admin()?;
            browse(students, &config)?;
        }
        ViewCommand::Home { index, watch } => {
            let student = session.student(index)?;
            print_home(student, &config, viewer);
            if watch {
                watch_greeting(&student.full_name).await?;
            }
        }
        ViewCommand::Report { search: query, out } => {
            let students = session.require_admin()?;
            let report = report::build_report(
                query.as_deref(),
                chrono::Local::now().date_naive(),
                students,
                config.total_fee,
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        ViewCommand::Export { out } => {
            let students = session.require_admin()?;
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            let written = data::export_csv(file, students, config.total_fee)?;
            println!("Exported {written} students to {}.", out.display());
        }
    }

    Ok(())
}
