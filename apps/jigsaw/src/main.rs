mod config;
mod console;
mod render;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use session::{SessionRunner, SessionSetup};
use shared::{
    domain::{ClassConfig, Durations, Roster, SavedClasses, Seed, TopicList},
    text::clean_lines,
};
use storage::{open_store, ClassCatalog, ClassStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{load_settings, normalize_classes_url, Settings},
    console::{configure, run_console, ConsoleExit, SetupOutcome},
    render::render_simple_groups,
};

/// Runs jigsaw lessons: reading, expert groups, then home groups.
#[derive(Parser, Debug)]
#[command(name = "jigsaw", version)]
struct Cli {
    /// JSON file or `sqlite:` URL with the saved classes.
    #[arg(long, global = true)]
    classes_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage saved classes.
    Classes {
        #[command(subcommand)]
        action: ClassesCommand,
    },
    /// Split learners into random groups, ignoring topics.
    Groups {
        #[arg(long, conflicts_with = "students")]
        class: Option<String>,
        /// Names separated by newlines, commas or semicolons.
        #[arg(long)]
        students: Option<String>,
        #[arg(long, default_value_t = 4)]
        count: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run a timed session in the terminal.
    Run(RunArgs),
}

#[derive(Subcommand, Debug)]
enum ClassesCommand {
    List,
    Show {
        name: String,
    },
    Save {
        name: String,
        #[arg(long)]
        students: String,
        #[arg(long)]
        topics: String,
        #[command(flatten)]
        durations: DurationArgs,
    },
    Delete {
        name: String,
    },
}

#[derive(Args, Debug, Default)]
struct DurationArgs {
    /// Reading phase, minutes.
    #[arg(long)]
    dur_read: Option<u32>,
    /// Expert phase, minutes.
    #[arg(long)]
    dur_expert: Option<u32>,
    /// Home group phase, minutes.
    #[arg(long)]
    dur_stamm: Option<u32>,
}

impl DurationArgs {
    fn over(&self, base: Durations) -> Durations {
        Durations {
            read: self.dur_read.unwrap_or(base.read),
            expert: self.dur_expert.unwrap_or(base.expert),
            stamm: self.dur_stamm.unwrap_or(base.stamm),
        }
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    #[arg(long, conflicts_with_all = ["students", "topics"])]
    class: Option<String>,
    #[arg(long, requires = "topics")]
    students: Option<String>,
    #[arg(long, requires = "students")]
    topics: Option<String>,
    #[arg(long)]
    seed: Option<u64>,
    #[command(flatten)]
    durations: DurationArgs,
    /// Print state changes as JSON lines.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings();
    let classes_url =
        normalize_classes_url(cli.classes_url.as_deref().unwrap_or(&settings.classes_url));

    match cli.command {
        Command::Classes { action } => classes(action, &classes_url, &settings).await,
        Command::Groups {
            class,
            students,
            count,
            seed,
        } => groups(class, students, count, seed, &classes_url).await,
        Command::Run(args) => run(args, &classes_url, &settings).await,
    }
}

async fn open_catalog(classes_url: &str) -> Result<ClassCatalog<Box<dyn ClassStore>>> {
    let store = open_store(classes_url)
        .await
        .with_context(|| format!("failed to open class store '{classes_url}'"))?;
    Ok(ClassCatalog::open(store).await?)
}

async fn load_class(classes_url: &str, name: &str) -> Result<SessionSetup> {
    let catalog = open_catalog(classes_url).await?;
    let Some(config) = catalog.get(name) else {
        bail!("no saved class named '{}'", name.trim());
    };
    Ok(SessionSetup::from_class(name, config))
}

async fn classes(action: ClassesCommand, classes_url: &str, settings: &Settings) -> Result<()> {
    let mut catalog = open_catalog(classes_url).await?;

    match action {
        ClassesCommand::List => {
            if catalog.names().is_empty() {
                println!("No saved classes in {classes_url}.");
            }
            for (name, config) in catalog.classes() {
                println!(
                    "{name}  ({} students, {} topics)",
                    config.students.len(),
                    config.topics.len()
                );
            }
        }
        ClassesCommand::Show { name } => {
            let Some(config) = catalog.get(&name) else {
                bail!("no saved class named '{}'", name.trim());
            };
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ClassesCommand::Save {
            name,
            students,
            topics,
            durations,
        } => {
            let config = ClassConfig::new(
                &Roster::from_names(clean_lines(&students)),
                &TopicList::from_names(clean_lines(&topics)),
                durations.over(settings.durations),
            );
            catalog.upsert(&name, config).await?;
            println!("Saved class '{}'.", name.trim());
        }
        ClassesCommand::Delete { name } => {
            catalog.remove(&name).await?;
            println!("Deleted class '{}'.", name.trim());
        }
    }
    Ok(())
}

async fn groups(
    class: Option<String>,
    students: Option<String>,
    count: usize,
    seed: Option<u64>,
    classes_url: &str,
) -> Result<()> {
    let setup = match (class, students) {
        (Some(name), _) => load_class(classes_url, &name).await?,
        (None, Some(students)) => {
            SessionSetup::new(Roster::from_names(clean_lines(&students)), TopicList::default())
        }
        (None, None) => bail!("pass --class or --students"),
    };

    let (groups, seed) = setup.simple_groups(count, seed.map(Seed))?;
    print!("{}", render_simple_groups(&groups, seed));
    Ok(())
}

async fn run(args: RunArgs, classes_url: &str, settings: &Settings) -> Result<()> {
    let setup = match (&args.class, &args.students, &args.topics) {
        (Some(name), _, _) => load_class(classes_url, name).await?,
        (None, Some(students), Some(topics)) => SessionSetup::new(
            Roster::from_names(clean_lines(students)),
            TopicList::from_names(clean_lines(topics)),
        )
        .with_durations(settings.durations),
        _ => bail!("pass --class, or --students together with --topics"),
    };
    let durations = args.durations.over(setup.durations);
    let setup = setup.with_durations(durations);
    let setup = match args.seed {
        Some(seed) => setup.with_seed(Seed(seed)),
        None => setup,
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut setup = setup;
    loop {
        let runner = SessionRunner::new(setup.start()?, settings.tick);
        let fresh = match run_console(runner, &mut lines, args.json).await? {
            ConsoleExit::Restart(fresh) => fresh.with_durations(settings.durations),
            ConsoleExit::Quit | ConsoleExit::InputClosed => break,
        };

        println!("Session discarded.");
        let classes = saved_classes(classes_url).await;
        match configure(fresh, &mut lines, &classes).await? {
            SetupOutcome::Ready(next) => setup = next,
            SetupOutcome::Quit => break,
        }
    }
    info!("console closed");
    Ok(())
}

/// Saved classes for the setup stage; an unreadable store only disables
/// `class <name>`.
async fn saved_classes(classes_url: &str) -> SavedClasses {
    match open_catalog(classes_url).await {
        Ok(catalog) => catalog.classes().clone(),
        Err(err) => {
            warn!(error = %format!("{err:#}"), "saved classes unavailable");
            SavedClasses::new()
        }
    }
}
