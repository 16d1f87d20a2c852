mod config;
mod message;
mod output;
mod roster;

use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use santapair_core::{generate_pairing_with_exclusions_rng, ExclusionSet, PairingRun};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::SantapairConfig;
use crate::roster::{Roster, Scope, ScopeSelection};

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(
    name = "santapair",
    version,
    about = "Draw, store, and announce Secret Santa assignments over a JSON roster"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log progress details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Draw fresh assignments for scopes that have none yet
    Pair(PairArgs),
    /// Clear stored assignments for the selected scopes and redraw
    Regenerate(RegenerateArgs),
    /// Write one private message file per giver
    Notify(NotifyArgs),
    /// Verify that stored assignments form a valid pairing per scope
    Check(CheckArgs),
    /// Create a default config file at ~/.config/santapair/config.toml
    Init,
}

#[derive(clap::Args)]
struct ScopeArgs {
    /// Only the group with this join code
    #[arg(long, conflicts_with_all = ["ungrouped", "everyone"])]
    group: Option<String>,

    /// Only members that belong to no group
    #[arg(long, conflicts_with = "everyone")]
    ungrouped: bool,

    /// Ignore group boundaries and treat the whole roster as one scope
    #[arg(long)]
    everyone: bool,
}

impl ScopeArgs {
    fn selection(&self) -> ScopeSelection {
        if let Some(code) = &self.group {
            ScopeSelection::Group(code.clone())
        } else if self.ungrouped {
            ScopeSelection::Ungrouped
        } else if self.everyone {
            ScopeSelection::Everyone
        } else {
            ScopeSelection::EveryScope
        }
    }
}

#[derive(Parser)]
struct PairArgs {
    #[command(flatten)]
    scope: ScopeArgs,

    /// Path to the roster JSON file
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Seed the random draw for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Output assignments as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Path to config file (default: ~/.config/santapair/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct RegenerateArgs {
    #[command(flatten)]
    base: PairArgs,

    /// Forbid every giver from drawing their previous recipient again
    #[arg(long)]
    exclude_previous: bool,
}

#[derive(Parser)]
struct NotifyArgs {
    /// Path to the roster JSON file
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Path to a custom message template file.
    /// The template must contain $recipient; $giver, $hint and $wishlist
    /// are also replaced.
    #[arg(long)]
    template: Option<PathBuf>,

    /// Directory to write one message file per giver (default: messages)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Path to config file (default: ~/.config/santapair/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct CheckArgs {
    #[command(flatten)]
    scope: ScopeArgs,

    /// Path to the roster JSON file
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Path to config file (default: ~/.config/santapair/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "santapair=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Pair(args) => run_pair(args),
        Commands::Regenerate(args) => run_regenerate(args),
        Commands::Notify(args) => run_notify(args),
        Commands::Check(args) => run_check(args),
        Commands::Init => {
            let path = config::create_default_config();
            println!("Created config at {}", path.display());
            println!("Edit it to set your default roster path, template, etc.");
        }
    }
}

/// Load config file and resolve the roster path (CLI flag wins).
fn resolve_roster(
    roster_flag: Option<PathBuf>,
    config_flag: Option<PathBuf>,
) -> (SantapairConfig, PathBuf) {
    let config_path = config_flag.unwrap_or_else(config::config_path);
    let cfg = config::load_config(&config_path);

    let roster_path = roster_flag
        .or_else(|| cfg.roster.clone().map(PathBuf::from))
        .unwrap_or_else(|| {
            bail(format!(
                "No roster specified. Pass --roster or set it in {}",
                config_path.display()
            ));
        });
    (cfg, roster_path)
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => {
            debug!(seed = s, "seeded draw");
            SmallRng::seed_from_u64(s)
        }
        None => SmallRng::from_os_rng(),
    }
}

fn load_scopes(roster: &Roster, selection: &ScopeSelection) -> Vec<Scope> {
    let scopes = roster.scopes(selection).unwrap_or_else(|e| bail(e));
    if scopes.is_empty() {
        bail("roster has no members to pair");
    }
    scopes
}

/// Run the engine once per scope. The whole command fails before any write
/// if one scope cannot be paired, so stored assignments stay untouched.
fn pair_scopes(
    roster: &Roster,
    scopes: &[Scope],
    exclusions: &ExclusionSet,
    rng: &mut SmallRng,
) -> Vec<PairingRun> {
    scopes
        .iter()
        .map(|scope| {
            let participants = roster.participants(&scope.member_ids);
            generate_pairing_with_exclusions_rng(&participants, exclusions, rng)
                .unwrap_or_else(|e| bail(format!("cannot pair scope \"{}\": {e}", scope.label)))
        })
        .collect()
}

/// Store all runs on the roster, save in one atomic write, and print them.
fn persist_and_report(
    roster: &mut Roster,
    roster_path: &Path,
    scopes: &[Scope],
    runs: &[PairingRun],
    json: bool,
) {
    for run in runs {
        roster.apply_run(run);
    }
    roster.save(roster_path).unwrap_or_else(|e| bail(e));
    info!(scopes = scopes.len(), path = %roster_path.display(), "assignments stored");

    let mut rows: Vec<output::Row> = Vec::new();
    for (scope, run) in scopes.iter().zip(runs) {
        for a in run {
            rows.push(output::Row {
                scope: scope.label.clone(),
                giver_id: a.giver,
                giver: roster.member_label(a.giver),
                recipient_id: a.recipient,
                recipient: roster.member_label(a.recipient),
            });
        }
    }
    rows.sort_by(|a, b| (&a.scope, &a.giver).cmp(&(&b.scope, &b.giver)));

    if json {
        output::print_json(&rows);
    } else {
        output::print_table(&rows);
    }
}

fn run_pair(args: PairArgs) {
    let (_cfg, roster_path) = resolve_roster(args.roster.clone(), args.config.clone());
    let mut roster = Roster::load(&roster_path).unwrap_or_else(|e| bail(e));
    let scopes = load_scopes(&roster, &args.scope.selection());

    roster.ensure_unassigned(&scopes).unwrap_or_else(|e| bail(e));

    let mut rng = make_rng(args.seed);
    let runs = pair_scopes(&roster, &scopes, &ExclusionSet::new(), &mut rng);
    persist_and_report(&mut roster, &roster_path, &scopes, &runs, args.json);
}

fn run_regenerate(args: RegenerateArgs) {
    let (_cfg, roster_path) =
        resolve_roster(args.base.roster.clone(), args.base.config.clone());
    let mut roster = Roster::load(&roster_path).unwrap_or_else(|e| bail(e));
    let scopes = load_scopes(&roster, &args.base.scope.selection());

    // Clearing happens in memory only; if the redraw fails the file keeps
    // the old assignments.
    let mut cleared = Vec::new();
    for scope in &scopes {
        cleared.extend(roster.clear_assignments(&scope.member_ids));
    }
    info!(cleared = cleared.len(), "previous assignments cleared");

    let exclusions: ExclusionSet = if args.exclude_previous {
        cleared.into_iter().collect()
    } else {
        ExclusionSet::new()
    };

    let mut rng = make_rng(args.base.seed);
    let runs = pair_scopes(&roster, &scopes, &exclusions, &mut rng);
    persist_and_report(&mut roster, &roster_path, &scopes, &runs, args.base.json);
}

fn run_notify(args: NotifyArgs) {
    let (cfg, roster_path) = resolve_roster(args.roster.clone(), args.config.clone());
    let roster = Roster::load(&roster_path).unwrap_or_else(|e| bail(e));

    // Template: CLI arg > config file > built-in default
    let template = {
        let template_path = args.template.clone().or(cfg.template.map(PathBuf::from));
        match template_path {
            Some(path) => message::load_template(&path),
            None => message::DEFAULT_TEMPLATE.to_string(),
        }
    };

    let out_dir = args
        .out_dir
        .clone()
        .or(cfg.out_dir.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("messages"));
    std::fs::create_dir_all(&out_dir).unwrap_or_else(|e| {
        bail(format!(
            "Failed to create output directory {}: {e}",
            out_dir.display()
        ))
    });

    let mut written = 0usize;
    let mut unassigned = 0usize;
    for giver in &roster.members {
        let Some(recipient_id) = giver.recipient else {
            unassigned += 1;
            continue;
        };
        let recipient = roster.member(recipient_id).unwrap_or_else(|| {
            bail(format!(
                "\"{}\" is assigned to unknown member id {recipient_id}; run `santapair check`",
                giver.name
            ))
        });

        let body = message::render_message(&template, giver, recipient);
        let file = out_dir.join(message::message_filename(giver));
        std::fs::write(&file, body)
            .unwrap_or_else(|e| bail(format!("Failed to write {}: {e}", file.display())));
        debug!(giver = %giver.name, path = %file.display(), "message written");
        written += 1;
    }

    if written == 0 {
        bail("no stored assignments to announce; run `santapair pair` first");
    }
    if unassigned > 0 {
        warn!(
            skipped = unassigned,
            "members without a stored assignment were skipped"
        );
    }
    println!("Wrote {written} messages to {}", out_dir.display());
}

fn run_check(args: CheckArgs) {
    let (_cfg, roster_path) = resolve_roster(args.roster.clone(), args.config.clone());
    let roster = Roster::load(&roster_path).unwrap_or_else(|e| bail(e));
    let scopes = roster
        .scopes(&args.scope.selection())
        .unwrap_or_else(|e| bail(e));

    let problems = roster.check_integrity(&scopes);
    if !problems.is_empty() {
        for p in &problems {
            eprintln!("Problem: {p}");
        }
        eprintln!("{} problem(s) found", problems.len());
        std::process::exit(1);
    }

    let assigned = roster
        .members
        .iter()
        .filter(|m| m.recipient.is_some())
        .count();
    if assigned == 0 {
        println!("No stored assignments yet.");
    } else {
        println!(
            "OK: {assigned} stored assignments across {} scope(s), no problems found",
            scopes.len()
        );
    }
}
