//! Command-line shell over the registration core.
//!
//! Lists registrations, submits groups and solo entries, and deletes records
//! through the passphrase gate. All rules live in `groupform_core`.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use groupform_core::db::{open_db, open_db_in_memory};
use groupform_core::{
    init_logging, ClientState, CoreConfig, GroupForm, LiveRegistrationStore, RecordId,
    RecordKind, RegistrationService, SoloForm, SqliteRegistrationStore, StaticIdentity,
    SubmitError, GROUP_SLOT_COUNT,
};
use log::info;
use std::io::BufRead;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "groupform")]
#[command(about = "Register assignment groups and solo entrants")]
#[command(version)]
struct Cli {
    /// TOML config file
    #[arg(long, env = "GROUPFORM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show all groups and solo entries
    List,
    /// Register a group of 2 to 4 members
    AddGroup {
        /// Member as ROLL:NAME, in slot order
        #[arg(long = "member", value_name = "ROLL:NAME", value_parser = parse_member)]
        members: Vec<(String, String)>,
        /// Lock the group (requires 3 or more members)
        #[arg(long)]
        lock: bool,
    },
    /// Join the solo list
    AddSolo {
        #[arg(long)]
        roll: String,
        #[arg(long)]
        name: String,
    },
    /// Delete a group or solo entry
    Delete {
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long)]
        id: RecordId,
        /// Deletion passphrase; read from stdin when omitted
        #[arg(long)]
        passphrase: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Group,
    Solo,
}

impl From<KindArg> for RecordKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Group => RecordKind::Group,
            KindArg::Solo => RecordKind::Solo,
        }
    }
}

fn parse_member(value: &str) -> Result<(String, String), String> {
    match value.split_once(':') {
        Some((roll, name)) => Ok((roll.to_string(), name.to_string())),
        None => Err(format!("expected ROLL:NAME, got `{value}`")),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CoreConfig::load(cli.config.as_deref()).context("failed to load config")?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).context("failed to initialize logging")?;
    }

    let conn = match &config.db_path {
        Some(path) => open_db(path)
            .with_context(|| format!("failed to open database `{}`", path.display()))?,
        None => open_db_in_memory().context("failed to open in-memory database")?,
    };
    let store = SqliteRegistrationStore::try_new(&conn)?;
    let live = LiveRegistrationStore::new(store);
    let groups_feed = live.watch_groups();
    let solo_feed = live.watch_solo();

    // Anonymous sessions get a fresh identity per invocation.
    let participant_id = config
        .participant_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    info!("event=cli_start module=cli status=ok command={}", command_name(&cli.command));
    let service = RegistrationService::new(live, StaticIdentity::new(participant_id));

    let mut state = ClientState::new(config.deletion_secret.clone());
    let sync = |state: &mut ClientState| {
        if let Some(event) = groups_feed.latest_pending() {
            state.apply_groups_event(event);
        }
        if let Some(event) = solo_feed.latest_pending() {
            state.apply_solo_event(event);
        }
    };
    sync(&mut state);
    if let Some(message) = state.read_error() {
        bail!("{message}");
    }

    match cli.command {
        Commands::List => print_registrations(&state),
        Commands::AddGroup { members, lock } => {
            if members.len() > GROUP_SLOT_COUNT {
                bail!("a group has at most {GROUP_SLOT_COUNT} member slots");
            }
            state.group_form = GroupForm::from_members(members, lock);
            let submitted = service.submit_group(&mut state).map_err(report_submit)?;
            println!("Group submitted successfully! ({})", submitted.id);
            for slot in submitted.ignored_slots {
                eprintln!("Member {slot} was left out: both roll number and name are needed.");
            }
        }
        Commands::AddSolo { roll, name } => {
            state.solo_form = SoloForm::new(roll, name);
            let id = service.submit_solo(&mut state).map_err(report_submit)?;
            println!("You have been added to the solo list. ({id})");
        }
        Commands::Delete {
            kind,
            id,
            passphrase,
        } => {
            service.request_delete(&mut state, kind.into(), id);
            let passphrase = match passphrase {
                Some(value) => value,
                None => read_passphrase()?,
            };
            match service.confirm_delete(&mut state, &passphrase) {
                Ok(_) => println!("Entry deleted successfully."),
                Err(err) => bail!("{}", err.user_message()),
            }
        }
    }

    sync(&mut state);
    Ok(())
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::List => "list",
        Commands::AddGroup { .. } => "add_group",
        Commands::AddSolo { .. } => "add_solo",
        Commands::Delete { .. } => "delete",
    }
}

fn report_submit(err: SubmitError) -> anyhow::Error {
    anyhow::anyhow!("{}", err.user_message())
}

fn read_passphrase() -> Result<String> {
    eprint!("Enter password to delete: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read passphrase")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_registrations(state: &ClientState) {
    println!("Existing Groups");
    let groups = state.numbered_groups();
    if groups.is_empty() {
        println!("  No groups formed yet.");
    }
    for (number, group) in groups {
        let locked = if group.locked { " (Locked)" } else { "" };
        println!("  Group No. {number}{locked}  [{}]", group.id);
        for member in group.present_members() {
            println!("    {} - {}", member.roll, member.name);
        }
    }

    println!("Solo Students");
    if state.solo.is_empty() {
        println!("  No solo students listed yet.");
    }
    for entry in &state.solo {
        println!("  {} - {}  [{}]", entry.roll, entry.name, entry.id);
    }
}
