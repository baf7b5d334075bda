//! Shelterboard command-line entry point.
//!
//! # Responsibility
//! - Drive ingestion, reconciliation and placement against the local store.
//! - Provide room editing without a graphical floorplan.
//! - Turn every error into a stderr message and a non-zero exit code.

use clap::{Parser, Subcommand, ValueEnum};
use shelterboard_core::{
    default_floorplan, init_logging, init_stderr_logging, Board, Cat, DashboardConfig,
    DropOutcome, IngestionJob, ReconcileOutcome, RecordStore, RecordWrite, RoomPatch,
    ShelterluvClient, SqliteRecordStore,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "shelterboard", version, about = "Shelter floorplan dashboard")]
struct Cli {
    /// JSON config file; environment variables override it.
    #[arg(long, env = "SHELTERBOARD_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import animals from Shelterluv and refresh custody status.
    Sync {
        /// Keep running on the configured interval.
        #[arg(long)]
        watch: bool,
    },
    /// Clear room assignments that point at deleted rooms.
    Reconcile,
    /// Drop a cat onto a target (room id, `<room>-left|right`, `shelter-list`, `foster-list`).
    Place { cat_id: String, drop_target: String },
    /// List in-custody cats with their placement.
    Cats,
    /// Inspect or edit rooms.
    Rooms {
        #[command(subcommand)]
        command: RoomsCommand,
    },
}

#[derive(Debug, Subcommand)]
enum RoomsCommand {
    List,
    /// Write the default floorplan into an empty store.
    Seed,
    Divide { room_id: String, state: Toggle },
    /// Set the capacity, or clear it when `N` is omitted.
    Capacity { room_id: String, max_cats: Option<u32> },
    Remove { room_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Toggle {
    On,
    Off,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = DashboardConfig::load(cli.config.as_deref()).map_err(|err| err.to_string())?;
    start_logging(&config)?;

    let store = SqliteRecordStore::open(&config.db_path).map_err(|err| err.to_string())?;
    match cli.command {
        Command::Sync { watch } => sync(&config, &store, watch),
        Command::Reconcile => reconcile(&store),
        Command::Place {
            cat_id,
            drop_target,
        } => place(&store, &cat_id, &drop_target),
        Command::Cats => list_cats(&store),
        Command::Rooms { command } => rooms(&store, command),
    }
}

fn start_logging(config: &DashboardConfig) -> Result<(), String> {
    match &config.log_dir {
        Some(dir) => {
            let dir = dir
                .to_str()
                .ok_or_else(|| format!("log_dir `{}` is not valid UTF-8", dir.display()))?;
            init_logging(&config.log_level, dir)
        }
        None => init_stderr_logging(&config.log_level),
    }
}

fn sync(config: &DashboardConfig, store: &SqliteRecordStore, watch: bool) -> Result<(), String> {
    let api_key = config.require_api_key().map_err(|err| err.to_string())?;
    let client =
        ShelterluvClient::new(&config.api_base_url, api_key).map_err(|err| err.to_string())?;
    let job = IngestionJob::new(client, config.page_size);

    if watch {
        let never_stop = AtomicBool::new(false);
        job.run_every(
            store,
            Duration::from_secs(config.sync_interval_secs),
            &never_stop,
        );
        return Ok(());
    }

    let report = job.run_once(store).map_err(|err| err.to_string())?;
    println!(
        "synced pages={} fetched={} skipped={} written={}",
        report.pages, report.fetched, report.skipped, report.written
    );
    Ok(())
}

fn reconcile(store: &SqliteRecordStore) -> Result<(), String> {
    let mut board = Board::new(store);
    match board.load().map_err(|err| err.to_string())? {
        ReconcileOutcome::Skipped => println!("skipped: no cats or no rooms"),
        ReconcileOutcome::Clean => println!("clean"),
        ReconcileOutcome::Corrected(count) => println!("cleared {count} stale assignment(s)"),
        ReconcileOutcome::Failed(message) => return Err(message),
    }
    Ok(())
}

fn place(store: &SqliteRecordStore, cat_id: &str, drop_target: &str) -> Result<(), String> {
    let mut board = Board::new(store);
    board.load().map_err(|err| err.to_string())?;

    match board.drop_cat(cat_id, Some(drop_target)) {
        DropOutcome::Placed(_) => {
            if let Some(cat) = board.cat(cat_id) {
                println!("{} -> {}", cat.id, describe_placement(&board, cat));
            }
            Ok(())
        }
        DropOutcome::Rejected(reason) => Err(format!("drop rejected: {reason}")),
        DropOutcome::RolledBack { error, .. } => {
            Err(format!("write failed, {cat_id} is now unassigned: {error}"))
        }
        DropOutcome::Ignored => Err(format!("unknown cat `{cat_id}`")),
    }
}

fn list_cats(store: &SqliteRecordStore) -> Result<(), String> {
    let mut board = Board::new(store);
    board.load().map_err(|err| err.to_string())?;

    for cat in board.shelter_cats() {
        println!("{}\t{}\t{}", cat.id, cat.name, describe_placement(&board, cat));
    }
    for cat in board.foster_cats() {
        println!("{}\t{}\tfoster", cat.id, cat.name);
    }
    Ok(())
}

fn rooms(store: &SqliteRecordStore, command: RoomsCommand) -> Result<(), String> {
    if let RoomsCommand::Seed = command {
        return seed_rooms(store);
    }

    let mut board = Board::new(store);
    board.load().map_err(|err| err.to_string())?;
    board.set_edit_mode(true);

    match command {
        RoomsCommand::List => {
            for room in board.rooms() {
                let occupants = board
                    .room_occupants(&room.id)
                    .map_or(0, |occupants| occupants.total());
                let capacity = room
                    .max_cats
                    .map_or_else(|| "-".to_string(), |max| max.to_string());
                println!(
                    "{}\t{}\t{}x{}@{},{}\tdivided={}\tcats={}/{}",
                    room.id,
                    room.label,
                    room.geometry.width,
                    room.geometry.height,
                    room.geometry.x,
                    room.geometry.y,
                    room.divided,
                    occupants,
                    capacity
                );
            }
        }
        RoomsCommand::Divide { room_id, state } => {
            board
                .set_divided(&room_id, state == Toggle::On)
                .map_err(|err| err.to_string())?;
        }
        RoomsCommand::Capacity { room_id, max_cats } => {
            board
                .set_max_cats(&room_id, max_cats)
                .map_err(|err| err.to_string())?;
        }
        RoomsCommand::Remove { room_id } => {
            let outcome = board.remove_room(&room_id).map_err(|err| err.to_string())?;
            match outcome {
                ReconcileOutcome::Corrected(count) => {
                    println!("removed {room_id}; cleared {count} assignment(s)")
                }
                ReconcileOutcome::Failed(message) => {
                    return Err(format!("removed {room_id}; reconcile failed: {message}"))
                }
                ReconcileOutcome::Skipped | ReconcileOutcome::Clean => {
                    println!("removed {room_id}")
                }
            }
        }
        RoomsCommand::Seed => {}
    }
    Ok(())
}

fn seed_rooms(store: &SqliteRecordStore) -> Result<(), String> {
    if !store.list_rooms().map_err(|err| err.to_string())?.is_empty() {
        return Err("store already has rooms".to_string());
    }
    let writes: Vec<RecordWrite> = default_floorplan()
        .iter()
        .map(|room| RecordWrite::Room {
            id: room.id.clone(),
            patch: RoomPatch::from_room(room),
        })
        .collect();
    store.batch_write(&writes).map_err(|err| err.to_string())?;
    println!("seeded {} rooms", writes.len());
    Ok(())
}

/// Placement as the floorplan shows it; sides only exist in divided rooms.
fn describe_placement<S: RecordStore>(board: &Board<S>, cat: &Cat) -> String {
    match (board.cat_placement(cat), cat.room_id.as_deref()) {
        (Some((room, Some(side))), _) => format!("{} ({})", room.id, side.as_str()),
        (Some((room, None)), _) => room.id.clone(),
        (None, Some(stale_room_id)) => format!("{stale_room_id} (missing room)"),
        (None, None) => "unassigned".to_string(),
    }
}
