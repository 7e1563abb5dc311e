use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{error, info};

use tankalore_app::game_loop::spawn_game_loop;
use tankalore_app::state::{new_shared_snapshot, LoopOptions};
use tankalore_progression::save_load::{load_or_default, save_to_file, SaveData};
use tankalore_sim::config::GameConfig;

const USAGE: &str = "usage: tankalore [--config FILE] [--seed N] [--ticks N] \
[--save-dir DIR] [--slot NAME] [--realtime] [--manual]";

#[derive(Debug)]
struct Args {
    config: Option<PathBuf>,
    seed: Option<u64>,
    ticks: Option<u64>,
    save_dir: PathBuf,
    slot: String,
    realtime: bool,
    autopilot: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args {
        config: None,
        seed: None,
        ticks: None,
        save_dir: PathBuf::from("saves"),
        slot: "default".into(),
        realtime: false,
        autopilot: true,
    };
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .ok_or_else(|| format!("Missing value for {flag}\n{USAGE}"))
        };
        match arg.as_str() {
            "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            "--seed" => {
                parsed.seed = Some(
                    value("--seed")?
                        .parse()
                        .map_err(|e| format!("Invalid --seed: {e}"))?,
                )
            }
            "--ticks" => {
                parsed.ticks = Some(
                    value("--ticks")?
                        .parse()
                        .map_err(|e| format!("Invalid --ticks: {e}"))?,
                )
            }
            "--save-dir" => parsed.save_dir = PathBuf::from(value("--save-dir")?),
            "--slot" => parsed.slot = value("--slot")?,
            "--realtime" => parsed.realtime = true,
            "--manual" => parsed.autopilot = false,
            "-h" | "--help" => return Err(USAGE.to_string()),
            other => return Err(format!("Unknown argument: {other}\n{USAGE}")),
        }
    }
    Ok(parsed)
}

fn run(args: Args) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => GameConfig::from_json_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.sim.seed = seed;
    }

    let save = load_or_default(&args.save_dir, &args.slot);
    let options = LoopOptions {
        max_ticks: args.ticks,
        realtime: args.realtime,
        autostart: true,
        autopilot: args.autopilot,
        stop_on_game_over: true,
    };
    info!(
        "Starting run: seed {}, slot '{}', autopilot {}",
        config.sim.seed, args.slot, args.autopilot
    );

    let (_cmd_tx, handle) = spawn_game_loop(config, save.store, options, new_shared_snapshot())?;
    let report = handle
        .join()
        .map_err(|_| "Game loop thread panicked".to_string())?;

    info!(
        "Run finished after {} ticks: {:?}, {} waves, {} bosses, level {}, {:.1}s survived",
        report.ticks,
        report.game_over,
        report.waves_completed,
        report.bosses_defeated,
        report.final_level,
        report.survival_secs
    );

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let data = SaveData {
        slot_name: args.slot.clone(),
        timestamp,
        store: report.store,
    };
    save_to_file(&args.save_dir, &args.slot, &data)?;
    info!("Saved progress to slot '{}'", args.slot);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = parse_args(std::env::args().skip(1)).and_then(run);
    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}
