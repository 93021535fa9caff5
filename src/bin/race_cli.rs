/// Headless race runner
///
/// Runs one race on a simulated clock advancing one tick interval per tick
/// and prints the final snapshot as JSON.

use ghostrace::command_log::CommandLog;
use ghostrace::config::Config;
use ghostrace::{RaceCommand, RaceController, RaceState};
use std::env;
use std::process;

struct Args {
    config_path: String,
    seed: Option<u64>,
    new_map: bool,
    save_map: Option<String>,
    max_ticks: usize,
}

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {} [--config PATH] [--seed N] [--new-map] [--save-map PATH] [--max-ticks N]",
        program
    );
    eprintln!("Runs one ghost race without a window and prints the result as JSON");
    process::exit(1);
}

fn parse_args() -> Args {
    let argv: Vec<String> = env::args().collect();
    let program = argv.first().map(String::as_str).unwrap_or("race_cli");

    let mut args = Args {
        config_path: "config.toml".to_string(),
        seed: None,
        new_map: false,
        save_map: None,
        max_ticks: 10_000,
    };

    let mut iter = argv.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => args.config_path = iter.next().cloned().unwrap_or_else(|| usage(program)),
            "--seed" => {
                let value = iter.next().and_then(|v| v.parse().ok());
                args.seed = Some(value.unwrap_or_else(|| usage(program)));
            }
            "--new-map" => args.new_map = true,
            "--save-map" => args.save_map = Some(iter.next().cloned().unwrap_or_else(|| usage(program))),
            "--max-ticks" => {
                let value = iter.next().and_then(|v| v.parse().ok());
                args.max_ticks = value.unwrap_or_else(|| usage(program));
            }
            _ => usage(program),
        }
    }

    args
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    let mut config = Config::load_or_default(&args.config_path);
    if args.seed.is_some() {
        config.race.seed = args.seed;
    }

    let mut race = RaceController::from_config(&config);
    let tick = config.race.tick_interval();
    let mut now = 0.0;
    let mut commands = CommandLog::new(now);

    let mut send = |race: &mut RaceController, command: RaceCommand, now: f64| {
        let before = race.state();
        let accepted = race.apply(command, now);
        commands.record(now, command, before, accepted);
    };

    if args.new_map {
        send(&mut race, RaceCommand::GenerateNewMap, now);
    }

    if let Some(path) = &args.save_map {
        match race.grid().save(path) {
            Ok(()) => log::info!("Saved map to {}", path),
            Err(e) => log::warn!("{}", e),
        }
    }

    send(&mut race, RaceCommand::Start, now);

    let mut ticks = 0;
    while race.state() == RaceState::Running && ticks < args.max_ticks {
        now += tick;
        race.tick(now);
        ticks += 1;
    }

    if race.state() == RaceState::Running {
        log::warn!("Race still running after {} ticks", ticks);
    } else {
        log::info!("Race finished after {} ticks", ticks);
    }

    if config.logging.enable_command_log {
        log::info!("Command log:\n{}", commands.summary());
    }

    println!("{}", serde_json::to_string_pretty(&race.snapshot(now))?);
    Ok(())
}
