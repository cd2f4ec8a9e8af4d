mod cmd;

use gest::*;
use log::{debug, error, info, warn, LevelFilter};
use std::error::Error;

use crate::cmd::*;

const APP_NAME: &str = "GPU Emulation Stress Test";

fn init_logging(config: &Config) -> std::io::Result<()> {
    let level = if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    match config.log {
        Some(ref path) => simple_logging::log_to_file(path, level),
        None => {
            simple_logging::log_to_stderr(level);
            Ok(())
        }
    }
}

fn restore_board(path: &str) -> ResultsBoard {
    let mut board = ResultsBoard::new();
    match SavedState::from_file(path) {
        Ok(state) => board.restore(&state),
        Err(JsonError::Io(ref err)) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("no saved results at {}", path);
        }
        Err(err) => warn!("ignoring saved results at {} ({})", path, err),
    }
    board
}

fn print_board(board: &ResultsBoard) {
    for &api in ApiLevel::ALL.iter() {
        match board.display(api) {
            Some(line) => println!("{}: {}", api, line),
            None => println!("{}: not run", api),
        }
    }
}

/// Runs one benchmark and returns the screen's result extras, if any.
fn run_benchmark(config: &Config) -> Result<Option<ValueMap>, Box<dyn Error>> {
    let request = config.request()?;
    let (mut screen, completion) = BenchmarkScreen::launch(&request.to_extras())?;

    let window = pollster::block_on(Window::new(true, false))?;
    if !window.surface.supports(request.api_level) {
        error!("{} is not supported on this device", request.api_level);
        screen.destroy();
        return Ok(None);
    }

    let assets = DirectoryAssets::new(&config.assets);
    let mut view = BenchmarkView::initialize(&assets, screen.request(), completion)?;
    info!(
        "running {} with {} objects over {} frames",
        request.api_level,
        request.object_count,
        view.world().total_frames()
    );
    Ok(window.run_benchmark(&mut view, &mut screen)?)
}

fn run(config: Config) -> Result<(), Box<dyn Error>> {
    let mut board = restore_board(&config.results);

    if config.about {
        println!("{}", about_text(APP_NAME, option_env!("CARGO_PKG_VERSION")));
    }
    if config.results_only {
        print_board(&board);
        return Ok(());
    }

    let extras = run_benchmark(&config)?;
    if !board.on_activity_result(extras.as_ref()) {
        info!("no result recorded");
    }
    print_board(&board);

    board.save().to_file(&config.results)?;
    Ok(())
}

pub fn main() {
    let config = match cmd_parse() {
        Ok(config) => config,
        Err(ConfigError::Cli(err)) => err.exit(),
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(2);
        }
    };

    if let Err(err) = init_logging(&config) {
        eprintln!("can't open log file ({})", err);
        std::process::exit(2);
    }

    if let Err(err) = run(config) {
        error!("{}", err);
        std::process::exit(1);
    }
}
