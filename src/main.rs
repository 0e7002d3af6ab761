//! Beam Guard terminal host
//!
//! Drives one session in real time. Press Enter to intercept, `r` + Enter to
//! retry after the run ends, `q` + Enter to quit. `--autopilot` plays by itself.

use std::io::BufRead;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, bail};
use crossbeam_channel::{Sender, select, unbounded};

use beam_guard::{
    Clock, Level, LevelId, Millis, Outcome, Phase, Session, SessionEvent, SystemClock, Tuning,
};

/// Host frame pacing (the session ticks on its own cadence inside `advance`)
const FRAME: Duration = Duration::from_millis(10);

const USAGE: &str =
    "usage: beam-guard [--level N] [--endless] [--tuning FILE] [--seed S] [--autopilot]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostInput {
    Act,
    Retry,
    Quit,
}

#[derive(Debug)]
struct Options {
    level: LevelId,
    endless: bool,
    tuning: Option<PathBuf>,
    seed: u64,
    autopilot: bool,
}

fn parse_args() -> anyhow::Result<Options> {
    let mut opts = Options {
        level: LevelId(1),
        endless: false,
        tuning: None,
        seed: rand::random(),
        autopilot: false,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--level" => {
                let value = args.next().context("--level needs a value")?;
                opts.level = LevelId(value.parse().context("--level must be a number")?);
            }
            "--endless" => opts.endless = true,
            "--tuning" => {
                opts.tuning = Some(args.next().context("--tuning needs a path")?.into());
            }
            "--seed" => {
                let value = args.next().context("--seed needs a value")?;
                opts.seed = value.parse().context("--seed must be a number")?;
            }
            "--autopilot" => opts.autopilot = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unknown argument `{other}`\n{USAGE}"),
        }
    }
    Ok(opts)
}

/// Read stdin lines on a dedicated thread and forward them as inputs
fn spawn_input(sender: Sender<HostInput>) -> anyhow::Result<()> {
    thread::Builder::new()
        .name("beam-guard-input".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let input = match line.as_deref().map(str::trim) {
                    Ok("q") | Err(_) => HostInput::Quit,
                    Ok("r") => HostInput::Retry,
                    Ok(_) => HostInput::Act,
                };
                if sender.send(input).is_err() || input == HostInput::Quit {
                    return;
                }
            }
            let _ = sender.send(HostInput::Quit);
        })
        .context("failed to spawn input thread")?;
    Ok(())
}

/// Demo player: intercepts each real beam at impact and lets decoys pass
fn autopilot(session: &mut Session, now: Millis) {
    if session.phase() != Phase::Playing {
        return;
    }
    let due = session
        .beams()
        .iter()
        .any(|b| !b.decoy && b.progress(now) >= 1.0);
    if due {
        session.submit_action(now);
    }
}

fn report(event: &SessionEvent, level: &Level) {
    match event {
        SessionEvent::Countdown { value } => println!("{value}..."),
        SessionEvent::PlayingStarted { .. } => {
            println!("GO! {} fires at {}!", level.opponent, level.player)
        }
        SessionEvent::BeamSpawned { beam } if beam.decoy => {
            println!("  ~ beam #{} (feint) - hold!", beam.id.0)
        }
        SessionEvent::BeamSpawned { beam } => println!("  > beam #{} incoming", beam.id.0),
        SessionEvent::BeamHit { id, .. } => {
            println!("  * {}! beam #{} blocked", level.action, id.0)
        }
        SessionEvent::DecoyAbsorbed { id, .. } => println!("  - feint #{} absorbed", id.0),
        SessionEvent::FalseAction { .. } => println!("  ! nothing to block"),
        SessionEvent::BeamMissed { id, .. } => println!("  ! beam #{} got through", id.0),
        SessionEvent::DecoyExpired { .. } => {}
        SessionEvent::Completed(done) => {
            let verdict = match done.outcome {
                Outcome::Victory => "VICTORY",
                Outcome::GameOver => "GAME OVER",
            };
            println!(
                "{verdict} - level {} ({:?}) score {} after {:.1}s",
                done.level.0,
                done.mode,
                done.score,
                done.elapsed_ms as f64 / 1000.0
            );
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = parse_args()?;
    log::debug!("Options: {opts:?}");

    let tuning = match &opts.tuning {
        Some(path) => Tuning::load(path)
            .with_context(|| format!("loading tuning from {}", path.display()))?,
        None => Tuning::default(),
    };
    let level = Level::by_id(opts.level)
        .with_context(|| format!("no level with id {}", opts.level.0))?;

    let clock = SystemClock::new();
    let mut session = Session::new(tuning, opts.seed)?;
    log::info!("Beam Guard starting (seed {})", opts.seed);

    println!(
        "Level {}: {} vs {} - press Enter to {}",
        level.id.0, level.player, level.opponent, level.action
    );
    session.start(level.id, level.mode(opts.endless), clock.now_ms())?;

    // The sender stays alive here so the channel never disconnects in autopilot.
    let (input_tx, input_rx) = unbounded();
    if !opts.autopilot {
        spawn_input(input_tx.clone())?;
    }

    loop {
        select! {
            recv(input_rx) -> input => match input {
                Ok(HostInput::Act) => {
                    session.submit_action(clock.now_ms());
                }
                Ok(HostInput::Retry) => {
                    if let Err(e) = session.retry(clock.now_ms()) {
                        println!("{e}");
                    }
                }
                Ok(HostInput::Quit) | Err(_) => break,
            },
            default(FRAME) => {}
        }

        let now = clock.now_ms();
        session.advance(now);
        if opts.autopilot {
            autopilot(&mut session, now);
        }

        let mut finished = false;
        for event in session.drain_events() {
            finished |= matches!(event, SessionEvent::Completed(_));
            report(&event, &level);
        }
        if finished {
            if opts.autopilot {
                break;
            }
            println!("r + Enter to retry, q + Enter to quit");
        }
    }

    drop(input_tx);
    log::info!("Beam Guard exiting");
    Ok(())
}
