//! shex: run the shared/exclusive lock scenarios.
//!
//! thin orchestration: init -> parse -> run -> report

use shex_core::{run_people, run_stress, Config, Result};
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    init_logger();

    let config = match parse_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    match run(&config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

// nanosecond timestamps, `info` unless RUST_LOG says otherwise
fn init_logger() {
    use std::io::Write;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = buf.timestamp_nanos();
            writeln!(
                buf,
                "[{} {:5} {}:{}] {}",
                ts,
                record.level(),
                record.module_path().unwrap_or(""),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

/// returns `true` when every scenario that ran was consistent.
fn run(config: &Config) -> Result<bool> {
    config.validate()?;
    log::info!("mode={}", config.mode);

    let mut consistent = true;

    if config.mode.runs_people() {
        let report = run_people(&config.people)?;
        log::info!(
            "people: inserted={} len={} found={} not_found={} corrupted={} elapsed={}ms",
            report.inserted,
            report.final_len,
            report.found,
            report.not_found,
            report.corrupted,
            report.elapsed.as_millis()
        );
        log::info!("people: insert {}", report.insert_latency);
        log::info!("people: lookup {}", report.lookup_latency);
        consistent &= report.is_consistent();
    }

    if config.mode.runs_stress() {
        let report = run_stress(&config.stress)?;
        log::info!(
            "stress: counter={} expected={} regressions={} elapsed={}ms",
            report.counter,
            report.expected,
            report.regressions,
            report.elapsed.as_millis()
        );
        log::info!("stress: read waits {}", report.read_waits);
        log::info!("stress: write waits {}", report.write_waits);
        consistent &= report.is_consistent();
    }

    if consistent {
        log::info!("done");
    } else {
        log::error!("inconsistent result");
    }
    Ok(consistent)
}

fn parse_config() -> Result<Config> {
    let args: Vec<String> = env::args().collect();
    let config = Config::from_sources(&args, |var| env::var(var).ok())?;
    config.validate()?;
    Ok(config)
}
