//! Convert a VASP XDATCAR trajectory into a Materials Studio arc archive.
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Convert a VASP XDATCAR trajectory into a Materials Studio arc archive.
///
/// Frames that are cut off at the end of the file are skipped with a warning. Set `RUST_LOG`
/// to `info` or `debug` for more details about the conversion.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Input path (XDATCAR).
    #[arg(default_value = "XDATCAR")]
    input: PathBuf,

    /// Output path (arc).
    #[arg(default_value = "XDATCAR.arc")]
    output: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    // All frames share the time at which the conversion started.
    let timestamp = xdatarc::timestamp_now();
    match xdatarc::convert(&args.input, &args.output, &timestamp) {
        Ok(nframes) => {
            println!("converted {nframes} frames -> {}", args.output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
