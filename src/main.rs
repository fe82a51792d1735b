use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    spine_assist_lib::run(spine_assist_lib::config::CliArgs::parse())
}
