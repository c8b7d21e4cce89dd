//! Planner - local-first study and task planning

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = study_planner::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
