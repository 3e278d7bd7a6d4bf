use std::process::ExitCode;

use gallerist::ui::output;

fn main() -> ExitCode {
    match gallerist::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
