use std::process::ExitCode;

fn main() -> ExitCode {
    venuefit_cli::run()
}
