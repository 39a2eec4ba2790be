use std::process::ExitCode;

fn main() -> ExitCode {
    balview_cli::run()
}
