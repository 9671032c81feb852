use std::process::ExitCode;

fn main() -> ExitCode {
    medstock_cli::run()
}
