use std::process::ExitCode;

fn main() -> ExitCode {
    match terradep_cli::main_entry() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("terradep failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}
