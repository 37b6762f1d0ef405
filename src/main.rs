use std::process::ExitCode;

fn main() -> ExitCode {
    match skim_prep::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if !err.message().is_empty() {
                eprintln!("{err}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}
