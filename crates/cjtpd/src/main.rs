use std::process::ExitCode;

fn main() -> ExitCode {
    match cjtpd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("cjtpd: {error}");
            ExitCode::FAILURE
        }
    }
}
