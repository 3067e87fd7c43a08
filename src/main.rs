use std::process::ExitCode;

fn main() -> ExitCode {
    match ig_message_explorer::cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(ig_message_explorer::cli::commands::EXIT_USAGE)
        }
    }
}
