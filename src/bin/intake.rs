use std::process;

fn main() {
    intake_core::init();

    if let Err(err) = intake_core::cli::run_cli() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
