use spdl::{cli, setup};

fn main() {
    cli::init_logging();

    if let Err(e) = setup::run_setup() {
        eprintln!("Setup failed: {:#}", e);
        std::process::exit(1);
    }
}
