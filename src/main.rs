use std::process::ExitCode;

use spdl::cli;
use spdl::core::pipeline;
use spdl::reporter::Reporter;

fn main() -> ExitCode {
    cli::init_logging();

    // yt-dlp shares our process group and stops on the same signal.
    if let Err(e) = ctrlc::set_handler(|| {
        eprintln!();
        std::process::exit(pipeline::on_interrupt(&mut Reporter::stdout()));
    }) {
        tracing::warn!("could not install Ctrl-C handler: {e}");
    }

    let outcome = cli::run(std::env::args_os(), &mut Reporter::stdout());
    ExitCode::from(outcome.exit_code())
}
