//! decrypt-files - decrypt every sops-encrypted configuration file under
//! `<project>/<environment>` in place.

use std::process::ExitCode;

use clap::Parser;

use sopsbatch::batch;
use sopsbatch::cli::DecryptCli;
use sopsbatch::logging;

fn main() -> ExitCode {
    let config = DecryptCli::parse().into_config();
    logging::init(config.verbose);

    if batch::run(&config) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
