//! encrypt-files - encrypt every plaintext configuration file under
//! `<project>/<environment>` in place with sops.

use std::process::ExitCode;

use clap::Parser;

use sopsbatch::batch;
use sopsbatch::cli::EncryptCli;
use sopsbatch::logging;

fn main() -> ExitCode {
    let config = EncryptCli::parse().into_config();
    logging::init(config.verbose);

    if batch::run(&config) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
