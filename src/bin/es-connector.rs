// SPDX-License-Identifier: MIT

use es_connector::cli;
use es_connector::logger;
use es_connector::version;

#[tokio::main]
async fn main() {
    let matches = cli::command().get_matches();

    let verbosity = matches.get_count("verbose");
    logger::init_logger(logger::level_from_verbosity(verbosity));
    logger::init_stdlog();
    version::log_version();

    match cli::main(&matches).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            tracing::error!("{:#}", err);
            std::process::exit(1);
        }
    }
}
