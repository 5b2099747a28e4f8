// src/main.rs

use notifybot::cli::{self, CliArgs};
use notifybot::{logging, run};

#[tokio::main]
async fn main() {
    let args = match cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            std::process::exit(cli::rejection_exit_code(&err));
        }
    };

    if let Err(err) = run_main(args).await {
        eprintln!("{}", err.operator_message());
        std::process::exit(1);
    }
}

async fn run_main(args: CliArgs) -> notifybot::errors::Result<()> {
    logging::init_logging(args.log_level)?;
    run(args).await?;
    Ok(())
}
