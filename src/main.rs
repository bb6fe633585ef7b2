use anyhow::Context;
use clap::Parser;
use gvsmoke::{app, cli::Args, logging};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init(args.verbose, args.quiet);

    let result = app::execute(args)
        .await
        .context("gvsmoke could not run the suite");

    match result {
        Ok(completion) => {
            print!("{}", completion.output);
            if !completion.output.ends_with('\n') {
                println!();
            }
            std::process::exit(completion.exit_code);
        }
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(2);
        }
    }
}
