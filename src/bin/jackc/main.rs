//! # jackc
//!
//! This binary drives the compiler over one or more source paths,
//! compiling each to a sibling `.vm` file.
mod cli;

use cli::Cli;
use jackc::driver::{self, RunOptions};

fn main() {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    let options = RunOptions {
        dump_tokens: args.dump_tokens,
    };

    let exit_code = driver::run(&args.paths, &options);
    std::process::exit(exit_code);
}
