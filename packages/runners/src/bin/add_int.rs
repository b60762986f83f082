use anyhow::Result;
use clap::Parser;
use wasmrun_host::value::parse_int;
use wasmrun_runners::{init_logging, ModuleArgs};

/// Add two integers with the `AddInt` export of `addInt.wasm`
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(value_parser = parse_int, allow_negative_numbers = true)]
    a: i32,
    #[arg(value_parser = parse_int, allow_negative_numbers = true)]
    b: i32,
    #[command(flatten)]
    module: ModuleArgs,
}

fn main() -> Result<()> {
    init_logging();
    let Args { a, b, module } = Args::parse();
    let mut container = module.load("addInt.wasm")?;

    let sum: i32 = container.call("AddInt", (a, b))?;
    println!("{a} + {b} = {sum}");

    Ok(())
}
