use anyhow::Result;
use clap::Parser;
use wasmrun_host::value::parse_int;
use wasmrun_runners::{init_logging, ModuleArgs};

/// Call the `ifElseSimple` export of `ifElseSimple.wasm`. The module reports
/// which branch it took through `console.log`
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(value_parser = parse_int, allow_negative_numbers = true)]
    value: i32,
    #[command(flatten)]
    module: ModuleArgs,
}

fn main() -> Result<()> {
    init_logging();
    let Args { value, module } = Args::parse();
    let mut container = module.load("ifElseSimple.wasm")?;

    container.call::<i32, ()>("ifElseSimple", value)
}
