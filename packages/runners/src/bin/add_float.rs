use anyhow::Result;
use clap::Parser;
use wasmrun_host::value::{parse_float, Number};
use wasmrun_runners::{init_logging, ModuleArgs};

/// Add two numbers with the `addFloat` export of `addFloat.wasm`, then again
/// on the host
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(value_parser = parse_float, allow_negative_numbers = true)]
    a: f64,
    #[arg(value_parser = parse_float, allow_negative_numbers = true)]
    b: f64,
    #[command(flatten)]
    module: ModuleArgs,
}

fn main() -> Result<()> {
    init_logging();
    let Args { a, b, module } = Args::parse();
    let mut container = module.load("addFloat.wasm")?;

    let sum: f64 = container.call("addFloat", (a, b))?;
    let host_sum = Number::F64(a + b);
    let (a, b, sum) = (Number::F64(a), Number::F64(b), Number::F64(sum));
    println!("{a} + {b} = {sum}");
    println!("{host_sum}");

    Ok(())
}
