use std::path::PathBuf;

use anyhow::Result;
use clap::{error::ErrorKind, CommandFactory, Parser};
use wasmrun_host::{
    console::Console,
    runtime::Container,
    value::{ArgumentError, Number},
};
use wasmrun_runners::init_logging;

/// Call exported functions of any module with numeric arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The WASM module. This can be text or binary format
    file: PathBuf,

    /// The export to call. Every exported function is called if this is
    /// omitted
    #[arg(long, value_name = "NAME")]
    invoke: Option<String>,

    /// Arguments, converted to the parameter types of the export
    #[arg(allow_negative_numbers = true)]
    args: Vec<String>,
}

fn main() -> Result<()> {
    init_logging();
    let Args {
        file,
        invoke,
        args,
    } = Args::parse();
    let mut container = Container::from_file(&file, Console::stdout())?;

    let names = match invoke {
        Some(name) => vec![name],
        None => container.exported_functions(),
    };

    // Every argument is checked against every selected export before anything
    // runs, so a bad argument leaves stdout empty.
    let calls = names
        .into_iter()
        .map(|name| {
            let params = container.parse_args(&name, &args)?;
            Ok((name, params))
        })
        .collect::<Result<Vec<_>>>();

    let calls = match calls {
        Ok(calls) => calls,
        Err(error) => match error.downcast_ref::<ArgumentError>() {
            Some(error) => Args::command()
                .error(ErrorKind::ValueValidation, error)
                .exit(),
            None => return Err(error),
        },
    };

    for (name, params) in calls {
        let results = container.invoke(&name, &params)?;
        println!("{}", describe_call(&name, &args, &results));
    }

    Ok(())
}

fn describe_call(name: &str, args: &[String], results: &[Number]) -> String {
    let call = format!("{name}({})", args.join(", "));

    if results.is_empty() {
        call
    } else {
        let results: Vec<String> = results.iter().map(Number::to_string).collect();
        format!("{call} = {}", results.join(", "))
    }
}
