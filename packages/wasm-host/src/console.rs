//! Host side of the `console` import namespace.
//!
//! A module can import any of [`MEMBERS`] from `console`, with whatever
//! numeric parameters it likes. Each call prints its arguments on one line.
use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use wasmtime::{Caller, ExternType, Linker, Module, Val};

use crate::value::Number;

pub const NAMESPACE: &str = "console";

pub const MEMBERS: [&str; 5] = ["log", "info", "warn", "error", "debug"];

pub struct Console {
    out: Box<dyn Write + Send>,
}

impl Console {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self { out: Box::new(out) }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    fn print(&mut self, args: &[Val]) -> Result<()> {
        let line = args
            .iter()
            .map(|arg| Number::try_from(arg).map(|n| n.to_string()))
            .collect::<Result<Vec<_>>>()?
            .join(" ");
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}

/// Define every `console` function `module` imports, using the signature the
/// module declares.
pub fn link(linker: &mut Linker<Console>, module: &Module) -> Result<()> {
    for import in module.imports() {
        if import.module() != NAMESPACE {
            continue;
        }

        let name = import.name();

        if !MEMBERS.contains(&name) {
            bail!("Unknown import `{NAMESPACE}.{name}`");
        }

        let ExternType::Func(func_ty) = import.ty() else {
            bail!("Import `{NAMESPACE}.{name}` must be a function");
        };

        if func_ty.results().len() != 0 {
            bail!("Import `{NAMESPACE}.{name}` must not return anything");
        }

        if let Some(ty) = func_ty.params().find(|ty| !Number::is_numeric(ty)) {
            bail!("Import `{NAMESPACE}.{name}` has unsupported parameter type `{ty}`");
        }

        tracing::debug!(%name, params = func_ty.params().len(), "Linking console import");

        linker
            .func_new(
                NAMESPACE,
                name,
                func_ty,
                |mut caller: Caller<'_, Console>, args: &[Val], _results: &mut [Val]| {
                    caller.data_mut().print(args)
                },
            )
            .with_context(|| format!("Defining `{NAMESPACE}.{name}`"))?;
    }

    Ok(())
}
