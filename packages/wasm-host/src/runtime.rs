use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use wasmtime::{Engine, Func, Instance, Linker, Module, Store, Val, WasmParams, WasmResults};

use crate::{
    console::{self, Console},
    value::{ArgumentError, Number},
};

pub struct Container {
    instance: Instance,
    store: Store<Console>,
}

impl Container {
    /// Load a module from `file`. This can be text or binary format.
    pub fn from_file(file: &Path, console: Console) -> Result<Self> {
        tracing::info!(file = %file.display(), "Loading module");
        let wasm = fs::read(file).context(format!("Opening file {file:?}"))?;
        Self::from_bytes(&wasm, console).context(format!("Loading module {file:?}"))
    }

    pub fn from_bytes(wasm: &[u8], console: Console) -> Result<Self> {
        let engine = Engine::default();
        let module = Module::new(&engine, wasm)?;

        let mut linker = Linker::new(&engine);
        console::link(&mut linker, &module)?;

        let mut store = Store::new(&engine, console);
        let instance = linker.instantiate(&mut store, &module)?;
        tracing::debug!("Instantiated module");

        Ok(Self { instance, store })
    }

    /// Names of the exported functions, in export order.
    pub fn exported_functions(&mut self) -> Vec<String> {
        self.instance
            .exports(&mut self.store)
            .filter_map(|export| {
                let name = export.name().to_string();
                export.into_func().map(|_| name)
            })
            .collect()
    }

    /// Call the export `name` with a statically known signature.
    pub fn call<Params, Results>(&mut self, name: &str, params: Params) -> Result<Results>
    where
        Params: WasmParams,
        Results: WasmResults,
    {
        tracing::debug!(%name, "Calling export");
        let func = self
            .instance
            .get_typed_func::<Params, Results>(&mut self.store, name)
            .with_context(|| format!("Looking up export `{name}`"))?;
        func.call(&mut self.store, params)
            .with_context(|| format!("Calling `{name}`"))
    }

    /// Call the export `name` with the signature the module declares for it.
    pub fn invoke(&mut self, name: &str, args: &[Number]) -> Result<Vec<Number>> {
        let func = self.func(name)?;
        let ty = func.ty(&self.store);

        if ty.params().len() != args.len() {
            bail!(ArgumentError::Arity {
                name: name.to_string(),
                expected: ty.params().len(),
                actual: args.len(),
            });
        }

        let params: Vec<Val> = args.iter().copied().map(Val::from).collect();
        let mut results = vec![Val::I32(0); ty.results().len()];

        tracing::debug!(%name, ?args, "Invoking export");
        func.call(&mut self.store, &params, &mut results)
            .with_context(|| format!("Calling `{name}`"))?;

        results.iter().map(Number::try_from).collect()
    }

    /// Parse `args` against the parameter types of `name`.
    ///
    /// Arity and parse failures are reported as
    /// [`ArgumentError`](crate::value::ArgumentError), so callers can
    /// `downcast_ref` to tell them apart from a missing export.
    pub fn parse_args(&mut self, name: &str, args: &[String]) -> Result<Vec<Number>> {
        let ty = self.func(name)?.ty(&self.store);

        if ty.params().len() != args.len() {
            bail!(ArgumentError::Arity {
                name: name.to_string(),
                expected: ty.params().len(),
                actual: args.len(),
            });
        }

        let args = ty
            .params()
            .zip(args)
            .map(|(param, arg)| Number::parse(arg, &param))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(args)
    }

    /// Parse `args` against the parameter types of `name`, then invoke it.
    pub fn invoke_text(&mut self, name: &str, args: &[String]) -> Result<Vec<Number>> {
        let args = self.parse_args(name, args)?;
        self.invoke(name, &args)
    }

    fn func(&mut self, name: &str) -> Result<Func> {
        let Some(func) = self.instance.get_func(&mut self.store, name) else {
            bail!("failed to find function export `{name}`");
        };

        Ok(func)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use indoc::indoc;

    use super::Container;
    use crate::{
        console::Console,
        test_util::SharedBuffer,
        value::{ArgumentError, Number},
    };

    const ARITHMETIC: &str = indoc! {r#"
        (module
          (func (export "AddInt") (param i32 i32) (result i32)
            local.get 0
            local.get 1
            i32.add)
          (func (export "addFloat") (param f64 f64) (result f64)
            local.get 0
            local.get 1
            f64.add)
          (func (export "pair") (result i64 f32)
            i64.const -4
            f32.const 0.5)
          (memory (export "memory") 1))
    "#};

    const LOGGING: &str = indoc! {r#"
        (module
          (import "console" "log" (func $log (param i32)))
          (import "console" "warn" (func $warn (param i32 f64)))
          (func (export "ifElseSimple") (param i32)
            local.get 0
            i32.const 0
            i32.gt_s
            if
              i32.const 1
              call $log
            else
              i32.const 0
              call $log
            end)
          (func (export "both") (param i32 f64)
            local.get 0
            local.get 1
            call $warn))
    "#};

    fn container(wat: &str) -> Container {
        Container::from_bytes(wat.as_bytes(), Console::new(SharedBuffer::default())).unwrap()
    }

    #[test]
    fn typed_call() {
        let mut container = container(ARITHMETIC);
        let sum: i32 = container.call("AddInt", (2, 3)).unwrap();
        assert_eq!(sum, 5);
        let sum: f64 = container.call("addFloat", (2.5, 3.5)).unwrap();
        assert_eq!(sum, 6.0);
    }

    #[test]
    fn typed_call_signature_mismatch() {
        let mut container = container(ARITHMETIC);
        assert!(container.call::<(f64, f64), f64>("AddInt", (1.0, 2.0)).is_err());
        assert!(container.call::<(i32, i32), i32>("missing", (1, 2)).is_err());
    }

    #[test]
    fn exported_functions() {
        let mut container = container(ARITHMETIC);
        assert_eq!(
            container.exported_functions(),
            ["AddInt", "addFloat", "pair"]
        );
    }

    #[test]
    fn invoke() {
        let mut container = container(ARITHMETIC);
        assert_eq!(
            container
                .invoke("AddInt", &[Number::I32(4), Number::I32(5)])
                .unwrap(),
            [Number::I32(9)]
        );
        assert_eq!(
            container.invoke("pair", &[]).unwrap(),
            [Number::I64(-4), Number::F32(0.5)]
        );
    }

    #[test]
    fn invoke_arity() {
        let mut container = container(ARITHMETIC);
        assert!(container.invoke("AddInt", &[Number::I32(4)]).is_err());
        assert!(container
            .invoke_text("addFloat", &["1".to_string()])
            .is_err());
    }

    #[test]
    fn parse_args_errors() {
        let mut container = container(ARITHMETIC);

        let error = container
            .parse_args("AddInt", &["two".to_string(), "3".to_string()])
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ArgumentError>(),
            Some(ArgumentError::InvalidInteger { .. })
        ));

        let error = container.parse_args("AddInt", &[]).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ArgumentError>(),
            Some(ArgumentError::Arity { expected: 2, actual: 0, .. })
        ));

        let error = container.parse_args("missing", &[]).unwrap_err();
        assert!(error.downcast_ref::<ArgumentError>().is_none());
    }

    #[test]
    fn invoke_text() {
        let mut container = container(ARITHMETIC);
        let args = ["2.5".to_string(), "3.5".to_string()];
        assert_eq!(
            container.invoke_text("addFloat", &args).unwrap(),
            [Number::F64(6.0)]
        );

        let args = ["2.5".to_string(), "3".to_string()];
        assert!(container.invoke_text("AddInt", &args).is_err());
    }

    #[test]
    fn console_branches() {
        let buffer = SharedBuffer::default();
        let mut container =
            Container::from_bytes(LOGGING.as_bytes(), Console::new(buffer.clone())).unwrap();

        container.call::<i32, ()>("ifElseSimple", 7).unwrap();
        container.call::<i32, ()>("ifElseSimple", -7).unwrap();
        container.call::<i32, ()>("ifElseSimple", 0).unwrap();
        container.call::<(i32, f64), ()>("both", (3, 0.25)).unwrap();

        assert_eq!(buffer.contents(), "1\n0\n0\n3 0.25\n");
    }

    #[test]
    fn unknown_console_member() {
        let wat = r#"(module (import "console" "table" (func (param i32))))"#;
        assert!(
            Container::from_bytes(wat.as_bytes(), Console::new(SharedBuffer::default())).is_err()
        );
    }

    #[test]
    fn console_with_results() {
        let wat = r#"(module (import "console" "log" (func (param i32) (result i32))))"#;
        assert!(
            Container::from_bytes(wat.as_bytes(), Console::new(SharedBuffer::default())).is_err()
        );
    }

    #[test]
    fn unresolved_import() {
        let wat = r#"(module (import "env" "abort" (func)))"#;
        assert!(
            Container::from_bytes(wat.as_bytes(), Console::new(SharedBuffer::default())).is_err()
        );
    }

    #[test]
    fn missing_file() {
        let error = Container::from_file(
            Path::new("does/not/exist.wasm"),
            Console::new(SharedBuffer::default()),
        )
        .err()
        .unwrap();
        assert!(format!("{error:#}").contains("exist.wasm"));
    }
}
