// src/core/test_support.rs

//! Shared fixtures for the unit tests of the resolution engine.

use crate::core::namespace::Namespace;
use crate::models::{CommandDef, DirectoryDef, Identifier, ParamDef, StringParamDef, ValueParamDef};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub(crate) fn id(name: &str) -> Identifier {
    Identifier::new(name, format!("The {name} entry")).unwrap()
}

pub(crate) fn noop(name: &str) -> CommandDef {
    CommandDef::builder(id(name)).build(|_, _| Ok(()))
}

fn echo() -> CommandDef {
    CommandDef::builder(id("echo"))
        .param(StringParamDef::new(id("text")))
        .unwrap()
        .build(|ctx, args| {
            let text = args.pop_string()?;
            ctx.println(&text);
            Ok(())
        })
}

fn ping() -> CommandDef {
    CommandDef::builder(id("ping"))
        .param(StringParamDef::new(id("host")))
        .unwrap()
        .param(ParamDef::Int(ValueParamDef::new(id("count")).with_default_value(3)))
        .unwrap()
        .build(|_, _| Ok(()))
}

/// ```text
/// /
/// ├── net/
/// │   └── tools/
/// │       ├── ping <host:string> [count:int]
/// │       └── echo <text:string>
/// ├── foo/
/// │   └── bar/
/// │       └── baz/          (empty)
/// ├── echo <text:string>
/// └── verbose [value:bool]  (toggle)
/// globals: pwd
/// ```
pub(crate) fn sample_namespace() -> Namespace {
    let tools = DirectoryDef::builder(id("tools"))
        .command(ping())
        .unwrap()
        .command(echo())
        .unwrap()
        .build();
    let net = DirectoryDef::builder(id("net")).directory(tools).unwrap().build();

    let baz = DirectoryDef::builder(id("baz")).build();
    let bar = DirectoryDef::builder(id("bar")).directory(baz).unwrap().build();
    let foo = DirectoryDef::builder(id("foo")).directory(bar).unwrap().build();

    let state = Arc::new(AtomicBool::new(false));
    let (reader, writer) = (Arc::clone(&state), state);
    let verbose = CommandDef::toggle(
        id("verbose"),
        move || reader.load(Ordering::SeqCst),
        move |value| writer.store(value, Ordering::SeqCst),
    )
    .unwrap();

    let root = DirectoryDef::root()
        .directory(net)
        .unwrap()
        .directory(foo)
        .unwrap()
        .command(echo())
        .unwrap()
        .command(verbose)
        .unwrap()
        .build();

    Namespace::builder(root)
        .global_command(noop("pwd"))
        .build()
        .unwrap()
}
