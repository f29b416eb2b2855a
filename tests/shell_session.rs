// tests/shell_session.rs

use jaci::core::args::ParamValue;
use jaci::core::builtins::builtin_commands;
use jaci::core::completion::{CompletionKind, CompletionState};
use jaci::core::errors::ErrorKind;
use jaci::core::namespace::Namespace;
use jaci::core::output::BufferedOutput;
use jaci::core::parameters::ParamResolver;
use jaci::core::shell::{NamespaceHandle, Shell};
use jaci::models::{
    CommandDef, DirectoryDef, Identifier, ParamDef, StringParamDef, ValueParamDef,
};
use jaci::system::config;
use std::sync::{Arc, Mutex};

fn id(name: &str, description: &str) -> Identifier {
    Identifier::new(name, description).unwrap()
}

/// `/users/add <name> [admin:bool]`, `/users/remove <name>` where `name` completes from
/// the live user list, plus the built-ins.
fn user_shell(users: Arc<Mutex<Vec<String>>>) -> Shell {
    let (adder, lister, remover) = (Arc::clone(&users), Arc::clone(&users), users);

    let add = CommandDef::builder(id("add", "Adds a user"))
        .param(StringParamDef::new(id("name", "User name")))
        .unwrap()
        .param(ParamDef::Bool(
            ValueParamDef::new(id("admin", "Grant admin rights")).with_default_value(false),
        ))
        .unwrap()
        .build(move |ctx, args| {
            let name = args.pop_string()?;
            let admin = args.pop_bool()?;
            adder.lock().map_err(|e| anyhow::anyhow!("{e}"))?.push(name.clone());
            ctx.println(&format!("added {name} (admin: {admin})"));
            Ok(())
        });

    let remove = CommandDef::builder(id("remove", "Removes a user"))
        .param(StringParamDef::new(id("name", "User name")).with_dynamic_values(move || {
            lister.lock().map(|users| users.clone()).unwrap_or_default()
        }))
        .unwrap()
        .build(move |ctx, args| {
            let name = args.pop_string()?;
            remover.lock().map_err(|e| anyhow::anyhow!("{e}"))?.retain(|u| *u != name);
            ctx.println(&format!("removed {name}"));
            Ok(())
        });

    let root = DirectoryDef::root()
        .directory(
            DirectoryDef::builder(id("users", "User management"))
                .command(add)
                .unwrap()
                .command(remove)
                .unwrap()
                .build(),
        )
        .unwrap()
        .build();
    let namespace = Namespace::builder(root)
        .resolver(ParamResolver::new().with_bool_aliases(true))
        .global_commands(builtin_commands().unwrap())
        .build()
        .unwrap();
    Shell::new(NamespaceHandle::new(namespace))
}

#[test]
fn test_session_executes_and_navigates() {
    let users = Arc::new(Mutex::new(vec!["alice".to_string()]));
    let mut shell = user_shell(Arc::clone(&users));
    let mut out = BufferedOutput::new();

    shell.execute("cd users", &mut out).unwrap();
    shell.execute("add bob yes", &mut out).unwrap();
    shell.execute("add name=carol", &mut out).unwrap();
    shell.execute("remove alice", &mut out).unwrap();
    shell.execute("pwd", &mut out).unwrap();

    assert_eq!(
        out.messages(),
        vec![
            "added bob (admin: true)",
            "added carol (admin: false)",
            "removed alice",
            "/users",
        ]
    );
    assert_eq!(*users.lock().unwrap(), vec!["bob", "carol"]);
}

#[test]
fn test_dynamic_values_follow_live_state() {
    let users = Arc::new(Mutex::new(vec!["alice".to_string()]));
    let mut shell = user_shell(Arc::clone(&users));
    let mut out = BufferedOutput::new();

    let err = shell.execute("users/remove bob", &mut out).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParamValue);

    users.lock().unwrap().push("bob".to_string());
    shell.execute("users/remove bob", &mut out).unwrap();

    let assist = shell.assist("users/remove ", 13);
    assert_eq!(assist.suggestions.by_kind(CompletionKind::ParamValue), vec!["alice"]);
}

#[test]
fn test_assist_reports_state_and_bound_params() {
    let shell = user_shell(Arc::new(Mutex::new(Vec::new())));

    let path = shell.assist("us", 2);
    assert_eq!(
        path.suggestions.state(),
        CompletionState::Partial {
            word: "users".to_string()
        }
    );

    let line = "users/add dave ";
    let params = shell.assist(line, line.len());
    assert_eq!(params.bound_params.len(), 1);
    assert_eq!(params.bound_params[0].value, ParamValue::String("dave".to_string()));
    assert_eq!(params.current_param, Some(1));
    assert!(
        params
            .suggestions
            .by_kind(CompletionKind::ParamValue)
            .contains(&"yes")
    );

    let report = shell.assist_report("users/add ", 10);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["command"], "/users/add");
    assert_eq!(json["current_param"], "name");
}

#[test]
fn test_namespace_replacement_is_atomic_for_the_session() {
    let mut shell = user_shell(Arc::new(Mutex::new(Vec::new())));
    let mut out = BufferedOutput::new();
    shell.execute("cd users", &mut out).unwrap();

    let replacement = config::ShellConfig::demo().unwrap().build_namespace().unwrap();
    shell.namespace().replace(replacement);

    shell.execute("net/ping localhost count=2", &mut out).unwrap();
    assert_eq!(shell.working_directory(), "/");
    assert_eq!(
        out.messages().last().copied(),
        Some("PING localhost: 2 packet(s), verbose=false")
    );
}

#[test]
fn test_demo_definitions_end_to_end() {
    let namespace = config::ShellConfig::demo().unwrap().build_namespace().unwrap();
    let mut shell = Shell::new(NamespaceHandle::new(namespace));
    let mut out = BufferedOutput::new();

    shell.execute("math/add 1.5 2", &mut out).unwrap();
    shell.execute("net/interface/show", &mut out).unwrap();
    shell.execute("system/log-level level=DEBUG", &mut out).unwrap();
    assert_eq!(
        out.messages(),
        vec!["1.5 + 2", "eth0: up", "log level set to debug"]
    );

    let err = shell.execute("net/ping", &mut out).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingMandatoryParameter);
}

#[test]
fn test_declarative_output_keeps_placeholder_like_values() {
    let namespace = config::ShellConfig::demo().unwrap().build_namespace().unwrap();
    let mut shell = Shell::new(NamespaceHandle::new(namespace));
    let mut out = BufferedOutput::new();

    shell.execute("net/ping '{count}' 2", &mut out).unwrap();
    assert_eq!(
        out.messages(),
        vec!["PING {count}: 2 packet(s), verbose=false"]
    );
}
