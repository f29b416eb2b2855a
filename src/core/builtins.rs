// src/core/builtins.rs

//! Built-in global commands: `cd`, `ls`, `pwd` and `man`.

use crate::constants::CURRENT_DIRECTORY;
use crate::core::errors::ResolutionError;
use crate::models::{CommandDef, DefinitionError, Identifier, ParamDef, ValueParamDef};
use anyhow::anyhow;

/// All built-ins, ready for [`NamespaceBuilder::global_commands`](crate::core::namespace::NamespaceBuilder::global_commands).
pub fn builtin_commands() -> Result<Vec<CommandDef>, DefinitionError> {
    Ok(vec![cd()?, ls()?, pwd()?, man()?])
}

fn directory_param(description: &str) -> Result<ParamDef, DefinitionError> {
    Ok(ParamDef::Directory(
        ValueParamDef::new(Identifier::new("path", description)?)
            .with_default_value(CURRENT_DIRECTORY.to_string()),
    ))
}

fn cd() -> Result<CommandDef, DefinitionError> {
    Ok(
        CommandDef::builder(Identifier::new("cd", "Changes the working directory")?)
            .param(directory_param("Directory to move to")?)?
            .build(|ctx, args| {
                let target = args.pop_directory()?;
                ctx.change_directory(target.id);
                Ok(())
            }),
    )
}

fn ls() -> Result<CommandDef, DefinitionError> {
    Ok(
        CommandDef::builder(Identifier::new("ls", "Lists the contents of a directory")?)
            .param(directory_param("Directory to list")?)?
            .build(|ctx, args| {
                let target = args.pop_directory()?;
                let namespace = ctx.namespace();
                let directory = namespace
                    .directory(target.id)
                    .ok_or_else(|| anyhow!("Directory '{}' vanished.", target.path))?;
                if directory.is_empty() {
                    return Err(ResolutionError::EmptyDirectory { path: target.path }.into());
                }
                for (name, _) in directory.directories().entries() {
                    ctx.println(&format!("{name}/"));
                }
                for (_, id) in directory.commands().entries() {
                    if let Some(command) = namespace.command(*id) {
                        ctx.println(&command.usage());
                    }
                }
                Ok(())
            }),
    )
}

fn pwd() -> Result<CommandDef, DefinitionError> {
    Ok(
        CommandDef::builder(Identifier::new("pwd", "Prints the working directory")?).build(
            |ctx, _| {
                let path = ctx.namespace().directory_path(ctx.working_directory());
                ctx.println(&path);
                Ok(())
            },
        ),
    )
}

fn man() -> Result<CommandDef, DefinitionError> {
    let command = ParamDef::Command(ValueParamDef::new(Identifier::new(
        "command",
        "Command to describe",
    )?));
    Ok(
        CommandDef::builder(Identifier::new("man", "Describes a command and its parameters")?)
            .param(command)?
            .build(|ctx, args| {
                let target = args.pop_command()?;
                let namespace = ctx.namespace();
                let command = namespace
                    .command(target.id)
                    .ok_or_else(|| anyhow!("Command '{}' vanished.", target.path))?;

                ctx.println(&format!("{} - {}", target.path, command.identifier().description()));
                ctx.println(&format!("Usage: {}", command.usage()));
                for param in command.params() {
                    let marker = if param.is_optional() { " (optional)" } else { "" };
                    ctx.println(&format!(
                        "  {} <{}>{marker}  {}",
                        param.name(),
                        param.kind(),
                        param.identifier().description()
                    ));
                }
                Ok(())
            }),
    )
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;
    use crate::core::namespace::Namespace;
    use crate::core::output::BufferedOutput;
    use crate::core::shell::{NamespaceHandle, Shell};
    use crate::core::test_support::{id, noop};
    use crate::models::DirectoryDef;

    fn shell() -> Shell {
        let empty = DirectoryDef::builder(id("empty")).build();
        let tools = DirectoryDef::builder(id("tools"))
            .command(noop("ping"))
            .unwrap()
            .build();
        let root = DirectoryDef::root()
            .directory(tools)
            .unwrap()
            .directory(empty)
            .unwrap()
            .command(noop("status"))
            .unwrap()
            .build();
        let namespace = Namespace::builder(root)
            .global_commands(builtin_commands().unwrap())
            .build()
            .unwrap();
        Shell::new(NamespaceHandle::new(namespace))
    }

    #[test]
    fn test_cd_and_pwd() {
        let mut shell = shell();
        let mut out = BufferedOutput::new();
        shell.execute("cd tools", &mut out).unwrap();
        shell.execute("pwd", &mut out).unwrap();
        shell.execute("cd ..", &mut out).unwrap();
        shell.execute("pwd", &mut out).unwrap();
        assert_eq!(out.messages(), vec!["/tools", "/"]);
    }

    #[test]
    fn test_cd_to_unknown_directory_fails_to_resolve() {
        let mut shell = shell();
        let mut out = BufferedOutput::new();
        let err = shell.execute("cd nowhere", &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DirectoryNotFound);
        assert_eq!(shell.working_directory(), "/");
    }

    #[test]
    fn test_ls_lists_directories_then_commands() {
        let mut shell = shell();
        let mut out = BufferedOutput::new();
        shell.execute("ls", &mut out).unwrap();
        assert_eq!(out.messages(), vec!["empty/", "tools/", "status"]);
    }

    #[test]
    fn test_ls_of_empty_directory_is_an_execution_failure() {
        let mut shell = shell();
        let mut out = BufferedOutput::new();
        let err = shell.execute("ls empty", &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommandExecutionFailure);
    }

    #[test]
    fn test_man_describes_commands() {
        let mut shell = shell();
        let mut out = BufferedOutput::new();
        shell.execute("man cd", &mut out).unwrap();
        let messages = out.messages();
        assert_eq!(messages[0], "cd - Changes the working directory");
        assert_eq!(messages[1], "Usage: cd [path:directory]");
    }
}
