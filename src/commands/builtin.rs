//! MOTORPOOL - Shell Builtins
//! help, history, save, exit and execute_script.

use std::path::Path;

use crate::error::{MotorpoolError, Result};

use super::{Command, Context, Invoker, Outcome};

/// `help`: list every registered command.
pub struct Help;

impl Command for Help {
    fn description(&self) -> &str {
        "list available commands"
    }

    fn execute(&self, _: &[&str], ctx: &mut Context, invoker: &Invoker) -> Result<Outcome> {
        let out = ctx.input.out();
        writeln!(out, "  Available commands:")?;
        for (name, description) in invoker.commands() {
            writeln!(out, "    {:<32} {}", name, description)?;
        }
        Ok(Outcome::Continue)
    }
}

/// `history`: the most recent command names, oldest first.
pub struct History;

impl Command for History {
    fn description(&self) -> &str {
        "print the last few command names"
    }

    fn execute(&self, _: &[&str], ctx: &mut Context, invoker: &Invoker) -> Result<Outcome> {
        let out = ctx.input.out();
        for name in invoker.history() {
            writeln!(out, "  {}", name)?;
        }
        Ok(Outcome::Continue)
    }
}

/// `save`: write the collection to the backing store.
pub struct Save;

impl Command for Save {
    fn description(&self) -> &str {
        "save the collection"
    }

    fn execute(&self, _: &[&str], ctx: &mut Context, _: &Invoker) -> Result<Outcome> {
        ctx.collection.save(&mut *ctx.backend)?;
        writeln!(ctx.input.out(), "  Saved {} vehicles.", ctx.collection.len())?;
        Ok(Outcome::Continue)
    }
}

/// `exit`: leave the shell without saving.
pub struct Exit;

impl Command for Exit {
    fn description(&self) -> &str {
        "exit without saving"
    }

    fn execute(&self, _: &[&str], _: &mut Context, _: &Invoker) -> Result<Outcome> {
        Ok(Outcome::Exit)
    }
}

/// `execute_script <path.txt>`: queue the file's lines as commands.
pub struct ExecuteScript;

impl Command for ExecuteScript {
    fn description(&self) -> &str {
        "execute_script <path.txt>: run commands from a file"
    }

    fn execute(&self, args: &[&str], ctx: &mut Context, _: &Invoker) -> Result<Outcome> {
        if args.is_empty() {
            return Err(MotorpoolError::InvalidArgument(
                "usage: execute_script <path.txt>".to_string(),
            ));
        }
        let path = args.join(" ");
        let queued = ctx.input.begin_script(Path::new(&path))?;

        let out = ctx.input.out();
        if queued == 0 {
            writeln!(out, "  Script is empty.")?;
        } else {
            writeln!(out, "  Running {} ({} lines).", path, queued)?;
        }
        Ok(Outcome::Continue)
    }
}
