//! MOTORPOOL - Account Commands
//! Registration and login. Credentials are always read from the
//! terminal, never from a running script.

use crate::error::{MotorpoolError, Result};

use super::{Command, Context, Invoker, Outcome};

/// `register`: create an account and log in as it.
pub struct Register;

impl Command for Register {
    fn description(&self) -> &str {
        "create a user account"
    }

    fn execute(&self, _: &[&str], ctx: &mut Context, _: &Invoker) -> Result<Outcome> {
        let username = prompt!(ctx.input.prompt_credential("Username: "));
        if ctx.users.contains(&username) {
            return Err(MotorpoolError::UserExists(username));
        }
        let password = prompt!(ctx.input.prompt_credential("Password: "));
        let repeated = prompt!(ctx.input.prompt_credential("Repeat password: "));
        if password != repeated {
            return Err(MotorpoolError::InvalidArgument(
                "passwords do not match".to_string(),
            ));
        }

        ctx.users.register(&username, &password)?;
        ctx.session.login(username.as_str());
        writeln!(ctx.input.out(), "  Registered and logged in as {}.", username)?;
        Ok(Outcome::Continue)
    }
}

/// `login`
pub struct Login;

impl Command for Login {
    fn description(&self) -> &str {
        "log in with an existing account"
    }

    fn execute(&self, _: &[&str], ctx: &mut Context, _: &Invoker) -> Result<Outcome> {
        let username = prompt!(ctx.input.prompt_credential("Username: "));
        let password = prompt!(ctx.input.prompt_credential("Password: "));
        ctx.users.login(&mut ctx.session, &username, &password)?;
        writeln!(ctx.input.out(), "  Logged in as {}.", username)?;
        Ok(Outcome::Continue)
    }
}

/// `logout`
pub struct Logout;

impl Command for Logout {
    fn description(&self) -> &str {
        "end the current session"
    }

    fn execute(&self, _: &[&str], ctx: &mut Context, _: &Invoker) -> Result<Outcome> {
        match ctx.session.logout() {
            Some(user) => {
                log::info!("user '{}' logged out", user);
                writeln!(ctx.input.out(), "  Goodbye, {}.", user)?;
            }
            None => writeln!(ctx.input.out(), "  Not logged in.")?,
        }
        Ok(Outcome::Continue)
    }
}

/// `whoami`
pub struct WhoAmI;

impl Command for WhoAmI {
    fn description(&self) -> &str {
        "print the current user"
    }

    fn execute(&self, _: &[&str], ctx: &mut Context, _: &Invoker) -> Result<Outcome> {
        let line = match ctx.session.current_user() {
            Some(user) => format!("  {}", user),
            None => "  Not logged in.".to_string(),
        };
        writeln!(ctx.input.out(), "{}", line)?;
        Ok(Outcome::Continue)
    }
}
