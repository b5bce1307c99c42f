//! MOTORPOOL - Command Registry & Invoker
//! Maps command names to handlers and remembers the most recent
//! command names.
//!
//! ## Dispatch
//! 1. Split the line on whitespace; the first token is the name
//! 2. Record the name in the history (known or not, before running)
//! 3. Resolve and run the handler with the remaining tokens
//! 4. Report failures to the output; the caller's loop keeps going

/// Unwrap an [`Input`](crate::input::Input) read, or return
/// `Ok(Outcome::Cancelled)` from the enclosing command.
macro_rules! prompt {
    ($read:expr) => {
        match $read? {
            $crate::input::Input::Value(value) => value,
            $crate::input::Input::Cancelled => {
                return Ok($crate::commands::Outcome::Cancelled);
            }
        }
    };
}

pub mod account;
pub mod builtin;
pub mod vehicles;

use std::collections::{BTreeMap, VecDeque};

use crate::collection::CollectionStore;
use crate::error::{MotorpoolError, Result};
use crate::input::InputCoordinator;
use crate::session::{Session, UserDirectory};
use crate::storage::VehicleStore;

/// What the host loop should do after a command returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Done, read the next command.
    Continue,
    /// The user aborted the command with the stop sentinel.
    Cancelled,
    /// Leave the loop.
    Exit,
}

/// Result of [`Invoker::dispatch`].
#[derive(Debug)]
pub enum Dispatched {
    /// The handler returned normally.
    Ran(Outcome),
    /// The handler failed; the error has already been reported.
    Failed(MotorpoolError),
    /// No handler under this name.
    Unknown(String),
    /// The line was blank.
    Blank,
}

/// Everything a command may read or change.
pub struct Context {
    pub collection: CollectionStore,
    pub backend: Box<dyn VehicleStore>,
    pub users: UserDirectory,
    pub session: Session,
    pub input: InputCoordinator,
}

impl Context {
    pub fn new(
        collection: CollectionStore,
        backend: Box<dyn VehicleStore>,
        users: UserDirectory,
        input: InputCoordinator,
    ) -> Self {
        Self {
            collection,
            backend,
            users,
            session: Session::anonymous(),
            input,
        }
    }
}

/// A named shell command.
pub trait Command {
    /// One line of usage for `help`.
    fn description(&self) -> &str;

    /// Run with the arguments that followed the command name.
    fn execute(&self, args: &[&str], ctx: &mut Context, invoker: &Invoker) -> Result<Outcome>;
}

/// Name → command registry with a bounded history of dispatched names.
pub struct Invoker {
    commands: BTreeMap<String, Box<dyn Command>>,
    history: VecDeque<String>,
    capacity: usize,
}

impl Invoker {
    /// Empty registry keeping the last `history_capacity` names.
    pub fn new(history_capacity: usize) -> Self {
        Self {
            commands: BTreeMap::new(),
            history: VecDeque::with_capacity(history_capacity),
            capacity: history_capacity.max(1),
        }
    }

    /// Registry with every shell command bound.
    pub fn with_default_commands(history_capacity: usize) -> Self {
        let mut invoker = Self::new(history_capacity);

        invoker.register("help", builtin::Help);
        invoker.register("history", builtin::History);
        invoker.register("save", builtin::Save);
        invoker.register("exit", builtin::Exit);
        invoker.register("execute_script", builtin::ExecuteScript);

        invoker.register("register", account::Register);
        invoker.register("login", account::Login);
        invoker.register("logout", account::Logout);
        invoker.register("whoami", account::WhoAmI);

        invoker.register("info", vehicles::Info);
        invoker.register("show", vehicles::Show);
        invoker.register("insert", vehicles::Insert);
        invoker.register("update", vehicles::Update);
        invoker.register("remove_key", vehicles::RemoveKey);
        invoker.register("remove_lower_key", vehicles::RemoveLowerKey);
        invoker.register("remove_greater", vehicles::RemoveGreater);
        invoker.register("remove_all_by_type", vehicles::RemoveAllByType);
        invoker.register("clear", vehicles::Clear);
        invoker.register(
            "print_field_ascending_fuel_type",
            vehicles::PrintFieldAscendingFuelType,
        );
        invoker.register(
            "group_counting_by_engine_power",
            vehicles::GroupCountingByEnginePower,
        );

        invoker
    }

    /// Bind `command` to `name`. An existing binding is replaced.
    pub fn register(&mut self, name: impl Into<String>, command: impl Command + 'static) {
        let name = name.into();
        if self.commands.insert(name.clone(), Box::new(command)).is_some() {
            log::debug!("command '{}' re-registered", name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// `(name, description)` pairs in name order.
    pub fn commands(&self) -> impl Iterator<Item = (&str, &str)> {
        self.commands
            .iter()
            .map(|(name, command)| (name.as_str(), command.description()))
    }

    /// Recorded names, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    fn record(&mut self, name: &str) {
        if self.history.len() >= self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(name.to_string());
    }

    /// Resolve and run one command line.
    pub fn dispatch(&mut self, line: &str, ctx: &mut Context) -> Dispatched {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return Dispatched::Blank;
        };
        let args: Vec<&str> = tokens.collect();
        self.record(name);

        let Some(command) = self.commands.get(name) else {
            let err = MotorpoolError::UnknownCommand(name.to_string());
            report(ctx, &err.to_string());
            return Dispatched::Unknown(name.to_string());
        };

        log::debug!("dispatching '{}' with {} args", name, args.len());
        match command.execute(&args, ctx, &*self) {
            Ok(Outcome::Cancelled) => {
                report(ctx, "Command cancelled.");
                Dispatched::Ran(Outcome::Cancelled)
            }
            Ok(outcome) => Dispatched::Ran(outcome),
            Err(err) => {
                log::warn!("command '{}' failed: {}", name, err);
                report(ctx, &format!("ERROR: {}", err));
                Dispatched::Failed(err)
            }
        }
    }
}

fn report(ctx: &mut Context, message: &str) {
    if let Err(e) = writeln!(ctx.input.out(), "  {}", message) {
        log::error!("cannot write to output: {}", e);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::input::ReaderSource;
    use crate::storage::memory::MemoryStore;
    use std::cell::RefCell;
    use std::io::{self, Cursor, Write};
    use std::rc::Rc;

    /// Output sink whose contents can be read back after the writer moved.
    #[derive(Clone, Default)]
    pub struct Transcript(Rc<RefCell<Vec<u8>>>);

    impl Transcript {
        pub fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    impl Write for Transcript {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// In-memory context whose terminal yields `typed`.
    pub fn context(typed: &str) -> (Context, Transcript) {
        context_bytes(typed.as_bytes().to_vec())
    }

    /// Like [`context`], for terminal input that need not be UTF-8.
    pub fn context_bytes(typed: Vec<u8>) -> (Context, Transcript) {
        let transcript = Transcript::default();
        let input = InputCoordinator::new(
            Box::new(ReaderSource::new(Cursor::new(typed))),
            Box::new(transcript.clone()),
        );
        let ctx = Context::new(
            CollectionStore::new(),
            Box::new(MemoryStore::new()),
            UserDirectory::in_memory(),
            input,
        );
        (ctx, transcript)
    }

    pub fn logged_in(typed: &str, user: &str) -> (Context, Transcript) {
        let (mut ctx, transcript) = context(typed);
        ctx.session.login(user);
        (ctx, transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn context() -> Context {
        testing::context("").0
    }

    struct Fixed(&'static str, Outcome);

    impl Command for Fixed {
        fn description(&self) -> &str {
            self.0
        }

        fn execute(&self, _: &[&str], _: &mut Context, _: &Invoker) -> Result<Outcome> {
            Ok(self.1)
        }
    }

    struct Failing;

    impl Command for Failing {
        fn description(&self) -> &str {
            "always fails"
        }

        fn execute(&self, _: &[&str], _: &mut Context, _: &Invoker) -> Result<Outcome> {
            Err(MotorpoolError::Unauthenticated)
        }
    }

    struct CountArgs(Rc<Cell<usize>>);

    impl Command for CountArgs {
        fn description(&self) -> &str {
            "counts"
        }

        fn execute(&self, args: &[&str], _: &mut Context, _: &Invoker) -> Result<Outcome> {
            self.0.set(args.len());
            Ok(Outcome::Continue)
        }
    }

    #[test]
    fn test_history_keeps_last_eight() {
        let mut invoker = Invoker::new(8);
        invoker.register("noop", Fixed("noop", Outcome::Continue));
        let mut ctx = context();

        for i in 0..10 {
            invoker.dispatch(&format!("cmd{}", i), &mut ctx);
        }
        let history: Vec<&str> = invoker.history().collect();
        assert_eq!(history.len(), 8);
        assert_eq!(history[0], "cmd2");
        assert_eq!(history[7], "cmd9");
    }

    #[test]
    fn test_unknown_and_failures_are_recorded() {
        let mut invoker = Invoker::new(8);
        invoker.register("fail", Failing);
        let mut ctx = context();

        assert!(matches!(
            invoker.dispatch("nope", &mut ctx),
            Dispatched::Unknown(name) if name == "nope"
        ));
        assert!(matches!(
            invoker.dispatch("fail now", &mut ctx),
            Dispatched::Failed(MotorpoolError::Unauthenticated)
        ));
        assert_eq!(invoker.history().collect::<Vec<_>>(), vec!["nope", "fail"]);
    }

    #[test]
    fn test_blank_line_ignored() {
        let mut invoker = Invoker::new(8);
        let mut ctx = context();
        assert!(matches!(invoker.dispatch("   ", &mut ctx), Dispatched::Blank));
        assert_eq!(invoker.history().count(), 0);
    }

    #[test]
    fn test_register_overwrites() {
        let mut invoker = Invoker::new(8);
        invoker.register("x", Fixed("first", Outcome::Continue));
        invoker.register("x", Fixed("second", Outcome::Exit));
        let mut ctx = context();

        assert_eq!(invoker.commands().collect::<Vec<_>>(), vec![("x", "second")]);
        assert!(matches!(
            invoker.dispatch("x", &mut ctx),
            Dispatched::Ran(Outcome::Exit)
        ));
    }

    #[test]
    fn test_args_are_split() {
        let seen = Rc::new(Cell::new(0));
        let mut invoker = Invoker::new(8);
        invoker.register("count", CountArgs(Rc::clone(&seen)));
        let mut ctx = context();

        invoker.dispatch("count  a b   c", &mut ctx);
        assert_eq!(seen.get(), 3);
    }

    #[test]
    fn test_default_commands_registered() {
        let invoker = Invoker::with_default_commands(8);
        for name in [
            "insert",
            "update",
            "remove_key",
            "remove_lower_key",
            "remove_greater",
            "remove_all_by_type",
            "clear",
            "show",
            "info",
            "help",
            "history",
            "save",
            "exit",
            "execute_script",
            "login",
        ] {
            assert!(invoker.contains(name), "missing {}", name);
        }
    }
}
