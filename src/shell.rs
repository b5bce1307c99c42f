//! MOTORPOOL - Interactive Shell
//! Reads command lines (script queue first, then the terminal) and
//! hands them to the invoker until `exit` or end of input.

use crate::collection::CollectionStore;
use crate::commands::{Context, Dispatched, Invoker, Outcome};
use crate::config::Config;
use crate::error::{MotorpoolError, Result};
use crate::input::{InputCoordinator, STOP_SENTINEL};
use crate::session::UserDirectory;
use crate::storage::file::FileStore;

/// A running shell: command context plus the command registry.
pub struct Shell {
    ctx: Context,
    invoker: Invoker,
}

impl Shell {
    /// Open the file-backed registry described by `config`.
    ///
    /// ## Startup Sequence
    /// 1. Validate the configuration
    /// 2. Open the vehicle store and load every record
    /// 3. Open the user directory
    pub fn open(config: &Config, input: InputCoordinator) -> Result<Self> {
        config.validate()?;

        let mut backend = FileStore::open(config)?;
        let collection = CollectionStore::load(&mut backend)?;
        let users = UserDirectory::open(config)?;

        let ctx = Context::new(collection, Box::new(backend), users, input);
        Ok(Self::new(ctx, config.history_capacity))
    }

    /// Shell over an already assembled context.
    pub fn new(ctx: Context, history_capacity: usize) -> Self {
        Self {
            ctx,
            invoker: Invoker::with_default_commands(history_capacity),
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// Dispatch a single command line.
    pub fn run_line(&mut self, line: &str) -> Dispatched {
        self.invoker.dispatch(line, &mut self.ctx)
    }

    /// Run until `exit` or end of input. Only output failures escape.
    /// Script lines still queued when the loop ends are dropped.
    pub fn run(&mut self) -> Result<()> {
        let result = self.read_eval_loop();
        if self.ctx.input.is_running_script() {
            self.ctx.input.abort_script();
        }
        result
    }

    fn read_eval_loop(&mut self) -> Result<()> {
        while let Some(line) = self.ctx.input.next_command_line()? {
            if line.trim() == STOP_SENTINEL {
                writeln!(self.ctx.input.out(), "  Nothing to stop.")?;
                continue;
            }

            match self.run_line(&line) {
                Dispatched::Ran(Outcome::Exit) => {
                    log::info!("exit requested");
                    break;
                }
                Dispatched::Failed(MotorpoolError::InputClosed) => {
                    log::info!("input closed while a command was prompting");
                    break;
                }
                _ => {}
            }
        }
        Ok(())
    }
}
