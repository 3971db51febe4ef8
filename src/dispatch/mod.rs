//! Drives a [`MenuEngine`] for one command, interactively or as a single batch pass.


use crate::menu::{DisplayItem, MenuEngine, MenuError, PassThrough, Selection};
use crate::plugin::ShellContext;
use crate::shell::render_help;
use crate::{log_debug, log_debug_content};
use anyhow::Result;

/// What the menu should do after an item's action returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome<A, P> {
    Continue,
    /// The options changed: rewind and redraw, replacing the items when given.
    OptionsChanged(Option<Vec<DisplayItem<A, P>>>),
}

/// Command-specific half of a menu: runs actions and formats batch output.
pub trait MenuHost {
    type Action;
    type Payload;

    fn invoke(
        &mut self,
        item: &DisplayItem<Self::Action, Self::Payload>,
        ctx: &mut ShellContext<'_>,
    ) -> Result<ActionOutcome<Self::Action, Self::Payload>>;

    /// Printed once, after every item has been fetched, when not interactive.
    fn batch_output(&self, items: &[DisplayItem<Self::Action, Self::Payload>]) -> String;

    /// Printed ahead of the help output.
    fn help_preamble(&self) -> Option<String> {
        None
    }

    /// Whether `help` redraws the options (true) or lists the menu commands.
    fn help_is_options(&self) -> bool {
        true
    }
}

/// Commands every submenu understands, for the help listing.
const MENU_COMMANDS: &[(&str, &str)] = &[
    ("e", "Return to previous menu."),
    ("m", "Show more options if available."),
    ("q", "Return to previous menu."),
    ("r", "Restart display of options."),
    ("shell", "Execute a shell command. You can also use '!'"),
];

const INVALID_SUFFIX: &str = "is an invalid selection. Type 'help' to see valid selections again.";

pub struct MenuSession<H: MenuHost> {
    engine: MenuEngine<H::Action, H::Payload>,
    host: H,
}

impl<H: MenuHost> MenuSession<H> {
    pub fn new(engine: MenuEngine<H::Action, H::Payload>, host: H) -> Self {
        Self { engine, host }
    }

    pub fn engine(&self) -> &MenuEngine<H::Action, H::Payload> {
        &self.engine
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Interactive loop or batch pass, depending on the run mode.
    pub fn run(&mut self, ctx: &mut ShellContext<'_>) -> Result<()> {
        if ctx.is_interactive() {
            self.run_interactive(ctx)
        } else {
            self.run_batch(ctx)
        }
    }

    /// Fetch everything, then print the host's batch output once.
    pub fn run_batch(&mut self, ctx: &mut ShellContext<'_>) -> Result<()> {
        self.engine.drain()?;
        let output = self.host.batch_output(self.engine.items());
        ctx.out.write_all(output.as_bytes())?;
        if !output.is_empty() && !output.ends_with('\n') {
            writeln!(ctx.out)?;
        }
        ctx.out.flush()?;
        Ok(())
    }

    /// Page through the options until the user leaves or input ends.
    pub fn run_interactive(&mut self, ctx: &mut ShellContext<'_>) -> Result<()> {
        let first = self.engine.render_page(ctx.metrics(), ctx.out);
        if !self.keep_going(ctx, first)? {
            return Ok(());
        }

        loop {
            let prompt = self.engine.text().prompt.clone();
            let Some(line) = ctx.read_line(&prompt)? else {
                writeln!(ctx.out)?;
                self.engine.close();
                return Ok(());
            };
            log_debug_content(&format!("menu input: {line}"));

            let rendered = match self.engine.select(&line) {
                Selection::Exit => return Ok(()),
                Selection::PassThrough(PassThrough::Empty) => Ok(()),
                Selection::PassThrough(PassThrough::Help) => {
                    if let Some(preamble) = self.host.help_preamble() {
                        writeln!(ctx.out, "{preamble}")?;
                    }
                    if self.host.help_is_options() {
                        self.engine.restart(ctx.metrics(), ctx.out)
                    } else {
                        let entries: Vec<(String, String)> = MENU_COMMANDS
                            .iter()
                            .map(|(name, text)| (name.to_string(), text.to_string()))
                            .collect();
                        let listing = render_help(ctx.is_interactive(), &entries, ctx.width());
                        ctx.out.write_all(listing.as_bytes())?;
                        Ok(())
                    }
                }
                Selection::PassThrough(PassThrough::More) => {
                    self.engine.more(ctx.metrics(), ctx.out)
                }
                Selection::PassThrough(PassThrough::Restart) => {
                    self.engine.restart(ctx.metrics(), ctx.out)
                }
                Selection::PassThrough(PassThrough::Shell(command)) => {
                    if let Err(err) = ctx.shell_escape(&command) {
                        writeln!(ctx.out, "{err:#}")?;
                    }
                    Ok(())
                }
                Selection::Dispatch(n) => self.dispatch(n, ctx)?,
                Selection::Invalid(text) => {
                    writeln!(ctx.out, "{text} {INVALID_SUFFIX}")?;
                    Ok(())
                }
            };
            if !self.keep_going(ctx, rendered)? {
                return Ok(());
            }
        }
    }

    fn dispatch(
        &mut self,
        n: usize,
        ctx: &mut ShellContext<'_>,
    ) -> Result<Result<(), MenuError>> {
        let Some(item) = self.engine.item(n) else {
            self.engine.finish_dispatch(false);
            return Ok(Ok(()));
        };
        tracing::debug!(selection = n, "dispatch");
        match self.host.invoke(item, ctx) {
            Ok(ActionOutcome::Continue) => {
                self.engine.finish_dispatch(false);
                Ok(Ok(()))
            }
            Ok(ActionOutcome::OptionsChanged(items)) => {
                if let Some(items) = items {
                    self.engine.start_session(items);
                }
                self.engine.finish_dispatch(true);
                Ok(self.engine.render_page(ctx.metrics(), ctx.out))
            }
            Err(err) => {
                log_debug(&format!("menu action {n} failed: {err:#}"));
                writeln!(ctx.out, "{err:#}")?;
                self.engine.finish_dispatch(false);
                Ok(Ok(()))
            }
        }
    }

    /// Report a failed page. Fetch errors end this menu; write errors propagate.
    fn keep_going(
        &mut self,
        ctx: &mut ShellContext<'_>,
        rendered: Result<(), MenuError>,
    ) -> Result<bool> {
        match rendered {
            Ok(()) => Ok(true),
            Err(MenuError::Fetch(err)) => {
                log_debug(&format!("menu fetch failed: {err}"));
                tracing::warn!(error = %err, "menu session aborted");
                writeln!(ctx.out, "{err}")?;
                self.engine.close();
                Ok(false)
            }
            Err(err @ MenuError::Render(_)) => Err(err.into()),
        }
    }
}
