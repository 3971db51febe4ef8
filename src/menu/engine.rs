use super::{DisplayItem, MenuError, MenuFeed, MenuState, MenuText};
use crate::line_budget::{digit_count, lines_needed, wrap, LineMode};
use crate::log_debug;
use crate::terminal::TerminalMetrics;
use std::io::Write;

/// Width used when no terminal is attached.
pub const DEFAULT_WIDTH: usize = 80;
/// Height assumed for prefetch sizing when no terminal is attached.
pub const DEFAULT_HEIGHT: usize = 24;

/// Where an engine is in its input cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuPhase {
    Idle,
    Rendering,
    AwaitingInput,
    Dispatching,
    /// Every item has been shown and the feed has nothing more.
    Exhausted,
    Done,
}

/// Menu-level commands handled by the dispatcher rather than by an item action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassThrough {
    Empty,
    Help,
    More,
    Restart,
    Shell(String),
}

/// Outcome of classifying one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Exit,
    PassThrough(PassThrough),
    /// 1-based index of the chosen item.
    Dispatch(usize),
    Invalid(String),
}

pub struct MenuEngine<A, P = ()> {
    state: MenuState<A, P>,
    text: MenuText,
    feed: Option<Box<dyn MenuFeed<A, P>>>,
    phase: MenuPhase,
}

impl<A, P> MenuEngine<A, P> {
    /// Menu over a fixed item set.
    pub fn new(text: MenuText, items: Vec<DisplayItem<A, P>>) -> Self {
        Self {
            state: MenuState::new(items, true),
            text,
            feed: None,
            phase: MenuPhase::Idle,
        }
    }

    /// Menu whose items come from `feed`, fetched as pages are rendered.
    pub fn with_feed(text: MenuText, feed: Box<dyn MenuFeed<A, P>>) -> Self {
        Self {
            state: MenuState::new(Vec::new(), false),
            text,
            feed: Some(feed),
            phase: MenuPhase::Idle,
        }
    }

    pub fn text(&self) -> &MenuText {
        &self.text
    }

    pub fn phase(&self) -> MenuPhase {
        self.phase
    }

    pub fn state(&self) -> &MenuState<A, P> {
        &self.state
    }

    pub fn items(&self) -> &[DisplayItem<A, P>] {
        self.state.items()
    }

    /// Item at 1-based index `n`.
    pub fn item(&self, n: usize) -> Option<&DisplayItem<A, P>> {
        n.checked_sub(1).and_then(|idx| self.state.buffer.get(idx))
    }

    pub fn len(&self) -> usize {
        self.state.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.buffer.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.state.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.state.exhausted
    }

    /// Ask the feed for up to `wanted` rows and buffer them. Returns how many arrived.
    fn fetch(&mut self, wanted: usize) -> Result<usize, MenuError> {
        if self.state.exhausted {
            return Ok(0);
        }
        let Some(feed) = self.feed.as_mut() else {
            self.state.exhausted = true;
            return Ok(0);
        };
        let rows = feed.fetch_more(wanted)?;
        if rows.is_empty() {
            self.state.exhausted = true;
            return Ok(0);
        }
        let added = rows.len();
        self.state.buffer.extend(rows);
        Ok(added)
    }

    /// Load the first rows before anything is shown.
    pub fn prime(&mut self, wanted: usize) -> Result<usize, MenuError> {
        self.fetch(wanted)
    }

    /// Pull everything the feed has. Used for batch output.
    pub fn drain(&mut self) -> Result<(), MenuError> {
        while !self.state.exhausted {
            self.fetch(super::UPSTREAM_PAGE_CAP)?;
        }
        Ok(())
    }

    /// Render the next screenful starting at the cursor.
    pub fn render_page(
        &mut self,
        metrics: Option<TerminalMetrics>,
        out: &mut dyn Write,
    ) -> Result<(), MenuError> {
        self.phase = MenuPhase::Rendering;
        let result = self.render_inner(metrics, out);
        self.phase = match &result {
            Ok(()) if self.state.exhausted && self.state.cursor > self.len() => {
                MenuPhase::Exhausted
            }
            _ => MenuPhase::AwaitingInput,
        };
        result
    }

    fn render_inner(
        &mut self,
        metrics: Option<TerminalMetrics>,
        out: &mut dyn Write,
    ) -> Result<(), MenuError> {
        let (paginate, height, cols) = match metrics {
            Some(metrics) => (true, metrics.rows, metrics.cols),
            None => (false, DEFAULT_HEIGHT, DEFAULT_WIDTH),
        };

        let intro_prompt = lines_needed(cols, LineMode::Most, &[self.text.intro.as_str()])
            + lines_needed(cols, LineMode::Most, &[self.text.prompt.as_str()]);
        let footers = [
            self.text.partial.as_str(),
            self.text.more_maybe.as_str(),
            self.text.end.as_str(),
        ];
        // Both bounds use the shortest footer.
        let min_header = intro_prompt + lines_needed(cols, LineMode::Least, &footers);
        let max_header = intro_prompt + lines_needed(cols, LineMode::Least, &footers);

        let page_rows = height.saturating_sub(min_header);
        if !self.state.exhausted && self.len() <= self.state.cursor + page_rows {
            self.fetch(page_rows)?;
        }

        if self.state.cursor > self.len() {
            writeln!(out, "{}", self.text.end)?;
            out.flush()?;
            return Ok(());
        }

        let idx_width = digit_count(self.len());
        let lines_to_fill = if paginate {
            height.saturating_sub(max_header + 1)
        } else {
            usize::MAX
        };
        let indent = " ".repeat(idx_width + 2);

        let mut rows = vec![self.text.intro.clone()];
        let mut rows_used = lines_needed(cols, LineMode::Most, &[self.text.intro.as_str()]);
        let mut shown = 0usize;
        let start = self.state.cursor;
        for (offset, item) in self.state.buffer[start - 1..].iter().enumerate() {
            if shown > 0 && shown >= lines_to_fill {
                break;
            }
            let idx = start + offset;
            let line = format!(" {idx:>idx_width$} {}", item.label);
            if paginate {
                let wrapped = wrap(&line, cols, &indent);
                let needed = wrapped.len().max(1);
                if shown > 0 && rows_used + needed + max_header > height {
                    break;
                }
                rows_used += needed;
                rows.extend(wrapped);
            } else {
                rows.push(line);
            }
            shown += 1;
            self.state.cursor = idx + 1;
        }
        if paginate && shown == 1 && rows_used + max_header > height {
            log_debug(&format!(
                "menu item {start} is taller than the terminal ({height} rows)"
            ));
        }

        let total = self.len();
        let footer = if self.state.cursor <= total {
            self.text.partial_line(self.state.cursor - 1, total)
        } else if !self.state.exhausted {
            // The feed has not come back empty yet.
            self.text.more_maybe.clone()
        } else {
            self.text.end.clone()
        };
        rows.push(footer);

        let mut page = rows.join("\n");
        page.push('\n');
        out.write_all(page.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Show the next page from the current cursor.
    pub fn more(
        &mut self,
        metrics: Option<TerminalMetrics>,
        out: &mut dyn Write,
    ) -> Result<(), MenuError> {
        self.render_page(metrics, out)
    }

    /// Rewind to the first item and show it.
    pub fn restart(
        &mut self,
        metrics: Option<TerminalMetrics>,
        out: &mut dyn Write,
    ) -> Result<(), MenuError> {
        self.state.cursor = 1;
        self.render_page(metrics, out)
    }

    /// Classify one line of input.
    pub fn select(&mut self, input: &str) -> Selection {
        let line = input.trim();
        match line {
            "e" | "q" => {
                self.phase = MenuPhase::Done;
                return Selection::Exit;
            }
            "" => return Selection::PassThrough(PassThrough::Empty),
            "help" | "?" => return Selection::PassThrough(PassThrough::Help),
            "m" => return Selection::PassThrough(PassThrough::More),
            "r" => return Selection::PassThrough(PassThrough::Restart),
            _ => {}
        }
        if let Some(command) = line.strip_prefix("shell").or_else(|| line.strip_prefix('!')) {
            return Selection::PassThrough(PassThrough::Shell(command.trim().to_string()));
        }
        match line.parse::<usize>() {
            Ok(n) if (1..=self.len()).contains(&n) => {
                self.phase = MenuPhase::Dispatching;
                Selection::Dispatch(n)
            }
            _ => Selection::Invalid(line.to_string()),
        }
    }

    /// Close out a dispatch. When the host changed the options the cursor rewinds.
    pub fn finish_dispatch(&mut self, options_changed: bool) {
        if options_changed {
            self.state.cursor = 1;
        }
        self.phase = MenuPhase::AwaitingInput;
    }

    /// Replace the buffer with a fresh fixed item set.
    pub fn start_session(&mut self, items: Vec<DisplayItem<A, P>>) {
        self.feed = None;
        self.state = MenuState::new(items, true);
        self.phase = MenuPhase::Idle;
    }

    /// Mark the menu as finished, e.g. on end of input.
    pub fn close(&mut self) {
        self.phase = MenuPhase::Done;
    }
}
