/// One selectable row: what to show, what to run, and what to hand the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem<A, P = ()> {
    pub label: String,
    pub action: A,
    pub payload: Option<P>,
}

impl<A, P> DisplayItem<A, P> {
    pub fn new(label: impl Into<String>, action: A) -> Self {
        Self {
            label: label.into(),
            action,
            payload: None,
        }
    }

    pub fn with_payload(label: impl Into<String>, action: A, payload: P) -> Self {
        Self {
            label: label.into(),
            action,
            payload: Some(payload),
        }
    }
}

/// Fixed strings printed around a page. `partial` may contain `{shown}` and `{total}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuText {
    pub intro: String,
    pub prompt: String,
    pub partial: String,
    pub more_maybe: String,
    pub end: String,
}

impl Default for MenuText {
    fn default() -> Self {
        Self {
            intro: "Make a selection or 'e' to return to the main menu.".to_string(),
            prompt: "Selection: ".to_string(),
            partial: "{shown} of {total} entries printed. Type 'm' to see more, or 'r' to start from the beginning again.".to_string(),
            more_maybe: "More entries may be available. Type 'm' to try and retrieve more."
                .to_string(),
            end: "End of options.".to_string(),
        }
    }
}

impl MenuText {
    pub fn with_intro(mut self, intro: impl Into<String>) -> Self {
        self.intro = intro.into();
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_partial(mut self, partial: impl Into<String>) -> Self {
        self.partial = partial.into();
        self
    }

    pub fn with_more_maybe(mut self, more_maybe: impl Into<String>) -> Self {
        self.more_maybe = more_maybe.into();
        self
    }

    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = end.into();
        self
    }

    pub(super) fn partial_line(&self, shown: usize, total: usize) -> String {
        self.partial
            .replace("{shown}", &shown.to_string())
            .replace("{total}", &total.to_string())
    }
}

/// Buffered items plus the 1-based index of the first one not yet shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState<A, P = ()> {
    pub(super) buffer: Vec<DisplayItem<A, P>>,
    pub(super) cursor: usize,
    pub(super) exhausted: bool,
}

impl<A, P> MenuState<A, P> {
    pub(super) fn new(buffer: Vec<DisplayItem<A, P>>, exhausted: bool) -> Self {
        Self {
            buffer,
            cursor: 1,
            exhausted,
        }
    }

    pub fn items(&self) -> &[DisplayItem<A, P>] {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
