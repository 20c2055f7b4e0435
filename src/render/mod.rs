//! Incremental markdown-aware renderer
//!
//! Classifies each arriving character as plain prose, emphasized text or
//! code using nothing but a running backtick count and a previous-was-
//! backtick flag, so a span can open in one delta and close many deltas
//! later. All transitions are forward-only: a character sent to the
//! terminal is never re-emitted or taken back.
//!
//! The machine is pure: `push_delta` returns styled chunks and the terminal
//! write lives in [`writer`]. That keeps every threshold unit-testable
//! without a tty.
//!
//! The very first fragment of a response runs under slightly different
//! reset/threshold rules than all later fragments (`==3` vs `>=3` for code,
//! `==6` vs `>=6 && even` for fence resets, and a different update point for
//! the previous-backtick flag). Later fragments must tolerate fences that
//! opened before they arrived, which is why their rules are the permissive
//! ones.

pub mod writer;

/// Text classification applied to the next printed character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Plain,
    Emphasis,
    Code,
}

/// A run of same-styled output text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledChunk {
    pub span: Span,
    pub text: String,
}

/// Per-response renderer state; created once per stream, mutated once per
/// character, discarded at end of stream
#[derive(Debug)]
pub struct RenderState {
    tick_count: u32,
    previous_was_tick: bool,
    is_green: bool,
    is_code: bool,
    line_length: i64,
    fragment: u64,
    width: Option<i64>,
    wrap_exempt: bool,
}

impl RenderState {
    /// `width` of `None` disables wrap injection entirely (failed terminal
    /// size query); `wrap_exempt` disables it for providers whose deltas
    /// carry server-side line breaks.
    pub fn new(width: Option<u16>, wrap_exempt: bool) -> Self {
        RenderState {
            tick_count: 0,
            previous_was_tick: false,
            is_green: false,
            is_code: false,
            line_length: 0,
            fragment: 0,
            width: width.map(i64::from),
            wrap_exempt,
        }
    }

    /// Process one delta, returning the styled output it produced
    pub fn push_delta(&mut self, delta: &str) -> Vec<StyledChunk> {
        let mut out = Vec::new();

        // Wrap decisions happen once per delta, in code points not bytes
        let word_length = delta.chars().count() as i64;
        self.wrap(word_length, &mut out);
        self.line_length += word_length;

        let first = self.fragment == 0;
        let bare_fence = delta == "``" || delta == "```";

        for ch in delta.chars() {
            self.step(ch, first, bare_fence, &mut out);
        }

        self.fragment += 1;
        out
    }

    fn wrap(&mut self, word_length: i64, out: &mut Vec<StyledChunk>) {
        if self.wrap_exempt {
            return;
        }
        if let Some(width) = self.width {
            if width - self.line_length < word_length {
                emit(out, Span::Plain, '\n');
                self.line_length = 0;
            }
        }
    }

    fn step(&mut self, ch: char, first: bool, bare_fence: bool, out: &mut Vec<StyledChunk>) {
        if first {
            self.step_first(ch, out);
        } else {
            self.step_later(ch, bare_fence, out);
        }
    }

    // First-fragment rules: strict thresholds, backticks never printed,
    // previous-flag updated before emission.
    fn step_first(&mut self, ch: char, out: &mut Vec<StyledChunk>) {
        let is_tick = ch == '`';

        if is_tick {
            self.tick_count += 1;
            if self.tick_count == 2 && !self.previous_was_tick {
                self.tick_count = 0;
            } else if self.tick_count == 6 {
                self.tick_count = 0;
            }
            self.previous_was_tick = true;
            self.is_green = false;
            self.is_code = false;
        } else {
            match self.tick_count {
                1 => self.is_green = true,
                3 => self.is_code = true,
                _ => {}
            }
            self.previous_was_tick = false;
        }

        if self.is_code {
            emit(out, Span::Code, ch);
        } else if self.is_green {
            emit(out, Span::Emphasis, ch);
        } else if !is_tick {
            emit(out, Span::Plain, ch);
        }
    }

    // Later-fragment rules: `>=` thresholds so spans opened by earlier
    // deltas keep working, ticks become visible once a fence is open, and
    // the previous-flag is updated after emission.
    fn step_later(&mut self, ch: char, bare_fence: bool, out: &mut Vec<StyledChunk>) {
        let is_tick = ch == '`';

        if is_tick {
            self.tick_count += 1;
            if self.tick_count == 2 && !self.previous_was_tick {
                self.tick_count = 0;
            } else if self.tick_count >= 6 && self.tick_count % 2 == 0 && self.previous_was_tick {
                self.tick_count = 0;
            }
            self.is_green = false;
            self.is_code = false;
        } else {
            if ch == '\n' {
                self.line_length = 0;
            }
            if self.tick_count == 1 {
                self.is_green = true;
            } else if self.tick_count >= 3 {
                self.is_code = true;
            }
        }

        if self.is_code {
            emit(out, Span::Code, ch);
        } else if self.is_green {
            emit(out, Span::Emphasis, ch);
        } else if !is_tick {
            emit(out, Span::Plain, ch);
        } else if self.tick_count > 3 || bare_fence || (self.tick_count == 0 && self.previous_was_tick) {
            emit(out, Span::Plain, ch);
        }

        self.previous_was_tick = is_tick;
    }
}

/// Renderer variant for interactive shell mode: `<` opens a buffering state
/// that swallows everything up to a complete `<cmd>...</cmd>` token,
/// suppressing the span machine for tag content. Wrap accounting runs per
/// character here because tag bytes never reach the terminal.
#[derive(Debug)]
pub struct CmdRenderState {
    inner: RenderState,
    buffer: String,
    in_tag: bool,
}

impl CmdRenderState {
    pub fn new(width: Option<u16>, wrap_exempt: bool) -> Self {
        CmdRenderState {
            inner: RenderState::new(width, wrap_exempt),
            buffer: String::new(),
            in_tag: false,
        }
    }

    pub fn push_delta(&mut self, delta: &str) -> Vec<StyledChunk> {
        let mut out = Vec::new();
        let first = self.inner.fragment == 0;
        let bare_fence = delta == "``" || delta == "```";

        for ch in delta.chars() {
            if ch == '<' && !self.in_tag {
                self.in_tag = true;
                self.buffer.push(ch);
            } else if ch == '>' && self.in_tag {
                self.buffer.push(ch);
                if self.buffer.starts_with("<cmd>") && self.buffer.ends_with("</cmd>") {
                    self.buffer.clear();
                    self.in_tag = false;
                }
            } else if self.in_tag {
                self.buffer.push(ch);
            } else {
                self.inner.wrap(1, &mut out);
                self.inner.line_length += 1;
                self.inner.step(ch, first, bare_fence, &mut out);
            }
        }

        self.inner.fragment += 1;
        out
    }

    /// Unconsumed tag bytes at end of stream; the caller warns, it does not
    /// fail
    pub fn pending_tag(&self) -> Option<&str> {
        if self.in_tag && !self.buffer.is_empty() {
            Some(&self.buffer)
        } else {
            None
        }
    }
}

fn emit(out: &mut Vec<StyledChunk>, span: Span, ch: char) {
    if let Some(last) = out.last_mut() {
        if last.span == span {
            last.text.push(ch);
            return;
        }
    }
    out.push(StyledChunk { span, text: ch.to_string() });
}
