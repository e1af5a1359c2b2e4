use std::io::{BufRead, Write};
use tracing::warn;

use crate::render::Block;
use crate::view::{Confirm, Region, View};

/// View and confirmation prompt backed by a terminal.
pub struct Terminal<R, W> {
    input: R,
    output: W,
    html: bool,
    assume_yes: bool,
    reload_requested: bool,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            html: false,
            assume_yes: false,
            reload_requested: false,
        }
    }

    /// Print blocks as HTML fragments instead of plain text.
    pub fn html(mut self, html: bool) -> Self {
        self.html = html;
        self
    }

    /// Answer every confirmation with yes.
    pub fn assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    /// Whether a handler asked for the page to be refreshed since the last call.
    pub fn take_reload(&mut self) -> bool {
        std::mem::take(&mut self.reload_requested)
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self
            .output
            .write_all(text.as_bytes())
            .and_then(|_| self.output.flush())
        {
            warn!("failed to write to terminal: {}", e);
        }
    }
}

impl<R: BufRead, W: Write> View for Terminal<R, W> {
    fn render(&mut self, _region: Region, block: Block) {
        let text = if self.html {
            block.to_html()
        } else {
            block.to_text()
        };
        self.write(&text);
    }

    fn alert(&mut self, message: &str) {
        self.write(&format!("[알림] {}\n", message));
    }

    fn reload(&mut self) {
        self.reload_requested = true;
    }
}

impl<R: BufRead, W: Write> Confirm for Terminal<R, W> {
    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            self.write(&format!("{} [y/N] y\n", message));
            return true;
        }

        self.write(&format!("{} [y/N] ", message));
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) => {
                self.write("\n");
                false
            }
            Ok(_) => matches!(
                answer.trim().to_lowercase().as_str(),
                "y" | "yes" | "예" | "네" | "ㅇ"
            ),
            Err(e) => {
                warn!("failed to read confirmation: {}", e);
                false
            }
        }
    }
}
