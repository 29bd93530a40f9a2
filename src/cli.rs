use anyhow::{Context, Result};
use console::Term;

const PREFIX_LEN: u16 = 10;

pub fn gen_prefix(prefix: &str) -> String {
    // Right-align the prefix within PREFIX_LEN columns
    let left_padding_size =
        (PREFIX_LEN as usize).saturating_sub(1 + console::measure_text_width(prefix));
    let mut real_prefix: String = " ".repeat(left_padding_size);
    real_prefix.push_str(prefix);
    real_prefix.push(' ');
    real_prefix
}

pub struct Writer {
    term: Term,
}

impl Default for Writer {
    fn default() -> Self {
        Writer::new()
    }
}

impl Writer {
    pub fn new() -> Self {
        Writer {
            term: Term::stdout(),
        }
    }

    pub fn get_max_len(&self) -> u16 {
        self.term
            .size_checked()
            .unwrap_or((25, 80))
            .1
            .saturating_sub(PREFIX_LEN)
    }

    fn write_prefix(&self, prefix: &str) -> Result<()> {
        self.term
            .write_str(&gen_prefix(prefix))
            .context("Failed to write prefix to console")?;
        Ok(())
    }

    pub fn writeln(&self, prefix: &str, msg: &str) -> Result<()> {
        let max_len = self.get_max_len();
        let mut first_run = true;

        let mut msg = msg.to_string();
        // Print msg with left padding
        while !msg.is_empty() {
            let line_msg = console::truncate_str(&msg, max_len.into(), "\n");
            if first_run {
                self.write_prefix(prefix)?;
                first_run = false;
            } else {
                self.write_prefix("")?;
            }
            self.term
                .write_str(&line_msg)
                .context("Failed to write message to console")?;
            // Remove the already written part
            let line_msg_len = line_msg.len();
            msg.replace_range(..line_msg_len, "");
        }
        self.term.write_line("")?;
        Ok(())
    }

    pub fn write_chunks<S: AsRef<str>>(&self, prefix: &str, chunks: &[S]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        let max_len: usize = self.get_max_len().saturating_sub(PREFIX_LEN).into();
        // Write prefix first
        self.write_prefix(prefix)?;
        let mut cur_line_len: usize = PREFIX_LEN.into();
        for chunk in chunks {
            let chunk = chunk.as_ref();
            let chunk_len = console::measure_text_width(chunk);
            // Wrap if this chunk would overflow the line (the 1 is the
            // preceding space)
            if cur_line_len + chunk_len + 1 > max_len {
                self.term.write_str("\n")?;
                self.write_prefix("")?;
                cur_line_len = 0;
            }
            self.term.write_str(chunk)?;
            self.term.write_str(" ")?;
            cur_line_len += chunk_len + 1;
        }
        self.term.write_str("\n")?;
        Ok(())
    }
}

// Write errors in the following macros are ignored, since failing to print
// messages is not an emergency
#[macro_export]
macro_rules! msg {
    ($prefix:tt, $($arg:tt)+) => {
        $crate::WRITER.writeln($prefix, &format!($($arg)+)).ok();
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        $crate::WRITER.writeln(&console::style("SUCCESS").green().bold().to_string(), &format!($($arg)+)).ok();
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::WRITER.writeln(&console::style("INFO").blue().bold().to_string(), &format!($($arg)+)).ok();
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::WRITER.writeln(&console::style("WARNING").yellow().bold().to_string(), &format!($($arg)+)).ok();
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::WRITER.writeln(&console::style("ERROR").red().bold().to_string(), &format!($($arg)+)).ok();
    };
}

#[macro_export]
macro_rules! due_to {
    ($($arg:tt)+) => {
        $crate::WRITER.writeln(&console::style("DUE TO").yellow().bold().to_string(), &format!($($arg)+)).ok();
    };
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn prefix_is_right_aligned() {
        assert_eq!(gen_prefix("INFO"), "     INFO ");
        assert_eq!(gen_prefix(""), " ".repeat(10));
    }
}
