use std::io::{BufRead, Write};

use stacked_errors::{bail, Result, StackableErr};

/// A parsed answer to a yes/no question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Invalid,
}

/// Accepts "yes"/"y" and "no"/"n" case insensitively, ignoring surrounding
/// whitespace
///
/// ```
/// use tool_tester::{parse_yes_no, Answer};
///
/// assert_eq!(parse_yes_no("Y"), Answer::Yes);
/// assert_eq!(parse_yes_no(" no\n"), Answer::No);
/// assert_eq!(parse_yes_no("yep"), Answer::Invalid);
/// ```
pub fn parse_yes_no(token: &str) -> Answer {
    match token.trim().to_lowercase().as_str() {
        "yes" | "y" => Answer::Yes,
        "no" | "n" => Answer::No,
        _ => Answer::Invalid,
    }
}

/// Asks yes/no questions on a line based input and output. When
/// `non_interactive` is set every question is answered with yes without
/// touching the input or output.
#[derive(Debug)]
pub struct Prompter<R, W> {
    input: R,
    output: W,
    non_interactive: bool,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W, non_interactive: bool) -> Self {
        Self {
            input,
            output,
            non_interactive,
        }
    }

    pub fn non_interactive(&self) -> bool {
        self.non_interactive
    }

    /// Asks `question` until a yes or no is given. Invalid answers re-prompt
    /// without limit, closed input is an error.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        if self.non_interactive {
            return Ok(true)
        }
        loop {
            writeln!(self.output, "{question} (Y/N)").stack()?;
            self.output.flush().stack()?;
            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .stack_err("Prompter::confirm -> failed to read an answer")?;
            if read == 0 {
                bail!("Prompter::confirm -> input was closed while asking \"{question}\"")
            }
            match parse_yes_no(&line) {
                Answer::Yes => return Ok(true),
                Answer::No => return Ok(false),
                Answer::Invalid => (),
            }
        }
    }

    /// Returns the writer, mostly useful for looking at what was asked
    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn yes_no_vocabulary() {
        for token in ["y", "Y", "yes", "YES", "Yes", " y \n"] {
            assert_eq!(parse_yes_no(token), Answer::Yes, "{token:?}");
        }
        for token in ["n", "N", "no", "NO", "nO\r\n"] {
            assert_eq!(parse_yes_no(token), Answer::No, "{token:?}");
        }
        for token in ["", "ye", "yess", "nope", "0", "1", "y n"] {
            assert_eq!(parse_yes_no(token), Answer::Invalid, "{token:?}");
        }
    }

    #[test]
    fn reprompts_until_valid() {
        let mut prompter =
            Prompter::new(Cursor::new("what\n\nmaybe\nN\n"), Vec::<u8>::new(), false);
        assert!(!prompter.confirm("Continue?").unwrap());
        let asked = String::from_utf8(prompter.into_output()).unwrap();
        assert_eq!(asked.matches("Continue? (Y/N)\n").count(), 4);
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut prompter = Prompter::new(Cursor::new("bad\n"), Vec::<u8>::new(), false);
        assert!(prompter.confirm("Continue?").is_err());
    }

    #[test]
    fn non_interactive_never_asks() {
        let mut prompter = Prompter::new(Cursor::new(""), Vec::<u8>::new(), true);
        assert!(prompter.confirm("Continue?").unwrap());
        assert!(prompter.confirm("Really?").unwrap());
        assert!(prompter.into_output().is_empty());
    }
}
