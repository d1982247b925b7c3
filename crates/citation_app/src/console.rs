//! Line-oriented prompts over any reader/writer pair.
//!
//! Every prompt re-asks until it gets acceptable input. A closed input
//! stream surfaces as [`io::ErrorKind::UnexpectedEof`] so the menu loop can
//! shut down cleanly.

use std::io::{self, BufRead, Write};

use citation_core::{is_valid_url, Record};

pub const BLANK: &str = "[blank]";
pub const RULE: &str = "--------------------";

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.output, "{}", text.as_ref())
    }

    pub fn heading(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.output, "\n{title}\n{RULE}")
    }

    /// Reads one line, trimmed. End of input is an error.
    pub fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }

    /// A menu number in `0..=max`.
    pub fn menu_choice(&mut self, max: u8) -> io::Result<u8> {
        loop {
            let answer = self.ask("Enter your choice: ")?;
            match answer.parse::<u8>() {
                Ok(choice) if choice <= max => return Ok(choice),
                Ok(_) => self.say("Error: Invalid option. Please select an option from the menu.")?,
                Err(_) => self.say("Error: Please enter a valid menu number.")?,
            }
        }
    }

    /// `None` when the user just presses enter.
    pub fn url(&mut self) -> io::Result<Option<String>> {
        loop {
            let answer = self.ask("Enter URL (or press enter to cancel): ")?;
            if answer.is_empty() {
                return Ok(None);
            }
            if is_valid_url(&answer) {
                return Ok(Some(answer));
            }
            self.say("Error: Invalid URL. Enter a full http:// or https:// address.")?;
        }
    }

    pub fn author(&mut self) -> io::Result<Option<String>> {
        let answer = self.ask("Enter author (or press enter to leave blank): ")?;
        Ok((!answer.is_empty()).then_some(answer))
    }

    /// With `required` set an empty answer is refused. Only Add passes it;
    /// update and fill-blanks leave the title optional.
    pub fn title(&mut self, required: bool) -> io::Result<Option<String>> {
        loop {
            let prompt = if required {
                "Enter title: "
            } else {
                "Enter title (or press enter to leave blank): "
            };
            let answer = self.ask(prompt)?;
            if !answer.is_empty() {
                return Ok(Some(answer));
            }
            if !required {
                return Ok(None);
            }
            self.say("Error: A title is required.")?;
        }
    }

    /// Four digits, or nothing.
    pub fn year(&mut self) -> io::Result<Option<u32>> {
        loop {
            let answer = self.ask("Enter year (or press enter to leave blank): ")?;
            if answer.is_empty() {
                return Ok(None);
            }
            match parse_year(&answer) {
                Some(year) => return Ok(Some(year)),
                None => self.say("Error: Enter the year as four digits, e.g. 2024.")?,
            }
        }
    }

    pub fn file_name(&mut self, prompt: &str) -> io::Result<String> {
        loop {
            let answer = self.ask(prompt)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            self.say("Invalid input. Please try again.")?;
        }
    }

    pub fn show_record(&mut self, record: &Record) -> io::Result<()> {
        let year = record.year().map(|y| y.to_string());
        writeln!(self.output, "URL: {}", record.key())?;
        writeln!(self.output, "Author: {}", record.author().unwrap_or(BLANK))?;
        writeln!(self.output, "Title: {}", record.title().unwrap_or(BLANK))?;
        writeln!(self.output, "Year: {}", year.as_deref().unwrap_or(BLANK))?;
        writeln!(
            self.output,
            "Date Accessed: {}",
            record.accessed_on().format("%Y-%m-%d")
        )
    }

    pub fn show_records<'a>(&mut self, records: impl IntoIterator<Item = &'a Record>) -> io::Result<()> {
        for record in records {
            self.show_record(record)?;
            writeln!(self.output, "---------------------------------------------")?;
        }
        Ok(())
    }
}

fn parse_year(answer: &str) -> Option<u32> {
    if answer.len() != 4 || !answer.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    answer.parse().ok().filter(|year| *year > 0)
}
