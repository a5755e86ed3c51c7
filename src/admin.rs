use std::fmt::Write;

use crate::dashboard;
use crate::models::StudentRecord;
use crate::pagination::Paginator;
use crate::search;
use crate::views::{self, Layout, ViewConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Clear,
    Next,
    Previous,
    Page(String),
    Open(String),
    Close,
    Help,
    Quit,
}

impl Command {
    /// Unknown input yields `None` and is ignored by the session.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let command = match word.to_ascii_lowercase().as_str() {
            "search" | "s" => Command::Search(rest.to_string()),
            "clear" => Command::Clear,
            "next" | "n" => Command::Next,
            "prev" | "previous" | "p" => Command::Previous,
            "page" | "g" => Command::Page(rest.to_string()),
            "open" | "o" => Command::Open(rest.to_string()),
            "close" | "x" => Command::Close,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            _ => return None,
        };
        Some(command)
    }
}

pub const HELP: &str = "\
search <text>  filter by name, email or school
clear          drop the search
next | prev    move one page
page <n>       jump to page n
open <row>     show details for a row number
close          hide details
quit           leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Redraw,
    Unchanged,
    Help,
    Quit,
}

/// View state for the admin screen: search text, page cursor and the opened student.
/// The records themselves are never touched.
pub struct AdminSession<'a> {
    students: &'a [StudentRecord],
    config: ViewConfig,
    layout: Layout,
    query: String,
    pager: Paginator,
    selected: Option<usize>,
}

impl<'a> AdminSession<'a> {
    pub fn new(
        students: &'a [StudentRecord],
        config: ViewConfig,
        layout: Layout,
        page_size: usize,
    ) -> Self {
        Self {
            students,
            config,
            layout,
            query: String::new(),
            pager: Paginator::new(page_size, students.len()),
            selected: None,
        }
    }

    pub fn current_page(&self) -> usize {
        self.pager.current_page()
    }

    pub fn filtered(&self) -> Vec<&'a StudentRecord> {
        search::filter_students(self.students, &self.query)
    }

    pub fn selected(&self) -> Option<&'a StudentRecord> {
        self.selected
            .and_then(|index| self.filtered().get(index).copied())
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.trim().to_string();
        let matches = self.filtered().len();
        self.pager.set_total_items(matches);
        self.selected = None;
        tracing::debug!(query = %self.query, matches, "search updated");
    }

    pub fn go_to_page(&mut self, page: i64) {
        self.pager.go_to_page(page);
    }

    pub fn apply(&mut self, command: Command) -> Outcome {
        match command {
            Command::Search(query) => {
                self.set_query(&query);
                Outcome::Redraw
            }
            Command::Clear => {
                self.set_query("");
                Outcome::Redraw
            }
            Command::Next => {
                self.pager.next();
                Outcome::Redraw
            }
            Command::Previous => {
                self.pager.previous();
                Outcome::Redraw
            }
            Command::Page(input) => {
                if self.pager.jump(&input) {
                    Outcome::Redraw
                } else {
                    Outcome::Unchanged
                }
            }
            Command::Open(input) => match input.trim().parse::<usize>() {
                Ok(row) if row >= 1 && row <= self.filtered().len() => {
                    self.selected = Some(row - 1);
                    Outcome::Redraw
                }
                _ => Outcome::Unchanged,
            },
            Command::Close => {
                self.selected = None;
                Outcome::Redraw
            }
            Command::Help => Outcome::Help,
            Command::Quit => Outcome::Quit,
        }
    }

    pub fn render(&self) -> String {
        let filtered = self.filtered();
        let stats = dashboard::compute_stats(self.students, self.config.total_fee);
        let mut output = String::new();

        let _ = writeln!(output, "Admin Dashboard");
        let _ = writeln!(output);
        output.push_str(&views::render_stats(&stats));
        let _ = writeln!(output);

        if !self.query.is_empty() {
            let _ = writeln!(output, "Search: \"{}\"", self.query);
        }
        let page = self.pager.slice(&filtered);
        output.push_str(&views::render_summary(
            page,
            self.pager.offset() + 1,
            self.layout,
            &self.config,
        ));
        let _ = writeln!(output, "{}", views::render_page_footer(&self.pager.meta()));

        if let Some(student) = self.selected() {
            let _ = writeln!(output);
            output.push_str(&views::render_detail(student, &self.config));
        }

        output
    }
}
