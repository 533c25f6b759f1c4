//! TUI rendering traits for habitcal types.
//!
//! This module provides extension traits that add colored terminal rendering
//! to habitcal-core types using owo_colors.

use habitcal_core::{
    DayItem, DaySummary, EntityKind, Occurrence, ReminderDisplay, StepDisplay, StepTiming,
    TrackedItem,
};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for EntityKind {
    fn render(&self) -> String {
        match self {
            EntityKind::Habit => "habit".cyan().to_string(),
            EntityKind::Task => "task".magenta().to_string(),
        }
    }
}

impl Render for TrackedItem {
    fn render(&self) -> String {
        format!(
            "{} {} {} {}",
            self.kind.render(),
            self.name.bold(),
            format!("({})", self.id).dimmed(),
            format!("{}, from {}", self.schedule, self.start).dimmed()
        )
    }
}

impl Render for StepDisplay {
    fn render(&self) -> String {
        let timing = match &self.timing {
            StepTiming::Clock(Some(time)) => time.to_string(),
            StepTiming::Clock(None) => String::new(),
            StepTiming::Weekday(weekday) => weekday.to_string(),
            StepTiming::DayOfMonth(day) => format!("day {}", day),
        };

        if timing.is_empty() {
            format!("• {}", self.text)
        } else {
            format!("• {} {}", self.text, timing.dimmed())
        }
    }
}

impl Render for ReminderDisplay {
    fn render(&self) -> String {
        let time = self.time.map(|t| t.to_string()).unwrap_or_default();
        let message = self.message.as_deref().unwrap_or("reminder");
        format!("⏰ {} {}", time, message).trim().yellow().to_string()
    }
}

/// Lines for an occurrence's steps and reminders, indented by `indent`.
fn detail_lines(occurrence: &Occurrence, indent: &str) -> Vec<String> {
    let mut lines = Vec::new();
    if !occurrence.description.is_empty() {
        lines.push(format!("{}{}", indent, occurrence.description.italic()));
    }
    for step in &occurrence.steps {
        lines.push(format!("{}{}", indent, step.render()));
    }
    for reminder in &occurrence.reminders {
        lines.push(format!("{}{}", indent, reminder.render()));
    }
    lines
}

impl Render for Occurrence {
    fn render(&self) -> String {
        let date = self.date.format("%a %Y-%m-%d").to_string();
        let mut lines = vec![format!("{} {}", date.bold(), self.title)];
        lines.extend(detail_lines(self, "   "));
        lines.join("\n")
    }
}

impl Render for DayItem {
    fn render(&self) -> String {
        let title = if self.occurrence.title.is_empty() {
            self.name.clone()
        } else {
            format!("{}: {}", self.name, self.occurrence.title)
        };

        let mut lines = vec![format!("   {} {}", self.kind.render(), title)];
        lines.extend(detail_lines(&self.occurrence, "      "));
        lines.join("\n")
    }
}

impl Render for DaySummary {
    fn render(&self) -> String {
        let date = self.date.format("%a %Y-%m-%d").to_string();

        if self.is_empty() {
            return format!("{}\n   {}", date.dimmed(), "Nothing scheduled".dimmed());
        }

        let counts = format!(
            "{} {}, {} {}",
            self.habit_count,
            pluralize("habit", self.habit_count),
            self.task_count,
            pluralize("task", self.task_count)
        );

        let mut lines = vec![format!("{} {}", date.bold(), counts.dimmed())];
        lines.extend(self.items.iter().map(|item| item.render()));
        lines.join("\n")
    }
}

/// Simple pluralization helper
fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
