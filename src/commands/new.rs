use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use habitcal_core::{
    ClockTime, DayEntry, DayOfMonth, DayStep, EntityKind, HabitCalConfig, MonthEntry, MonthStep,
    RepeatBound, ScheduleDefinition, Span, StartTime, TrackedItem, WeekEntry, WeekStep,
};
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::store::{FileFormat, create};

/// Everything `habitcal new` needs to build an item.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub kind: EntityKind,
    pub span: Span,
    pub every: u32,
    pub count: Option<u32>,
    pub horizon_days: Option<u32>,
    /// Step text; defaults to the item name.
    pub step: Option<String>,
    /// Clock time for day steps.
    pub at: Option<ClockTime>,
    /// Weekday for weekly items, day of month for monthly and yearly ones.
    pub on: Option<String>,
    pub start: Option<StartTime>,
    pub json: bool,
}

pub fn run(config: &HabitCalConfig, args: NewItem, today: NaiveDate) -> Result<()> {
    let item = build_item(&args, today, uuid::Uuid::new_v4().to_string())?;
    let format = if args.json {
        FileFormat::Json
    } else {
        FileFormat::Toml
    };

    let path = create(&config.habits_path(), &item, format)?;

    println!("{}", format!("  Created: {}", path.display()).green());
    println!("  {}", item.render());

    Ok(())
}

/// A one-entry schedule for the requested span.
fn build_item(args: &NewItem, today: NaiveDate, id: String) -> Result<TrackedItem> {
    let start = args.start.unwrap_or(StartTime::Date(today));
    let text = args.step.clone().unwrap_or_else(|| args.name.clone());

    let repeat = match (args.count, args.horizon_days) {
        (Some(_), Some(_)) => anyhow::bail!("Use either --count or --horizon-days, not both"),
        (Some(n), None) => RepeatBound::Count(n),
        (None, Some(n)) => RepeatBound::HorizonDays(n),
        (None, None) => RepeatBound::Forever,
    };

    let schedule = ScheduleDefinition::new(args.span, args.every).with_repeat(repeat);
    let schedule = match args.span {
        Span::Day => schedule.with_day(DayEntry {
            index: 1,
            title: args.name.clone(),
            steps: vec![DayStep {
                text,
                clock_time: args.at,
            }],
            reminders: Vec::new(),
        }),
        Span::Week => {
            let weekday = args
                .on
                .clone()
                .unwrap_or_else(|| start.date().weekday().to_string());
            schedule.with_week(WeekEntry {
                index: 1,
                title: args.name.clone(),
                description: String::new(),
                steps: vec![WeekStep { text, weekday }],
                reminders: Vec::new(),
            })
        }
        Span::Month | Span::Year => {
            let day = match &args.on {
                Some(spec) => DayOfMonth::Named(spec.clone()),
                None => DayOfMonth::Number(i64::from(start.date().day())),
            };
            schedule.with_month(MonthEntry {
                index: 1,
                title: args.name.clone(),
                description: String::new(),
                steps: vec![MonthStep { text, day }],
                reminders: Vec::new(),
            })
        }
    };

    let item = TrackedItem {
        id,
        kind: args.kind,
        name: args.name.clone(),
        start,
        schedule,
    };
    item.validate()?;

    Ok(item)
}
