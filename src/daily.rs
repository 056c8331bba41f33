use chrono::{Datelike, NaiveDate};

pub const QUESTIONS: &[&str] = &[
    "What's one thing you're looking forward to today?",
    "If you could have any superpower, what would it be?",
    "What's your favorite memory with her so far?",
    "What's a small act of kindness you can do today?",
    "What's your go-to song when you need a boost?",
    "What's something new you want to learn?",
    "If you could travel anywhere, where would you go?",
    "What makes you smile the most?",
    "What's your favorite thing about being in school?",
    "What's a dream you have for the future?",
    "What's one thing you appreciate about her?",
    "If you could spend a day doing anything, what would it be?",
    "What's your favorite subject in school?",
    "What's a funny memory you have?",
    "What's a goal you're working towards right now?",
    "What's your favorite way to relax?",
    "If you could give one piece of advice to your past self, what would it be?",
    "What's your favorite season and why?",
    "What's a book or movie that has inspired you?",
    "What's something you're grateful for today?",
];

pub const MESSAGES: &[&str] = &[
    "You make ordinary days feel like sunrise.",
    "Small steps still count as moving forward.",
    "Somebody out there is smiling because of you.",
    "Be proud of how far you've come.",
    "Today is a good day to be a little brave.",
    "Your kindness is louder than you think.",
    "Rest is part of the work, too.",
];

/// Same element all day long, a new one tomorrow. `None` only for an empty list.
pub fn daily_item<T>(items: &[T], date: NaiveDate) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    let day = date.ordinal() as usize;
    items.get(day % items.len())
}

pub fn greeting_for_hour(hour: u32, name: &str) -> String {
    match hour {
        5..=11 => format!("Good Morning, {name}! ☀️"),
        12..=17 => format!("Good Afternoon, {name}! 🌤️"),
        _ => format!("Good Evening, {name}! 🌙"),
    }
}
