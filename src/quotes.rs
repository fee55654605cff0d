use crate::models::Quote;
use chrono::{Timelike, Utc};

pub const QUOTES: &[(&str, &str)] = &[
    ("The journey of a thousand miles begins with a single step.", "Lao Tzu"),
    ("It does not matter how slowly you go as long as you do not stop.", "Confucius"),
    ("Everything you need is already inside you.", "Unknown"),
    ("Small steps every day add up to big results.", "Unknown"),
    ("Don't watch the clock; do what it does. Keep going.", "Sam Levenson"),
    ("Believe you can and you're halfway there.", "Theodore Roosevelt"),
    ("Success is the sum of small efforts, repeated day in and day out.", "Robert Collier"),
    ("The only way to do great work is to love what you do.", "Steve Jobs"),
    ("Your future is created by what you do today, not tomorrow.", "Unknown"),
    ("It always seems impossible until it's done.", "Nelson Mandela"),
];

/// Wraps around, so any seed picks a quote.
pub fn quote_at(seed: usize) -> Quote {
    let (text, author) = QUOTES[seed % QUOTES.len()];
    Quote {
        text: text.to_string(),
        author: author.to_string(),
    }
}

pub fn random_quote() -> Quote {
    quote_at(Utc::now().nanosecond() as usize)
}
