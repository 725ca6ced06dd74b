//! Demo data for trying out paging and selection on a large list.

use crate::notes::models::NewNote;
use crate::notes::store::{NoteStore, StoreError};
use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;

pub const DEFAULT_SEED_COUNT: usize = 120;

const WORDS: &[&str] = &[
    "alpha", "amber", "anchor", "atlas", "beacon", "birch", "breeze", "canyon", "cedar", "cinder",
    "cobalt", "comet", "coral", "delta", "drift", "ember", "falcon", "fern", "field", "frost",
    "garden", "glacier", "harbor", "hollow", "island", "ivory", "juniper", "lantern", "lumen",
    "maple", "meadow", "meridian", "mist", "nebula", "north", "oak", "orbit", "pebble", "pine",
    "prairie", "quartz", "quill", "raven", "ridge", "river", "saffron", "signal", "slate", "spruce",
    "summit", "thistle", "timber", "tundra", "vale", "willow", "winter", "zephyr",
];

/// Append `count` generated notes with creation times spread over the past
/// year. Returns how many were inserted.
pub fn seed_notes<R: Rng>(store: &mut NoteStore, count: usize, now: DateTime<Utc>, rng: &mut R) -> Result<usize, StoreError> {
    let mut inserted = 0;
    while inserted < count {
        let title = sentence(rng, 3, 7);
        let slug = format!("{}-{}", slugify(&title), suffix(rng));
        let note = NewNote {
            content: body(rng, &title),
            title: Some(title),
            slug: Some(slug),
            is_public: rng.gen_bool(0.5),
        };

        let created_at = now - Duration::seconds(rng.gen_range(0..365 * 24 * 3600));
        let span = (now - created_at).num_seconds().max(1);
        let updated_at = created_at + Duration::seconds(rng.gen_range(0..span));

        match store.insert(note, created_at, updated_at) {
            Ok(_) => inserted += 1,
            // Suffix collision; draw again.
            Err(StoreError::DuplicateSlug(_)) => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(inserted)
}

pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

fn suffix<R: Rng>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(5)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

fn words<R: Rng>(rng: &mut R, n: usize) -> Vec<&'static str> {
    (0..n).filter_map(|_| WORDS.choose(rng).copied()).collect()
}

fn sentence<R: Rng>(rng: &mut R, min: usize, max: usize) -> String {
    let n = rng.gen_range(min..=max);
    let mut text = words(rng, n).join(" ");
    if let Some(first) = text.get(0..1) {
        text = first.to_uppercase() + &text[1..];
    }
    text.push('.');
    text
}

fn paragraph<R: Rng>(rng: &mut R) -> String {
    let n = rng.gen_range(3..=5);
    (0..n).map(|_| sentence(rng, 6, 12)).collect::<Vec<_>>().join(" ")
}

fn paragraphs<R: Rng>(rng: &mut R, n: usize) -> String {
    (0..n).map(|_| paragraph(rng)).collect::<Vec<_>>().join("\n\n")
}

fn body<R: Rng>(rng: &mut R, title: &str) -> String {
    let bullets: Vec<String> = (0..3).map(|_| format!("- {}", words(rng, 3).join(" "))).collect();
    format!(
        "# {}\n\n{}\n\n## Section\n\n{}\n\n{}\n\n> {}\n\n{}",
        title,
        paragraphs(rng, 2),
        paragraphs(rng, 3),
        bullets.join("\n"),
        sentence(rng, 6, 12),
        paragraphs(rng, 2),
    )
}
