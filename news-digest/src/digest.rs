use crate::sources::github_trending::NO_DESCRIPTION;
use crate::types::{Category, DigestConfig, ScoredItem, SourceKind};
use chrono::{Local, NaiveDateTime};
use html_escape::{encode_single_quoted_attribute, encode_text};
use tracing::{debug, info};

const TITLE: &str = "📰 <b>Daily AI News Digest</b>";
const NOTHING_NEW: &str = "No new AI news today 🤷";
const DEFAULT_EMOJI: &str = "✨";

/// Section placement of an item: trending sources always go to the trending
/// section, everything else is split on `release_threshold`.
pub fn categorize(item: &ScoredItem, release_threshold: u32) -> Category {
    if item.item.kind == SourceKind::Trending {
        Category::TrendingRepo
    } else if item.score >= release_threshold {
        Category::BigRelease
    } else {
        Category::FlashNews
    }
}

/// Emoji shown in front of items from a known source.
pub fn source_emoji(source_name: &str) -> &'static str {
    match source_name {
        "Hugging Face Blog" => "🤗",
        "Hugging Face Paper" => "📝",
        "ML Reddit" => "🤖",
        "OpenAI Blog" => "✨",
        "The Gradient" => "📜",
        "Jay Alammar" => "💡",
        "DeepMind Blog" => "🔬",
        "AI From MIT News" => "🎓",
        "General News From MIT News" => "🏛️",
        "Microsoft AI Blog" => "💻",
        "machinelearningmastery Blog" => "👨‍🏫",
        "Nvidia AI Blog" => "🚀",
        "Towards Data Science" => "📊",
        "Hacker News" => "🧑‍💻",
        "The Verge" => "🟣",
        "GitHub Trending (python)" => "🐍",
        "GitHub Trending (jupyter-notebook)" => "📓",
        "GitHub Trending (google colab)" => "☁️",
        "GitHub Trending (Artificial Intelligence)" | "GitHub Trending (AI)" => "🧠",
        "GitHub Trending (machine-learning)" => "📈",
        "GitHub Trending (deep-learning)" => "🌌",
        "GitHub Trending (nlp)" | "GitHub Trending (Natural Language Processing)" => "🗣️",
        "GitHub Trending (CV)" | "GitHub Trending (Computer Vision)" => "👁️",
        "GitHub Trending (Data Science)" => "🧪",
        "GitHub Trending (Awesome Lists)" => "⭐",
        _ => DEFAULT_EMOJI,
    }
}

fn continuation_header(part_number: usize) -> String {
    format!("📰 <b>Digest continued ({})</b>\n\n", part_number)
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Renders ranked items into one or more channel messages.
pub struct DigestFormatter {
    config: DigestConfig,
}

impl DigestFormatter {
    pub fn new(config: DigestConfig) -> Self {
        Self { config }
    }

    pub fn categorize(&self, item: &ScoredItem) -> Category {
        categorize(item, self.config.release_threshold)
    }

    /// Render the digest stamped with the current local time.
    pub fn format(&self, items: &[ScoredItem]) -> Vec<String> {
        self.format_at(items, Local::now().naive_local())
    }

    /// Render the digest. Every returned part fits within the transport limit.
    pub fn format_at(&self, items: &[ScoredItem], timestamp: NaiveDateTime) -> Vec<String> {
        let now = timestamp.format("%d/%m/%Y %H:%M").to_string();
        let footer = format!("📣 Channel: {}", self.config.channel_label);

        if items.is_empty() {
            return vec![format!("{}\n🗓 {}\n\n{}\n\n{}", TITLE, now, NOTHING_NEW, footer)];
        }

        let mut lines = vec![TITLE.to_string(), format!("🗓 {}", now), String::new()];

        for category in Category::DISPLAY_ORDER {
            let section: Vec<&ScoredItem> = items
                .iter()
                .filter(|item| self.categorize(item) == category)
                .collect();
            if section.is_empty() {
                continue;
            }
            debug!("Section {:?}: {} items", category, section.len());
            render_section(category, &section, &mut lines);
        }

        lines.push(footer);

        let parts = split_lines(&lines, self.config.transport_limit, self.config.reserved_margin);
        if parts.len() > 1 {
            info!("Digest split into {} messages due to length", parts.len());
        }
        parts
    }
}

fn render_section(category: Category, section: &[&ScoredItem], lines: &mut Vec<String>) {
    match category {
        Category::BigRelease => {
            lines.push("🚀 <b>Big Releases</b>".to_string());
            lines.push(String::new());
            for scored in section {
                let item = &scored.item;
                lines.push(format!(
                    "{} <b>{}</b>",
                    source_emoji(&item.source_name),
                    encode_text(&item.title)
                ));
                lines.push(read_more(&item.link));
                lines.push(String::new());
            }
        }
        Category::TrendingRepo => {
            lines.push("🔥 <b>Hot on GitHub</b>".to_string());
            lines.push(String::new());
            for scored in section {
                let item = &scored.item;
                let repo = item
                    .title
                    .split_once(": ")
                    .map(|(_, repo)| repo)
                    .unwrap_or(&item.title);
                let emoji = source_emoji(&item.source_name);

                if item.summary.is_empty() || item.summary == NO_DESCRIPTION {
                    lines.push(format!("{} <b>{}</b>", emoji, encode_text(repo)));
                } else {
                    lines.push(format!(
                        "{} <b>{}</b> — {}",
                        emoji,
                        encode_text(repo),
                        encode_text(&item.summary)
                    ));
                }
                lines.push(read_more(&item.link));
                lines.push(String::new());
            }
        }
        Category::FlashNews => {
            lines.push("⚡ <b>Flash News</b>".to_string());
            lines.push(String::new());
            for scored in section {
                let item = &scored.item;
                lines.push(format!(
                    "{} <a href='{}'>{}</a>",
                    source_emoji(&item.source_name),
                    encode_single_quoted_attribute(&item.link),
                    encode_text(&item.title)
                ));
            }
            lines.push(String::new());
        }
    }
}

fn read_more(link: &str) -> String {
    format!("   🔗 <a href='{}'>Read More</a>", encode_single_quoted_attribute(link))
}

/// Join `lines` into messages of at most `limit` characters.
///
/// When the whole text fits it is returned as one part. Otherwise lines are
/// packed greedily: a new part, opened with a continuation header, starts
/// whenever the next line would push the current one past `limit - margin`.
/// Lines longer than a part can hold are hard-wrapped.
pub fn split_lines(lines: &[String], limit: usize, margin: usize) -> Vec<String> {
    let full = lines.join("\n");
    if char_len(&full) <= limit {
        return vec![full];
    }

    let budget = limit.saturating_sub(margin);
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    let mut has_content = false;
    let mut part_number = 1;

    for line in lines {
        let mut rest = line.as_str();
        loop {
            if has_content && current_len + char_len(rest) + 1 > budget {
                parts.push(current.trim().to_string());
                part_number += 1;
                current = continuation_header(part_number);
                current_len = char_len(&current);
                has_content = false;
            }

            // room left for text in this part, keeping one char for the newline
            let room = budget.saturating_sub(current_len + 1).max(1);
            let (piece, remainder) = match rest.char_indices().nth(room) {
                Some((split_at, _)) => rest.split_at(split_at),
                None => (rest, ""),
            };

            current.push_str(piece);
            current.push('\n');
            current_len += char_len(piece) + 1;
            has_content = true;

            if remainder.is_empty() {
                break;
            }
            rest = remainder;
        }
    }

    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    parts
}
