use crate::types::{DigestError, Item, Result, ScoredItem};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Keyword to weight table used to score items. Keywords are matched as
/// lower-case substrings; each entry counts at most once per item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    entries: Vec<(String, u32)>,
}

impl KeywordTable {
    pub fn new<K: Into<String>>(pairs: impl IntoIterator<Item = (K, u32)>) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(keyword, weight)| (keyword.into().to_lowercase(), weight))
            .filter(|(keyword, _)| !keyword.is_empty())
            .collect();
        Self { entries }
    }

    /// Load a table from a JSON object of `"keyword": weight` pairs.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let map: BTreeMap<String, u32> = serde_json::from_str(&content)?;
        if map.is_empty() {
            return Err(DigestError::Config(format!(
                "Keyword file {} contains no keywords",
                path.display()
            )));
        }
        Ok(Self::new(map))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the weights of every keyword found in `title` or `summary`.
    pub fn score(&self, title: &str, summary: &str) -> u32 {
        let text = format!("{} {}", title, summary).to_lowercase();
        self.entries
            .iter()
            .filter(|(keyword, _)| text.contains(keyword.as_str()))
            .map(|(_, weight)| *weight)
            .sum()
    }

    pub fn score_item(&self, item: &Item) -> u32 {
        self.score(&item.title, &item.summary)
    }

    /// Score every item, keep those scoring at least `min_score`, order them
    /// by descending score (ties keep their input order) and cap the result at
    /// `max_items`.
    pub fn filter_and_rank(&self, items: Vec<Item>, min_score: u32, max_items: usize) -> Vec<ScoredItem> {
        let collected = items.len();

        let mut scored: Vec<ScoredItem> = items
            .into_iter()
            .filter_map(|item| {
                let score = self.score_item(&item);
                if score >= min_score {
                    Some(ScoredItem { item, score })
                } else {
                    debug!("FILTERED OUT (score={}): {}", score, item.title);
                    None
                }
            })
            .collect();
        let passed = scored.len();

        // sort_by is stable
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(max_items);

        info!(
            "Scoring complete: {} collected -> {} passed filter -> {} in digest",
            collected,
            passed,
            scored.len()
        );
        scored
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new([
            // model names and products
            ("gpt", 5),
            ("gpt-4", 5),
            ("gpt-5", 5),
            ("chatgpt", 5),
            ("claude", 5),
            ("gemini", 5),
            ("llama", 5),
            ("mistral", 5),
            ("sora", 5),
            ("veo", 5),
            ("deepseek", 5),
            ("phi", 4),
            ("qwen", 4),
            ("gemma", 4),
            ("stable diffusion", 5),
            ("midjourney", 5),
            ("whisper", 4),
            ("copilot", 4),
            ("dall-e", 5),
            ("flux", 4),
            ("ideogram", 4),
            // video and image generation
            ("video model", 5),
            ("text-to-video", 5),
            ("video generation", 5),
            ("text-to-image", 4),
            ("image generation", 4),
            ("image model", 4),
            // announcements and general concepts
            ("release", 4),
            ("released", 4),
            ("launch", 4),
            ("launches", 4),
            ("announce", 4),
            ("announcing", 4),
            ("introducing", 4),
            ("open-source", 4),
            ("open source", 4),
            ("breakthrough", 4),
            ("state-of-the-art", 4),
            ("sota", 4),
            ("new model", 5),
            ("benchmark", 3),
            ("multimodal", 4),
            ("agent", 3),
            ("agents", 3),
            ("reasoning", 3),
            ("fine-tune", 3),
            ("fine-tuning", 3),
            ("training", 3),
            ("transformer", 3),
            ("diffusion", 3),
            ("robotics", 3),
            ("self-driving", 3),
            ("autonomous", 3),
            // ecosystem and tools
            ("hugging face", 3),
            ("openai", 4),
            ("anthropic", 4),
            ("deepmind", 4),
            ("google ai", 3),
            ("meta ai", 3),
            ("microsoft ai", 3),
            ("nvidia", 3),
            ("trending", 2),
            ("framework", 2),
            ("library", 2),
            ("api", 2),
            ("sdk", 2),
            ("dataset", 2),
            ("tool", 2),
        ])
    }
}
