use once_cell::sync::Lazy;
use serde::Deserialize;

/// Tip table bundled at compile time. Topic order is the match order.
static TIPS: Lazy<TipTable> = Lazy::new(|| {
    let raw = include_str!("../../data/eco_tips.json");
    serde_json::from_str::<TipTable>(raw).expect("valid eco tips table")
});

#[derive(Debug, Clone, Deserialize)]
pub struct TipTable {
    pub topics: Vec<TopicTips>,
    pub generic: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicTips {
    pub topic: String,
    pub tips: Vec<String>,
}

impl TipTable {
    /// First topic where either side contains the other; declaration order
    /// breaks ties, so "solar water" resolves to solar, not water.
    pub fn find(&self, query: &str) -> Option<&TopicTips> {
        if query.trim().is_empty() {
            return None;
        }
        // surrounding whitespace takes part in the match
        let q = query.to_lowercase();
        self.topics
            .iter()
            .find(|t| q.contains(t.topic.as_str()) || t.topic.contains(q.as_str()))
    }

    pub fn tips_for(&self, query: &str) -> &[String] {
        self.find(query)
            .map(|t| t.tips.as_slice())
            .unwrap_or(self.generic.as_slice())
    }

    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|t| t.topic.as_str())
    }
}

pub fn tip_table() -> &'static TipTable {
    &TIPS
}

/// Tips for a free-text topic; falls back to the generic list.
pub fn eco_tips(topic: &str) -> Vec<String> {
    TIPS.tips_for(topic).to_vec()
}

/// Topic the lookup would resolve to, if any.
pub fn matched_topic(topic: &str) -> Option<&'static str> {
    TIPS.find(topic).map(|t| t.topic.as_str())
}
