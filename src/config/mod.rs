pub mod ai;
pub mod assistant;

pub use ai::AiConfig;
pub use assistant::AssistantConfig;
