//! Rule-based chat responder.
//!
//! Three tiers, first hit wins:
//! 1. topic keys matched as substrings, in table order
//! 2. pattern rules (`all_of` every phrase, `any_of` at least one)
//! 3. a generic capability overview
//!
//! Matching is case-insensitive on the whole message.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatTopic {
    CarbonFootprint,
    SmartCity,
    RenewableEnergy,
    AirQuality,
    UrbanPlanning,
}

impl ChatTopic {
    pub fn key(self) -> &'static str {
        match self {
            ChatTopic::CarbonFootprint => "carbon footprint",
            ChatTopic::SmartCity => "smart city",
            ChatTopic::RenewableEnergy => "renewable energy",
            ChatTopic::AirQuality => "air quality",
            ChatTopic::UrbanPlanning => "sustainable urban planning",
        }
    }

    pub fn response(self) -> &'static str {
        match self {
            ChatTopic::CarbonFootprint => CARBON_FOOTPRINT,
            ChatTopic::SmartCity => SMART_CITY,
            ChatTopic::RenewableEnergy => RENEWABLE_ENERGY,
            ChatTopic::AirQuality => AIR_QUALITY,
            ChatTopic::UrbanPlanning => URBAN_PLANNING,
        }
    }
}

/// Tier 1 table. Order matters.
pub const TOPIC_ORDER: [ChatTopic; 5] = [
    ChatTopic::CarbonFootprint,
    ChatTopic::SmartCity,
    ChatTopic::RenewableEnergy,
    ChatTopic::AirQuality,
    ChatTopic::UrbanPlanning,
];

#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    pub all_of: &'static [&'static str],
    pub any_of: &'static [&'static str],
    pub topic: ChatTopic,
}

impl PatternRule {
    fn matches(&self, lower: &str) -> bool {
        self.all_of.iter().all(|p| lower.contains(p))
            && (self.any_of.is_empty() || self.any_of.iter().any(|p| lower.contains(p)))
    }
}

/// Tier 2 rules, evaluated in order.
pub const PATTERN_RULES: &[PatternRule] = &[
    PatternRule {
        all_of: &["how", "reduce"],
        any_of: &[],
        topic: ChatTopic::CarbonFootprint,
    },
    PatternRule {
        all_of: &["what"],
        any_of: &["smart", "technology"],
        topic: ChatTopic::SmartCity,
    },
    PatternRule {
        all_of: &[],
        any_of: &["energy", "power"],
        topic: ChatTopic::RenewableEnergy,
    },
    PatternRule {
        all_of: &[],
        any_of: &["air", "pollution"],
        topic: ChatTopic::AirQuality,
    },
    PatternRule {
        all_of: &[],
        any_of: &["planning", "development"],
        topic: ChatTopic::UrbanPlanning,
    },
];

/// Which tier produced the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "tier", content = "topic", rename_all = "snake_case")]
pub enum ResponseMatch {
    Topic(ChatTopic),
    Pattern(ChatTopic),
    Generic,
}

impl ResponseMatch {
    pub fn topic(self) -> Option<ChatTopic> {
        match self {
            ResponseMatch::Topic(t) | ResponseMatch::Pattern(t) => Some(t),
            ResponseMatch::Generic => None,
        }
    }
}

pub fn classify_message(message: &str) -> ResponseMatch {
    let lower = message.to_lowercase();
    if lower.trim().is_empty() {
        return ResponseMatch::Generic;
    }
    if let Some(t) = TOPIC_ORDER.iter().find(|t| lower.contains(t.key())) {
        return ResponseMatch::Topic(*t);
    }
    if let Some(r) = PATTERN_RULES.iter().find(|r| r.matches(&lower)) {
        return ResponseMatch::Pattern(r.topic);
    }
    ResponseMatch::Generic
}

pub fn respond(message: &str) -> &'static str {
    classify_message(message)
        .topic()
        .map(ChatTopic::response)
        .unwrap_or(GENERIC_RESPONSE)
}

pub const CARBON_FOOTPRINT: &str = r#"Reducing your carbon footprint involves several key strategies:

🏠 **Home & Energy:**
• Switch to renewable energy sources like solar panels
• Use LED lighting and energy-efficient appliances
• Improve home insulation to reduce heating/cooling needs
• Unplug devices when not in use

🚗 **Transportation:**
• Use public transport, bike, or walk when possible
• Consider electric or hybrid vehicles
• Work from home to reduce commuting
• Combine errands into single trips

♻️ **Consumption:**
• Buy local and seasonal products
• Reduce meat consumption
• Choose products with minimal packaging
• Repair items instead of replacing them

🌱 **Daily Habits:**
• Compost organic waste
• Use reusable bags and water bottles
• Plant trees or support reforestation projects
• Choose sustainable brands and services"#;

pub const SMART_CITY: &str = r#"Smart city technologies transform urban living through:

📊 **Data & Analytics:**
• IoT sensors monitor air quality, traffic, and energy usage
• Real-time data helps optimize city services
• Predictive analytics prevent problems before they occur
• Citizen apps provide instant access to city information

🚦 **Infrastructure:**
• Smart traffic lights reduce congestion and emissions
• Intelligent street lighting saves energy and improves safety
• Smart grids optimize electricity distribution
• Connected public transport systems improve efficiency

🏢 **Services:**
• Digital government services reduce paperwork and wait times
• Smart waste management optimizes collection routes
• Emergency response systems use real-time data
• Public Wi-Fi and digital kiosks improve connectivity

🌍 **Sustainability:**
• Energy management systems reduce consumption
• Water monitoring prevents waste and detects leaks
• Environmental sensors track pollution levels
• Green building standards improve efficiency"#;

pub const RENEWABLE_ENERGY: &str = r#"Renewable energy options for cities and individuals:

☀️ **Solar Power:**
• Rooftop solar panels for homes and businesses
• Community solar gardens for shared benefits
• Solar water heating systems
• Portable solar chargers for devices

💨 **Wind Energy:**
• Urban wind turbines for small-scale generation
• Offshore wind farms for large-scale power
• Micro-wind systems for residential use
• Wind-solar hybrid systems

💧 **Hydroelectric:**
• Small-scale hydro for local communities
• Pumped storage for energy backup
• Run-of-river systems with minimal environmental impact
• Micro-hydro for remote areas

🌱 **Other Options:**
• Geothermal heating and cooling systems
• Biomass from organic waste
• Tidal and wave energy in coastal areas
• Battery storage systems for energy independence

💰 **Benefits:**
• Reduced electricity bills and energy independence
• Lower carbon emissions and environmental impact
• Job creation in green energy sectors
• Energy security and price stability"#;

pub const AIR_QUALITY: &str = r#"Cities can improve air quality through multiple approaches:

🚗 **Transportation:**
• Promote electric and hybrid vehicles
• Expand public transportation networks
• Create bike lanes and pedestrian zones
• Implement low-emission zones in city centers
• Encourage carpooling and ride-sharing

🏭 **Industrial Controls:**
• Enforce strict emission standards for factories
• Require pollution control equipment
• Monitor industrial emissions in real-time
• Incentivize clean production technologies

🌳 **Green Infrastructure:**
• Plant trees and create urban forests
• Develop green roofs and walls
• Establish parks and green corridors
• Use air-purifying plants in public spaces

📊 **Monitoring & Policy:**
• Install air quality monitoring networks
• Provide real-time air quality data to citizens
• Implement emergency protocols during high pollution
• Set and enforce air quality standards

🏠 **Individual Actions:**
• Use public transport or electric vehicles
• Support clean energy initiatives
• Plant trees and maintain gardens
• Avoid burning waste or using polluting equipment"#;

pub const URBAN_PLANNING: &str = r#"Sustainable urban planning creates livable, resilient cities:

🏘️ **Mixed-Use Development:**
• Combine residential, commercial, and office spaces
• Reduce travel distances and car dependency
• Create vibrant, walkable neighborhoods
• Support local businesses and community interaction

🚶 **Transit-Oriented Design:**
• Build dense development around public transport
• Create pedestrian and bicycle-friendly infrastructure
• Reduce parking requirements in transit areas
• Connect neighborhoods with efficient transport

🌿 **Green Infrastructure:**
• Integrate parks and green spaces throughout the city
• Use green roofs and walls for insulation and air quality
• Create urban forests and tree-lined streets
• Implement sustainable stormwater management

♻️ **Resource Efficiency:**
• Design for waste reduction and recycling
• Use renewable energy in all new developments
• Implement water conservation and reuse systems
• Choose sustainable building materials

🏢 **Smart Growth Principles:**
• Focus development in existing urban areas
• Preserve natural areas and farmland
• Create compact, connected communities
• Plan for climate change adaptation and resilience"#;

pub const GENERIC_RESPONSE: &str = r#"I'm your Smart City Assistant, here to help with sustainability and urban living questions!

I can provide detailed information about:

🌱 **Environmental Topics:**
• Carbon footprint reduction strategies
• Renewable energy options and benefits
• Air quality improvement methods
• Water conservation techniques

🏙️ **Smart City Technologies:**
• IoT sensors and data analytics
• Smart infrastructure and services
• Digital government solutions
• Connected transportation systems

🏗️ **Urban Planning:**
• Sustainable development practices
• Green infrastructure design
• Transit-oriented communities
• Climate resilience planning

Feel free to ask specific questions about any of these topics, and I'll provide detailed, actionable information to help you understand and implement sustainable practices in your community!"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_key_wins_over_pattern() {
        let m = classify_message("How can I reduce my carbon footprint?");
        assert_eq!(m, ResponseMatch::Topic(ChatTopic::CarbonFootprint));
        assert_eq!(respond("How can I reduce my carbon footprint?"), CARBON_FOOTPRINT);
    }

    #[test]
    fn table_order_breaks_ties() {
        // contains both "smart city" and "air quality"
        let m = classify_message("Does smart city tech help air quality?");
        assert_eq!(m, ResponseMatch::Topic(ChatTopic::SmartCity));
    }

    #[test]
    fn how_and_reduce_require_both_words() {
        assert_eq!(
            classify_message("How do I reduce my bills?"),
            ResponseMatch::Pattern(ChatTopic::CarbonFootprint)
        );
        assert_eq!(classify_message("Reduce it"), ResponseMatch::Generic);
    }

    #[test]
    fn pattern_tier_in_declared_order() {
        assert_eq!(
            classify_message("What technology do cities use?"),
            ResponseMatch::Pattern(ChatTopic::SmartCity)
        );
        assert_eq!(
            classify_message("Tell me about wind power"),
            ResponseMatch::Pattern(ChatTopic::RenewableEnergy)
        );
        assert_eq!(
            classify_message("Is pollution getting worse?"),
            ResponseMatch::Pattern(ChatTopic::AirQuality)
        );
        assert_eq!(
            classify_message("New development near the river"),
            ResponseMatch::Pattern(ChatTopic::UrbanPlanning)
        );
    }

    #[test]
    fn quick_questions_all_resolve_to_a_topic() {
        let expect = [
            ("How can I reduce my carbon footprint?", ChatTopic::CarbonFootprint),
            ("What are smart city technologies?", ChatTopic::SmartCity),
            ("Tell me about renewable energy options", ChatTopic::RenewableEnergy),
            ("How can cities improve air quality?", ChatTopic::AirQuality),
            ("What is sustainable urban planning?", ChatTopic::UrbanPlanning),
        ];
        for (q, t) in expect {
            assert_eq!(classify_message(q).topic(), Some(t), "{q}");
        }
    }

    #[test]
    fn unmatched_and_blank_get_generic() {
        assert_eq!(respond("xyz"), GENERIC_RESPONSE);
        assert_eq!(respond("   "), GENERIC_RESPONSE);
        assert!(!GENERIC_RESPONSE.is_empty());
    }
}
