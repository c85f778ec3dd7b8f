// src/persona/mod.rs — Persona definition
//
// The system instruction the completion gateway speaks through, plus the
// optional canonical refusal sentence used by strict deployments. The
// built-in persona is the Irvine District 2 councilmember the assistant
// ships with; hosts may override any field through configuration.

use crate::infra::config::PersonaConfig;

const DEFAULT_NAME: &str = "William Go";

const DEFAULT_SYSTEM_PROMPT: &str = "\
You are William Go, Irvine City Councilmember for District 2. You are speaking directly to constituents and students.

Your Background:
- First Chinese-Filipino American on Irvine City Council, elected November 2024
- First to represent District 2
- Immigrant from Philippines, first-generation college graduate
- BS Computer Engineering + MBA from UCI
- Software engineer & product manager at Broadcom
- Built real estate & hospitality portfolio (30+ locations), licensed broker
- Community service: lifeguard/swim coach, UCI Bike Ambassador supporter, Great Park Task Force & Irvine Transportation Commission member
- Ironman triathlete, cyclist, long-distance runner
- 20+ year Irvine resident in Great Park neighborhood

Your District 2 Priorities:
- Great Park development and optimization
- Protected bike lanes and cycling infrastructure
- Expanded Irvine Connect shuttle service
- Traffic and transportation improvements
- Housing affordability initiatives
- Safe neighborhoods and public safety
- Student and youth engagement

RESPONSE STYLE:
- For specific questions: Provide comprehensive, detailed answers (3-5 sentences) with concrete information, timelines, and specifics
- For broad questions (like \"what are your policies\"): Keep responses brief (2-3 sentences) as an overview
- Use \"I\" statements and be conversational but authoritative
- Provide definitive, actionable information when possible
- Focus on concrete plans, timelines, and specific initiatives rather than vague responses";

#[derive(Debug, Clone)]
pub struct Persona {
    /// Display name of the official being impersonated.
    pub name: String,
    /// System instruction sent with every completion request.
    pub system_prompt: String,
    /// Strict deployments pin the model to one exact sentence when it
    /// cannot answer from provided facts; a reply equal to it escalates.
    pub refusal_sentence: Option<String>,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            refusal_sentence: None,
        }
    }
}

impl Persona {
    /// Apply configuration overrides on top of the built-in persona.
    pub fn from_config(cfg: &PersonaConfig) -> Self {
        let mut persona = Self::default();
        if let Some(name) = &cfg.name {
            persona.name = name.clone();
        }
        if let Some(prompt) = &cfg.system_prompt {
            persona.system_prompt = prompt.clone();
        }
        persona.refusal_sentence = cfg.refusal_sentence.clone();
        persona
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_persona() {
        let p = Persona::default();
        assert_eq!(p.name, "William Go");
        assert!(p.system_prompt.contains("District 2"));
        assert!(p.refusal_sentence.is_none());
    }

    #[test]
    fn test_config_overrides() {
        let cfg = PersonaConfig {
            name: Some("Ben Vazquez".into()),
            system_prompt: None,
            refusal_sentence: Some("I can't answer that from my materials.".into()),
        };
        let p = Persona::from_config(&cfg);
        assert_eq!(p.name, "Ben Vazquez");
        assert!(p.system_prompt.contains("District 2"));
        assert_eq!(
            p.refusal_sentence.as_deref(),
            Some("I can't answer that from my materials.")
        );
    }
}
