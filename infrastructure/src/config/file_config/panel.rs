//! Panel roster configuration from TOML (`[panel]` section)

use panel_domain::{
    ConfigIssue, ConfigIssueCode, DomainError, KeywordTables, Persona, PersonaId,
    PersonaRegistry, PersonalityTraits,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Raw persona definition (`[[panel.personas]]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePersonaConfig {
    pub id: String,
    /// Display name; defaults to the id
    pub name: Option<String>,
    pub role: String,
    /// Domain tags in priority order, first is primary
    pub domain_tags: Vec<String>,
    pub assertiveness: f64,
    pub contrarianism: f64,
    pub creativity: f64,
    pub patience: f64,
}

impl Default for FilePersonaConfig {
    fn default() -> Self {
        let traits = PersonalityTraits::default();
        Self {
            id: String::new(),
            name: None,
            role: String::new(),
            domain_tags: Vec::new(),
            assertiveness: traits.assertiveness,
            contrarianism: traits.contrarianism,
            creativity: traits.creativity,
            patience: traits.patience,
        }
    }
}

impl FilePersonaConfig {
    pub fn to_persona(&self) -> Persona {
        let id = self.id.trim();
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(id);
        Persona::new(
            id,
            name,
            PersonalityTraits::new(
                self.assertiveness,
                self.contrarianism,
                self.creativity,
                self.patience,
            ),
        )
        .with_role(self.role.trim())
        .with_domain_tags(self.domain_tags.iter().cloned())
    }
}

/// Raw panel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePanelConfig {
    /// Start from the built-in six-person marketing team
    pub builtin: bool,
    /// Added personas; an id matching a built-in persona replaces it
    pub personas: Vec<FilePersonaConfig>,
    /// Persona ids seated when no filter is given on the command line
    pub members: Vec<String>,
}

impl Default for FilePanelConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            personas: Vec::new(),
            members: Vec::new(),
        }
    }
}

impl FilePanelConfig {
    /// Built-in roster (if enabled) merged with the configured personas
    pub fn roster(&self) -> Vec<Persona> {
        let mut roster: Vec<Persona> = if self.builtin {
            PersonaRegistry::builtin().iter().cloned().collect()
        } else {
            Vec::new()
        };
        for entry in self.personas.iter().filter(|p| !p.id.trim().is_empty()) {
            let persona = entry.to_persona();
            match roster.iter_mut().find(|p| p.id == persona.id) {
                Some(existing) => *existing = persona,
                None => roster.push(persona),
            }
        }
        roster
    }

    pub fn member_ids(&self) -> Vec<PersonaId> {
        self.members
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(PersonaId::new)
            .collect()
    }

    /// Validated registry, restricted to `members` when set
    pub fn to_registry(&self) -> Result<PersonaRegistry, DomainError> {
        let registry = PersonaRegistry::new(self.roster())?;
        let members = self.member_ids();
        if members.is_empty() {
            Ok(registry)
        } else {
            registry.subset(&members)
        }
    }

    pub fn validate(&self, keywords: &KeywordTables) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let mut seen = BTreeSet::new();
        for entry in &self.personas {
            let id = entry.id.trim();
            if id.is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::UnknownPersona,
                    "panel.personas: every persona needs a non-empty id",
                ));
                continue;
            }
            if !seen.insert(id.to_string()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicatePersona,
                    format!("panel.personas: persona '{}' is defined twice", id),
                ));
            }
            if let Err(e) = entry.to_persona().validate() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::TraitOutOfRange,
                    format!("panel.personas: {}", e),
                ));
            }
        }

        let roster = self.roster();
        if roster.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyPanel,
                "panel: built-in roster disabled and no personas configured",
            ));
        }

        for member in self.member_ids() {
            if !roster.iter().any(|p| p.id == member) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::UnknownPersona,
                    format!("panel.members: unknown persona '{}'", member),
                ));
            }
        }

        for persona in &roster {
            for tag in persona.domain_tags() {
                if !keywords.domain_routing.contains_key(tag) {
                    issues.push(ConfigIssue::warning(
                        ConfigIssueCode::UnroutedDomainTag,
                        format!(
                            "persona '{}': domain tag '{}' has no routing keywords",
                            persona.id, tag
                        ),
                    ));
                }
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> FilePanelConfig {
        #[derive(Deserialize)]
        struct Wrapper {
            panel: FilePanelConfig,
        }
        toml::from_str::<Wrapper>(toml_str).unwrap().panel
    }

    #[test]
    fn test_default_is_builtin_roster() {
        let registry = FilePanelConfig::default().to_registry().unwrap();
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn test_custom_persona_overrides_and_appends() {
        let panel = parse(
            r#"
[panel]
[[panel.personas]]
id = "marcus"
name = "Marcus V2"
assertiveness = 0.1
domain_tags = ["Campaigns"]

[[panel.personas]]
id = "nina"
role = "Finance Partner"
domain_tags = ["budget"]
"#,
        );
        let registry = panel.to_registry().unwrap();
        assert_eq!(registry.len(), 7);

        let marcus = registry.get(&PersonaId::new("marcus")).unwrap();
        assert_eq!(marcus.display_name, "Marcus V2");
        assert_eq!(marcus.traits.assertiveness, 0.1);
        assert_eq!(marcus.domain_tags(), ["campaigns".to_string()]);

        let nina = registry.get(&PersonaId::new("nina")).unwrap();
        assert_eq!(nina.display_name, "nina");
        assert_eq!(nina.traits, PersonalityTraits::default());
    }

    #[test]
    fn test_members_restrict_panel() {
        let panel = parse(
            r#"
[panel]
members = ["priya", "sarah"]
"#,
        );
        let registry = panel.to_registry().unwrap();
        assert_eq!(
            registry.ids(),
            vec![PersonaId::new("sarah"), PersonaId::new("priya")]
        );
    }

    #[test]
    fn test_validate_reports_problems() {
        let panel = parse(
            r#"
[panel]
builtin = false
members = ["ghost"]

[[panel.personas]]
id = "a"
patience = 1.5

[[panel.personas]]
id = "a"
domain_tags = ["astrology"]
"#,
        );
        let issues = panel.validate(&KeywordTables::default());
        let codes: Vec<ConfigIssueCode> = issues.iter().map(|i| i.code).collect();
        assert!(codes.contains(&ConfigIssueCode::TraitOutOfRange));
        assert!(codes.contains(&ConfigIssueCode::DuplicatePersona));
        assert!(codes.contains(&ConfigIssueCode::UnknownPersona));
        assert!(codes.contains(&ConfigIssueCode::UnroutedDomainTag));
        assert!(
            issues
                .iter()
                .any(|i| i.code == ConfigIssueCode::UnroutedDomainTag && !i.is_error())
        );
    }

    #[test]
    fn test_empty_roster_is_error() {
        let panel = FilePanelConfig {
            builtin: false,
            ..Default::default()
        };
        let issues = panel.validate(&KeywordTables::default());
        assert!(
            issues
                .iter()
                .any(|i| i.code == ConfigIssueCode::EmptyPanel && i.is_error())
        );
        assert!(panel.to_registry().is_err());
    }
}
