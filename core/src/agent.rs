//! Agents: the people, organizations and software behind an annotation.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use wadm_registry::Config;

use crate::config;
use crate::error::{Result, ValidationError};
use crate::field::Field;
use crate::iri::Iri;
use crate::node::{Entry, Node, render_node, slot_enum};
use crate::traits::{Identified, Identity};

/// The class of an [`Agent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Person,
    Organization,
    Software,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Person => "Person",
            AgentKind::Organization => "Organization",
            AgentKind::Software => "Software",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Person" => Ok(AgentKind::Person),
            "Organization" => Ok(AgentKind::Organization),
            "Software" => Ok(AgentKind::Software),
            _ => Err(ValidationError::DisallowedValue {
                field: "type",
                value: s.to_string(),
                allowed: "Person, Organization, Software",
            }),
        }
    }
}

/// A creator, generator or rendering agent.
///
/// # Examples
///
/// ```
/// use wadm_core::{Agent, AgentKind, Identified};
///
/// let mut agent = Agent::new();
/// agent.set_id("http://example.org/user1").unwrap();
/// agent.set_type("Person").unwrap();
/// agent.set_name("My Pseudonym");
/// assert_eq!(agent.agent_kind(), Some(AgentKind::Person));
/// assert!(agent.set_type("Robot").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Agent {
    pub(crate) identity: Identity,
    pub(crate) kind: Option<AgentKind>,
    pub(crate) name: Field<String>,
    pub(crate) nickname: Field<String>,
    pub(crate) email: Field<String>,
    pub(crate) email_sha1: Field<String>,
    pub(crate) homepage: Field<Iri>,
    pub(crate) software_version: Field<String>,
}

impl Default for Agent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent {
    /// An agent of unspecified class.
    pub fn new() -> Self {
        Self::with_config(config::shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            identity: Identity::required(config, "Agent"),
            kind: None,
            name: Field::new(),
            nickname: Field::new(),
            email: Field::new(),
            email_sha1: Field::new(),
            homepage: Field::new(),
            software_version: Field::new(),
        }
    }

    pub fn person() -> Self {
        Self::of_kind(AgentKind::Person)
    }

    pub fn organization() -> Self {
        Self::of_kind(AgentKind::Organization)
    }

    pub fn software() -> Self {
        Self::of_kind(AgentKind::Software)
    }

    fn of_kind(kind: AgentKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::new()
        }
    }

    pub fn agent_kind(&self) -> Option<AgentKind> {
        self.kind
    }

    /// Sets the class; only `Person`, `Organization` and `Software` are
    /// accepted.
    pub fn set_type(&mut self, kind: &str) -> Result<()> {
        self.kind = Some(kind.parse()?);
        Ok(())
    }

    pub fn set_name(&mut self, name: &str) {
        self.name.set(name.to_string());
    }

    pub fn add_name(&mut self, name: &str) {
        self.name.push(name.to_string());
    }

    pub fn set_nickname(&mut self, nickname: &str) {
        self.nickname.set(nickname.to_string());
    }

    pub fn set_email(&mut self, email: &str) {
        self.email.set(email.to_string());
    }

    /// Sets the SHA-1 of the `mailto:` IRI, for identifying the agent
    /// without publishing the address.
    pub fn set_email_sha1(&mut self, digest: &str) {
        self.email_sha1.set(digest.to_string());
    }

    pub fn set_homepage(&mut self, homepage: &str) -> Result<()> {
        self.homepage.set(Iri::parse(homepage)?);
        Ok(())
    }

    /// Sets `schema:softwareVersion`.
    pub fn set_software_version(&mut self, version: &str) {
        self.software_version.set(version.to_string());
    }
}

impl Node for Agent {
    fn kind(&self) -> &'static str {
        self.kind.map_or("Agent", |kind| kind.as_str())
    }

    fn entries(&self) -> Vec<(&str, Entry<'_>)> {
        let mut out = Vec::with_capacity(8);
        self.identity.extend(&mut out);
        out.push((
            "type",
            self.kind.map_or(Entry::Absent, |kind| Entry::Text(kind.as_str())),
        ));
        out.push(("name", self.name.entry()));
        out.push(("nickname", self.nickname.entry()));
        out.push(("email", self.email.entry()));
        out.push(("email_sha1", self.email_sha1.entry()));
        out.push(("homepage", self.homepage.entry()));
        out.push(("schema:softwareVersion", self.software_version.entry()));
        out
    }

    fn config(&self) -> Option<&Arc<Config>> {
        Some(&self.identity.config)
    }

    fn rebind(&mut self, config: &Arc<Config>) {
        self.identity.rebind(config);
    }
}

impl Identified for Agent {
    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }
}

render_node!(Agent);

slot_enum! {
    /// A `creator`, `generator` or `renderedVia` value.
    AgentRef { Agent(Agent) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_kind_parse() {
        assert_eq!("Software".parse::<AgentKind>(), Ok(AgentKind::Software));
        assert!(matches!(
            "Robot".parse::<AgentKind>(),
            Err(ValidationError::DisallowedValue { field: "type", .. })
        ));
    }

    #[test]
    fn test_kind_names_class() {
        assert_eq!(Agent::new().kind(), "Agent");
        assert_eq!(Agent::software().kind(), "Software");
    }

    #[test]
    fn test_homepage_must_be_clean_uri() {
        let mut agent = Agent::person();
        assert!(agent.set_homepage("http://example.org/home page").is_err());
        assert!(agent.homepage.is_unset());
        agent.set_homepage("http://example.org/homepage1").unwrap();
        assert_eq!(agent.homepage.values()[0], "http://example.org/homepage1");
    }
}
