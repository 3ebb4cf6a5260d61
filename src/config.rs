//! Configuration document
//!
//! The YAML document is looked up in the provided path, `.snowplow.yaml` and
//! `~/.snowplow.yaml`. When it has no default address, the `## Snow Plow`
//! section of a workspace `TOOLS.md` is used.

use std::fs;
use std::path::PathBuf;

use log::debug;
use serde::Deserialize;

use crate::sources::{HISTORY_URL, NOMINATIM_URL, VEHICLES_URL};

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Configs {
    #[serde(default)]
    pub default_address: Option<String>,
    #[serde(default)]
    pub endpoints: Endpoints,
    /// Feature service timeout, in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Configs {
    fn default() -> Self {
        Self {
            default_address: None,
            endpoints: Endpoints::default(),
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// Remote services urls
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub vehicles: String,
    pub history: String,
    pub geocoder: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            vehicles: VEHICLES_URL.to_string(),
            history: HISTORY_URL.to_string(),
            geocoder: NOMINATIM_URL.to_string(),
        }
    }
}

impl Configs {
    /// Parse a YAML document. An empty document is the default config
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(yaml).map_err(|e| format!("Invalid config: {}", e))
    }

    /// Load the first readable document of `paths`
    pub fn load(paths: &[PathBuf]) -> Result<Self, String> {
        for path in paths {
            if let Ok(s) = fs::read_to_string(path) {
                debug!("config loaded from {}", path.display());
                return Self::from_yaml(&s);
            }
        }

        Ok(Self::default())
    }

    /// Fill the default address from the first `TOOLS.md` having one
    pub fn with_tools_fallback(mut self, tools: &[PathBuf]) -> Self {
        if self.default_address.is_none() {
            self.default_address = tools
                .iter()
                .filter_map(|p| fs::read_to_string(p).ok())
                .find_map(|s| tools_default_address(&s));
        }

        self
    }
}

/// `Default address: ...` line below a `## Snow Plow` heading
pub fn tools_default_address(markdown: &str) -> Option<String> {
    let mut lines = markdown.lines();

    lines.find(|l| {
        let l = l.trim_start();
        let title: String = l
            .trim_start_matches('#')
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        l.starts_with("##") && title.to_lowercase().starts_with("snowplow")
    })?;

    lines.find_map(|l| {
        let lower = l.to_ascii_lowercase();
        let at = lower.find("default address:")?;
        let address = l[at + "default address:".len()..].trim();

        (!address.is_empty()).then(|| address.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::{tools_default_address, Configs, Endpoints};

    #[test]
    fn parse_configs() -> Result<(), String> {
        assert_eq!(Configs::default(), Configs::from_yaml("")?);

        let yaml = "\ndefault_address: 5000 Forbes Ave\nendpoints:\n  geocoder: http://localhost:8080/search\n";
        let conf = Configs::from_yaml(yaml)?;

        assert_eq!(
            Configs {
                default_address: Some("5000 Forbes Ave".to_string()),
                endpoints: Endpoints {
                    geocoder: "http://localhost:8080/search".to_string(),
                    ..Endpoints::default()
                },
                timeout: 30,
            },
            conf
        );

        assert!(Configs::from_yaml("timeout: soon").is_err());

        Ok(())
    }

    #[test]
    fn tools_markdown() {
        let md = "# Tools\n\n## Weather\nDefault address: nope\n\n## Snow Plow\n\n- Default address: 123 Main St, Pittsburgh, PA 15213\n";
        assert_eq!(
            Some("123 Main St, Pittsburgh, PA 15213".to_string()),
            tools_default_address(md)
        );

        let md = "## snow plow tracker\ndefault ADDRESS:   5000 Forbes Ave  \n";
        assert_eq!(Some("5000 Forbes Ave".to_string()), tools_default_address(md));

        assert_eq!(
            Some("Penn Ave".to_string()),
            tools_default_address("## SnowPlow\nDefault address: Penn Ave\n")
        );
        assert_eq!(
            Some("Penn Ave".to_string()),
            tools_default_address("##Snow  Plow\nDefault address: Penn Ave\n")
        );

        assert_eq!(None, tools_default_address("## Weather\nDefault address: x\n"));
        assert_eq!(None, tools_default_address("# Snow Plow\nDefault address: x\n"));
        assert_eq!(None, tools_default_address("## Snow Plow\nDefault address:\n"));
    }
}
