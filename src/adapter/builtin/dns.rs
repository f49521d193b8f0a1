//! `dns.domain` events

use crate::events::EventModel;
use serde::Serialize;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DnsKind {
    Apex,
    Subdomain,
    Wildcard,
}

/// A domain name with its registrable root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsDomain {
    pub name: String,
    pub root: String,
    pub kind: DnsKind,
    pub parent: Option<String>,
}

impl DnsDomain {
    /// Infer root, kind and parent from a bare name
    ///
    /// The root is the last two labels. `*.x.y` is a wildcard, a name of two
    /// labels or fewer is an apex, anything longer is a subdomain.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim().trim_start_matches('.').to_lowercase();

        if let Some(host) = name.strip_prefix("*.") {
            let root = last_two_labels(host);
            return Self {
                parent: Some(root.clone()),
                root,
                kind: DnsKind::Wildcard,
                name,
            };
        }

        if name.split('.').count() <= 2 {
            return Self {
                root: name.clone(),
                name,
                kind: DnsKind::Apex,
                parent: None,
            };
        }

        let root = last_two_labels(&name);
        Self {
            parent: Some(root.clone()),
            root,
            kind: DnsKind::Subdomain,
            name,
        }
    }

    /// `<prefix>.<root>` as a subdomain of `root`
    pub fn subdomain(prefix: &str, root: &str) -> Self {
        let root = root.trim().to_lowercase();
        Self {
            name: format!("{}.{}", prefix.to_lowercase(), root),
            parent: Some(root.clone()),
            root,
            kind: DnsKind::Subdomain,
        }
    }
}

impl EventModel for DnsDomain {
    fn event_type(&self) -> &'static str {
        "dns.domain"
    }
}

fn last_two_labels(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() >= 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        host.to_string()
    }
}
