//! Configuration Schemas
//!
//! JSON Schemas for site configuration, user settings, extension manifests
//! and code host connections, plus everything generated from them at build
//! time:
//!
//! - [`types`]: serde types compiled from all nine schemas
//! - [`stringdata`]: each schema's raw text as a constant
//! - [`validate()`] / [`parse`]: runtime validation against a schema
//!
//! ```no_run
//! use config_schemas::{parse, types::GitHubConnection, SchemaKind};
//!
//! let text = r#"{"url": "https://github.com", "token": "abc"}"#;
//! let conn: GitHubConnection = parse(SchemaKind::GitHub, text).unwrap();
//! assert_eq!(conn.token, "abc");
//! ```

use std::fmt;
use std::str::FromStr;

pub mod error;
pub mod validate;

pub use error::{Result, SchemaError, Violation};
pub use validate::{parse, validate};

/// Types generated from the configuration schemas
pub mod types {
    #![allow(clippy::upper_case_acronyms, clippy::large_enum_variant, clippy::enum_variant_names)]

    include!(concat!(env!("OUT_DIR"), "/schema.rs"));
}

/// Raw schema text, embedded for runtime validation
pub mod stringdata {
    include!(concat!(env!("OUT_DIR"), "/site_stringdata.rs"));
    include!(concat!(env!("OUT_DIR"), "/settings_stringdata.rs"));
    include!(concat!(env!("OUT_DIR"), "/extension_stringdata.rs"));
    include!(concat!(env!("OUT_DIR"), "/awscodecommit_stringdata.rs"));
    include!(concat!(env!("OUT_DIR"), "/bitbucketserver_stringdata.rs"));
    include!(concat!(env!("OUT_DIR"), "/github_stringdata.rs"));
    include!(concat!(env!("OUT_DIR"), "/gitlab_stringdata.rs"));
    include!(concat!(env!("OUT_DIR"), "/gitolite_stringdata.rs"));
    include!(concat!(env!("OUT_DIR"), "/phabricator_stringdata.rs"));
}

/// One of the nine configuration schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Site,
    Settings,
    Extension,
    AwsCodeCommit,
    BitbucketServer,
    GitHub,
    GitLab,
    Gitolite,
    Phabricator,
}

impl SchemaKind {
    const ALL: [SchemaKind; 9] = [
        SchemaKind::Site,
        SchemaKind::Settings,
        SchemaKind::Extension,
        SchemaKind::AwsCodeCommit,
        SchemaKind::BitbucketServer,
        SchemaKind::GitHub,
        SchemaKind::GitLab,
        SchemaKind::Gitolite,
        SchemaKind::Phabricator,
    ];

    /// Every schema, in manifest order
    pub fn all() -> &'static [SchemaKind] {
        &Self::ALL
    }

    /// File name without `.schema.json`
    pub fn stem(self) -> &'static str {
        match self {
            SchemaKind::Site => "site",
            SchemaKind::Settings => "settings",
            SchemaKind::Extension => "extension",
            SchemaKind::AwsCodeCommit => "awscodecommit",
            SchemaKind::BitbucketServer => "bitbucketserver",
            SchemaKind::GitHub => "github",
            SchemaKind::GitLab => "gitlab",
            SchemaKind::Gitolite => "gitolite",
            SchemaKind::Phabricator => "phabricator",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            SchemaKind::Site => "site.schema.json",
            SchemaKind::Settings => "settings.schema.json",
            SchemaKind::Extension => "extension.schema.json",
            SchemaKind::AwsCodeCommit => "awscodecommit.schema.json",
            SchemaKind::BitbucketServer => "bitbucketserver.schema.json",
            SchemaKind::GitHub => "github.schema.json",
            SchemaKind::GitLab => "gitlab.schema.json",
            SchemaKind::Gitolite => "gitolite.schema.json",
            SchemaKind::Phabricator => "phabricator.schema.json",
        }
    }

    /// The schema's raw JSON text
    pub fn schema_json(self) -> &'static str {
        match self {
            SchemaKind::Site => stringdata::SITE_SCHEMA_JSON,
            SchemaKind::Settings => stringdata::SETTINGS_SCHEMA_JSON,
            SchemaKind::Extension => stringdata::EXTENSION_SCHEMA_JSON,
            SchemaKind::AwsCodeCommit => stringdata::AWS_CODE_COMMIT_SCHEMA_JSON,
            SchemaKind::BitbucketServer => stringdata::BITBUCKET_SERVER_SCHEMA_JSON,
            SchemaKind::GitHub => stringdata::GITHUB_SCHEMA_JSON,
            SchemaKind::GitLab => stringdata::GITLAB_SCHEMA_JSON,
            SchemaKind::Gitolite => stringdata::GITOLITE_SCHEMA_JSON,
            SchemaKind::Phabricator => stringdata::PHABRICATOR_SCHEMA_JSON,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

impl FromStr for SchemaKind {
    type Err = SchemaError;

    /// Accepts a stem (`github`) or a file name (`github.schema.json`)
    fn from_str(s: &str) -> Result<Self> {
        let stem = s.strip_suffix(".schema.json").unwrap_or(s);
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.stem() == stem)
            .ok_or_else(|| SchemaError::UnknownSchema(s.to_string()))
    }
}
