//! Tags and schemas.

use crate::value::ValueKind;
use serde::{Deserialize, Serialize};

/// Prefix shared by every tag of the YAML type repository.
pub const PREFIX: &str = "tag:yaml.org,2002:";

pub const NULL: &str = "tag:yaml.org,2002:null";
pub const BOOL: &str = "tag:yaml.org,2002:bool";
pub const INT: &str = "tag:yaml.org,2002:int";
pub const FLOAT: &str = "tag:yaml.org,2002:float";
pub const BINARY: &str = "tag:yaml.org,2002:binary";
pub const TIMESTAMP: &str = "tag:yaml.org,2002:timestamp";
pub const STR: &str = "tag:yaml.org,2002:str";
pub const SEQ: &str = "tag:yaml.org,2002:seq";
pub const MAP: &str = "tag:yaml.org,2002:map";
pub const SET: &str = "tag:yaml.org,2002:set";
pub const OMAP: &str = "tag:yaml.org,2002:omap";
pub const PAIRS: &str = "tag:yaml.org,2002:pairs";
pub const MERGE: &str = "tag:yaml.org,2002:merge";
pub const VALUE: &str = "tag:yaml.org,2002:value";

/// The non-specific tag `!`, resolved from the node kind alone.
pub const NON_SPECIFIC: &str = "!";

/// Which set of implicit types and tags a constructor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Schema {
    /// YAML 1.1 types: every kind, including binary, timestamps, sets,
    /// ordered maps and pairs.
    #[default]
    Yaml11,
    /// YAML 1.2 Core: null, bool, int, float, str, seq and map.
    Core,
}

impl Schema {
    /// Whether values of `kind` can be represented under this schema.
    pub fn supports(self, kind: ValueKind) -> bool {
        match self {
            Schema::Yaml11 => true,
            Schema::Core => !matches!(
                kind,
                ValueKind::Bytes
                    | ValueKind::Date
                    | ValueKind::DateTime
                    | ValueKind::Set
                    | ValueKind::Pairs
            ),
        }
    }

    /// Tags with a built-in constructor under this schema.
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            Schema::Yaml11 => &[
                NULL, BOOL, INT, FLOAT, BINARY, TIMESTAMP, STR, SEQ, MAP, SET, OMAP, PAIRS,
            ],
            Schema::Core => &[NULL, BOOL, INT, FLOAT, STR, SEQ, MAP],
        }
    }
}

/// Expand a tag as written in the source into its full form.
///
/// `!!x` becomes `tag:yaml.org,2002:x`; local (`!x`) and verbatim tags are
/// returned as written.
pub fn expand_tag(handle: &str, suffix: &str) -> String {
    if handle == "!!" {
        format!("{PREFIX}{suffix}")
    } else {
        format!("{handle}{suffix}")
    }
}
