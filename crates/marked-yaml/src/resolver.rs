//! Implicit tag resolution.
//!
//! Untagged plain scalars are matched against an ordered list of patterns;
//! the first match decides the tag and anything else is a string.

use crate::node::{NodeKind, ScalarStyle};
use crate::schema::{self, Schema};
use once_cell::sync::Lazy;
use regex::Regex;

struct Rule {
    tag: &'static str,
    pattern: Regex,
}

fn rule(tag: &'static str, pattern: &str) -> Rule {
    Rule {
        tag,
        pattern: Regex::new(pattern).expect("resolver pattern is valid"),
    }
}

static YAML11_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(
            schema::BOOL,
            r"^(?:yes|Yes|YES|no|No|NO|true|True|TRUE|false|False|FALSE|on|On|ON|off|Off|OFF)$",
        ),
        rule(
            schema::FLOAT,
            r"(?x)^(?:
                [-+]?(?:[0-9][0-9_]*)\.[0-9_]*(?:[eE][-+][0-9]+)?
                |\.[0-9][0-9_]*(?:[eE][-+][0-9]+)?
                |[-+]?[0-9][0-9_]*(?::[0-5]?[0-9])+\.[0-9_]*
                |[-+]?\.(?:inf|Inf|INF)
                |\.(?:nan|NaN|NAN)
            )$",
        ),
        rule(
            schema::INT,
            r"(?x)^(?:
                [-+]?0b[0-1_]+
                |[-+]?0o[0-7_]+
                |[-+]?0[0-7_]+
                |[-+]?(?:0|[1-9][0-9_]*)
                |[-+]?0x[0-9a-fA-F_]+
                |[-+]?[1-9][0-9_]*(?::[0-5]?[0-9])+
            )$",
        ),
        rule(schema::MERGE, r"^(?:<<)$"),
        rule(schema::NULL, r"^(?:~|null|Null|NULL|)$"),
        rule(
            schema::TIMESTAMP,
            r"(?x)^(?:
                [0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]
                |[0-9][0-9][0-9][0-9]-[0-9][0-9]?-[0-9][0-9]?
                 (?:[Tt]|[\ \t]+)[0-9][0-9]?:[0-9][0-9]:[0-9][0-9](?:\.[0-9]*)?
                 (?:[\ \t]*(?:[Zz]|[-+][0-9][0-9]?(?::[0-9][0-9])?))?
            )$",
        ),
        rule(schema::VALUE, r"^(?:=)$"),
    ]
});

static CORE_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(schema::NULL, r"^(?:~|null|Null|NULL|)$"),
        rule(schema::BOOL, r"^(?:true|True|TRUE|false|False|FALSE)$"),
        rule(
            schema::INT,
            r"^(?:[-+]?[0-9]+|0o[0-7]+|0x[0-9a-fA-F]+)$",
        ),
        rule(
            schema::FLOAT,
            r"(?x)^(?:
                [-+]?(?:\.[0-9]+|[0-9]+(?:\.[0-9]*)?)(?:[eE][-+]?[0-9]+)?
                |[-+]?\.(?:inf|Inf|INF)
                |\.(?:nan|NaN|NAN)
            )$",
        ),
    ]
});

fn rules(schema: Schema) -> &'static [Rule] {
    match schema {
        Schema::Yaml11 => &YAML11_RULES,
        Schema::Core => &CORE_RULES,
    }
}

/// Tag of an untagged scalar.
pub fn resolve_scalar(schema: Schema, value: &str, style: ScalarStyle) -> &'static str {
    if style != ScalarStyle::Plain {
        return schema::STR;
    }
    rules(schema)
        .iter()
        .find(|rule| rule.pattern.is_match(value))
        .map_or(schema::STR, |rule| rule.tag)
}

/// Default tag for a node that carries no tag or the non-specific `!`.
pub fn resolve(schema: Schema, kind: NodeKind, value: &str, style: ScalarStyle) -> &'static str {
    match kind {
        NodeKind::Scalar => resolve_scalar(schema, value, style),
        NodeKind::Sequence => schema::SEQ,
        NodeKind::Mapping => schema::MAP,
    }
}
