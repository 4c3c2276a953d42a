//! Read-only walk over a rule configuration.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use lintbridge_config::RuleConfig;
use serde::Serialize;

const TOKENS_ATTRIBUTE: &str = "tokens";

macro_rules! known_tokens {
    ($($name:ident),+ $(,)?) => {
        /// Token types a module's `tokens` attribute may name.
        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub enum KnownToken {
            $($name,)+
        }

        impl KnownToken {
            /// Every known token, in declaration order.
            pub const ALL: &'static [KnownToken] = &[$(KnownToken::$name,)+];

            /// Name as written in rule files.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(KnownToken::$name => stringify!($name),)+
                }
            }
        }

        impl FromStr for KnownToken {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($name) => Ok(KnownToken::$name),)+
                    other => Err(format!("Unknown token type: {}", other)),
                }
            }
        }
    };
}

known_tokens! {
    ABSTRACT, ANNOTATION, ANNOTATION_DEF, ANNOTATION_FIELD_DEF, ARRAY_INIT,
    ASSIGN, BAND, BAND_ASSIGN, BNOT, BOR, BOR_ASSIGN, BSR, BSR_ASSIGN, BXOR,
    BXOR_ASSIGN, CASE_GROUP, CLASS_DEF, COLON, COMMA, COMPACT_CTOR_DEF,
    CTOR_CALL, CTOR_DEF, DEC, DIV, DIV_ASSIGN, DO_WHILE, ENUM_CONSTANT_DEF,
    ENUM_DEF, EQUAL, GE, GENERIC_END, GENERIC_START, GT, IMPORT, INC,
    INSTANCE_INIT, INTERFACE_DEF, LAMBDA, LAND, LCURLY, LE, LITERAL_ASSERT,
    LITERAL_CASE, LITERAL_CATCH, LITERAL_DEFAULT, LITERAL_DO, LITERAL_ELSE,
    LITERAL_FINALLY, LITERAL_FOR, LITERAL_IF, LITERAL_INSTANCEOF,
    LITERAL_RETURN, LITERAL_SWITCH, LITERAL_SYNCHRONIZED, LITERAL_THIS,
    LITERAL_THROW, LITERAL_TRY, LITERAL_WHILE, LNOT, LOR, LT, METHOD_CALL,
    METHOD_DEF, METHOD_REF, MINUS, MINUS_ASSIGN, MOD, MOD_ASSIGN, NOT_EQUAL,
    PACKAGE_DEF, PARAMETER_DEF, PLUS, PLUS_ASSIGN, QUESTION, RCURLY,
    RECORD_DEF, SEMI, SL, SL_ASSIGN, SLIST, SR, SR_ASSIGN, STAR, STAR_ASSIGN,
    STATIC_IMPORT, STATIC_INIT, SUPER_CTOR_CALL, TYPECAST, VARIABLE_DEF,
}

impl fmt::Display for KnownToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One module of a configuration as seen by [`peruse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationModule {
    pub name: String,
    /// Every attribute except `tokens`.
    pub properties: BTreeMap<String, String>,
    pub tokens: BTreeSet<KnownToken>,
    pub messages: BTreeMap<String, String>,
}

impl ConfigurationModule {
    fn from_config(config: &RuleConfig) -> Self {
        let mut properties = BTreeMap::new();
        let mut tokens = BTreeSet::new();
        for (key, value) in config.attributes() {
            if key == TOKENS_ATTRIBUTE {
                tokens = parse_tokens(value);
            } else {
                properties.insert(key.clone(), value.clone());
            }
        }
        Self {
            name: config.name().to_string(),
            properties,
            tokens,
            messages: config.messages().clone(),
        }
    }
}

/// Unknown names are dropped.
fn parse_tokens(value: &str) -> BTreeSet<KnownToken> {
    value
        .split(',')
        .filter_map(|token| token.trim().parse().ok())
        .collect()
}

/// Calls `visitor` for every module in pre-order.
pub fn peruse(config: &RuleConfig, visitor: &mut dyn FnMut(&ConfigurationModule)) {
    visitor(&ConfigurationModule::from_config(config));
    for child in config.children() {
        peruse(child, visitor);
    }
}
