//! Classification of engine faults into bridge errors.
//!
//! The engine wraps the real failure in its own exception type, sometimes
//! several times over. Classification first unwraps to the innermost engine
//! exception whose cause is foreign, then looks at that cause. A parser
//! failure there means the configuration does not fit the loaded engine
//! version.
//!
//! Faults that never passed through the engine are adapter defects.

use tracing::debug;

use crate::{BridgeError, EngineFault};

/// Exception class the engine wraps its failures in.
pub const ENGINE_EXCEPTION: &str = "com.puppycrawl.tools.checkstyle.api.CheckstyleException";

const PARSER_FAILURES: &[&str] = &[
    "java.lang.NullPointerException",
    "java.lang.ArrayIndexOutOfBoundsException",
    "java.lang.StringIndexOutOfBoundsException",
    "java.lang.IllegalStateException",
    "java.lang.ClassCastException",
];

// Grammar/tokenizer families; not every engine release ships them.
const GRAMMAR_FAMILIES: &[&str] = &["antlr.", "org.antlr."];

/// Rules for turning engine faults into [`BridgeError`]s.
#[derive(Debug, Clone)]
pub struct FaultTaxonomy {
    engine_classes: Vec<String>,
    parser_failures: Vec<String>,
    grammar_prefixes: Vec<String>,
}

impl FaultTaxonomy {
    /// Creates a taxonomy with no known classes.
    pub fn empty() -> Self {
        Self {
            engine_classes: Vec::new(),
            parser_failures: Vec::new(),
            grammar_prefixes: Vec::new(),
        }
    }

    /// Adds an engine exception class.
    pub fn with_engine_class(mut self, class: impl Into<String>) -> Self {
        self.engine_classes.push(class.into());
        self
    }

    /// Adds a parser failure class.
    pub fn with_parser_failure(mut self, class: impl Into<String>) -> Self {
        self.parser_failures.push(class.into());
        self
    }

    /// Adds a grammar exception package prefix.
    pub fn with_grammar_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.grammar_prefixes.push(prefix.into());
        self
    }

    fn is_engine(&self, fault: &EngineFault) -> bool {
        self.engine_classes.iter().any(|class| fault.is_a(class))
    }

    fn is_parser_failure(&self, fault: &EngineFault) -> bool {
        self.parser_failures.iter().any(|class| fault.is_a(class))
            || self
                .grammar_prefixes
                .iter()
                .any(|prefix| fault.class.starts_with(prefix.as_str()))
    }

    /// Innermost engine fault whose cause is not an engine fault, or the
    /// end of the chain if there is none.
    pub fn root<'a>(&self, fault: &'a EngineFault) -> &'a EngineFault {
        let mut root = fault;
        while let Some(cause) = root.cause() {
            if self.is_engine(root) && !self.is_engine(cause) {
                break;
            }
            root = cause;
        }
        root
    }

    /// Classifies `fault`, using the root's message.
    pub fn wrap(&self, fault: EngineFault) -> BridgeError {
        self.wrap_with_message(None, fault)
    }

    /// Classifies `fault`. `message` replaces the root's message if given.
    pub fn wrap_with_message(&self, message: Option<&str>, fault: EngineFault) -> BridgeError {
        let root = self.root(&fault);
        let text = message.map_or_else(|| root.message.clone(), str::to_string);

        let parse = self.is_engine(root) && root.cause().is_some_and(|c| self.is_parser_failure(c));
        let error = if parse {
            BridgeError::parse(text)
        } else if fault.chain().any(|f| self.is_engine(f)) {
            BridgeError::tool(text)
        } else {
            BridgeError::internal(text)
        };

        debug!("Classified {} as {:?}", fault, error.kind());
        error.with_cause(root.clone())
    }
}

impl Default for FaultTaxonomy {
    fn default() -> Self {
        let taxonomy = Self::empty().with_engine_class(ENGINE_EXCEPTION);
        let taxonomy = PARSER_FAILURES
            .iter()
            .fold(taxonomy, |t, class| t.with_parser_failure(*class));
        GRAMMAR_FAMILIES
            .iter()
            .fold(taxonomy, |t, prefix| t.with_grammar_prefix(*prefix))
    }
}
