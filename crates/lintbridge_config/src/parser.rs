//! XML rule configuration parsing.

use roxmltree::{Document, Node, ParsingOptions};
use tracing::debug;

use crate::property::{PropertyResolver, substitute};
use crate::{ConfigError, RuleConfig};

/// Parses a rule configuration document.
///
/// `origin` names the source in error messages.
pub fn parse_rule_config(
    text: &str,
    resolver: &dyn PropertyResolver,
    origin: &str,
) -> Result<RuleConfig, ConfigError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document = Document::parse_with_options(text, options)
        .map_err(|e| ConfigError::parse(format!("{}: {}", origin, e)))?;

    let root = document.root_element();
    if root.tag_name().name() != "module" {
        return Err(ConfigError::no_root_module(origin));
    }

    parse_module(root, resolver)
}

fn parse_module(node: Node<'_, '_>, resolver: &dyn PropertyResolver) -> Result<RuleConfig, ConfigError> {
    let name = required(node, "name")?;
    let mut builder = RuleConfig::builder(name);

    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "module" => builder = builder.child(parse_module(child, resolver)?),
            "property" => {
                let property = required(child, "name")?;
                let raw = required(child, "value")?;
                let substituted = substitute(raw, resolver)?;
                let value = match child.attribute("default") {
                    Some(default) if !substituted.fully_resolved => default.to_string(),
                    _ => substituted.value,
                };
                builder = builder.attribute(property, value);
            }
            "message" => {
                builder = builder.message(required(child, "key")?, required(child, "value")?);
            }
            other => debug!("Ignoring unknown element <{}> in module {}", other, name),
        }
    }

    Ok(builder.build())
}

fn required<'a>(node: Node<'a, '_>, attribute: &str) -> Result<&'a str, ConfigError> {
    node.attribute(attribute).ok_or_else(|| {
        let position = node.document().text_pos_at(node.range().start);
        ConfigError::parse(format!(
            "<{}> at {} is missing the \"{}\" attribute",
            node.tag_name().name(),
            position,
            attribute
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{IgnoringResolver, MapResolver};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    const CONFIG: &str = r#"<?xml version="1.0"?>
<!DOCTYPE module PUBLIC
    "-//Checkstyle//DTD Checkstyle Configuration 1.3//EN"
    "https://checkstyle.org/dtds/configuration_1_3.dtd">
<module name="Checker">
    <property name="basedir" value="${project_loc}"/>
    <module name="SuppressionFilter">
        <property name="file" value="${config_loc}/suppressions.xml" default="suppressions.xml"/>
    </module>
    <module name="TreeWalker">
        <property name="tabWidth" value="4"/>
        <module name="LineLength">
            <property name="max" value="100"/>
            <message key="maxLineLen" value="Line too long ({0})"/>
        </module>
    </module>
</module>
"#;

    #[test]
    fn test_parses_tree_with_bound_properties() {
        let resolver = MapResolver::new(BTreeMap::from([
            ("project_loc".to_string(), "/work".to_string()),
            ("config_loc".to_string(), "/work/rules".to_string()),
        ]));
        let config = parse_rule_config(CONFIG, &resolver, "test").unwrap();

        assert_eq!(config.name(), "Checker");
        assert_eq!(config.attribute("basedir"), Some("/work"));
        assert_eq!(
            config.children()[0].attribute("file"),
            Some("/work/rules/suppressions.xml")
        );

        let walker = config.child("TreeWalker").unwrap();
        assert_eq!(walker.attribute("tabWidth"), Some("4"));
        let line_length = &walker.children()[0];
        assert_eq!(line_length.attribute("max"), Some("100"));
        assert_eq!(
            line_length.messages().get("maxLineLen").map(String::as_str),
            Some("Line too long ({0})")
        );
    }

    #[test]
    fn test_unresolved_property_falls_back_to_default() {
        let resolver = MapResolver::default();
        let config = parse_rule_config(CONFIG, &resolver, "test").unwrap();

        assert_eq!(config.attribute("basedir"), Some("${project_loc}"));
        assert_eq!(config.children()[0].attribute("file"), Some("suppressions.xml"));
    }

    #[test]
    fn test_ignoring_resolver_blanks_references() {
        let config = parse_rule_config(CONFIG, &IgnoringResolver, "test").unwrap();
        assert_eq!(config.attribute("basedir"), Some(""));
        assert_eq!(config.children()[0].attribute("file"), Some("/suppressions.xml"));
    }

    #[test]
    fn test_non_module_root_is_rejected() {
        let err = parse_rule_config("<config/>", &IgnoringResolver, "inline").unwrap_err();
        assert!(matches!(err, ConfigError::NoRootModule(ref origin) if origin == "inline"));
    }

    #[test]
    fn test_malformed_xml_is_a_parse_error() {
        let err = parse_rule_config("<module name=\"Checker\">", &IgnoringResolver, "inline")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_module_without_name_is_a_parse_error() {
        let err = parse_rule_config("<module/>", &IgnoringResolver, "inline").unwrap_err();
        assert!(err.to_string().contains("\"name\""));
    }

    #[test]
    fn test_round_trips_through_xml_rendering() {
        let config = parse_rule_config(CONFIG, &IgnoringResolver, "test").unwrap();
        let reparsed = parse_rule_config(&config.to_xml(), &IgnoringResolver, "test").unwrap();
        assert_eq!(reparsed, config);
    }
}
