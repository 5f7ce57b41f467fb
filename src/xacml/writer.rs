//! Rule tree to XACML document

use crate::error::{PolicyError, PolicyResult};
use crate::xacml::tree::{ActionMatch, Expression, PolicyNode, RuleNode};
use crate::xacml::{ACTION_ID, POLICY_NAMESPACE, RESOURCE_ID, STRING_EQUAL, SUBJECT_ROLE, XSD_STRING};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// Serialize a policy tree as an indented UTF-8 XACML document
pub fn write_policy(policy: &PolicyNode) -> PolicyResult<Vec<u8>> {
    let mut out = XmlOut::new();

    out.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    out.open(
        "Policy",
        &[
            ("xmlns", POLICY_NAMESPACE),
            ("PolicyId", policy.policy_id.as_str()),
            ("Version", "2.0"),
            ("RuleCombiningAlgId", policy.rule_combining_alg.as_str()),
        ],
    )?;

    match &policy.resource {
        Some(resource) => {
            out.open("Target", &[])?;
            out.open("Resources", &[])?;
            out.open("Resource", &[])?;
            out.open("ResourceMatch", &[("MatchId", STRING_EQUAL)])?;
            out.string_value(resource)?;
            out.designator("ResourceAttributeDesignator", RESOURCE_ID)?;
            out.close("ResourceMatch")?;
            out.close("Resource")?;
            out.close("Resources")?;
            out.close("Target")?;
        }
        None => out.empty("Target", &[])?,
    }

    for rule in &policy.rules {
        write_rule(&mut out, rule)?;
    }

    out.close("Policy")?;
    Ok(out.finish())
}

fn write_rule(out: &mut XmlOut, rule: &RuleNode) -> PolicyResult<()> {
    let attributes = [("RuleId", rule.id.as_str()), ("Effect", rule.effect.as_str())];

    if rule.target.is_none() && rule.condition.is_none() {
        return out.empty("Rule", &attributes);
    }

    out.open("Rule", &attributes)?;
    if let Some(target) = &rule.target {
        write_action_target(out, target)?;
    }
    if let Some(condition) = &rule.condition {
        out.open("Condition", &[])?;
        write_expression(out, condition)?;
        out.close("Condition")?;
    }
    out.close("Rule")
}

fn write_action_target(out: &mut XmlOut, action: &ActionMatch) -> PolicyResult<()> {
    out.open("Target", &[])?;
    out.open("Actions", &[])?;
    out.open("Action", &[])?;
    out.open("ActionMatch", &[("MatchId", action.match_id.as_str())])?;
    out.string_value(&action.value)?;
    out.designator("ActionAttributeDesignator", ACTION_ID)?;
    out.close("ActionMatch")?;
    out.close("Action")?;
    out.close("Actions")?;
    out.close("Target")
}

fn write_expression(out: &mut XmlOut, expression: &Expression) -> PolicyResult<()> {
    match expression {
        Expression::Literal(value) => out.string_value(value),
        Expression::RoleDesignator => out.designator("SubjectAttributeDesignator", SUBJECT_ROLE),
        Expression::Designator {
            element,
            attribute_id,
        } => out.designator(element, attribute_id),
        Expression::BooleanOp { op, operands } => {
            out.open("Apply", &[("FunctionId", op.as_str())])?;
            for operand in operands {
                write_expression(out, operand)?;
            }
            out.close("Apply")
        }
    }
}

/// Thin wrapper mapping writer failures to [`PolicyError::Encoding`]
struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn emit(&mut self, event: Event<'_>) -> PolicyResult<()> {
        self.writer
            .write_event(event)
            .map_err(|e| PolicyError::Encoding(e.to_string()))
    }

    fn start<'a>(name: &'a str, attributes: &[(&'a str, &'a str)]) -> BytesStart<'a> {
        let mut start = BytesStart::new(name);
        for &attribute in attributes {
            start.push_attribute(attribute);
        }
        start
    }

    fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> PolicyResult<()> {
        self.emit(Event::Start(Self::start(name, attributes)))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> PolicyResult<()> {
        self.emit(Event::Empty(Self::start(name, attributes)))
    }

    fn close(&mut self, name: &str) -> PolicyResult<()> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    fn string_value(&mut self, value: &str) -> PolicyResult<()> {
        self.open("AttributeValue", &[("DataType", XSD_STRING)])?;
        self.emit(Event::Text(BytesText::new(value)))?;
        self.close("AttributeValue")
    }

    fn designator(&mut self, name: &str, attribute_id: &str) -> PolicyResult<()> {
        self.empty(name, &[("AttributeId", attribute_id), ("DataType", XSD_STRING)])
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}
