//! Element tree to rule tree
//!
//! Only the parts of the XACML grammar the codec needs are interpreted;
//! descriptions, obligations and other policy children are skipped.

use crate::error::{PolicyError, PolicyResult};
use crate::xacml::dom::{self, Element};
use crate::xacml::tree::{ActionMatch, Expression, PolicyNode, RuleEffect, RuleNode};
use crate::xacml::SUBJECT_ROLE;

/// Parse a XACML document into a [`PolicyNode`]
pub fn read_policy(xml: &str) -> PolicyResult<PolicyNode> {
    let root = dom::parse(xml)?;
    policy_from_element(&root)
}

pub fn policy_from_element(root: &Element) -> PolicyResult<PolicyNode> {
    if root.name != "Policy" {
        return Err(PolicyError::malformed(format!(
            "expected <Policy> root element, found <{}>",
            root.name
        )));
    }

    let rules = root
        .children_named("Rule")
        .map(rule_from_element)
        .collect::<PolicyResult<Vec<_>>>()?;

    Ok(PolicyNode {
        policy_id: root.attribute("PolicyId").unwrap_or_default().to_string(),
        rule_combining_alg: root
            .attribute("RuleCombiningAlgId")
            .unwrap_or_default()
            .to_string(),
        resource: policy_resource(root),
        rules,
    })
}

/// Resource id literal from `Target/Resources/Resource/ResourceMatch`
fn policy_resource(policy: &Element) -> Option<String> {
    policy
        .child("Target")?
        .child("Resources")?
        .child("Resource")?
        .child("ResourceMatch")?
        .child("AttributeValue")
        .map(|value| value.text.clone())
}

fn rule_from_element(rule: &Element) -> PolicyResult<RuleNode> {
    let id = rule
        .attribute("RuleId")
        .ok_or_else(|| PolicyError::malformed("rule without a RuleId attribute"))?
        .to_string();
    let effect = RuleEffect::from_attribute(rule.attribute("Effect").unwrap_or_default());

    let target = match rule.child("Target") {
        Some(target) => action_match(&id, target)?,
        None => None,
    };

    let condition = match rule.child("Condition") {
        Some(condition) => match condition.children.first() {
            Some(expression) => Some(expression_from_element(&id, expression)?),
            None => None,
        },
        None => None,
    };

    Ok(RuleNode {
        id,
        effect,
        target,
        condition,
    })
}

/// An empty `<Target/>` or one without `<Actions>` is no target at all;
/// an `<Actions>` section that does not lead to a literal is malformed.
fn action_match(rule_id: &str, target: &Element) -> PolicyResult<Option<ActionMatch>> {
    let Some(actions) = target.child("Actions") else {
        return Ok(None);
    };

    let action_match = actions
        .child("Action")
        .and_then(|action| action.child("ActionMatch"))
        .ok_or_else(|| PolicyError::malformed_rule(rule_id, "target has no action match"))?;

    let value = action_match
        .child("AttributeValue")
        .ok_or_else(|| {
            PolicyError::malformed_rule(rule_id, "action match has no attribute value")
        })?;

    Ok(Some(ActionMatch {
        match_id: action_match.attribute("MatchId").unwrap_or_default().to_string(),
        value: value.text.clone(),
    }))
}

fn expression_from_element(rule_id: &str, element: &Element) -> PolicyResult<Expression> {
    match element.name.as_str() {
        "AttributeValue" => Ok(Expression::Literal(element.text.clone())),
        "Apply" => {
            let op = element
                .attribute("FunctionId")
                .ok_or_else(|| PolicyError::malformed_rule(rule_id, "apply without a FunctionId"))?
                .to_string();
            let operands = element
                .children
                .iter()
                .map(|child| expression_from_element(rule_id, child))
                .collect::<PolicyResult<Vec<_>>>()?;
            Ok(Expression::BooleanOp { op, operands })
        }
        name if name.ends_with("AttributeDesignator") => {
            let attribute_id = element.attribute("AttributeId").unwrap_or_default();
            if name == "SubjectAttributeDesignator" && attribute_id == SUBJECT_ROLE {
                Ok(Expression::RoleDesignator)
            } else {
                Ok(Expression::Designator {
                    element: name.to_string(),
                    attribute_id: attribute_id.to_string(),
                })
            }
        }
        other => Err(PolicyError::malformed_rule(
            rule_id,
            format!("unsupported expression element <{}>", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULE_DOC: &str = r#"<Policy PolicyId="mp" RuleCombiningAlgId="alg">
  <Target>
    <Resources><Resource><ResourceMatch MatchId="eq">
      <AttributeValue>mp</AttributeValue>
    </ResourceMatch></Resource></Resources>
  </Target>
  <Rule RuleId="r1" Effect="Permit">
    <Target><Actions><Action><ActionMatch MatchId="eq"><AttributeValue>read</AttributeValue></ActionMatch></Action></Actions></Target>
    <Condition>
      <Apply FunctionId="is-in">
        <AttributeValue>ROLE_A</AttributeValue>
        <SubjectAttributeDesignator AttributeId="urn:oasis:names:tc:xacml:2.0:subject:role"/>
      </Apply>
    </Condition>
  </Rule>
  <Rule RuleId="DenyRule" Effect="Deny"/>
</Policy>"#;

    #[test]
    fn test_read_policy() {
        let policy = read_policy(RULE_DOC).unwrap();
        assert_eq!(policy.policy_id, "mp");
        assert_eq!(policy.rule_combining_alg, "alg");
        assert_eq!(policy.resource.as_deref(), Some("mp"));
        assert_eq!(policy.rules.len(), 2);

        let rule = &policy.rules[0];
        assert_eq!(rule.effect, RuleEffect::Permit);
        assert_eq!(rule.target.as_ref().map(|t| t.value.as_str()), Some("read"));
        assert_eq!(
            rule.condition,
            Some(Expression::BooleanOp {
                op: "is-in".to_string(),
                operands: vec![
                    Expression::Literal("ROLE_A".to_string()),
                    Expression::RoleDesignator,
                ],
            })
        );

        assert_eq!(policy.rules[1], RuleNode::bare("DenyRule", RuleEffect::Deny));
    }

    #[test]
    fn test_empty_target_is_no_target() {
        let policy = read_policy(r#"<Policy><Rule RuleId="x" Effect="Deny"><Target/></Rule></Policy>"#)
            .unwrap();
        assert_eq!(policy.rules[0].target, None);
    }

    #[test]
    fn test_actions_without_match_is_malformed() {
        let err = read_policy(
            r#"<Policy><Rule RuleId="x" Effect="Deny"><Target><Actions/></Target></Rule></Policy>"#,
        )
        .unwrap_err();
        assert!(matches!(err, PolicyError::MalformedRule { ref rule_id, .. } if rule_id == "x"));
    }

    #[test]
    fn test_wrong_root_is_malformed() {
        let err = read_policy("<PolicySet/>").unwrap_err();
        assert!(matches!(err, PolicyError::Malformed(_)));
    }

    #[test]
    fn test_unknown_expression_is_malformed() {
        let err = read_policy(
            r#"<Policy><Rule RuleId="x" Effect="Permit"><Condition><VariableReference/></Condition></Rule></Policy>"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("VariableReference"));
    }
}
