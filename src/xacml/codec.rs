//! ACL <-> XACML policy
//!
//! `decode(encode(acl))` is lossless for ACL content. The reverse is only
//! semantically equivalent: formatting and unknown policy children are not
//! preserved.

use crate::access_control::types::{AccessControlEntry, AccessControlList, AclEffect};
use crate::error::{PolicyError, PolicyResult};
use crate::xacml::reader::read_policy;
use crate::xacml::tree::{ActionMatch, Expression, PolicyNode, RuleEffect, RuleNode};
use crate::xacml::writer::write_policy;
use crate::xacml::{DENY_RULE_ID, PERMIT_OVERRIDES, STRING_EQUAL, STRING_IS_IN};
use tracing::trace;

/// Decode a XACML policy document into an ACL
///
/// Fails as a whole on the first malformed rule; a partial ACL is never
/// returned.
pub fn decode(xml: &str) -> PolicyResult<AccessControlList> {
    let policy = read_policy(xml)?;
    acl_from_policy(&policy)
}

/// Decode raw document bytes, which must be UTF-8
pub fn decode_bytes(bytes: &[u8]) -> PolicyResult<AccessControlList> {
    let xml = std::str::from_utf8(bytes)
        .map_err(|e| PolicyError::malformed(format!("document is not valid UTF-8: {}", e)))?;
    decode(xml)
}

/// Encode an ACL as a XACML policy for the given resource id
pub fn encode(acl: &AccessControlList, resource_id: &str) -> PolicyResult<String> {
    let policy = policy_from_acl(acl, resource_id)?;
    let bytes = write_policy(&policy)?;
    String::from_utf8(bytes).map_err(|e| PolicyError::Encoding(e.to_string()))
}

pub fn acl_from_policy(policy: &PolicyNode) -> PolicyResult<AccessControlList> {
    let mut acl = AccessControlList::new();

    for rule in &policy.rules {
        let Some(target) = &rule.target else {
            if rule.id == DENY_RULE_ID {
                trace!(policy = %policy.policy_id, "Skipping trailing deny rule");
                continue;
            }
            return Err(PolicyError::malformed_rule(
                &rule.id,
                "rule has no target; only the trailing deny rule may be empty",
            ));
        };

        let condition = rule
            .condition
            .as_ref()
            .ok_or_else(|| PolicyError::malformed_rule(&rule.id, "rule has no condition"))?;

        if !matches!(condition, Expression::BooleanOp { .. }) {
            return Err(PolicyError::malformed_rule(
                &rule.id,
                "condition is not an apply expression",
            ));
        }

        let role = condition.first_literal().ok_or_else(|| {
            PolicyError::malformed_rule(&rule.id, "unable to find a role literal in the condition")
        })?;

        if role.is_empty() {
            return Err(PolicyError::malformed_rule(&rule.id, "role literal is empty"));
        }
        if target.value.is_empty() {
            return Err(PolicyError::malformed_rule(&rule.id, "action match value is empty"));
        }

        let effect = match rule.effect {
            RuleEffect::Permit => AclEffect::Allow,
            RuleEffect::Deny => AclEffect::Deny,
        };
        acl.add_entry(role, target.value.as_str(), effect);
    }

    Ok(acl)
}

pub fn policy_from_acl(acl: &AccessControlList, resource_id: &str) -> PolicyResult<PolicyNode> {
    let mut rules = Vec::with_capacity(acl.len() + 1);

    for entry in acl {
        entry
            .validate()
            .map_err(|e| PolicyError::Encoding(e.to_string()))?;
        rules.push(rule_for_entry(entry));
    }
    rules.push(RuleNode::bare(DENY_RULE_ID, RuleEffect::Deny));

    Ok(PolicyNode {
        policy_id: resource_id.to_string(),
        rule_combining_alg: PERMIT_OVERRIDES.to_string(),
        resource: Some(resource_id.to_string()),
        rules,
    })
}

fn rule_for_entry(entry: &AccessControlEntry) -> RuleNode {
    let effect = match entry.effect {
        AclEffect::Allow => RuleEffect::Permit,
        AclEffect::Deny => RuleEffect::Deny,
    };

    RuleNode {
        id: format!("{}_{}_{}", entry.role, entry.action, effect.as_str()),
        effect,
        target: Some(ActionMatch {
            match_id: STRING_EQUAL.to_string(),
            value: entry.action.clone(),
        }),
        condition: Some(Expression::BooleanOp {
            op: STRING_IS_IN.to_string(),
            operands: vec![
                Expression::Literal(entry.role.clone()),
                Expression::RoleDesignator,
            ],
        }),
    }
}
