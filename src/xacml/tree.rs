//! Typed XACML rule tree
//!
//! A minimal mirror of the policy grammar. It lives only for the duration
//! of one encode or decode.

/// Rule effect as written on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleEffect {
    Permit,
    Deny,
}

impl RuleEffect {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RuleEffect::Permit => "Permit",
            RuleEffect::Deny => "Deny",
        }
    }

    /// Anything other than `Permit` is treated as `Deny`
    pub fn from_attribute(value: &str) -> Self {
        if value == "Permit" {
            RuleEffect::Permit
        } else {
            RuleEffect::Deny
        }
    }
}

/// `<ActionMatch>` inside a rule target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMatch {
    pub match_id: String,
    pub value: String,
}

/// Condition expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// `<AttributeValue>`
    Literal(String),
    /// `<SubjectAttributeDesignator>` for the subject role attribute
    RoleDesignator,
    /// Any other attribute designator
    Designator { element: String, attribute_id: String },
    /// `<Apply FunctionId=..>` over nested expressions
    BooleanOp { op: String, operands: Vec<Expression> },
}

impl Expression {
    /// First literal among the direct operands of a boolean op
    ///
    /// Nested ops are not searched.
    pub fn first_literal(&self) -> Option<&str> {
        match self {
            Expression::BooleanOp { operands, .. } => operands.iter().find_map(|operand| {
                match operand {
                    Expression::Literal(value) => Some(value.as_str()),
                    _ => None,
                }
            }),
            _ => None,
        }
    }
}

/// `<Rule>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleNode {
    pub id: String,
    pub effect: RuleEffect,
    pub target: Option<ActionMatch>,
    pub condition: Option<Expression>,
}

impl RuleNode {
    /// A rule with neither target nor condition
    pub fn bare(id: impl Into<String>, effect: RuleEffect) -> Self {
        Self {
            id: id.into(),
            effect,
            target: None,
            condition: None,
        }
    }
}

/// `<Policy>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyNode {
    pub policy_id: String,
    pub rule_combining_alg: String,
    /// Resource id matched by the policy target
    pub resource: Option<String>,
    pub rules: Vec<RuleNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_from_attribute() {
        assert_eq!(RuleEffect::from_attribute("Permit"), RuleEffect::Permit);
        assert_eq!(RuleEffect::from_attribute("Deny"), RuleEffect::Deny);
        assert_eq!(RuleEffect::from_attribute("permit"), RuleEffect::Deny);
    }

    #[test]
    fn test_first_literal_skips_designator() {
        let expr = Expression::BooleanOp {
            op: "f".to_string(),
            operands: vec![
                Expression::RoleDesignator,
                Expression::Literal("ROLE_A".to_string()),
                Expression::Literal("ROLE_B".to_string()),
            ],
        };
        assert_eq!(expr.first_literal(), Some("ROLE_A"));
    }

    #[test]
    fn test_first_literal_ignores_nested_ops() {
        let expr = Expression::BooleanOp {
            op: "and".to_string(),
            operands: vec![Expression::BooleanOp {
                op: "f".to_string(),
                operands: vec![Expression::Literal("hidden".to_string())],
            }],
        };
        assert_eq!(expr.first_literal(), None);
        assert_eq!(Expression::Literal("x".to_string()).first_literal(), None);
    }
}
