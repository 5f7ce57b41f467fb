//! XACML policy codec
//!
//! Translates between [`AccessControlList`](crate::access_control::AccessControlList)
//! and XACML 2.0 policy documents.
//!
//! ## Document Shape
//!
//! ```xml
//! <Policy xmlns="urn:oasis:names:tc:xacml:2.0:policy:schema:os" PolicyId="mp-1"
//!         RuleCombiningAlgId="urn:oasis:names:tc:xacml:1.0:rule-combining-algorithm:permit-overrides">
//!   <Target><Resources><Resource><ResourceMatch ...>mp-1</ResourceMatch></Resource></Resources></Target>
//!   <Rule RuleId="ROLE_STUDENT_read_Permit" Effect="Permit">
//!     <Target><Actions><Action><ActionMatch ...>read</ActionMatch></Action></Actions></Target>
//!     <Condition>
//!       <Apply FunctionId="urn:oasis:names:tc:xacml:1.0:function:string-is-in">
//!         <AttributeValue DataType="...#string">ROLE_STUDENT</AttributeValue>
//!         <SubjectAttributeDesignator AttributeId="urn:oasis:names:tc:xacml:2.0:subject:role" .../>
//!       </Apply>
//!     </Condition>
//!   </Rule>
//!   <Rule RuleId="DenyRule" Effect="Deny"/>
//! </Policy>
//! ```
//!
//! Parsing goes through three stages: XML events to a generic element tree
//! ([`dom`]), element tree to the typed rule tree ([`reader`]), rule tree to
//! ACL ([`codec`]). Encoding runs the same stages backwards through
//! [`writer`].

pub mod codec;
pub mod dom;
pub mod reader;
pub mod tree;
pub mod writer;

pub use codec::{decode, decode_bytes, encode};
pub use tree::{ActionMatch, Expression, PolicyNode, RuleEffect, RuleNode};

/// XACML 2.0 policy schema namespace
pub const POLICY_NAMESPACE: &str = "urn:oasis:names:tc:xacml:2.0:policy:schema:os";

/// Rule combining algorithm written on every encoded policy
pub const PERMIT_OVERRIDES: &str =
    "urn:oasis:names:tc:xacml:1.0:rule-combining-algorithm:permit-overrides";

/// Match function for resource and action targets
pub const STRING_EQUAL: &str = "urn:oasis:names:tc:xacml:1.0:function:string-equal";

/// Condition function testing the subject's roles
pub const STRING_IS_IN: &str = "urn:oasis:names:tc:xacml:1.0:function:string-is-in";

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

pub const RESOURCE_ID: &str = "urn:oasis:names:tc:xacml:1.0:resource:resource-id";

pub const ACTION_ID: &str = "urn:oasis:names:tc:xacml:1.0:action:action-id";

pub const SUBJECT_ROLE: &str = "urn:oasis:names:tc:xacml:2.0:subject:role";

/// Id of the trailing catch-all deny rule
pub const DENY_RULE_ID: &str = "DenyRule";
