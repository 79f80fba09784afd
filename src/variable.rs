//! Outbound variables
//!
//! Outbound conversion produces script text. A value either fits in a single
//! expression (a leaf: `true`, `42`, `"x"`, or the name of an object declared
//! earlier) or needs declarations first. Objects are always declared empty
//! and filled by member assignments afterwards:
//!
//! ```text
//! var s0={};
//! var s1=[];
//! s1[0]=s0;
//! s0.items=s1;
//! ```
//!
//! That order lets any member point at any object already reserved in the
//! call, including the object currently being filled.

use std::fmt;

use serde::Serialize;
use wirebind_wire::quote_string;

use crate::value::HostValue;

/// Key of a member assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MemberKey {
    Index(usize),
    Field(String),
}

/// One statement of generated script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Declaration {
    /// `var name=init;`
    Var { name: String, init: String },
    /// `object.key=value;` or `object[index]=value;`
    Member {
        object: String,
        key: MemberKey,
        value: String,
    },
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Var { name, init } => write!(f, "var {}={};", name, init),
            Declaration::Member { object, key, value } => match key {
                MemberKey::Index(index) => write!(f, "{}[{}]={};", object, index, value),
                MemberKey::Field(field) if is_identifier(field) => {
                    write!(f, "{}.{}={};", object, field, value)
                }
                MemberKey::Field(field) => {
                    write!(f, "{}[{}]={};", object, quote_string(field, true), value)
                }
            },
        }
    }
}

/// The result of converting one host value.
///
/// `expression` is what a parent (or the response) embeds; `declarations`
/// must run before it is evaluated. A leaf never has declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundVariable {
    expression: String,
    declarations: Vec<Declaration>,
    // Members of an object whose name is not bound yet
    members: Vec<(MemberKey, MemberValue)>,
    shape: Shape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Leaf,
    /// Built by a converter, waiting for a name
    Composite,
    /// Bound to a name by the context
    Named,
}

/// One member of a composite, as a converter hands it back.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberValue {
    /// Already converted by the converter itself
    Converted(OutboundVariable),
    /// Left for the outbound context, which converts it after the converter
    /// returns. Composite children should use this so nesting depth never
    /// turns into call depth.
    Pending(HostValue),
}

impl From<OutboundVariable> for MemberValue {
    fn from(variable: OutboundVariable) -> Self {
        MemberValue::Converted(variable)
    }
}

impl From<HostValue> for MemberValue {
    fn from(value: HostValue) -> Self {
        MemberValue::Pending(value)
    }
}

impl OutboundVariable {
    /// A self-contained expression.
    pub fn leaf(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            declarations: Vec::new(),
            members: Vec::new(),
            shape: Shape::Leaf,
        }
    }

    /// An object built from an empty initializer (`{}`, `[]`) plus member
    /// assignments. The outbound context binds it to the name it reserved
    /// for the object.
    pub fn composite(init: impl Into<String>, members: Vec<(MemberKey, MemberValue)>) -> Self {
        Self {
            expression: init.into(),
            declarations: Vec::new(),
            members,
            shape: Shape::Composite,
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn is_leaf(&self) -> bool {
        self.shape == Shape::Leaf
    }

    /// Whether this still needs a name before it can be embedded.
    pub(crate) fn is_unbound(&self) -> bool {
        self.shape == Shape::Composite
    }
}

/// Assembles the declarations of one named object: its `var`, then, member
/// by member, whatever the member needs declared followed by its assignment.
#[derive(Debug)]
pub(crate) struct Binding {
    name: String,
    declarations: Vec<Declaration>,
    members: std::vec::IntoIter<(MemberKey, MemberValue)>,
}

impl Binding {
    pub(crate) fn new(name: impl Into<String>, variable: OutboundVariable) -> Self {
        let name = name.into();
        let mut declarations = variable.declarations;
        declarations.push(Declaration::Var {
            name: name.clone(),
            init: variable.expression,
        });
        Self {
            name,
            declarations,
            members: variable.members.into_iter(),
        }
    }

    /// The next member still to be assigned.
    pub(crate) fn next_member(&mut self) -> Option<(MemberKey, MemberValue)> {
        self.members.next()
    }

    pub(crate) fn assign(&mut self, key: MemberKey, member: OutboundVariable) {
        self.declarations.extend(member.declarations);
        self.declarations.push(Declaration::Member {
            object: self.name.clone(),
            key,
            value: member.expression,
        });
    }

    /// A reference to the bound name carrying the whole sequence.
    pub(crate) fn finish(self) -> OutboundVariable {
        OutboundVariable {
            expression: self.name,
            declarations: self.declarations,
            members: Vec::new(),
            shape: Shape::Named,
        }
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_has_no_declarations() {
        let var = OutboundVariable::leaf("true");
        assert!(var.is_leaf());
        assert!(var.declarations().is_empty());
    }

    #[test]
    fn binding_declares_before_members() {
        let var = OutboundVariable::composite(
            "{}",
            vec![
                (MemberKey::Field("n".into()), OutboundVariable::leaf("1").into()),
                (MemberKey::Field("self".into()), OutboundVariable::leaf("s0").into()),
            ],
        );
        let mut binding = Binding::new("s0", var);
        while let Some((key, member)) = binding.next_member() {
            let MemberValue::Converted(member) = member else {
                panic!("unexpected pending member");
            };
            binding.assign(key, member);
        }
        let var = binding.finish();

        let script: Vec<String> = var.declarations().iter().map(|d| d.to_string()).collect();
        assert_eq!(script, vec!["var s0={};", "s0.n=1;", "s0.self=s0;"]);
        assert_eq!(var.expression(), "s0");
        assert!(!var.is_leaf());
    }

    #[test]
    fn odd_field_names_are_quoted() {
        let decl = Declaration::Member {
            object: "s3".into(),
            key: MemberKey::Field("first name".into()),
            value: "\"Ada\"".into(),
        };
        assert_eq!(decl.to_string(), "s3[\"first name\"]=\"Ada\";");
        let decl = Declaration::Member {
            object: "s3".into(),
            key: MemberKey::Index(2),
            value: "null".into(),
        };
        assert_eq!(decl.to_string(), "s3[2]=null;");
    }
}
