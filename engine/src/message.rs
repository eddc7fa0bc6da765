//! Message interpolation seam.
//!
//! The engine never interpolates messages itself: it hands the template
//! and the constraint's attribute map to a `MessageResolver`. Embedders
//! plug in localization here; the default resolver does plain
//! placeholder substitution.

use std::collections::BTreeMap;

use verity_core::Value;

/// What a resolver gets to work with: the constraint's static
/// attributes plus the validated value.
pub struct MessageContext<'a> {
    attributes: &'a BTreeMap<String, Value>,
    validated_value: &'a Value,
}

impl<'a> MessageContext<'a> {
    /// Create a context over a constraint's attributes and the value
    /// under validation.
    pub fn new(attributes: &'a BTreeMap<String, Value>, validated_value: &'a Value) -> Self {
        Self {
            attributes,
            validated_value,
        }
    }

    /// Look up a constraint attribute.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// The value under validation.
    pub fn validated_value(&self) -> &Value {
        self.validated_value
    }
}

/// Turns a message template into a human-readable message.
pub trait MessageResolver: Send + Sync {
    /// Interpolate a template with the given context.
    fn interpolate(&self, template: &str, ctx: &MessageContext<'_>) -> String;
}

/// Default resolver: replaces `{name}` with the attribute of that name
/// and `{validatedValue}` with the value under validation. Unknown
/// placeholders are left untouched.
#[derive(Debug, Default)]
pub struct DefaultMessageResolver;

impl MessageResolver for DefaultMessageResolver {
    fn interpolate(&self, template: &str, ctx: &MessageContext<'_>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '{' {
                result.push(c);
                continue;
            }
            let mut name = String::new();
            let mut closed = false;
            for inner in chars.by_ref() {
                if inner == '}' {
                    closed = true;
                    break;
                }
                name.push(inner);
            }
            if !closed {
                // Unterminated placeholder: keep the raw text.
                result.push('{');
                result.push_str(&name);
                break;
            }
            if name == "validatedValue" {
                result.push_str(&ctx.validated_value().to_string());
            } else if let Some(value) = ctx.attribute(&name) {
                result.push_str(&value.to_string());
            } else {
                result.push('{');
                result.push_str(&name);
                result.push('}');
            }
        }
        result
    }
}
