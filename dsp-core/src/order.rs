use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

use crate::template::{self, DeliveryTemplate, ReceiptLine};
use crate::{CoreError, CoreResult};

/// Key of the discriminator field inside an order payload.
pub const DELIVERY_TYPE_KEY: &str = "delivery_type";

/// Delivery type used when the order leaves it out or sends an empty string.
pub const DEFAULT_DELIVERY_TYPE: &str = "classique";

/// Discriminator selecting which optional fields appear on a receipt.
///
/// Values are kept verbatim (case-sensitive). Anything that has no entry in
/// [`template::TEMPLATES`] is still a valid delivery type; it simply renders
/// the common fields only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryType(String);

impl DeliveryType {
    /// Resolve a raw payload value, falling back to `classique` when empty.
    pub fn resolve(raw: &str) -> Self {
        if raw.is_empty() {
            Self(DEFAULT_DELIVERY_TYPE.to_string())
        } else {
            Self(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Template registered for this type, if any.
    pub fn template(&self) -> Option<&'static DeliveryTemplate> {
        template::find(&self.0)
    }

    /// Label form printed on the receipt: first letter upper-cased, the rest lower-cased.
    pub fn display_name(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }
}

impl Default for DeliveryType {
    fn default() -> Self {
        Self(DEFAULT_DELIVERY_TYPE.to_string())
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A delivery request as posted by the client: a free-form map of named fields.
///
/// Nothing is validated. Lookups of absent keys yield an empty string so the
/// receipt shows a blank value instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Order {
    fields: Map<String, Value>,
}

impl Order {
    /// Build an order from an arbitrary JSON document. Only objects are accepted.
    pub fn from_value(value: Value) -> CoreResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            Value::Null => Err(CoreError::NotAnObject("null")),
            Value::Bool(_) => Err(CoreError::NotAnObject("a boolean")),
            Value::Number(_) => Err(CoreError::NotAnObject("a number")),
            Value::String(_) => Err(CoreError::NotAnObject("a string")),
            Value::Array(_) => Err(CoreError::NotAnObject("an array")),
        }
    }

    /// Text value of a field. Scalars are stringified; null, arrays and
    /// objects read as blank.
    pub fn field(&self, key: &str) -> Cow<'_, str> {
        match self.fields.get(key) {
            Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
            Some(Value::Number(n)) => Cow::Owned(n.to_string()),
            Some(Value::Bool(b)) => Cow::Owned(b.to_string()),
            _ => Cow::Borrowed(""),
        }
    }

    pub fn delivery_type(&self) -> DeliveryType {
        DeliveryType::resolve(&self.field(DELIVERY_TYPE_KEY))
    }

    /// Ordered (label, value) lines for the receipt body.
    pub fn receipt_lines(&self) -> Vec<ReceiptLine> {
        template::field_specs(&self.delivery_type())
            .map(|spec| ReceiptLine {
                label: spec.label,
                key: spec.key,
                value: self.field(spec.key).into_owned(),
            })
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Order
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let fields = iter
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect();
        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_delivery_type_defaults_to_classique() {
        let order = Order::from_value(json!({ "pickup_address": "1 rue de Rivoli" })).unwrap();
        assert_eq!(order.delivery_type().as_str(), "classique");

        let order: Order = [("delivery_type", "")].into_iter().collect();
        assert_eq!(order.delivery_type().as_str(), "classique");
    }

    #[test]
    fn test_delivery_type_is_case_sensitive() {
        let order: Order = [("delivery_type", "Repas")].into_iter().collect();
        let delivery_type = order.delivery_type();

        assert_eq!(delivery_type.as_str(), "Repas");
        assert!(delivery_type.template().is_none());
    }

    #[test]
    fn test_display_name_capitalizes() {
        assert_eq!(DeliveryType::resolve("entreprise").display_name(), "Entreprise");
        assert_eq!(DeliveryType::resolve("eXPRESS").display_name(), "Express");
        assert_eq!(DeliveryType::resolve("").display_name(), "Classique");
    }

    #[test]
    fn test_field_lookup_defaults_to_blank() {
        let order = Order::from_value(json!({
            "recipient_info": "Mme Dupont",
            "pickup_time": 14,
            "fragile": true,
            "order_details": null,
            "package_type": ["box"],
        }))
        .unwrap();

        assert_eq!(order.field("recipient_info"), "Mme Dupont");
        assert_eq!(order.field("pickup_time"), "14");
        assert_eq!(order.field("fragile"), "true");
        assert_eq!(order.field("order_details"), "");
        assert_eq!(order.field("package_type"), "");
        assert_eq!(order.field("client_info"), "");
    }

    #[test]
    fn test_non_object_payload_rejected() {
        assert!(matches!(
            Order::from_value(json!([1, 2, 3])),
            Err(CoreError::NotAnObject("an array"))
        ));
        assert!(Order::from_value(json!("classique")).is_err());
        assert!(Order::from_value(Value::Null).is_err());
    }

    #[test]
    fn test_receipt_lines_carry_values() {
        let order: Order = [
            ("delivery_type", "classique"),
            ("pickup_address", "12 avenue Foch"),
            ("package_description", "Carton 5kg"),
        ]
        .into_iter()
        .collect();

        let lines = order.receipt_lines();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].value, "12 avenue Foch");
        assert_eq!(lines[1].value, "");
        assert_eq!(lines[2].value, "Carton 5kg");
    }
}
