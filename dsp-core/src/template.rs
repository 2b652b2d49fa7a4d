
use crate::order::DeliveryType;

/// A labelled receipt line bound to an order field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub label: &'static str,
    pub key: &'static str,
}

impl FieldSpec {
    pub const fn new(label: &'static str, key: &'static str) -> Self {
        Self { label, key }
    }
}

/// Extra fields printed for one delivery type, after the common ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryTemplate {
    pub kind: &'static str,
    pub fields: &'static [FieldSpec],
}

/// A resolved receipt line: template label plus the order's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLine {
    pub label: &'static str,
    pub key: &'static str,
    pub value: String,
}

// ============================================================================
// Field catalogue
// ============================================================================

pub const PICKUP_ADDRESS: FieldSpec = FieldSpec::new("Adresse de récupération :", "pickup_address");
pub const DELIVERY_ADDRESS: FieldSpec = FieldSpec::new("Adresse de livraison :", "delivery_address");
pub const PACKAGE_DESCRIPTION: FieldSpec = FieldSpec::new("Description du colis :", "package_description");
pub const RECIPIENT_INFO: FieldSpec = FieldSpec::new("Destinataire :", "recipient_info");
pub const RESTAURANT_INFO: FieldSpec = FieldSpec::new("Nom et adresse du restaurant :", "restaurant_info");
pub const CLIENT_INFO: FieldSpec = FieldSpec::new("Nom et adresse du client :", "client_info");
pub const ORDER_DETAILS: FieldSpec = FieldSpec::new("Détails de la commande :", "order_details");
pub const PACKAGE_TYPE: FieldSpec = FieldSpec::new("Type de colis / unités :", "package_type");
pub const PICKUP_TIME: FieldSpec = FieldSpec::new("Heure souhaitée :", "pickup_time");
pub const REFERENCE_INTERNAL: FieldSpec = FieldSpec::new("Référence interne :", "reference_internal");

/// Printed on every receipt, whatever the delivery type.
pub const COMMON_FIELDS: &[FieldSpec] = &[PICKUP_ADDRESS, DELIVERY_ADDRESS];

/// Per-type extensions. Adding a delivery type means adding a row here.
pub const TEMPLATES: &[DeliveryTemplate] = &[
    DeliveryTemplate {
        kind: "classique",
        fields: &[PACKAGE_DESCRIPTION, RECIPIENT_INFO],
    },
    DeliveryTemplate {
        kind: "repas",
        fields: &[RESTAURANT_INFO, CLIENT_INFO, ORDER_DETAILS],
    },
    DeliveryTemplate {
        kind: "entreprise",
        fields: &[PACKAGE_TYPE, PICKUP_TIME, REFERENCE_INTERNAL, RECIPIENT_INFO],
    },
];

pub fn find(kind: &str) -> Option<&'static DeliveryTemplate> {
    TEMPLATES.iter().find(|t| t.kind == kind)
}

/// Common fields followed by the type-specific ones. Unknown types get the
/// common fields only.
pub fn field_specs(delivery_type: &DeliveryType) -> impl Iterator<Item = &'static FieldSpec> {
    let extra: &'static [FieldSpec] = delivery_type.template().map(|t| t.fields).unwrap_or(&[]);
    COMMON_FIELDS.iter().chain(extra.iter())
}
