//! Declarative description of the form's field groups.
//!
//! Field sets are fixed at process start; the registry below is the single
//! source of truth for which inputs each business type presents and how each
//! input validates.

use std::fmt;

use once_cell::sync::Lazy;

/// Input widget kind, mirrored into the rendered `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Telephone,
    Address,
}

impl InputKind {
    pub fn as_attr(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Email => "email",
            InputKind::Telephone => "tel",
            InputKind::Address => "address",
        }
    }
}

/// Declarative description of a single form field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: InputKind,
    pub required: bool,
    pub pattern: Option<&'static str>,
    pub placeholder: Option<&'static str>,
    pub validation_msg: Option<&'static str>,
}

impl FieldDescriptor {
    pub fn new(key: &'static str, label: &'static str, kind: InputKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
            pattern: None,
            placeholder: None,
            validation_msg: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_pattern(mut self, pattern: &'static str) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn with_placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn with_validation_msg(mut self, message: &'static str) -> Self {
        self.validation_msg = Some(message);
        self
    }
}

/// Named, ordered group of fields.
#[derive(Debug, Clone)]
pub struct FieldSet {
    pub name: &'static str,
    pub fields: Vec<FieldDescriptor>,
}

impl FieldSet {
    pub fn new(name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        Self { name, fields }
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.key)
    }
}

/// The fixed set of registrable business structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessTypeId {
    LimitedCompany,
    SoleTrader,
    Partnership,
}

impl BusinessTypeId {
    pub const ALL: [BusinessTypeId; 3] = [
        BusinessTypeId::LimitedCompany,
        BusinessTypeId::SoleTrader,
        BusinessTypeId::Partnership,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessTypeId::LimitedCompany => "limitedCompany",
            BusinessTypeId::SoleTrader => "soleTrader",
            BusinessTypeId::Partnership => "partnership",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BusinessTypeId::LimitedCompany => "Limited Company",
            BusinessTypeId::SoleTrader => "Sole Trader",
            BusinessTypeId::Partnership => "Partnership",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.as_str() == raw)
    }
}

impl fmt::Display for BusinessTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn name_field() -> FieldDescriptor {
    FieldDescriptor::new("name", "Name", InputKind::Text)
}

fn address_field() -> FieldDescriptor {
    FieldDescriptor::new("address", "Address", InputKind::Address)
}

static LIMITED_COMPANY_FIELDS: Lazy<FieldSet> = Lazy::new(|| {
    FieldSet::new(
        "limited company fields",
        vec![
            name_field(),
            FieldDescriptor::new("number", "Number", InputKind::Text)
                .with_placeholder("01234567"),
            address_field(),
        ],
    )
});

static SOLE_TRADER_FIELDS: Lazy<FieldSet> = Lazy::new(|| {
    FieldSet::new("sole trader fields", vec![name_field(), address_field()])
});

static PARTNERSHIP_FIELDS: Lazy<FieldSet> = Lazy::new(|| {
    FieldSet::new(
        "partnership fields",
        vec![
            name_field(),
            address_field(),
            FieldDescriptor::new("partners", "Partner names", InputKind::Text),
        ],
    )
});

static CONTACT_FIELDS: Lazy<FieldSet> = Lazy::new(|| {
    FieldSet::new(
        "contact fields",
        vec![
            FieldDescriptor::new("name", "Name", InputKind::Text),
            FieldDescriptor::new("position", "Position", InputKind::Text),
            FieldDescriptor::new("email", "Email", InputKind::Email),
            FieldDescriptor::new("invoiceEmail", "Invoice email (Optional)", InputKind::Email)
                .optional(),
            FieldDescriptor::new("telephone", "Telephone", InputKind::Telephone)
                .with_pattern("^(0|\\+?44)7\\d{9}$|^(0|\\+?44)1\\d{8,9}$")
                .with_placeholder("e.g., 07123456789 or +447123456789")
                .with_validation_msg(
                    "Please enter a valid UK phone number (mobile: 07XXXXXXXXX or \
                     +447XXXXXXXXX, landline: 01XXXXXXXXX or +441XXXXXXXXX)",
                ),
        ],
    )
});

/// Business-type-specific field set.
pub fn business_fields(id: BusinessTypeId) -> &'static FieldSet {
    match id {
        BusinessTypeId::LimitedCompany => &LIMITED_COMPANY_FIELDS,
        BusinessTypeId::SoleTrader => &SOLE_TRADER_FIELDS,
        BusinessTypeId::Partnership => &PARTNERSHIP_FIELDS,
    }
}

/// Contact field set shared by every business type.
pub fn contact_fields() -> &'static FieldSet {
    &CONTACT_FIELDS
}
