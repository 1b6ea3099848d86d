//! Buyer record produced by the customer info extractor.

use serde::{Deserialize, Serialize};

/// Structured buyer details.
///
/// Every field is either a trimmed extracted value or the empty string;
/// callers treat an empty field as "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInfo {
    /// Company name.
    pub company: String,
    /// Contact person.
    pub contact: String,
    /// Street address (everything that is not the city).
    pub address: String,
    /// City.
    pub city: String,
    /// Postal or ZIP code.
    pub postal_code: String,
    /// Phone number.
    pub phone: String,
    /// Email address.
    pub email: String,
    /// Canonical country name.
    pub country: String,
    /// VAT / tax identification number.
    pub tax_id: String,
}

/// Field selector for [`CustomerInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomerField {
    Company,
    Contact,
    Address,
    City,
    PostalCode,
    Phone,
    Email,
    Country,
    TaxId,
}

impl CustomerField {
    /// All fields in display order.
    pub const ALL: [CustomerField; 9] = [
        CustomerField::Company,
        CustomerField::Contact,
        CustomerField::Address,
        CustomerField::City,
        CustomerField::PostalCode,
        CustomerField::Phone,
        CustomerField::Email,
        CustomerField::Country,
        CustomerField::TaxId,
    ];

    /// Key used in serialized records.
    pub fn key(&self) -> &'static str {
        match self {
            CustomerField::Company => "company",
            CustomerField::Contact => "contact",
            CustomerField::Address => "address",
            CustomerField::City => "city",
            CustomerField::PostalCode => "postalCode",
            CustomerField::Phone => "phone",
            CustomerField::Email => "email",
            CustomerField::Country => "country",
            CustomerField::TaxId => "taxId",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            CustomerField::Company => "Company",
            CustomerField::Contact => "Contact",
            CustomerField::Address => "Address",
            CustomerField::City => "City",
            CustomerField::PostalCode => "Postal code",
            CustomerField::Phone => "Phone",
            CustomerField::Email => "Email",
            CustomerField::Country => "Country",
            CustomerField::TaxId => "Tax ID",
        }
    }
}

impl CustomerInfo {
    /// Read a field.
    pub fn get(&self, field: CustomerField) -> &str {
        match field {
            CustomerField::Company => &self.company,
            CustomerField::Contact => &self.contact,
            CustomerField::Address => &self.address,
            CustomerField::City => &self.city,
            CustomerField::PostalCode => &self.postal_code,
            CustomerField::Phone => &self.phone,
            CustomerField::Email => &self.email,
            CustomerField::Country => &self.country,
            CustomerField::TaxId => &self.tax_id,
        }
    }

    /// Mutable access to a field.
    pub fn get_mut(&mut self, field: CustomerField) -> &mut String {
        match field {
            CustomerField::Company => &mut self.company,
            CustomerField::Contact => &mut self.contact,
            CustomerField::Address => &mut self.address,
            CustomerField::City => &mut self.city,
            CustomerField::PostalCode => &mut self.postal_code,
            CustomerField::Phone => &mut self.phone,
            CustomerField::Email => &mut self.email,
            CustomerField::Country => &mut self.country,
            CustomerField::TaxId => &mut self.tax_id,
        }
    }

    /// Overwrite a field.
    pub fn set(&mut self, field: CustomerField, value: impl Into<String>) {
        *self.get_mut(field) = value.into();
    }

    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        CustomerField::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    /// Fields that carry no value, in display order.
    pub fn missing_fields(&self) -> Vec<CustomerField> {
        CustomerField::ALL
            .iter()
            .copied()
            .filter(|f| self.get(*f).is_empty())
            .collect()
    }

    /// Copy values from `parsed` into fields that are still blank here.
    ///
    /// Fields the user already filled in are never overwritten. Returns the
    /// fields that were filled.
    pub fn fill_blanks_from(&mut self, parsed: &CustomerInfo) -> Vec<CustomerField> {
        let mut filled = Vec::new();
        for field in CustomerField::ALL {
            let value = parsed.get(field);
            if !value.is_empty() && self.get(field).trim().is_empty() {
                self.set(field, value);
                filled.push(field);
            }
        }
        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_empty() {
        let info = CustomerInfo::default();
        assert!(info.is_empty());
        assert_eq!(info.missing_fields().len(), 9);
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let info = CustomerInfo {
            postal_code: "62704".to_string(),
            tax_id: "DE123456789".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["postalCode"], "62704");
        assert_eq!(json["taxId"], "DE123456789");
        assert_eq!(json["company"], "");
        assert_eq!(json.as_object().unwrap().len(), 9);
    }

    #[test]
    fn test_fill_blanks_keeps_user_input() {
        let mut form = CustomerInfo {
            company: "Typed By Hand Ltd".to_string(),
            ..Default::default()
        };
        let parsed = CustomerInfo {
            company: "Acme Corp".to_string(),
            email: "john@acme.com".to_string(),
            ..Default::default()
        };

        let filled = form.fill_blanks_from(&parsed);

        assert_eq!(form.company, "Typed By Hand Ltd");
        assert_eq!(form.email, "john@acme.com");
        assert_eq!(filled, vec![CustomerField::Email]);
    }

    #[test]
    fn test_field_accessors_round_trip() {
        let mut info = CustomerInfo::default();
        for field in CustomerField::ALL {
            info.set(field, field.key());
        }
        for field in CustomerField::ALL {
            assert_eq!(info.get(field), field.key());
        }
    }
}
