//! Common regex patterns for customer info extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Tax ID: optional label, then 8-15 uppercase letters/digits
    pub static ref TAX_ID: Regex = Regex::new(
        r"(?:(?i:VAT|TAX|Tax\s*ID|税号))?\s*:?\s*([A-Z0-9]{8,15})"
    ).unwrap();

    // Email pattern
    pub static ref EMAIL: Regex = Regex::new(
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"
    ).unwrap();

    // Phone: optional label, optional +, a digit, then 7+ digits/dashes/parens or
    // horizontal blanks (no-break spaces included, line breaks excluded)
    pub static ref PHONE: Regex = Regex::new(
        r"(?:(?i:Phone|Tel|Telephone|Mobile|电话|手机))?\s*:?\s*(\+?[0-9][0-9\t\p{Zs}\-()]{7,})"
    ).unwrap();

    // Postal codes: US ZIP(+4), 3-2-2 digit groups, A9A 9A9, AA99 99AA.
    // ASCII word boundaries, so a code glued to CJK text still matches.
    pub static ref POSTAL_CODE: Regex = Regex::new(
        r"(?-u:\b)([0-9]{5}(?:-[0-9]{4})?|[0-9]{3}\s[0-9]{2}\s[0-9]{2}|[A-Z][0-9][A-Z]\s?[0-9][A-Z][0-9]|[A-Z]{2}[0-9]{2}\s?[0-9]{2}[A-Z]{2})(?-u:\b)"
    ).unwrap();

    // Residual text is split on any run of these
    pub static ref SEGMENT_SEPARATOR: Regex = Regex::new(r"[,;\n]+").unwrap();

    // Leftover label words that mark a segment as contact noise, not address
    pub static ref RESIDUAL_LABEL: Regex = Regex::new(
        r"(?i)^(?:Phone|Tel|Email|Mobile|电话|手机)"
    ).unwrap();

    // City: a letter run after a comma/newline, followed by ", XX", ", 99999" or the end.
    // Group 2 is the terminator and stays in the address.
    pub static ref CITY_TAIL: Regex = Regex::new(
        r"(?:,\s*|\n\s*)([A-Za-z\s\x{4e00}-\x{9fa5}]+?)(,\s*[A-Z]{2}|,\s*[0-9]{5}|$)"
    ).unwrap();
}
