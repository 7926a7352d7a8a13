/// Normalizes a phone number to its digits-only form, the canonical key used by the allow-list and the
/// messaging gateway. "+7 (701) 123-45-67" and "87011234567" both reduce to digit strings.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
