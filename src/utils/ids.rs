use uuid::Uuid;

/// Opaque entity id with a readable prefix, e.g. `tax_bracket_1f9e0c2a7b3d`.
pub fn new_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &hex[..12])
}

/// Staff ids keep the legacy `H`-prefixed short form.
pub fn new_staff_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("H{}", &hex[..5])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_prefix_and_are_unique() {
        let a = new_id("tax_bracket");
        let b = new_id("tax_bracket");
        assert!(a.starts_with("tax_bracket_"));
        assert_ne!(a, b);
    }

    #[test]
    fn staff_ids_are_short_form() {
        let id = new_staff_id();
        assert!(id.starts_with('H'));
        assert_eq!(id.len(), 6);
    }
}
