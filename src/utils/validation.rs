use validator::Validate;

pub fn validate<T: Validate>(val: &T) -> Result<(), validator::ValidationErrors> {
    val.validate()
}

/// Validation failures flattened to `field: code` strings for log lines.
pub fn integrity_issues<T: Validate>(val: &T) -> Vec<String> {
    match validate(val) {
        Ok(()) => Vec::new(),
        Err(errors) => {
            let mut issues: Vec<String> = errors
                .field_errors()
                .iter()
                .flat_map(|(field, errs)| {
                    errs.iter().map(move |e| format!("{}: {}", field, e.code))
                })
                .collect();
            issues.sort();
            issues
        }
    }
}
